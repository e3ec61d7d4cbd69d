//! Session storage for Inkwell.
//!
//! Sessions map an opaque [`SessionId`] to the user it authenticates, with an
//! expiry. How a session gets issued (credential checks, login flows) is the
//! authentication collaborator's business; this crate only keeps the records.
//!
//! - [`SessionStore`] -- the key-value contract: set-with-expiry, get,
//!   destroy, prune
//! - [`InMemorySessionStore`] -- `HashMap`-backed implementation
//! - [`spawn_pruner`] -- background task that prunes expired records on a
//!   fixed period

pub mod error;
pub mod memory;
pub mod pruner;
pub mod traits;

pub use error::{SessionError, SessionResult};
pub use memory::InMemorySessionStore;
pub use pruner::{spawn_pruner, PrunerHandle, DEFAULT_PRUNE_INTERVAL};
pub use traits::{SessionId, SessionRecord, SessionStore};
