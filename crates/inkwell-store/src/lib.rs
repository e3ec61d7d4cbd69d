//! Entity storage for Inkwell.
//!
//! The store is the sole source of truth for [`User`](inkwell_types::User)s
//! and [`BlogPost`](inkwell_types::BlogPost)s. It hands out identifiers,
//! enforces uniqueness and existence, and knows nothing about HTTP or
//! authentication.
//!
//! # Storage Backends
//!
//! All backends implement the [`EntityStore`] trait:
//!
//! - [`InMemoryEntityStore`] -- `BTreeMap`-based store; contents live as long
//!   as the process does
//!
//! # Design Rules
//!
//! 1. Identifiers come from per-collection counters starting at 1 and are
//!    never reused, even when an insert fails.
//! 2. Each collection sits behind its own lock. A read-modify-write (shallow
//!    merge, view increment) happens inside one write critical section.
//! 3. Usernames and emails are unique case-insensitively; the check and the
//!    insert share a critical section.
//! 4. The store only accepts validated input types. It reports `NotFound`,
//!    `Conflict` and lock poisoning, nothing else.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryEntityStore;
pub use traits::EntityStore;
