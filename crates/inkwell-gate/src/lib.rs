//! Access control for Inkwell.
//!
//! Sits between the route layer and the entity store. Every request is
//! turned into a [`Principal`] (or none) by a [`PrincipalResolver`], then
//! handed to the [`AccessGate`], which decides whether the operation may
//! proceed and validates its input before the store sees it.
//!
//! # Check Order
//!
//! Mutating operations fail fast, and combined failures report the first
//! check that failed:
//!
//! ```text
//! authenticated? -> id well formed? -> entity exists? -> caller owns it? -> body valid?
//!   Unauthorized      Validation         NotFound          Forbidden          Validation
//! ```
//!
//! Authorship is always taken from the principal. Any author id in a request
//! body is ignored.

pub mod error;
pub mod gate;
pub mod principal;

pub use error::{AccessError, AccessResult};
pub use gate::AccessGate;
pub use principal::{Credentials, Principal, PrincipalResolver, SessionPrincipalResolver};
