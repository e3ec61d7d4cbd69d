//! Domain types for Inkwell.
//!
//! Every other Inkwell crate depends on `inkwell-types`. It defines the two
//! entities the platform stores, the identifiers that key them, and the
//! validated input types that are the only way to feed data into the store.
//!
//! # Key Types
//!
//! - [`UserId`] / [`PostId`] -- positive numeric identifiers
//! - [`User`] -- a registered account (carries credential material, never serialized)
//! - [`PublicUser`] -- a user with the password stripped, safe to return to clients
//! - [`BlogPost`] -- a post with its publish status and view counter
//! - [`NewBlogPost`], [`BlogPostPatch`], [`NewUser`], [`UserPatch`] -- validated inputs
//! - [`RawInput`] -- an unvalidated request body
//! - [`Clock`] -- source of timestamps, injectable for tests

pub mod clock;
pub mod error;
pub mod ids;
pub mod input;
pub mod post;
pub mod user;

pub use clock::{Clock, ManualClock, SystemClock, Timestamp};
pub use error::TypeError;
pub use ids::{PostId, UserId};
pub use input::{FieldViolation, RawInput, ValidationError};
pub use post::{BlogPost, BlogPostPatch, NewBlogPost, PostStatus};
pub use user::{eq_case_insensitive, NewUser, PasswordHash, PublicUser, User, UserPatch};
