use inkwell_types::{
    BlogPost, BlogPostPatch, NewBlogPost, NewUser, PostId, User, UserId, UserPatch,
};

use crate::error::StoreResult;

/// Authoritative holder of users and blog posts.
///
/// All implementations must satisfy these invariants:
/// - Ids are positive, monotonic per collection, and never reused.
/// - Lookups that can legitimately miss return `Ok(None)`; operations on a
///   specific entity return `NotFound` when it is absent.
/// - Listings are ordered by `created_at` descending, ties in insertion order.
/// - Updates are shallow merges applied atomically with respect to other calls.
pub trait EntityStore: Send + Sync {
    // ---- Users ----

    fn get_user(&self, id: UserId) -> StoreResult<Option<User>>;

    /// Case-insensitive exact match.
    fn get_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    /// Case-insensitive exact match.
    fn get_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Insert a user under the next id. Fails with `Conflict` if the username
    /// or email is taken; the id is consumed either way.
    fn create_user(&self, user: NewUser) -> StoreResult<User>;

    /// Shallow-merge `patch` into the user. Fails with `NotFound` or, when the
    /// email moves onto one held by someone else, `Conflict`.
    fn update_user(&self, id: UserId, patch: &UserPatch) -> StoreResult<User>;

    // ---- Blog posts ----

    /// Published posts only, newest first.
    fn get_all_blog_posts(&self) -> StoreResult<Vec<BlogPost>>;

    /// Any status.
    fn get_blog_post(&self, id: PostId) -> StoreResult<Option<BlogPost>>;

    /// Every post by `author`, drafts included, newest first.
    fn get_blog_posts_by_author(&self, author: UserId) -> StoreResult<Vec<BlogPost>>;

    /// Insert a post under the next id with `views = 0` and no `updated_at`.
    fn create_blog_post(&self, post: NewBlogPost, author: UserId) -> StoreResult<BlogPost>;

    /// Shallow-merge `patch` and stamp `updated_at`, even for an empty patch.
    fn update_blog_post(&self, id: PostId, patch: &BlogPostPatch) -> StoreResult<BlogPost>;

    fn delete_blog_post(&self, id: PostId) -> StoreResult<()>;

    /// Add exactly one view.
    fn increment_post_views(&self, id: PostId) -> StoreResult<()>;
}
