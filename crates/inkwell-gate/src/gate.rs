use std::sync::Arc;

use inkwell_store::EntityStore;
use inkwell_types::{
    BlogPost, BlogPostPatch, NewBlogPost, NewUser, PostId, PublicUser, RawInput, UserPatch,
};

use crate::error::{conflict_message, AccessError, AccessResult};
use crate::principal::Principal;

/// Which ownership-guarded mutation is being attempted; only changes the
/// wording of the `Forbidden` message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mutation {
    Update,
    Delete,
}

impl Mutation {
    fn denied(self) -> AccessError {
        match self {
            Self::Update => AccessError::forbidden("You don't have permission to update this post"),
            Self::Delete => AccessError::forbidden("You don't have permission to delete this post"),
        }
    }
}

/// The access gate: every route goes through it, and it is the only caller
/// of the entity store's mutating operations.
///
/// Mutations run their checks fail-fast, in this order:
///
/// 1. authentication (`Unauthorized`)
/// 2. path id format (`Validation`)
/// 3. existence (`NotFound`)
/// 4. ownership (`Forbidden`)
/// 5. body schema (`Validation`)
///
/// so combined failures always report the earliest one.
pub struct AccessGate<S: EntityStore + ?Sized> {
    store: Arc<S>,
}

impl<S: EntityStore + ?Sized> AccessGate<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    // ---- Anonymous reads ----

    /// The public feed: published posts, newest first.
    pub fn list_published(&self) -> AccessResult<Vec<BlogPost>> {
        Ok(self.store.get_all_blog_posts()?)
    }

    /// Fetch one post of any status and count the view.
    ///
    /// The returned post already includes this view.
    pub fn read_post(&self, raw_id: &str) -> AccessResult<BlogPost> {
        let id = parse_post_id(raw_id)?;
        if self.store.get_blog_post(id)?.is_none() {
            return Err(post_not_found());
        }
        self.store.increment_post_views(id)?;
        let post = self.store.get_blog_post(id)?.ok_or_else(post_not_found)?;
        tracing::debug!(post = %id, views = post.views, "post read");
        Ok(post)
    }

    // ---- Authenticated post operations ----

    pub fn create_post(
        &self,
        principal: Option<&Principal>,
        body: RawInput<'_>,
    ) -> AccessResult<BlogPost> {
        let caller = authenticated(principal)?;
        let post = NewBlogPost::parse(body)?;
        let post = self.store.create_blog_post(post, caller.user_id)?;
        tracing::info!(post = %post.id, author = %caller.user_id, status = %post.status, "post created");
        Ok(post)
    }

    pub fn update_post(
        &self,
        principal: Option<&Principal>,
        raw_id: &str,
        body: RawInput<'_>,
    ) -> AccessResult<BlogPost> {
        let caller = authenticated(principal)?;
        let id = parse_post_id(raw_id)?;
        self.owned_post(caller, id, Mutation::Update)?;
        let patch = BlogPostPatch::parse(body)?;
        if patch.is_empty() {
            tracing::debug!(post = %id, "empty patch, only updatedAt moves");
        }
        let post = self.store.update_blog_post(id, &patch)?;
        tracing::info!(post = %id, author = %caller.user_id, "post updated");
        Ok(post)
    }

    pub fn delete_post(&self, principal: Option<&Principal>, raw_id: &str) -> AccessResult<()> {
        let caller = authenticated(principal)?;
        let id = parse_post_id(raw_id)?;
        self.owned_post(caller, id, Mutation::Delete)?;
        self.store.delete_blog_post(id)?;
        tracing::info!(post = %id, author = %caller.user_id, "post deleted");
        Ok(())
    }

    /// The caller's own posts, drafts included. The author filter always
    /// comes from the principal, never from the request.
    pub fn my_posts(&self, principal: Option<&Principal>) -> AccessResult<Vec<BlogPost>> {
        let caller = authenticated(principal)?;
        Ok(self.store.get_blog_posts_by_author(caller.user_id)?)
    }

    // ---- Users ----

    pub fn current_user(&self, principal: Option<&Principal>) -> AccessResult<PublicUser> {
        let caller = authenticated(principal)?;
        let user = self
            .store
            .get_user(caller.user_id)?
            .ok_or_else(|| AccessError::not_found("User not found"))?;
        Ok(user.into())
    }

    /// Update the caller's own profile. There is no way to name another user.
    pub fn update_profile(
        &self,
        principal: Option<&Principal>,
        body: RawInput<'_>,
    ) -> AccessResult<PublicUser> {
        let caller = authenticated(principal)?;
        let patch = UserPatch::parse(body)?;
        let user = self.store.update_user(caller.user_id, &patch)?;
        tracing::info!(user = %caller.user_id, "profile updated");
        Ok(user.into())
    }

    /// Register an account, checking username and email availability first.
    ///
    /// The store repeats the check atomically, so a race between two
    /// registrations still ends with one account.
    pub fn register_user(&self, user: NewUser) -> AccessResult<PublicUser> {
        if self.store.get_user_by_username(user.username())?.is_some() {
            return Err(AccessError::Conflict(conflict_message("username")));
        }
        if self.store.get_user_by_email(user.email())?.is_some() {
            return Err(AccessError::Conflict(conflict_message("email")));
        }
        let user = self.store.create_user(user)?;
        tracing::info!(user = %user.id, username = %user.username, "user registered");
        Ok(user.into())
    }

    fn owned_post(
        &self,
        caller: &Principal,
        id: PostId,
        mutation: Mutation,
    ) -> AccessResult<BlogPost> {
        let post = self.store.get_blog_post(id)?.ok_or_else(post_not_found)?;
        if !post.is_authored_by(caller.user_id) {
            tracing::warn!(
                post = %id,
                caller = %caller.user_id,
                author = %post.author_id,
                ?mutation,
                "ownership check failed"
            );
            return Err(mutation.denied());
        }
        Ok(post)
    }
}

fn authenticated(principal: Option<&Principal>) -> AccessResult<&Principal> {
    principal.ok_or(AccessError::Unauthorized)
}

fn parse_post_id(raw: &str) -> AccessResult<PostId> {
    PostId::parse(raw).map_err(|_| AccessError::validation("Invalid post ID"))
}

fn post_not_found() -> AccessError {
    AccessError::not_found("Blog post not found")
}
