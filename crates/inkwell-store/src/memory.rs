use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use inkwell_types::{
    eq_case_insensitive, BlogPost, BlogPostPatch, Clock, NewBlogPost, NewUser, PostId,
    SystemClock, User, UserId, UserPatch,
};

use crate::error::{StoreError, StoreResult};
use crate::traits::EntityStore;

/// In-memory, map-based entity store.
///
/// Each collection is a `BTreeMap` keyed by id behind its own `RwLock`. Ids
/// are allocated inside the write lock, so iterating a map in key order is
/// iterating in insertion order. Entities are cloned on the way in and out.
pub struct InMemoryEntityStore {
    clock: Arc<dyn Clock>,
    users: RwLock<BTreeMap<UserId, User>>,
    posts: RwLock<BTreeMap<PostId, BlogPost>>,
    next_user_id: AtomicU64,
    next_post_id: AtomicU64,
}

impl InMemoryEntityStore {
    /// Create an empty store stamped by the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create an empty store with an explicit time source.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            users: RwLock::new(BTreeMap::new()),
            posts: RwLock::new(BTreeMap::new()),
            next_user_id: AtomicU64::new(1),
            next_post_id: AtomicU64::new(1),
        }
    }

    /// Number of registered users.
    pub fn user_count(&self) -> StoreResult<usize> {
        Ok(self.users()?.len())
    }

    /// Number of posts, any status.
    pub fn post_count(&self) -> StoreResult<usize> {
        Ok(self.posts()?.len())
    }

    fn users(&self) -> StoreResult<RwLockReadGuard<'_, BTreeMap<UserId, User>>> {
        self.users
            .read()
            .map_err(|e| StoreError::Poisoned(format!("users: {e}")))
    }

    fn users_mut(&self) -> StoreResult<RwLockWriteGuard<'_, BTreeMap<UserId, User>>> {
        self.users
            .write()
            .map_err(|e| StoreError::Poisoned(format!("users: {e}")))
    }

    fn posts(&self) -> StoreResult<RwLockReadGuard<'_, BTreeMap<PostId, BlogPost>>> {
        self.posts
            .read()
            .map_err(|e| StoreError::Poisoned(format!("posts: {e}")))
    }

    fn posts_mut(&self) -> StoreResult<RwLockWriteGuard<'_, BTreeMap<PostId, BlogPost>>> {
        self.posts
            .write()
            .map_err(|e| StoreError::Poisoned(format!("posts: {e}")))
    }

    fn sorted_posts<F>(&self, keep: F) -> StoreResult<Vec<BlogPost>>
    where
        F: Fn(&BlogPost) -> bool,
    {
        let posts = self.posts()?;
        let mut selected: Vec<BlogPost> = posts.values().filter(|p| keep(p)).cloned().collect();
        // Stable: equal timestamps keep id (insertion) order.
        selected.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(selected)
    }
}

impl Default for InMemoryEntityStore {
    fn default() -> Self {
        Self::new()
    }
}

fn find_by<'a>(
    users: &'a BTreeMap<UserId, User>,
    field: impl Fn(&User) -> &str,
    needle: &str,
) -> Option<&'a User> {
    users.values().find(|&u| eq_case_insensitive(field(u), needle))
}

impl EntityStore for InMemoryEntityStore {
    fn get_user(&self, id: UserId) -> StoreResult<Option<User>> {
        Ok(self.users()?.get(&id).cloned())
    }

    fn get_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let users = self.users()?;
        Ok(find_by(&users, |u| u.username.as_str(), username).cloned())
    }

    fn get_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let users = self.users()?;
        Ok(find_by(&users, |u| u.email.as_str(), email).cloned())
    }

    fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let mut users = self.users_mut()?;
        let id = UserId::new(self.next_user_id.fetch_add(1, Ordering::SeqCst));

        if find_by(&users, |u| u.username.as_str(), user.username()).is_some() {
            return Err(StoreError::Conflict {
                field: "username",
                value: user.username().to_string(),
            });
        }
        if find_by(&users, |u| u.email.as_str(), user.email()).is_some() {
            return Err(StoreError::Conflict {
                field: "email",
                value: user.email().to_string(),
            });
        }

        let user = user.into_user(id);
        users.insert(id, user.clone());
        tracing::debug!(user = %id, username = %user.username, "user created");
        Ok(user)
    }

    fn update_user(&self, id: UserId, patch: &UserPatch) -> StoreResult<User> {
        let mut users = self.users_mut()?;
        if !users.contains_key(&id) {
            return Err(StoreError::UserNotFound(id));
        }
        if let Some(email) = patch.email() {
            let taken = users
                .values()
                .any(|u| u.id != id && eq_case_insensitive(&u.email, email));
            if taken {
                return Err(StoreError::Conflict {
                    field: "email",
                    value: email.to_string(),
                });
            }
        }

        let user = users.get_mut(&id).ok_or(StoreError::UserNotFound(id))?;
        patch.apply_to(user);
        Ok(user.clone())
    }

    fn get_all_blog_posts(&self) -> StoreResult<Vec<BlogPost>> {
        self.sorted_posts(BlogPost::is_published)
    }

    fn get_blog_post(&self, id: PostId) -> StoreResult<Option<BlogPost>> {
        Ok(self.posts()?.get(&id).cloned())
    }

    fn get_blog_posts_by_author(&self, author: UserId) -> StoreResult<Vec<BlogPost>> {
        self.sorted_posts(|p| p.is_authored_by(author))
    }

    fn create_blog_post(&self, post: NewBlogPost, author: UserId) -> StoreResult<BlogPost> {
        let mut posts = self.posts_mut()?;
        let id = PostId::new(self.next_post_id.fetch_add(1, Ordering::SeqCst));
        let post = post.into_post(id, author, self.clock.now());
        posts.insert(id, post.clone());
        tracing::debug!(post = %id, author = %author, status = %post.status, "post created");
        Ok(post)
    }

    fn update_blog_post(&self, id: PostId, patch: &BlogPostPatch) -> StoreResult<BlogPost> {
        let mut posts = self.posts_mut()?;
        let post = posts.get_mut(&id).ok_or(StoreError::PostNotFound(id))?;
        patch.apply_to(post);
        // The clock may step backwards; updated_at must not.
        let floor = post.updated_at.unwrap_or(post.created_at);
        post.updated_at = Some(self.clock.now().max(floor));
        Ok(post.clone())
    }

    fn delete_blog_post(&self, id: PostId) -> StoreResult<()> {
        let mut posts = self.posts_mut()?;
        match posts.remove(&id) {
            Some(_) => {
                tracing::debug!(post = %id, "post deleted");
                Ok(())
            }
            None => Err(StoreError::PostNotFound(id)),
        }
    }

    fn increment_post_views(&self, id: PostId) -> StoreResult<()> {
        let mut posts = self.posts_mut()?;
        let post = posts.get_mut(&id).ok_or(StoreError::PostNotFound(id))?;
        post.views += 1;
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryEntityStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryEntityStore")
            .field("user_count", &self.user_count().unwrap_or_default())
            .field("post_count", &self.post_count().unwrap_or_default())
            .finish()
    }
}
