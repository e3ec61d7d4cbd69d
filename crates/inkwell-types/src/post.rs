use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::clock::Timestamp;
use crate::error::TypeError;
use crate::ids::{PostId, UserId};
use crate::input::{FieldReader, RawInput, ValidationError};

pub const MIN_TITLE_CHARS: usize = 5;
pub const MIN_CONTENT_CHARS: usize = 20;
pub const MIN_CATEGORY_CHARS: usize = 1;

const TITLE_TOO_SHORT: &str = "Title must be at least 5 characters";
const CONTENT_TOO_SHORT: &str = "Content must be at least 20 characters";
const CATEGORY_MISSING: &str = "Please select a category";
const STATUS_INVALID: &str = "Invalid enum value. Expected 'published' | 'draft'";

/// Whether a post shows up in the public feed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Published,
    Draft,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Published => "published",
            Self::Draft => "draft",
        }
    }
}

impl FromStr for PostStatus {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "published" => Ok(Self::Published),
            "draft" => Ok(Self::Draft),
            other => Err(TypeError::InvalidStatus(other.to_string())),
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored blog post.
///
/// `id`, `author_id` and `created_at` never change after creation.
/// `updated_at` stays `None` until the first update.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub id: PostId,
    pub title: String,
    pub content: String,
    pub category: String,
    pub status: PostStatus,
    pub image_url: Option<String>,
    pub author_id: UserId,
    pub created_at: Timestamp,
    pub updated_at: Option<Timestamp>,
    pub views: u64,
}

impl BlogPost {
    pub fn is_published(&self) -> bool {
        self.status == PostStatus::Published
    }

    pub fn is_authored_by(&self, user: UserId) -> bool {
        self.author_id == user
    }
}

// ---------------------------------------------------------------------------
// NewBlogPost
// ---------------------------------------------------------------------------

/// A validated post creation request. The author is not part of it: the
/// store takes the author id separately, from the authenticated caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewBlogPost {
    title: String,
    content: String,
    category: String,
    status: PostStatus,
    image_url: Option<String>,
}

impl NewBlogPost {
    /// Validate a request body.
    pub fn parse(raw: RawInput<'_>) -> Result<Self, ValidationError> {
        Self::from_map(raw.object()?)
    }

    /// Build a post from typed values, applying the same rules as [`Self::parse`].
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        category: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let mut map = Map::new();
        map.insert("title".into(), Value::String(title.into()));
        map.insert("content".into(), Value::String(content.into()));
        map.insert("category".into(), Value::String(category.into()));
        Self::from_map(map)
    }

    pub fn with_status(mut self, status: PostStatus) -> Self {
        self.status = status;
        self
    }

    fn from_map(map: Map<String, Value>) -> Result<Self, ValidationError> {
        let mut reader = FieldReader::new(map);
        let title = reader.required_str("title", MIN_TITLE_CHARS, TITLE_TOO_SHORT);
        let content = reader.required_str("content", MIN_CONTENT_CHARS, CONTENT_TOO_SHORT);
        let category = reader.required_str("category", MIN_CATEGORY_CHARS, CATEGORY_MISSING);
        let status = read_status(&mut reader);
        let image_url = reader.nullable_str("imageUrl").flatten();
        reader.finish()?;

        match (title, content, category) {
            (Some(title), Some(content), Some(category)) => Ok(Self {
                title,
                content,
                category,
                status: status.unwrap_or_default(),
                image_url: non_blank(image_url),
            }),
            _ => Err(ValidationError::single("body", "Required")),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn status(&self) -> PostStatus {
        self.status
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    /// Materialize the stored entity.
    pub fn into_post(self, id: PostId, author_id: UserId, created_at: Timestamp) -> BlogPost {
        BlogPost {
            id,
            title: self.title,
            content: self.content,
            category: self.category,
            status: self.status,
            image_url: self.image_url,
            author_id,
            created_at,
            updated_at: None,
            views: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// BlogPostPatch
// ---------------------------------------------------------------------------

/// A validated partial update. Only the fields present overwrite the post.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BlogPostPatch {
    title: Option<String>,
    content: Option<String>,
    category: Option<String>,
    status: Option<PostStatus>,
    image_url: Option<Option<String>>,
}

impl BlogPostPatch {
    /// Validate a request body. Every field is optional; an empty object is a
    /// valid (no-op) patch.
    pub fn parse(raw: RawInput<'_>) -> Result<Self, ValidationError> {
        let mut reader = FieldReader::new(raw.object()?);
        let title = reader.optional_str("title", MIN_TITLE_CHARS, TITLE_TOO_SHORT);
        let content = reader.optional_str("content", MIN_CONTENT_CHARS, CONTENT_TOO_SHORT);
        let category = reader.optional_str("category", MIN_CATEGORY_CHARS, CATEGORY_MISSING);
        let status = read_status(&mut reader);
        let image_url = reader.nullable_str("imageUrl").map(non_blank);
        reader.finish()?;
        Ok(Self {
            title,
            content,
            category,
            status,
            image_url,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.category.is_none()
            && self.status.is_none()
            && self.image_url.is_none()
    }

    /// Shallow-merge into `post`. Does not touch `updated_at`.
    pub fn apply_to(&self, post: &mut BlogPost) {
        if let Some(title) = &self.title {
            post.title.clone_from(title);
        }
        if let Some(content) = &self.content {
            post.content.clone_from(content);
        }
        if let Some(category) = &self.category {
            post.category.clone_from(category);
        }
        if let Some(status) = self.status {
            post.status = status;
        }
        if let Some(image_url) = &self.image_url {
            post.image_url.clone_from(image_url);
        }
    }
}

fn read_status(reader: &mut FieldReader) -> Option<PostStatus> {
    let raw = reader.optional_str("status", 0, STATUS_INVALID)?;
    match raw.parse() {
        Ok(status) => Some(status),
        Err(_) => {
            reader.violation("status", STATUS_INVALID);
            None
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    const BODY: &str = r#"{
        "title": "Hello world",
        "content": "A post long enough to pass validation.",
        "category": "Backend"
    }"#;

    fn stored() -> BlogPost {
        NewBlogPost::parse(RawInput::from(BODY))
            .unwrap()
            .into_post(
                PostId::new(1),
                UserId::new(9),
                Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            )
    }

    #[test]
    fn new_post_defaults() {
        let post = stored();
        assert_eq!(post.status, PostStatus::Published);
        assert_eq!(post.image_url, None);
        assert_eq!(post.views, 0);
        assert_eq!(post.updated_at, None);
        assert!(post.is_authored_by(UserId::new(9)));
    }

    #[test]
    fn short_title_rejected() {
        let err = NewBlogPost::new("Hey", "A post long enough to pass validation.", "AI")
            .unwrap_err();
        assert!(err.mentions("title"));
        assert!(err.to_string().contains("Title must be at least 5 characters"));
    }

    #[test]
    fn blank_padding_does_not_count() {
        let err = NewBlogPost::new("Hello world", "A post long enough to pass validation.", " ")
            .unwrap_err();
        assert!(err.mentions("category"));

        let err = NewBlogPost::new("  Hey  ", "                    short", "AI").unwrap_err();
        assert!(err.mentions("title"));
        assert!(err.mentions("content"));

        let patch = BlogPostPatch::parse(RawInput::from(r#"{ "category": "\t \n" }"#));
        assert!(patch.unwrap_err().mentions("category"));
    }

    #[test]
    fn missing_fields_all_reported() {
        let err = NewBlogPost::parse(RawInput::from("{}")).unwrap_err();
        assert!(err.mentions("title"));
        assert!(err.mentions("content"));
        assert!(err.mentions("category"));
    }

    #[test]
    fn status_and_image_accepted() {
        let body = r#"{
            "title": "Drafty post",
            "content": "Still thinking about this one, honestly.",
            "category": "AI",
            "status": "draft",
            "imageUrl": "https://img.example/cover.png"
        }"#;
        let post = NewBlogPost::parse(RawInput::from(body)).unwrap();
        assert_eq!(post.status(), PostStatus::Draft);
        assert_eq!(post.image_url(), Some("https://img.example/cover.png"));
    }

    #[test]
    fn empty_image_url_is_absent() {
        let body = r#"{
            "title": "Hello world",
            "content": "A post long enough to pass validation.",
            "category": "Backend",
            "imageUrl": ""
        }"#;
        assert_eq!(NewBlogPost::parse(RawInput::from(body)).unwrap().image_url(), None);
    }

    #[test]
    fn unknown_status_rejected() {
        let body = r#"{
            "title": "Hello world",
            "content": "A post long enough to pass validation.",
            "category": "Backend",
            "status": "archived"
        }"#;
        let err = NewBlogPost::parse(RawInput::from(body)).unwrap_err();
        assert!(err.mentions("status"));
    }

    #[test]
    fn patch_merges_only_present_fields() {
        let mut post = stored();
        let patch = BlogPostPatch::parse(RawInput::from(
            r#"{ "status": "draft", "imageUrl": "https://img.example/a.png" }"#,
        ))
        .unwrap();
        patch.apply_to(&mut post);
        assert_eq!(post.status, PostStatus::Draft);
        assert_eq!(post.image_url.as_deref(), Some("https://img.example/a.png"));
        assert_eq!(post.title, "Hello world");

        let clear = BlogPostPatch::parse(RawInput::from(r#"{ "imageUrl": null }"#)).unwrap();
        clear.apply_to(&mut post);
        assert_eq!(post.image_url, None);
    }

    #[test]
    fn empty_patch_is_valid() {
        let patch = BlogPostPatch::parse(RawInput::from("{}")).unwrap();
        assert!(patch.is_empty());
        let status = BlogPostPatch::parse(RawInput::from(r#"{ "status": "draft" }"#)).unwrap();
        assert!(!status.is_empty());
    }

    #[test]
    fn patch_still_checks_lengths() {
        let err = BlogPostPatch::parse(RawInput::from(r#"{ "content": "too short" }"#))
            .unwrap_err();
        assert!(err.mentions("content"));
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(stored()).unwrap();
        assert_eq!(json["authorId"], 9);
        assert_eq!(json["status"], "published");
        assert!(json["imageUrl"].is_null());
        assert!(json["updatedAt"].is_null());
        assert!(json["createdAt"].as_str().unwrap().starts_with("2024-01-01T00:00:00"));
    }

    #[test]
    fn status_round_trips_through_str() {
        assert_eq!("draft".parse::<PostStatus>().unwrap(), PostStatus::Draft);
        assert_eq!(PostStatus::Published.to_string(), "published");
        assert!("Draft".parse::<PostStatus>().is_err());
    }
}
