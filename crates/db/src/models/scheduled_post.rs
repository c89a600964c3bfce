use serde::{Deserialize, Serialize};
use socialmap_core::content::PostStatus;
use socialmap_core::types::{DbId, Timestamp};
use sqlx::FromRow;
use validator::Validate;

use super::idea::Idea;

/// A row from the `scheduled_posts` table.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledPost {
    pub id: DbId,
    pub idea_id: DbId,
    pub date: Timestamp,
    pub description: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: PostStatus,
    pub created_at: Timestamp,
}

/// A scheduled post with its idea embedded, as shown on the calendar.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledPostWithIdea {
    #[serde(flatten)]
    pub post: ScheduledPost,
    pub idea: Idea,
}

/// DTO for scheduling an idea on a date.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateScheduledPost {
    pub idea_id: DbId,
    /// RFC 3339 timestamp or `YYYY-MM-DD`.
    #[validate(length(min = 1, message = "Missing fields: ideaId and date required"))]
    pub date: String,
    #[validate(length(max = 10000, message = "Description exceeds maximum length of 10000 characters"))]
    pub description: Option<String>,
    pub status: Option<PostStatus>,
}

/// DTO for editing a scheduled post. At least one field must be present.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateScheduledPost {
    pub date: Option<String>,
    #[serde(default, deserialize_with = "crate::models::present")]
    pub description: Option<Option<String>>,
    pub status: Option<PostStatus>,
}

impl UpdateScheduledPost {
    pub fn is_empty(&self) -> bool {
        self.date.as_deref().map_or(true, str::is_empty)
            && self.description.is_none()
            && self.status.is_none()
    }
}

/// Resolved column values for an update; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScheduledPostChanges {
    pub date: Option<Timestamp>,
    pub description: Option<Option<String>>,
    pub status: Option<PostStatus>,
}
