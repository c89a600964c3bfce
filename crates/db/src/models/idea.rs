use serde::{Deserialize, Serialize};
use socialmap_core::content::{IdeaStatus, Platform};
use socialmap_core::types::{DbId, Timestamp};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `ideas` table.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Idea {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    #[sqlx(try_from = "String")]
    pub platform: Platform,
    #[sqlx(try_from = "String")]
    pub status: IdeaStatus,
    pub difficulty: i16,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// An idea as returned by the list endpoint: the row plus schedule stats
/// and theme names.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct IdeaListItem {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub idea: Idea,
    pub scheduled_posts_count: i64,
    pub last_scheduled_post_date: Option<Timestamp>,
    pub themes: Vec<String>,
}

/// DTO for creating an idea.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateIdea {
    #[validate(length(min = 1, max = 500, message = "Title must be 1 to 500 characters"))]
    pub title: String,
    #[validate(length(max = 10000, message = "Description exceeds maximum length of 10000 characters"))]
    pub description: Option<String>,
    pub platform: Platform,
    pub status: Option<IdeaStatus>,
    #[validate(range(min = 1, max = 3, message = "Difficulty must be 1, 2, or 3"))]
    pub difficulty: Option<i16>,
    pub themes: Option<Vec<String>>,
}

/// DTO for a partial idea update. `description: null` clears it; an absent
/// `themes` keeps the current set.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateIdea {
    #[validate(length(min = 1, max = 500, message = "Title must be 1 to 500 characters"))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "crate::models::present")]
    pub description: Option<Option<String>>,
    pub platform: Option<Platform>,
    pub status: Option<IdeaStatus>,
    #[validate(range(min = 1, max = 3, message = "Difficulty must be 1, 2, or 3"))]
    pub difficulty: Option<i16>,
    pub themes: Option<Vec<String>>,
}

/// Filters for listing ideas. `None` means no constraint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdeaFilter {
    pub platform: Option<Platform>,
    pub status: Option<IdeaStatus>,
    pub difficulty: Option<i16>,
}
