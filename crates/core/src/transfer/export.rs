//! The versioned export document.

use serde::{Deserialize, Serialize};

use crate::content::{IdeaStatus, Platform, PostStatus};
use crate::types::{DbId, Timestamp};

/// Format version written into every export.
pub const EXPORT_VERSION: &str = "1.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedPost {
    pub id: DbId,
    pub idea_id: DbId,
    pub date: Timestamp,
    pub description: Option<String>,
    pub status: PostStatus,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedIdea {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub platform: Platform,
    pub status: IdeaStatus,
    pub difficulty: i16,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    /// Theme names, sorted.
    pub themes: Vec<String>,
    pub scheduled_posts: Vec<ExportedPost>,
}

/// A post in the top-level list. It repeats its idea's natural key so a
/// later import can match it even where ids differ.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlattenedPost {
    #[serde(flatten)]
    pub post: ExportedPost,
    pub idea_title: String,
    pub idea_platform: Platform,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub version: String,
    pub exported_at: Timestamp,
    pub ideas: Vec<ExportedIdea>,
    pub scheduled_posts: Vec<FlattenedPost>,
}

impl ExportDocument {
    /// Build the document from ideas with their posts already nested. The
    /// flattened list follows idea order, then each idea's post order.
    pub fn assemble(ideas: Vec<ExportedIdea>, exported_at: Timestamp) -> Self {
        let scheduled_posts = ideas
            .iter()
            .flat_map(|idea| {
                idea.scheduled_posts.iter().map(|post| FlattenedPost {
                    post: post.clone(),
                    idea_title: idea.title.clone(),
                    idea_platform: idea.platform,
                })
            })
            .collect();

        Self {
            version: EXPORT_VERSION.to_string(),
            exported_at,
            ideas,
            scheduled_posts,
        }
    }
}
