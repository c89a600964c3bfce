//! Read a consistent snapshot of the store into an export document.

use std::collections::HashMap;

use chrono::Utc;
use socialmap_core::transfer::{ExportDocument, ExportedIdea, ExportedPost};
use socialmap_core::types::DbId;

use crate::models::idea::IdeaFilter;
use crate::repositories::{IdeaRepo, ScheduledPostRepo};
use crate::DbPool;

/// Build the export document from one read-only, repeatable-read snapshot.
///
/// Ideas come newest first; each idea's posts are ordered by date.
pub async fn export_snapshot(pool: &DbPool) -> Result<ExportDocument, sqlx::Error> {
    let mut tx = pool.begin().await?;
    sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
        .execute(&mut *tx)
        .await?;

    let ideas = IdeaRepo::list(&mut *tx, &IdeaFilter::default()).await?;
    let posts = ScheduledPostRepo::list_all(&mut *tx).await?;
    tx.commit().await?;

    let mut posts_by_idea: HashMap<DbId, Vec<ExportedPost>> = HashMap::new();
    for post in posts {
        posts_by_idea
            .entry(post.idea_id)
            .or_default()
            .push(ExportedPost {
                id: post.id,
                idea_id: post.idea_id,
                date: post.date,
                description: post.description,
                status: post.status,
                created_at: post.created_at,
            });
    }

    let ideas = ideas
        .into_iter()
        .map(|item| {
            let idea = item.idea;
            ExportedIdea {
                scheduled_posts: posts_by_idea.remove(&idea.id).unwrap_or_default(),
                id: idea.id,
                title: idea.title,
                description: idea.description,
                platform: idea.platform,
                status: idea.status,
                difficulty: idea.difficulty,
                created_at: idea.created_at,
                updated_at: idea.updated_at,
                themes: item.themes,
            }
        })
        .collect::<Vec<_>>();

    tracing::debug!(ideas = ideas.len(), "Export snapshot read");
    Ok(ExportDocument::assemble(ideas, Utc::now()))
}
