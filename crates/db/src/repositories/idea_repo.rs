//! Repository for the `ideas` table.

use socialmap_core::content::Platform;
use socialmap_core::transfer::{IdeaChanges, NewIdea};
use socialmap_core::types::DbId;
use sqlx::{Executor, Postgres};

use crate::models::idea::{Idea, IdeaFilter, IdeaListItem, UpdateIdea};

/// Column list for ideas queries.
const COLUMNS: &str =
    "id, title, description, platform, status, difficulty, created_at, updated_at";

/// Idea columns plus list statistics, selected from `ideas i`.
const LIST_SELECT: &str = "SELECT i.id, i.title, i.description, i.platform, i.status, \
        i.difficulty, i.created_at, i.updated_at, \
        (SELECT COUNT(*) FROM scheduled_posts sp WHERE sp.idea_id = i.id) AS scheduled_posts_count, \
        (SELECT MAX(sp.date) FROM scheduled_posts sp WHERE sp.idea_id = i.id) AS last_scheduled_post_date, \
        ARRAY(SELECT t.name FROM idea_themes it JOIN themes t ON t.id = it.theme_id \
              WHERE it.idea_id = i.id ORDER BY t.name) AS themes \
     FROM ideas i";

/// Provides CRUD operations for ideas.
pub struct IdeaRepo;

impl IdeaRepo {
    /// Insert an idea. Missing timestamps default to now.
    pub async fn create<'e, E>(executor: E, input: &NewIdea) -> Result<Idea, sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query = format!(
            "INSERT INTO ideas (title, description, platform, status, difficulty, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, COALESCE($6, NOW()), COALESCE($7, NOW()))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Idea>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.platform.as_str())
            .bind(input.status.as_str())
            .bind(input.difficulty)
            .bind(input.created_at)
            .bind(input.updated_at)
            .fetch_one(executor)
            .await
    }

    pub async fn find_by_id<'e, E>(executor: E, id: DbId) -> Result<Option<Idea>, sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query = format!("SELECT {COLUMNS} FROM ideas WHERE id = $1");
        sqlx::query_as::<_, Idea>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Find by natural key. Titles are not unique, so the oldest row wins.
    pub async fn find_by_title<'e, E>(
        executor: E,
        title: &str,
        platform: Platform,
    ) -> Result<Option<Idea>, sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query = format!(
            "SELECT {COLUMNS} FROM ideas
             WHERE title = $1 AND platform = $2
             ORDER BY id
             LIMIT 1"
        );
        sqlx::query_as::<_, Idea>(&query)
            .bind(title)
            .bind(platform.as_str())
            .fetch_optional(executor)
            .await
    }

    /// List ideas newest first, with post counts and theme names.
    pub async fn list<'e, E>(
        executor: E,
        filter: &IdeaFilter,
    ) -> Result<Vec<IdeaListItem>, sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query = format!(
            "{LIST_SELECT}
             WHERE ($1::text IS NULL OR i.platform = $1)
               AND ($2::text IS NULL OR i.status = $2)
               AND ($3::smallint IS NULL OR i.difficulty = $3)
             ORDER BY i.created_at DESC, i.id DESC"
        );
        sqlx::query_as::<_, IdeaListItem>(&query)
            .bind(filter.platform.map(Platform::as_str))
            .bind(filter.status.map(|s| s.as_str()))
            .bind(filter.difficulty)
            .fetch_all(executor)
            .await
    }

    /// Fetch one idea in list form.
    pub async fn find_listed<'e, E>(
        executor: E,
        id: DbId,
    ) -> Result<Option<IdeaListItem>, sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query = format!("{LIST_SELECT} WHERE i.id = $1");
        sqlx::query_as::<_, IdeaListItem>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Apply a partial update. Returns `None` if the idea does not exist.
    pub async fn update<'e, E>(
        executor: E,
        id: DbId,
        input: &UpdateIdea,
    ) -> Result<Option<Idea>, sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query = format!(
            "UPDATE ideas SET
                title = COALESCE($2, title),
                description = CASE WHEN $3 THEN $4 ELSE description END,
                platform = COALESCE($5, platform),
                status = COALESCE($6, status),
                difficulty = COALESCE($7, difficulty),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let description = input
            .description
            .clone()
            .flatten()
            .filter(|d| !d.is_empty());
        sqlx::query_as::<_, Idea>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(input.description.is_some())
            .bind(description)
            .bind(input.platform.map(Platform::as_str))
            .bind(input.status.map(|s| s.as_str()))
            .bind(input.difficulty)
            .fetch_optional(executor)
            .await
    }

    /// Overwrite every mutable field. `updated_at` of `None` means now.
    pub async fn replace<'e, E>(
        executor: E,
        id: DbId,
        changes: &IdeaChanges,
    ) -> Result<bool, sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "UPDATE ideas SET
                title = $2,
                description = $3,
                platform = $4,
                status = $5,
                difficulty = $6,
                updated_at = COALESCE($7, NOW())
             WHERE id = $1",
        )
        .bind(id)
        .bind(&changes.title)
        .bind(&changes.description)
        .bind(changes.platform.as_str())
        .bind(changes.status.as_str())
        .bind(changes.difficulty)
        .bind(changes.updated_at)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete an idea; its scheduled posts and theme links cascade.
    pub async fn delete<'e, E>(executor: E, id: DbId) -> Result<bool, sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM ideas WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_all<'e, E>(executor: E) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM ideas").execute(executor).await?;
        Ok(result.rows_affected())
    }

    pub async fn list_ids<'e, E>(executor: E) -> Result<Vec<DbId>, sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_scalar("SELECT id FROM ideas ORDER BY id")
            .fetch_all(executor)
            .await
    }
}
