//! Repository for the `scheduled_posts` table.

use socialmap_core::content::{IdeaStatus, Platform};
use socialmap_core::transfer::{NewPost, PostChanges};
use socialmap_core::types::{DbId, Timestamp};
use sqlx::{Executor, FromRow, Postgres};

use crate::models::idea::Idea;
use crate::models::scheduled_post::{ScheduledPost, ScheduledPostChanges, ScheduledPostWithIdea};

/// Column list for scheduled_posts queries.
const COLUMNS: &str = "id, idea_id, date, description, status, created_at";

/// Post columns plus the owning idea's columns under an `idea_` prefix.
const CALENDAR_SELECT: &str = "SELECT sp.id, sp.idea_id, sp.date, sp.description, sp.status, \
        sp.created_at, i.title AS idea_title, i.description AS idea_description, \
        i.platform AS idea_platform, i.status AS idea_status, i.difficulty AS idea_difficulty, \
        i.created_at AS idea_created_at, i.updated_at AS idea_updated_at \
     FROM scheduled_posts sp \
     JOIN ideas i ON i.id = sp.idea_id";

#[derive(FromRow)]
struct CalendarRow {
    #[sqlx(flatten)]
    post: ScheduledPost,
    idea_title: String,
    idea_description: Option<String>,
    #[sqlx(try_from = "String")]
    idea_platform: Platform,
    #[sqlx(try_from = "String")]
    idea_status: IdeaStatus,
    idea_difficulty: i16,
    idea_created_at: Timestamp,
    idea_updated_at: Timestamp,
}

impl From<CalendarRow> for ScheduledPostWithIdea {
    fn from(row: CalendarRow) -> Self {
        let idea = Idea {
            id: row.post.idea_id,
            title: row.idea_title,
            description: row.idea_description,
            platform: row.idea_platform,
            status: row.idea_status,
            difficulty: row.idea_difficulty,
            created_at: row.idea_created_at,
            updated_at: row.idea_updated_at,
        };
        ScheduledPostWithIdea {
            post: row.post,
            idea,
        }
    }
}

/// Provides CRUD operations for scheduled posts.
pub struct ScheduledPostRepo;

impl ScheduledPostRepo {
    /// Insert a post. Fails with a unique violation on
    /// `uq_scheduled_posts_idea_date` if the idea is already on that date.
    pub async fn create<'e, E>(executor: E, input: &NewPost) -> Result<ScheduledPost, sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query = format!(
            "INSERT INTO scheduled_posts (idea_id, date, description, status, created_at)
             VALUES ($1, $2, $3, $4, COALESCE($5, NOW()))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ScheduledPost>(&query)
            .bind(input.idea_id)
            .bind(input.date)
            .bind(&input.description)
            .bind(input.status.as_str())
            .bind(input.created_at)
            .fetch_one(executor)
            .await
    }

    /// Find by the `(idea_id, date)` natural key.
    pub async fn find_by_idea_and_date<'e, E>(
        executor: E,
        idea_id: DbId,
        date: Timestamp,
    ) -> Result<Option<ScheduledPost>, sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query =
            format!("SELECT {COLUMNS} FROM scheduled_posts WHERE idea_id = $1 AND date = $2");
        sqlx::query_as::<_, ScheduledPost>(&query)
            .bind(idea_id)
            .bind(date)
            .fetch_optional(executor)
            .await
    }

    /// All posts with their ideas, earliest date first.
    pub async fn list_with_ideas<'e, E>(
        executor: E,
    ) -> Result<Vec<ScheduledPostWithIdea>, sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query = format!("{CALENDAR_SELECT} ORDER BY sp.date ASC, sp.id ASC");
        let rows = sqlx::query_as::<_, CalendarRow>(&query)
            .fetch_all(executor)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn find_with_idea<'e, E>(
        executor: E,
        id: DbId,
    ) -> Result<Option<ScheduledPostWithIdea>, sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query = format!("{CALENDAR_SELECT} WHERE sp.id = $1");
        let row = sqlx::query_as::<_, CalendarRow>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(row.map(Into::into))
    }

    /// All posts ordered by idea then date, for building exports.
    pub async fn list_all<'e, E>(executor: E) -> Result<Vec<ScheduledPost>, sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query = format!("SELECT {COLUMNS} FROM scheduled_posts ORDER BY idea_id, date, id");
        sqlx::query_as::<_, ScheduledPost>(&query)
            .fetch_all(executor)
            .await
    }

    /// Apply an edit. Returns `None` if the post does not exist.
    pub async fn update<'e, E>(
        executor: E,
        id: DbId,
        changes: &ScheduledPostChanges,
    ) -> Result<Option<ScheduledPost>, sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let query = format!(
            "UPDATE scheduled_posts SET
                date = COALESCE($2, date),
                description = CASE WHEN $3 THEN $4 ELSE description END,
                status = COALESCE($5, status)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ScheduledPost>(&query)
            .bind(id)
            .bind(changes.date)
            .bind(changes.description.is_some())
            .bind(changes.description.clone().flatten())
            .bind(changes.status.map(|s| s.as_str()))
            .fetch_optional(executor)
            .await
    }

    /// Overwrite description and status, as a sync import does.
    pub async fn replace_content<'e, E>(
        executor: E,
        id: DbId,
        changes: &PostChanges,
    ) -> Result<bool, sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result =
            sqlx::query("UPDATE scheduled_posts SET description = $2, status = $3 WHERE id = $1")
                .bind(id)
                .bind(&changes.description)
                .bind(changes.status.as_str())
                .execute(executor)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete<'e, E>(executor: E, id: DbId) -> Result<bool, sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM scheduled_posts WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_all<'e, E>(executor: E) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM scheduled_posts")
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    /// Delete an idea's posts whose date is not in `keep`. An empty `keep`
    /// deletes all of them.
    pub async fn delete_for_idea_except<'e, E>(
        executor: E,
        idea_id: DbId,
        keep: &[Timestamp],
    ) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "DELETE FROM scheduled_posts WHERE idea_id = $1 AND NOT (date = ANY($2))",
        )
        .bind(idea_id)
        .bind(keep)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }
}
