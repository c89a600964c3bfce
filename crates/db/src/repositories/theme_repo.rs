//! Repository for the `themes` and `idea_themes` tables.

use socialmap_core::types::DbId;
use sqlx::{Executor, PgConnection, Postgres};

use crate::models::theme::ThemeUsage;

pub struct ThemeRepo;

impl ThemeRepo {
    /// All themes ordered by name, with the number of ideas using each.
    pub async fn list_with_usage<'e, E>(executor: E) -> Result<Vec<ThemeUsage>, sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, ThemeUsage>(
            "SELECT t.id, t.name, COUNT(it.idea_id) AS usage_count
             FROM themes t
             LEFT JOIN idea_themes it ON it.theme_id = t.id
             GROUP BY t.id, t.name
             ORDER BY t.name",
        )
        .fetch_all(executor)
        .await
    }

    /// Replace the theme set of an idea, upserting themes by name.
    ///
    /// `names` must already be sanitised. Runs several statements, so pass a
    /// connection that is inside a transaction.
    pub async fn set_for_idea(
        conn: &mut PgConnection,
        idea_id: DbId,
        names: &[String],
    ) -> Result<(), sqlx::Error> {
        if !names.is_empty() {
            sqlx::query(
                "INSERT INTO themes (name)
                 SELECT UNNEST($1::text[])
                 ON CONFLICT ON CONSTRAINT uq_themes_name DO NOTHING",
            )
            .bind(names)
            .execute(&mut *conn)
            .await?;
        }

        sqlx::query("DELETE FROM idea_themes WHERE idea_id = $1")
            .bind(idea_id)
            .execute(&mut *conn)
            .await?;

        if !names.is_empty() {
            sqlx::query(
                "INSERT INTO idea_themes (idea_id, theme_id)
                 SELECT $1, id FROM themes WHERE name = ANY($2)",
            )
            .bind(idea_id)
            .bind(names)
            .execute(&mut *conn)
            .await?;
        }
        Ok(())
    }
}
