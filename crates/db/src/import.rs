//! PostgreSQL side of an import: the [`ImportStore`] implementation and the
//! transactional entry point.
//!
//! The whole import runs in one transaction. Each record is wrapped in a
//! savepoint so a record the database refuses can be rolled back on its own
//! while the records before it stay applied.

use async_trait::async_trait;
use socialmap_core::content::Platform;
use socialmap_core::transfer::{
    reconcile, ClearedCounts, IdeaChanges, IdeaSnapshot, ImportRequest, ImportStore,
    ImportSummary, NewIdea, NewPost, PostChanges, PostSnapshot, StoreError,
};
use socialmap_core::types::{DbId, Timestamp};
use sqlx::{Postgres, Transaction};

use crate::models::idea::Idea;
use crate::repositories::{IdeaRepo, ScheduledPostRepo, ThemeRepo};
use crate::DbPool;

/// Map a sqlx error onto the import failure classes.
///
/// SQLSTATE class 22 (data exception) and 23 (integrity constraint
/// violation) concern one record; anything else is fatal.
pub fn store_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if let Some(code) = db_err.code() {
            if code.starts_with("22") || code.starts_with("23") {
                return StoreError::Rejected(db_err.message().to_string());
            }
        }
    }
    StoreError::Fatal(err.to_string())
}

fn snapshot(idea: Idea) -> IdeaSnapshot {
    IdeaSnapshot {
        id: idea.id,
        status: idea.status,
        difficulty: idea.difficulty,
    }
}

/// An [`ImportStore`] over an open transaction.
///
/// Dropping it without calling [`PgImportStore::commit`] rolls everything
/// back.
pub struct PgImportStore {
    tx: Transaction<'static, Postgres>,
}

impl PgImportStore {
    pub async fn begin(pool: &DbPool) -> Result<Self, StoreError> {
        let tx = pool.begin().await.map_err(|e| StoreError::Fatal(e.to_string()))?;
        Ok(Self { tx })
    }

    pub async fn commit(self) -> Result<(), StoreError> {
        self.tx
            .commit()
            .await
            .map_err(|e| StoreError::Fatal(e.to_string()))
    }

    async fn exec(&mut self, sql: &str) -> Result<(), StoreError> {
        sqlx::query(sql)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| StoreError::Fatal(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl ImportStore for PgImportStore {
    async fn begin_record(&mut self) -> Result<(), StoreError> {
        self.exec("SAVEPOINT import_record").await
    }

    async fn commit_record(&mut self) -> Result<(), StoreError> {
        self.exec("RELEASE SAVEPOINT import_record").await
    }

    async fn abort_record(&mut self) -> Result<(), StoreError> {
        self.exec("ROLLBACK TO SAVEPOINT import_record").await?;
        self.exec("RELEASE SAVEPOINT import_record").await
    }

    async fn clear_all(&mut self) -> Result<ClearedCounts, StoreError> {
        let posts = ScheduledPostRepo::delete_all(&mut *self.tx)
            .await
            .map_err(store_error)?;
        let ideas = IdeaRepo::delete_all(&mut *self.tx)
            .await
            .map_err(store_error)?;
        Ok(ClearedCounts { posts, ideas })
    }

    async fn find_idea_by_id(&mut self, id: DbId) -> Result<Option<IdeaSnapshot>, StoreError> {
        let idea = IdeaRepo::find_by_id(&mut *self.tx, id)
            .await
            .map_err(store_error)?;
        Ok(idea.map(snapshot))
    }

    async fn find_idea_by_title(
        &mut self,
        title: &str,
        platform: Platform,
    ) -> Result<Option<IdeaSnapshot>, StoreError> {
        let idea = IdeaRepo::find_by_title(&mut *self.tx, title, platform)
            .await
            .map_err(store_error)?;
        Ok(idea.map(snapshot))
    }

    async fn create_idea(&mut self, idea: &NewIdea) -> Result<DbId, StoreError> {
        let created = IdeaRepo::create(&mut *self.tx, idea)
            .await
            .map_err(store_error)?;
        Ok(created.id)
    }

    async fn update_idea(&mut self, id: DbId, changes: &IdeaChanges) -> Result<(), StoreError> {
        let found = IdeaRepo::replace(&mut *self.tx, id, changes)
            .await
            .map_err(store_error)?;
        if found {
            Ok(())
        } else {
            Err(StoreError::Rejected(format!("idea {id} no longer exists")))
        }
    }

    async fn set_idea_themes(
        &mut self,
        idea_id: DbId,
        names: &[String],
    ) -> Result<(), StoreError> {
        ThemeRepo::set_for_idea(&mut self.tx, idea_id, names)
            .await
            .map_err(store_error)
    }

    async fn find_post(
        &mut self,
        idea_id: DbId,
        date: Timestamp,
    ) -> Result<Option<PostSnapshot>, StoreError> {
        let post = ScheduledPostRepo::find_by_idea_and_date(&mut *self.tx, idea_id, date)
            .await
            .map_err(store_error)?;
        Ok(post.map(|p| PostSnapshot {
            id: p.id,
            status: p.status,
        }))
    }

    async fn create_post(&mut self, post: &NewPost) -> Result<DbId, StoreError> {
        let created = ScheduledPostRepo::create(&mut *self.tx, post)
            .await
            .map_err(store_error)?;
        Ok(created.id)
    }

    async fn update_post(&mut self, id: DbId, changes: &PostChanges) -> Result<(), StoreError> {
        let found = ScheduledPostRepo::replace_content(&mut *self.tx, id, changes)
            .await
            .map_err(store_error)?;
        if found {
            Ok(())
        } else {
            Err(StoreError::Rejected(format!("post {id} no longer exists")))
        }
    }

    async fn list_idea_ids(&mut self) -> Result<Vec<DbId>, StoreError> {
        IdeaRepo::list_ids(&mut *self.tx)
            .await
            .map_err(store_error)
    }

    async fn prune_posts(&mut self, idea_id: DbId, keep: &[Timestamp]) -> Result<u64, StoreError> {
        ScheduledPostRepo::delete_for_idea_except(&mut *self.tx, idea_id, keep)
            .await
            .map_err(store_error)
    }
}

/// Run an import in a single transaction.
///
/// Returns the summary once committed. On any fatal error the transaction
/// is rolled back and the store is left exactly as it was.
pub async fn run_import(
    pool: &DbPool,
    request: ImportRequest,
) -> Result<ImportSummary, StoreError> {
    let mode = request.options.mode;
    let mut store = PgImportStore::begin(pool).await?;

    let summary = match reconcile(&mut store, request).await {
        Ok(summary) => summary,
        Err(err) => {
            tracing::warn!(mode = mode.as_str(), error = %err, "Import aborted, rolling back");
            return Err(err);
        }
    };
    store.commit().await?;

    for skipped in &summary.skipped {
        tracing::debug!(
            kind = ?skipped.kind,
            index = skipped.index,
            reason = %skipped.reason,
            "Import record skipped"
        );
    }
    tracing::info!(
        mode = mode.as_str(),
        imported_ideas = summary.imported_ideas,
        updated_ideas = summary.updated_ideas,
        skipped_ideas = summary.skipped_ideas,
        imported_posts = summary.imported_posts,
        updated_posts = summary.updated_posts,
        skipped_posts = summary.skipped_posts,
        deleted_posts = summary.deleted_posts,
        deleted_ideas = summary.deleted_ideas,
        "Import committed"
    );
    Ok(summary)
}
