//! Integration tests for the transactional import and the export snapshot.
//!
//! Exercises sync idempotency, export round trips, whole-import rollback
//! on a fatal store error, pruning, per-record skips, and replace mode.

use async_trait::async_trait;
use serde_json::{json, Value};
use socialmap_core::content::{IdeaStatus, Platform, PostStatus};
use socialmap_core::transfer::{
    reconcile, ClearedCounts, IdeaChanges, IdeaSnapshot, ImportMode, ImportRequest, ImportStore,
    NewIdea, NewPost, PostChanges, PostSnapshot, StoreError,
};
use socialmap_core::types::{DbId, Timestamp};
use socialmap_db::export::export_snapshot;
use socialmap_db::import::{run_import, PgImportStore};
use socialmap_db::models::idea::IdeaFilter;
use socialmap_db::repositories::{IdeaRepo, ScheduledPostRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn request(body: Value) -> ImportRequest {
    ImportRequest::parse(body).unwrap()
}

fn sample_document() -> Value {
    json!({
        "ideas": [
            {
                "id": 1,
                "title": "Dune review",
                "platform": "BOOKTOK",
                "difficulty": 3,
                "themes": ["sci-fi", { "name": "classics" }],
                "scheduledPosts": [
                    { "date": "2024-06-01", "status": "READY" },
                    { "date": "2024-06-08" }
                ]
            },
            {
                "id": 2,
                "title": "Borrow checker tips",
                "platform": "DEVTOK",
                "status": "PLANNED",
                "scheduledPosts": [{ "date": "2024-06-03T18:30:00Z", "description": "part 1" }]
            }
        ]
    })
}

async fn counts(pool: &PgPool) -> (i64, i64, i64) {
    let ideas: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ideas")
        .fetch_one(pool)
        .await
        .unwrap();
    let posts: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM scheduled_posts")
        .fetch_one(pool)
        .await
        .unwrap();
    let links: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM idea_themes")
        .fetch_one(pool)
        .await
        .unwrap();
    (ideas, posts, links)
}

/// Content of every idea and post, ignoring ids and bookkeeping timestamps.
async fn content(pool: &PgPool) -> Vec<Value> {
    let ideas = IdeaRepo::list(pool, &IdeaFilter::default()).await.unwrap();
    let posts = ScheduledPostRepo::list_all(pool).await.unwrap();
    let mut out: Vec<Value> = ideas
        .into_iter()
        .map(|item| {
            let dates: Vec<String> = posts
                .iter()
                .filter(|p| p.idea_id == item.idea.id)
                .map(|p| format!("{}|{}|{:?}", p.date, p.status, p.description))
                .collect();
            json!({
                "title": item.idea.title,
                "platform": item.idea.platform,
                "status": item.idea.status,
                "difficulty": item.idea.difficulty,
                "description": item.idea.description,
                "themes": item.themes,
                "posts": dates,
            })
        })
        .collect();
    out.sort_by_key(|v| v["title"].as_str().unwrap_or_default().to_string());
    out
}

/// Delegates to a [`PgImportStore`] but fails fatally once `creates_left`
/// creations have gone through.
struct FailingStore {
    inner: PgImportStore,
    creates_left: usize,
}

impl FailingStore {
    fn tick(&mut self) -> Result<(), StoreError> {
        if self.creates_left == 0 {
            return Err(StoreError::Fatal("connection lost".into()));
        }
        self.creates_left -= 1;
        Ok(())
    }
}

#[async_trait]
impl ImportStore for FailingStore {
    async fn begin_record(&mut self) -> Result<(), StoreError> {
        self.inner.begin_record().await
    }
    async fn commit_record(&mut self) -> Result<(), StoreError> {
        self.inner.commit_record().await
    }
    async fn abort_record(&mut self) -> Result<(), StoreError> {
        self.inner.abort_record().await
    }
    async fn clear_all(&mut self) -> Result<ClearedCounts, StoreError> {
        self.inner.clear_all().await
    }
    async fn find_idea_by_id(&mut self, id: DbId) -> Result<Option<IdeaSnapshot>, StoreError> {
        self.inner.find_idea_by_id(id).await
    }
    async fn find_idea_by_title(
        &mut self,
        title: &str,
        platform: Platform,
    ) -> Result<Option<IdeaSnapshot>, StoreError> {
        self.inner.find_idea_by_title(title, platform).await
    }
    async fn create_idea(&mut self, idea: &NewIdea) -> Result<DbId, StoreError> {
        self.tick()?;
        self.inner.create_idea(idea).await
    }
    async fn update_idea(&mut self, id: DbId, changes: &IdeaChanges) -> Result<(), StoreError> {
        self.inner.update_idea(id, changes).await
    }
    async fn set_idea_themes(&mut self, idea_id: DbId, names: &[String]) -> Result<(), StoreError> {
        self.inner.set_idea_themes(idea_id, names).await
    }
    async fn find_post(
        &mut self,
        idea_id: DbId,
        date: Timestamp,
    ) -> Result<Option<PostSnapshot>, StoreError> {
        self.inner.find_post(idea_id, date).await
    }
    async fn create_post(&mut self, post: &NewPost) -> Result<DbId, StoreError> {
        self.tick()?;
        self.inner.create_post(post).await
    }
    async fn update_post(&mut self, id: DbId, changes: &PostChanges) -> Result<(), StoreError> {
        self.inner.update_post(id, changes).await
    }
    async fn list_idea_ids(&mut self) -> Result<Vec<DbId>, StoreError> {
        self.inner.list_idea_ids().await
    }
    async fn prune_posts(&mut self, idea_id: DbId, keep: &[Timestamp]) -> Result<u64, StoreError> {
        self.inner.prune_posts(idea_id, keep).await
    }
}

// ---------------------------------------------------------------------------
// Sync mode
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_sync_import_creates_everything(pool: PgPool) {
    let summary = run_import(&pool, request(sample_document())).await.unwrap();

    assert_eq!(summary.mode, ImportMode::Sync);
    assert_eq!(summary.imported_ideas, 2);
    assert_eq!(summary.imported_posts, 3);
    assert_eq!(summary.skipped_ideas + summary.skipped_posts, 0);
    assert_eq!(summary.idea_ids.len(), 2);
    assert_eq!(counts(&pool).await, (2, 3, 2));

    let dune = IdeaRepo::find_by_title(&pool, "Dune review", Platform::Booktok)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(dune.difficulty, 3);
    assert_eq!(dune.status, IdeaStatus::Idea);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_sync_import_is_idempotent(pool: PgPool) {
    run_import(&pool, request(sample_document())).await.unwrap();
    let before = content(&pool).await;

    let again = run_import(&pool, request(sample_document())).await.unwrap();

    assert_eq!(again.imported_ideas, 0);
    assert_eq!(again.imported_posts, 0);
    assert_eq!(again.updated_ideas, 2);
    assert_eq!(again.updated_posts, 3);
    assert_eq!(counts(&pool).await, (2, 3, 2));
    assert_eq!(content(&pool).await, before);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_sync_updates_post_in_place(pool: PgPool) {
    run_import(&pool, request(sample_document())).await.unwrap();

    let body = json!({
        "ideas": [{
            "title": "Dune review",
            "platform": "BOOKTOK",
            "scheduledPosts": [{ "date": "2024-06-08", "status": "POSTED", "description": "done" }]
        }]
    });
    let summary = run_import(&pool, request(body)).await.unwrap();
    assert_eq!(summary.updated_posts, 1);

    let dune = IdeaRepo::find_by_title(&pool, "Dune review", Platform::Booktok)
        .await
        .unwrap()
        .unwrap();
    // Omitted difficulty keeps the stored value.
    assert_eq!(dune.difficulty, 3);
    let posts = ScheduledPostRepo::list_all(&pool).await.unwrap();
    let updated = posts
        .iter()
        .find(|p| p.idea_id == dune.id && p.description.as_deref() == Some("done"))
        .unwrap();
    assert_eq!(updated.status, PostStatus::Posted);
    assert_eq!(counts(&pool).await.1, 3);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_sync_skips_bad_records_and_keeps_the_rest(pool: PgPool) {
    let body = json!({
        "ideas": [
            { "title": "", "platform": "DEVTOK" },
            { "title": "Good", "platform": "DEVTOK" },
            { "title": "No platform" },
            { "title": "Bad platform", "platform": "MYSPACE" }
        ],
        "scheduledPosts": [
            { "ideaTitle": "Good", "ideaPlatform": "DEVTOK", "date": "2024-07-01" },
            { "ideaTitle": "Ghost", "ideaPlatform": "DEVTOK", "date": "2024-07-01" },
            { "ideaTitle": "Good", "ideaPlatform": "DEVTOK" },
            "not an object"
        ]
    });
    let summary = run_import(&pool, request(body)).await.unwrap();

    assert_eq!(summary.imported_ideas, 1);
    assert_eq!(summary.skipped_ideas, 3);
    assert_eq!(summary.imported_posts, 1);
    assert_eq!(summary.skipped_posts, 3);
    assert_eq!(summary.skipped.len(), 6);
    assert_eq!(counts(&pool).await, (1, 1, 0));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_rejected_record_rolls_back_only_itself(pool: PgPool) {
    // Replace mode never looks up existing posts, so the second post on the
    // same date reaches the unique constraint.
    let body = json!({
        "mode": "replace",
        "ideas": [{
            "title": "Twice",
            "platform": "DEVTOK",
            "scheduledPosts": [
                { "date": "2024-06-01", "description": "first" },
                { "date": "2024-06-01", "description": "second" },
                { "date": "2024-06-02" }
            ]
        }]
    });
    let summary = run_import(&pool, request(body)).await.unwrap();

    assert_eq!(summary.imported_posts, 2);
    assert_eq!(summary.skipped_posts, 1);
    assert!(summary.skipped[0].reason.starts_with("rejected by store"));
    let posts = ScheduledPostRepo::list_all(&pool).await.unwrap();
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].description.as_deref(), Some("first"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_prune_removes_posts_missing_from_the_document(pool: PgPool) {
    run_import(&pool, request(sample_document())).await.unwrap();

    let body = json!({
        "prune": true,
        "ideas": [{
            "title": "Dune review",
            "platform": "BOOKTOK",
            "scheduledPosts": [{ "date": "2024-06-01" }]
        }]
    });
    let summary = run_import(&pool, request(body)).await.unwrap();

    // Dune loses its second date; the idea absent from the document loses
    // its only post.
    assert_eq!(summary.deleted_posts, 2);
    assert!(summary.message.ends_with("2 posts pruned."));
    assert_eq!(counts(&pool).await, (2, 1, 2));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_without_prune_nothing_is_deleted(pool: PgPool) {
    run_import(&pool, request(sample_document())).await.unwrap();

    let body = json!({ "ideas": [{ "title": "Dune review", "platform": "BOOKTOK", "scheduledPosts": [] }] });
    let summary = run_import(&pool, request(body)).await.unwrap();

    assert_eq!(summary.deleted_posts, 0);
    assert_eq!(counts(&pool).await.1, 3);
}

// ---------------------------------------------------------------------------
// Atomicity
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_fatal_error_leaves_store_untouched(pool: PgPool) {
    run_import(&pool, request(sample_document())).await.unwrap();
    let before = content(&pool).await;

    let body = json!({
        "ideas": [
            { "title": "New one", "platform": "DEVTOK" },
            { "title": "New two", "platform": "DEVTOK" }
        ]
    });
    let mut store = FailingStore {
        inner: PgImportStore::begin(&pool).await.unwrap(),
        creates_left: 1,
    };
    let err = reconcile(&mut store, request(body)).await.unwrap_err();
    assert!(matches!(err, StoreError::Fatal(_)));
    drop(store);

    assert_eq!(counts(&pool).await, (2, 3, 2));
    assert_eq!(content(&pool).await, before);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_replace_failure_restores_previous_data(pool: PgPool) {
    run_import(&pool, request(sample_document())).await.unwrap();

    let body = json!({
        "mode": "replace",
        "ideas": [{ "title": "Only", "platform": "DEVTOK" }]
    });
    let mut store = FailingStore {
        inner: PgImportStore::begin(&pool).await.unwrap(),
        creates_left: 0,
    };
    assert!(reconcile(&mut store, request(body)).await.is_err());
    drop(store);

    assert_eq!(counts(&pool).await, (2, 3, 2));
}

// ---------------------------------------------------------------------------
// Replace mode
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_replace_wipes_then_loads(pool: PgPool) {
    run_import(&pool, request(sample_document())).await.unwrap();

    let body = json!({
        "mode": "replace",
        "ideas": [{
            "id": 77,
            "title": "Fresh start",
            "platform": "DEVTOK",
            "scheduledPosts": [{ "date": "2024-09-01" }]
        }]
    });
    let summary = run_import(&pool, request(body)).await.unwrap();

    assert_eq!(summary.mode, ImportMode::Replace);
    assert_eq!(summary.deleted_ideas, 2);
    assert_eq!(summary.deleted_posts, 3);
    assert_eq!(summary.imported_ideas, 1);
    assert_eq!(summary.imported_posts, 1);
    assert!(summary.message.starts_with("Import replaced DB"));
    assert_eq!(counts(&pool).await, (1, 1, 0));
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_export_nests_and_flattens_posts(pool: PgPool) {
    run_import(&pool, request(sample_document())).await.unwrap();

    let doc = export_snapshot(&pool).await.unwrap();
    assert_eq!(doc.version, "1.0");
    assert_eq!(doc.ideas.len(), 2);
    assert_eq!(doc.scheduled_posts.len(), 3);

    let dune = doc.ideas.iter().find(|i| i.title == "Dune review").unwrap();
    assert_eq!(dune.scheduled_posts.len(), 2);
    assert!(dune.scheduled_posts[0].date < dune.scheduled_posts[1].date);
    assert_eq!(dune.themes, vec!["classics", "sci-fi"]);

    let value = serde_json::to_value(&doc).unwrap();
    assert!(value["exportedAt"].is_string());
    assert!(value["scheduledPosts"][0]["ideaTitle"].is_string());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_export_then_replace_import_round_trips(pool: PgPool) {
    run_import(&pool, request(sample_document())).await.unwrap();
    let before = content(&pool).await;

    let doc = serde_json::to_value(export_snapshot(&pool).await.unwrap()).unwrap();
    let mut body = doc.clone();
    body["mode"] = json!("replace");
    run_import(&pool, request(body)).await.unwrap();
    assert_eq!(content(&pool).await, before);

    // Sync import of the fresh export changes nothing either.
    let doc = serde_json::to_value(export_snapshot(&pool).await.unwrap()).unwrap();
    let summary = run_import(&pool, request(doc)).await.unwrap();
    assert_eq!(summary.imported_ideas + summary.imported_posts, 0);
    assert_eq!(content(&pool).await, before);
}
