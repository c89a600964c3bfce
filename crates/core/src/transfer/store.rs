//! The storage seam the reconciliation engine runs against.

use async_trait::async_trait;

use crate::content::{IdeaStatus, Platform, PostStatus};
use crate::types::{DbId, Timestamp};

/// Failure reported by an [`ImportStore`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The store refused this one record (constraint or data error). The
    /// record is rolled back and skipped; the import carries on.
    #[error("record rejected: {0}")]
    Rejected(String),

    /// The store itself failed. The whole import is rolled back.
    #[error("store failure: {0}")]
    Fatal(String),
}

/// The stored fields of an idea the engine needs when merging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdeaSnapshot {
    pub id: DbId,
    pub status: IdeaStatus,
    pub difficulty: i16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostSnapshot {
    pub id: DbId,
    pub status: PostStatus,
}

/// Rows removed by a replace-mode wipe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClearedCounts {
    pub posts: u64,
    pub ideas: u64,
}

/// An idea to insert. Missing timestamps default to now.
#[derive(Debug, Clone, PartialEq)]
pub struct NewIdea {
    pub title: String,
    pub description: Option<String>,
    pub platform: Platform,
    pub status: IdeaStatus,
    pub difficulty: i16,
    pub created_at: Option<Timestamp>,
    pub updated_at: Option<Timestamp>,
}

/// Full replacement of an idea's mutable fields. `updated_at` of `None`
/// means now.
#[derive(Debug, Clone, PartialEq)]
pub struct IdeaChanges {
    pub title: String,
    pub description: Option<String>,
    pub platform: Platform,
    pub status: IdeaStatus,
    pub difficulty: i16,
    pub updated_at: Option<Timestamp>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPost {
    pub idea_id: DbId,
    pub date: Timestamp,
    pub description: Option<String>,
    pub status: PostStatus,
    pub created_at: Option<Timestamp>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PostChanges {
    pub description: Option<String>,
    pub status: PostStatus,
}

/// Store operations used by an import.
///
/// Every call happens inside one outer unit of work owned by the caller.
/// `begin_record` / `commit_record` / `abort_record` bracket a single
/// imported record so a rejected record can be undone without losing the
/// work done for the records before it.
#[async_trait]
pub trait ImportStore: Send {
    async fn begin_record(&mut self) -> Result<(), StoreError>;
    async fn commit_record(&mut self) -> Result<(), StoreError>;
    async fn abort_record(&mut self) -> Result<(), StoreError>;

    /// Delete every scheduled post, then every idea.
    async fn clear_all(&mut self) -> Result<ClearedCounts, StoreError>;

    async fn find_idea_by_id(&mut self, id: DbId) -> Result<Option<IdeaSnapshot>, StoreError>;

    /// Natural-key lookup. With duplicates, the lowest id wins.
    async fn find_idea_by_title(
        &mut self,
        title: &str,
        platform: Platform,
    ) -> Result<Option<IdeaSnapshot>, StoreError>;

    async fn create_idea(&mut self, idea: &NewIdea) -> Result<DbId, StoreError>;
    async fn update_idea(&mut self, id: DbId, changes: &IdeaChanges) -> Result<(), StoreError>;

    /// Replace the idea's theme set, creating themes by name as needed.
    async fn set_idea_themes(&mut self, idea_id: DbId, names: &[String])
        -> Result<(), StoreError>;

    async fn find_post(
        &mut self,
        idea_id: DbId,
        date: Timestamp,
    ) -> Result<Option<PostSnapshot>, StoreError>;

    async fn create_post(&mut self, post: &NewPost) -> Result<DbId, StoreError>;
    async fn update_post(&mut self, id: DbId, changes: &PostChanges) -> Result<(), StoreError>;

    async fn list_idea_ids(&mut self) -> Result<Vec<DbId>, StoreError>;

    /// Delete the idea's posts whose date is not in `keep`. Returns the
    /// number of rows removed.
    async fn prune_posts(&mut self, idea_id: DbId, keep: &[Timestamp]) -> Result<u64, StoreError>;
}
