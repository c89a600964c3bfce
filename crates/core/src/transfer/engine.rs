//! The reconciliation engine.
//!
//! Ideas are processed strictly before posts so the id-map is complete when
//! post resolution starts; pruning runs last so the keep-map reflects the
//! whole document. All state here is local to one call.

use std::collections::{HashMap, HashSet};

use crate::content::DEFAULT_DIFFICULTY;
use crate::types::{DbId, Timestamp};

use super::document::{ImportMode, ImportOptions, ImportRequest, ParsedRecord, RawIdea, RawPost};
use super::record::{parse_post_date, validate_idea, validate_post, RecordKind, SkipReason, ValidIdea};
use super::resolve::{resolve_idea, resolve_post_idea, IdMap, PostLookup};
use super::store::{IdeaChanges, ImportStore, NewIdea, NewPost, PostChanges, StoreError};
use super::summary::ImportSummary;

/// Apply an import request to `store`.
///
/// Per-record problems are skipped and reported in the summary. A
/// [`StoreError::Fatal`] stops processing immediately and is returned; the
/// caller is expected to roll back its unit of work.
pub async fn reconcile<S>(store: &mut S, request: ImportRequest) -> Result<ImportSummary, StoreError>
where
    S: ImportStore + ?Sized,
{
    let ImportRequest {
        options,
        ideas,
        posts,
    } = request;
    Reconciler::new(store, options).run(ideas, posts).await
}

enum RecordError {
    Skip(SkipReason),
    Fatal(StoreError),
}

impl From<StoreError> for RecordError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Rejected(msg) => RecordError::Skip(SkipReason::Rejected(msg)),
            fatal @ StoreError::Fatal(_) => RecordError::Fatal(fatal),
        }
    }
}

impl From<SkipReason> for RecordError {
    fn from(reason: SkipReason) -> Self {
        RecordError::Skip(reason)
    }
}

#[derive(Debug, Clone, Copy)]
enum Applied {
    Created(DbId),
    Updated(DbId),
}

impl Applied {
    fn id(self) -> DbId {
        match self {
            Applied::Created(id) | Applied::Updated(id) => id,
        }
    }
}

struct Reconciler<'a, S: ?Sized> {
    store: &'a mut S,
    options: ImportOptions,
    summary: ImportSummary,
    id_map: IdMap,
    /// Per idea, the post dates present in the document.
    keep: HashMap<DbId, HashSet<Timestamp>>,
}

impl<'a, S> Reconciler<'a, S>
where
    S: ImportStore + ?Sized,
{
    fn new(store: &'a mut S, options: ImportOptions) -> Self {
        Self {
            store,
            options,
            summary: ImportSummary::new(options.mode),
            id_map: IdMap::default(),
            keep: HashMap::new(),
        }
    }

    async fn run(
        mut self,
        ideas: Vec<ParsedRecord<RawIdea>>,
        posts: Vec<ParsedRecord<RawPost>>,
    ) -> Result<ImportSummary, StoreError> {
        if self.options.mode == ImportMode::Replace {
            let cleared = self.store.clear_all().await?;
            self.summary.deleted_posts = cleared.posts;
            self.summary.deleted_ideas = cleared.ideas;
        }

        for (index, record) in ideas.into_iter().enumerate() {
            self.import_idea(index, record).await?;
        }
        for (index, record) in posts.into_iter().enumerate() {
            self.import_post(index, record).await?;
        }

        if self.options.mode == ImportMode::Sync && self.options.prune {
            self.prune().await?;
        }

        Ok(self.summary.finish())
    }

    // -----------------------------------------------------------------------
    // Ideas
    // -----------------------------------------------------------------------

    async fn import_idea(
        &mut self,
        index: usize,
        record: ParsedRecord<RawIdea>,
    ) -> Result<(), StoreError> {
        let idea = match record.and_then(|raw| validate_idea(&raw)) {
            Ok(idea) => idea,
            Err(reason) => {
                self.skip(RecordKind::Idea, index, reason);
                return Ok(());
            }
        };

        self.store.begin_record().await?;
        match self.apply_idea(&idea).await {
            Ok(applied) => {
                self.store.commit_record().await?;
                self.id_map.insert(idea.external_id.as_ref(), applied.id());
                self.summary.idea_ids.push(applied.id());
                match applied {
                    Applied::Created(_) => self.summary.imported_ideas += 1,
                    Applied::Updated(_) => self.summary.updated_ideas += 1,
                }
                Ok(())
            }
            Err(RecordError::Skip(reason)) => {
                self.store.abort_record().await?;
                self.skip(RecordKind::Idea, index, reason);
                Ok(())
            }
            Err(RecordError::Fatal(err)) => Err(err),
        }
    }

    async fn apply_idea(&mut self, idea: &ValidIdea) -> Result<Applied, RecordError> {
        let existing = match self.options.mode {
            ImportMode::Sync => resolve_idea(&mut *self.store, idea).await?,
            ImportMode::Replace => None,
        };

        let applied = match existing {
            Some(found) => {
                let changes = IdeaChanges {
                    title: idea.title.clone(),
                    description: idea.description.clone(),
                    platform: idea.platform,
                    status: idea.status.unwrap_or(found.status),
                    difficulty: idea.difficulty.unwrap_or(found.difficulty),
                    updated_at: idea.updated_at,
                };
                self.store.update_idea(found.id, &changes).await?;
                Applied::Updated(found.id)
            }
            None => {
                let new = NewIdea {
                    title: idea.title.clone(),
                    description: idea.description.clone(),
                    platform: idea.platform,
                    status: idea.status.unwrap_or_default(),
                    difficulty: idea.difficulty.unwrap_or(DEFAULT_DIFFICULTY),
                    created_at: idea.created_at,
                    updated_at: idea.updated_at,
                };
                Applied::Created(self.store.create_idea(&new).await?)
            }
        };

        if let Some(themes) = &idea.themes {
            self.store.set_idea_themes(applied.id(), themes).await?;
        }
        Ok(applied)
    }

    // -----------------------------------------------------------------------
    // Posts
    // -----------------------------------------------------------------------

    async fn import_post(
        &mut self,
        index: usize,
        record: ParsedRecord<RawPost>,
    ) -> Result<(), StoreError> {
        let parsed = record.and_then(|raw| parse_post_date(&raw).map(|date| (raw, date)));
        let (raw, date) = match parsed {
            Ok(parsed) => parsed,
            Err(reason) => {
                self.skip(RecordKind::Post, index, reason);
                return Ok(());
            }
        };

        self.store.begin_record().await?;
        match self.apply_post(&raw, date).await {
            Ok(applied) => {
                self.store.commit_record().await?;
                match applied {
                    Applied::Created(_) => self.summary.imported_posts += 1,
                    Applied::Updated(_) => self.summary.updated_posts += 1,
                }
                Ok(())
            }
            Err(RecordError::Skip(reason)) => {
                self.store.abort_record().await?;
                self.skip(RecordKind::Post, index, reason);
                Ok(())
            }
            Err(RecordError::Fatal(err)) => Err(err),
        }
    }

    async fn apply_post(&mut self, raw: &RawPost, date: Timestamp) -> Result<Applied, RecordError> {
        let lookup = match self.options.mode {
            ImportMode::Sync => PostLookup::Full,
            ImportMode::Replace => PostLookup::SkipDirectId,
        };
        let idea_id = resolve_post_idea(&mut *self.store, raw, &self.id_map, lookup)
            .await?
            .ok_or(RecordError::Skip(SkipReason::UnresolvedIdea))?;

        // The date is kept even if the rest of the record turns out invalid.
        if self.options.mode == ImportMode::Sync {
            self.keep.entry(idea_id).or_default().insert(date);
        }

        let post = validate_post(raw, date)?;

        let existing = match self.options.mode {
            ImportMode::Sync => self.store.find_post(idea_id, date).await?,
            ImportMode::Replace => None,
        };

        match existing {
            Some(found) => {
                let changes = PostChanges {
                    description: post.description,
                    status: post.status.unwrap_or(found.status),
                };
                self.store.update_post(found.id, &changes).await?;
                Ok(Applied::Updated(found.id))
            }
            None => {
                let new = NewPost {
                    idea_id,
                    date,
                    description: post.description,
                    status: post.status.unwrap_or_default(),
                    created_at: post.created_at,
                };
                Ok(Applied::Created(self.store.create_post(&new).await?))
            }
        }
    }

    // -----------------------------------------------------------------------
    // Pruning
    // -----------------------------------------------------------------------

    async fn prune(&mut self) -> Result<(), StoreError> {
        for idea_id in self.store.list_idea_ids().await? {
            let keep: Vec<Timestamp> = self
                .keep
                .get(&idea_id)
                .map(|dates| dates.iter().copied().collect())
                .unwrap_or_default();
            self.summary.deleted_posts += self.store.prune_posts(idea_id, &keep).await?;
        }
        Ok(())
    }

    fn skip(&mut self, kind: RecordKind, index: usize, reason: SkipReason) {
        self.summary.skip(kind, index, &reason);
    }
}
