//! Identity resolution: map imported records onto stored ideas.

use std::collections::HashMap;

use crate::content::Platform;
use crate::types::DbId;

use super::document::{ExternalId, RawPost};
use super::record::ValidIdea;
use super::store::{IdeaSnapshot, ImportStore, StoreError};

/// Import-local map from an idea's external id to the local id it was
/// created as or matched to.
#[derive(Debug, Default)]
pub struct IdMap(HashMap<String, DbId>);

impl IdMap {
    pub fn insert(&mut self, external: Option<&ExternalId>, local: DbId) {
        if let Some(key) = external.and_then(ExternalId::key) {
            self.0.insert(key, local);
        }
    }

    pub fn get(&self, external: &ExternalId) -> Option<DbId> {
        external.key().and_then(|key| self.0.get(&key).copied())
    }
}

/// How far post resolution may look.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostLookup {
    /// id-map, then the raw `ideaId` as a local id, then the natural key.
    Full,
    /// id-map, then the natural key. Used after a replace wipe, where old
    /// local ids are meaningless.
    SkipDirectId,
}

/// Match an imported idea: by local id when it names an existing row,
/// otherwise by `(title, platform)`.
pub async fn resolve_idea<S>(store: &mut S, idea: &ValidIdea) -> Result<Option<IdeaSnapshot>, StoreError>
where
    S: ImportStore + ?Sized,
{
    if let Some(id) = idea.external_id.as_ref().and_then(ExternalId::as_local) {
        if let Some(found) = store.find_idea_by_id(id).await? {
            return Ok(Some(found));
        }
    }
    store.find_idea_by_title(&idea.title, idea.platform).await
}

/// Find the local idea an imported post belongs to.
pub async fn resolve_post_idea<S>(
    store: &mut S,
    post: &RawPost,
    id_map: &IdMap,
    lookup: PostLookup,
) -> Result<Option<DbId>, StoreError>
where
    S: ImportStore + ?Sized,
{
    if let Some(external) = &post.idea_id {
        if let Some(mapped) = id_map.get(external) {
            return Ok(Some(mapped));
        }
        if lookup == PostLookup::Full {
            if let Some(id) = external.as_local() {
                if let Some(found) = store.find_idea_by_id(id).await? {
                    return Ok(Some(found.id));
                }
            }
        }
    }

    let (Some(title), Some(platform)) = (post.idea_title.as_deref(), post.idea_platform.as_deref())
    else {
        return Ok(None);
    };
    if title.is_empty() {
        return Ok(None);
    }
    // An unknown platform cannot match anything stored.
    let Ok(platform) = platform.parse::<Platform>() else {
        return Ok(None);
    };
    Ok(store
        .find_idea_by_title(title, platform)
        .await?
        .map(|found| found.id))
}
