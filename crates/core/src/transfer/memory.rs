//! In-memory [`ImportStore`] for engine tests.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use chrono::Utc;

use crate::content::{IdeaStatus, Platform, PostStatus};
use crate::types::{DbId, Timestamp};

use super::store::{
    ClearedCounts, IdeaChanges, IdeaSnapshot, ImportStore, NewIdea, NewPost, PostChanges,
    PostSnapshot, StoreError,
};

#[derive(Debug, Clone, PartialEq)]
pub struct MemIdea {
    pub title: String,
    pub description: Option<String>,
    pub platform: Platform,
    pub status: IdeaStatus,
    pub difficulty: i16,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub themes: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemPost {
    pub idea_id: DbId,
    pub date: Timestamp,
    pub description: Option<String>,
    pub status: PostStatus,
}

#[derive(Debug, Clone, Default)]
struct State {
    ideas: BTreeMap<DbId, MemIdea>,
    posts: BTreeMap<DbId, MemPost>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: State,
    next_id: DbId,
    savepoints: Vec<State>,
    rejected_themes: BTreeSet<String>,
    creates_left: Option<usize>,
}

impl MemoryStore {
    fn allocate(&mut self) -> DbId {
        self.next_id += 1;
        self.next_id
    }

    fn count_create(&mut self) -> Result<(), StoreError> {
        match self.creates_left.as_mut() {
            Some(0) => Err(StoreError::Fatal("connection lost".into())),
            Some(left) => {
                *left -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }

    // -- test setup ----------------------------------------------------------

    pub fn seed_idea(
        &mut self,
        title: &str,
        platform: Platform,
        status: IdeaStatus,
        difficulty: i16,
    ) -> DbId {
        let id = self.allocate();
        let now = Utc::now();
        self.state.ideas.insert(
            id,
            MemIdea {
                title: title.to_string(),
                description: None,
                platform,
                status,
                difficulty,
                created_at: now,
                updated_at: now,
                themes: BTreeSet::new(),
            },
        );
        id
    }

    pub fn seed_post(&mut self, idea_id: DbId, date: Timestamp, status: PostStatus) -> DbId {
        let id = self.allocate();
        self.state.posts.insert(
            id,
            MemPost {
                idea_id,
                date,
                description: None,
                status,
            },
        );
        id
    }

    pub fn set_themes(&mut self, idea_id: DbId, names: &[&str]) {
        if let Some(idea) = self.state.ideas.get_mut(&idea_id) {
            idea.themes = names.iter().map(|n| n.to_string()).collect();
        }
    }

    /// Any attempt to attach this theme is rejected at record level.
    pub fn reject_theme(&mut self, name: &str) {
        self.rejected_themes.insert(name.to_string());
    }

    /// Allow `n` more creates, then fail fatally.
    pub fn fail_after_creates(&mut self, n: usize) {
        self.creates_left = Some(n);
    }

    // -- inspection ----------------------------------------------------------

    pub fn idea(&self, id: DbId) -> &MemIdea {
        &self.state.ideas[&id]
    }

    pub fn post(&self, id: DbId) -> &MemPost {
        &self.state.posts[&id]
    }

    pub fn idea_count(&self) -> usize {
        self.state.ideas.len()
    }

    pub fn post_count(&self) -> usize {
        self.state.posts.len()
    }

    /// Posts of one idea, ordered by date.
    pub fn posts_of(&self, idea_id: DbId) -> Vec<MemPost> {
        let mut posts: Vec<MemPost> = self
            .state
            .posts
            .values()
            .filter(|p| p.idea_id == idea_id)
            .cloned()
            .collect();
        posts.sort_by_key(|p| p.date);
        posts
    }

    pub fn themes_of(&self, idea_id: DbId) -> Vec<String> {
        self.idea(idea_id).themes.iter().cloned().collect()
    }

    pub fn savepoint_depth(&self) -> usize {
        self.savepoints.len()
    }

    /// Same ideas and posts, ignoring `updated_at`, which moves on every update.
    pub fn same_content(&self, other: &MemoryStore) -> bool {
        let strip = |s: &State| {
            s.ideas
                .iter()
                .map(|(id, idea)| {
                    let mut idea = idea.clone();
                    idea.updated_at = idea.created_at;
                    (*id, idea)
                })
                .collect::<BTreeMap<_, _>>()
        };
        strip(&self.state) == strip(&other.state) && self.state.posts == other.state.posts
    }

    fn snapshot(id: DbId, idea: &MemIdea) -> IdeaSnapshot {
        IdeaSnapshot {
            id,
            status: idea.status,
            difficulty: idea.difficulty,
        }
    }
}

#[async_trait]
impl ImportStore for MemoryStore {
    async fn begin_record(&mut self) -> Result<(), StoreError> {
        self.savepoints.push(self.state.clone());
        Ok(())
    }

    async fn commit_record(&mut self) -> Result<(), StoreError> {
        self.savepoints.pop();
        Ok(())
    }

    async fn abort_record(&mut self) -> Result<(), StoreError> {
        if let Some(saved) = self.savepoints.pop() {
            self.state = saved;
        }
        Ok(())
    }

    async fn clear_all(&mut self) -> Result<ClearedCounts, StoreError> {
        let counts = ClearedCounts {
            posts: self.state.posts.len() as u64,
            ideas: self.state.ideas.len() as u64,
        };
        self.state = State::default();
        Ok(counts)
    }

    async fn find_idea_by_id(&mut self, id: DbId) -> Result<Option<IdeaSnapshot>, StoreError> {
        Ok(self.state.ideas.get(&id).map(|idea| Self::snapshot(id, idea)))
    }

    async fn find_idea_by_title(
        &mut self,
        title: &str,
        platform: Platform,
    ) -> Result<Option<IdeaSnapshot>, StoreError> {
        Ok(self
            .state
            .ideas
            .iter()
            .find(|(_, idea)| idea.title == title && idea.platform == platform)
            .map(|(id, idea)| Self::snapshot(*id, idea)))
    }

    async fn create_idea(&mut self, idea: &NewIdea) -> Result<DbId, StoreError> {
        self.count_create()?;
        let id = self.allocate();
        let now = Utc::now();
        self.state.ideas.insert(
            id,
            MemIdea {
                title: idea.title.clone(),
                description: idea.description.clone(),
                platform: idea.platform,
                status: idea.status,
                difficulty: idea.difficulty,
                created_at: idea.created_at.unwrap_or(now),
                updated_at: idea.updated_at.unwrap_or(now),
                themes: BTreeSet::new(),
            },
        );
        Ok(id)
    }

    async fn update_idea(&mut self, id: DbId, changes: &IdeaChanges) -> Result<(), StoreError> {
        let idea = self
            .state
            .ideas
            .get_mut(&id)
            .ok_or_else(|| StoreError::Rejected(format!("idea {id} vanished")))?;
        idea.title = changes.title.clone();
        idea.description = changes.description.clone();
        idea.platform = changes.platform;
        idea.status = changes.status;
        idea.difficulty = changes.difficulty;
        idea.updated_at = changes.updated_at.unwrap_or_else(Utc::now);
        Ok(())
    }

    async fn set_idea_themes(&mut self, idea_id: DbId, names: &[String]) -> Result<(), StoreError> {
        if let Some(bad) = names.iter().find(|n| self.rejected_themes.contains(*n)) {
            return Err(StoreError::Rejected(format!("theme '{bad}' refused")));
        }
        let idea = self
            .state
            .ideas
            .get_mut(&idea_id)
            .ok_or_else(|| StoreError::Rejected(format!("idea {idea_id} vanished")))?;
        idea.themes = names.iter().cloned().collect();
        Ok(())
    }

    async fn find_post(
        &mut self,
        idea_id: DbId,
        date: Timestamp,
    ) -> Result<Option<PostSnapshot>, StoreError> {
        Ok(self
            .state
            .posts
            .iter()
            .find(|(_, p)| p.idea_id == idea_id && p.date == date)
            .map(|(id, p)| PostSnapshot {
                id: *id,
                status: p.status,
            }))
    }

    async fn create_post(&mut self, post: &NewPost) -> Result<DbId, StoreError> {
        self.count_create()?;
        if !self.state.ideas.contains_key(&post.idea_id) {
            return Err(StoreError::Rejected("foreign key violation".into()));
        }
        if self
            .state
            .posts
            .values()
            .any(|p| p.idea_id == post.idea_id && p.date == post.date)
        {
            return Err(StoreError::Rejected("duplicate (idea_id, date)".into()));
        }
        let id = self.allocate();
        self.state.posts.insert(
            id,
            MemPost {
                idea_id: post.idea_id,
                date: post.date,
                description: post.description.clone(),
                status: post.status,
            },
        );
        Ok(id)
    }

    async fn update_post(&mut self, id: DbId, changes: &PostChanges) -> Result<(), StoreError> {
        let post = self
            .state
            .posts
            .get_mut(&id)
            .ok_or_else(|| StoreError::Rejected(format!("post {id} vanished")))?;
        post.description = changes.description.clone();
        post.status = changes.status;
        Ok(())
    }

    async fn list_idea_ids(&mut self) -> Result<Vec<DbId>, StoreError> {
        Ok(self.state.ideas.keys().copied().collect())
    }

    async fn prune_posts(&mut self, idea_id: DbId, keep: &[Timestamp]) -> Result<u64, StoreError> {
        let before = self.state.posts.len();
        self.state
            .posts
            .retain(|_, p| p.idea_id != idea_id || keep.contains(&p.date));
        Ok((before - self.state.posts.len()) as u64)
    }
}
