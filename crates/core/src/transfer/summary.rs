use serde::Serialize;

use crate::types::DbId;

use super::document::ImportMode;
use super::record::{RecordKind, SkipReason};

/// A record the import did not apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRecord {
    pub kind: RecordKind,
    /// Position in the (normalised) input collection.
    pub index: usize,
    pub reason: String,
}

/// Result of one import, returned to the client as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub message: String,
    pub mode: ImportMode,
    pub imported_ideas: u64,
    pub updated_ideas: u64,
    pub skipped_ideas: u64,
    pub imported_posts: u64,
    pub updated_posts: u64,
    pub skipped_posts: u64,
    pub deleted_posts: u64,
    pub deleted_ideas: u64,
    /// Local ids of every idea created or updated, in input order.
    pub idea_ids: Vec<DbId>,
    pub skipped: Vec<SkippedRecord>,
}

impl ImportSummary {
    pub fn new(mode: ImportMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    pub(crate) fn skip(&mut self, kind: RecordKind, index: usize, reason: &SkipReason) {
        match kind {
            RecordKind::Idea => self.skipped_ideas += 1,
            RecordKind::Post => self.skipped_posts += 1,
        }
        self.skipped.push(SkippedRecord {
            kind,
            index,
            reason: reason.to_string(),
        });
    }

    /// Fill in the human-readable message from the counters.
    pub(crate) fn finish(mut self) -> Self {
        self.message = match self.mode {
            ImportMode::Replace => format!(
                "Import replaced DB: {} ideas, {} posts created. {} ideas skipped, {} posts skipped.",
                self.imported_ideas, self.imported_posts, self.skipped_ideas, self.skipped_posts
            ),
            ImportMode::Sync => {
                let mut msg = format!(
                    "Sync import completed: {} ideas created, {} ideas updated; {} posts created, {} posts updated. {} ideas skipped, {} posts skipped.",
                    self.imported_ideas,
                    self.updated_ideas,
                    self.imported_posts,
                    self.updated_posts,
                    self.skipped_ideas,
                    self.skipped_posts
                );
                if self.deleted_posts > 0 {
                    msg.push_str(&format!(" {} posts pruned.", self.deleted_posts));
                }
                msg
            }
        };
        self
    }
}
