//! Import and export of the whole dataset.
//!
//! * [`document`]: request parsing and the normalised post list
//! * [`record`]: per-record validation and skip reasons
//! * [`resolve`]: identity resolution for ideas and posts
//! * [`engine`]: the reconciliation engine, written against [`ImportStore`]
//! * [`export`]: the versioned export document

pub mod document;
pub mod engine;
pub mod export;
pub mod record;
pub mod resolve;
pub mod store;
pub mod summary;

#[cfg(test)]
mod memory;

pub use document::{
    ExternalId, ImportMode, ImportOptions, ImportRequest, RawIdea, RawPost, INVALID_FORMAT_MESSAGE,
};
pub use engine::reconcile;
pub use export::{ExportDocument, ExportedIdea, ExportedPost, FlattenedPost, EXPORT_VERSION};
pub use record::{RecordKind, SkipReason};
pub use store::{
    ClearedCounts, IdeaChanges, IdeaSnapshot, ImportStore, NewIdea, NewPost, PostChanges,
    PostSnapshot, StoreError,
};
pub use summary::{ImportSummary, SkippedRecord};

#[cfg(test)]
pub(crate) use memory::MemoryStore;
