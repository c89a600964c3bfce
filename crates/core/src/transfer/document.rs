//! Import document parsing and normalisation.
//!
//! The request body is loosely typed JSON. It is checked in two layers: the
//! top-level shape must hold an `ideas` array or the whole request is
//! rejected; each element is then parsed on its own so one malformed record
//! only skips that record.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;
use crate::types::DbId;

use super::record::SkipReason;

/// Message returned when the top-level shape is wrong.
pub const INVALID_FORMAT_MESSAGE: &str = "Invalid import format: expected { ideas: [] }";

// ---------------------------------------------------------------------------
// External ids
// ---------------------------------------------------------------------------

/// An id carried by an imported record. It may come from another store, so it
/// is either a number or a string and may not name a local row at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExternalId {
    Number(i64),
    Text(String),
}

impl ExternalId {
    /// Canonical key for the import id-map, so `7` and `"7"` map alike.
    /// Returns `None` for ids that carry no identity (`0`, `""`).
    pub fn key(&self) -> Option<String> {
        match self {
            ExternalId::Number(0) => None,
            ExternalId::Number(n) => Some(n.to_string()),
            ExternalId::Text(s) if s.trim().is_empty() => None,
            ExternalId::Text(s) => Some(s.trim().to_string()),
        }
    }

    /// The local primary key this id would name, if it has that form.
    pub fn as_local(&self) -> Option<DbId> {
        match self {
            ExternalId::Number(n) if *n > 0 => Some(*n),
            ExternalId::Number(_) => None,
            ExternalId::Text(s) => s.trim().parse::<DbId>().ok().filter(|n| *n > 0),
        }
    }
}

// ---------------------------------------------------------------------------
// Raw records
// ---------------------------------------------------------------------------

/// A theme reference inside an imported idea: a bare name or `{ "name": .. }`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ThemeRef {
    Name(String),
    Object { name: String },
}

impl ThemeRef {
    pub fn name(&self) -> &str {
        match self {
            ThemeRef::Name(name) | ThemeRef::Object { name } => name,
        }
    }
}

/// An idea exactly as it appeared in the import document. Nothing is
/// validated yet; see [`super::record::validate_idea`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawIdea {
    pub id: Option<ExternalId>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub platform: Option<String>,
    pub status: Option<String>,
    /// Any JSON number; checked in [`super::record::validate_idea`].
    pub difficulty: Option<serde_json::Number>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub themes: Option<Vec<ThemeRef>>,
    /// Posts embedded under the idea. Only used when the document has no
    /// top-level `scheduledPosts`; anything but an array is ignored.
    pub scheduled_posts: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPost {
    pub id: Option<ExternalId>,
    pub idea_id: Option<ExternalId>,
    pub idea_title: Option<String>,
    pub idea_platform: Option<String>,
    pub date: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub created_at: Option<String>,
}

/// One parsed element of an input collection, or why it could not be parsed.
pub type ParsedRecord<T> = Result<T, SkipReason>;

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportMode {
    /// Non-destructive merge (create-or-update).
    #[default]
    Sync,
    /// Wipe ideas and posts, then create everything from the document.
    Replace,
}

impl ImportMode {
    /// Anything other than an explicit `"replace"` means sync.
    pub fn from_request(value: Option<&str>) -> Self {
        match value {
            Some("replace") => ImportMode::Replace,
            _ => ImportMode::Sync,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ImportMode::Sync => "sync",
            ImportMode::Replace => "replace",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportOptions {
    pub mode: ImportMode,
    /// Only honoured in sync mode.
    pub prune: bool,
}

/// A fully parsed and normalised import request.
///
/// `posts` is the single canonical post list: the top-level `scheduledPosts`
/// when the document has one (even an empty one), otherwise the posts
/// embedded in each idea.
#[derive(Debug, Clone, Default)]
pub struct ImportRequest {
    pub options: ImportOptions,
    pub ideas: Vec<ParsedRecord<RawIdea>>,
    pub posts: Vec<ParsedRecord<RawPost>>,
}

impl ImportRequest {
    /// Parse a request body of the form `{ ideas, scheduledPosts?, mode?, prune? }`.
    pub fn parse(body: Value) -> Result<Self, CoreError> {
        let Value::Object(mut body) = body else {
            return Err(CoreError::Validation(INVALID_FORMAT_MESSAGE.to_string()));
        };
        let Some(Value::Array(ideas)) = body.remove("ideas") else {
            return Err(CoreError::Validation(INVALID_FORMAT_MESSAGE.to_string()));
        };

        let options = ImportOptions {
            mode: ImportMode::from_request(body.get("mode").and_then(Value::as_str)),
            prune: body.get("prune").and_then(Value::as_bool).unwrap_or(false),
        };

        let ideas: Vec<ParsedRecord<RawIdea>> = ideas.into_iter().map(parse_record).collect();

        let posts = match body.remove("scheduledPosts") {
            Some(Value::Array(posts)) => posts.into_iter().map(parse_record).collect(),
            _ => flatten_embedded_posts(&ideas),
        };

        Ok(Self {
            options,
            ideas,
            posts,
        })
    }
}

fn parse_record<T: serde::de::DeserializeOwned>(value: Value) -> ParsedRecord<T> {
    serde_json::from_value(value).map_err(|e| SkipReason::Malformed(e.to_string()))
}

/// Pull posts out of `idea.scheduledPosts`, stamping each with its parent's
/// identity so it can be resolved like a top-level post.
fn flatten_embedded_posts(ideas: &[ParsedRecord<RawIdea>]) -> Vec<ParsedRecord<RawPost>> {
    let mut posts = Vec::new();
    for idea in ideas.iter().flatten() {
        let Some(Value::Array(embedded)) = &idea.scheduled_posts else {
            continue;
        };
        for value in embedded {
            let parsed = parse_record::<RawPost>(value.clone()).map(|mut post| {
                post.idea_id = idea.id.clone();
                post.idea_title = idea.title.clone();
                post.idea_platform = idea.platform.clone();
                post
            });
            posts.push(parsed);
        }
    }
    posts
}
