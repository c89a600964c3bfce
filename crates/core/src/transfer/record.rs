//! Per-record validation for imported ideas and posts.
//!
//! Each step returns `Result<_, SkipReason>`; the engine turns an `Err` into
//! a skip counter and moves on to the next record.

use serde::Serialize;

use crate::content::{
    normalize_description, parse_timestamp, sanitize_theme_names, validate_description,
    validate_difficulty, validate_title, IdeaStatus, Platform, PostStatus,
};
use crate::error::CoreError;
use crate::types::Timestamp;

use super::document::{ExternalId, RawIdea, RawPost, ThemeRef};

/// Why an imported record was skipped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SkipReason {
    #[error("malformed record: {0}")]
    Malformed(String),

    #[error("missing title")]
    MissingTitle,

    #[error("missing platform")]
    MissingPlatform,

    #[error("missing date")]
    MissingDate,

    #[error("invalid field: {0}")]
    InvalidField(String),

    #[error("no matching idea")]
    UnresolvedIdea,

    #[error("rejected by store: {0}")]
    Rejected(String),
}

impl From<CoreError> for SkipReason {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(msg) => SkipReason::InvalidField(msg),
            other => SkipReason::InvalidField(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Idea,
    Post,
}

// ---------------------------------------------------------------------------
// Ideas
// ---------------------------------------------------------------------------

/// An imported idea that passed validation.
///
/// `status`, `difficulty` and `themes` stay optional: when absent, a sync
/// update keeps the stored value and a create uses the default.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidIdea {
    pub external_id: Option<ExternalId>,
    pub title: String,
    pub description: Option<String>,
    pub platform: Platform,
    pub status: Option<IdeaStatus>,
    pub difficulty: Option<i16>,
    pub created_at: Option<Timestamp>,
    pub updated_at: Option<Timestamp>,
    pub themes: Option<Vec<String>>,
}

pub fn validate_idea(raw: &RawIdea) -> Result<ValidIdea, SkipReason> {
    let title = match raw.title.as_deref() {
        Some(t) if !t.trim().is_empty() => t.to_string(),
        _ => return Err(SkipReason::MissingTitle),
    };
    validate_title(&title)?;

    let platform = match raw.platform.as_deref() {
        Some(p) if !p.is_empty() => p.parse::<Platform>()?,
        _ => return Err(SkipReason::MissingPlatform),
    };

    let description = normalize_description(raw.description.clone());
    if let Some(d) = &description {
        validate_description(d)?;
    }

    let status = parse_optional(raw.status.as_deref())?;
    let difficulty = raw.difficulty.as_ref().map(parse_difficulty).transpose()?;

    let themes = raw
        .themes
        .as_ref()
        .map(|refs| {
            let names: Vec<&str> = refs.iter().map(ThemeRef::name).collect();
            sanitize_theme_names(names.as_slice())
        })
        .transpose()?;

    Ok(ValidIdea {
        external_id: raw.id.clone(),
        title,
        description,
        platform,
        status,
        difficulty,
        created_at: parse_optional_timestamp(raw.created_at.as_deref())?,
        updated_at: parse_optional_timestamp(raw.updated_at.as_deref())?,
        themes,
    })
}

/// Whole-valued floats (`2.0`) count as integers; anything else is an
/// invalid field rather than a malformed record.
fn parse_difficulty(value: &serde_json::Number) -> Result<i16, SkipReason> {
    let whole = value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && f.abs() <= i64::MAX as f64)
            .map(|f| f as i64)
    });
    match whole {
        Some(n) => Ok(validate_difficulty(n)?),
        None => Err(SkipReason::InvalidField(format!("Invalid difficulty '{value}'"))),
    }
}

// ---------------------------------------------------------------------------
// Posts
// ---------------------------------------------------------------------------

/// An imported post that passed validation, not yet tied to a local idea.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidPost {
    pub date: Timestamp,
    pub description: Option<String>,
    pub status: Option<PostStatus>,
    pub created_at: Option<Timestamp>,
}

/// The date is checked first and on its own: a post without a usable date
/// cannot be matched or kept.
pub fn parse_post_date(raw: &RawPost) -> Result<Timestamp, SkipReason> {
    match raw.date.as_deref() {
        Some(d) if !d.trim().is_empty() => Ok(parse_timestamp(d)?),
        _ => Err(SkipReason::MissingDate),
    }
}

pub fn validate_post(raw: &RawPost, date: Timestamp) -> Result<ValidPost, SkipReason> {
    let description = normalize_description(raw.description.clone());
    if let Some(d) = &description {
        validate_description(d)?;
    }
    Ok(ValidPost {
        date,
        description,
        status: parse_optional(raw.status.as_deref())?,
        created_at: parse_optional_timestamp(raw.created_at.as_deref())?,
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Empty strings count as absent.
fn parse_optional<T>(value: Option<&str>) -> Result<Option<T>, SkipReason>
where
    T: std::str::FromStr<Err = CoreError>,
{
    match value {
        Some(v) if !v.is_empty() => Ok(Some(v.parse::<T>()?)),
        _ => Ok(None),
    }
}

fn parse_optional_timestamp(value: Option<&str>) -> Result<Option<Timestamp>, SkipReason> {
    match value {
        Some(v) if !v.is_empty() => Ok(Some(parse_timestamp(v)?)),
        _ => Ok(None),
    }
}
