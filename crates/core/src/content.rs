//! Content-planning enums, field limits and validation helpers.
//!
//! Enum values are stored as TEXT in PostgreSQL (guarded by CHECK
//! constraints) and travel over the wire in SCREAMING_SNAKE_CASE, so every
//! enum here round-trips through the same `as_str` / `FromStr` pair.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

/// Maximum length of an idea title, in characters.
pub const MAX_TITLE_LENGTH: usize = 500;

/// Maximum length of an idea or post description, in characters.
pub const MAX_DESCRIPTION_LENGTH: usize = 10_000;

/// Maximum length of a theme name after trimming, in characters.
pub const MAX_THEME_NAME_LENGTH: usize = 100;

pub const MIN_DIFFICULTY: i16 = 1;
pub const MAX_DIFFICULTY: i16 = 3;
pub const DEFAULT_DIFFICULTY: i16 = 2;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $name:ident, default = $default:ident {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }

            /// Comma-separated list of accepted values, for error messages.
            pub fn allowed() -> String {
                Self::ALL
                    .iter()
                    .map(|v| v.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(CoreError::Validation(format!(
                        "Invalid {} '{other}'. Must be one of: {}",
                        stringify!($name),
                        Self::allowed()
                    ))),
                }
            }
        }

        // Lets sqlx decode TEXT columns straight into the enum via
        // `#[sqlx(try_from = "String")]`.
        impl TryFrom<String> for $name {
            type Error = CoreError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }
    };
}

text_enum! {
    /// Social platform an idea targets.
    Platform, default = Booktok {
        Booktok => "BOOKTOK",
        Devtok => "DEVTOK",
    }
}

text_enum! {
    /// Production status of an idea.
    IdeaStatus, default = Idea {
        Idea => "IDEA",
        Planned => "PLANNED",
        Done => "DONE",
    }
}

text_enum! {
    /// Production status of a scheduled post.
    PostStatus, default = NotStarted {
        NotStarted => "NOT_STARTED",
        Preparing => "PREPARING",
        Ready => "READY",
        Posted => "POSTED",
    }
}

// ---------------------------------------------------------------------------
// Field validation
// ---------------------------------------------------------------------------

/// Validate an idea title: non-blank and within [`MAX_TITLE_LENGTH`].
pub fn validate_title(title: &str) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        return Err(CoreError::Validation("Title is required".to_string()));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(CoreError::Validation(format!(
            "Title exceeds maximum length of {MAX_TITLE_LENGTH} characters"
        )));
    }
    Ok(())
}

pub fn validate_description(description: &str) -> Result<(), CoreError> {
    if description.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(CoreError::Validation(format!(
            "Description exceeds maximum length of {MAX_DESCRIPTION_LENGTH} characters"
        )));
    }
    Ok(())
}

pub fn validate_difficulty(difficulty: i64) -> Result<i16, CoreError> {
    match i16::try_from(difficulty) {
        Ok(d) if (MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&d) => Ok(d),
        _ => Err(CoreError::Validation(format!(
            "Difficulty must be between {MIN_DIFFICULTY} and {MAX_DIFFICULTY}"
        ))),
    }
}

/// An empty description is stored as NULL.
pub fn normalize_description(description: Option<String>) -> Option<String> {
    description.filter(|d| !d.is_empty())
}

/// Trim theme names, drop blanks and collapse duplicates (first occurrence
/// wins). Any name longer than [`MAX_THEME_NAME_LENGTH`] rejects the list.
pub fn sanitize_theme_names<S: AsRef<str>>(names: &[S]) -> Result<Vec<String>, CoreError> {
    let mut out: Vec<String> = Vec::with_capacity(names.len());
    for raw in names {
        let name = raw.as_ref().trim();
        if name.is_empty() {
            continue;
        }
        if name.chars().count() > MAX_THEME_NAME_LENGTH {
            return Err(CoreError::Validation(format!(
                "Theme name exceeds maximum length of {MAX_THEME_NAME_LENGTH} characters"
            )));
        }
        if !out.iter().any(|existing| existing == name) {
            out.push(name.to_string());
        }
    }
    Ok(out)
}

/// Parse a client-supplied timestamp.
///
/// Accepts RFC 3339 (`2024-06-01T00:00:00.000Z`), a zone-less date-time
/// (read as UTC) and a bare `YYYY-MM-DD` date (midnight UTC).
pub fn parse_timestamp(value: &str) -> Result<Timestamp, CoreError> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }
    Err(CoreError::Validation(format!("Invalid date '{value}'")))
}
