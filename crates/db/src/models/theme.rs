use serde::Serialize;
use socialmap_core::types::DbId;
use sqlx::FromRow;

/// A theme with the number of ideas tagged with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ThemeUsage {
    pub id: DbId,
    pub name: String,
    pub usage_count: i64,
}
