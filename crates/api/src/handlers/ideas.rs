//! Handlers for the `/ideas` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use socialmap_core::content::{
    normalize_description, sanitize_theme_names, validate_description, validate_difficulty,
    validate_title, IdeaStatus, Platform, DEFAULT_DIFFICULTY,
};
use socialmap_core::error::CoreError;
use socialmap_core::transfer::NewIdea;
use socialmap_core::types::DbId;
use socialmap_db::models::idea::{CreateIdea, IdeaFilter, IdeaListItem, UpdateIdea};
use socialmap_db::repositories::{IdeaRepo, ThemeRepo};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppQuery};
use crate::middleware::access::{ReadAccess, RequireAuth};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /ideas`. Empty values are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct IdeaListQuery {
    pub platform: Option<String>,
    pub status: Option<String>,
    pub difficulty: Option<String>,
}

impl IdeaListQuery {
    fn into_filter(self) -> Result<IdeaFilter, CoreError> {
        let platform = non_empty(self.platform)
            .map(|p| p.parse::<Platform>())
            .transpose()?;
        let status = non_empty(self.status)
            .map(|s| s.parse::<IdeaStatus>())
            .transpose()?;
        let difficulty = non_empty(self.difficulty)
            .map(|d| {
                d.trim()
                    .parse::<i64>()
                    .map_err(|_| CoreError::Validation(format!("Invalid difficulty '{d}'")))
                    .and_then(validate_difficulty)
            })
            .transpose()?;

        Ok(IdeaFilter {
            platform,
            status,
            difficulty,
        })
    }
}

/// Query parameters for `DELETE /ideas`.
#[derive(Debug, Deserialize)]
pub struct IdeaIdQuery {
    pub id: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Idea", id })
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /ideas
///
/// List ideas newest first, with schedule stats and theme names.
pub async fn list_ideas(
    _access: ReadAccess,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<IdeaListQuery>,
) -> AppResult<Json<Vec<IdeaListItem>>> {
    let filter = query.into_filter()?;
    let ideas = IdeaRepo::list(&state.pool, &filter).await?;
    Ok(Json(ideas))
}

/// POST /ideas
///
/// Create an idea and link its themes, upserting them by name.
pub async fn create_idea(
    RequireAuth(_session): RequireAuth,
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateIdea>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    validate_title(&input.title)?;
    let themes = sanitize_theme_names(input.themes.as_deref().unwrap_or_default())?;

    let new_idea = NewIdea {
        title: input.title,
        description: normalize_description(input.description),
        platform: input.platform,
        status: input.status.unwrap_or_default(),
        difficulty: input.difficulty.unwrap_or(DEFAULT_DIFFICULTY),
        created_at: None,
        updated_at: None,
    };

    let mut tx = state.pool.begin().await?;
    let idea = IdeaRepo::create(&mut *tx, &new_idea).await?;
    if !themes.is_empty() {
        ThemeRepo::set_for_idea(&mut tx, idea.id, &themes).await?;
    }
    let listed = IdeaRepo::find_listed(&mut *tx, idea.id)
        .await?
        .ok_or_else(|| not_found(idea.id))?;
    tx.commit().await?;

    tracing::info!(
        idea_id = idea.id,
        platform = %idea.platform,
        themes = themes.len(),
        "Idea created",
    );

    Ok((StatusCode::CREATED, Json(listed)))
}

/// PUT /ideas/{id}
///
/// Partially update an idea. A `themes` list replaces the idea's themes;
/// leaving it out keeps them.
pub async fn update_idea(
    RequireAuth(_session): RequireAuth,
    State(state): State<AppState>,
    Path(idea_id): Path<DbId>,
    AppJson(input): AppJson<UpdateIdea>,
) -> AppResult<Json<IdeaListItem>> {
    input.validate()?;
    if let Some(title) = &input.title {
        validate_title(title)?;
    }
    if let Some(Some(description)) = &input.description {
        validate_description(description)?;
    }
    let themes = input
        .themes
        .as_deref()
        .map(sanitize_theme_names)
        .transpose()?;

    let mut tx = state.pool.begin().await?;
    IdeaRepo::update(&mut *tx, idea_id, &input)
        .await?
        .ok_or_else(|| not_found(idea_id))?;
    if let Some(names) = &themes {
        ThemeRepo::set_for_idea(&mut tx, idea_id, names).await?;
    }
    let listed = IdeaRepo::find_listed(&mut *tx, idea_id)
        .await?
        .ok_or_else(|| not_found(idea_id))?;
    tx.commit().await?;

    tracing::info!(
        idea_id,
        themes_replaced = themes.is_some(),
        "Idea updated",
    );

    Ok(Json(listed))
}

/// DELETE /ideas?id={id}
///
/// Delete an idea. Its scheduled posts and theme links go with it.
pub async fn delete_idea(
    RequireAuth(_session): RequireAuth,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<IdeaIdQuery>,
) -> AppResult<StatusCode> {
    let idea_id: DbId = non_empty(query.id)
        .and_then(|id| id.trim().parse().ok())
        .ok_or_else(|| AppError::BadRequest("ID is required".into()))?;

    if !IdeaRepo::delete(&state.pool, idea_id).await? {
        return Err(not_found(idea_id));
    }

    tracing::info!(idea_id, "Idea deleted");
    Ok(StatusCode::NO_CONTENT)
}
