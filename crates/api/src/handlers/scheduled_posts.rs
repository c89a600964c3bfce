//! Handlers for the `/scheduled-posts` resource (the calendar).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use socialmap_core::content::{normalize_description, parse_timestamp, validate_description};
use socialmap_core::error::CoreError;
use socialmap_core::transfer::NewPost;
use socialmap_core::types::DbId;
use socialmap_db::models::scheduled_post::{
    CreateScheduledPost, ScheduledPostChanges, ScheduledPostWithIdea, UpdateScheduledPost,
};
use socialmap_db::repositories::ScheduledPostRepo;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::access::{ReadAccess, RequireAuth};
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "ScheduledPost",
        id,
    })
}

/// GET /scheduled-posts
///
/// All posts with their ideas, earliest first.
pub async fn list_scheduled_posts(
    _access: ReadAccess,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ScheduledPostWithIdea>>> {
    let posts = ScheduledPostRepo::list_with_ideas(&state.pool).await?;
    Ok(Json(posts))
}

/// POST /scheduled-posts
///
/// Schedule an idea on a date. An idea can be scheduled at most once per
/// date (409 otherwise).
pub async fn create_scheduled_post(
    RequireAuth(_session): RequireAuth,
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateScheduledPost>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let date = parse_timestamp(&input.date)?;

    let new_post = NewPost {
        idea_id: input.idea_id,
        date,
        description: normalize_description(input.description),
        status: input.status.unwrap_or_default(),
        created_at: None,
    };
    let post = ScheduledPostRepo::create(&state.pool, &new_post).await?;
    let with_idea = ScheduledPostRepo::find_with_idea(&state.pool, post.id)
        .await?
        .ok_or_else(|| not_found(post.id))?;

    tracing::info!(
        post_id = post.id,
        idea_id = post.idea_id,
        date = %post.date,
        "Scheduled post created",
    );

    Ok((StatusCode::CREATED, Json(with_idea)))
}

/// PUT /scheduled-posts/{id}
///
/// Move a post to another date or edit its description or status.
pub async fn update_scheduled_post(
    RequireAuth(_session): RequireAuth,
    State(state): State<AppState>,
    Path(post_id): Path<DbId>,
    AppJson(input): AppJson<UpdateScheduledPost>,
) -> AppResult<Json<ScheduledPostWithIdea>> {
    if input.is_empty() {
        return Err(AppError::BadRequest("Missing fields".into()));
    }

    let date = input
        .date
        .as_deref()
        .filter(|d| !d.is_empty())
        .map(parse_timestamp)
        .transpose()?;
    if let Some(Some(description)) = &input.description {
        validate_description(description)?;
    }
    let changes = ScheduledPostChanges {
        date,
        description: input.description.map(normalize_description),
        status: input.status,
    };

    ScheduledPostRepo::update(&state.pool, post_id, &changes)
        .await?
        .ok_or_else(|| not_found(post_id))?;
    let with_idea = ScheduledPostRepo::find_with_idea(&state.pool, post_id)
        .await?
        .ok_or_else(|| not_found(post_id))?;

    tracing::info!(post_id, moved = changes.date.is_some(), "Scheduled post updated");

    Ok(Json(with_idea))
}

/// DELETE /scheduled-posts/{id}
pub async fn delete_scheduled_post(
    RequireAuth(_session): RequireAuth,
    State(state): State<AppState>,
    Path(post_id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !ScheduledPostRepo::delete(&state.pool, post_id).await? {
        return Err(not_found(post_id));
    }

    tracing::info!(post_id, "Scheduled post deleted");
    Ok(StatusCode::NO_CONTENT)
}
