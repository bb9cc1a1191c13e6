use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::Utc;
use domain::{
    Article, ArticleStats, Category, CategoryForm, Comment, CommentStatus, Member, MemberForm,
    Moderation, NewArticle,
};
use serde::Deserialize;

use crate::http::error::ApiError;
use crate::state::AppState;

fn authorize(headers: &HeaderMap, admin_token: &str) -> Result<(), ApiError> {
    let auth_header = headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;
    let expected_token = format!("Bearer {}", admin_token);
    if auth_header != expected_token {
        return Err(ApiError::Forbidden);
    }
    Ok(())
}

pub async fn list_articles(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Article>>, ApiError> {
    authorize(&headers, &state.admin_token)?;
    Ok(Json(state.admin.articles().await?))
}

pub async fn create_article(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<NewArticle>,
) -> Result<(StatusCode, Json<Article>), ApiError> {
    authorize(&headers, &state.admin_token)?;
    let article = state.admin.create(payload).await?;
    Ok((StatusCode::CREATED, Json(article)))
}

pub async fn toggle_article(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Article>, ApiError> {
    authorize(&headers, &state.admin_token)?;
    Ok(Json(state.admin.toggle_status(&id).await?))
}

pub async fn delete_article(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    authorize(&headers, &state.admin_token)?;
    state.admin.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct QueueParams {
    pub status: Option<CommentStatus>,
}

pub async fn comment_queue(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<QueueParams>,
) -> Result<Json<Vec<Comment>>, ApiError> {
    authorize(&headers, &state.admin_token)?;
    let status = params.status.unwrap_or(CommentStatus::Pending);
    Ok(Json(state.comments.queue(status).await?))
}

#[derive(Deserialize)]
pub struct ModerateRequest {
    pub status: Moderation,
}

pub async fn moderate_comment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(payload): Json<ModerateRequest>,
) -> Result<StatusCode, ApiError> {
    authorize(&headers, &state.admin_token)?;
    state.comments.moderate(&id, payload.status).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_comment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    authorize(&headers, &state.admin_token)?;
    state.comments.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn stats(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ArticleStats>, ApiError> {
    authorize(&headers, &state.admin_token)?;
    Ok(Json(state.admin.stats(Utc::now().naive_utc()).await?))
}

/// 新建或整体替换成员资料
pub async fn upsert_member(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(form): Json<MemberForm>,
) -> Result<Json<Member>, ApiError> {
    authorize(&headers, &state.admin_token)?;
    Ok(Json(state.directory.save_member(&id, form).await?))
}

/// slug 与其他分类冲突时返回 400
pub async fn upsert_category(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(form): Json<CategoryForm>,
) -> Result<Json<Category>, ApiError> {
    authorize(&headers, &state.admin_token)?;
    Ok(Json(state.directory.save_category(&id, form).await?))
}
