use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use domain::{Category, Member, PublicStats};

use crate::http::error::ApiError;
use crate::state::AppState;

pub async fn list_members(State(state): State<AppState>) -> Result<Json<Vec<Member>>, ApiError> {
    Ok(Json(state.directory.members().await?))
}

pub async fn get_member(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Member>, ApiError> {
    Ok(Json(state.directory.member(&id).await?))
}

pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>, ApiError> {
    Ok(Json(state.directory.categories().await?))
}

/// 只统计已发布的文章；包含草稿的统计在后台接口
pub async fn public_stats(State(state): State<AppState>) -> Result<Json<PublicStats>, ApiError> {
    Ok(Json(state.articles.stats(Utc::now().naive_utc()).await?))
}
