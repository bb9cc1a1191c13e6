use adapter::LikeState;
use axum::{
    extract::{Path, State},
    Json,
};

use crate::http::error::ApiError;
use crate::http::visitor::Visitor;
use crate::state::AppState;

pub async fn like_status(
    State(state): State<AppState>,
    Path(article_id): Path<String>,
    Visitor(visitor): Visitor,
) -> Result<Json<LikeState>, ApiError> {
    Ok(Json(state.likes.status(&article_id, &visitor).await?))
}

pub async fn toggle_like(
    State(state): State<AppState>,
    Path(article_id): Path<String>,
    Visitor(visitor): Visitor,
) -> Result<Json<LikeState>, ApiError> {
    Ok(Json(state.likes.toggle(&article_id, &visitor).await?))
}
