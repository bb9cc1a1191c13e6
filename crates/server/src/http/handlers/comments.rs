use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::{Comment, CommentNode, NewComment};
use serde::Deserialize;

use crate::http::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CreateCommentRequest {
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub author_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub content: String,
}

pub async fn list_comments(
    State(state): State<AppState>,
    Path(article_id): Path<String>,
) -> Result<Json<Vec<CommentNode>>, ApiError> {
    Ok(Json(state.comments.thread(&article_id).await?))
}

/// 返回待审核的评论，邮箱不会出现在响应里
pub async fn post_comment(
    State(state): State<AppState>,
    Path(article_id): Path<String>,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<Comment>), ApiError> {
    let comment = state
        .comments
        .submit(NewComment {
            article_id,
            parent_id: payload.parent_id,
            author_name: payload.author_name,
            email: payload.email,
            content: payload.content,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}
