use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::SiteError;
use serde_json::json;

/// HTTP 层的错误。存储细节已在下层记日志，这里只给出通用提示。
#[derive(Debug)]
pub enum ApiError {
    Site(SiteError),
    /// 缺少 Authorization 头
    Unauthorized,
    /// 令牌不匹配
    Forbidden,
}

impl From<SiteError> for ApiError {
    fn from(e: SiteError) -> Self {
        ApiError::Site(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Site(SiteError::Validation(e)) => (StatusCode::BAD_REQUEST, e.to_string()),
            ApiError::Site(SiteError::NotFound(e)) => (StatusCode::NOT_FOUND, e.to_string()),
            ApiError::Site(SiteError::Store(_)) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Service temporarily unavailable, please try again.".to_string(),
            ),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Missing Authorization header".to_string(),
            ),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, "Invalid Admin Token".to_string()),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
