use super::handlers::{admin, articles, comments, directory, likes};
use crate::state::AppState;
use axum::{
    http::{HeaderValue, Method},
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

const METHODS: [Method; 4] = [Method::GET, Method::POST, Method::PUT, Method::DELETE];

pub fn build_router(state: AppState, allowed_origins: &str) -> Router {
    let cors = if allowed_origins == "*" {
        CorsLayer::new()
            .allow_methods(METHODS)
            .allow_origin(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .filter_map(|s| s.parse::<HeaderValue>().ok())
            .collect();

        if origins.is_empty() {
            tracing::warn!("CORS config is invalid or empty, falling back to allow ANY.");
            CorsLayer::new()
                .allow_methods(METHODS)
                .allow_origin(Any)
                .allow_headers(Any)
        } else {
            tracing::info!("CORS enabled for origins: {:?}", origins);
            CorsLayer::new()
                .allow_methods(METHODS)
                .allow_origin(origins)
                .allow_headers(Any)
        }
    };

    let admin_routes = Router::new()
        .route(
            "/articles",
            get(admin::list_articles).post(admin::create_article),
        )
        .route("/articles/:id", delete(admin::delete_article))
        .route("/articles/:id/toggle", post(admin::toggle_article))
        .route("/comments", get(admin::comment_queue))
        .route("/comments/:id", delete(admin::delete_comment))
        .route("/comments/:id/status", put(admin::moderate_comment))
        .route("/members/:id", put(admin::upsert_member))
        .route("/categories/:id", put(admin::upsert_category))
        .route("/stats", get(admin::stats));

    Router::new()
        .route("/api/articles", get(articles::list_articles))
        .route("/api/articles/:id", get(articles::get_article))
        .route(
            "/api/articles/:id/comments",
            get(comments::list_comments).post(comments::post_comment),
        )
        .route(
            "/api/articles/:id/like",
            get(likes::like_status).post(likes::toggle_like),
        )
        .route("/api/members", get(directory::list_members))
        .route("/api/members/:id", get(directory::get_member))
        .route("/api/categories", get(directory::list_categories))
        .route("/api/stats", get(directory::public_stats))
        .nest("/api/admin", admin_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
