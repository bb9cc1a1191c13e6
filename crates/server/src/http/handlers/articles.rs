use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use domain::{Article, ArticlePage, FilterState, SortKey};
use serde::Deserialize;

use crate::http::error::ApiError;
use crate::state::AppState;

const MAX_PAGE_SIZE: u32 = 50;

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub q: Option<String>,
    /// 逗号分隔
    pub categories: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub sort: Option<SortKey>,
    pub page: Option<i64>,
    pub page_size: Option<u32>,
}

impl ListParams {
    fn filters(&self) -> FilterState {
        let categories = self
            .categories
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect();

        FilterState {
            search_term: self.q.clone().unwrap_or_default(),
            categories,
            date_from: self.from,
            date_to: self.to,
            sort: self.sort.unwrap_or_default(),
        }
    }
}

pub async fn list_articles(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ArticlePage>, ApiError> {
    let page_size = params
        .page_size
        .unwrap_or(state.page_size)
        .min(MAX_PAGE_SIZE);
    let page = state
        .articles
        .list(&params.filters(), params.page.unwrap_or(1), page_size)
        .await?;
    Ok(Json(page))
}

pub async fn get_article(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Article>, ApiError> {
    Ok(Json(state.articles.detail(&id).await?))
}
