use chrono::NaiveDateTime;
use domain::{
    Article, ArticlePage, ArticleQuery, FilterState, NotFoundError, PublicStats, SiteError,
};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::month_bounds;
use crate::traits::ArticleStore;

pub struct ArticleService<S: ?Sized> {
    store: Arc<S>,
}

impl<S: ?Sized> Clone for ArticleService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: ArticleStore + ?Sized> ArticleService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// 公开列表的一页，筛选条件到查询的翻译见 `ArticleQuery::plan`
    pub async fn list(
        &self,
        filters: &FilterState,
        page: i64,
        page_size: u32,
    ) -> Result<ArticlePage, SiteError> {
        let query = ArticleQuery::plan(filters, page, page_size);
        debug!("Listing articles: {:?}", query);
        let rows = self.store.query_articles(&query).await?;
        Ok(ArticlePage::interpret(rows, query.limit))
    }

    /// 返回详情并累加浏览数。计数失败不影响阅读。
    pub async fn detail(&self, id: &str) -> Result<Article, SiteError> {
        let mut article = self
            .store
            .published_article(id)
            .await?
            .ok_or_else(|| NotFoundError::article(id))?;

        match self.store.increment_view_count(id).await {
            Ok(true) => article.view_count += 1,
            Ok(false) => {}
            Err(e) => warn!("Failed to count view for article {}: {}", id, e),
        }
        Ok(article)
    }

    /// 首页统计，`at` 所在月份决定 published_this_month
    pub async fn stats(&self, at: NaiveDateTime) -> Result<PublicStats, SiteError> {
        let (start, end) = month_bounds(at);
        Ok(self.store.public_stats(start, end).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{at, draft, published, MemoryStore};
    use domain::SortKey;

    fn tagged(id: &str, day: u32, tags: &[&str]) -> Article {
        Article {
            category_tags: tags.iter().map(|t| t.to_string()).collect(),
            ..published(id, day)
        }
    }

    #[tokio::test]
    async fn lists_published_articles_newest_first() {
        let store = Arc::new(MemoryStore::with_articles(vec![
            published("old", 1),
            draft("hidden", 20),
            published("new", 10),
        ]));
        let articles = ArticleService::new(store);

        let page = articles.list(&FilterState::default(), 1, 9).await.unwrap();
        let ids: Vec<_> = page.items.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, ["new", "old"]);
        assert_eq!(page.total_pages, 1);
    }

    #[tokio::test]
    async fn category_filter_matches_any_tag() {
        let store = Arc::new(MemoryStore::with_articles(vec![
            tagged("a", 1, &["react"]),
            tagged("b", 2, &["rust", "backend"]),
            tagged("c", 3, &["design"]),
        ]));
        let articles = ArticleService::new(store);

        let filters = FilterState {
            categories: vec!["react".into(), "backend".into()],
            sort: SortKey::Oldest,
            ..Default::default()
        };
        let page = articles.list(&filters, 1, 9).await.unwrap();
        let ids: Vec<_> = page.items.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
    }

    #[tokio::test]
    async fn pages_past_the_end_are_empty() {
        let store = Arc::new(MemoryStore::with_articles(
            (1..=11).map(|d| published(&format!("p{}", d), d)).collect(),
        ));
        let articles = ArticleService::new(store);

        let second = articles.list(&FilterState::default(), 2, 9).await.unwrap();
        assert_eq!(second.items.len(), 2);
        assert_eq!(second.total_pages, 2);

        let beyond = articles.list(&FilterState::default(), 7, 9).await.unwrap();
        assert!(beyond.items.is_empty());
        assert_eq!(beyond.total_pages, 2);
    }

    #[tokio::test]
    async fn detail_counts_views_and_hides_drafts() {
        let store = Arc::new(MemoryStore::with_articles(vec![
            published("live", 1),
            draft("wip", 2),
        ]));
        let articles = ArticleService::new(Arc::clone(&store));

        assert_eq!(articles.detail("live").await.unwrap().view_count, 1);
        assert_eq!(articles.detail("live").await.unwrap().view_count, 2);
        assert_eq!(store.article_snapshot("live").unwrap().view_count, 2);

        for id in ["wip", "missing"] {
            let err = articles.detail(id).await.unwrap_err();
            assert_eq!(err, SiteError::NotFound(NotFoundError::article(id)));
        }
    }

    #[tokio::test]
    async fn public_stats_count_only_published_articles() {
        let mut live = published("live", 3);
        live.view_count = 7;
        let mut hidden = draft("hidden", 4);
        hidden.view_count = 50;
        let store = Arc::new(MemoryStore::with_articles(vec![live, hidden]));
        let articles = ArticleService::new(store);

        let stats = articles.stats(at(20)).await.unwrap();
        assert_eq!(
            stats,
            PublicStats {
                total_articles: 1,
                total_views: 7,
                published_this_month: 1,
            }
        );
    }

    #[tokio::test]
    async fn store_failures_surface_as_store_errors() {
        let store = Arc::new(MemoryStore::with_articles(vec![published("a", 1)]));
        store.fail_all(true);
        let articles = ArticleService::new(store);

        let err = articles
            .list(&FilterState::default(), 1, 9)
            .await
            .unwrap_err();
        assert!(matches!(err, SiteError::Store(_)));
    }
}
