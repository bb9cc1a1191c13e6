use async_trait::async_trait;
use chrono::NaiveDateTime;
use domain::{
    Article, ArticleQuery, ArticleRows, ArticleStats, ArticleStatus, Category, Comment,
    CommentStatus, Member, PublicStats, StoreError,
};
use std::future::Future;
use std::time::Duration;
use storage::Db;
use tracing::{error, warn};

use crate::traits::{
    ArticleSearch, ArticleStore, CommentStore, DirectoryStore, EditorialStore, LikeStore,
};

/// 把 `Db` 绑定到各个存储端口上。每次调用都有超时，
/// 底层错误只写日志，调用方拿到的是可重试的 `StoreError`。
#[derive(Clone)]
pub struct DbStore {
    db: Db,
    timeout: Duration,
}

impl DbStore {
    pub fn new(db: Db, timeout: Duration) -> Self {
        Self { db, timeout }
    }

    async fn call<T, F>(&self, op: &'static str, fut: F) -> Result<T, StoreError>
    where
        F: Future<Output = anyhow::Result<T>> + Send,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                error!("Store operation '{}' failed: {:?}", op, e);
                Err(StoreError::Backend(e.to_string()))
            }
            Err(_) => {
                warn!("Store operation '{}' timed out after {:?}", op, self.timeout);
                Err(StoreError::Timeout)
            }
        }
    }
}

#[async_trait]
impl ArticleSearch for DbStore {
    async fn query_articles(&self, query: &ArticleQuery) -> Result<ArticleRows, StoreError> {
        self.call("query_articles", self.db.query_articles(query))
            .await
    }
}

#[async_trait]
impl ArticleStore for DbStore {
    async fn published_article(&self, id: &str) -> Result<Option<Article>, StoreError> {
        self.call("published_article", self.db.get_published_article(id))
            .await
    }

    async fn increment_view_count(&self, id: &str) -> Result<bool, StoreError> {
        self.call("increment_view_count", self.db.increment_view_count(id))
            .await
    }

    async fn public_stats(
        &self,
        month_start: NaiveDateTime,
        next_month_start: NaiveDateTime,
    ) -> Result<PublicStats, StoreError> {
        self.call(
            "public_stats",
            self.db.public_stats(month_start, next_month_start),
        )
        .await
    }
}

#[async_trait]
impl CommentStore for DbStore {
    async fn insert_comment(&self, comment: &Comment) -> Result<bool, StoreError> {
        self.call("insert_comment", self.db.insert_comment(comment))
            .await
    }

    async fn approved_comments(
        &self,
        article_id: &str,
    ) -> Result<Option<Vec<Comment>>, StoreError> {
        self.call("approved_comments", self.db.approved_comments(article_id))
            .await
    }

    async fn comments_by_status(&self, status: CommentStatus) -> Result<Vec<Comment>, StoreError> {
        self.call("comments_by_status", self.db.comments_by_status(status))
            .await
    }

    async fn set_comment_status(
        &self,
        id: &str,
        status: CommentStatus,
    ) -> Result<bool, StoreError> {
        self.call("set_comment_status", self.db.set_comment_status(id, status))
            .await
    }

    async fn delete_comment(&self, id: &str) -> Result<bool, StoreError> {
        self.call("delete_comment", self.db.delete_comment(id)).await
    }
}

#[async_trait]
impl LikeStore for DbStore {
    async fn has_like(&self, article_id: &str, visitor_key: &str) -> Result<bool, StoreError> {
        self.call("has_like", self.db.has_like(article_id, visitor_key))
            .await
    }

    async fn like_count(&self, article_id: &str) -> Result<Option<i64>, StoreError> {
        self.call("like_count", self.db.like_count(article_id)).await
    }

    async fn add_like(
        &self,
        article_id: &str,
        visitor_key: &str,
        now: NaiveDateTime,
    ) -> Result<Option<i64>, StoreError> {
        self.call("add_like", self.db.add_like(article_id, visitor_key, now))
            .await
    }

    async fn remove_like(
        &self,
        article_id: &str,
        visitor_key: &str,
    ) -> Result<Option<i64>, StoreError> {
        self.call("remove_like", self.db.remove_like(article_id, visitor_key))
            .await
    }
}

#[async_trait]
impl EditorialStore for DbStore {
    async fn all_articles(&self) -> Result<Vec<Article>, StoreError> {
        self.call("all_articles", self.db.list_all_articles()).await
    }

    async fn article(&self, id: &str) -> Result<Option<Article>, StoreError> {
        self.call("article", self.db.get_article(id)).await
    }

    async fn insert_article(&self, article: &Article) -> Result<(), StoreError> {
        self.call("insert_article", self.db.insert_article(article))
            .await
    }

    async fn update_article_status(
        &self,
        id: &str,
        status: ArticleStatus,
        published_at: Option<NaiveDateTime>,
        updated_at: NaiveDateTime,
    ) -> Result<bool, StoreError> {
        self.call(
            "update_article_status",
            self.db
                .update_article_status(id, status, published_at, updated_at),
        )
        .await
    }

    async fn delete_article(&self, id: &str) -> Result<bool, StoreError> {
        self.call("delete_article", self.db.delete_article(id)).await
    }

    async fn article_stats(
        &self,
        month_start: NaiveDateTime,
        next_month_start: NaiveDateTime,
    ) -> Result<ArticleStats, StoreError> {
        self.call(
            "article_stats",
            self.db.article_stats(month_start, next_month_start),
        )
        .await
    }
}

#[async_trait]
impl DirectoryStore for DbStore {
    async fn members(&self) -> Result<Vec<Member>, StoreError> {
        self.call("members", self.db.list_members()).await
    }

    async fn member(&self, id: &str) -> Result<Option<Member>, StoreError> {
        self.call("member", self.db.get_member(id)).await
    }

    async fn upsert_member(&self, member: &Member) -> Result<(), StoreError> {
        self.call("upsert_member", self.db.upsert_member(member))
            .await
    }

    async fn categories(&self) -> Result<Vec<Category>, StoreError> {
        self.call("categories", self.db.list_categories()).await
    }

    async fn category(&self, id: &str) -> Result<Option<Category>, StoreError> {
        self.call("category", self.db.get_category(id)).await
    }

    async fn upsert_category(&self, category: &Category) -> Result<bool, StoreError> {
        self.call("upsert_category", self.db.upsert_category(category))
            .await
    }
}
