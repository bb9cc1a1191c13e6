use chrono::NaiveDateTime;
use domain::{
    publish_transition, Article, ArticleStats, NewArticle, NotFoundError, SiteError,
};
use std::sync::Arc;
use tracing::info;

use crate::traits::EditorialStore;
use crate::{month_bounds, new_id, now};

/// 后台文章管理。鉴权在 HTTP 层完成。
pub struct AdminService<S: ?Sized> {
    store: Arc<S>,
}

impl<S: ?Sized> Clone for AdminService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: EditorialStore + ?Sized> AdminService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// 包括草稿，按创建时间倒序
    pub async fn articles(&self) -> Result<Vec<Article>, SiteError> {
        Ok(self.store.all_articles().await?)
    }

    pub async fn create(&self, input: NewArticle) -> Result<Article, SiteError> {
        let article = input.into_article(new_id(), now())?;
        self.store.insert_article(&article).await?;
        info!("Article {} created ({})", article.id, article.status.as_str());
        Ok(article)
    }

    /// 在草稿与已发布之间切换，published_at 只在首次发布时写入
    pub async fn toggle_status(&self, id: &str) -> Result<Article, SiteError> {
        let mut article = self
            .store
            .article(id)
            .await?
            .ok_or_else(|| NotFoundError::article(id))?;

        let at = now();
        let status = article.status.toggled();
        let published_at = publish_transition(article.published_at, status, at);

        if !self
            .store
            .update_article_status(id, status, published_at, at)
            .await?
        {
            return Err(NotFoundError::article(id).into());
        }

        info!("Article {} -> {}", id, status.as_str());
        article.status = status;
        article.published_at = published_at;
        article.updated_at = at;
        Ok(article)
    }

    /// 评论与点赞随文章一起删除
    pub async fn delete(&self, id: &str) -> Result<(), SiteError> {
        if !self.store.delete_article(id).await? {
            return Err(NotFoundError::article(id).into());
        }
        info!("Article {} deleted", id);
        Ok(())
    }

    pub async fn stats(&self, at: NaiveDateTime) -> Result<ArticleStats, SiteError> {
        let (start, end) = month_bounds(at);
        Ok(self.store.article_stats(start, end).await?)
    }
}
