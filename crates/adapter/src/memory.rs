//! 测试用的内存存储，实现全部存储端口
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use domain::{
    Article, ArticleQuery, ArticleRows, ArticleStats, ArticleStatus, Category, Comment,
    CommentStatus, Member, PublicStats, StoreError,
};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::traits::{
    ArticleSearch, ArticleStore, CommentStore, DirectoryStore, EditorialStore, LikeStore,
};

type Latency = Box<dyn Fn(&ArticleQuery) -> Duration + Send + Sync>;

#[derive(Default)]
struct Tables {
    articles: Vec<Article>,
    comments: Vec<Comment>,
    likes: HashSet<(String, String)>,
    members: Vec<Member>,
    categories: Vec<Category>,
}

impl Tables {
    fn is_published(&self, id: &str) -> bool {
        self.articles
            .iter()
            .any(|a| a.id == id && a.status == ArticleStatus::Published)
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    failing: AtomicBool,
    queries: AtomicUsize,
    latency: Mutex<Option<Latency>>,
}

pub fn at(day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, day)
        .and_then(|d| d.and_hms_opt(9, 0, 0))
        .unwrap()
}

pub fn published(id: &str, day: u32) -> Article {
    Article {
        id: id.into(),
        title: format!("Article {}", id),
        content: format!("Body of {}", id),
        excerpt: String::new(),
        status: ArticleStatus::Published,
        category_tags: Vec::new(),
        created_at: at(day),
        updated_at: at(day),
        published_at: Some(at(day)),
        view_count: 0,
        like_count: 0,
    }
}

pub fn draft(id: &str, day: u32) -> Article {
    Article {
        status: ArticleStatus::Draft,
        published_at: None,
        ..published(id, day)
    }
}

impl MemoryStore {
    pub fn with_articles(articles: Vec<Article>) -> Self {
        let store = Self::default();
        store.tables.lock().unwrap().articles = articles;
        store
    }

    pub fn fail_all(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// `query_articles` 在返回前按查询内容等待
    pub fn set_latency(&self, f: impl Fn(&ArticleQuery) -> Duration + Send + Sync + 'static) {
        *self.latency.lock().unwrap() = Some(Box::new(f));
    }

    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn like_rows(&self) -> usize {
        self.tables.lock().unwrap().likes.len()
    }

    pub fn article_snapshot(&self, id: &str) -> Option<Article> {
        let tables = self.tables.lock().unwrap();
        tables.articles.iter().find(|a| a.id == id).cloned()
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(StoreError::Backend("memory store offline".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ArticleSearch for MemoryStore {
    async fn query_articles(&self, query: &ArticleQuery) -> Result<ArticleRows, StoreError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        let delay = self
            .latency
            .lock()
            .unwrap()
            .as_ref()
            .map(|f| f(query))
            .unwrap_or_default();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.check()?;

        let tables = self.tables.lock().unwrap();
        let mut hits: Vec<Article> = tables
            .articles
            .iter()
            .filter(|a| query.matches(a))
            .cloned()
            .collect();
        hits.sort_by(|a, b| query.compare(a, b));

        let total_count = hits.len() as i64;
        let items = hits
            .into_iter()
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .collect();
        Ok(ArticleRows { items, total_count })
    }
}

#[async_trait]
impl ArticleStore for MemoryStore {
    async fn published_article(&self, id: &str) -> Result<Option<Article>, StoreError> {
        self.check()?;
        Ok(self
            .article_snapshot(id)
            .filter(|a| a.status == ArticleStatus::Published))
    }

    async fn increment_view_count(&self, id: &str) -> Result<bool, StoreError> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        match tables.articles.iter_mut().find(|a| a.id == id) {
            Some(a) => {
                a.view_count += 1;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn public_stats(
        &self,
        month_start: NaiveDateTime,
        next_month_start: NaiveDateTime,
    ) -> Result<PublicStats, StoreError> {
        self.check()?;
        let tables = self.tables.lock().unwrap();
        let live: Vec<&Article> = tables
            .articles
            .iter()
            .filter(|a| a.status == ArticleStatus::Published)
            .collect();
        Ok(PublicStats {
            total_articles: live.len() as i64,
            total_views: live.iter().map(|a| a.view_count).sum(),
            published_this_month: live
                .iter()
                .filter(|a| {
                    a.published_at
                        .is_some_and(|p| p >= month_start && p < next_month_start)
                })
                .count() as i64,
        })
    }
}

#[async_trait]
impl CommentStore for MemoryStore {
    async fn insert_comment(&self, comment: &Comment) -> Result<bool, StoreError> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        let open = tables.is_published(&comment.article_id);
        if open {
            tables.comments.push(comment.clone());
        }
        Ok(open)
    }

    async fn approved_comments(
        &self,
        article_id: &str,
    ) -> Result<Option<Vec<Comment>>, StoreError> {
        self.check()?;
        let tables = self.tables.lock().unwrap();
        if !tables.is_published(article_id) {
            return Ok(None);
        }
        Ok(Some(
            tables
                .comments
                .iter()
                .rev()
                .filter(|c| c.article_id == article_id && c.status == CommentStatus::Approved)
                .cloned()
                .collect(),
        ))
    }

    async fn comments_by_status(&self, status: CommentStatus) -> Result<Vec<Comment>, StoreError> {
        self.check()?;
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .comments
            .iter()
            .rev()
            .filter(|c| c.status == status)
            .cloned()
            .collect())
    }

    async fn set_comment_status(
        &self,
        id: &str,
        status: CommentStatus,
    ) -> Result<bool, StoreError> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        match tables.comments.iter_mut().find(|c| c.id == id) {
            Some(c) => {
                c.status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_comment(&self, id: &str) -> Result<bool, StoreError> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        let before = tables.comments.len();
        tables.comments.retain(|c| c.id != id);
        Ok(tables.comments.len() != before)
    }
}

#[async_trait]
impl LikeStore for MemoryStore {
    async fn has_like(&self, article_id: &str, visitor_key: &str) -> Result<bool, StoreError> {
        self.check()?;
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .likes
            .contains(&(article_id.to_string(), visitor_key.to_string())))
    }

    async fn like_count(&self, article_id: &str) -> Result<Option<i64>, StoreError> {
        self.check()?;
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .articles
            .iter()
            .find(|a| a.id == article_id && a.status == ArticleStatus::Published)
            .map(|a| a.like_count))
    }

    async fn add_like(
        &self,
        article_id: &str,
        visitor_key: &str,
        _now: NaiveDateTime,
    ) -> Result<Option<i64>, StoreError> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        let Tables {
            articles, likes, ..
        } = &mut *tables;
        let Some(article) = articles
            .iter_mut()
            .find(|a| a.id == article_id && a.status == ArticleStatus::Published)
        else {
            return Ok(None);
        };
        if likes.insert((article_id.to_string(), visitor_key.to_string())) {
            article.like_count += 1;
        }
        Ok(Some(article.like_count))
    }

    async fn remove_like(
        &self,
        article_id: &str,
        visitor_key: &str,
    ) -> Result<Option<i64>, StoreError> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        let Tables {
            articles, likes, ..
        } = &mut *tables;
        let Some(article) = articles
            .iter_mut()
            .find(|a| a.id == article_id && a.status == ArticleStatus::Published)
        else {
            return Ok(None);
        };
        if likes.remove(&(article_id.to_string(), visitor_key.to_string())) {
            article.like_count = (article.like_count - 1).max(0);
        }
        Ok(Some(article.like_count))
    }
}

#[async_trait]
impl EditorialStore for MemoryStore {
    async fn all_articles(&self) -> Result<Vec<Article>, StoreError> {
        self.check()?;
        let tables = self.tables.lock().unwrap();
        let mut all = tables.articles.clone();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn article(&self, id: &str) -> Result<Option<Article>, StoreError> {
        self.check()?;
        Ok(self.article_snapshot(id))
    }

    async fn insert_article(&self, article: &Article) -> Result<(), StoreError> {
        self.check()?;
        self.tables.lock().unwrap().articles.push(article.clone());
        Ok(())
    }

    async fn update_article_status(
        &self,
        id: &str,
        status: ArticleStatus,
        published_at: Option<NaiveDateTime>,
        updated_at: NaiveDateTime,
    ) -> Result<bool, StoreError> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        match tables.articles.iter_mut().find(|a| a.id == id) {
            Some(a) => {
                a.status = status;
                a.published_at = published_at;
                a.updated_at = updated_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_article(&self, id: &str) -> Result<bool, StoreError> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        let before = tables.articles.len();
        tables.articles.retain(|a| a.id != id);
        let removed = tables.articles.len() != before;
        if removed {
            tables.comments.retain(|c| c.article_id != id);
            tables.likes.retain(|(article, _)| article != id);
        }
        Ok(removed)
    }

    async fn article_stats(
        &self,
        month_start: NaiveDateTime,
        next_month_start: NaiveDateTime,
    ) -> Result<ArticleStats, StoreError> {
        self.check()?;
        let tables = self.tables.lock().unwrap();
        let published = |a: &&Article| a.status == ArticleStatus::Published;
        Ok(ArticleStats {
            total_articles: tables.articles.len() as i64,
            published_articles: tables.articles.iter().filter(published).count() as i64,
            published_this_month: tables
                .articles
                .iter()
                .filter(published)
                .filter(|a| {
                    a.published_at
                        .is_some_and(|p| p >= month_start && p < next_month_start)
                })
                .count() as i64,
            total_views: tables.articles.iter().map(|a| a.view_count).sum(),
            total_likes: tables.articles.iter().map(|a| a.like_count).sum(),
        })
    }
}

#[async_trait]
impl DirectoryStore for MemoryStore {
    async fn members(&self) -> Result<Vec<Member>, StoreError> {
        self.check()?;
        let mut all = self.tables.lock().unwrap().members.clone();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(all)
    }

    async fn member(&self, id: &str) -> Result<Option<Member>, StoreError> {
        self.check()?;
        let tables = self.tables.lock().unwrap();
        Ok(tables.members.iter().find(|m| m.id == id).cloned())
    }

    async fn upsert_member(&self, member: &Member) -> Result<(), StoreError> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        tables.members.retain(|m| m.id != member.id);
        tables.members.push(member.clone());
        Ok(())
    }

    async fn categories(&self) -> Result<Vec<Category>, StoreError> {
        self.check()?;
        let mut all = self.tables.lock().unwrap().categories.clone();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    async fn category(&self, id: &str) -> Result<Option<Category>, StoreError> {
        self.check()?;
        let tables = self.tables.lock().unwrap();
        Ok(tables.categories.iter().find(|c| c.id == id).cloned())
    }

    async fn upsert_category(&self, category: &Category) -> Result<bool, StoreError> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        if tables
            .categories
            .iter()
            .any(|c| c.slug == category.slug && c.id != category.id)
        {
            return Ok(false);
        }
        tables.categories.retain(|c| c.id != category.id);
        tables.categories.push(category.clone());
        Ok(true)
    }
}
