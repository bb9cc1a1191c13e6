use async_trait::async_trait;
use chrono::NaiveDateTime;
use domain::{
    Article, ArticleQuery, ArticleRows, ArticleStats, ArticleStatus, Category, Comment,
    CommentStatus, Member, PublicStats, StoreError,
};

type Result<T> = std::result::Result<T, StoreError>;

/// 列表控制器只需要分页查询；也可以由远程 HTTP 客户端实现
#[async_trait]
pub trait ArticleSearch: Send + Sync {
    async fn query_articles(&self, query: &ArticleQuery) -> Result<ArticleRows>;
}

/// 公开文章列表与详情页用到的存储能力
#[async_trait]
pub trait ArticleStore: ArticleSearch {
    /// 草稿与不存在的文章都返回 None
    async fn published_article(&self, id: &str) -> Result<Option<Article>>;
    async fn increment_view_count(&self, id: &str) -> Result<bool>;
    /// 只统计已发布的文章
    async fn public_stats(
        &self,
        month_start: NaiveDateTime,
        next_month_start: NaiveDateTime,
    ) -> Result<PublicStats>;
}

#[async_trait]
pub trait CommentStore: Send + Sync {
    /// false: 目标文章不存在或未发布
    async fn insert_comment(&self, comment: &Comment) -> Result<bool>;
    /// 最新的在前；None: 文章不存在或未发布
    async fn approved_comments(&self, article_id: &str) -> Result<Option<Vec<Comment>>>;
    async fn comments_by_status(&self, status: CommentStatus) -> Result<Vec<Comment>>;
    /// false: 评论不存在
    async fn set_comment_status(&self, id: &str, status: CommentStatus) -> Result<bool>;
    async fn delete_comment(&self, id: &str) -> Result<bool>;
}

/// 计数返回 None 表示文章不存在或未发布
#[async_trait]
pub trait LikeStore: Send + Sync {
    async fn has_like(&self, article_id: &str, visitor_key: &str) -> Result<bool>;
    async fn like_count(&self, article_id: &str) -> Result<Option<i64>>;
    async fn add_like(
        &self,
        article_id: &str,
        visitor_key: &str,
        now: NaiveDateTime,
    ) -> Result<Option<i64>>;
    async fn remove_like(&self, article_id: &str, visitor_key: &str) -> Result<Option<i64>>;
}

/// 管理后台的文章维护
#[async_trait]
pub trait EditorialStore: Send + Sync {
    async fn all_articles(&self) -> Result<Vec<Article>>;
    async fn article(&self, id: &str) -> Result<Option<Article>>;
    async fn insert_article(&self, article: &Article) -> Result<()>;
    async fn update_article_status(
        &self,
        id: &str,
        status: ArticleStatus,
        published_at: Option<NaiveDateTime>,
        updated_at: NaiveDateTime,
    ) -> Result<bool>;
    async fn delete_article(&self, id: &str) -> Result<bool>;
    async fn article_stats(
        &self,
        month_start: NaiveDateTime,
        next_month_start: NaiveDateTime,
    ) -> Result<ArticleStats>;
}

/// 成员与分类目录
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    async fn members(&self) -> Result<Vec<Member>>;
    async fn member(&self, id: &str) -> Result<Option<Member>>;
    async fn upsert_member(&self, member: &Member) -> Result<()>;
    async fn categories(&self) -> Result<Vec<Category>>;
    async fn category(&self, id: &str) -> Result<Option<Category>>;
    /// false: slug 已被其他分类占用
    async fn upsert_category(&self, category: &Category) -> Result<bool>;
}
