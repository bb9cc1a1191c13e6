//! 文章列表查询规划：把用户的筛选状态翻译成一次有界的存储查询，
//! 再把结果的总数解释成页数。

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

use crate::models::{Article, ArticleStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Newest,
    Oldest,
    MostLiked,
    MostViewed,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "newest" => Ok(SortKey::Newest),
            "oldest" => Ok(SortKey::Oldest),
            "most_liked" => Ok(SortKey::MostLiked),
            "most_viewed" => Ok(SortKey::MostViewed),
            other => Err(format!("unknown sort key: {}", other)),
        }
    }
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Newest => "newest",
            SortKey::Oldest => "oldest",
            SortKey::MostLiked => "most_liked",
            SortKey::MostViewed => "most_viewed",
        }
    }
}

/// 列表页的筛选条件（不含页码）。只存在于界面状态中，不持久化。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    #[serde(default)]
    pub search_term: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub date_from: Option<NaiveDate>,
    #[serde(default)]
    pub date_to: Option<NaiveDate>,
    #[serde(default)]
    pub sort: SortKey,
}

/// 所有谓词之间为 AND 关系
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    Status(ArticleStatus),
    /// 标题或正文包含该词（不区分大小写的子串匹配）
    TextMatch(String),
    /// 标签集合与给定集合有交集
    TagsAny(Vec<String>),
    PublishedFrom(NaiveDateTime),
    PublishedUntil(NaiveDateTime),
}

impl Predicate {
    pub fn matches(&self, article: &Article) -> bool {
        match self {
            Predicate::Status(status) => article.status == *status,
            Predicate::TextMatch(term) => {
                let needle = fold_case(term);
                fold_case(&article.title).contains(&needle)
                    || fold_case(&article.content).contains(&needle)
            }
            Predicate::TagsAny(tags) => article.category_tags.iter().any(|t| tags.contains(t)),
            Predicate::PublishedFrom(start) => article.published_at.is_some_and(|p| p >= *start),
            Predicate::PublishedUntil(end) => article.published_at.is_some_and(|p| p <= *end),
        }
    }
}

/// 搜索比较用的大小写折叠，按 Unicode 规则。存储层写入的折叠列也用它。
pub fn fold_case(text: &str) -> String {
    text.to_lowercase()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    PublishedAt,
    LikeCount,
    ViewCount,
}

impl SortField {
    pub fn column(&self) -> &'static str {
        match self {
            SortField::PublishedAt => "published_at",
            SortField::LikeCount => "like_count",
            SortField::ViewCount => "view_count",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder {
    pub field: SortField,
    pub direction: Direction,
}

impl From<SortKey> for SortOrder {
    fn from(key: SortKey) -> Self {
        let (field, direction) = match key {
            SortKey::Newest => (SortField::PublishedAt, Direction::Desc),
            SortKey::Oldest => (SortField::PublishedAt, Direction::Asc),
            SortKey::MostLiked => (SortField::LikeCount, Direction::Desc),
            SortKey::MostViewed => (SortField::ViewCount, Direction::Desc),
        };
        SortOrder { field, direction }
    }
}

/// 只有四种排序对应用户可选的排序键
impl TryFrom<SortOrder> for SortKey {
    type Error = SortOrder;

    fn try_from(order: SortOrder) -> Result<Self, Self::Error> {
        match (order.field, order.direction) {
            (SortField::PublishedAt, Direction::Desc) => Ok(SortKey::Newest),
            (SortField::PublishedAt, Direction::Asc) => Ok(SortKey::Oldest),
            (SortField::LikeCount, Direction::Desc) => Ok(SortKey::MostLiked),
            (SortField::ViewCount, Direction::Desc) => Ok(SortKey::MostViewed),
            _ => Err(order),
        }
    }
}

/// 发给存储的一次查询。排序键相同的记录顺序由存储决定，不保证稳定。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleQuery {
    pub filter: Vec<Predicate>,
    pub order: SortOrder,
    pub offset: u32,
    pub limit: u32,
}

impl ArticleQuery {
    /// 页码从 1 开始，<= 0 时按 1 处理；page_size 至少为 1。
    pub fn plan(filters: &FilterState, page: i64, page_size: u32) -> Self {
        let page_size = page_size.max(1);
        let page = u32::try_from(page.max(1)).unwrap_or(u32::MAX);

        // 草稿永远不会出现在公开列表里
        let mut filter = vec![Predicate::Status(ArticleStatus::Published)];

        let term = filters.search_term.trim();
        if !term.is_empty() {
            filter.push(Predicate::TextMatch(term.to_string()));
        }

        if !filters.categories.is_empty() {
            filter.push(Predicate::TagsAny(filters.categories.clone()));
        }

        if let Some(start) = filters.date_from {
            filter.push(Predicate::PublishedFrom(start.and_time(NaiveTime::MIN)));
        }

        if let Some(end) = filters.date_to.and_then(end_of_day) {
            filter.push(Predicate::PublishedUntil(end));
        }

        ArticleQuery {
            filter,
            order: filters.sort.into(),
            offset: (page - 1).saturating_mul(page_size),
            limit: page_size,
        }
    }

    pub fn matches(&self, article: &Article) -> bool {
        self.filter.iter().all(|p| p.matches(article))
    }

    /// 与 `order` 一致的内存比较，供不经过 SQL 的存储实现使用
    pub fn compare(&self, a: &Article, b: &Article) -> Ordering {
        let ord = match self.order.field {
            SortField::PublishedAt => a.published_at.cmp(&b.published_at),
            SortField::LikeCount => a.like_count.cmp(&b.like_count),
            SortField::ViewCount => a.view_count.cmp(&b.view_count),
        };
        match self.order.direction {
            Direction::Asc => ord,
            Direction::Desc => ord.reverse(),
        }
    }
}

// 结束日期包含当天整天
fn end_of_day(date: NaiveDate) -> Option<NaiveDateTime> {
    date.and_hms_milli_opt(23, 59, 59, 999)
}

/// 存储返回的一页数据，附带满足条件的总数
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleRows {
    pub items: Vec<Article>,
    pub total_count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticlePage {
    pub items: Vec<Article>,
    pub total_pages: u32,
    /// 满足条件的文章总数（所有页）
    #[serde(default)]
    pub total_count: i64,
}

impl ArticlePage {
    /// 总数为 0 时仍然报告 1 页（空页）
    pub fn interpret(rows: ArticleRows, page_size: u32) -> Self {
        let page_size = u64::from(page_size.max(1));
        let total = u64::try_from(rows.total_count).unwrap_or(0);
        let pages = total.div_ceil(page_size).max(1);

        ArticlePage {
            items: rows.items,
            total_pages: u32::try_from(pages).unwrap_or(u32::MAX),
            total_count: rows.total_count,
        }
    }
}
