use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentStatus {
    Pending,
    Approved,
    Rejected,
}

impl CommentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommentStatus::Pending => "pending",
            CommentStatus::Approved => "approved",
            CommentStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for CommentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(CommentStatus::Pending),
            "approved" => Ok(CommentStatus::Approved),
            "rejected" => Ok(CommentStatus::Rejected),
            other => Err(format!("unknown comment status: {}", other)),
        }
    }
}

impl fmt::Display for CommentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 审核动作只能给出通过或拒绝，不能退回待审核
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Moderation {
    Approved,
    Rejected,
}

impl From<Moderation> for CommentStatus {
    fn from(m: Moderation) -> Self {
        match m {
            Moderation::Approved => CommentStatus::Approved,
            Moderation::Rejected => CommentStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub article_id: String,
    pub parent_id: Option<String>,
    pub author_name: String,
    // 只写字段：永远不会出现在响应里
    #[serde(skip_serializing, default)]
    pub email: String,
    pub content: String,
    pub status: CommentStatus,
    pub created_at: NaiveDateTime,
}

/// 公开提交的评论表单
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewComment {
    pub article_id: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    pub author_name: String,
    pub email: String,
    pub content: String,
}

impl NewComment {
    /// 校验四个必填字段，生成一条待审核记录。
    /// 只是客户端友好性检查，不构成安全边界。
    pub fn into_pending(self, id: String, now: NaiveDateTime) -> Result<Comment, ValidationError> {
        let article_id = required("article_id", self.article_id)?;
        let author_name = required("author_name", self.author_name)?;
        let email = required("email", self.email)?;
        if self.content.trim().is_empty() {
            return Err(ValidationError::missing("content"));
        }

        Ok(Comment {
            id,
            article_id,
            parent_id: self.parent_id.filter(|p| !p.trim().is_empty()),
            author_name,
            email,
            content: self.content,
            status: CommentStatus::Pending,
            created_at: now,
        })
    }
}

fn required(field: &'static str, value: String) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::missing(field));
    }
    Ok(trimmed.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleStatus {
    #[default]
    Draft,
    Published,
}

impl ArticleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArticleStatus::Draft => "draft",
            ArticleStatus::Published => "published",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ArticleStatus::Draft => ArticleStatus::Published,
            ArticleStatus::Published => ArticleStatus::Draft,
        }
    }
}

impl FromStr for ArticleStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(ArticleStatus::Draft),
            "published" => Ok(ArticleStatus::Published),
            other => Err(format!("unknown article status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub status: ArticleStatus,
    pub category_tags: Vec<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub published_at: Option<NaiveDateTime>,
    pub view_count: i64,
    pub like_count: i64,
}

/// 状态切换后的 published_at。
/// 只在第一次发布时写入；撤回为草稿时保留原值。
pub fn publish_transition(
    current: Option<NaiveDateTime>,
    next: ArticleStatus,
    now: NaiveDateTime,
) -> Option<NaiveDateTime> {
    match next {
        ArticleStatus::Published => current.or(Some(now)),
        ArticleStatus::Draft => current,
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewArticle {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub category_tags: Vec<String>,
    #[serde(default)]
    pub status: ArticleStatus,
}

impl NewArticle {
    pub fn into_article(self, id: String, now: NaiveDateTime) -> Result<Article, ValidationError> {
        let title = required("title", self.title)?;
        if self.content.trim().is_empty() {
            return Err(ValidationError::missing("content"));
        }

        let category_tags = self
            .category_tags
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();

        Ok(Article {
            id,
            title,
            content: self.content,
            excerpt: self.excerpt.trim().to_string(),
            status: self.status,
            category_tags,
            created_at: now,
            updated_at: now,
            published_at: publish_transition(None, self.status, now),
            view_count: 0,
            like_count: 0,
        })
    }
}

/// 尽力而为的访客去重键，不是身份认证。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisitorId {
    Known(String),
    Unknown,
}

impl VisitorId {
    pub fn from_address(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(addr) if !addr.is_empty() && !addr.eq_ignore_ascii_case("unknown") => {
                VisitorId::Known(addr.to_string())
            }
            _ => VisitorId::Unknown,
        }
    }

    pub fn as_known(&self) -> Option<&str> {
        match self {
            VisitorId::Known(addr) => Some(addr),
            VisitorId::Unknown => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub name: String,
    pub nickname: String,
    pub age: i64,
    pub birthday: String,
    pub position: String,
    pub personality: String,
    pub hobbies: String,
    pub image_color: String,
    pub catchphrase: String,
    pub profile_image_url: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub color: String,
    pub created_at: NaiveDateTime,
}

/// 成员资料的整体替换表单
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemberForm {
    pub name: String,
    #[serde(default)]
    pub nickname: String,
    #[serde(default)]
    pub age: i64,
    #[serde(default)]
    pub birthday: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub personality: String,
    #[serde(default)]
    pub hobbies: String,
    #[serde(default)]
    pub image_color: String,
    #[serde(default)]
    pub catchphrase: String,
    #[serde(default)]
    pub profile_image_url: String,
}

impl MemberForm {
    /// created_at 由调用方给出：已有记录沿用首次写入的时间
    pub fn into_member(
        self,
        id: String,
        created_at: NaiveDateTime,
        now: NaiveDateTime,
    ) -> Result<Member, ValidationError> {
        Ok(Member {
            id,
            name: required("name", self.name)?,
            nickname: self.nickname,
            age: self.age,
            birthday: self.birthday,
            position: self.position,
            personality: self.personality,
            hobbies: self.hobbies,
            image_color: self.image_color,
            catchphrase: self.catchphrase,
            profile_image_url: self.profile_image_url,
            created_at,
            updated_at: now,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryForm {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub color: String,
}

impl CategoryForm {
    pub fn into_category(
        self,
        id: String,
        created_at: NaiveDateTime,
    ) -> Result<Category, ValidationError> {
        Ok(Category {
            id,
            name: required("name", self.name)?,
            slug: required("slug", self.slug)?,
            description: self.description,
            color: self.color,
            created_at,
        })
    }
}

/// 后台统计，草稿也计入 total_articles、total_views 与 total_likes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleStats {
    pub total_articles: i64,
    pub published_articles: i64,
    pub published_this_month: i64,
    pub total_views: i64,
    pub total_likes: i64,
}

/// 首页展示用的统计，只统计已发布的文章
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicStats {
    pub total_articles: i64,
    pub total_views: i64,
    pub published_this_month: i64,
}
