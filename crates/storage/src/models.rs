use anyhow::Context;
use chrono::NaiveDateTime;
use domain::{Article, Category, Comment, Member};
use sqlx::FromRow;

#[derive(FromRow)]
pub struct SqlArticle {
    pub id: String,
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub status: String,
    pub category_tags: String, // JSON 数组
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub published_at: Option<NaiveDateTime>,
    pub view_count: i64,
    pub like_count: i64,
}

impl TryFrom<SqlArticle> for Article {
    type Error = anyhow::Error;

    fn try_from(sql: SqlArticle) -> Result<Self, Self::Error> {
        let status = sql.status.parse().map_err(anyhow::Error::msg)?;
        let category_tags = serde_json::from_str(&sql.category_tags)
            .with_context(|| format!("Malformed category_tags on article {}", sql.id))?;

        Ok(Article {
            id: sql.id,
            title: sql.title,
            content: sql.content,
            excerpt: sql.excerpt,
            status,
            category_tags,
            created_at: sql.created_at,
            updated_at: sql.updated_at,
            published_at: sql.published_at,
            view_count: sql.view_count,
            like_count: sql.like_count,
        })
    }
}

#[derive(FromRow)]
pub struct SqlComment {
    pub id: String,
    pub article_id: String,
    pub parent_id: Option<String>,
    pub author_name: String,
    pub email: String,
    pub content: String,
    pub status: String,
    pub created_at: NaiveDateTime,
}

impl TryFrom<SqlComment> for Comment {
    type Error = anyhow::Error;

    fn try_from(sql: SqlComment) -> Result<Self, Self::Error> {
        Ok(Comment {
            status: sql.status.parse().map_err(anyhow::Error::msg)?,
            id: sql.id,
            article_id: sql.article_id,
            parent_id: sql.parent_id,
            author_name: sql.author_name,
            email: sql.email,
            content: sql.content,
            created_at: sql.created_at,
        })
    }
}

#[derive(FromRow)]
pub struct SqlMember {
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

impl From<SqlMember> for Member {
    fn from(sql: SqlMember) -> Self {
        Member {
            id: sql.id,
            name: sql.name,
            nickname: sql.nickname,
            age: sql.age,
            birthday: sql.birthday,
            position: sql.position,
            personality: sql.personality,
            hobbies: sql.hobbies,
            image_color: sql.image_color,
            catchphrase: sql.catchphrase,
            profile_image_url: sql.profile_image_url,
            created_at: sql.created_at,
            updated_at: sql.updated_at,
        }
    }
}

#[derive(FromRow)]
pub struct SqlCategory {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub color: String,
    pub created_at: NaiveDateTime,
}

impl From<SqlCategory> for Category {
    fn from(sql: SqlCategory) -> Self {
        Category {
            id: sql.id,
            name: sql.name,
            slug: sql.slug,
            description: sql.description,
            color: sql.color,
            created_at: sql.created_at,
        }
    }
}
