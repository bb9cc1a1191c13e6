use sqlx::{migrate::MigrateDatabase, sqlite::SqlitePoolOptions, Pool, Sqlite};
use std::{fs, path::Path};
mod models;
mod repo;

#[derive(Clone)]
pub struct Db {
    pub(crate) pool: Pool<Sqlite>,
}

impl Db {
    pub async fn new(db_url: &str) -> anyhow::Result<Self> {
        let in_memory = db_url.contains(":memory:");
        if db_url.starts_with("sqlite://") && !in_memory {
            let path_str = db_url.trim_start_matches("sqlite://");
            let path = Path::new(path_str);
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    fs::create_dir_all(parent)?;
                }
            }
        }
        if !in_memory && !Sqlite::database_exists(db_url).await.unwrap_or(false) {
            Sqlite::create_database(db_url).await?;
        }

        // 内存库每个连接都是独立的数据库，只能用单连接
        let mut options = SqlitePoolOptions::new().max_connections(if in_memory { 1 } else { 8 });
        if in_memory {
            options = options.idle_timeout(None).max_lifetime(None);
        }
        let pool = options.connect(db_url).await?;

        if !in_memory {
            sqlx::query("PRAGMA journal_mode = WAL;")
                .execute(&pool)
                .await?;
            sqlx::query("PRAGMA synchronous = NORMAL;")
                .execute(&pool)
                .await?;
        }
        sqlx::migrate!("../../migrations").run(&pool).await?;
        tracing::debug!("Database ready at {}", db_url);
        Ok(Self { pool })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::Db;
    use chrono::{NaiveDate, NaiveDateTime};
    use domain::{Article, ArticleStatus};

    pub async fn memory_db() -> Db {
        Db::new("sqlite::memory:").await.unwrap()
    }

    pub fn ts(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|d| d.and_hms_opt(h, min, s))
            .unwrap()
    }

    pub fn article(id: &str, published_at: Option<NaiveDateTime>) -> Article {
        let created = ts(2024, 1, 1, 0, 0, 0);
        Article {
            id: id.to_string(),
            title: format!("Title {}", id),
            content: format!("Content {}", id),
            excerpt: String::new(),
            status: if published_at.is_some() {
                ArticleStatus::Published
            } else {
                ArticleStatus::Draft
            },
            category_tags: Vec::new(),
            created_at: created,
            updated_at: created,
            published_at,
            view_count: 0,
            like_count: 0,
        }
    }
}
