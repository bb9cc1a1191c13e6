use crate::{models::SqlCategory, Db};
use domain::Category;

impl Db {
    pub async fn list_categories(&self) -> anyhow::Result<Vec<Category>> {
        let rows = sqlx::query_as::<_, SqlCategory>(
            "SELECT id, name, slug, description, color, created_at FROM categories ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn get_category(&self, id: &str) -> anyhow::Result<Option<Category>> {
        let row = sqlx::query_as::<_, SqlCategory>(
            "SELECT id, name, slug, description, color, created_at FROM categories WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// 按 id 新建或更新。slug 已被其他分类占用时不写入，返回 false。
    pub async fn upsert_category(&self, c: &Category) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO categories (id, name, slug, description, color, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                slug = excluded.slug,
                description = excluded.description,
                color = excluded.color
            "#,
        )
        .bind(&c.id)
        .bind(&c.name)
        .bind(&c.slug)
        .bind(&c.description)
        .bind(&c.color)
        .bind(c.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(true),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
