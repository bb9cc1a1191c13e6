use crate::Db;
use chrono::NaiveDateTime;

const PUBLISHED_LIKE_COUNT: &str =
    "SELECT like_count FROM articles WHERE id = ? AND status = 'published'";

impl Db {
    pub async fn has_like(&self, article_id: &str, visitor_key: &str) -> anyhow::Result<bool> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT 1 FROM likes WHERE article_id = ? AND visitor_key = ?")
                .bind(article_id)
                .bind(visitor_key)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.is_some())
    }

    /// 文章不存在或未发布时返回 None
    pub async fn like_count(&self, article_id: &str) -> anyhow::Result<Option<i64>> {
        let row: Option<(i64,)> = sqlx::query_as(PUBLISHED_LIKE_COUNT)
            .bind(article_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(count,)| count))
    }

    /// 写入点赞事实并自增计数；同一 (文章, 访客) 只会计一次。
    /// 返回最新计数，文章不存在或未发布时返回 None。
    pub async fn add_like(
        &self,
        article_id: &str,
        visitor_key: &str,
        now: NaiveDateTime,
    ) -> anyhow::Result<Option<i64>> {
        let mut tx = self.pool.begin().await?;

        let exists: Option<(i64,)> = sqlx::query_as(PUBLISHED_LIKE_COUNT)
            .bind(article_id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Ok(None);
        }

        let inserted = sqlx::query(
            r#"
            INSERT INTO likes (article_id, visitor_key, created_at)
            VALUES (?, ?, ?)
            ON CONFLICT(article_id, visitor_key) DO NOTHING
            "#,
        )
        .bind(article_id)
        .bind(visitor_key)
        .bind(now)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if inserted > 0 {
            sqlx::query("UPDATE articles SET like_count = like_count + 1 WHERE id = ?")
                .bind(article_id)
                .execute(&mut *tx)
                .await?;
        }

        let (count,): (i64,) = sqlx::query_as("SELECT like_count FROM articles WHERE id = ?")
            .bind(article_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(count))
    }

    /// 删除点赞事实并递减计数，计数不会低于 0。
    /// 文章不存在或未发布时不做任何修改，返回 None。
    pub async fn remove_like(
        &self,
        article_id: &str,
        visitor_key: &str,
    ) -> anyhow::Result<Option<i64>> {
        let mut tx = self.pool.begin().await?;

        let exists: Option<(i64,)> = sqlx::query_as(PUBLISHED_LIKE_COUNT)
            .bind(article_id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Ok(None);
        }

        let removed = sqlx::query("DELETE FROM likes WHERE article_id = ? AND visitor_key = ?")
            .bind(article_id)
            .bind(visitor_key)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if removed > 0 {
            sqlx::query("UPDATE articles SET like_count = MAX(like_count - 1, 0) WHERE id = ?")
                .bind(article_id)
                .execute(&mut *tx)
                .await?;
        }

        let (count,): (i64,) = sqlx::query_as("SELECT like_count FROM articles WHERE id = ?")
            .bind(article_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(count))
    }
}
