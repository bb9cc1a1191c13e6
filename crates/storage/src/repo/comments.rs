use crate::{models::SqlComment, Db};
use domain::{Comment, CommentStatus};

const COMMENT_COLUMNS: &str =
    "id, article_id, parent_id, author_name, email, content, status, created_at";

fn into_comments(rows: Vec<SqlComment>) -> anyhow::Result<Vec<Comment>> {
    rows.into_iter().map(Comment::try_from).collect()
}

impl Db {
    /// 只允许评论已发布的文章。返回 false 表示文章不存在或仍是草稿。
    pub async fn insert_comment(&self, c: &Comment) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO comments (
                id, article_id, parent_id, author_name, email, content, status, created_at
            )
            SELECT ?, ?, ?, ?, ?, ?, ?, ?
            WHERE EXISTS (SELECT 1 FROM articles WHERE id = ? AND status = 'published')
            "#,
        )
        .bind(&c.id)
        .bind(&c.article_id)
        .bind(&c.parent_id)
        .bind(&c.author_name)
        .bind(&c.email)
        .bind(&c.content)
        .bind(c.status.as_str())
        .bind(c.created_at)
        .bind(&c.article_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// 公开视图：只取已审核的评论，最新的在前。
    /// 文章不存在或未发布时返回 None。
    pub async fn approved_comments(
        &self,
        article_id: &str,
    ) -> anyhow::Result<Option<Vec<Comment>>> {
        if !self.is_published(article_id).await? {
            return Ok(None);
        }

        let rows = sqlx::query_as::<_, SqlComment>(&format!(
            "SELECT {} FROM comments WHERE article_id = ? AND status = 'approved' \
             ORDER BY created_at DESC, id DESC",
            COMMENT_COLUMNS
        ))
        .bind(article_id)
        .fetch_all(&self.pool)
        .await?;

        into_comments(rows).map(Some)
    }

    /// 审核队列，最新的在前
    pub async fn comments_by_status(&self, status: CommentStatus) -> anyhow::Result<Vec<Comment>> {
        let rows = sqlx::query_as::<_, SqlComment>(&format!(
            "SELECT {} FROM comments WHERE status = ? ORDER BY created_at DESC",
            COMMENT_COLUMNS
        ))
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?;

        into_comments(rows)
    }

    pub async fn get_comment(&self, id: &str) -> anyhow::Result<Option<Comment>> {
        let row = sqlx::query_as::<_, SqlComment>(&format!(
            "SELECT {} FROM comments WHERE id = ?",
            COMMENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Comment::try_from).transpose()
    }

    /// 幂等：重复设置同一状态不是错误。返回 false 表示评论不存在。
    pub async fn set_comment_status(&self, id: &str, status: CommentStatus) -> anyhow::Result<bool> {
        let result = sqlx::query("UPDATE comments SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// 硬删除；它的回复在公开视图中会被提升为根评论
    pub async fn delete_comment(&self, id: &str) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
