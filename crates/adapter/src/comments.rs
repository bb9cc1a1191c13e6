use domain::{
    build_comment_tree, Comment, CommentNode, CommentStatus, Moderation, NewComment,
    NotFoundError, SiteError,
};
use std::sync::Arc;
use tracing::info;

use crate::traits::CommentStore;
use crate::{new_id, now};

/// 评论的提交、线程化展示与审核
pub struct CommentService<S: ?Sized> {
    store: Arc<S>,
}

impl<S: ?Sized> Clone for CommentService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: CommentStore + ?Sized> CommentService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// 新评论一律为 pending，审核通过后才会出现在公开视图
    pub async fn submit(&self, input: NewComment) -> Result<Comment, SiteError> {
        let comment = input.into_pending(new_id(), now())?;

        if !self.store.insert_comment(&comment).await? {
            return Err(NotFoundError::article(&comment.article_id).into());
        }

        info!(
            "Comment {} submitted on article {} (reply_to: {:?})",
            comment.id, comment.article_id, comment.parent_id
        );
        Ok(comment)
    }

    /// 最新的评论在前；文章不存在或未发布时返回 NotFound
    pub async fn thread(&self, article_id: &str) -> Result<Vec<CommentNode>, SiteError> {
        let approved = self
            .store
            .approved_comments(article_id)
            .await?
            .ok_or_else(|| NotFoundError::article(article_id))?;
        Ok(build_comment_tree(approved))
    }

    pub async fn queue(&self, status: CommentStatus) -> Result<Vec<Comment>, SiteError> {
        Ok(self.store.comments_by_status(status).await?)
    }

    /// 幂等
    pub async fn moderate(&self, id: &str, decision: Moderation) -> Result<(), SiteError> {
        let status = CommentStatus::from(decision);
        if !self.store.set_comment_status(id, status).await? {
            return Err(NotFoundError::comment(id).into());
        }
        info!("Comment {} moderated -> {}", id, status);
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<(), SiteError> {
        if !self.store.delete_comment(id).await? {
            return Err(NotFoundError::comment(id).into());
        }
        info!("Comment {} deleted", id);
        Ok(())
    }
}
