use domain::{NotFoundError, SiteError, VisitorId};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::info;

use crate::now;
use crate::traits::LikeStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LikeState {
    pub liked: bool,
    pub like_count: i64,
}

/// 点赞按 (文章, 访客键) 去重。访客键是加盐地址的摘要，不落原始地址。
pub struct LikeService<S: ?Sized> {
    store: Arc<S>,
    salt: String,
}

impl<S: ?Sized> Clone for LikeService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            salt: self.salt.clone(),
        }
    }
}

impl<S: LikeStore + ?Sized> LikeService<S> {
    pub fn new(store: Arc<S>, salt: impl Into<String>) -> Self {
        Self {
            store,
            salt: salt.into(),
        }
    }

    /// 无法识别的访客每次得到不同的键，彼此不会合并。
    ///
    /// 已知限制：这类点赞永远无法被撤销，每次 toggle 都会在 likes 表新增一行，
    /// 表会随之无界增长。目前不做限流，清理需要按 `unknown-` 前缀离线删除并重算计数。
    pub fn visitor_key(&self, visitor: &VisitorId) -> String {
        match visitor.as_known() {
            Some(addr) => {
                let mut hasher = Sha256::new();
                hasher.update(self.salt.as_bytes());
                hasher.update(addr.as_bytes());
                hex::encode(hasher.finalize())
            }
            // 一次性键，对应的点赞行不会再被删除
            None => format!("unknown-{}", hex::encode(rand::random::<[u8; 8]>())),
        }
    }

    pub async fn status(
        &self,
        article_id: &str,
        visitor: &VisitorId,
    ) -> Result<LikeState, SiteError> {
        let like_count = self
            .store
            .like_count(article_id)
            .await?
            .ok_or_else(|| NotFoundError::article(article_id))?;

        let liked = match visitor {
            VisitorId::Known(_) => {
                self.store
                    .has_like(article_id, &self.visitor_key(visitor))
                    .await?
            }
            VisitorId::Unknown => false,
        };
        Ok(LikeState { liked, like_count })
    }

    pub async fn toggle(
        &self,
        article_id: &str,
        visitor: &VisitorId,
    ) -> Result<LikeState, SiteError> {
        let key = self.visitor_key(visitor);
        let liked = !self.store.has_like(article_id, &key).await?;

        let count = if liked {
            self.store.add_like(article_id, &key, now()).await?
        } else {
            self.store.remove_like(article_id, &key).await?
        };
        let like_count = count.ok_or_else(|| NotFoundError::article(article_id))?;

        info!(
            "Article {} {} (likes: {})",
            article_id,
            if liked { "liked" } else { "unliked" },
            like_count
        );
        Ok(LikeState { liked, like_count })
    }
}
