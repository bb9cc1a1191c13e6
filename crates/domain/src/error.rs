use thiserror::Error;

/// 字段缺失或与已有记录冲突。缺失检查在任何存储调用之前中止操作。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field} {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: &'static str,
}

impl ValidationError {
    pub fn missing(field: &'static str) -> Self {
        Self {
            field,
            reason: "is required",
        }
    }

    /// 唯一字段已被其他记录占用
    pub fn taken(field: &'static str) -> Self {
        Self {
            field,
            reason: "is already taken",
        }
    }
}

/// 外部存储调用失败。细节只进日志，调用方只看到这里的分类。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("store request timed out")]
    Timeout,
    #[error("store request failed: {0}")]
    Backend(String),
}

impl StoreError {
    /// 所有存储错误都可以通过重新调用同一操作来重试
    pub fn is_retryable(&self) -> bool {
        match self {
            StoreError::Timeout | StoreError::Backend(_) => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

impl NotFoundError {
    pub fn article(id: impl Into<String>) -> Self {
        Self {
            entity: "article",
            id: id.into(),
        }
    }

    pub fn comment(id: impl Into<String>) -> Self {
        Self {
            entity: "comment",
            id: id.into(),
        }
    }

    pub fn member(id: impl Into<String>) -> Self {
        Self {
            entity: "member",
            id: id.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SiteError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    NotFound(#[from] NotFoundError),
}
