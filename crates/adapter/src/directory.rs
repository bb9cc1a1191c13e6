use domain::{
    Category, CategoryForm, Member, MemberForm, NotFoundError, SiteError, ValidationError,
};
use std::sync::Arc;
use tracing::info;

use crate::now;
use crate::traits::DirectoryStore;

/// 成员资料与分类。写入是按 id 的整体替换，created_at 以首次写入为准。
pub struct DirectoryService<S: ?Sized> {
    store: Arc<S>,
}

impl<S: ?Sized> Clone for DirectoryService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: DirectoryStore + ?Sized> DirectoryService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn members(&self) -> Result<Vec<Member>, SiteError> {
        Ok(self.store.members().await?)
    }

    pub async fn member(&self, id: &str) -> Result<Member, SiteError> {
        self.store
            .member(id)
            .await?
            .ok_or_else(|| NotFoundError::member(id).into())
    }

    pub async fn categories(&self) -> Result<Vec<Category>, SiteError> {
        Ok(self.store.categories().await?)
    }

    pub async fn save_member(&self, id: &str, form: MemberForm) -> Result<Member, SiteError> {
        let at = now();
        // 先校验，再读旧记录
        let mut member = form.into_member(id.to_string(), at, at)?;
        if let Some(existing) = self.store.member(id).await? {
            member.created_at = existing.created_at;
        }

        self.store.upsert_member(&member).await?;
        info!("Member {} saved", member.id);
        Ok(member)
    }

    pub async fn save_category(&self, id: &str, form: CategoryForm) -> Result<Category, SiteError> {
        let mut category = form.into_category(id.to_string(), now())?;
        if let Some(existing) = self.store.category(id).await? {
            category.created_at = existing.created_at;
        }

        if !self.store.upsert_category(&category).await? {
            return Err(ValidationError::taken("slug").into());
        }
        info!("Category {} saved (slug: {})", category.id, category.slug);
        Ok(category)
    }
}
