use adapter::{
    AdminService, ArticleService, CommentService, DbStore, DirectoryService, LikeService,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub articles: ArticleService<DbStore>,
    pub comments: CommentService<DbStore>,
    pub likes: LikeService<DbStore>,
    pub directory: DirectoryService<DbStore>,
    pub admin: AdminService<DbStore>,
    pub admin_token: String,
    pub page_size: u32,
}

impl AppState {
    pub fn new(store: DbStore, admin_token: String, identity_salt: String, page_size: u32) -> Self {
        let store = Arc::new(store);
        Self {
            articles: ArticleService::new(Arc::clone(&store)),
            comments: CommentService::new(Arc::clone(&store)),
            likes: LikeService::new(Arc::clone(&store), identity_salt),
            directory: DirectoryService::new(Arc::clone(&store)),
            admin: AdminService::new(store),
            admin_token,
            page_size: page_size.max(1),
        }
    }
}
