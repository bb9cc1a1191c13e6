mod debounce;
mod error;
mod listing;
mod models;
pub mod query;
mod sequence;
pub mod thread;

pub use debounce::Debouncer;
pub use error::{NotFoundError, SiteError, StoreError, ValidationError};
pub use listing::{Completion, FilterChange, ListingState, ListingView};
pub use models::{
    publish_transition, Article, ArticleStats, ArticleStatus, Category, CategoryForm, Comment,
    CommentStatus, Member, MemberForm, Moderation, NewArticle, NewComment, PublicStats,
    VisitorId,
};
pub use query::{ArticlePage, ArticleQuery, ArticleRows, FilterState, SortKey};
pub use sequence::{RequestSequencer, RequestTicket};
pub use thread::{build_comment_tree, CommentNode};
