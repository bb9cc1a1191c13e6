mod admin;
mod articles;
mod comments;
mod directory;
mod likes;
mod listing;
#[cfg(test)]
mod memory;
mod store;
mod traits;

pub use admin::AdminService;
pub use articles::ArticleService;
pub use comments::CommentService;
pub use directory::DirectoryService;
pub use likes::{LikeService, LikeState};
pub use listing::{spawn_listing, ListingCommand, ListingHandle, ListingSettings};
pub use store::DbStore;
pub use traits::{
    ArticleSearch, ArticleStore, CommentStore, DirectoryStore, EditorialStore, LikeStore,
};

use chrono::{Datelike, Months, NaiveDateTime, NaiveTime, Utc};

// 128 位随机 id，十六进制
pub(crate) fn new_id() -> String {
    hex::encode(rand::random::<[u8; 16]>())
}

pub(crate) fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

// [本月一日 00:00, 下月一日 00:00)
pub(crate) fn month_bounds(at: NaiveDateTime) -> (NaiveDateTime, NaiveDateTime) {
    let bounds = at.date().with_day(1).and_then(|first| {
        let next = first.checked_add_months(Months::new(1))?;
        Some((first.and_time(NaiveTime::MIN), next.and_time(NaiveTime::MIN)))
    });
    bounds.unwrap_or((at, at))
}
