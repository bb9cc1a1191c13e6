pub mod admin;
pub mod articles;
pub mod comments;
pub mod directory;
pub mod likes;
