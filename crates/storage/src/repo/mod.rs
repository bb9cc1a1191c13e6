mod articles;
mod categories;
mod comments;
mod likes;
mod members;
