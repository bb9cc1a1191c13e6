mod error;
mod handlers;
pub mod router;
mod visitor;
