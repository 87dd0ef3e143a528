pub mod comments;
pub mod completeness;
pub mod handlers;
pub mod health;
pub mod linking;
pub mod pipeline;
