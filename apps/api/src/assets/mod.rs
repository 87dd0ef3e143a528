pub mod analytics;
pub mod feedback;
pub mod handlers;
pub mod library;
pub mod versioning;
