pub mod handlers;
pub mod markdown;
pub mod templates;
