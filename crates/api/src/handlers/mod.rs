pub mod auth;
pub mod ideas;
pub mod scheduled_posts;
pub mod themes;
pub mod transfer;
