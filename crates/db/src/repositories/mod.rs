//! Zero-sized repository structs, one per table group.
//!
//! Every query method takes a generic `sqlx::Executor`, so it runs the same
//! on `&PgPool` or on `&mut *tx` inside a transaction.

pub mod idea_repo;
pub mod scheduled_post_repo;
pub mod theme_repo;

pub use idea_repo::IdeaRepo;
pub use scheduled_post_repo::ScheduledPostRepo;
pub use theme_repo::ThemeRepo;
