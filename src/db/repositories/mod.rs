pub mod activity_log;
pub mod screens;

pub use activity_log::{ActivityLogRepository, LOG_INDEXED_COLUMNS};
pub use screens::ScreenRepository;
