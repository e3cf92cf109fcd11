pub mod activity_record;
pub mod screen;

pub use activity_record::{
    ActivityRecord, CategoryCount, ScreenCount, StoreSummary, UNKNOWN_POSITION,
};
pub use screen::NormalizedScreen;
