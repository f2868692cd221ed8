pub mod completion;
pub mod location;
pub mod prayer;

pub use completion::CompletionRecord;
pub use location::{Coordinate, Place};
pub use prayer::{PrayerName, PrayerStatus};
