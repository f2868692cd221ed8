pub mod calculator;
pub mod dial;
pub mod schedule;
pub mod status;
pub mod tracker;

pub use calculator::PrayerCalculator;
pub use schedule::{PrayerSchedule, ScheduleError, ScheduleSource};
pub use status::DaySnapshot;
pub use tracker::{MidnightPolicy, Tracker};
