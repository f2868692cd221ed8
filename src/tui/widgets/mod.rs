pub mod dial;
pub mod header;
pub mod next_prayer;
pub mod prayers;
pub mod statusbar;
pub mod streak;
