use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The five daily prayers, in the order they occur.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PrayerName {
    Fajr,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
}

impl PrayerName {
    pub const ALL: [PrayerName; 5] = [
        PrayerName::Fajr,
        PrayerName::Dhuhr,
        PrayerName::Asr,
        PrayerName::Maghrib,
        PrayerName::Isha,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PrayerName::Fajr => "fajr",
            PrayerName::Dhuhr => "dhuhr",
            PrayerName::Asr => "asr",
            PrayerName::Maghrib => "maghrib",
            PrayerName::Isha => "isha",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PrayerName::Fajr => "Fajr",
            PrayerName::Dhuhr => "Dhuhr",
            PrayerName::Asr => "Asr",
            PrayerName::Maghrib => "Maghrib",
            PrayerName::Isha => "Isha",
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    /// The prayer that follows within the same day. Isha has none; its
    /// successor is the next day's Fajr.
    pub fn next(&self) -> Option<PrayerName> {
        Self::ALL.get(self.index() + 1).copied()
    }
}

impl std::fmt::Display for PrayerName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for PrayerName {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fajr" => Ok(PrayerName::Fajr),
            "dhuhr" | "zuhr" | "dhuhur" => Ok(PrayerName::Dhuhr),
            "asr" => Ok(PrayerName::Asr),
            "maghrib" => Ok(PrayerName::Maghrib),
            "isha" => Ok(PrayerName::Isha),
            _ => Err(anyhow::anyhow!("Unknown prayer: {}", s)),
        }
    }
}

/// Derived per render, never stored.
///
/// `is_completed` and `is_current` are independent: the prayer being held
/// right now may already be logged. Which one gets highlighted is decided by
/// [`DaySnapshot::focus`](crate::prayer_times::status::DaySnapshot::focus).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrayerStatus {
    pub is_completed: bool,
    pub is_current: bool,
    pub is_missed: bool,
}

impl PrayerStatus {
    pub fn label(&self) -> &'static str {
        if self.is_completed {
            "done"
        } else if self.is_current {
            "now"
        } else if self.is_missed {
            "missed"
        } else {
            "upcoming"
        }
    }
}
