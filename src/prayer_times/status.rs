use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use rusqlite::Connection;

use crate::db::repository::{CompletionRepo, StreakRepo};
use crate::models::{CompletionRecord, Place, PrayerName, PrayerStatus};
use crate::prayer_times::schedule::{PrayerSchedule, ScheduleSource};
use crate::prayer_times::tracker::{CurrentPrayer, Position, Tracker};
use crate::utils::format::format_remaining;

/// Completed / current / missed for every prayer of `schedule`.
///
/// A prayer is missed only once the *next* prayer has begun without it
/// being logged; Isha's next is the following day's Fajr.
pub fn classify(
    schedule: &PrayerSchedule,
    completions: &CompletionRecord,
    current: &CurrentPrayer,
    next_day_fajr: DateTime<Utc>,
    now: DateTime<Utc>,
) -> [(PrayerName, PrayerStatus); 5] {
    PrayerName::ALL.map(|prayer| {
        let is_completed = completions.contains(prayer);
        let is_current = !current.pending && current.day == schedule.date() && current.name == prayer;
        let next_start = prayer
            .next()
            .map(|next| schedule.time(next))
            .unwrap_or(next_day_fajr);
        let is_missed =
            !is_completed && !is_current && now > schedule.time(prayer) && now > next_start;
        (
            prayer,
            PrayerStatus {
                is_completed,
                is_current,
                is_missed,
            },
        )
    })
}

/// The prayer the screen highlights.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Focus {
    pub prayer: PrayerName,
    /// True when the highlighted prayer has not begun yet.
    pub upcoming: bool,
}

/// Everything the screen shows, derived in one go from
/// (place, schedule, completions, now). Rebuilt rather than patched.
#[derive(Debug, Clone)]
pub struct DaySnapshot {
    pub place: Place,
    pub schedule: PrayerSchedule,
    pub current: CurrentPrayer,
    pub next_day_fajr: DateTime<Utc>,
    pub completions: CompletionRecord,
    pub statuses: [(PrayerName, PrayerStatus); 5],
    pub remaining: Duration,
    pub streak: u64,
    pub taken_at: DateTime<Utc>,
}

impl DaySnapshot {
    pub fn build(
        place: Place,
        position: Position,
        completions: CompletionRecord,
        streak: u64,
        now: DateTime<Utc>,
    ) -> Self {
        let Position {
            current,
            schedule,
            next_day_fajr,
        } = position;
        let statuses = classify(&schedule, &completions, &current, next_day_fajr, now);
        let remaining = current.time_remaining(now);
        Self {
            place,
            schedule,
            current,
            next_day_fajr,
            completions,
            statuses,
            remaining,
            streak,
            taken_at: now,
        }
    }

    /// Locate `now`, then read the prayer day's completions and the streak.
    pub fn load<S: ScheduleSource>(
        conn: &Connection,
        tracker: &Tracker<S>,
        place: &Place,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        let position = tracker
            .locate(now)
            .with_context(|| format!("Locating current prayer for {}", place.name))?;
        let completions = CompletionRepo::load(conn, position.current.day)?;
        let streak = StreakRepo::load(conn)?;
        Ok(Self::build(place.clone(), position, completions, streak, now))
    }

    /// The same prayer day seen at a later instant. Completions and streak
    /// are carried over, nothing is read from the store.
    pub fn advance(&self, now: DateTime<Utc>) -> Self {
        let position = Position {
            current: self.current.clone(),
            schedule: self.schedule.clone(),
            next_day_fajr: self.next_day_fajr,
        };
        Self::build(
            self.place.clone(),
            position,
            self.completions.clone(),
            self.streak,
            now,
        )
    }

    /// True once `now` has crossed the boundary that ends the current prayer.
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        now >= self.current.next_at
    }

    pub fn status(&self, prayer: PrayerName) -> PrayerStatus {
        self.statuses[prayer.index()].1
    }

    /// Once the current prayer is logged the focus rolls forward to the
    /// next one, even though time-based selection still calls it current.
    pub fn focus(&self) -> Focus {
        if self.completions.contains(self.current.name) {
            Focus {
                prayer: self.current.next,
                upcoming: true,
            }
        } else {
            Focus {
                prayer: self.current.name,
                upcoming: self.current.pending,
            }
        }
    }

    /// The prayer a shake would log. Nothing while the current prayer is
    /// still pending.
    pub fn shake_target(&self) -> Option<PrayerName> {
        (!self.current.pending).then_some(self.current.name)
    }

    pub fn remaining_label(&self) -> String {
        format_remaining(self.remaining)
    }
}
