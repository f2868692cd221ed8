use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::models::PrayerName;
use crate::prayer_times::schedule::{PrayerSchedule, ScheduleError, ScheduleSource};

/// What counts as the current prayer between midnight and today's Fajr.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MidnightPolicy {
    /// Yesterday's Isha still holds until Fajr.
    #[default]
    PreviousIsha,
    /// Today's Fajr is shown as current, pending until it begins.
    FirstPrayer,
}

/// The prayer whose window holds at some instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentPrayer {
    pub name: PrayerName,
    /// Schedule date the prayer belongs to. Completions are recorded here.
    pub day: NaiveDate,
    pub starts_at: DateTime<Utc>,
    pub next: PrayerName,
    pub next_at: DateTime<Utc>,
    /// Set when the prayer has not begun yet (`MidnightPolicy::FirstPrayer`).
    pub pending: bool,
}

impl CurrentPrayer {
    pub fn time_remaining(&self, now: DateTime<Utc>) -> Duration {
        let remaining = self.next_at - now;
        if remaining < Duration::zero() {
            warn!(
                "Negative time remaining for {} ({} -> {} at {})",
                self.name, now, self.next, self.next_at
            );
            return Duration::zero();
        }
        remaining
    }
}

/// Where `now` falls: the current prayer plus the schedule it was taken from.
#[derive(Debug, Clone)]
pub struct Position {
    pub current: CurrentPrayer,
    pub schedule: PrayerSchedule,
    /// Fajr of the day after `schedule`, the boundary that ends Isha.
    pub next_day_fajr: DateTime<Utc>,
}

pub struct Tracker<S> {
    source: S,
    offset: FixedOffset,
    policy: MidnightPolicy,
}

impl<S: ScheduleSource> Tracker<S> {
    pub fn new(source: S, offset: FixedOffset, policy: MidnightPolicy) -> Self {
        Self {
            source,
            offset,
            policy,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn local_date(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.offset).date_naive()
    }

    pub fn schedule_for(&self, date: NaiveDate) -> Result<PrayerSchedule, ScheduleError> {
        self.source.schedule_for(date)
    }

    fn fajr_after(&self, date: NaiveDate) -> Result<DateTime<Utc>, ScheduleError> {
        let tomorrow = date.succ_opt().ok_or(ScheduleError::DateOutOfRange(date))?;
        Ok(self.source.schedule_for(tomorrow)?.fajr())
    }

    pub fn locate(&self, now: DateTime<Utc>) -> Result<Position, ScheduleError> {
        let today = self.local_date(now);
        let schedule = self.source.schedule_for(today)?;
        let next_day_fajr = self.fajr_after(today)?;

        if let Some(current) = current_in(&schedule, next_day_fajr, now) {
            return Ok(Position {
                current,
                schedule,
                next_day_fajr,
            });
        }

        if self.policy == MidnightPolicy::PreviousIsha {
            let yesterday = today
                .pred_opt()
                .ok_or(ScheduleError::DateOutOfRange(today))?;
            let previous = self.source.schedule_for(yesterday)?;
            if let Some(current) = current_in(&previous, schedule.fajr(), now) {
                debug!("Before Fajr: {} of {} still holds", current.name, yesterday);
                return Ok(Position {
                    current,
                    schedule: previous,
                    next_day_fajr: schedule.fajr(),
                });
            }
            warn!(
                "Nothing from {} holds at {}; check the timezone offset",
                yesterday, now
            );
        }

        Ok(Position {
            current: CurrentPrayer {
                name: PrayerName::Fajr,
                day: today,
                starts_at: schedule.fajr(),
                next: PrayerName::Fajr,
                next_at: schedule.fajr(),
                pending: true,
            },
            schedule,
            next_day_fajr,
        })
    }
}

fn current_in(
    schedule: &PrayerSchedule,
    next_day_fajr: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Option<CurrentPrayer> {
    let name = schedule.select_current(now)?;
    let (next, next_at) = match name.next() {
        Some(next) => (next, schedule.time(next)),
        None => (PrayerName::Fajr, next_day_fajr),
    };
    Some(CurrentPrayer {
        name,
        day: schedule.date(),
        starts_at: schedule.time(name),
        next,
        next_at,
        pending: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prayer_times::schedule::fixtures::*;

    fn tracker(policy: MidnightPolicy) -> Tracker<FixedSource> {
        Tracker::new(
            FixedSource::default(),
            FixedOffset::east_opt(0).unwrap(),
            policy,
        )
    }

    #[test]
    fn at_exact_prayer_time_that_prayer_is_current() {
        let date = day(2024, 3, 15);
        let t = tracker(MidnightPolicy::PreviousIsha);
        let now = at(date, hm(12, 15));

        let position = t.locate(now).unwrap();
        assert_eq!(position.current.name, PrayerName::Dhuhr);
        assert_eq!(position.current.next, PrayerName::Asr);
        assert_eq!(
            position.current.time_remaining(now),
            at(date, hm(15, 40)) - at(date, hm(12, 15))
        );
    }

    #[test]
    fn isha_runs_until_tomorrows_fajr() {
        let date = day(2024, 3, 15);
        let t = tracker(MidnightPolicy::PreviousIsha);
        let now = at(date, hm(22, 0));

        let position = t.locate(now).unwrap();
        assert_eq!(position.current.name, PrayerName::Isha);
        assert_eq!(position.current.day, date);
        assert_eq!(position.current.next, PrayerName::Fajr);
        assert_eq!(position.current.next_at, at(day(2024, 3, 16), hm(5, 0)));
        assert_eq!(position.current.time_remaining(now), minutes(7 * 60));
    }

    #[test]
    fn before_fajr_previous_isha_holds() {
        let date = day(2024, 3, 15);
        let t = tracker(MidnightPolicy::PreviousIsha);
        let now = at(date, hm(1, 30));

        let position = t.locate(now).unwrap();
        assert_eq!(position.current.name, PrayerName::Isha);
        assert_eq!(position.current.day, day(2024, 3, 14));
        assert_eq!(position.schedule.date(), day(2024, 3, 14));
        assert_eq!(position.current.next_at, at(date, hm(5, 0)));
        assert!(!position.current.pending);
    }

    #[test]
    fn before_fajr_first_prayer_is_pending() {
        let date = day(2024, 3, 15);
        let t = tracker(MidnightPolicy::FirstPrayer);
        let now = at(date, hm(1, 30));

        let position = t.locate(now).unwrap();
        assert_eq!(position.current.name, PrayerName::Fajr);
        assert_eq!(position.current.day, date);
        assert!(position.current.pending);
        assert_eq!(position.current.time_remaining(now), minutes(210));
    }

    #[test]
    fn remaining_jumps_after_crossing_a_boundary() {
        let date = day(2024, 3, 15);
        let t = tracker(MidnightPolicy::PreviousIsha);

        let before = at(date, hm(15, 39));
        let after = at(date, hm(15, 40));
        let r_before = t.locate(before).unwrap().current.time_remaining(before);
        let r_after = t.locate(after).unwrap().current.time_remaining(after);

        assert_eq!(r_before, minutes(1));
        assert_eq!(r_after, minutes(150));
    }

    #[test]
    fn remaining_is_never_negative_over_a_day() {
        let date = day(2024, 3, 15);
        let t = tracker(MidnightPolicy::PreviousIsha);
        let start = at(date, hm(0, 0));
        for step in 0..(24 * 12) {
            let now = start + minutes(step * 5);
            let position = t.locate(now).unwrap();
            assert!(position.current.next_at > now, "at {}", now);
            assert!(position.current.time_remaining(now) > Duration::zero());
        }
    }

    #[test]
    fn local_offset_decides_the_day() {
        let t = Tracker::new(
            FixedSource::default(),
            FixedOffset::east_opt(3 * 3600).unwrap(),
            MidnightPolicy::PreviousIsha,
        );
        // 22:30 UTC is already the next day at UTC+3.
        let now = at(day(2024, 3, 15), hm(22, 30));
        assert_eq!(t.local_date(now), day(2024, 3, 16));
        let position = t.locate(now).unwrap();
        assert_eq!(position.current.name, PrayerName::Isha);
        assert_eq!(position.current.day, day(2024, 3, 15));
    }

    #[test]
    fn clamps_a_stale_boundary_to_zero() {
        let date = day(2024, 3, 15);
        let current = CurrentPrayer {
            name: PrayerName::Asr,
            day: date,
            starts_at: at(date, hm(15, 40)),
            next: PrayerName::Maghrib,
            next_at: at(date, hm(18, 10)),
            pending: false,
        };
        assert_eq!(
            current.time_remaining(at(date, hm(18, 30))),
            Duration::zero()
        );
    }
}
