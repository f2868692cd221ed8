use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

use crate::models::PrayerName;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("Prayer calculation failed for {date}: {reason}")]
    Calculation { date: NaiveDate, reason: String },
    #[error("{later} does not come after {earlier} on {date}")]
    NotIncreasing {
        date: NaiveDate,
        earlier: PrayerName,
        later: PrayerName,
    },
    #[error("Unknown calculation method: '{0}'")]
    UnknownMethod(String),
    #[error("Unknown madhab: '{0}'")]
    UnknownMadhab(String),
    #[error("No calendar day next to {0}")]
    DateOutOfRange(NaiveDate),
}

/// The five prayer instants of one calendar date.
///
/// Timestamps are strictly increasing from Fajr to Isha; [`PrayerSchedule::new`]
/// refuses anything else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrayerSchedule {
    date: NaiveDate,
    sunrise: DateTime<Utc>,
    times: [DateTime<Utc>; 5],
}

impl PrayerSchedule {
    pub fn new(
        date: NaiveDate,
        sunrise: DateTime<Utc>,
        times: [DateTime<Utc>; 5],
    ) -> Result<Self, ScheduleError> {
        for pair in PrayerName::ALL.windows(2) {
            let (earlier, later) = (pair[0], pair[1]);
            if times[later.index()] <= times[earlier.index()] {
                return Err(ScheduleError::NotIncreasing {
                    date,
                    earlier,
                    later,
                });
            }
        }
        Ok(Self {
            date,
            sunrise,
            times,
        })
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Only used to draw the dial; not one of the five prayers.
    pub fn sunrise(&self) -> DateTime<Utc> {
        self.sunrise
    }

    pub fn time(&self, prayer: PrayerName) -> DateTime<Utc> {
        self.times[prayer.index()]
    }

    pub fn fajr(&self) -> DateTime<Utc> {
        self.time(PrayerName::Fajr)
    }

    pub fn isha(&self) -> DateTime<Utc> {
        self.time(PrayerName::Isha)
    }

    pub fn entries(&self) -> impl Iterator<Item = (PrayerName, DateTime<Utc>)> + '_ {
        PrayerName::ALL.iter().map(|p| (*p, self.time(*p)))
    }

    /// The last prayer whose time is at or before `now`, if any.
    pub fn select_current(&self, now: DateTime<Utc>) -> Option<PrayerName> {
        self.entries()
            .take_while(|(_, time)| *time <= now)
            .last()
            .map(|(prayer, _)| prayer)
    }
}

/// Anything that can produce a day's schedule.
pub trait ScheduleSource {
    fn schedule_for(&self, date: NaiveDate) -> Result<PrayerSchedule, ScheduleError>;
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn rejects_out_of_order_times() {
        let date = day(2024, 3, 15);
        let err = PrayerSchedule::new(
            date,
            at(date, hm(6, 0)),
            [
                at(date, hm(5, 0)),
                at(date, hm(12, 0)),
                at(date, hm(12, 0)),
                at(date, hm(18, 0)),
                at(date, hm(19, 0)),
            ],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ScheduleError::NotIncreasing {
                earlier: PrayerName::Dhuhr,
                later: PrayerName::Asr,
                ..
            }
        ));
    }

    #[test]
    fn select_current_takes_last_started_prayer() {
        let date = day(2024, 3, 15);
        let schedule = FixedSource::default().schedule_for(date).unwrap();

        assert_eq!(schedule.select_current(at(date, hm(4, 59))), None);
        assert_eq!(
            schedule.select_current(at(date, hm(5, 0))),
            Some(PrayerName::Fajr)
        );
        assert_eq!(
            schedule.select_current(at(date, hm(12, 14))),
            Some(PrayerName::Fajr)
        );
        assert_eq!(
            schedule.select_current(at(date, hm(16, 0))),
            Some(PrayerName::Asr)
        );
        assert_eq!(
            schedule.select_current(at(date, hm(23, 59))),
            Some(PrayerName::Isha)
        );
    }
}
