use chrono::NaiveDate;
use log::debug;
use salah::prelude::*;

use crate::config::settings::SalahConfig;
use crate::models::Coordinate;
use crate::prayer_times::schedule::{PrayerSchedule, ScheduleError, ScheduleSource};
use crate::prayer_times::tracker::Tracker;

/// Computes daily schedules for one location with `salah`.
#[derive(Debug, Clone)]
pub struct PrayerCalculator {
    pub coordinate: Coordinate,
    method_str: String,
    madhab_str: String,
}

impl PrayerCalculator {
    pub fn new(coordinate: Coordinate, method: &str, madhab: &str) -> Result<Self, ScheduleError> {
        // Validate method + madhab early
        parse_method(method)?;
        parse_madhab(madhab)?;
        Ok(Self {
            coordinate,
            method_str: method.to_string(),
            madhab_str: madhab.to_string(),
        })
    }

    pub fn compute_schedule(&self, date: NaiveDate) -> Result<PrayerSchedule, ScheduleError> {
        let coords = Coordinates::new(self.coordinate.latitude, self.coordinate.longitude);
        let method = parse_method(&self.method_str)?;
        let madhab = parse_madhab(&self.madhab_str)?;
        let params = Configuration::with(method, madhab);

        let times = salah::prelude::PrayerSchedule::new()
            .on(date)
            .for_location(coords)
            .with_configuration(params)
            .calculate()
            .map_err(|e| ScheduleError::Calculation {
                date,
                reason: e.to_string(),
            })?;

        debug!(
            "Computed schedule for {} at ({:.4}, {:.4})",
            date, self.coordinate.latitude, self.coordinate.longitude
        );

        PrayerSchedule::new(
            date,
            times.time(Prayer::Sunrise),
            [
                times.time(Prayer::Fajr),
                times.time(Prayer::Dhuhr),
                times.time(Prayer::Asr),
                times.time(Prayer::Maghrib),
                times.time(Prayer::Isha),
            ],
        )
    }
}

impl ScheduleSource for PrayerCalculator {
    fn schedule_for(&self, date: NaiveDate) -> Result<PrayerSchedule, ScheduleError> {
        self.compute_schedule(date)
    }
}

impl Tracker<PrayerCalculator> {
    /// A tracker for `coordinate` with the method, madhab, offset and
    /// midnight policy from `[salah]`.
    pub fn from_config(salah: &SalahConfig, coordinate: Coordinate) -> Result<Self, ScheduleError> {
        let calc = PrayerCalculator::new(coordinate, &salah.calc_method, &salah.madhab)?;
        Ok(Tracker::new(calc, salah.offset(), salah.midnight_policy))
    }
}

fn parse_method(s: &str) -> Result<Method, ScheduleError> {
    match s {
        "MuslimWorldLeague" => Ok(Method::MuslimWorldLeague),
        "Egyptian" => Ok(Method::Egyptian),
        "Karachi" => Ok(Method::Karachi),
        "UmmAlQura" => Ok(Method::UmmAlQura),
        "Dubai" => Ok(Method::Dubai),
        "MoonsightingCommittee" => Ok(Method::MoonsightingCommittee),
        "NorthAmerica" => Ok(Method::NorthAmerica),
        "Kuwait" => Ok(Method::Kuwait),
        "Qatar" => Ok(Method::Qatar),
        "Singapore" => Ok(Method::Singapore),
        "Tehran" => Ok(Method::Tehran),
        "Turkey" => Ok(Method::Turkey),
        "Other" => Ok(Method::Other),
        _ => Err(ScheduleError::UnknownMethod(s.to_string())),
    }
}

fn parse_madhab(s: &str) -> Result<Madhab, ScheduleError> {
    match s {
        "Hanafi" => Ok(Madhab::Hanafi),
        "Shafi" | "Shafi'i" => Ok(Madhab::Shafi),
        _ => Err(ScheduleError::UnknownMadhab(s.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PrayerName;
    use crate::prayer_times::tracker::MidnightPolicy;
    use chrono::FixedOffset;

    fn london() -> PrayerCalculator {
        PrayerCalculator::new(Coordinate::new(51.5074, -0.1278), "MuslimWorldLeague", "Shafi")
            .unwrap()
    }

    #[test]
    fn rejects_unknown_method_and_madhab() {
        let c = Coordinate::new(0.0, 0.0);
        assert!(matches!(
            PrayerCalculator::new(c, "Lunar", "Shafi"),
            Err(ScheduleError::UnknownMethod(_))
        ));
        assert!(matches!(
            PrayerCalculator::new(c, "Egyptian", "Maliki"),
            Err(ScheduleError::UnknownMadhab(_))
        ));
    }

    #[test]
    fn london_schedule_is_in_order() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let schedule = london().compute_schedule(date).unwrap();

        let times: Vec<_> = schedule.entries().map(|(_, t)| t).collect();
        assert!(times.windows(2).all(|w| w[0] < w[1]));
        assert!(schedule.fajr() < schedule.sunrise());
        assert!(schedule.sunrise() < schedule.time(PrayerName::Dhuhr));
        assert_eq!(schedule.fajr().date_naive(), date);
    }

    #[test]
    fn schedules_stay_ordered_across_places_and_seasons() {
        let places = [
            Coordinate::new(21.4225, 39.8262),
            Coordinate::new(-33.8688, 151.2093),
            Coordinate::new(40.7128, -74.0060),
            Coordinate::new(1.3521, 103.8198),
            Coordinate::new(30.0444, 31.2357),
        ];
        for coordinate in places {
            let calc = PrayerCalculator::new(coordinate, "MuslimWorldLeague", "Hanafi").unwrap();
            for month in [1, 4, 7, 10] {
                let date = NaiveDate::from_ymd_opt(2024, month, 10).unwrap();
                let schedule = calc.compute_schedule(date).unwrap();
                let times: Vec<_> = schedule.entries().map(|(_, t)| t).collect();
                assert!(
                    times.windows(2).all(|w| w[0] < w[1]),
                    "{:?} on {}",
                    coordinate,
                    date
                );
            }
        }
    }

    #[test]
    fn tracker_from_config_uses_fixed_offset() {
        let salah = SalahConfig {
            timezone_offset: Some(330),
            ..SalahConfig::default()
        };
        let tracker = Tracker::from_config(&salah, Coordinate::new(28.6139, 77.2090)).unwrap();
        let now = chrono::DateTime::parse_from_rfc3339("2024-03-15T20:00:00Z")
            .unwrap()
            .with_timezone(&chrono::Utc);
        // 20:00 UTC is 01:30 the next morning at UTC+5:30.
        assert_eq!(tracker.local_date(now), NaiveDate::from_ymd_opt(2024, 3, 16).unwrap());
        assert_eq!(tracker.source().coordinate.latitude, 28.6139);
    }

    #[test]
    fn london_at_dhuhr_counts_down_to_asr() {
        let tracker = Tracker::new(
            london(),
            FixedOffset::east_opt(0).unwrap(),
            MidnightPolicy::PreviousIsha,
        );
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let schedule = tracker.source().schedule_for(date).unwrap();
        let now = schedule.time(PrayerName::Dhuhr);

        let position = tracker.locate(now).unwrap();
        assert_eq!(position.current.name, PrayerName::Dhuhr);
        assert_eq!(position.current.day, date);
        assert!(!position.current.pending);
        assert_eq!(
            position.current.time_remaining(now),
            schedule.time(PrayerName::Asr) - schedule.time(PrayerName::Dhuhr)
        );
    }
}
