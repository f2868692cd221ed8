use chrono::{DateTime, Utc};
use std::f64::consts::PI;

use crate::models::PrayerName;
use crate::prayer_times::schedule::PrayerSchedule;

/// Upper half-circle the day is drawn on, Fajr at the left end and Isha at
/// the right. Coordinates are y-up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DialGeometry {
    pub center_x: f64,
    pub center_y: f64,
    pub radius: f64,
}

impl DialGeometry {
    pub fn new(center_x: f64, center_y: f64, radius: f64) -> Self {
        Self {
            center_x,
            center_y,
            radius,
        }
    }

    /// Point on the arc for `progress` in 0..=1 (clamped).
    pub fn position(&self, progress: f64) -> (f64, f64) {
        let angle = PI - progress.clamp(0.0, 1.0) * PI;
        (
            self.center_x + self.radius * angle.cos(),
            self.center_y + self.radius * angle.sin(),
        )
    }

    /// `steps + 1` evenly spaced points along the whole arc.
    pub fn arc_points(&self, steps: usize) -> Vec<(f64, f64)> {
        let steps = steps.max(1);
        (0..=steps)
            .map(|i| self.position(i as f64 / steps as f64))
            .collect()
    }
}

fn day_fraction(schedule: &PrayerSchedule, at: DateTime<Utc>) -> f64 {
    let total = (schedule.isha() - schedule.fajr()).num_milliseconds() as f64;
    let elapsed = (at - schedule.fajr()).num_milliseconds() as f64;
    if total <= 0.0 {
        return 0.0;
    }
    (elapsed / total).clamp(0.0, 1.0)
}

/// Where a prayer's marker sits on the Fajr→Isha arc.
pub fn marker_progress(schedule: &PrayerSchedule, prayer: PrayerName) -> f64 {
    day_fraction(schedule, schedule.time(prayer))
}

/// The sun's place on the arc, or `None` outside Fajr..=Isha.
pub fn sun_progress(schedule: &PrayerSchedule, now: DateTime<Utc>) -> Option<f64> {
    if now < schedule.fajr() || now > schedule.isha() {
        return None;
    }
    Some(day_fraction(schedule, now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prayer_times::schedule::ScheduleSource;
    use crate::prayer_times::schedule::fixtures::*;

    fn close(a: (f64, f64), b: (f64, f64)) -> bool {
        (a.0 - b.0).abs() < 1e-9 && (a.1 - b.1).abs() < 1e-9
    }

    #[test]
    fn arc_runs_left_over_the_top_to_right() {
        let dial = DialGeometry::new(50.0, 10.0, 40.0);
        assert!(close(dial.position(0.0), (10.0, 10.0)));
        assert!(close(dial.position(0.5), (50.0, 50.0)));
        assert!(close(dial.position(1.0), (90.0, 10.0)));
        assert!(close(dial.position(7.0), (90.0, 10.0)));
        assert_eq!(dial.arc_points(4).len(), 5);
    }

    #[test]
    fn markers_span_fajr_to_isha() {
        let schedule = FixedSource::default().schedule_for(day(2024, 3, 15)).unwrap();
        assert_eq!(marker_progress(&schedule, PrayerName::Fajr), 0.0);
        assert_eq!(marker_progress(&schedule, PrayerName::Isha), 1.0);
        let asr = marker_progress(&schedule, PrayerName::Asr);
        assert!(asr > marker_progress(&schedule, PrayerName::Dhuhr));
        assert!(asr < marker_progress(&schedule, PrayerName::Maghrib));
    }

    #[test]
    fn sun_hidden_outside_the_prayer_day() {
        let date = day(2024, 3, 15);
        let schedule = FixedSource::default().schedule_for(date).unwrap();
        assert_eq!(sun_progress(&schedule, at(date, hm(4, 0))), None);
        assert_eq!(sun_progress(&schedule, at(date, hm(21, 0))), None);
        // 05:00..19:45 is 885 minutes; 12:22:30 is half way.
        let mid = at(date, hm(12, 22)) + chrono::Duration::seconds(30);
        let p = sun_progress(&schedule, mid).unwrap();
        assert!((p - 0.5).abs() < 1e-9);
    }
}
