use anyhow::Result;
use chrono::{DateTime, Utc};
use log::{debug, info};

use crate::models::PrayerName;
use crate::prayer_times::PrayerSchedule;

const BODY: &str = "Shake your phone after completing the prayer to log it.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub prayer: PrayerName,
    pub title: String,
    pub body: String,
    pub trigger_at: DateTime<Utc>,
}

impl Notification {
    pub fn for_prayer(prayer: PrayerName, trigger_at: DateTime<Utc>) -> Self {
        Self {
            prayer,
            title: format!("Time for {} Prayer", prayer.display_name()),
            body: BODY.to_string(),
            trigger_at,
        }
    }
}

/// One notification per prayer that has not started yet.
pub fn plan(schedule: &PrayerSchedule, now: DateTime<Utc>) -> Vec<Notification> {
    schedule
        .entries()
        .filter(|(_, at)| *at > now)
        .map(|(prayer, at)| Notification::for_prayer(prayer, at))
        .collect()
}

pub trait NotificationScheduler {
    fn cancel_all(&mut self) -> Result<()>;
    fn schedule(&mut self, notification: Notification) -> Result<()>;
}

/// Replace everything pending with the plan for `schedule`. Returns how many
/// were scheduled.
pub fn reschedule(
    scheduler: &mut impl NotificationScheduler,
    schedule: &PrayerSchedule,
    now: DateTime<Utc>,
) -> Result<usize> {
    scheduler.cancel_all()?;
    let planned = plan(schedule, now);
    let count = planned.len();
    for notification in planned {
        debug!(
            "Scheduling {:?} at {}",
            notification.title, notification.trigger_at
        );
        scheduler.schedule(notification)?;
    }
    info!("Scheduled {} prayer notifications for {}", count, schedule.date());
    Ok(count)
}

/// Holds notifications in memory until their time comes; the UI polls it.
#[derive(Debug, Default)]
pub struct InAppScheduler {
    pending: Vec<Notification>,
}

impl InAppScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> &[Notification] {
        &self.pending
    }

    /// Remove and return every notification whose trigger time has passed,
    /// earliest first.
    pub fn take_due(&mut self, now: DateTime<Utc>) -> Vec<Notification> {
        let (mut due, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|n| n.trigger_at <= now);
        self.pending = rest;
        due.sort_by_key(|n| n.trigger_at);
        due
    }
}

impl NotificationScheduler for InAppScheduler {
    fn cancel_all(&mut self) -> Result<()> {
        self.pending.clear();
        Ok(())
    }

    fn schedule(&mut self, notification: Notification) -> Result<()> {
        self.pending.push(notification);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prayer_times::schedule::fixtures::*;
    use crate::prayer_times::ScheduleSource;

    fn schedule() -> PrayerSchedule {
        FixedSource::default().schedule_for(day(2024, 3, 15)).unwrap()
    }

    #[test]
    fn plans_only_future_prayers() {
        let s = schedule();
        let planned = plan(&s, at(s.date(), hm(13, 0)));
        let prayers: Vec<_> = planned.iter().map(|n| n.prayer).collect();
        assert_eq!(
            prayers,
            vec![PrayerName::Asr, PrayerName::Maghrib, PrayerName::Isha]
        );
        assert_eq!(planned[0].title, "Time for Asr Prayer");
        assert_eq!(planned[0].body, BODY);
        assert_eq!(planned[0].trigger_at, s.time(PrayerName::Asr));
    }

    #[test]
    fn a_prayer_starting_now_is_not_planned() {
        let s = schedule();
        let planned = plan(&s, s.time(PrayerName::Isha));
        assert!(planned.is_empty());
    }

    #[test]
    fn reschedule_replaces_pending() {
        let s = schedule();
        let mut scheduler = InAppScheduler::new();
        assert_eq!(reschedule(&mut scheduler, &s, at(s.date(), hm(0, 30))).unwrap(), 5);
        assert_eq!(reschedule(&mut scheduler, &s, at(s.date(), hm(16, 0))).unwrap(), 2);
        assert_eq!(scheduler.pending().len(), 2);
    }

    #[test]
    fn take_due_pops_in_order() {
        let s = schedule();
        let mut scheduler = InAppScheduler::new();
        reschedule(&mut scheduler, &s, at(s.date(), hm(0, 30))).unwrap();

        assert!(scheduler.take_due(at(s.date(), hm(4, 0))).is_empty());
        let due = scheduler.take_due(at(s.date(), hm(15, 45)));
        let prayers: Vec<_> = due.iter().map(|n| n.prayer).collect();
        assert_eq!(
            prayers,
            vec![PrayerName::Fajr, PrayerName::Dhuhr, PrayerName::Asr]
        );
        assert_eq!(scheduler.pending().len(), 2);
    }
}
