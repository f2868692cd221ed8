use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Utc};
use log::info;
use rusqlite::Connection;
use std::path::Path;
use std::str::FromStr;

use crate::cli::args::LocationCommands;
use crate::config::AppConfig;
use crate::db::repository::{CompletionLog, RecordOutcome};
use crate::location::{find_city, PRESET_CITIES};
use crate::models::{Place, PrayerName};
use crate::notify::plan;
use crate::prayer_times::{DaySnapshot, PrayerCalculator, ScheduleSource, Tracker};
use crate::shake::{AccelSample, Accelerometer, ReplayAccelerometer, ShakeDetector, ShakeEvent};
use crate::utils::format::{format_offset, format_remaining, format_streak, format_time};
use crate::utils::hijri::hijri_string;

// ─── ANSI helpers ────────────────────────────────────────────────────────────

macro_rules! println_colored {
    ($color:expr, $($arg:tt)*) => {{
        print!("{}", $color);
        print!($($arg)*);
        println!("\x1b[0m");
    }};
}

const GREEN: &str = "\x1b[32m";
const AMBER: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const GOLD: &str = "\x1b[38;2;212;175;85m";

fn tracker(config: &AppConfig, place: &Place) -> Result<Tracker<PrayerCalculator>> {
    Tracker::from_config(&config.salah, place.coordinate)
        .with_context(|| format!("Preparing prayer times for {}", place.name))
}

// ─── Times ───────────────────────────────────────────────────────────────────

pub fn handle_times(conn: &Connection, config: &AppConfig, place: &Place) -> Result<()> {
    let now = Utc::now();
    let offset = config.salah.offset();
    let tracker = tracker(config, place)?;
    let snapshot = DaySnapshot::load(conn, &tracker, place, now)?;
    let schedule = &snapshot.schedule;

    println!();
    println_colored!(
        GOLD,
        "  Prayer Times — {} ({}, {})",
        place.name,
        schedule.date(),
        format_offset(offset.local_minus_utc() / 60)
    );
    if let Some(hijri) = hijri_string(schedule.date(), config.salah.hijri_offset) {
        println_colored!(DIM, "  {}", hijri);
    }
    println!();

    for (prayer, status) in &snapshot.statuses {
        let time_str = format_time(schedule.time(*prayer), &offset);
        let line = format!("  {:<10}  {:>8}  {}", prayer.display_name(), time_str, status.label());
        if status.is_completed {
            println_colored!(GREEN, "{}", line);
        } else if status.is_missed {
            println_colored!(RED, "{}", line);
        } else if status.is_current {
            println_colored!(BOLD, "{}", line);
        } else {
            println_colored!(DIM, "{}", line);
        }
        if *prayer == PrayerName::Fajr {
            println_colored!(
                DIM,
                "  {:<10}  {:>8}",
                "Sunrise",
                format_time(schedule.sunrise(), &offset)
            );
        }
    }

    println!();
    let focus = snapshot.focus();
    if focus.upcoming {
        println_colored!(
            AMBER,
            "  Next: {} in {}",
            focus.prayer,
            snapshot.remaining_label()
        );
    } else {
        println_colored!(
            AMBER,
            "  Now: {} · {} until {}",
            focus.prayer,
            snapshot.remaining_label(),
            snapshot.current.next
        );
    }
    println!();
    Ok(())
}

// ─── Mark prayer ─────────────────────────────────────────────────────────────

pub fn handle_mark(
    conn: &Connection,
    config: &AppConfig,
    place: &Place,
    prayer_str: &str,
) -> Result<()> {
    let prayer = PrayerName::from_str(prayer_str).map_err(|_| {
        anyhow!(
            "Unknown prayer '{}'. Use: fajr, dhuhr, asr, maghrib, isha",
            prayer_str
        )
    })?;
    let tracker = tracker(config, place)?;
    let outcome = mark(conn, &tracker, place, prayer, Utc::now())?;

    match outcome {
        RecordOutcome::Added { streak, .. } => {
            println_colored!(
                GREEN,
                "  ✓ {} logged · streak {}",
                prayer,
                format_streak(streak)
            );
        }
        RecordOutcome::AlreadyCompleted { .. } => {
            println_colored!(AMBER, "  {} was already logged", prayer);
        }
    }
    Ok(())
}

fn mark<S: ScheduleSource>(
    conn: &Connection,
    tracker: &Tracker<S>,
    place: &Place,
    prayer: PrayerName,
    now: DateTime<Utc>,
) -> Result<RecordOutcome> {
    let snapshot = DaySnapshot::load(conn, tracker, place, now)?;
    if snapshot.current.pending || snapshot.schedule.time(prayer) > now {
        bail!("{} has not started yet", prayer);
    }
    CompletionLog::record(conn, snapshot.current.day, prayer)
}

// ─── Status ──────────────────────────────────────────────────────────────────

pub fn handle_status(conn: &Connection, config: &AppConfig, place: &Place) -> Result<()> {
    let tracker = tracker(config, place)?;
    let snapshot = DaySnapshot::load(conn, &tracker, place, Utc::now())?;

    println!();
    println_colored!(GOLD, "  Streak: {}", format_streak(snapshot.streak));
    println_colored!(
        DIM,
        "  {} · {}/5 logged",
        snapshot.current.day,
        snapshot.completions.len()
    );
    println!();
    for prayer in PrayerName::ALL {
        if snapshot.completions.contains(prayer) {
            println_colored!(GREEN, "  ● {}", prayer);
        } else {
            println_colored!(DIM, "  ○ {}", prayer);
        }
    }
    println!();
    Ok(())
}

// ─── Shake replay ────────────────────────────────────────────────────────────

#[derive(Debug, Default, PartialEq)]
pub struct ReplaySummary {
    pub samples: usize,
    pub logged: Vec<PrayerName>,
    pub already_logged: usize,
}

pub fn handle_shake(
    conn: &Connection,
    config: &AppConfig,
    place: &Place,
    samples: &Path,
    interval_ms: Option<u64>,
) -> Result<()> {
    let mut sensor = ReplayAccelerometer::from_path(samples)?;
    if sensor.is_empty() {
        bail!("No readings in {:?}", samples);
    }
    let interval = interval_ms.unwrap_or(config.shake.sample_interval_ms);
    let tracker = tracker(config, place)?;
    let mut detector = ShakeDetector::new(config.shake.clone());

    let summary = replay(
        conn,
        &tracker,
        place,
        &mut detector,
        &mut sensor,
        interval,
        Utc::now(),
    )?;

    println!();
    println_colored!(DIM, "  Replayed {} readings", summary.samples);
    for prayer in &summary.logged {
        println_colored!(GREEN, "  ✓ {} logged · Alhamdulillah", prayer);
    }
    if summary.already_logged > 0 {
        println_colored!(
            AMBER,
            "  {} burst(s) for a prayer that was already logged",
            summary.already_logged
        );
    }
    if summary.logged.is_empty() && summary.already_logged == 0 {
        println_colored!(DIM, "  No completed shake burst");
    }
    println!();
    Ok(())
}

/// Feed every reading to the detector, `interval_ms` apart, persisting each
/// completion before the next reading is looked at.
fn replay<S: ScheduleSource>(
    conn: &Connection,
    tracker: &Tracker<S>,
    place: &Place,
    detector: &mut ShakeDetector,
    sensor: &mut dyn Accelerometer,
    interval_ms: u64,
    now: DateTime<Utc>,
) -> Result<ReplaySummary> {
    let mut snapshot = DaySnapshot::load(conn, tracker, place, now)?;
    let mut summary = ReplaySummary::default();

    while let Some((x, y, z)) = sensor.read() {
        let sample = AccelSample::new(x, y, z, summary.samples as u64 * interval_ms);
        summary.samples += 1;

        let target = snapshot.shake_target();
        match detector.on_sample(&sample, target, &snapshot.completions) {
            Some(ShakeEvent::Completed(prayer)) => {
                match CompletionLog::record(conn, snapshot.current.day, prayer)? {
                    RecordOutcome::Added { .. } => summary.logged.push(prayer),
                    RecordOutcome::AlreadyCompleted { .. } => summary.already_logged += 1,
                }
                snapshot = DaySnapshot::load(conn, tracker, place, now)?;
            }
            Some(ShakeEvent::AlreadyCompleted(_)) => summary.already_logged += 1,
            Some(ShakeEvent::Progress { count, required }) => {
                info!("Shake {}/{} at {}ms", count, required, sample.timestamp_ms);
            }
            None => {}
        }
    }
    Ok(summary)
}

// ─── Location ────────────────────────────────────────────────────────────────

pub fn handle_location(config: &mut AppConfig, action: &LocationCommands) -> Result<()> {
    match action {
        LocationCommands::List => {
            let current = config.location.name.as_deref();
            println!();
            for city in PRESET_CITIES {
                let line = format!("  {:<14}  {}", city.name, format_offset(city.utc_offset));
                if Some(city.name) == current {
                    println_colored!(GREEN, "{}  ●", line);
                } else {
                    println!("{}", line);
                }
            }
            println!();
        }
        LocationCommands::Set {
            city,
            lat,
            lng,
            name,
        } => {
            match (city, lat, lng) {
                (Some(city), _, _) => {
                    let preset = find_city(city).ok_or_else(|| {
                        anyhow!("Unknown city '{}'. See `shakr location list`", city)
                    })?;
                    config.set_city(preset);
                }
                (None, Some(lat), Some(lng)) => {
                    if !(-90.0..=90.0).contains(lat) || !(-180.0..=180.0).contains(lng) {
                        bail!("({}, {}) is not a valid coordinate", lat, lng);
                    }
                    config.set_coordinates(*lat, *lng, name.clone());
                }
                _ => bail!("Give either --city or both --lat and --lng"),
            }
            config.save()?;
            println_colored!(
                GREEN,
                "  ✓ Location saved: {}",
                config.location.name.as_deref().unwrap_or("custom coordinates")
            );
        }
    }
    Ok(())
}

// ─── Notifications ───────────────────────────────────────────────────────────

pub fn handle_notifications(config: &AppConfig, place: &Place) -> Result<()> {
    let now = Utc::now();
    let offset = config.salah.offset();
    let tracker = tracker(config, place)?;
    let schedule = tracker.schedule_for(tracker.local_date(now))?;

    println!();
    if !config.notifications.enabled {
        println_colored!(DIM, "  Notifications are turned off in config.toml");
        println!();
        return Ok(());
    }

    let planned = plan(&schedule, now);
    if planned.is_empty() {
        println_colored!(DIM, "  Nothing left to notify today");
    }
    for notification in planned {
        println_colored!(
            BOLD,
            "  {:>8}  {}",
            format_time(notification.trigger_at, &offset),
            notification.title
        );
        println_colored!(
            DIM,
            "            {} · in {}",
            notification.body,
            format_remaining(notification.trigger_at - now)
        );
    }
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::{CompletionRepo, StreakRepo};
    use crate::models::Coordinate;
    use crate::prayer_times::schedule::fixtures::*;
    use crate::prayer_times::MidnightPolicy;
    use crate::shake::ShakeConfig;
    use chrono::FixedOffset;

    fn fixed_tracker() -> Tracker<FixedSource> {
        Tracker::new(
            FixedSource::default(),
            FixedOffset::east_opt(0).unwrap(),
            MidnightPolicy::PreviousIsha,
        )
    }

    fn place() -> Place {
        Place::new("London", Coordinate::new(51.5074, -0.1278))
    }

    const THREE_JOLTS: &str = "0,0,1\n2,1,1\n0,0,1\n2,1,1\n0,0,1\n2,1,1\n0,0,1\n";

    #[test]
    fn replay_logs_the_current_prayer_once() {
        let conn = crate::db::open_in_memory().unwrap();
        let now = at(day(2024, 3, 15), hm(16, 0));
        let mut detector = ShakeDetector::new(ShakeConfig::default());

        let mut sensor = ReplayAccelerometer::parse(THREE_JOLTS);
        let summary = replay(&conn, &fixed_tracker(), &place(), &mut detector, &mut sensor, 100, now)
            .unwrap();
        assert_eq!(summary.samples, 7);
        assert_eq!(summary.logged, vec![PrayerName::Asr]);
        assert_eq!(StreakRepo::load(&conn).unwrap(), 1);

        let mut sensor = ReplayAccelerometer::parse(THREE_JOLTS);
        let again = replay(&conn, &fixed_tracker(), &place(), &mut detector, &mut sensor, 100, now)
            .unwrap();
        assert!(again.logged.is_empty());
        assert_eq!(again.already_logged, 1);
        assert_eq!(StreakRepo::load(&conn).unwrap(), 1);
    }

    #[test]
    fn slow_trace_never_completes() {
        let conn = crate::db::open_in_memory().unwrap();
        let now = at(day(2024, 3, 15), hm(16, 0));
        let mut detector = ShakeDetector::new(ShakeConfig::default());
        let mut sensor = ReplayAccelerometer::parse(THREE_JOLTS);

        // Jolts land 2.2s apart, past the 2s burst window.
        let summary = replay(&conn, &fixed_tracker(), &place(), &mut detector, &mut sensor, 1100, now)
            .unwrap();
        assert!(summary.logged.is_empty());
        assert_eq!(StreakRepo::load(&conn).unwrap(), 0);
    }

    #[test]
    fn mark_records_on_the_prayer_day() {
        let conn = crate::db::open_in_memory().unwrap();
        // 01:00: yesterday's Isha is still current.
        let now = at(day(2024, 3, 15), hm(1, 0));
        let outcome = mark(&conn, &fixed_tracker(), &place(), PrayerName::Isha, now).unwrap();
        assert_eq!(outcome.streak(), 1);
        assert!(CompletionRepo::load(&conn, day(2024, 3, 14))
            .unwrap()
            .contains(PrayerName::Isha));

        let again = mark(&conn, &fixed_tracker(), &place(), PrayerName::Isha, now).unwrap();
        assert!(matches!(again, RecordOutcome::AlreadyCompleted { streak: 1 }));
    }

    #[test]
    fn mark_refuses_future_prayers() {
        let conn = crate::db::open_in_memory().unwrap();
        let now = at(day(2024, 3, 15), hm(13, 0));
        assert!(mark(&conn, &fixed_tracker(), &place(), PrayerName::Maghrib, now).is_err());
        assert!(mark(&conn, &fixed_tracker(), &place(), PrayerName::Fajr, now).is_ok());
    }
}
