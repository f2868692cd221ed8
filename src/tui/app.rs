use anyhow::Result;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use log::{info, warn};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};
use rusqlite::Connection;
use std::path::PathBuf;
use unicode_width::UnicodeWidthStr;

use crate::config::AppConfig;
use crate::db::repository::{CompletionLog, RecordOutcome};
use crate::location::{LocationSource, ResolvedLocation, PRESET_CITIES};
use crate::models::{Place, PrayerName};
use crate::notify::{reschedule, InAppScheduler};
use crate::prayer_times::{DaySnapshot, PrayerCalculator, Tracker};
use crate::shake::{AccelSample, RestingAccelerometer, ShakeDetector, ShakeEvent};
use crate::tui::events::{Clock, Event, EventHandler};
use crate::tui::theme;
use crate::tui::widgets::{dial, header, next_prayer, prayers, statusbar, streak};
use crate::utils::format::{format_offset, format_time};
use crate::utils::hijri::hijri_string;

const TICK_RATE_MS: u64 = 1000;
const BANNER_SECS: i64 = 8;

#[derive(Debug, Clone, PartialEq)]
pub enum Overlay {
    PrayerLogged { prayer: PrayerName, at: DateTime<Utc> },
    AlreadyLogged(PrayerName),
    LocationPicker { selected: usize },
    Help,
}

pub struct App {
    pub config: AppConfig,
    config_path: Option<PathBuf>,
    pub place: Place,
    tracker: Tracker<PrayerCalculator>,
    pub snapshot: DaySnapshot,
    detector: ShakeDetector,
    notifications: InAppScheduler,
    notified_for: Option<NaiveDate>,
    pub overlay: Option<Overlay>,
    banner: Option<(String, DateTime<Utc>)>,
    shake_progress: Option<(u32, u32)>,
    hijri_str: Option<String>,
    loaded_at: DateTime<Utc>,
    pub now: DateTime<Utc>,
    pub should_quit: bool,
}

impl App {
    pub fn new(
        conn: &Connection,
        config: AppConfig,
        location: ResolvedLocation,
        config_path: Option<PathBuf>,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        let place = location.place;
        let tracker = Tracker::from_config(&config.salah, place.coordinate)?;
        let snapshot = DaySnapshot::load(conn, &tracker, &place, now)?;
        let detector = ShakeDetector::new(config.shake.clone());

        let mut app = App {
            config,
            config_path,
            place,
            tracker,
            snapshot,
            detector,
            notifications: InAppScheduler::new(),
            notified_for: None,
            overlay: None,
            banner: None,
            shake_progress: None,
            hijri_str: None,
            loaded_at: now,
            now,
            should_quit: false,
        };
        app.refresh_hijri();
        app.schedule_notifications();

        if let LocationSource::Fallback(reason) = location.source {
            app.show_banner(format!(
                "Location unavailable ({:?}), showing {}",
                reason, app.place.name
            ));
        }
        Ok(app)
    }

    fn show_banner(&mut self, text: String) {
        self.banner = Some((text, self.now + Duration::seconds(BANNER_SECS)));
    }

    fn refresh_hijri(&mut self) {
        let today = self.tracker.local_date(self.now);
        self.hijri_str = hijri_string(today, self.config.salah.hijri_offset);
    }

    fn schedule_notifications(&mut self) {
        let today = self.tracker.local_date(self.now);
        self.notified_for = Some(today);
        if !self.config.notifications.enabled {
            return;
        }
        let result = self
            .tracker
            .schedule_for(today)
            .map_err(anyhow::Error::from)
            .and_then(|schedule| reschedule(&mut self.notifications, &schedule, self.now));
        if let Err(e) = result {
            warn!("Could not schedule notifications for {}: {:#}", today, e);
        }
    }

    /// Re-derive the snapshot from the store. On failure the old snapshot is
    /// kept, moved forward to `now`.
    fn reload(&mut self, conn: &Connection) {
        match DaySnapshot::load(conn, &self.tracker, &self.place, self.now) {
            Ok(snapshot) => {
                self.snapshot = snapshot;
                self.loaded_at = self.now;
            }
            Err(e) => {
                warn!("Refreshing prayer times failed: {:#}", e);
                self.snapshot = self.snapshot.advance(self.now);
            }
        }
    }

    pub fn tick(&mut self, conn: &Connection, now: DateTime<Utc>, now_ms: u64) {
        self.now = now;

        self.detector.expire(now_ms);
        if self.detector.count() == 0 {
            self.shake_progress = None;
        }

        if self.banner.as_ref().is_some_and(|(_, until)| now >= *until) {
            self.banner = None;
        }

        let refresh = Duration::seconds(self.config.salah.refresh_secs.max(1) as i64);
        if self.snapshot.is_stale(now) || now - self.loaded_at >= refresh {
            self.reload(conn);
        } else {
            self.snapshot = self.snapshot.advance(now);
        }

        if self.notified_for != Some(self.tracker.local_date(now)) {
            self.refresh_hijri();
            self.schedule_notifications();
        }

        for due in self.notifications.take_due(now) {
            info!("{}: {}", due.title, due.body);
            self.show_banner(format!("🔔 {} · {}", due.title, due.body));
        }
    }

    pub fn handle_key(
        &mut self,
        key: KeyEvent,
        conn: &Connection,
        now: DateTime<Utc>,
        now_ms: u64,
    ) {
        // Some terminals also report release and repeat events.
        if key.kind != KeyEventKind::Press {
            return;
        }

        match self.overlay.clone() {
            Some(Overlay::LocationPicker { selected }) => self.handle_picker_key(key, conn, selected),
            Some(_) => {
                // Any key dismisses the other overlays.
                self.overlay = None;
            }
            None => match key.code {
                KeyCode::Esc | KeyCode::Char('q') => {
                    self.should_quit = true;
                }
                KeyCode::Char('?') => {
                    self.overlay = Some(Overlay::Help);
                }
                KeyCode::Char('l') => {
                    let selected = PRESET_CITIES
                        .iter()
                        .position(|c| c.name == self.place.name)
                        .unwrap_or(0);
                    self.overlay = Some(Overlay::LocationPicker { selected });
                }
                KeyCode::Char(' ') => {
                    let jolt = self.detector.config().threshold + 1.0;
                    self.on_sample(conn, AccelSample::new(jolt, 0.0, 0.0, now_ms), now);
                }
                _ => {}
            },
        }
    }

    fn handle_picker_key(&mut self, key: KeyEvent, conn: &Connection, selected: usize) {
        let last = PRESET_CITIES.len().saturating_sub(1);
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.overlay = None;
            }
            KeyCode::Up => {
                self.overlay = Some(Overlay::LocationPicker {
                    selected: selected.saturating_sub(1),
                });
            }
            KeyCode::Down => {
                self.overlay = Some(Overlay::LocationPicker {
                    selected: (selected + 1).min(last),
                });
            }
            KeyCode::Enter => {
                self.overlay = None;
                self.choose_city(conn, selected);
            }
            _ => {}
        }
    }

    fn choose_city(&mut self, conn: &Connection, index: usize) {
        let Some(city) = PRESET_CITIES.get(index) else {
            return;
        };
        let mut config = self.config.clone();
        config.set_city(city);

        let tracker = match Tracker::from_config(&config.salah, city.coordinate) {
            Ok(t) => t,
            Err(e) => {
                warn!("Cannot switch to {}: {}", city.name, e);
                self.show_banner(format!("Cannot switch to {}: {}", city.name, e));
                return;
            }
        };

        if let Some(path) = &self.config_path {
            if let Err(e) = config.save_to(path) {
                warn!("Saving location failed: {:#}", e);
                self.show_banner("Location changed for this session only".to_string());
            }
        }

        info!("Location set to {}", city.name);
        self.config = config;
        self.tracker = tracker;
        self.place = city.place();
        self.reload(conn);
        self.refresh_hijri();
        self.schedule_notifications();
    }

    /// Feed one accelerometer reading to the detector and act on the result.
    /// A completion is committed to the store before the snapshot is rebuilt.
    pub fn on_sample(&mut self, conn: &Connection, sample: AccelSample, now: DateTime<Utc>) {
        // Samples arrive between ticks; the target must not lag a boundary.
        self.now = now;
        if self.snapshot.is_stale(now) {
            self.reload(conn);
        }

        let target = self.snapshot.shake_target();
        let event = self
            .detector
            .on_sample(&sample, target, &self.snapshot.completions);

        match event {
            None => {}
            Some(ShakeEvent::Progress { count, required }) => {
                self.shake_progress = Some((count, required));
            }
            Some(ShakeEvent::Completed(prayer)) => {
                self.shake_progress = None;
                match CompletionLog::record(conn, self.snapshot.current.day, prayer) {
                    Ok(RecordOutcome::Added { .. }) => {
                        self.reload(conn);
                        self.overlay = Some(Overlay::PrayerLogged {
                            prayer,
                            at: self.now,
                        });
                    }
                    Ok(RecordOutcome::AlreadyCompleted { .. }) => {
                        self.overlay = Some(Overlay::AlreadyLogged(prayer));
                    }
                    Err(e) => {
                        warn!("Logging {} failed: {:#}", prayer, e);
                        self.show_banner(format!("Could not log {}", prayer));
                    }
                }
            }
            Some(ShakeEvent::AlreadyCompleted(prayer)) => {
                self.shake_progress = None;
                self.overlay = Some(Overlay::AlreadyLogged(prayer));
            }
        }
    }

    pub fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let offset = self.config.salah.offset();

        // Clear background
        frame.render_widget(Block::default().style(theme::base()), area);

        let outer_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5), // header
                Constraint::Min(0),    // body
                Constraint::Length(1), // status bar
            ])
            .split(area);

        header::render(
            frame,
            outer_chunks[0],
            &self.place.name,
            self.now,
            &offset,
            self.hijri_str.as_deref(),
        );
        statusbar::render(
            frame,
            outer_chunks[2],
            self.banner.as_ref().map(|(text, _)| text.as_str()),
        );

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(outer_chunks[1]);

        let left_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(10), // current / next prayer
                Constraint::Min(6),     // dial
            ])
            .split(columns[0]);

        let right_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(7), // prayers
                Constraint::Min(6),    // streak
            ])
            .split(columns[1]);

        next_prayer::render(
            frame,
            left_chunks[0],
            &self.snapshot,
            &offset,
            self.shake_progress,
        );
        dial::render(frame, left_chunks[1], &self.snapshot, self.now);
        prayers::render(frame, right_chunks[0], &self.snapshot, &offset);
        streak::render(
            frame,
            right_chunks[1],
            self.snapshot.streak,
            &self.snapshot.completions,
        );

        match &self.overlay {
            None => {}
            Some(Overlay::PrayerLogged { prayer, at }) => {
                let lines = vec![
                    ("🕌".to_string(), theme::bold()),
                    (prayer.display_name().to_string(), theme::bold()),
                    ("الحمد لله".to_string(), theme::primary()),
                    ("Alhamdulillah".to_string(), theme::dim()),
                    ("May Allah accept your prayer".to_string(), theme::bold()),
                    (format_time(*at, &offset), theme::dim()),
                ];
                draw_modal(frame, " Prayer Logged ", theme::primary(), lines);
            }
            Some(Overlay::AlreadyLogged(prayer)) => {
                let lines = vec![
                    ("✨".to_string(), theme::bold()),
                    (format!("{} Already Logged!", prayer), theme::bold()),
                    ("But remember what the Prophet ﷺ said:".to_string(), theme::dim()),
                    (
                        "\"The best prayer after the prescribed ones is the night prayer.\""
                            .to_string(),
                        theme::primary(),
                    ),
                    ("Extra prayers = extra blessings 🌟".to_string(), theme::bold()),
                ];
                draw_modal(frame, " Already Logged ", theme::gold(), lines);
            }
            Some(Overlay::LocationPicker { selected }) => self.draw_location_picker(frame, *selected),
            Some(Overlay::Help) => draw_help_overlay(frame),
        }
    }

    fn draw_location_picker(&self, frame: &mut Frame, selected: usize) {
        let area = frame.area();
        let width = PRESET_CITIES
            .iter()
            .map(|c| c.name.width() + 14)
            .max()
            .unwrap_or(20) as u16
            + 4;
        let popup_area = centered(area, width, area.height.saturating_sub(4).min(18));
        frame.render_widget(Clear, popup_area);

        let items: Vec<ListItem> = PRESET_CITIES
            .iter()
            .map(|c| {
                let marker = if c.name == self.place.name { "● " } else { "  " };
                ListItem::new(Line::from(vec![
                    Span::styled(marker, theme::primary()),
                    Span::styled(format!("{:<14}", c.name), theme::bold()),
                    Span::styled(format_offset(c.utc_offset), theme::dim()),
                ]))
            })
            .collect();

        let block = Block::default()
            .title(Span::styled(" Choose Location ", theme::gold()))
            .title_bottom(Span::styled(" ↑↓ move · Enter select · Esc close ", theme::dim()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::gold())
            .style(theme::surface());

        let list = List::new(items)
            .block(block)
            .highlight_style(theme::gold().add_modifier(Modifier::REVERSED));
        let mut state = ListState::default().with_selected(Some(selected));
        frame.render_stateful_widget(list, popup_area, &mut state);
    }
}

/// A rectangle of at most `width` x `height`, centered in `area`.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn draw_modal(
    frame: &mut Frame,
    title: &str,
    border: ratatui::style::Style,
    lines: Vec<(String, ratatui::style::Style)>,
) {
    let widest = lines.iter().map(|(text, _)| text.width()).max().unwrap_or(0);
    let popup_area = centered(
        frame.area(),
        widest as u16 + 8,
        lines.len() as u16 * 2 + 3,
    );
    frame.render_widget(Clear, popup_area);

    let mut text = Vec::new();
    for (line, style) in lines {
        text.push(Line::from(""));
        text.push(Line::from(Span::styled(line, style)));
    }
    text.push(Line::from(""));
    text.push(Line::from(Span::styled("[any key] close", theme::dim())));

    let block = Block::default()
        .title(Span::styled(title.to_string(), border))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border)
        .style(theme::surface());

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center);
    frame.render_widget(paragraph, popup_area);
}

fn draw_help_overlay(frame: &mut Frame) {
    let keys = [
        ("[space]", "Simulate one shake"),
        ("[l]", "Choose location"),
        ("[?]", "Toggle help"),
        ("[q] / Esc", "Quit"),
    ];

    let mut help_text = vec![
        Line::from(Span::styled(
            "  Keybindings",
            theme::gold().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    for (key, label) in keys {
        help_text.push(Line::from(vec![
            Span::styled(format!("  {:<12}", key), theme::gold()),
            Span::styled(label, theme::dim()),
        ]));
    }
    help_text.push(Line::from(""));
    help_text.push(Line::from(Span::styled(
        "  Shake after praying to log the current prayer.",
        theme::dim(),
    )));

    let widest = help_text.iter().map(|l| l.width()).max().unwrap_or(0) as u16;
    let popup_area = centered(frame.area(), widest + 4, help_text.len() as u16 + 2);
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(Span::styled(" Help ", theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::gold())
        .style(theme::surface());

    frame.render_widget(Paragraph::new(help_text).block(block), popup_area);
}

/// Run the TUI event loop.
pub fn run(conn: Connection, config: AppConfig, location: ResolvedLocation) -> Result<()> {
    let config_path = AppConfig::config_path().ok();
    let sample_interval_ms = config.shake.sample_interval_ms;
    let mut app = App::new(&conn, config, location, config_path, Utc::now())?;

    let clock = Clock::start();
    let mut terminal = ratatui::init();
    let events = EventHandler::new(
        TICK_RATE_MS,
        sample_interval_ms,
        Box::new(RestingAccelerometer),
        clock,
    );

    let result = loop {
        if let Err(e) = terminal.draw(|frame| app.draw(frame)) {
            break Err(e.into());
        }

        match events.next() {
            Ok(Event::Key(key)) => {
                app.handle_key(key, &conn, Utc::now(), clock.now_ms());
                if app.should_quit {
                    break Ok(());
                }
            }
            Ok(Event::Sample(sample)) => app.on_sample(&conn, sample, Utc::now()),
            Ok(Event::Tick) => app.tick(&conn, Utc::now(), clock.now_ms()),
            Err(e) => break Err(e.into()),
        }
    };

    drop(events);
    ratatui::restore();
    result
}
