use chrono::FixedOffset;
use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{List, ListItem},
    Frame,
};

use crate::models::PrayerStatus;
use crate::prayer_times::DaySnapshot;
use crate::tui::theme;
use crate::utils::format::format_time;

pub fn render(frame: &mut Frame, area: Rect, snapshot: &DaySnapshot, offset: &FixedOffset) {
    let title = format!("Prayers · {}", snapshot.schedule.date().format("%b %d"));
    let block = theme::panel(&title);

    let items: Vec<ListItem> = snapshot
        .statuses
        .iter()
        .map(|(prayer, status)| {
            let time_str = format_time(snapshot.schedule.time(*prayer), offset);

            let (icon, status_style) = icon(status);

            let name_style = if status.is_current {
                theme::gold().add_modifier(Modifier::BOLD)
            } else {
                theme::bold()
            };

            let line = Line::from(vec![
                Span::styled(format!("  {:<9}", prayer.display_name()), name_style),
                Span::styled(format!("{:>9}  ", time_str), theme::dim()),
                Span::styled(icon, status_style),
                Span::styled(format!("  {}", status.label()), theme::dim()),
            ]);

            ListItem::new(line)
        })
        .collect();

    let list = List::new(items).block(block);
    frame.render_widget(list, area);
}

fn icon(status: &PrayerStatus) -> (&'static str, ratatui::style::Style) {
    if status.is_completed {
        ("●", theme::primary())
    } else if status.is_missed {
        ("✗", theme::red())
    } else if status.is_current {
        ("◐", theme::amber())
    } else {
        ("○", theme::dim())
    }
}
