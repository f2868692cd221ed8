use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::models::CompletionRecord;
use crate::tui::theme;
use crate::utils::format::format_streak;

pub fn render(frame: &mut Frame, area: Rect, streak: u64, today: &CompletionRecord) {
    let block = theme::panel("Streak");

    // One dot per prayer logged on the current prayer day.
    let mut dots = vec![Span::styled("  ", theme::dim())];
    for prayer in crate::models::PrayerName::ALL {
        let (dot, style) = if today.contains(prayer) {
            ("●", theme::primary().add_modifier(Modifier::BOLD))
        } else {
            ("○", theme::dim())
        };
        dots.push(Span::styled(dot, style));
        dots.push(Span::styled(" ", theme::dim()));
    }
    dots.push(Span::styled(format!(" {}/5 today", today.len()), theme::dim()));

    let text = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  🔥 ", theme::amber()),
            Span::styled(
                format_streak(streak),
                theme::amber().add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(""),
        Line::from(dots),
    ];
    frame.render_widget(Paragraph::new(text).block(block), area);
}
