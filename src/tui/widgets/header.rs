use chrono::{DateTime, FixedOffset, Utc};
use ratatui::{
    layout::{Alignment, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::tui::theme;

pub fn render(
    frame: &mut Frame,
    area: Rect,
    place: &str,
    now: DateTime<Utc>,
    offset: &FixedOffset,
    hijri_str: Option<&str>,
) {
    let gregorian_str = now.with_timezone(offset).format("%A, %b %d, %Y").to_string();

    let title_line = Line::from(vec![
        Span::styled("  shakr  ", theme::primary().add_modifier(Modifier::BOLD)),
        Span::styled("·  ", theme::dim()),
        Span::styled(format!("📍 {}", place), theme::bold()),
    ]);

    let mut date_spans = Vec::new();
    if let Some(hijri) = hijri_str {
        date_spans.push(Span::styled(hijri.to_string(), theme::gold()));
        date_spans.push(Span::styled("  ·  ", theme::dim()));
    }
    date_spans.push(Span::styled(gregorian_str, theme::dim()));

    let text = vec![title_line, Line::from(""), Line::from(date_spans)];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::primary())
        .style(theme::base());

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}
