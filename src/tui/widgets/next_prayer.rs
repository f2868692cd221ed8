use chrono::FixedOffset;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tui_big_text::{BigText, PixelSize};

use crate::prayer_times::status::Focus;
use crate::prayer_times::DaySnapshot;
use crate::tui::theme;
use crate::utils::format::format_time;

/// Rows a quadrant-sized name needs, plus the lines around it.
const BIG_TEXT_MIN_HEIGHT: u16 = 8;

pub fn render(
    frame: &mut Frame,
    area: Rect,
    snapshot: &DaySnapshot,
    offset: &FixedOffset,
    shake_progress: Option<(u32, u32)>,
) {
    let block = theme::panel("Prayer");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Focus { prayer, upcoming } = snapshot.focus();
    let starts_at = snapshot.schedule.time(prayer);
    let (caption, countdown) = if upcoming {
        (
            format!("  Next · {}", format_time(snapshot.current.next_at, offset)),
            format!("  starts in {}", snapshot.remaining_label()),
        )
    } else {
        (
            format!("  Now · since {}", format_time(starts_at, offset)),
            format!(
                "  {} left until {}",
                snapshot.remaining_label(),
                snapshot.current.next
            ),
        )
    };

    let shake_line = match (snapshot.shake_target(), shake_progress) {
        (None, _) => Line::from(Span::styled("  Shaking opens when Fajr begins", theme::dim())),
        (Some(_), Some((count, required))) => Line::from(vec![
            Span::styled("  Shake ", theme::dim()),
            Span::styled(
                format!("{}/{}", count, required),
                theme::amber().add_modifier(Modifier::BOLD),
            ),
        ]),
        (Some(target), None) if snapshot.completions.contains(target) => Line::from(Span::styled(
            format!("  {} logged ✓", target),
            theme::primary(),
        )),
        (Some(target), None) => Line::from(Span::styled(
            format!("  Shake after praying {} to log it", target),
            theme::dim(),
        )),
    };

    let caption_line = Line::from(Span::styled(caption, theme::dim()));
    let countdown_line = Line::from(Span::styled(
        countdown,
        theme::amber().add_modifier(Modifier::BOLD),
    ));

    if inner.height < BIG_TEXT_MIN_HEIGHT {
        let text = vec![
            caption_line,
            Line::from(Span::styled(
                format!("  {}", prayer.display_name().to_uppercase()),
                theme::gold().add_modifier(Modifier::BOLD),
            )),
            countdown_line,
            shake_line,
        ];
        frame.render_widget(Paragraph::new(text), inner);
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(4),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

    frame.render_widget(Paragraph::new(caption_line), rows[0]);

    let name = BigText::builder()
        .pixel_size(PixelSize::Quadrant)
        .style(theme::gold())
        .lines(vec![Line::from(format!(" {}", prayer.display_name().to_uppercase()))])
        .build();
    frame.render_widget(name, rows[1]);

    frame.render_widget(Paragraph::new(countdown_line), rows[3]);
    frame.render_widget(Paragraph::new(shake_line), rows[4]);
}
