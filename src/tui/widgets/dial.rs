use chrono::{DateTime, Utc};
use ratatui::{
    layout::Rect,
    style::Style,
    symbols::Marker,
    text::Span,
    widgets::canvas::{Canvas, Circle, Line as CanvasLine, Points},
    Frame,
};

use crate::prayer_times::dial::{marker_progress, sun_progress, DialGeometry};
use crate::prayer_times::DaySnapshot;
use crate::tui::theme;

const ARC_STEPS: usize = 64;

pub fn render(frame: &mut Frame, area: Rect, snapshot: &DaySnapshot, now: DateTime<Utc>) {
    let dial = DialGeometry::new(0.0, 0.0, 1.0);
    let arc = dial.arc_points(ARC_STEPS);
    let schedule = &snapshot.schedule;

    let markers: Vec<_> = snapshot
        .statuses
        .iter()
        .map(|(prayer, status)| {
            let (x, y) = dial.position(marker_progress(schedule, *prayer));
            let color = if status.is_completed {
                theme::PRIMARY
            } else if status.is_missed {
                theme::RED
            } else {
                theme::TEXT_DIM
            };
            (*prayer, x, y, color)
        })
        .collect();
    let sun = sun_progress(schedule, now).map(|p| dial.position(p));

    let canvas = Canvas::default()
        .block(theme::panel("Day"))
        .marker(Marker::Braille)
        .x_bounds([-1.3, 1.3])
        .y_bounds([-0.25, 1.15])
        .paint(move |ctx| {
            for pair in arc.windows(2) {
                ctx.draw(&CanvasLine::new(
                    pair[0].0,
                    pair[0].1,
                    pair[1].0,
                    pair[1].1,
                    theme::BORDER,
                ));
            }
            ctx.draw(&CanvasLine::new(-1.2, 0.0, 1.2, 0.0, theme::BORDER));

            for (prayer, x, y, color) in &markers {
                ctx.draw(&Points {
                    coords: &[(*x, *y)],
                    color: *color,
                });
                let label_y = if *y < 0.1 { *y - 0.2 } else { *y + 0.08 };
                let initial = &prayer.display_name()[..1];
                ctx.print(*x, label_y, Span::styled(initial, Style::default().fg(*color)));
            }

            if let Some((x, y)) = sun {
                ctx.layer();
                ctx.draw(&Circle {
                    x,
                    y,
                    radius: 0.06,
                    color: theme::SUN,
                });
            }
        });

    frame.render_widget(canvas, area);
}
