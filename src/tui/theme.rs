use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType, Borders};

pub const BG: Color = Color::Rgb(14, 20, 24);
pub const SURFACE: Color = Color::Rgb(22, 31, 36);
pub const BORDER: Color = Color::Rgb(44, 62, 70);
pub const TEXT: Color = Color::Rgb(226, 232, 230);
pub const TEXT_DIM: Color = Color::Rgb(120, 138, 140);
pub const PRIMARY: Color = Color::Rgb(76, 175, 142);
pub const GOLD: Color = Color::Rgb(212, 175, 85);
pub const AMBER: Color = Color::Rgb(222, 150, 70);
pub const RED: Color = Color::Rgb(196, 88, 72);
pub const SUN: Color = Color::Rgb(250, 204, 90);

pub fn base() -> Style {
    Style::default().fg(TEXT).bg(BG)
}

pub fn dim() -> Style {
    Style::default().fg(TEXT_DIM)
}

pub fn primary() -> Style {
    Style::default().fg(PRIMARY)
}

pub fn gold() -> Style {
    Style::default().fg(GOLD)
}

pub fn amber() -> Style {
    Style::default().fg(AMBER)
}

pub fn red() -> Style {
    Style::default().fg(RED)
}

pub fn bold() -> Style {
    Style::default().fg(TEXT).add_modifier(Modifier::BOLD)
}

pub fn surface() -> Style {
    Style::default().fg(TEXT).bg(SURFACE)
}

/// Rounded panel with a title, as used by every section of the screen.
pub fn panel(title: &str) -> Block<'_> {
    Block::default()
        .title(ratatui::text::Span::styled(format!(" {} ", title), gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER))
        .style(surface())
}
