use ratatui::layout::Rect;
use ratatui::prelude::Frame;
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::theme::Theme;

/// Rows needed to show `text` in a bordered banner `width` columns wide.
pub fn banner_height(text: &str, width: u16) -> u16 {
    let inner = width.saturating_sub(4).max(1) as usize;
    let rows: usize = text
        .lines()
        .map(|l| l.chars().count().div_ceil(inner).max(1))
        .sum();
    (rows.max(1) as u16).saturating_add(2).min(8)
}

/// Error banner shown above the form for form-level and network failures.
pub fn draw_alert_banner(f: &mut Frame, area: Rect, text: &str, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.text_error())
        .title(Span::styled(
            " Error ",
            theme.text_error().add_modifier(Modifier::BOLD),
        ));
    let lines: Vec<Line> = text
        .lines()
        .map(|l| Line::from(Span::styled(l.to_string(), theme.text_error())))
        .collect();
    let p = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(p, area);
}
