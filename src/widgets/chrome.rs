use crate::theme::Theme;
use crate::ui::View;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Tabs};

pub fn panel_block<'a>(title: &'a str, focused: bool, theme: &Theme) -> Block<'a> {
    let b = Block::default().borders(Borders::ALL).title(title);
    if focused {
        b.border_style(theme.border_focused())
    } else {
        b.border_style(theme.border_unfocused())
    }
}

/// Title row: monitor name on the left, view tabs on the right.
pub fn draw_header(
    f: &mut Frame,
    area: Rect,
    title: &str,
    view: View,
    checkins_enabled: bool,
    theme: &Theme,
) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(10), Constraint::Length(28)])
        .split(area);
    f.render_widget(
        ratatui::widgets::Paragraph::new(Line::from(Span::styled(
            format!(" {title}"),
            theme.title_style(),
        ))),
        chunks[0],
    );
    let checkins_label = if checkins_enabled {
        Span::raw("Check-ins")
    } else {
        Span::styled("Check-ins", theme.text_muted())
    };
    let tabs = Tabs::new(vec![Line::from("Configure"), Line::from(checkins_label)])
        .select(match view {
            View::Configure => 0,
            View::Checkins => 1,
        })
        .highlight_style(theme.text_active_bold())
        .divider("|");
    f.render_widget(tabs, chunks[1]);
}
