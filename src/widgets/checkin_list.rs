use crate::checkins::{format_duration, CheckinList};
use crate::theme::Theme;
use crate::widgets::chrome::panel_block;
use ratatui::prelude::*;
use ratatui::widgets::*;

fn centered_message<'a>(text: impl Into<Line<'a>>, block: Block<'a>) -> Paragraph<'a> {
    Paragraph::new(vec![Line::from(""), text.into()])
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
}

pub fn draw_checkins(f: &mut Frame, area: Rect, list: &CheckinList, theme: &Theme, tick: u64) {
    let title = match list {
        CheckinList::Loaded { pagination, .. } => {
            let prev = if pagination.has_previous() { "← prev" } else { "" };
            let next = if pagination.has_next() { "next →" } else { "" };
            format!("Recent Check-Ins  {prev} {next}")
        }
        _ => "Recent Check-Ins".to_string(),
    };
    let block = panel_block(&title, true, theme);
    match list {
        CheckinList::Idle => {
            f.render_widget(
                centered_message(Span::styled("Press r to load check-ins", theme.text_muted()), block),
                area,
            );
        }
        CheckinList::Loading { .. } => {
            let spinner = ["⠋", "⠙", "⠸", "⠴", "⠦", "⠇"][tick as usize % 6];
            f.render_widget(
                centered_message(
                    Span::styled(format!("{spinner} Loading check-ins…"), theme.text_muted()),
                    block,
                ),
                area,
            );
        }
        CheckinList::Failed(err) => {
            tracing::debug!("check-in list in failed state: {err}");
            f.render_widget(
                centered_message(
                    Span::styled(
                        "Sorry, the check-ins for this monitor could not be loaded. Press r to retry.",
                        theme.text_error(),
                    ),
                    block,
                ),
                area,
            );
        }
        CheckinList::Loaded { items, .. } if items.is_empty() => {
            f.render_widget(
                centered_message(
                    Span::styled("No check-ins recorded yet", theme.text_muted()),
                    block,
                ),
                area,
            );
        }
        CheckinList::Loaded { items, .. } => {
            let header = Row::new(vec!["Status", "Started", "Duration", "Environment"])
                .style(theme.text_active_bold());
            let rows = items.iter().map(|c| {
                Row::new(vec![
                    Cell::from(Span::styled(c.status.label(), theme.checkin_status(c.status))),
                    Cell::from(c.date_created.clone()),
                    Cell::from(format_duration(c.duration)),
                    Cell::from(c.environment.clone().unwrap_or_else(|| "-".to_string())),
                ])
            });
            let table = Table::new(
                rows,
                [
                    Constraint::Length(12),
                    Constraint::Min(24),
                    Constraint::Length(10),
                    Constraint::Length(16),
                ],
            )
            .header(header)
            .block(block);
            f.render_widget(table, area);
        }
    }
}
