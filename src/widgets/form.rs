use crate::form::codec::FieldValue;
use crate::form::fields::{FieldKind, FieldSpec, SelectOption};
use crate::form::{FormMsg, MonitorForm};
use crate::theme::Theme;
use crate::widgets::chrome::panel_block;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::*;

pub const OPTIONS_VISIBLE: usize = 8;

/// Cursor and in-progress edit for the form view. Field values themselves live
/// in [`MonitorForm`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FormUiState {
    /// Index into the visible fields; `fields.len()` is the Save button.
    pub selected: usize,
    pub editing: bool,
    pub buffer: String,
    pub option_cursor: usize,
}

fn current_option_index(spec: &FieldSpec, value: Option<&FieldValue>) -> usize {
    let current = value.map(FieldValue::as_display).unwrap_or_default();
    spec.options()
        .iter()
        .position(|o| o.value == current)
        .unwrap_or(0)
}

fn number_value(raw: &str) -> FieldValue {
    let raw = raw.trim();
    if raw.is_empty() {
        FieldValue::Unset
    } else {
        match raw.parse::<i64>() {
            Ok(n) => FieldValue::Number(n),
            // kept as typed; encoded as null and left for the server to reject
            Err(_) => FieldValue::text(raw),
        }
    }
}

impl FormUiState {
    /// Keep the cursor on a field after the visible set shrank.
    pub fn clamp(&mut self, field_count: usize) {
        if self.selected > field_count {
            self.selected = field_count;
            self.editing = false;
        }
    }

    /// Handle a key for the form view. Returns the form message to dispatch, if any.
    pub fn on_key(&mut self, form: &MonitorForm, key: KeyEvent) -> Option<FormMsg> {
        let fields = form.visible_fields();
        self.clamp(fields.len());
        if self.editing {
            return match fields.get(self.selected) {
                Some(spec) => self.on_edit_key(form, spec, key),
                None => {
                    self.editing = false;
                    None
                }
            };
        }
        match key.code {
            KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            KeyCode::Down => {
                self.selected = (self.selected + 1).min(fields.len());
                None
            }
            KeyCode::Enter => match fields.get(self.selected) {
                None => Some(FormMsg::Submit),
                Some(spec) if spec.disabled => None,
                Some(spec) => {
                    let value = form.values().get(spec.path);
                    self.editing = true;
                    match spec.kind {
                        FieldKind::Text | FieldKind::Number => {
                            self.buffer = value.map(FieldValue::as_display).unwrap_or_default();
                        }
                        FieldKind::Select(_) | FieldKind::Radio(_) => {
                            self.option_cursor = current_option_index(spec, value);
                        }
                        FieldKind::MultiSelect(_) => self.option_cursor = 0,
                    }
                    None
                }
            },
            _ => None,
        }
    }

    fn on_edit_key(
        &mut self,
        form: &MonitorForm,
        spec: &FieldSpec,
        key: KeyEvent,
    ) -> Option<FormMsg> {
        let set = |value: FieldValue| FormMsg::SetValue {
            path: spec.path.to_string(),
            value,
        };
        match (&spec.kind, key.code) {
            (_, KeyCode::Esc) => {
                self.editing = false;
                None
            }
            (FieldKind::Text, KeyCode::Enter) => {
                self.editing = false;
                Some(set(FieldValue::text(std::mem::take(&mut self.buffer))))
            }
            (FieldKind::Number, KeyCode::Enter) => {
                self.editing = false;
                Some(set(number_value(&std::mem::take(&mut self.buffer))))
            }
            (FieldKind::Text | FieldKind::Number, KeyCode::Backspace) => {
                self.buffer.pop();
                None
            }
            (FieldKind::Text | FieldKind::Number, KeyCode::Char(c)) => {
                self.buffer.push(c);
                None
            }
            (FieldKind::Select(_) | FieldKind::Radio(_) | FieldKind::MultiSelect(_), KeyCode::Up) => {
                self.option_cursor = self.option_cursor.saturating_sub(1);
                None
            }
            (
                FieldKind::Select(opts) | FieldKind::Radio(opts) | FieldKind::MultiSelect(opts),
                KeyCode::Down,
            ) => {
                self.option_cursor = (self.option_cursor + 1).min(opts.len().saturating_sub(1));
                None
            }
            (FieldKind::Select(opts) | FieldKind::Radio(opts), KeyCode::Enter) => {
                self.editing = false;
                opts.get(self.option_cursor)
                    .map(|o| set(FieldValue::text(o.value.as_str())))
            }
            (FieldKind::MultiSelect(opts), KeyCode::Char(' ')) => {
                let opt = opts.get(self.option_cursor)?;
                let mut chosen = form
                    .values()
                    .get(spec.path)
                    .map(FieldValue::as_list)
                    .unwrap_or_default();
                match chosen.iter().position(|v| *v == opt.value) {
                    Some(i) => {
                        chosen.remove(i);
                    }
                    None => chosen.push(opt.value.clone()),
                }
                Some(set(FieldValue::List(chosen)))
            }
            (FieldKind::MultiSelect(_), KeyCode::Enter) => {
                self.editing = false;
                None
            }
            _ => None,
        }
    }
}

fn option_label<'a>(opts: &'a [SelectOption], value: &str) -> Option<&'a str> {
    opts.iter()
        .find(|o| o.value == value)
        .map(|o| o.label.as_str())
}

fn value_summary(spec: &FieldSpec, value: Option<&FieldValue>) -> String {
    let raw = value.map(FieldValue::as_display).unwrap_or_default();
    match &spec.kind {
        FieldKind::Text | FieldKind::Number => raw,
        FieldKind::Select(opts) | FieldKind::Radio(opts) => option_label(opts, &raw)
            .map(str::to_string)
            .unwrap_or(raw),
        FieldKind::MultiSelect(opts) => {
            let chosen = value.map(FieldValue::as_list).unwrap_or_default();
            if chosen.is_empty() {
                "(none)".to_string()
            } else {
                chosen
                    .iter()
                    .map(|v| option_label(opts, v).unwrap_or(v.as_str()).to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            }
        }
    }
}

/// Window of `OPTIONS_VISIBLE` option rows that keeps `cursor` on screen.
fn option_window(len: usize, cursor: usize) -> (usize, usize) {
    let start = cursor.saturating_sub(OPTIONS_VISIBLE - 1).min(len);
    let end = (start + OPTIONS_VISIBLE).min(len);
    (start, end)
}

pub fn draw_form(
    f: &mut Frame,
    area: Rect,
    form: &MonitorForm,
    ui: &FormUiState,
    theme: &Theme,
    cursor_on: bool,
) {
    let fields = form.visible_fields();
    let mut lines: Vec<Line> = Vec::new();
    let mut selected_line = 0usize;
    for (i, spec) in fields.iter().enumerate() {
        let is_sel = i == ui.selected;
        if is_sel {
            selected_line = lines.len();
        }
        let sel = if is_sel { '›' } else { ' ' };
        let req = if spec.required { " *" } else { "" };
        let value = form.values().get(spec.path);
        let editing_this = ui.editing && is_sel;
        let value_style = if spec.disabled {
            theme.text_muted()
        } else if editing_this {
            theme.text_editing_bold()
        } else if is_sel {
            theme.text_active_bold()
        } else {
            Style::default()
        };
        let shown = match &spec.kind {
            FieldKind::Text | FieldKind::Number if editing_this => {
                let mut s = ui.buffer.clone();
                if cursor_on {
                    s.push('▏');
                }
                s
            }
            FieldKind::Radio(opts) => opts
                .iter()
                .map(|o| {
                    let current = value.map(FieldValue::as_display).unwrap_or_default();
                    let mark = if o.value == current { "(•)" } else { "( )" };
                    format!("{mark} {}", o.label)
                })
                .collect::<Vec<_>>()
                .join("  "),
            _ => value_summary(spec, value),
        };
        let mut row = vec![Span::raw(format!("{sel} {}{req}: ", spec.label))];
        if shown.is_empty() && !editing_this {
            if let Some(ph) = &spec.placeholder {
                row.push(Span::styled(ph.clone(), theme.text_muted()));
            }
        } else {
            row.push(Span::styled(shown, value_style));
        }
        lines.push(Line::from(row));

        if editing_this {
            match &spec.kind {
                FieldKind::Select(opts) | FieldKind::Radio(opts) => {
                    let current = value.map(FieldValue::as_display).unwrap_or_default();
                    let (start, end) = option_window(opts.len(), ui.option_cursor);
                    for (oi, opt) in opts.iter().enumerate().take(end).skip(start) {
                        let mark = if opt.value == current { "(•)" } else { "( )" };
                        let cur = if oi == ui.option_cursor { '›' } else { ' ' };
                        let st = if oi == ui.option_cursor {
                            theme.list_cursor_style()
                        } else {
                            theme.text_muted()
                        };
                        lines.push(Line::from(Span::styled(
                            format!("  {cur} {mark} {}", opt.label),
                            st,
                        )));
                    }
                }
                FieldKind::MultiSelect(opts) => {
                    let chosen = value.map(FieldValue::as_list).unwrap_or_default();
                    let (start, end) = option_window(opts.len(), ui.option_cursor);
                    if opts.is_empty() {
                        lines.push(Line::from(Span::styled(
                            "    (no teams or members loaded)",
                            theme.text_muted(),
                        )));
                    }
                    for (oi, opt) in opts.iter().enumerate().take(end).skip(start) {
                        let chk = if chosen.contains(&opt.value) { "[x]" } else { "[ ]" };
                        let cur = if oi == ui.option_cursor { '›' } else { ' ' };
                        let st = if oi == ui.option_cursor {
                            theme.list_cursor_style()
                        } else {
                            theme.text_muted()
                        };
                        lines.push(Line::from(Span::styled(
                            format!("  {cur} {chk} {}", opt.label),
                            st,
                        )));
                    }
                }
                FieldKind::Text | FieldKind::Number => {}
            }
        }
        if let Some(help) = &spec.help {
            lines.push(Line::from(Span::styled(
                format!("    {help}"),
                theme.text_muted(),
            )));
        }
        if let Some(err) = form.error_for(spec.path) {
            lines.push(Line::from(Span::styled(
                format!("  ! {err}"),
                theme.text_error(),
            )));
        }
    }

    lines.push(Line::from(""));
    let save_idx = fields.len();
    if ui.selected >= save_idx {
        selected_line = lines.len();
    }
    let save_label = if form.is_submitting() {
        "[ Saving… ]"
    } else if form.is_edit() {
        "[ Save Changes ]"
    } else {
        "[ Create Monitor ]"
    };
    let save_style = if form.is_submitting() {
        theme.text_muted()
    } else if ui.selected >= save_idx {
        theme.list_cursor_style()
    } else {
        theme.text_active_bold()
    };
    lines.push(Line::from(Span::styled(format!("  {save_label}"), save_style)));
    if let Some(msg) = &form.message {
        lines.push(Line::from(Span::styled(msg.clone(), theme.text_success())));
    }

    let title = if ui.editing {
        "Configure · editing"
    } else {
        "Configure"
    };
    let block = panel_block(title, true, theme);
    let inner_h = block.inner(area).height as usize;
    // keep the selected row (and a few option rows under it) on screen
    let scroll = (selected_line + OPTIONS_VISIBLE / 2).saturating_sub(inner_h.saturating_sub(1));
    let p = Paragraph::new(lines)
        .block(block)
        .scroll((scroll.min(u16::MAX as usize) as u16, 0));
    f.render_widget(p, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FormDefaults;
    use crate::form::{fields, FormContext};
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn form() -> MonitorForm {
        MonitorForm::new(FormDefaults::default(), FormContext::default(), None)
    }

    fn select_path(ui: &mut FormUiState, form: &MonitorForm, path: &str) {
        ui.selected = form
            .visible_fields()
            .iter()
            .position(|f| f.path == path)
            .unwrap();
    }

    #[test]
    fn typing_into_text_field_sets_value_on_enter() {
        let form = form();
        let mut ui = FormUiState::default();
        select_path(&mut ui, &form, fields::NAME);
        assert_eq!(ui.on_key(&form, key(KeyCode::Enter)), None);
        assert!(ui.editing);
        for c in "Nightly".chars() {
            ui.on_key(&form, key(KeyCode::Char(c)));
        }
        ui.on_key(&form, key(KeyCode::Backspace));
        let msg = ui.on_key(&form, key(KeyCode::Enter));
        assert_eq!(
            msg,
            Some(FormMsg::SetValue {
                path: fields::NAME.into(),
                value: FieldValue::text("Nightl")
            })
        );
        assert!(!ui.editing);
    }

    #[test]
    fn number_field_keeps_garbage_as_text() {
        assert_eq!(number_value("12"), FieldValue::Number(12));
        assert_eq!(number_value(""), FieldValue::Unset);
        assert_eq!(number_value("12min"), FieldValue::text("12min"));
    }

    #[test]
    fn radio_enter_picks_option_under_cursor() {
        let form = form();
        let mut ui = FormUiState::default();
        select_path(&mut ui, &form, fields::TYPE);
        ui.on_key(&form, key(KeyCode::Enter));
        assert_eq!(ui.option_cursor, 0);
        ui.on_key(&form, key(KeyCode::Down));
        let msg = ui.on_key(&form, key(KeyCode::Enter));
        assert_eq!(
            msg,
            Some(FormMsg::SetValue {
                path: fields::TYPE.into(),
                value: FieldValue::text("uptime")
            })
        );
    }

    #[test]
    fn escape_cancels_without_message() {
        let form = form();
        let mut ui = FormUiState::default();
        ui.on_key(&form, key(KeyCode::Enter));
        ui.on_key(&form, key(KeyCode::Char('x')));
        assert_eq!(ui.on_key(&form, key(KeyCode::Esc)), None);
        assert!(!ui.editing);
    }

    #[test]
    fn enter_on_save_button_submits() {
        let form = form();
        let mut ui = FormUiState {
            selected: form.visible_fields().len(),
            ..Default::default()
        };
        assert_eq!(ui.on_key(&form, key(KeyCode::Enter)), Some(FormMsg::Submit));
        ui.on_key(&form, key(KeyCode::Down));
        assert_eq!(ui.selected, form.visible_fields().len());
    }

    #[test]
    fn space_toggles_alert_targets() {
        let ctx = FormContext {
            teams: vec![crate::model::Team {
                id: "5".into(),
                slug: "ops".into(),
            }],
            ..Default::default()
        };
        let mut form = MonitorForm::new(FormDefaults::default(), ctx, None);
        let mut ui = FormUiState::default();
        select_path(&mut ui, &form, fields::ALERT_TARGETS);
        ui.on_key(&form, key(KeyCode::Enter));
        let msg = ui.on_key(&form, key(KeyCode::Char(' '))).unwrap();
        assert_eq!(
            msg,
            FormMsg::SetValue {
                path: fields::ALERT_TARGETS.into(),
                value: FieldValue::List(vec!["team:5".into()])
            }
        );
        form.update(msg);
        let msg = ui.on_key(&form, key(KeyCode::Char(' '))).unwrap();
        assert_eq!(
            msg,
            FormMsg::SetValue {
                path: fields::ALERT_TARGETS.into(),
                value: FieldValue::List(vec![])
            }
        );
    }

    #[test]
    fn renders_fields_and_save_button() {
        use ratatui::backend::TestBackend;
        let form = form();
        let ui = FormUiState::default();
        let mut terminal = Terminal::new(TestBackend::new(70, 40)).unwrap();
        terminal
            .draw(|f| draw_form(f, f.area(), &form, &ui, &Theme::default(), false))
            .unwrap();
        let buf = terminal.backend().buffer().clone();
        let text: String = (0..40u16)
            .map(|y| {
                (0..70u16)
                    .map(|x| buf[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n");
        assert!(text.contains("Name *"));
        assert!(text.contains("At 00:00"));
        assert!(text.contains("[ Create Monitor ]"));
    }
}
