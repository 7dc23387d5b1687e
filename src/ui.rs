use crate::app::{update, AppMsg, Effect};
use crate::checkins::CheckinList;
use crate::config::AppConfig;
use crate::form::{FormContext, FormMsg, MonitorForm};
use crate::services::api::{MonitorApi, ReqwestHttpClient};
use crate::services::loader;
use crate::widgets::banner::{banner_height, draw_alert_banner};
use crate::widgets::checkin_list::draw_checkins;
use crate::widgets::chrome::draw_header;
use crate::widgets::form::{draw_form, FormUiState};
use crate::widgets::status_bar::draw_footer;
use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::prelude::*;
use ratatui::widgets::*;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

const TICK_RATE: Duration = Duration::from_millis(200);

#[derive(Default)]
pub struct AppState {
    pub(crate) monitor_slug: Option<String>,
    // Why the configured monitor could not be loaded; blocks saving
    pub(crate) monitor_error: Option<String>,
    pub(crate) selected_project: Option<String>,
    pub(crate) form: MonitorForm,
    pub(crate) form_ui: FormUiState,
    pub(crate) checkins: CheckinList,
    pub(crate) view: View,
    // Form-level and network errors shown above the form
    pub(crate) banner: Option<String>,
    pub(crate) status_text: Option<String>,
    pub(crate) toast: Option<Toast>,
    pub(crate) tick: u64,
    pub(crate) theme: crate::theme::Theme,
    pub(crate) quit: bool,
    pub(crate) api: Option<MonitorApi>,
    pub(crate) tx: Option<Sender<AppMsg>>,
    pub(crate) rx: Option<Receiver<AppMsg>>,
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    #[default]
    Configure,
    Checkins,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

pub struct Toast {
    pub text: String,
    pub level: ToastLevel,
    pub expires_at_tick: u64,
}

fn run_effects(state: &mut AppState, effects: Vec<Effect>) {
    for eff in effects {
        match eff {
            Effect::ShowToast {
                text,
                level,
                seconds,
            } => {
                let ticks = seconds.saturating_mul(5); // ~200ms tick
                state.toast = Some(Toast {
                    text,
                    level,
                    expires_at_tick: state.tick.saturating_add(ticks),
                });
            }
            other => {
                let (Some(api), Some(tx)) = (state.api.clone(), state.tx.clone()) else {
                    tracing::debug!("no API client; dropping {other:?}");
                    continue;
                };
                match other {
                    Effect::LoadContext => loader::spawn_load_context(api, tx),
                    Effect::LoadMonitor { slug } => loader::spawn_load_monitor(api, slug, tx),
                    Effect::LoadCheckins { slug, cursor } => {
                        loader::spawn_load_checkins(api, slug, cursor, tx)
                    }
                    Effect::SaveMonitor(req) => loader::spawn_save_monitor(api, req, tx),
                    Effect::ShowToast { .. } => {}
                }
            }
        }
    }
}

fn dispatch(state: &mut AppState, msg: AppMsg) {
    let effects = update(state, msg);
    run_effects(state, effects);
}

fn pump_messages(state: &mut AppState) {
    let mut drained: Vec<AppMsg> = Vec::new();
    if let Some(rx) = &state.rx {
        while let Ok(msg) = rx.try_recv() {
            drained.push(msg);
        }
    }
    for msg in drained {
        dispatch(state, msg);
    }
}

pub(crate) fn handle_key(state: &mut AppState, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') if ctrl => {
            state.quit = true;
            return;
        }
        KeyCode::Char('s') if ctrl => {
            state.form_ui.editing = false;
            dispatch(state, AppMsg::Form(FormMsg::Submit));
            return;
        }
        _ => {}
    }
    match state.view {
        View::Configure if state.form_ui.editing => {
            if let Some(msg) = state.form_ui.on_key(&state.form, key) {
                dispatch(state, AppMsg::Form(msg));
            }
        }
        View::Configure => match key.code {
            KeyCode::Esc if state.banner.is_some() => dispatch(state, AppMsg::DismissBanner),
            KeyCode::Esc | KeyCode::Char('q') => state.quit = true,
            KeyCode::Tab => dispatch(state, AppMsg::ToggleView),
            _ => {
                if let Some(msg) = state.form_ui.on_key(&state.form, key) {
                    dispatch(state, AppMsg::Form(msg));
                }
            }
        },
        View::Checkins => match key.code {
            KeyCode::Esc | KeyCode::Char('q') => state.quit = true,
            KeyCode::Tab => dispatch(state, AppMsg::ToggleView),
            KeyCode::Left => dispatch(state, AppMsg::PreviousCheckins),
            KeyCode::Right => dispatch(state, AppMsg::NextCheckins),
            KeyCode::Char('r') => dispatch(state, AppMsg::ReloadCheckins),
            _ => {}
        },
    }
}

fn help_text(state: &AppState) -> &'static str {
    match state.view {
        View::Configure if state.form_ui.editing => "Enter: confirm  Esc: cancel  Space: toggle",
        View::Configure => "↑/↓: move  Enter: edit  Ctrl+S: save  Tab: check-ins  Esc: quit",
        View::Checkins => "←/→: page  r: reload  Tab: configure  Esc: quit",
    }
}

fn ui(f: &mut Frame, state: &mut AppState) {
    if let Some(t) = &state.toast {
        if state.tick >= t.expires_at_tick {
            state.toast = None;
        }
    }
    state.form_ui.clamp(state.form.visible_fields().len());

    let screen = f.area();
    f.render_widget(
        Block::default().style(Style::default().bg(state.theme.bg).fg(state.theme.fg)),
        screen,
    );
    let banner_h = state
        .banner
        .as_deref()
        .map(|b| banner_height(b, screen.width))
        .unwrap_or(0);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(banner_h),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(screen);

    let title = state
        .form
        .existing()
        .map(|m| m.name.clone())
        .unwrap_or_else(|| "New Monitor".to_string());
    draw_header(
        f,
        chunks[0],
        &title,
        state.view,
        state.form.is_edit(),
        &state.theme,
    );
    if let Some(text) = &state.banner {
        draw_alert_banner(f, chunks[1], text, &state.theme);
    }
    match state.view {
        View::Configure => {
            let cursor_on = state.tick % 4 < 2;
            draw_form(
                f,
                chunks[2],
                &state.form,
                &state.form_ui,
                &state.theme,
                cursor_on,
            );
        }
        View::Checkins => draw_checkins(f, chunks[2], &state.checkins, &state.theme, state.tick),
    }
    draw_footer(f, chunks[3], state, help_text(state));
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes"))
        .unwrap_or(false)
}

fn initial_state(cfg: &AppConfig) -> Result<AppState> {
    let http = ReqwestHttpClient::new(cfg.auth_token()).context("building HTTP client")?;
    let api = MonitorApi::new(
        &cfg.api.base_url,
        &cfg.organization,
        cfg.checkins_per_page,
        Arc::new(http),
    );
    let context = FormContext {
        selected_project: cfg.project.clone(),
        ..Default::default()
    };
    let (tx, rx) = mpsc::channel::<AppMsg>();
    Ok(AppState {
        monitor_slug: cfg.monitor.clone(),
        selected_project: cfg.project.clone(),
        form: MonitorForm::new(cfg.defaults.clone(), context, None),
        api: Some(api),
        tx: Some(tx),
        rx: Some(rx),
        ..Default::default()
    })
}

fn smoke_summary(state: &AppState) -> serde_json::Value {
    let checkins = match &state.checkins {
        CheckinList::Idle => "idle",
        CheckinList::Loading { .. } => "loading",
        CheckinList::Loaded { .. } => "loaded",
        CheckinList::Failed(_) => "failed",
    };
    let sections = state.form.sections();
    let shown: Vec<&str> = [
        ("crontab", sections.crontab),
        ("interval", sections.interval),
        ("cron_job", sections.cron_job),
        ("uptime", sections.uptime),
    ]
    .into_iter()
    .filter_map(|(name, on)| on.then_some(name))
    .collect();
    serde_json::json!({
        "ok": state.banner.is_none(),
        "view": format!("{:?}", state.view),
        "edit": state.form.is_edit(),
        "fields": state.form.visible_fields().len(),
        "sections": shown,
        "projects": state.form.context().projects.len(),
        "field_errors": state.form.errors().len(),
        "checkins": checkins,
    })
}

pub fn run(cfg: AppConfig) -> Result<()> {
    let mut state = initial_state(&cfg)?;
    tracing::info!(
        "starting for organization {} ({})",
        cfg.organization,
        cfg.monitor.as_deref().unwrap_or("new monitor")
    );
    dispatch(&mut state, AppMsg::Boot);

    // Headless smoke mode
    if env_flag("MONITOR_TUI_HEADLESS") {
        let ticks: u64 = std::env::var("MONITOR_TUI_TICKS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(10);
        let mut terminal = Terminal::new(ratatui::backend::TestBackend::new(100, 40))?;
        for _ in 0..ticks {
            terminal.draw(|f| ui(f, &mut state))?;
            pump_messages(&mut state);
            state.tick = state.tick.wrapping_add(1);
            std::thread::sleep(TICK_RATE);
        }
        if env_flag("MONITOR_TUI_SMOKE_SUMMARY") {
            println!("{}", smoke_summary(&state));
        }
        return Ok(());
    }

    enable_raw_mode().context("enabling raw mode")?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let mut last_tick = Instant::now();
    let res = loop {
        if let Err(e) = terminal.draw(|f| ui(f, &mut state)) {
            break Err(e.into());
        }
        let timeout = TICK_RATE
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_millis(0));
        match event::poll(timeout) {
            Ok(true) => match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    handle_key(&mut state, key)
                }
                Ok(_) => {}
                Err(e) => break Err(e.into()),
            },
            Ok(false) => {}
            Err(e) => break Err(e.into()),
        }
        if state.quit {
            break Ok(());
        }
        pump_messages(&mut state);
        if last_tick.elapsed() >= TICK_RATE {
            state.tick = state.tick.wrapping_add(1);
            last_tick = Instant::now();
        }
    };
    // Restore
    disable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    res
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::fields;
    use crossterm::event::KeyModifiers;

    fn press(state: &mut AppState, code: KeyCode) {
        handle_key(state, KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[test]
    fn ctrl_s_submits_and_toggles_submitting() {
        let mut st = AppState::default();
        handle_key(
            &mut st,
            KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL),
        );
        assert!(st.form.is_submitting());
        assert_eq!(st.status_text.as_deref(), Some("Saving monitor…"));
    }

    #[test]
    fn typing_a_name_updates_form_values() {
        let mut st = AppState::default();
        press(&mut st, KeyCode::Enter);
        for c in "Backup".chars() {
            press(&mut st, KeyCode::Char(c));
        }
        // 'q' while editing is text, not quit
        press(&mut st, KeyCode::Char('q'));
        press(&mut st, KeyCode::Enter);
        assert!(!st.quit);
        assert_eq!(st.form.values().text(fields::NAME).as_deref(), Some("Backupq"));
    }

    #[test]
    fn escape_dismisses_banner_before_quitting() {
        let mut st = AppState {
            banner: Some("boom".into()),
            ..Default::default()
        };
        press(&mut st, KeyCode::Esc);
        assert!(st.banner.is_none());
        assert!(!st.quit);
        press(&mut st, KeyCode::Esc);
        assert!(st.quit);
    }

    #[test]
    fn full_screen_renders_banner_and_footer() {
        let mut st = AppState {
            banner: Some("Could not load organization data".into()),
            ..Default::default()
        };
        let mut terminal = Terminal::new(ratatui::backend::TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| ui(f, &mut st)).unwrap();
        let buf = terminal.backend().buffer().clone();
        let text: String = (0..30u16)
            .map(|y| {
                (0..100u16)
                    .map(|x| buf[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n");
        assert!(text.contains("New Monitor"));
        assert!(text.contains("Could not load organization data"));
        assert!(text.contains("Ctrl+S: save"));
    }

    #[test]
    fn smoke_summary_reports_form_shape() {
        let st = AppState::default();
        let v = smoke_summary(&st);
        assert_eq!(v["edit"], false);
        assert_eq!(v["sections"], serde_json::json!(["crontab", "cron_job"]));
        assert_eq!(v["projects"], 0);
        assert_eq!(v["field_errors"], 0);
        assert_eq!(v["checkins"], "idle");
    }

    #[test]
    fn expired_toast_is_cleared_on_draw() {
        let mut st = AppState::default();
        run_effects(
            &mut st,
            vec![Effect::ShowToast {
                text: "Monitor saved".into(),
                level: ToastLevel::Success,
                seconds: 1,
            }],
        );
        assert!(st.toast.is_some());
        st.tick = 10;
        let mut terminal = Terminal::new(ratatui::backend::TestBackend::new(80, 20)).unwrap();
        terminal.draw(|f| ui(f, &mut st)).unwrap();
        assert!(st.toast.is_none());
    }
}
