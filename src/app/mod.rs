use crate::checkins::Pagination;
use crate::form::{FormContext, FormMsg, SubmitFailure, SubmitRequest};
use crate::model::{CheckIn, Monitor};
use crate::ui::{AppState, ToastLevel, View};

#[derive(Debug)]
pub enum AppMsg {
    /// First tick: fetch organization data and the monitor being edited.
    Boot,
    ContextLoaded(Result<FormContext, String>),
    MonitorLoaded(Result<Monitor, String>),
    CheckinsLoaded(Result<(Vec<CheckIn>, Pagination), String>),
    Submitted(Result<Monitor, SubmitFailure>),
    Form(FormMsg),
    ToggleView,
    NextCheckins,
    PreviousCheckins,
    ReloadCheckins,
    DismissBanner,
}

#[derive(Debug, PartialEq)]
pub enum Effect {
    LoadContext,
    LoadMonitor {
        slug: String,
    },
    LoadCheckins {
        slug: String,
        cursor: Option<String>,
    },
    SaveMonitor(SubmitRequest),
    ShowToast {
        text: String,
        level: ToastLevel,
        seconds: u64,
    },
}

fn load_checkins(state: &mut AppState, cursor: Option<String>) -> Vec<Effect> {
    let Some(slug) = state.form.existing().map(|m| m.slug.clone()) else {
        return Vec::new();
    };
    state.checkins.start(cursor.clone());
    vec![Effect::LoadCheckins { slug, cursor }]
}

/// A monitor slug is configured but the form has not been seeded from it yet.
fn awaiting_monitor(state: &AppState) -> bool {
    state.monitor_slug.is_some() && !state.form.is_edit()
}

pub fn update(state: &mut AppState, msg: AppMsg) -> Vec<Effect> {
    use AppMsg::*;
    let mut effects: Vec<Effect> = Vec::new();
    match msg {
        Boot => {
            effects.push(Effect::LoadContext);
            if let Some(slug) = state.monitor_slug.clone() {
                state.status_text = Some(format!("Loading monitor {slug}…"));
                effects.push(Effect::LoadMonitor { slug });
            }
        }
        ContextLoaded(Ok(mut ctx)) => {
            ctx.selected_project = state.selected_project.clone();
            tracing::info!(
                "loaded {} projects, {} teams, {} members, {} environments",
                ctx.projects.len(),
                ctx.teams.len(),
                ctx.members.len(),
                ctx.environments.len()
            );
            state.form.set_context(ctx);
        }
        ContextLoaded(Err(e)) => {
            tracing::warn!("organization data failed to load: {e}");
            state.banner = Some(format!("Could not load organization data: {e}"));
        }
        MonitorLoaded(Ok(monitor)) => {
            state.status_text = None;
            state.monitor_error = None;
            tracing::info!("editing monitor {}", monitor.slug);
            state.form.update(FormMsg::Reseed(monitor));
            state.form_ui = Default::default();
        }
        MonitorLoaded(Err(e)) => {
            state.status_text = None;
            tracing::warn!("monitor failed to load: {e}");
            state.banner = Some(format!("Could not load monitor: {e}"));
            state.monitor_error = Some(e);
        }
        CheckinsLoaded(outcome) => {
            if let Err(e) = &outcome {
                tracing::warn!("check-ins failed to load: {e}");
            }
            state.checkins.finish(outcome);
        }
        // Saving now would POST a new monitor instead of updating the configured one
        Form(msg) if awaiting_monitor(state) => {
            tracing::debug!("ignoring {msg:?} until the monitor is loaded");
            if matches!(msg, FormMsg::Submit) {
                match &state.monitor_error {
                    Some(e) => state.banner = Some(format!("Could not load monitor: {e}")),
                    None => effects.push(Effect::ShowToast {
                        text: "Monitor is still loading".into(),
                        level: ToastLevel::Info,
                        seconds: 3,
                    }),
                }
            }
        }
        Form(msg) => {
            let is_submit = matches!(msg, FormMsg::Submit);
            if let Some(req) = state.form.update(msg) {
                state.banner = None;
                state.status_text = Some("Saving monitor…".into());
                effects.push(Effect::SaveMonitor(req));
            } else if is_submit && state.form.form_error().is_some() {
                state.banner = state.form.form_error().map(str::to_string);
            }
        }
        Submitted(outcome) => {
            state.status_text = None;
            let ok = outcome.is_ok();
            state.form.finish_submit(outcome);
            if ok {
                state.monitor_slug = state.form.existing().map(|m| m.slug.clone());
                state.banner = None;
                effects.push(Effect::ShowToast {
                    text: "Monitor saved".into(),
                    level: ToastLevel::Success,
                    seconds: 3,
                });
                if state.view == View::Checkins {
                    let cursor = state.checkins.current_cursor();
                    effects.extend(load_checkins(state, cursor));
                }
            } else {
                state.banner = state.form.form_error().map(str::to_string);
                effects.push(Effect::ShowToast {
                    text: "Monitor could not be saved".into(),
                    level: ToastLevel::Error,
                    seconds: 4,
                });
            }
        }
        ToggleView => match state.view {
            View::Configure if state.form.is_edit() => {
                state.view = View::Checkins;
                if matches!(state.checkins, crate::checkins::CheckinList::Idle) {
                    effects.extend(load_checkins(state, None));
                }
            }
            View::Configure => {
                effects.push(Effect::ShowToast {
                    text: "Check-ins are available once the monitor is created".into(),
                    level: ToastLevel::Info,
                    seconds: 3,
                });
            }
            View::Checkins => state.view = View::Configure,
        },
        NextCheckins => {
            if let Some(cursor) = state.checkins.next_cursor() {
                effects.extend(load_checkins(state, Some(cursor)));
            }
        }
        PreviousCheckins => {
            if let Some(cursor) = state.checkins.previous_cursor() {
                effects.extend(load_checkins(state, Some(cursor)));
            }
        }
        ReloadCheckins => {
            if !state.checkins.is_loading() {
                let cursor = state.checkins.current_cursor();
                effects.extend(load_checkins(state, cursor));
            }
        }
        DismissBanner => state.banner = None,
    }
    effects
}

#[cfg(test)]
mod tests;
