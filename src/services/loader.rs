//! Background API calls. Each spawns a thread and posts the outcome back to the
//! UI loop as an [`AppMsg`].

use crate::app::AppMsg;
use crate::form::{FormContext, SubmitRequest};
use crate::services::api::MonitorApi;
use std::sync::mpsc::Sender;
use std::thread;

/// Everything the selectors need. A failing current-user lookup only costs the
/// superuser view of projects; the other lists are required.
pub fn load_context(api: &MonitorApi) -> Result<FormContext, String> {
    let is_superuser = match api.current_user() {
        Ok(u) => u.is_superuser,
        Err(e) => {
            tracing::warn!("current user lookup failed, assuming member access: {e}");
            false
        }
    };
    let projects = api.projects().map_err(|e| format!("projects: {e}"))?;
    let environments = api
        .environments()
        .map_err(|e| format!("environments: {e}"))?;
    let teams = api.teams().map_err(|e| format!("teams: {e}"))?;
    let members = api.members().map_err(|e| format!("members: {e}"))?;
    Ok(FormContext {
        selected_project: None,
        projects,
        environments,
        teams,
        members,
        is_superuser,
    })
}

pub fn spawn_load_context(api: MonitorApi, tx: Sender<AppMsg>) {
    thread::spawn(move || {
        let outcome = load_context(&api);
        let _ = tx.send(AppMsg::ContextLoaded(outcome));
    });
}

pub fn spawn_load_monitor(api: MonitorApi, slug: String, tx: Sender<AppMsg>) {
    thread::spawn(move || {
        let outcome = api.monitor(&slug).map_err(|e| format!("{e}"));
        let _ = tx.send(AppMsg::MonitorLoaded(outcome));
    });
}

pub fn spawn_load_checkins(
    api: MonitorApi,
    slug: String,
    cursor: Option<String>,
    tx: Sender<AppMsg>,
) {
    thread::spawn(move || {
        let outcome = api
            .checkins(&slug, cursor.as_deref())
            .map_err(|e| format!("{e}"));
        let _ = tx.send(AppMsg::CheckinsLoaded(outcome));
    });
}

pub fn spawn_save_monitor(api: MonitorApi, req: SubmitRequest, tx: Sender<AppMsg>) {
    thread::spawn(move || {
        let outcome = api.save_monitor(req.existing_slug.as_deref(), &req.body);
        if let Err(e) = &outcome {
            tracing::info!("save rejected: {e:?}");
        }
        let _ = tx.send(AppMsg::Submitted(outcome));
    });
}
