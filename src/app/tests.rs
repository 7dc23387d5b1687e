use super::*;
use crate::checkins::CheckinList;
use crate::form::codec::FieldValue;
use crate::form::fields;
use crate::model::{MonitorConfig, MonitorType, Project, ProjectRef};
use serde_json::json;

fn monitor(slug: &str) -> Monitor {
    Monitor {
        id: "1".into(),
        slug: slug.into(),
        name: "Nightly".into(),
        status: None,
        monitor_type: MonitorType::CronJob,
        project: ProjectRef {
            slug: "backend".into(),
        },
        config: MonitorConfig::default(),
        alert_rule: None,
    }
}

fn edit_state() -> AppState {
    let mut st = AppState::default();
    let _ = update(&mut st, AppMsg::MonitorLoaded(Ok(monitor("nightly"))));
    st
}

#[test]
fn boot_loads_context_and_configured_monitor() {
    let mut st = AppState {
        monitor_slug: Some("nightly".into()),
        ..Default::default()
    };
    let effects = update(&mut st, AppMsg::Boot);
    assert_eq!(
        effects,
        vec![
            Effect::LoadContext,
            Effect::LoadMonitor {
                slug: "nightly".into()
            }
        ]
    );
    assert!(st.status_text.is_some());

    let mut st = AppState::default();
    assert_eq!(update(&mut st, AppMsg::Boot), vec![Effect::LoadContext]);
}

#[test]
fn context_keeps_selected_project() {
    let mut st = AppState {
        selected_project: Some("backend".into()),
        ..Default::default()
    };
    let ctx = FormContext {
        projects: vec![Project {
            id: "1".into(),
            slug: "backend".into(),
            name: None,
            is_member: true,
        }],
        ..Default::default()
    };
    let _ = update(&mut st, AppMsg::ContextLoaded(Ok(ctx)));
    assert_eq!(
        st.form.context().selected_project.as_deref(),
        Some("backend")
    );
    assert_eq!(st.form.context().projects.len(), 1);
}

#[test]
fn load_failure_raises_banner() {
    let mut st = AppState::default();
    let _ = update(&mut st, AppMsg::ContextLoaded(Err("teams: 403".into())));
    assert!(st.banner.as_deref().unwrap().contains("teams: 403"));
    let _ = update(&mut st, AppMsg::DismissBanner);
    assert!(st.banner.is_none());
}

#[test]
fn submit_emits_save_once_until_answered() {
    let mut st = AppState::default();
    let effects = update(&mut st, AppMsg::Form(FormMsg::Submit));
    assert!(matches!(
        effects.as_slice(),
        [Effect::SaveMonitor(SubmitRequest {
            existing_slug: None,
            ..
        })]
    ));
    assert!(update(&mut st, AppMsg::Form(FormMsg::Submit)).is_empty());

    let effects = update(&mut st, AppMsg::Submitted(Ok(monitor("nightly"))));
    assert!(matches!(
        effects.as_slice(),
        [Effect::ShowToast {
            level: ToastLevel::Success,
            ..
        }]
    ));
    assert_eq!(st.monitor_slug.as_deref(), Some("nightly"));
    assert!(st.form.is_edit());
    assert!(st.status_text.is_none());
}

#[test]
fn validation_failure_shows_inline_errors_and_banner() {
    let mut st = AppState::default();
    let _ = update(&mut st, AppMsg::Form(FormMsg::Submit));
    let _ = update(
        &mut st,
        AppMsg::Submitted(Err(SubmitFailure::Validation(json!({
            "config": {"schedule": ["Invalid cron"]},
            "detail": "Monitor limit reached"
        })))),
    );
    assert_eq!(st.form.error_for(fields::SCHEDULE), Some("Invalid cron"));
    assert_eq!(st.banner.as_deref(), Some("Monitor limit reached"));
    assert!(!st.form.is_submitting());
}

#[test]
fn set_value_flows_into_form() {
    let mut st = AppState::default();
    let effects = update(
        &mut st,
        AppMsg::Form(FormMsg::SetValue {
            path: fields::TYPE.into(),
            value: FieldValue::text("uptime"),
        }),
    );
    assert!(effects.is_empty());
    assert!(st.form.sections().uptime);
}

#[test]
fn checkins_view_needs_existing_monitor() {
    let mut st = AppState::default();
    let effects = update(&mut st, AppMsg::ToggleView);
    assert_eq!(st.view, View::Configure);
    assert!(matches!(
        effects.as_slice(),
        [Effect::ShowToast {
            level: ToastLevel::Info,
            ..
        }]
    ));

    let mut st = edit_state();
    let effects = update(&mut st, AppMsg::ToggleView);
    assert_eq!(st.view, View::Checkins);
    assert_eq!(
        effects,
        vec![Effect::LoadCheckins {
            slug: "nightly".into(),
            cursor: None
        }]
    );
    assert!(st.checkins.is_loading());

    let _ = update(&mut st, AppMsg::ToggleView);
    assert_eq!(st.view, View::Configure);
}

#[test]
fn paging_follows_link_cursors() {
    let mut st = edit_state();
    let _ = update(&mut st, AppMsg::ToggleView);
    let pagination = crate::checkins::parse_link_header(
        r#"<u>; rel="previous"; results="false"; cursor="0:0:1", <u>; rel="next"; results="true"; cursor="0:25:0""#,
    );
    let _ = update(&mut st, AppMsg::CheckinsLoaded(Ok((vec![], pagination))));

    assert!(update(&mut st, AppMsg::PreviousCheckins).is_empty());
    let effects = update(&mut st, AppMsg::NextCheckins);
    assert_eq!(
        effects,
        vec![Effect::LoadCheckins {
            slug: "nightly".into(),
            cursor: Some("0:25:0".into())
        }]
    );

    // reload while loading is a no-op
    assert!(update(&mut st, AppMsg::ReloadCheckins).is_empty());
    let _ = update(&mut st, AppMsg::CheckinsLoaded(Err("boom".into())));
    assert_eq!(st.checkins, CheckinList::Failed("boom".into()));
    assert_eq!(update(&mut st, AppMsg::ReloadCheckins).len(), 1);
}

#[test]
fn form_input_waits_for_configured_monitor() {
    let mut st = AppState {
        monitor_slug: Some("nightly".into()),
        ..Default::default()
    };
    let _ = update(&mut st, AppMsg::Boot);

    let effects = update(&mut st, AppMsg::Form(FormMsg::Submit));
    assert!(matches!(
        effects.as_slice(),
        [Effect::ShowToast {
            level: ToastLevel::Info,
            ..
        }]
    ));
    assert!(!st.form.is_submitting());
    let effects = update(
        &mut st,
        AppMsg::Form(FormMsg::SetValue {
            path: fields::NAME.into(),
            value: FieldValue::text("Typed early"),
        }),
    );
    assert!(effects.is_empty());
    assert_ne!(
        st.form.values().text(fields::NAME).as_deref(),
        Some("Typed early")
    );

    let _ = update(&mut st, AppMsg::MonitorLoaded(Ok(monitor("nightly"))));
    let effects = update(&mut st, AppMsg::Form(FormMsg::Submit));
    match effects.as_slice() {
        [Effect::SaveMonitor(req)] => {
            assert_eq!(req.existing_slug.as_deref(), Some("nightly"))
        }
        other => panic!("unexpected effects {other:?}"),
    }
}

#[test]
fn failed_monitor_load_keeps_saving_blocked() {
    let mut st = AppState {
        monitor_slug: Some("nightly".into()),
        ..Default::default()
    };
    let _ = update(&mut st, AppMsg::Boot);
    let _ = update(&mut st, AppMsg::MonitorLoaded(Err("500".into())));
    let _ = update(&mut st, AppMsg::DismissBanner);

    let effects = update(&mut st, AppMsg::Form(FormMsg::Submit));
    assert!(effects.is_empty());
    assert!(!st.form.is_submitting());
    assert_eq!(st.banner.as_deref(), Some("Could not load monitor: 500"));
}
