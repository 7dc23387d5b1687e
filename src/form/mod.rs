//! Monitor configuration form: owns the flat edit values, keeps the visible
//! field groups in sync with the discriminator fields, and turns submit /
//! error responses into codec calls.

pub mod codec;
pub mod fields;
pub mod visibility;

use crate::config::FormDefaults;
use crate::model::{Member, Monitor, Project, Team};
use codec::{initial_values, map_form_errors, Encoder, FieldValue, FlatEditMapping};
use fields::FieldSpec;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use visibility::{compute_visible_sections, SectionSet};

/// Organization data the selectors draw their options from.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FormContext {
    pub selected_project: Option<String>,
    pub projects: Vec<Project>,
    pub environments: Vec<String>,
    pub teams: Vec<Team>,
    pub members: Vec<Member>,
    pub is_superuser: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum FormMsg {
    SetValue { path: String, value: FieldValue },
    Submit,
    Reseed(Monitor),
}

#[derive(Clone, Debug, PartialEq)]
pub struct SubmitRequest {
    /// Slug of the monitor being updated; `None` creates a new one.
    pub existing_slug: Option<String>,
    pub body: JsonValue,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SubmitFailure {
    /// Structured per-field errors from the API.
    Validation(JsonValue),
    Other(String),
}

#[derive(Clone, Debug)]
pub struct MonitorForm {
    defaults: FormDefaults,
    context: FormContext,
    existing: Option<Monitor>,
    values: FlatEditMapping,
    // Values of fields whose group is hidden, restored when it shows again
    stash: BTreeMap<String, FieldValue>,
    sections: SectionSet,
    errors: BTreeMap<String, String>,
    form_error: Option<String>,
    submitting: bool,
    pub message: Option<String>,
}

impl Default for MonitorForm {
    fn default() -> Self {
        Self::new(FormDefaults::default(), FormContext::default(), None)
    }
}

impl MonitorForm {
    pub fn new(defaults: FormDefaults, context: FormContext, existing: Option<Monitor>) -> Self {
        let values = initial_values(existing.as_ref(), &defaults, selectable_context(&context));
        let mut form = Self {
            defaults,
            context,
            existing,
            values,
            stash: BTreeMap::new(),
            sections: SectionSet::default(),
            errors: BTreeMap::new(),
            form_error: None,
            submitting: false,
            message: None,
        };
        form.recompute_visibility();
        form
    }

    pub fn values(&self) -> &FlatEditMapping {
        &self.values
    }

    pub fn sections(&self) -> SectionSet {
        self.sections
    }

    pub fn context(&self) -> &FormContext {
        &self.context
    }

    pub fn existing(&self) -> Option<&Monitor> {
        self.existing.as_ref()
    }

    pub fn is_edit(&self) -> bool {
        self.existing.is_some()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn error_for(&self, path: &str) -> Option<&str> {
        self.errors.get(path).map(String::as_str)
    }

    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    pub fn form_error(&self) -> Option<&str> {
        self.form_error.as_deref()
    }

    pub fn visible_fields(&self) -> Vec<FieldSpec> {
        visibility::visible_fields(&self.values, &self.context, &self.defaults, self.is_edit())
    }

    /// Swap in freshly loaded organization data, keeping the edit session.
    pub fn set_context(&mut self, context: FormContext) {
        if !self.is_edit() && self.values.text(fields::PROJECT).is_none() {
            if let Some(p) = selectable_context(&context) {
                self.values.set(fields::PROJECT, FieldValue::text(p));
            }
        }
        self.context = context;
    }

    pub fn update(&mut self, msg: FormMsg) -> Option<SubmitRequest> {
        match msg {
            FormMsg::SetValue { path, value } => {
                self.set_value(&path, value);
                None
            }
            FormMsg::Submit => self.submit(),
            FormMsg::Reseed(monitor) => {
                self.reseed(monitor);
                None
            }
        }
    }

    /// Returns `true` when the edit changed which field groups are shown.
    pub fn set_value(&mut self, path: &str, value: FieldValue) -> bool {
        if path == fields::PROJECT && self.is_edit() {
            tracing::debug!("project is fixed for existing monitors; ignoring edit");
            return false;
        }
        self.values.set(path, value);
        self.errors.remove(path);
        self.recompute_visibility()
    }

    fn default_for(&self, path: &str) -> FieldValue {
        let d = &self.defaults;
        match path {
            fields::SCHEDULE => FieldValue::text(d.crontab.as_str()),
            fields::TIMEZONE => FieldValue::text(d.timezone.as_str()),
            fields::FREQUENCY => FieldValue::Number(d.interval_frequency),
            fields::INTERVAL => FieldValue::text(d.interval_unit.as_str()),
            fields::MAX_RUNTIME => FieldValue::Number(d.max_runtime),
            fields::METHOD => FieldValue::text(fields::HTTP_METHODS[0]),
            _ => FieldValue::Unset,
        }
    }

    fn recompute_visibility(&mut self) -> bool {
        let next = compute_visible_sections(&self.values);
        for path in next.hidden_paths() {
            if let Some(v) = self.values.remove(path) {
                self.stash.insert(path.to_string(), v);
            }
            self.errors.remove(path);
        }
        for path in next.visible_paths() {
            if !self.values.contains(path) {
                let v = self
                    .stash
                    .remove(path)
                    .unwrap_or_else(|| self.default_for(path));
                self.values.set(path, v);
            }
        }
        let changed = next != self.sections;
        if changed {
            tracing::debug!("visible sections {:?} -> {:?}", self.sections, next);
        }
        self.sections = next;
        changed
    }

    pub fn encoder(&self) -> Encoder {
        Encoder {
            interval_seed: (self.defaults.interval_frequency, self.defaults.interval_unit),
        }
    }

    /// Encode the current values. A second submit while one is in flight is ignored.
    pub fn submit(&mut self) -> Option<SubmitRequest> {
        if self.submitting {
            tracing::debug!("submit ignored; previous submission still in flight");
            return None;
        }
        self.errors.clear();
        self.form_error = None;
        self.message = None;
        let body = match self.encoder().encode(&self.values).to_json() {
            Ok(b) => b,
            Err(e) => {
                self.form_error = Some(format!("Could not encode monitor: {e}"));
                return None;
            }
        };
        self.submitting = true;
        tracing::info!(
            "submitting monitor ({})",
            if self.is_edit() { "update" } else { "create" }
        );
        Some(SubmitRequest {
            existing_slug: self.existing.as_ref().map(|m| m.slug.clone()),
            body,
        })
    }

    pub fn finish_submit(&mut self, outcome: Result<Monitor, SubmitFailure>) {
        self.submitting = false;
        match outcome {
            Ok(monitor) => {
                tracing::info!("monitor {} saved", monitor.slug);
                self.reseed(monitor);
                self.message = Some("Monitor saved".into());
            }
            Err(SubmitFailure::Validation(body)) => self.apply_errors(body),
            Err(SubmitFailure::Other(msg)) => {
                tracing::warn!("submit failed: {msg}");
                self.form_error = Some(msg);
            }
        }
    }

    /// Start a new edit session from `monitor`.
    pub fn reseed(&mut self, monitor: Monitor) {
        self.values = initial_values(
            Some(&monitor),
            &self.defaults,
            self.context.selected_project.as_deref(),
        );
        self.existing = Some(monitor);
        self.stash.clear();
        self.errors.clear();
        self.form_error = None;
        self.recompute_visibility();
    }

    /// Attach an API error body to the fields it names. Keys with no visible
    /// field end up in the form-level error.
    pub fn apply_errors(&mut self, body: JsonValue) {
        self.errors.clear();
        let mapped = map_form_errors(body);
        let JsonValue::Object(obj) = mapped else {
            self.form_error = Some(error_text(&mapped));
            return;
        };
        let visible: Vec<&'static str> = self.visible_fields().iter().map(|f| f.path).collect();
        let mut general: Vec<String> = Vec::new();
        for (key, value) in obj {
            let text = error_text(&value);
            if visible.contains(&key.as_str()) {
                self.errors.insert(key, text);
            } else if key == "detail" || key == "non_field_errors" {
                general.push(text);
            } else {
                general.push(format!("{key}: {text}"));
            }
        }
        self.form_error = if !general.is_empty() {
            Some(general.join("\n"))
        } else if !self.errors.is_empty() {
            Some("Please fix the highlighted errors".into())
        } else {
            None
        };
    }
}

/// The project context, if the user may actually pick it. Before the project
/// list has loaded the context is taken as-is.
fn selectable_context(ctx: &FormContext) -> Option<&str> {
    let slug = ctx.selected_project.as_deref()?;
    let allowed = ctx.projects.is_empty()
        || fields::selectable_projects(&ctx.projects, ctx.is_superuser)
            .iter()
            .any(|p| p.slug == slug);
    allowed.then_some(slug)
}

fn error_text(v: &JsonValue) -> String {
    match v {
        JsonValue::String(s) => s.clone(),
        JsonValue::Array(items) => items
            .iter()
            .map(error_text)
            .collect::<Vec<_>>()
            .join(" "),
        other => other.to_string(),
    }
}
