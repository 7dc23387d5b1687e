//! Mapping between the form's flat `dot.path -> value` edit model and the nested
//! monitor payload the API accepts.
//!
//! `encode` folds the flat pairs into an [`EncodedMonitor`], `map_form_errors`
//! flattens a nested error body back onto field paths, and `flatten_config` /
//! `initial_values` seed the edit model from an existing monitor.

use crate::config::FormDefaults;
use crate::form::fields;
use crate::model::{IntervalUnit, Monitor, MonitorConfig, Schedule, ScheduleType, TargetType};
use serde::{Serialize, Serializer};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(i64),
    List(Vec<String>),
    Unset,
}

impl FieldValue {
    pub fn text(s: impl Into<String>) -> Self {
        FieldValue::Text(s.into())
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, FieldValue::Unset)
    }

    /// String view used by text inputs and selectors.
    pub fn as_display(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Number(n) => n.to_string(),
            FieldValue::List(items) => items.join(", "),
            FieldValue::Unset => String::new(),
        }
    }

    pub fn as_list(&self) -> Vec<String> {
        match self {
            FieldValue::List(items) => items.clone(),
            FieldValue::Text(s) if !s.is_empty() => vec![s.clone()],
            FieldValue::Number(n) => vec![n.to_string()],
            _ => Vec::new(),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Text(s) => serializer.serialize_str(s),
            FieldValue::Number(n) => serializer.serialize_i64(*n),
            FieldValue::List(items) => items.serialize(serializer),
            FieldValue::Unset => serializer.serialize_none(),
        }
    }
}

/// Field values keyed by dot path, kept in registration order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlatEditMapping {
    entries: Vec<(String, FieldValue)>,
}

impl FlatEditMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<&FieldValue> {
        self.entries.iter().find(|(k, _)| k == path).map(|(_, v)| v)
    }

    /// Text view of a field; `None` when absent or unset.
    pub fn text(&self, path: &str) -> Option<String> {
        match self.get(path)? {
            FieldValue::Unset => None,
            v => Some(v.as_display()),
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == path)
    }

    pub fn set(&mut self, path: impl Into<String>, value: FieldValue) {
        let path = path.into();
        match self.entries.iter_mut().find(|(k, _)| *k == path) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((path, value)),
        }
    }

    pub fn remove(&mut self, path: &str) -> Option<FieldValue> {
        let idx = self.entries.iter().position(|(k, _)| k == path)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>> FromIterator<(K, FieldValue)> for FlatEditMapping {
    fn from_iter<I: IntoIterator<Item = (K, FieldValue)>>(iter: I) -> Self {
        let mut m = FlatEditMapping::new();
        for (k, v) in iter {
            m.set(k, v);
        }
        m
    }
}

/// Integer parsed from form input. Garbage input is kept as `NotANumber`
/// and goes over the wire as `null` for the server to reject.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParsedInt {
    Value(i64),
    NotANumber,
}

impl Serialize for ParsedInt {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ParsedInt::Value(n) => serializer.serialize_i64(*n),
            ParsedInt::NotANumber => serializer.serialize_none(),
        }
    }
}

/// Leading-integer parse: optional sign then digits, trailing junk ignored ("3x" -> 3).
pub fn parse_leading_int(value: &FieldValue) -> ParsedInt {
    let raw = match value {
        FieldValue::Number(n) => return ParsedInt::Value(*n),
        FieldValue::Text(s) => s.trim_start(),
        FieldValue::List(items) => match items.first() {
            Some(s) => s.trim_start(),
            None => return ParsedInt::NotANumber,
        },
        FieldValue::Unset => return ParsedInt::NotANumber,
    };
    let sign_len = usize::from(raw.starts_with('-') || raw.starts_with('+'));
    let digits = raw[sign_len..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .count();
    if digits == 0 {
        return ParsedInt::NotANumber;
    }
    raw[..sign_len + digits]
        .parse::<i64>()
        .map(ParsedInt::Value)
        .unwrap_or(ParsedInt::NotANumber)
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EncodedSchedule {
    Value(FieldValue),
    Pair(ParsedInt, FieldValue),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedTarget {
    // Omitted when the selector handed us an unknown prefix
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_type: Option<TargetType>,
    pub target_identifier: ParsedInt,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct EncodedAlertRule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub targets: Option<Vec<EncodedTarget>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct EncodedConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule_type: Option<FieldValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<EncodedSchedule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<FieldValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkin_margin: Option<FieldValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_runtime: Option<FieldValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime_type: Option<FieldValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<FieldValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<FieldValue>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, FieldValue>,
}

impl EncodedConfig {
    fn assign(&mut self, key: &str, value: &FieldValue) {
        let v = if value.is_unset() {
            None
        } else {
            Some(value.clone())
        };
        match key {
            "schedule_type" => self.schedule_type = v,
            "schedule" => self.schedule = v.map(EncodedSchedule::Value),
            "timezone" => self.timezone = v,
            "checkin_margin" => self.checkin_margin = v,
            "max_runtime" => self.max_runtime = v,
            "uptime_type" => self.uptime_type = v,
            "url" => self.url = v,
            "method" => self.method = v,
            other => match v {
                Some(v) => {
                    self.extra.insert(other.to_string(), v);
                }
                None => {
                    self.extra.remove(other);
                }
            },
        }
    }

    /// Edit one half of the `[frequency, unit]` pair, starting from `seed` when the
    /// schedule is not a pair yet.
    fn edit_schedule_pair(
        &mut self,
        seed: (i64, IntervalUnit),
        edit: impl FnOnce(&mut ParsedInt, &mut FieldValue),
    ) {
        if let Some(EncodedSchedule::Pair(freq, unit)) = &mut self.schedule {
            edit(freq, unit);
            return;
        }
        let mut freq = ParsedInt::Value(seed.0);
        let mut unit = FieldValue::text(seed.1.as_str());
        edit(&mut freq, &mut unit);
        self.schedule = Some(EncodedSchedule::Pair(freq, unit));
    }
}

/// Payload sent on submit.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct EncodedMonitor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<FieldValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<FieldValue>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub monitor_type: Option<FieldValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<FieldValue>,
    pub config: EncodedConfig,
    #[serde(rename = "alertRule", skip_serializing_if = "Option::is_none")]
    pub alert_rule: Option<EncodedAlertRule>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, FieldValue>,
}

impl EncodedMonitor {
    fn assign(&mut self, key: &str, value: &FieldValue) {
        let v = if value.is_unset() {
            None
        } else {
            Some(value.clone())
        };
        match key {
            "name" => self.name = v,
            "slug" => self.slug = v,
            "type" => self.monitor_type = v,
            "project" => self.project = v,
            "config" | "alertRule" => {
                tracing::warn!("ignoring bare `{key}` field; only nested paths are encoded");
            }
            other => match v {
                Some(v) => {
                    self.extra.insert(other.to_string(), v);
                }
                None => {
                    self.extra.remove(other);
                }
            },
        }
    }

    pub fn to_json(&self) -> serde_json::Result<JsonValue> {
        serde_json::to_value(self)
    }
}

/// Folds a [`FlatEditMapping`] into an [`EncodedMonitor`].
#[derive(Clone, Debug)]
pub struct Encoder {
    /// Pair a schedule starts from when only one half of it is edited.
    pub interval_seed: (i64, IntervalUnit),
}

impl Default for Encoder {
    fn default() -> Self {
        Self {
            interval_seed: (1, IntervalUnit::Hour),
        }
    }
}

impl Encoder {
    pub fn encode(&self, values: &FlatEditMapping) -> EncodedMonitor {
        let mut out = EncodedMonitor::default();
        for (path, value) in values.iter() {
            match path {
                fields::ALERT_TARGETS => {
                    let targets = value.as_list().iter().map(|t| encode_target(t)).collect();
                    out.alert_rule.get_or_insert_with(Default::default).targets = Some(targets);
                }
                fields::ALERT_ENVIRONMENT => {
                    let env = match value {
                        FieldValue::Unset => None,
                        v => Some(v.as_display()).filter(|s| !s.is_empty()),
                    };
                    out.alert_rule
                        .get_or_insert_with(Default::default)
                        .environment = env;
                }
                fields::FREQUENCY => {
                    out.config
                        .edit_schedule_pair(self.interval_seed, |freq, _| {
                            *freq = parse_leading_int(value)
                        });
                }
                fields::INTERVAL => {
                    out.config
                        .edit_schedule_pair(self.interval_seed, |_, unit| *unit = value.clone());
                }
                p => match p.strip_prefix("config.") {
                    Some(key) => out.config.assign(key, value),
                    None => out.assign(p, value),
                },
            }
        }
        let has_targets = out
            .alert_rule
            .as_ref()
            .and_then(|r| r.targets.as_ref())
            .map(|t| !t.is_empty())
            .unwrap_or(false);
        if !has_targets {
            out.alert_rule = None;
        }
        out
    }
}

fn encode_target(raw: &str) -> EncodedTarget {
    let mut parts = raw.split(':');
    let prefix = parts.next().unwrap_or_default();
    let id = parts.next().unwrap_or_default();
    let target_type = TargetType::from_prefix(prefix);
    if target_type.is_none() {
        tracing::warn!("alert target {raw:?} has unknown prefix {prefix:?}");
    }
    EncodedTarget {
        target_type,
        target_identifier: parse_leading_int(&FieldValue::text(id)),
    }
}

/// Re-key a nested `config` error object onto `config.<field>` paths.
pub fn map_form_errors(mut body: JsonValue) -> JsonValue {
    let Some(obj) = body.as_object_mut() else {
        return body;
    };
    match obj.remove("config") {
        Some(JsonValue::Object(nested)) => {
            for (k, v) in nested {
                obj.insert(format!("config.{k}"), v);
            }
        }
        Some(other) => {
            obj.insert("config".to_string(), other);
        }
        None => {}
    }
    body
}

fn opt_text(v: Option<&str>) -> FieldValue {
    v.map(FieldValue::text).unwrap_or(FieldValue::Unset)
}

fn opt_number(v: Option<i64>) -> FieldValue {
    v.map(FieldValue::Number).unwrap_or(FieldValue::Unset)
}

/// Flat `config.*` fields needed to pre-fill the form for an existing config.
pub fn flatten_config(config: &MonitorConfig) -> FlatEditMapping {
    let mut m = FlatEditMapping::new();
    m.set(
        fields::SCHEDULE_TYPE,
        FieldValue::text(config.schedule_type.as_str()),
    );
    m.set(fields::CHECKIN_MARGIN, opt_number(config.checkin_margin));
    m.set(fields::MAX_RUNTIME, opt_number(config.max_runtime));
    m.set(fields::UPTIME_TYPE, opt_text(config.uptime_type.as_deref()));
    match config.schedule_type {
        ScheduleType::Interval => {
            let (freq, unit) = match &config.schedule {
                Some(Schedule::Interval(f, u)) => (FieldValue::Number(*f), FieldValue::text(u.as_str())),
                _ => (FieldValue::Unset, FieldValue::Unset),
            };
            m.set(fields::FREQUENCY, freq);
            m.set(fields::INTERVAL, unit);
        }
        ScheduleType::Crontab | ScheduleType::Unknown => {
            let schedule = match &config.schedule {
                Some(Schedule::Crontab(s)) => FieldValue::text(s.as_str()),
                _ => FieldValue::Unset,
            };
            m.set(fields::SCHEDULE, schedule);
            m.set(fields::TIMEZONE, opt_text(config.timezone.as_deref()));
        }
    }
    if let Some(url) = &config.url {
        m.set(fields::URL, FieldValue::text(url.as_str()));
    }
    if let Some(method) = &config.method {
        m.set(fields::METHOD, FieldValue::text(method.as_str()));
    }
    m
}

/// Seed mapping for an edit session: from `existing` in edit mode, from `defaults`
/// (and the current project context) in create mode.
pub fn initial_values(
    existing: Option<&Monitor>,
    defaults: &FormDefaults,
    selected_project: Option<&str>,
) -> FlatEditMapping {
    let mut m = FlatEditMapping::new();
    match existing {
        Some(monitor) => {
            m.set(fields::NAME, FieldValue::text(monitor.name.as_str()));
            m.set(fields::SLUG, FieldValue::text(monitor.slug.as_str()));
            m.set(fields::PROJECT, FieldValue::text(monitor.project.slug.as_str()));
            m.set(fields::TYPE, FieldValue::text(monitor.monitor_type.as_str()));
            for (k, v) in flatten_config(&monitor.config).iter() {
                m.set(k, v.clone());
            }
            let rule = monitor.alert_rule.clone().unwrap_or_default();
            let targets = rule
                .targets
                .iter()
                .map(|t| format!("{}:{}", t.target_type.prefix(), t.target_identifier))
                .collect();
            m.set(fields::ALERT_TARGETS, FieldValue::List(targets));
            m.set(
                fields::ALERT_ENVIRONMENT,
                FieldValue::text(rule.environment.unwrap_or_default()),
            );
        }
        None => {
            m.set(fields::NAME, FieldValue::text(""));
            m.set(fields::PROJECT, opt_text(selected_project));
            m.set(fields::TYPE, FieldValue::text(defaults.monitor_type.as_str()));
            m.set(
                fields::SCHEDULE_TYPE,
                FieldValue::text(defaults.schedule_type.as_str()),
            );
            m.set(fields::SCHEDULE, FieldValue::text(defaults.crontab.as_str()));
            m.set(fields::TIMEZONE, FieldValue::text(defaults.timezone.as_str()));
            m.set(fields::CHECKIN_MARGIN, FieldValue::Unset);
            m.set(fields::MAX_RUNTIME, FieldValue::Number(defaults.max_runtime));
            m.set(fields::ALERT_TARGETS, FieldValue::List(Vec::new()));
            m.set(fields::ALERT_ENVIRONMENT, FieldValue::text(""));
        }
    }
    m
}
