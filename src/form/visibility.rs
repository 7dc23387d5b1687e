//! Which field groups the form shows, derived from the `type` and
//! `config.schedule_type` discriminators.

use crate::config::FormDefaults;
use crate::cron;
use crate::form::codec::{parse_leading_int, FlatEditMapping, ParsedInt};
use crate::form::fields::{self, FieldKind, FieldSpec};
use crate::form::FormContext;

pub const CRONTAB_FIELDS: [&str; 2] = [fields::SCHEDULE, fields::TIMEZONE];
pub const INTERVAL_FIELDS: [&str; 2] = [fields::FREQUENCY, fields::INTERVAL];
pub const CRON_JOB_FIELDS: [&str; 2] = [fields::CHECKIN_MARGIN, fields::MAX_RUNTIME];
pub const UPTIME_FIELDS: [&str; 2] = [fields::URL, fields::METHOD];

pub const PROJECT_LOCKED_HELP: &str = "Monitors cannot be moved between projects once created";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SectionSet {
    pub crontab: bool,
    pub interval: bool,
    pub cron_job: bool,
    pub uptime: bool,
}

impl SectionSet {
    fn groups(&self) -> [(bool, &'static [&'static str]); 4] {
        [
            (self.crontab, &CRONTAB_FIELDS),
            (self.interval, &INTERVAL_FIELDS),
            (self.cron_job, &CRON_JOB_FIELDS),
            (self.uptime, &UPTIME_FIELDS),
        ]
    }

    pub fn visible_paths(&self) -> Vec<&'static str> {
        self.groups()
            .into_iter()
            .filter(|(on, _)| *on)
            .flat_map(|(_, paths)| paths.iter().copied())
            .collect()
    }

    pub fn hidden_paths(&self) -> Vec<&'static str> {
        self.groups()
            .into_iter()
            .filter(|(on, _)| !*on)
            .flat_map(|(_, paths)| paths.iter().copied())
            .collect()
    }
}

pub fn compute_visible_sections(values: &FlatEditMapping) -> SectionSet {
    let schedule_type = values.text(fields::SCHEDULE_TYPE);
    let monitor_type = values
        .text(fields::TYPE)
        .unwrap_or_else(|| "cron_job".to_string());
    SectionSet {
        crontab: schedule_type.as_deref() == Some("crontab"),
        interval: schedule_type.as_deref() == Some("interval"),
        cron_job: monitor_type == "cron_job",
        uptime: monitor_type == "uptime",
    }
}

/// Current frequency as an integer, for pluralizing the unit selector.
pub fn frequency_count(values: &FlatEditMapping) -> Option<i64> {
    match values.get(fields::FREQUENCY).map(parse_leading_int) {
        Some(ParsedInt::Value(n)) => Some(n),
        _ => None,
    }
}

/// Ordered field list for the current values.
pub fn visible_fields(
    values: &FlatEditMapping,
    ctx: &FormContext,
    defaults: &FormDefaults,
    editing_existing: bool,
) -> Vec<FieldSpec> {
    let sections = compute_visible_sections(values);
    let mut out = vec![FieldSpec::new(fields::NAME, "Name", FieldKind::Text)
        .required()
        .placeholder("My Cron Job")];
    if editing_existing {
        out.push(FieldSpec::new(fields::SLUG, "Slug", FieldKind::Text).required());
    }
    let mut project = FieldSpec::new(
        fields::PROJECT,
        "Project",
        FieldKind::Select(fields::project_options(&ctx.projects, ctx.is_superuser)),
    )
    .required();
    if editing_existing {
        project.disabled = true;
        project.help = Some(PROJECT_LOCKED_HELP.to_string());
    }
    out.push(project);
    out.push(FieldSpec::new(
        fields::TYPE,
        "Type",
        FieldKind::Radio(fields::monitor_type_options()),
    ));
    out.push(
        FieldSpec::new(
            fields::SCHEDULE_TYPE,
            "Schedule Type",
            FieldKind::Select(fields::schedule_type_options()),
        )
        .required(),
    );
    if sections.crontab {
        let expr = values.text(fields::SCHEDULE).unwrap_or_default();
        let help = match cron::describe(&expr) {
            Ok(desc) => desc,
            Err(e) => format!("Invalid cron expression: {e}"),
        };
        out.push(
            FieldSpec::new(fields::SCHEDULE, "Crontab Schedule", FieldKind::Text)
                .required()
                .placeholder(defaults.crontab.clone())
                .help(help),
        );
        out.push(FieldSpec::new(
            fields::TIMEZONE,
            "Timezone",
            FieldKind::Select(fields::timezone_options()),
        ));
    }
    if sections.interval {
        out.push(FieldSpec::new(fields::FREQUENCY, "Frequency", FieldKind::Number).required());
        out.push(
            FieldSpec::new(
                fields::INTERVAL,
                "Interval",
                FieldKind::Select(fields::interval_unit_options(frequency_count(values))),
            )
            .required(),
        );
    }
    if sections.cron_job {
        out.push(
            FieldSpec::new(fields::CHECKIN_MARGIN, "Grace Period", FieldKind::Number)
                .placeholder("Defaults to 1 minute")
                .help("Minutes a check-in may be late before it counts as missed"),
        );
        out.push(
            FieldSpec::new(fields::MAX_RUNTIME, "Max Runtime", FieldKind::Number)
                .placeholder(format!("Defaults to {} minutes", defaults.max_runtime))
                .help("Minutes a job may run before it counts as timed out"),
        );
    }
    if sections.uptime {
        out.push(
            FieldSpec::new(fields::URL, "URL", FieldKind::Text)
                .required()
                .placeholder("https://example.com/health"),
        );
        out.push(FieldSpec::new(
            fields::METHOD,
            "Method",
            FieldKind::Radio(fields::http_method_options()),
        ));
    }
    out.push(FieldSpec::new(
        fields::ALERT_TARGETS,
        "Notify",
        FieldKind::MultiSelect(fields::alert_target_options(&ctx.teams, &ctx.members)),
    ));
    out.push(FieldSpec::new(
        fields::ALERT_ENVIRONMENT,
        "Environment",
        FieldKind::Select(fields::environment_options(&ctx.environments)),
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::codec::FieldValue;

    fn values(pairs: &[(&str, &str)]) -> FlatEditMapping {
        pairs
            .iter()
            .map(|(k, v)| (*k, FieldValue::text(*v)))
            .collect()
    }

    fn paths(specs: &[FieldSpec]) -> Vec<&'static str> {
        specs.iter().map(|s| s.path).collect()
    }

    #[test]
    fn schedule_type_selects_editor() {
        let s = compute_visible_sections(&values(&[(fields::SCHEDULE_TYPE, "crontab")]));
        assert!(s.crontab && !s.interval);
        let s = compute_visible_sections(&values(&[(fields::SCHEDULE_TYPE, "interval")]));
        assert!(!s.crontab && s.interval);
        let s = compute_visible_sections(&values(&[(fields::SCHEDULE_TYPE, "other")]));
        assert!(!s.crontab && !s.interval);
    }

    #[test]
    fn type_defaults_to_cron_job() {
        let s = compute_visible_sections(&FlatEditMapping::new());
        assert!(s.cron_job && !s.uptime);
        let mut m = FlatEditMapping::new();
        m.set(fields::TYPE, FieldValue::Unset);
        assert!(compute_visible_sections(&m).cron_job);
        let s = compute_visible_sections(&values(&[(fields::TYPE, "heartbeat")]));
        assert!(!s.cron_job && !s.uptime);
    }

    #[test]
    fn uptime_swaps_type_specific_fields() {
        let ctx = FormContext::default();
        let d = FormDefaults::default();
        let cron = visible_fields(
            &values(&[(fields::TYPE, "cron_job"), (fields::SCHEDULE_TYPE, "crontab")]),
            &ctx,
            &d,
            false,
        );
        let p = paths(&cron);
        assert!(p.contains(&fields::CHECKIN_MARGIN) && p.contains(&fields::MAX_RUNTIME));
        assert!(!p.contains(&fields::URL));

        let up = visible_fields(&values(&[(fields::TYPE, "uptime")]), &ctx, &d, false);
        let p = paths(&up);
        assert!(p.contains(&fields::URL) && p.contains(&fields::METHOD));
        assert!(!p.contains(&fields::CHECKIN_MARGIN) && !p.contains(&fields::MAX_RUNTIME));
    }

    #[test]
    fn crontab_help_describes_expression() {
        let specs = visible_fields(
            &values(&[(fields::SCHEDULE_TYPE, "crontab"), (fields::SCHEDULE, "0 0 * * *")]),
            &FormContext::default(),
            &FormDefaults::default(),
            false,
        );
        let sched = specs.iter().find(|s| s.path == fields::SCHEDULE).unwrap();
        assert_eq!(sched.help.as_deref(), Some("At 00:00"));
    }

    #[test]
    fn project_locked_when_editing() {
        let specs = visible_fields(
            &FlatEditMapping::new(),
            &FormContext::default(),
            &FormDefaults::default(),
            true,
        );
        let project = specs.iter().find(|s| s.path == fields::PROJECT).unwrap();
        assert!(project.disabled);
        assert_eq!(project.help.as_deref(), Some(PROJECT_LOCKED_HELP));
        assert!(specs.iter().any(|s| s.path == fields::SLUG));
    }

    #[test]
    fn hidden_paths_complement_visible() {
        let s = SectionSet {
            crontab: true,
            interval: false,
            cron_job: false,
            uptime: true,
        };
        assert_eq!(
            s.visible_paths(),
            vec![fields::SCHEDULE, fields::TIMEZONE, fields::URL, fields::METHOD]
        );
        assert_eq!(s.hidden_paths().len(), 4);
    }
}
