use crate::model::{IntervalUnit, Member, Project, Team};

pub const NAME: &str = "name";
pub const SLUG: &str = "slug";
pub const PROJECT: &str = "project";
pub const TYPE: &str = "type";
pub const SCHEDULE_TYPE: &str = "config.schedule_type";
pub const SCHEDULE: &str = "config.schedule";
pub const TIMEZONE: &str = "config.timezone";
pub const FREQUENCY: &str = "config.schedule.frequency";
pub const INTERVAL: &str = "config.schedule.interval";
pub const CHECKIN_MARGIN: &str = "config.checkin_margin";
pub const MAX_RUNTIME: &str = "config.max_runtime";
pub const UPTIME_TYPE: &str = "config.uptime_type";
pub const URL: &str = "config.url";
pub const METHOD: &str = "config.method";
pub const ALERT_TARGETS: &str = "alertRule.targets";
pub const ALERT_ENVIRONMENT: &str = "alertRule.environment";

pub const HTTP_METHODS: [&str; 5] = ["GET", "POST", "HEAD", "PUT", "DELETE"];

#[derive(Clone, Debug, PartialEq)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
}

impl SelectOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }

    fn same(v: &str) -> Self {
        Self::new(v, v)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum FieldKind {
    Text,
    Number,
    Select(Vec<SelectOption>),
    // Rendered as a horizontal radio group
    Radio(Vec<SelectOption>),
    MultiSelect(Vec<SelectOption>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldSpec {
    pub path: &'static str,
    pub label: String,
    pub kind: FieldKind,
    pub required: bool,
    pub disabled: bool,
    /// Muted line under the field (cron description, disabled reason, ...).
    pub help: Option<String>,
    pub placeholder: Option<String>,
}

impl FieldSpec {
    pub fn new(path: &'static str, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            path,
            label: label.into(),
            kind,
            required: false,
            disabled: false,
            help: None,
            placeholder: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn placeholder(mut self, p: impl Into<String>) -> Self {
        self.placeholder = Some(p.into());
        self
    }

    pub fn options(&self) -> &[SelectOption] {
        match &self.kind {
            FieldKind::Select(o) | FieldKind::Radio(o) | FieldKind::MultiSelect(o) => o,
            FieldKind::Text | FieldKind::Number => &[],
        }
    }
}

pub fn monitor_type_options() -> Vec<SelectOption> {
    vec![
        SelectOption::new("Cron Job", "cron_job"),
        SelectOption::new("Uptime", "uptime"),
    ]
}

pub fn schedule_type_options() -> Vec<SelectOption> {
    vec![
        SelectOption::new("Crontab", "crontab"),
        SelectOption::new("Interval", "interval"),
    ]
}

/// Unit choices whose labels follow the current frequency ("1 hour", "3 hours").
pub fn interval_unit_options(frequency: Option<i64>) -> Vec<SelectOption> {
    IntervalUnit::ALL
        .iter()
        .map(|u| SelectOption::new(u.label(frequency), u.as_str()))
        .collect()
}

pub fn timezone_options() -> Vec<SelectOption> {
    chrono_tz::TZ_VARIANTS
        .iter()
        .map(|tz| SelectOption::same(tz.name()))
        .collect()
}

pub fn http_method_options() -> Vec<SelectOption> {
    HTTP_METHODS.iter().map(|m| SelectOption::same(m)).collect()
}

/// Projects offered in the project selector: memberships only, unless the user
/// is a superuser.
pub fn selectable_projects(projects: &[Project], is_superuser: bool) -> Vec<&Project> {
    projects
        .iter()
        .filter(|p| is_superuser || p.is_member)
        .collect()
}

pub fn project_options(projects: &[Project], is_superuser: bool) -> Vec<SelectOption> {
    selectable_projects(projects, is_superuser)
        .into_iter()
        .map(|p| SelectOption::new(p.name.clone().unwrap_or_else(|| p.slug.clone()), &p.slug))
        .collect()
}

pub fn environment_options(environments: &[String]) -> Vec<SelectOption> {
    let mut out = vec![SelectOption::new("All Environments", "")];
    out.extend(environments.iter().map(|e| SelectOption::same(e)));
    out
}

pub fn alert_target_options(teams: &[Team], members: &[Member]) -> Vec<SelectOption> {
    let teams = teams
        .iter()
        .map(|t| SelectOption::new(format!("#{}", t.slug), format!("team:{}", t.id)));
    let members = members
        .iter()
        .map(|m| SelectOption::new(m.display_name(), format!("member:{}", m.id)));
    teams.chain(members).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(slug: &str, is_member: bool) -> Project {
        Project {
            id: slug.to_string(),
            slug: slug.to_string(),
            name: None,
            is_member,
        }
    }

    #[test]
    fn project_list_is_gated_by_membership() {
        let projects = vec![project("a", true), project("b", false), project("c", true)];
        let slugs: Vec<&str> = selectable_projects(&projects, false)
            .iter()
            .map(|p| p.slug.as_str())
            .collect();
        assert_eq!(slugs, vec!["a", "c"]);
        assert_eq!(selectable_projects(&projects, true).len(), 3);
    }

    #[test]
    fn unit_labels_follow_frequency() {
        let one = interval_unit_options(Some(1));
        assert_eq!(one[1].label, "hour");
        assert_eq!(one[1].value, "hour");
        let many = interval_unit_options(Some(4));
        assert_eq!(many[1].label, "hours");
    }

    #[test]
    fn targets_use_prefixed_values() {
        let teams = vec![Team {
            id: "5".into(),
            slug: "ops".into(),
        }];
        let members = vec![Member {
            id: "9".into(),
            name: Some("Dana".into()),
            email: None,
        }];
        let opts = alert_target_options(&teams, &members);
        assert_eq!(opts[0], SelectOption::new("#ops", "team:5"));
        assert_eq!(opts[1], SelectOption::new("Dana", "member:9"));
    }

    #[test]
    fn environment_options_lead_with_all() {
        let opts = environment_options(&["prod".to_string()]);
        assert_eq!(opts[0].value, "");
        assert_eq!(opts[1].value, "prod");
    }

    #[test]
    fn timezones_include_utc() {
        assert!(timezone_options().iter().any(|o| o.value == "UTC"));
    }
}
