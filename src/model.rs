use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MonitorType {
    #[default]
    CronJob,
    Uptime,
    #[serde(other)]
    Unknown,
}

impl MonitorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MonitorType::CronJob => "cron_job",
            MonitorType::Uptime => "uptime",
            MonitorType::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleType {
    #[default]
    Crontab,
    Interval,
    #[serde(other)]
    Unknown,
}

impl ScheduleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleType::Crontab => "crontab",
            ScheduleType::Interval => "interval",
            ScheduleType::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IntervalUnit {
    Minute,
    #[default]
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl IntervalUnit {
    pub const ALL: [IntervalUnit; 6] = [
        IntervalUnit::Minute,
        IntervalUnit::Hour,
        IntervalUnit::Day,
        IntervalUnit::Week,
        IntervalUnit::Month,
        IntervalUnit::Year,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IntervalUnit::Minute => "minute",
            IntervalUnit::Hour => "hour",
            IntervalUnit::Day => "day",
            IntervalUnit::Week => "week",
            IntervalUnit::Month => "month",
            IntervalUnit::Year => "year",
        }
    }

    /// Option label for the unit selector; singular only for a count of exactly one.
    pub fn label(&self, count: Option<i64>) -> String {
        if count == Some(1) {
            self.as_str().to_string()
        } else {
            format!("{}s", self.as_str())
        }
    }
}

/// Either a cron expression or a `[frequency, unit]` pair, as the API returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Schedule {
    Crontab(String),
    Interval(i64, IntervalUnit),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MonitorConfig {
    #[serde(default)]
    pub schedule_type: ScheduleType,
    #[serde(default)]
    pub schedule: Option<Schedule>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub checkin_margin: Option<i64>,
    #[serde(default)]
    pub max_runtime: Option<i64>,
    #[serde(default)]
    pub uptime_type: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetType {
    Team,
    Member,
}

impl TargetType {
    /// Prefix used by the alert target selector (`team:5`, `member:9`).
    pub fn prefix(&self) -> &'static str {
        match self {
            TargetType::Team => "team",
            TargetType::Member => "member",
        }
    }

    pub fn from_prefix(s: &str) -> Option<Self> {
        match s {
            "team" => Some(TargetType::Team),
            "member" => Some(TargetType::Member),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertTarget {
    pub target_type: TargetType,
    pub target_identifier: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AlertRule {
    #[serde(default)]
    pub targets: Vec<AlertTarget>,
    #[serde(default)]
    pub environment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRef {
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Monitor {
    #[serde(default)]
    pub id: String,
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(rename = "type", default)]
    pub monitor_type: MonitorType,
    pub project: ProjectRef,
    #[serde(default)]
    pub config: MonitorConfig,
    #[serde(default)]
    pub alert_rule: Option<AlertRule>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckInStatus {
    Ok,
    Error,
    Missed,
    InProgress,
    Timeout,
    #[serde(other)]
    Unknown,
}

impl CheckInStatus {
    pub fn label(&self) -> &'static str {
        match self {
            CheckInStatus::Ok => "Okay",
            CheckInStatus::Error => "Failed",
            CheckInStatus::Missed => "Missed",
            CheckInStatus::InProgress => "In Progress",
            CheckInStatus::Timeout => "Timed Out",
            CheckInStatus::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckIn {
    pub id: String,
    pub status: CheckInStatus,
    /// Milliseconds.
    #[serde(default)]
    pub duration: Option<u64>,
    pub date_created: String,
    #[serde(default)]
    pub environment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub slug: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub is_member: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl Member {
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.email.as_deref())
            .unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub is_superuser: bool,
}
