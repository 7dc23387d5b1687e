use crate::model::{IntervalUnit, MonitorType, ScheduleType};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "monitor-tui.yaml";

/// Values a fresh form starts from; injected into the orchestrator at construction.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct FormDefaults {
    pub monitor_type: MonitorType,
    pub schedule_type: ScheduleType,
    pub crontab: String,
    pub timezone: String,
    pub interval_frequency: i64,
    pub interval_unit: IntervalUnit,
    pub max_runtime: i64,
}

impl Default for FormDefaults {
    fn default() -> Self {
        Self {
            monitor_type: MonitorType::CronJob,
            schedule_type: ScheduleType::Crontab,
            crontab: "0 0 * * *".to_string(),
            timezone: "UTC".to_string(),
            interval_frequency: 1,
            interval_unit: IntervalUnit::Hour,
            max_runtime: 30,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ApiConfig {
    pub base_url: String,
    // Name of the env var holding a bearer token
    #[serde(default)]
    pub token_env: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            token_env: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    pub organization: String,
    // Current project context; preselected in create mode
    #[serde(default)]
    pub project: Option<String>,
    // Slug of the monitor to edit; absent means create mode
    #[serde(default)]
    pub monitor: Option<String>,
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
    #[serde(default = "default_page_size")]
    pub checkins_per_page: u32,
    #[serde(default)]
    pub defaults: FormDefaults,
}

fn default_page_size() -> u32 {
    25
}

impl AppConfig {
    pub fn auth_token(&self) -> Option<String> {
        self.api
            .token_env
            .as_deref()
            .and_then(|name| std::env::var(name).ok())
            .filter(|t| !t.is_empty())
    }
}

pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let s = fs::read_to_string(path).with_context(|| format!("reading {path:?}"))?;
    let cfg: AppConfig = serde_yaml::from_str(&s).with_context(|| format!("parsing {path:?}"))?;
    Ok(cfg)
}

/// Locate the config file: `MONITOR_TUI_CONFIG`, then the working directory,
/// then `$HOME/.tui`.
pub fn discover_config_path(cwd: &Path, home: Option<&Path>) -> Option<PathBuf> {
    if let Ok(p) = std::env::var("MONITOR_TUI_CONFIG") {
        return Some(PathBuf::from(p));
    }
    let candidates = [cwd.join(CONFIG_FILE), cwd.join(".tui").join(CONFIG_FILE)];
    if let Some(p) = candidates.iter().find(|p| p.exists()) {
        return Some(p.clone());
    }
    home.map(|h| h.join(".tui").join(CONFIG_FILE))
        .filter(|p| p.exists())
}

pub fn load_config() -> Result<AppConfig> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let home = std::env::var("HOME")
        .ok()
        .or_else(|| std::env::var("USERPROFILE").ok())
        .map(PathBuf::from);
    match discover_config_path(&cwd, home.as_deref()) {
        Some(p) => load_config_from(&p),
        None => Err(anyhow::anyhow!(
            "No config found. Set MONITOR_TUI_CONFIG=<path to {CONFIG_FILE}> or place {CONFIG_FILE} in CWD, CWD/.tui or ~/.tui"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_config_with_defaults() {
        let cfg: AppConfig = serde_yaml::from_str("organization: acme\n").unwrap();
        assert_eq!(cfg.organization, "acme");
        assert_eq!(cfg.defaults, FormDefaults::default());
        assert_eq!(cfg.defaults.max_runtime, 30);
        assert_eq!(cfg.defaults.crontab, "0 0 * * *");
        assert_eq!(cfg.checkins_per_page, 25);
        assert!(cfg.monitor.is_none());
    }

    #[test]
    fn partial_defaults_override_only_named_keys() {
        let yaml = "organization: acme\ndefaults:\n  max_runtime: 45\n  interval_unit: day\n";
        let cfg: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.defaults.max_runtime, 45);
        assert_eq!(cfg.defaults.interval_unit, IntervalUnit::Day);
        assert_eq!(cfg.defaults.timezone, "UTC");
    }

    #[test]
    fn discovers_config_in_dot_tui() {
        let dir = tempfile::tempdir().unwrap();
        let tui = dir.path().join(".tui");
        fs::create_dir_all(&tui).unwrap();
        fs::write(
            tui.join(CONFIG_FILE),
            "organization: acme\nproject: backend\n",
        )
        .unwrap();
        // Only meaningful when the override env var is not set in the test env
        if std::env::var("MONITOR_TUI_CONFIG").is_err() {
            let p = discover_config_path(dir.path(), None).unwrap();
            let cfg = load_config_from(&p).unwrap();
            assert_eq!(cfg.project.as_deref(), Some("backend"));
        }
    }
}
