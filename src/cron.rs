//! Five-field cron expressions: parsing and plain-English descriptions for the
//! crontab editor.

use regex::Regex;
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CronError {
    #[error("empty expression")]
    Empty,
    #[error("expected 5 fields, found {0}")]
    FieldCount(usize),
    #[error("invalid {field} value {value:?}")]
    Invalid { field: &'static str, value: String },
    #[error("{field} value {value} is outside {min}-{max}")]
    OutOfRange {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Part {
    Any,
    Value(u32),
    Range(u32, u32),
    /// `*/n` (start `None`) or `a/n`, `a-b/n`.
    Step {
        start: Option<u32>,
        end: Option<u32>,
        step: u32,
    },
}

#[derive(Debug, Clone, Copy)]
struct FieldDef {
    name: &'static str,
    min: u32,
    max: u32,
    names: &'static [&'static str],
}

const MINUTE: FieldDef = FieldDef {
    name: "minute",
    min: 0,
    max: 59,
    names: &[],
};
const HOUR: FieldDef = FieldDef {
    name: "hour",
    min: 0,
    max: 23,
    names: &[],
};
const DAY_OF_MONTH: FieldDef = FieldDef {
    name: "day-of-month",
    min: 1,
    max: 31,
    names: &[],
};
const MONTH: FieldDef = FieldDef {
    name: "month",
    min: 1,
    max: 12,
    names: &[
        "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
    ],
};
const DAY_OF_WEEK: FieldDef = FieldDef {
    name: "day-of-week",
    min: 0,
    max: 7,
    names: &["SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT"],
};

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];
const WEEKDAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

fn token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\*|\d+|[A-Za-z]{3})(?:-(\d+|[A-Za-z]{3}))?(?:/(\d+))?$")
            .expect("static cron token regex")
    })
}

/// Parsed five-field expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronExpr {
    minute: Vec<Part>,
    hour: Vec<Part>,
    day_of_month: Vec<Part>,
    month: Vec<Part>,
    day_of_week: Vec<Part>,
}

fn expand_nickname(expr: &str) -> Option<&'static str> {
    match expr {
        "@yearly" | "@annually" => Some("0 0 1 1 *"),
        "@monthly" => Some("0 0 1 * *"),
        "@weekly" => Some("0 0 * * 0"),
        "@daily" | "@midnight" => Some("0 0 * * *"),
        "@hourly" => Some("0 * * * *"),
        _ => None,
    }
}

fn parse_atom(def: &FieldDef, raw: &str, whole: &str) -> Result<u32, CronError> {
    let value = match raw.parse::<u32>() {
        Ok(v) => v,
        Err(_) => {
            let upper = raw.to_ascii_uppercase();
            let idx = def
                .names
                .iter()
                .position(|n| *n == upper)
                .ok_or_else(|| CronError::Invalid {
                    field: def.name,
                    value: whole.to_string(),
                })?;
            // Month names are 1-based, weekday names 0-based
            idx as u32 + def.min
        }
    };
    if value < def.min || value > def.max {
        return Err(CronError::OutOfRange {
            field: def.name,
            value,
            min: def.min,
            max: def.max,
        });
    }
    Ok(value)
}

fn parse_field(def: &FieldDef, raw: &str) -> Result<Vec<Part>, CronError> {
    let mut parts = Vec::new();
    for item in raw.split(',') {
        let caps = token_re()
            .captures(item)
            .ok_or_else(|| CronError::Invalid {
                field: def.name,
                value: item.to_string(),
            })?;
        let head = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        let end = caps
            .get(2)
            .map(|m| parse_atom(def, m.as_str(), item))
            .transpose()?;
        let step = match caps.get(3) {
            Some(m) => {
                let s = m.as_str().parse::<u32>().unwrap_or(0);
                if s == 0 {
                    return Err(CronError::Invalid {
                        field: def.name,
                        value: item.to_string(),
                    });
                }
                Some(s)
            }
            None => None,
        };
        let start = if head == "*" {
            if end.is_some() {
                return Err(CronError::Invalid {
                    field: def.name,
                    value: item.to_string(),
                });
            }
            None
        } else {
            Some(parse_atom(def, head, item)?)
        };
        let part = match (start, end, step) {
            (None, _, None) => Part::Any,
            (start, end, Some(step)) => Part::Step { start, end, step },
            (Some(a), Some(b), None) => Part::Range(a, b),
            (Some(a), None, None) => Part::Value(a),
        };
        parts.push(part);
    }
    Ok(parts)
}

pub fn parse(expr: &str) -> Result<CronExpr, CronError> {
    let trimmed = expr.trim();
    if trimmed.is_empty() {
        return Err(CronError::Empty);
    }
    let expanded = expand_nickname(&trimmed.to_ascii_lowercase()).unwrap_or(trimmed);
    let fields: Vec<&str> = expanded.split_whitespace().collect();
    if fields.len() != 5 {
        return Err(CronError::FieldCount(fields.len()));
    }
    Ok(CronExpr {
        minute: parse_field(&MINUTE, fields[0])?,
        hour: parse_field(&HOUR, fields[1])?,
        day_of_month: parse_field(&DAY_OF_MONTH, fields[2])?,
        month: parse_field(&MONTH, fields[3])?,
        day_of_week: parse_field(&DAY_OF_WEEK, fields[4])?,
    })
}

fn is_any(parts: &[Part]) -> bool {
    parts.iter().all(|p| *p == Part::Any)
}

fn single(parts: &[Part]) -> Option<u32> {
    match parts {
        [Part::Value(v)] => Some(*v),
        _ => None,
    }
}

fn values(parts: &[Part]) -> Option<Vec<u32>> {
    parts
        .iter()
        .map(|p| match p {
            Part::Value(v) => Some(*v),
            _ => None,
        })
        .collect()
}

fn ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (1, r) if r != 11 => "st",
        (2, r) if r != 12 => "nd",
        (3, r) if r != 13 => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

fn join_and(items: &[String]) -> String {
    match items {
        [] => String::new(),
        [one] => one.clone(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

fn list_parts(parts: &[Part], name: &dyn Fn(u32) -> String) -> String {
    let items: Vec<String> = parts
        .iter()
        .map(|p| match p {
            Part::Any => "every value".to_string(),
            Part::Value(v) => name(*v),
            Part::Range(a, b) => format!("{} through {}", name(*a), name(*b)),
            Part::Step { start, end, step } => {
                let mut s = format!("every {}", ordinal(*step));
                if let Some(a) = start {
                    s.push_str(&format!(" starting at {}", name(*a)));
                }
                if let Some(b) = end {
                    s.push_str(&format!(" until {}", name(*b)));
                }
                s
            }
        })
        .collect();
    join_and(&items)
}

fn weekday(v: u32) -> String {
    WEEKDAY_NAMES[(v % 7) as usize].to_string()
}

fn month(v: u32) -> String {
    MONTH_NAMES[(v.clamp(1, 12) - 1) as usize].to_string()
}

impl CronExpr {
    fn describe_time(&self) -> String {
        let minute_any = is_any(&self.minute);
        let hour_any = is_any(&self.hour);
        match (single(&self.minute), &self.hour[..]) {
            (Some(m), _) if values(&self.hour).is_some() && !hour_any => {
                let hours = values(&self.hour).unwrap_or_default();
                let times: Vec<String> = hours.iter().map(|h| format!("{h:02}:{m:02}")).collect();
                format!("At {}", join_and(&times))
            }
            (Some(0), _) if hour_any => "Every hour".to_string(),
            (Some(m), _) if hour_any => format!("At minute {m} past every hour"),
            (Some(m), [Part::Step { start: None, end: None, step }]) => {
                format!("At minute {m} past every {step} hours")
            }
            (None, _) if minute_any && hour_any => "Every minute".to_string(),
            (None, _) if hour_any => match &self.minute[..] {
                [Part::Step {
                    start: None,
                    end: None,
                    step,
                }] => format!("Every {step} minutes"),
                parts => format!("At minute {} past every hour", list_parts(parts, &|v: u32| v.to_string())),
            },
            _ => {
                let minutes = if minute_any {
                    "every minute".to_string()
                } else {
                    format!("minute {}", list_parts(&self.minute, &|v: u32| v.to_string()))
                };
                format!(
                    "At {minutes} past hour {}",
                    list_parts(&self.hour, &|v: u32| v.to_string())
                )
            }
        }
    }

    fn describe_weekdays(&self) -> Option<String> {
        if is_any(&self.day_of_week) {
            return None;
        }
        Some(match &self.day_of_week[..] {
            [Part::Range(a, b)] => format!("{} through {}", weekday(*a), weekday(*b)),
            parts => format!("only on {}", list_parts(parts, &weekday)),
        })
    }

    pub fn describe(&self) -> String {
        let mut out = self.describe_time();
        if !is_any(&self.day_of_month) {
            out.push_str(&format!(
                ", on day {} of the month",
                list_parts(&self.day_of_month, &|v: u32| v.to_string())
            ));
        }
        if let Some(days) = self.describe_weekdays() {
            out.push_str(", ");
            out.push_str(&days);
        }
        if !is_any(&self.month) {
            out.push_str(&format!(", only in {}", list_parts(&self.month, &month)));
        }
        out
    }
}

/// Plain-English description of a cron expression ("At 09:30, Monday through Friday").
pub fn describe(expr: &str) -> Result<String, CronError> {
    parse(expr).map(|c| c.describe())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describes_common_schedules() {
        let cases = [
            ("0 0 * * *", "At 00:00"),
            ("* * * * *", "Every minute"),
            ("*/5 * * * *", "Every 5 minutes"),
            ("0 * * * *", "Every hour"),
            ("15 * * * *", "At minute 15 past every hour"),
            ("30 9 * * 1-5", "At 09:30, Monday through Friday"),
            ("0 9,17 * * *", "At 09:00 and 17:00"),
            ("0 */2 * * *", "At minute 0 past every 2 hours"),
            ("0 0 * * 7", "At 00:00, only on Sunday"),
            (
                "0 12 1 JAN *",
                "At 12:00, on day 1 of the month, only in January",
            ),
            ("0 0 * * mon,fri", "At 00:00, only on Monday and Friday"),
        ];
        for (expr, want) in cases {
            assert_eq!(describe(expr).unwrap(), want, "expr {expr}");
        }
    }

    #[test]
    fn nicknames_expand() {
        assert_eq!(describe("@daily").unwrap(), "At 00:00");
        assert_eq!(describe("@hourly").unwrap(), "Every hour");
        assert_eq!(
            describe("@yearly").unwrap(),
            "At 00:00, on day 1 of the month, only in January"
        );
    }

    #[test]
    fn rejects_malformed_expressions() {
        assert_eq!(describe(""), Err(CronError::Empty));
        assert_eq!(describe("* * *"), Err(CronError::FieldCount(3)));
        assert!(matches!(
            describe("61 * * * *"),
            Err(CronError::OutOfRange { field: "minute", .. })
        ));
        assert!(matches!(
            describe("* * * FOO *"),
            Err(CronError::Invalid { field: "month", .. })
        ));
        assert!(matches!(
            describe("*/0 * * * *"),
            Err(CronError::Invalid { .. })
        ));
    }

    #[test]
    fn month_and_weekday_names_map_to_numbers() {
        let c = parse("0 0 * DEC SAT").unwrap();
        assert_eq!(c.month, vec![Part::Value(12)]);
        assert_eq!(c.day_of_week, vec![Part::Value(6)]);
    }
}
