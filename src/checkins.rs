//! Check-in history list and cursor pagination from the `Link` response header.

use crate::model::CheckIn;
use regex::Regex;
use std::sync::OnceLock;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Cursor {
    pub cursor: String,
    /// Whether the server has rows on this side.
    pub results: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Pagination {
    pub previous: Option<Cursor>,
    pub next: Option<Cursor>,
}

impl Pagination {
    pub fn has_next(&self) -> bool {
        self.next.as_ref().is_some_and(|c| c.results)
    }

    pub fn has_previous(&self) -> bool {
        self.previous.as_ref().is_some_and(|c| c.results)
    }
}

fn link_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"<[^>]*>\s*((?:;\s*[A-Za-z]+\s*=\s*"[^"]*"\s*)+)"#)
            .expect("static link regex")
    })
}

fn attr_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"([A-Za-z]+)\s*=\s*"([^"]*)""#).expect("static link attribute regex")
    })
}

/// Parse `<url>; rel="next"; results="true"; cursor="0:100:0", <url>; rel="previous"; ...`.
/// Entries without a `rel` of `next`/`previous` or without a cursor are skipped.
pub fn parse_link_header(value: &str) -> Pagination {
    let mut out = Pagination::default();
    for link in link_re().captures_iter(value) {
        let mut rel = None;
        let mut cursor = None;
        let mut results = false;
        for attr in attr_re().captures_iter(&link[1]) {
            match &attr[1] {
                "rel" => rel = Some(attr[2].to_string()),
                "cursor" => cursor = Some(attr[2].to_string()),
                "results" => results = &attr[2] == "true",
                _ => {}
            }
        }
        let Some(cursor) = cursor else { continue };
        let entry = Some(Cursor { cursor, results });
        match rel.as_deref() {
            Some("next") => out.next = entry,
            Some("previous") | Some("prev") => out.previous = entry,
            _ => {}
        }
    }
    out
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum CheckinList {
    #[default]
    Idle,
    Loading {
        cursor: Option<String>,
    },
    Loaded {
        items: Vec<CheckIn>,
        pagination: Pagination,
        cursor: Option<String>,
    },
    Failed(String),
}

impl CheckinList {
    pub fn is_loading(&self) -> bool {
        matches!(self, CheckinList::Loading { .. })
    }

    /// Cursor of the page on screen (or being fetched).
    pub fn current_cursor(&self) -> Option<String> {
        match self {
            CheckinList::Loading { cursor } | CheckinList::Loaded { cursor, .. } => cursor.clone(),
            _ => None,
        }
    }

    pub fn next_cursor(&self) -> Option<String> {
        match self {
            CheckinList::Loaded { pagination, .. } if pagination.has_next() => {
                pagination.next.as_ref().map(|c| c.cursor.clone())
            }
            _ => None,
        }
    }

    pub fn previous_cursor(&self) -> Option<String> {
        match self {
            CheckinList::Loaded { pagination, .. } if pagination.has_previous() => {
                pagination.previous.as_ref().map(|c| c.cursor.clone())
            }
            _ => None,
        }
    }

    pub fn start(&mut self, cursor: Option<String>) {
        *self = CheckinList::Loading { cursor };
    }

    /// Apply a fetch result. A failure drops any rows shown before.
    pub fn finish(&mut self, outcome: Result<(Vec<CheckIn>, Pagination), String>) {
        let cursor = self.current_cursor();
        *self = match outcome {
            Ok((items, pagination)) => CheckinList::Loaded {
                items,
                pagination,
                cursor,
            },
            Err(e) => CheckinList::Failed(e),
        };
    }
}

pub fn format_duration(ms: Option<u64>) -> String {
    match ms {
        None => "-".to_string(),
        Some(ms) if ms < 1000 => format!("{ms}ms"),
        Some(ms) if ms < 60_000 => format!("{:.1}s", ms as f64 / 1000.0),
        Some(ms) => {
            let secs = ms / 1000;
            format!("{}m {}s", secs / 60, secs % 60)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CheckInStatus;

    const LINK: &str = concat!(
        r#"<https://sentry.example/api/0/organizations/acme/monitors/nightly/checkins/?cursor=0:0:1>; "#,
        r#"rel="previous"; results="false"; cursor="0:0:1", "#,
        r#"<https://sentry.example/api/0/organizations/acme/monitors/nightly/checkins/?cursor=0:25:0>; "#,
        r#"rel="next"; results="true"; cursor="0:25:0""#
    );

    #[test]
    fn parses_both_sides() {
        let p = parse_link_header(LINK);
        assert_eq!(
            p.previous,
            Some(Cursor {
                cursor: "0:0:1".into(),
                results: false
            })
        );
        assert_eq!(p.next.as_ref().map(|c| c.cursor.as_str()), Some("0:25:0"));
        assert!(p.has_next());
        assert!(!p.has_previous());
    }

    #[test]
    fn garbage_header_has_no_pages() {
        let p = parse_link_header("nonsense");
        assert_eq!(p, Pagination::default());
        assert!(!p.has_next());
    }

    fn checkin(id: &str) -> CheckIn {
        CheckIn {
            id: id.into(),
            status: CheckInStatus::Ok,
            duration: Some(1200),
            date_created: "2024-05-01T00:00:00Z".into(),
            environment: None,
        }
    }

    #[test]
    fn list_tracks_cursor_through_load() {
        let mut list = CheckinList::default();
        list.start(Some("0:25:0".into()));
        assert!(list.is_loading());
        list.finish(Ok((vec![checkin("a")], parse_link_header(LINK))));
        assert_eq!(list.current_cursor().as_deref(), Some("0:25:0"));
        assert_eq!(list.next_cursor().as_deref(), Some("0:25:0"));
        assert_eq!(list.previous_cursor(), None);
    }

    #[test]
    fn failure_drops_previous_rows() {
        let mut list = CheckinList::Loaded {
            items: vec![checkin("a")],
            pagination: Pagination::default(),
            cursor: None,
        };
        list.start(None);
        list.finish(Err("boom".into()));
        assert_eq!(list, CheckinList::Failed("boom".into()));
        assert_eq!(list.next_cursor(), None);
    }

    #[test]
    fn durations_are_humanized() {
        assert_eq!(format_duration(None), "-");
        assert_eq!(format_duration(Some(250)), "250ms");
        assert_eq!(format_duration(Some(1500)), "1.5s");
        assert_eq!(format_duration(Some(125_000)), "2m 5s");
    }
}
