use std::collections::{BTreeMap, BTreeSet};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use anyhow::{Context, Result};
use serde::Deserialize;

use super::classify::SelectOption;
use super::fetch::{Fetcher, Notify};

// ---------------------------------------------------------------------------
// Dates index
// ---------------------------------------------------------------------------

/// One archived snapshot as listed in `dates.json`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DateEntry {
    pub value: String,
    pub label: String,
}

/// Parse `dates.json` into dropdown options, newest label first.
pub fn parse_dates(text: &str) -> Result<Vec<SelectOption>> {
    let mut entries: Vec<DateEntry> = serde_json::from_str(text).context("parsing dates index")?;
    entries.sort_by(|a, b| b.label.cmp(&a.label));
    Ok(entries
        .into_iter()
        .map(|e| SelectOption {
            label: e.label,
            value: e.value,
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Course-code index
// ---------------------------------------------------------------------------

/// `course_codes.json`, either a flat list (single education level) or a
/// map from level key to course codes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum CourseIndex {
    Flat(Vec<String>),
    ByLevel(BTreeMap<String, Vec<String>>),
}

impl CourseIndex {
    pub fn parse(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("parsing course code index")
    }

    /// Level keys in display order. A flat index has only `default_level`.
    pub fn levels(&self, default_level: &str) -> Vec<String> {
        match self {
            CourseIndex::Flat(_) => vec![default_level.to_string()],
            CourseIndex::ByLevel(map) => {
                // Default level first, the rest alphabetically.
                let mut keys: Vec<String> = map.keys().cloned().collect();
                keys.sort_by_key(|k| (k != default_level, k.clone()));
                keys
            }
        }
    }

    fn codes(&self, level: &str, default_level: &str) -> &[String] {
        match self {
            CourseIndex::Flat(codes) if level == default_level => codes.as_slice(),
            CourseIndex::Flat(_) => &[],
            CourseIndex::ByLevel(map) => map.get(level).map(Vec::as_slice).unwrap_or(&[]),
        }
    }

    /// Course options for a level, sorted ascending and de-duplicated.
    pub fn course_options(&self, level: &str, default_level: &str) -> Vec<SelectOption> {
        self.codes(level, default_level)
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .collect::<BTreeSet<&str>>()
            .into_iter()
            .map(SelectOption::same)
            .collect()
    }

    /// Whether `code` is offered at `level`.
    pub fn contains(&self, level: &str, default_level: &str, code: &str) -> bool {
        self.codes(level, default_level).iter().any(|c| c.trim() == code)
    }
}

/// Human label for an education level key.
pub fn level_label(level: &str) -> String {
    match level {
        "LS" => "Undergraduate".to_string(),
        "LU" => "Graduate".to_string(),
        "OL" => "Associate".to_string(),
        other => other.to_string(),
    }
}

/// URL of the timetable CSV for a selection, or `""` unless both a date and
/// a course are chosen. The level prefix is omitted for the default level.
pub fn csv_url(base_url: &str, date: &str, level: &str, default_level: &str, course: &str) -> String {
    if date.is_empty() || course.is_empty() {
        return String::new();
    }
    if level.is_empty() || level == default_level {
        format!("{base_url}{date}/{course}.csv")
    } else {
        format!("{base_url}{date}/{level}-{course}.csv")
    }
}

// ---------------------------------------------------------------------------
// Background index loading
// ---------------------------------------------------------------------------

/// Load state of a startup index.
#[derive(Debug, Clone, PartialEq)]
pub enum IndexState<T> {
    Loading,
    Loaded(T),
    Failed(String),
}

impl<T> Default for IndexState<T> {
    fn default() -> Self {
        IndexState::Loading
    }
}

impl<T> IndexState<T> {
    pub fn loaded(&self) -> Option<&T> {
        match self {
            IndexState::Loaded(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, IndexState::Loading)
    }
}

/// A finished index fetch.
#[derive(Debug)]
pub enum IndexUpdate {
    Dates(Result<Vec<SelectOption>>),
    Courses(Result<CourseIndex>),
}

pub fn fetch_dates(fetcher: &dyn Fetcher, url: &str) -> Result<Vec<SelectOption>> {
    let text = fetcher
        .fetch_text(url)
        .with_context(|| format!("fetching {url}"))?;
    parse_dates(&text)
}

pub fn fetch_courses(fetcher: &dyn Fetcher, url: &str) -> Result<CourseIndex> {
    let text = fetcher
        .fetch_text(url)
        .with_context(|| format!("fetching {url}"))?;
    CourseIndex::parse(&text)
}

/// Fetch both indexes once, each on its own worker thread, so a slow dates
/// index never holds back the course list. Each result is posted as soon as
/// it is ready.
pub fn spawn_index_fetch(
    fetcher: Arc<dyn Fetcher>,
    dates_url: String,
    courses_url: String,
    notify: Option<Notify>,
) -> Receiver<IndexUpdate> {
    let (tx, rx) = mpsc::channel::<IndexUpdate>();

    {
        let fetcher = Arc::clone(&fetcher);
        spawn_index_worker("dates-fetch", tx.clone(), notify.clone(), move || {
            IndexUpdate::Dates(fetch_dates(fetcher.as_ref(), &dates_url))
        });
    }
    spawn_index_worker("courses-fetch", tx, notify, move || {
        IndexUpdate::Courses(fetch_courses(fetcher.as_ref(), &courses_url))
    });

    rx
}

fn spawn_index_worker<F>(name: &str, tx: Sender<IndexUpdate>, notify: Option<Notify>, job: F)
where
    F: FnOnce() -> IndexUpdate + Send + 'static,
{
    let spawned = thread::Builder::new().name(name.into()).spawn(move || {
        let _ = tx.send(job());
        if let Some(notify) = &notify {
            notify();
        }
    });

    if let Err(e) = spawned {
        log::error!("Failed to spawn {name} thread: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::LoadError;
    use std::sync::Mutex;

    #[test]
    fn dates_sorted_newest_first() {
        let text = r#"[
            {"value": "2023-09-01", "label": "2023-09-01"},
            {"value": "2024-02-10", "label": "2024-02-10"},
            {"value": "2023-12-24", "label": "2023-12-24"}
        ]"#;
        let dates = parse_dates(text).unwrap();
        let labels: Vec<&str> = dates.iter().map(|d| d.label.as_str()).collect();
        assert_eq!(labels, vec!["2024-02-10", "2023-12-24", "2023-09-01"]);
    }

    #[test]
    fn malformed_dates_are_an_error() {
        assert!(parse_dates("{\"value\": 1}").is_err());
    }

    #[test]
    fn flat_course_index() {
        let idx = CourseIndex::parse(r#"["MAT", "BLG", "FIZ", "BLG"]"#).unwrap();
        assert_eq!(idx.levels("LS"), vec!["LS"]);

        let codes: Vec<String> = idx
            .course_options("LS", "LS")
            .into_iter()
            .map(|o| o.value)
            .collect();
        assert_eq!(codes, vec!["BLG", "FIZ", "MAT"]);
        assert!(idx.course_options("LU", "LS").is_empty());
    }

    #[test]
    fn course_index_by_level() {
        let idx = CourseIndex::parse(r#"{"LU": ["BLG", "END"], "LS": ["MAT", "BLG"]}"#).unwrap();
        assert_eq!(idx.levels("LS"), vec!["LS", "LU"]);
        assert!(idx.contains("LU", "LS", "END"));
        assert!(!idx.contains("LS", "LS", "END"));
        assert_eq!(idx.course_options("LU", "LS")[0], SelectOption::same("BLG"));
    }

    #[test]
    fn csv_url_composition() {
        let base = "https://example.org/public/";
        assert_eq!(
            csv_url(base, "2024-02-10", "LS", "LS", "BLG"),
            "https://example.org/public/2024-02-10/BLG.csv"
        );
        assert_eq!(
            csv_url(base, "2024-02-10", "LU", "LS", "BLG"),
            "https://example.org/public/2024-02-10/LU-BLG.csv"
        );
        assert_eq!(csv_url(base, "", "LS", "LS", "BLG"), "");
        assert_eq!(csv_url(base, "2024-02-10", "LS", "LS", ""), "");
    }

    #[test]
    fn level_labels() {
        assert_eq!(level_label("LS"), "Undergraduate");
        assert_eq!(level_label("LU"), "Graduate");
        assert_eq!(level_label("XX"), "XX");
    }

    struct StaticFetcher;

    impl Fetcher for StaticFetcher {
        fn fetch_text(&self, url: &str) -> std::result::Result<String, LoadError> {
            match url {
                "dates" => Ok(r#"[{"value": "d1", "label": "d1"}]"#.to_string()),
                _ => Err(LoadError::Network("HTTP error! status: 500".into())),
            }
        }
    }

    #[test]
    fn background_fetch_reports_each_index() {
        let rx = spawn_index_fetch(
            Arc::new(StaticFetcher),
            "dates".into(),
            "courses".into(),
            None,
        );
        let timeout = std::time::Duration::from_secs(5);

        let (mut saw_dates, mut saw_courses) = (false, false);
        for _ in 0..2 {
            match rx.recv_timeout(timeout).unwrap() {
                IndexUpdate::Dates(Ok(dates)) => {
                    assert_eq!(dates.len(), 1);
                    saw_dates = true;
                }
                IndexUpdate::Courses(Err(e)) => {
                    assert!(format!("{e:#}").contains("500"));
                    saw_courses = true;
                }
                other => panic!("unexpected update: {other:?}"),
            }
        }
        assert!(saw_dates && saw_courses);
    }

    /// Dates block until released; courses answer at once.
    struct StalledDatesFetcher {
        release: Mutex<mpsc::Receiver<()>>,
    }

    impl Fetcher for StalledDatesFetcher {
        fn fetch_text(&self, url: &str) -> std::result::Result<String, LoadError> {
            if url == "dates" {
                let _ = self.release.lock().unwrap().recv();
                return Ok(r#"[{"value": "d1", "label": "d1"}]"#.to_string());
            }
            Ok(r#"["BLG", "MAT"]"#.to_string())
        }
    }

    #[test]
    fn stalled_dates_index_does_not_hold_back_courses() {
        let (release, gate) = mpsc::channel();
        let fetcher = StalledDatesFetcher {
            release: Mutex::new(gate),
        };
        let rx = spawn_index_fetch(Arc::new(fetcher), "dates".into(), "courses".into(), None);
        let timeout = std::time::Duration::from_secs(5);

        match rx.recv_timeout(timeout).unwrap() {
            IndexUpdate::Courses(Ok(idx)) => assert!(idx.contains("LS", "LS", "BLG")),
            other => panic!("unexpected update: {other:?}"),
        }

        release.send(()).unwrap();
        match rx.recv_timeout(timeout).unwrap() {
            IndexUpdate::Dates(Ok(dates)) => assert_eq!(dates.len(), 1),
            other => panic!("unexpected update: {other:?}"),
        }
    }
}
