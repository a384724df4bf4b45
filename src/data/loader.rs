use thiserror::Error;

use super::fetch::Fetcher;
use super::model::Dataset;

// ---------------------------------------------------------------------------
// Error / state taxonomy
// ---------------------------------------------------------------------------

/// Why a timetable load failed. Terminal for the attempt; never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// Transport failure or a non-2xx HTTP status.
    #[error("{0}")]
    Network(String),
    /// The request did not finish within the configured timeout.
    #[error("request timed out")]
    Timeout,
    /// The body could not be read as CSV. The whole load is discarded.
    #[error("malformed CSV: {0}")]
    Parse(String),
}

/// Mutually exclusive states of the timetable view's data source.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum LoadState {
    /// No date/course chosen yet; nothing was fetched.
    #[default]
    NoSourceSelected,
    /// A fetch for `url` is in flight.
    Loading { url: String },
    /// Fetched and parsed, at least one row.
    Loaded(Dataset),
    /// Fetched fine, but no data rows (or no header at all).
    EmptyDataset,
    /// Network or parse failure.
    LoadFailed(LoadError),
}

impl LoadState {
    /// Fold a finished load into the matching state.
    pub fn from_result(result: Result<Dataset, LoadError>) -> Self {
        match result {
            Ok(ds) if ds.is_empty() => LoadState::EmptyDataset,
            Ok(ds) => LoadState::Loaded(ds),
            Err(e) => LoadState::LoadFailed(e),
        }
    }

    /// The dataset, if one is loaded.
    pub fn dataset(&self) -> Option<&Dataset> {
        match self {
            LoadState::Loaded(ds) => Some(ds),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading { .. })
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Fetch `url` and parse it as a headed CSV timetable.
///
/// Callers are expected to short-circuit the empty URL themselves (see
/// [`super::fetch::DatasetLoader::request`]); here it is simply passed on.
pub fn load(fetcher: &dyn Fetcher, url: &str) -> Result<Dataset, LoadError> {
    let text = fetcher.fetch_text(url)?;
    parse_csv(&text)
}

// ---------------------------------------------------------------------------
// CSV parsing
// ---------------------------------------------------------------------------

/// Parse comma-delimited text whose first non-blank line is the header.
///
/// * Blank lines (all fields empty or whitespace) are skipped.
/// * A missing trailing newline or a trailing empty line is fine.
/// * Short records are padded, long ones truncated to the header width.
/// * No header at all yields an empty dataset rather than an error.
/// * A quoted field left open at end of input fails the whole parse.
pub fn parse_csv(text: &str) -> Result<Dataset, LoadError> {
    if let Some(line) = unterminated_quote(text) {
        return Err(LoadError::Parse(format!(
            "quoted field starting on line {line} is never closed"
        )));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| LoadError::Parse(format!("reading header: {e}")))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if headers.iter().all(|h| h.trim().is_empty()) {
        return Ok(Dataset::default());
    }

    let mut records = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.map_err(|e| LoadError::Parse(format!("row {row_no}: {e}")))?;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        records.push(record.iter().map(|field| field.to_string()).collect());
    }

    Ok(Dataset::new(headers, records))
}

/// Line (1-based) of a quoted field still open at end of input.
///
/// The `csv` reader accepts this silently and folds the rest of the file into
/// one cell. Quotes only open a field at its start; inside a quoted field `""`
/// is an escaped quote.
fn unterminated_quote(text: &str) -> Option<usize> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut line = 1;
    let mut open_at: Option<usize> = None;
    let mut field_start = true;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match (open_at, c) {
            (Some(_), '"') => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                } else {
                    open_at = None;
                }
            }
            (None, '"') if field_start => open_at = Some(line),
            (None, ',' | '\r' | '\n') => {
                if c == '\n' {
                    line += 1;
                }
                field_start = true;
                continue;
            }
            _ => {}
        }
        if c == '\n' {
            line += 1;
        }
        field_start = false;
    }
    open_at
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_header_and_rows() {
        let text = "CRN,Course Title,Day\n21001,Calculus I,Monday\n21002,Physics I,Tuesday\n";
        let ds = parse_csv(text).unwrap();

        assert_eq!(ds.columns, vec!["CRN", "Course Title", "Day"]);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.value(&ds.rows[1], "Course Title"), Some("Physics I"));
    }

    #[test]
    fn tolerates_blank_lines_and_missing_trailing_newline() {
        let text = "CRN,Day\n\n21001,Monday\n,\n   ,  \n21002,Tuesday";
        let ds = parse_csv(text).unwrap();

        assert_eq!(ds.len(), 2);
        assert_eq!(ds.value(&ds.rows[1], "CRN"), Some("21002"));
    }

    #[test]
    fn quoted_fields_keep_embedded_commas() {
        let text = "CRN,Major Restriction\n1,\"BLG, BLGE, -\"\n";
        let ds = parse_csv(text).unwrap();
        assert_eq!(
            ds.value(&ds.rows[0], "Major Restriction"),
            Some("BLG, BLGE, -")
        );
    }

    #[test]
    fn broken_quote_fails_whole_load() {
        let text = "Day,Building\n\"Mon,A\nTue,B\n";
        let err = parse_csv(text).unwrap_err();
        assert!(matches!(err, LoadError::Parse(ref msg) if msg.contains("line 2")));

        // No partial rows reach the view.
        let state = LoadState::from_result(parse_csv(text));
        assert!(matches!(state, LoadState::LoadFailed(LoadError::Parse(_))));
        assert!(state.dataset().is_none());
    }

    #[test]
    fn escaped_and_literal_quotes_still_parse() {
        let text = "CRN,Note\n1,\"say \"\"hi\"\"\"\n2,5\" screen\n3,\"two\nlines\"\n";
        let ds = parse_csv(text).unwrap();

        assert_eq!(ds.len(), 3);
        assert_eq!(ds.value(&ds.rows[0], "Note"), Some("say \"hi\""));
        assert_eq!(ds.value(&ds.rows[1], "Note"), Some("5\" screen"));
        assert_eq!(ds.value(&ds.rows[2], "Note"), Some("two\nlines"));
    }

    #[test]
    fn leading_unnamed_index_column_is_kept() {
        let text = ",CRN,Day\n0,21001,Monday\n";
        let ds = parse_csv(text).unwrap();
        assert_eq!(ds.columns, vec!["", "CRN", "Day"]);
        assert_eq!(ds.value(&ds.rows[0], "Day"), Some("Monday"));
    }

    #[test]
    fn header_only_is_empty_dataset() {
        let ds = parse_csv("CRN,Day\n").unwrap();
        assert!(ds.is_empty());
        assert_eq!(LoadState::from_result(Ok(ds)), LoadState::EmptyDataset);
    }

    #[test]
    fn empty_body_is_empty_dataset() {
        let ds = parse_csv("").unwrap();
        assert!(ds.is_empty());
        assert!(ds.columns.is_empty());
        assert_eq!(LoadState::from_result(Ok(ds)), LoadState::EmptyDataset);
    }

    #[test]
    fn failure_is_distinct_from_empty() {
        let state = LoadState::from_result(Err(LoadError::Network("HTTP 404".into())));
        assert!(matches!(state, LoadState::LoadFailed(LoadError::Network(_))));
        assert_ne!(state, LoadState::EmptyDataset);
    }

    #[test]
    fn loaded_state_exposes_dataset() {
        let ds = parse_csv("Day\nMon\n").unwrap();
        let state = LoadState::from_result(Ok(ds.clone()));
        assert_eq!(state.dataset(), Some(&ds));
        assert!(!state.is_loading());
    }
}
