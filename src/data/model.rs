// ---------------------------------------------------------------------------
// Well-known columns
// ---------------------------------------------------------------------------

/// Column names that get dedicated filter controls or layout hints.
///
/// Any other header is passed through untouched; none of these are required
/// to be present in a given file.
pub mod columns {
    pub const DAY: &str = "Day";
    pub const BUILDING: &str = "Building";
    pub const MAJOR_RESTRICTION: &str = "Major Restriction";
    pub const COURSE_TITLE: &str = "Course Title";
    pub const INSTRUCTOR: &str = "Instructor";
    pub const CRN: &str = "CRN";
    pub const CAPACITY: &str = "Capacity";
    pub const ENROLLED: &str = "Enrolled";
    pub const CREDIT: &str = "Credit/Class Resc.";
    pub const TIME: &str = "Time";
}

/// Delimiter between entries of the "Major Restriction" column.
pub const MAJOR_RESTRICTION_DELIMITER: &str = ", ";

/// Literal cell text meaning "no data".
pub const PLACEHOLDER: &str = "-";

/// `true` for the "no data" values: blank or the literal `-` (after trimming).
pub fn is_placeholder(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value == PLACEHOLDER
}

// ---------------------------------------------------------------------------
// Row – one line of the timetable
// ---------------------------------------------------------------------------

/// A single timetable row. Cells are positionally aligned with
/// [`Dataset::columns`]; look them up by name through the dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    cells: Vec<String>,
}

impl Row {
    pub fn new(cells: Vec<String>) -> Self {
        Self { cells }
    }

    /// Raw cell values in source column order.
    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    /// Cell at a column position, `None` when the row is short.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.cells.get(index).map(String::as_str)
    }
}

// ---------------------------------------------------------------------------
// Dataset – one fetched CSV
// ---------------------------------------------------------------------------

/// The full parsed timetable for one date/course selection.
///
/// Loaded atomically and never mutated afterwards; a new selection replaces
/// it wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    /// Header names in source order (left to right).
    pub columns: Vec<String>,
    /// Rows in source order.
    pub rows: Vec<Row>,
}

impl Dataset {
    /// Build a dataset, padding short records with empty cells and dropping
    /// cells past the last header so every row lines up with `columns`.
    pub fn new(columns: Vec<String>, records: Vec<Vec<String>>) -> Self {
        let width = columns.len();
        let rows = records
            .into_iter()
            .map(|mut cells| {
                cells.resize(width, String::new());
                Row::new(cells)
            })
            .collect();
        Self { columns, rows }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a named column, if the source has it.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Whether the source has a column with this name.
    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Raw value of `column` in `row`. `None` when the column is missing.
    pub fn value<'a>(&self, row: &'a Row, column: &str) -> Option<&'a str> {
        self.column_index(column).and_then(|idx| row.get(idx))
    }
}
