use std::collections::BTreeSet;

use super::classify::split_multi_value;
use super::model::{columns, Dataset, Row, MAJOR_RESTRICTION_DELIMITER};

// ---------------------------------------------------------------------------
// Filter state: search text plus per-column selections
// ---------------------------------------------------------------------------

/// Active criteria for the timetable. Every dimension left empty means
/// "no restriction"; dimensions are AND-combined.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    /// Case-insensitive substring searched in every cell.
    pub query: String,
    /// Accepted "Day" values.
    pub days: BTreeSet<String>,
    /// Required "Building" value. `Some("")` counts as unset.
    pub building: Option<String>,
    /// Accepted majors; a row passes when its restriction list shares one.
    pub major_restrictions: BTreeSet<String>,
}

impl FilterState {
    /// Whether no criterion is active.
    pub fn is_empty(&self) -> bool {
        self.query.is_empty()
            && self.days.is_empty()
            && self.active_building().is_none()
            && self.major_restrictions.is_empty()
    }

    /// Whether a free-text search is active.
    pub fn is_searching(&self) -> bool {
        !self.query.is_empty()
    }

    fn active_building(&self) -> Option<&str> {
        self.building.as_deref().filter(|b| !b.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

/// Filter criteria bound to one dataset's column positions.
struct Matcher<'f> {
    filters: &'f FilterState,
    query: String,
    day: Option<usize>,
    building: Option<usize>,
    major: Option<usize>,
}

impl<'f> Matcher<'f> {
    fn new(dataset: &Dataset, filters: &'f FilterState) -> Self {
        Self {
            filters,
            query: filters.query.to_lowercase(),
            day: dataset.column_index(columns::DAY),
            building: dataset.column_index(columns::BUILDING),
            major: dataset.column_index(columns::MAJOR_RESTRICTION),
        }
    }

    fn cell<'r>(row: &'r Row, idx: Option<usize>) -> Option<&'r str> {
        idx.and_then(|i| row.get(i))
    }

    fn matches(&self, row: &Row) -> bool {
        self.matches_query(row)
            && self.matches_day(row)
            && self.matches_building(row)
            && self.matches_major(row)
    }

    fn matches_query(&self, row: &Row) -> bool {
        self.query.is_empty()
            || row
                .cells()
                .iter()
                .any(|cell| cell.to_lowercase().contains(&self.query))
    }

    fn matches_day(&self, row: &Row) -> bool {
        let days = &self.filters.days;
        days.is_empty() || Self::cell(row, self.day).is_some_and(|d| days.contains(d))
    }

    fn matches_building(&self, row: &Row) -> bool {
        match self.filters.active_building() {
            None => true,
            Some(wanted) => Self::cell(row, self.building) == Some(wanted),
        }
    }

    fn matches_major(&self, row: &Row) -> bool {
        let wanted = &self.filters.major_restrictions;
        if wanted.is_empty() {
            return true;
        }
        // Rows with no usable restriction fail once any major is selected.
        Self::cell(row, self.major).is_some_and(|value| {
            split_multi_value(value, MAJOR_RESTRICTION_DELIMITER).any(|part| wanted.contains(part))
        })
    }
}

/// Whether a single row passes all active filters.
pub fn row_matches(dataset: &Dataset, row: &Row, filters: &FilterState) -> bool {
    Matcher::new(dataset, filters).matches(row)
}

/// Indices of rows passing all active filters, in dataset order.
pub fn filtered_indices(dataset: &Dataset, filters: &FilterState) -> Vec<usize> {
    if filters.is_empty() {
        return (0..dataset.len()).collect();
    }
    let matcher = Matcher::new(dataset, filters);
    dataset
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| matcher.matches(row))
        .map(|(i, _)| i)
        .collect()
}

/// Rows passing all active filters, as a stable subsequence of the dataset.
pub fn visible_rows<'d>(dataset: &'d Dataset, filters: &FilterState) -> Vec<&'d Row> {
    filtered_indices(dataset, filters)
        .into_iter()
        .map(|i| &dataset.rows[i])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(columns: &[&str], rows: &[&[&str]]) -> Dataset {
        Dataset::new(
            columns.iter().map(|c| c.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    fn set(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn timetable() -> Dataset {
        dataset(
            &["CRN", "Course Title", "Day", "Building", "Major Restriction"],
            &[
                &["21001", "Calculus I", "Monday", "MED", "BLG, BLGE"],
                &["21002", "Physics I", "Tuesday", "FEB", "-"],
                &["21003", "Linear Algebra", "Monday", "FEB", "ELK, EHB, -"],
                &["21004", "ABCxyz Seminar", "Friday", "-", ""],
            ],
        )
    }

    #[test]
    fn empty_filter_is_identity() {
        let ds = timetable();
        let rows = visible_rows(&ds, &FilterState::default());
        assert_eq!(rows.len(), ds.len());
        assert!(rows.iter().zip(&ds.rows).all(|(a, b)| *a == b));
    }

    #[test]
    fn day_filter_selects_matching_rows() {
        let ds = dataset(&["Day", "Building"], &[&["Mon", "A"], &["Tue", "B"]]);
        let filters = FilterState {
            days: set(&["Mon"]),
            ..Default::default()
        };
        let rows = visible_rows(&ds, &filters);
        assert_eq!(rows, vec![&ds.rows[0]]);
    }

    #[test]
    fn multiple_days_are_or_combined() {
        let ds = timetable();
        let filters = FilterState {
            days: set(&["Monday", "Friday"]),
            ..Default::default()
        };
        assert_eq!(filtered_indices(&ds, &filters), vec![0, 2, 3]);
    }

    #[test]
    fn building_requires_exact_match() {
        let ds = timetable();
        let filters = FilterState {
            building: Some("FEB".into()),
            ..Default::default()
        };
        assert_eq!(filtered_indices(&ds, &filters), vec![1, 2]);

        let partial = FilterState {
            building: Some("FE".into()),
            ..Default::default()
        };
        assert!(filtered_indices(&ds, &partial).is_empty());
    }

    #[test]
    fn empty_building_counts_as_unset() {
        let ds = timetable();
        let filters = FilterState {
            building: Some(String::new()),
            ..Default::default()
        };
        assert!(filters.is_empty());
        assert_eq!(filtered_indices(&ds, &filters).len(), ds.len());
    }

    #[test]
    fn major_restriction_matches_on_intersection() {
        let ds = dataset(&["Major Restriction"], &[&["CS, EE"]]);

        let ee = FilterState {
            major_restrictions: set(&["EE"]),
            ..Default::default()
        };
        assert_eq!(filtered_indices(&ds, &ee), vec![0]);

        let me = FilterState {
            major_restrictions: set(&["ME"]),
            ..Default::default()
        };
        assert!(filtered_indices(&ds, &me).is_empty());
    }

    #[test]
    fn rows_without_restriction_fail_major_filter() {
        let ds = timetable();
        let filters = FilterState {
            major_restrictions: set(&["BLG", "EHB"]),
            ..Default::default()
        };
        assert_eq!(filtered_indices(&ds, &filters), vec![0, 2]);
    }

    #[test]
    fn major_filter_on_dataset_without_column_hides_all() {
        let ds = dataset(&["Day"], &[&["Mon"]]);
        let filters = FilterState {
            major_restrictions: set(&["BLG"]),
            ..Default::default()
        };
        assert!(visible_rows(&ds, &filters).is_empty());
    }

    #[test]
    fn search_is_case_insensitive_substring_over_all_cells() {
        let ds = timetable();
        let filters = FilterState {
            query: "abc".into(),
            ..Default::default()
        };
        assert_eq!(filtered_indices(&ds, &filters), vec![3]);

        let by_crn = FilterState {
            query: "2100".into(),
            ..Default::default()
        };
        assert_eq!(filtered_indices(&ds, &by_crn).len(), 4);
        assert!(by_crn.is_searching());
    }

    #[test]
    fn search_compares_raw_strings() {
        let ds = dataset(&["Capacity"], &[&["040"], &["40"]]);
        let filters = FilterState {
            query: "040".into(),
            ..Default::default()
        };
        assert_eq!(filtered_indices(&ds, &filters), vec![0]);
    }

    #[test]
    fn criteria_are_and_combined() {
        let ds = timetable();
        let filters = FilterState {
            query: "a".into(),
            days: set(&["Monday"]),
            building: Some("FEB".into()),
            major_restrictions: set(&["ELK"]),
        };
        assert_eq!(filtered_indices(&ds, &filters), vec![2]);
        assert!(row_matches(&ds, &ds.rows[2], &filters));
        assert!(!row_matches(&ds, &ds.rows[0], &filters));
    }

    #[test]
    fn filtering_is_idempotent_and_order_preserving() {
        let ds = timetable();
        let filters = FilterState {
            building: Some("FEB".into()),
            ..Default::default()
        };
        let first = filtered_indices(&ds, &filters);
        let second = filtered_indices(&ds, &filters);
        assert_eq!(first, second);
        assert!(first.windows(2).all(|w| w[0] < w[1]));
    }
}
