use std::collections::BTreeSet;

use super::model::{is_placeholder, Dataset};

/// One entry of a dropdown: what to show and what to store.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
}

impl SelectOption {
    /// An option whose label is its value.
    pub fn same(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            label: value.clone(),
            value,
        }
    }
}

/// Sorted, de-duplicated values of `column`, excluding placeholders.
///
/// Rows without the column contribute nothing; a missing column yields an
/// empty list. Values are kept as stored; only the placeholder check trims.
pub fn distinct_single_values(dataset: &Dataset, column: &str) -> Vec<SelectOption> {
    let Some(idx) = dataset.column_index(column) else {
        return Vec::new();
    };

    dataset
        .rows
        .iter()
        .filter_map(|row| row.get(idx))
        .filter(|value| !is_placeholder(value))
        .collect::<BTreeSet<&str>>()
        .into_iter()
        .map(SelectOption::same)
        .collect()
}

/// Sorted, de-duplicated parts of a multi-valued `column`.
///
/// Each cell is split on the literal `delimiter` (no regex), parts are trimmed,
/// and blank or `-` parts are dropped. With `", "` as the delimiter, `"A,B"`
/// stays a single part `"A,B"`.
pub fn distinct_multi_values(dataset: &Dataset, column: &str, delimiter: &str) -> Vec<SelectOption> {
    let Some(idx) = dataset.column_index(column) else {
        return Vec::new();
    };

    dataset
        .rows
        .iter()
        .filter_map(|row| row.get(idx))
        .flat_map(|value| split_multi_value(value, delimiter))
        .collect::<BTreeSet<&str>>()
        .into_iter()
        .map(SelectOption::same)
        .collect()
}

/// Split a multi-valued cell into its usable parts.
pub fn split_multi_value<'a>(value: &'a str, delimiter: &'a str) -> impl Iterator<Item = &'a str> {
    value
        .split(delimiter)
        .map(str::trim)
        .filter(|part| !is_placeholder(part))
}
