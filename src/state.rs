use std::collections::BTreeSet;
use std::sync::mpsc::Receiver;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::data::classify::{distinct_multi_values, distinct_single_values, SelectOption};
use crate::data::fetch::{DatasetLoader, Fetcher, Notify};
use crate::data::filter::{filtered_indices, FilterState};
use crate::data::index::{self, level_label, CourseIndex, IndexState, IndexUpdate};
use crate::data::loader::LoadState;
use crate::data::model::{columns, MAJOR_RESTRICTION_DELIMITER};

/// What the table area shows, in place of rows when there are none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewStatus {
    NoSourceSelected,
    Loading,
    Failed(String),
    EmptyDataset,
    NoResultsForFilter,
    Rows,
}

impl ViewStatus {
    /// One-line message replacing the table, `None` when rows are shown.
    pub fn message(&self) -> Option<String> {
        match self {
            ViewStatus::NoSourceSelected => Some("Select Date and Course".to_string()),
            ViewStatus::Loading => Some("Loading...".to_string()),
            ViewStatus::Failed(reason) => Some(format!("Error: {reason}")),
            ViewStatus::EmptyDataset => Some("No data for this course".to_string()),
            ViewStatus::NoResultsForFilter => Some("No rows match the current filters".to_string()),
            ViewStatus::Rows => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: AppConfig,

    /// Startup indexes driving the source dropdowns.
    pub dates: IndexState<Vec<SelectOption>>,
    pub courses: IndexState<CourseIndex>,

    /// Current source selection; empty means "not chosen".
    pub selected_date: String,
    pub selected_level: String,
    pub selected_course: String,

    /// Timetable for the current selection.
    pub load_state: LoadState,

    /// Active filter criteria.
    pub filters: FilterState,

    /// Indices of rows passing the current filters (cached).
    pub visible_indices: Vec<usize>,

    /// Filter choices derived from the loaded dataset.
    pub day_options: Vec<SelectOption>,
    pub building_options: Vec<SelectOption>,
    pub major_options: Vec<SelectOption>,

    loader: DatasetLoader,
    index_updates: Receiver<IndexUpdate>,
}

impl AppState {
    /// Build the state and start fetching the dates and course indexes.
    pub fn new(config: AppConfig, fetcher: Arc<dyn Fetcher>, notify: Option<Notify>) -> Self {
        let index_updates = index::spawn_index_fetch(
            Arc::clone(&fetcher),
            config.dates_url(),
            config.course_codes_url(),
            notify.clone(),
        );

        let mut loader = DatasetLoader::new(fetcher);
        if let Some(notify) = notify {
            loader = loader.with_notify(notify);
        }

        Self {
            selected_level: config.default_level.clone(),
            config,
            dates: IndexState::Loading,
            courses: IndexState::Loading,
            selected_date: String::new(),
            selected_course: String::new(),
            load_state: LoadState::NoSourceSelected,
            filters: FilterState::default(),
            visible_indices: Vec::new(),
            day_options: Vec::new(),
            building_options: Vec::new(),
            major_options: Vec::new(),
            loader,
            index_updates,
        }
    }

    // -- Source selection --

    /// CSV URL for the current selection, `""` until date and course are set.
    pub fn csv_url(&self) -> String {
        index::csv_url(
            &self.config.base_url,
            &self.selected_date,
            &self.selected_level,
            &self.config.default_level,
            &self.selected_course,
        )
    }

    pub fn set_date(&mut self, date: String) {
        self.selected_date = date;
        self.sync_source();
    }

    pub fn set_course(&mut self, course: String) {
        self.selected_course = course;
        self.sync_source();
    }

    /// Switch education level, dropping the course if the new level lacks it.
    pub fn set_level(&mut self, level: String) {
        let keep_course = self
            .courses
            .loaded()
            .is_some_and(|idx| idx.contains(&level, &self.config.default_level, &self.selected_course));
        if !keep_course {
            self.selected_course.clear();
        }
        self.selected_level = level;
        self.sync_source();
    }

    /// Date dropdown entries, newest first.
    pub fn date_options(&self) -> &[SelectOption] {
        self.dates.loaded().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Levels offered by the course index.
    pub fn level_options(&self) -> Vec<SelectOption> {
        self.courses
            .loaded()
            .map(|idx| idx.levels(&self.config.default_level))
            .unwrap_or_default()
            .into_iter()
            .map(|level| SelectOption {
                label: level_label(&level),
                value: level,
            })
            .collect()
    }

    /// Course dropdown entries for the selected level.
    pub fn course_options(&self) -> Vec<SelectOption> {
        self.courses
            .loaded()
            .map(|idx| idx.course_options(&self.selected_level, &self.config.default_level))
            .unwrap_or_default()
    }

    /// Issue a new load when the selection maps to a different URL.
    fn sync_source(&mut self) {
        let url = self.csv_url();
        if url != self.loader.current_url() {
            let state = self.loader.request(&url);
            self.set_load_state(state);
        }
    }

    // -- Background results --

    /// Apply anything the worker threads have finished. Called every frame.
    pub fn poll(&mut self) {
        while let Ok(update) = self.index_updates.try_recv() {
            self.apply_index_update(update);
        }
        if let Some(state) = self.loader.poll() {
            self.set_load_state(state);
        }
    }

    fn apply_index_update(&mut self, update: IndexUpdate) {
        match update {
            IndexUpdate::Dates(Ok(dates)) => {
                log::info!("Loaded {} archive dates", dates.len());
                self.dates = IndexState::Loaded(dates);
            }
            IndexUpdate::Dates(Err(e)) => {
                log::error!("Error fetching dates: {e:#}");
                self.dates =
                    IndexState::Failed("Error fetching dates. Please try again later.".to_string());
            }
            IndexUpdate::Courses(Ok(courses)) => {
                let levels = courses.levels(&self.config.default_level);
                log::info!("Loaded course index with levels {levels:?}");
                if !levels.contains(&self.selected_level) {
                    if let Some(first) = levels.first() {
                        self.selected_level = first.clone();
                    }
                }
                self.courses = IndexState::Loaded(courses);
            }
            IndexUpdate::Courses(Err(e)) => {
                log::error!("Error fetching course codes: {e:#}");
                self.courses = IndexState::Failed(
                    "Error fetching course codes. Please try again later.".to_string(),
                );
            }
        }
    }

    /// Replace the timetable state. Filters reset and option lists are
    /// rebuilt from the new dataset (or cleared when there is none).
    pub fn set_load_state(&mut self, state: LoadState) {
        self.filters = FilterState::default();

        match state.dataset() {
            Some(ds) => {
                self.day_options = distinct_single_values(ds, columns::DAY);
                self.building_options = distinct_single_values(ds, columns::BUILDING);
                self.major_options =
                    distinct_multi_values(ds, columns::MAJOR_RESTRICTION, MAJOR_RESTRICTION_DELIMITER);
                self.visible_indices = (0..ds.len()).collect();
            }
            None => {
                self.day_options.clear();
                self.building_options.clear();
                self.major_options.clear();
                self.visible_indices.clear();
            }
        }

        self.load_state = state;
    }

    // -- Filters --

    /// Recompute `visible_indices` after a filter change.
    pub fn refilter(&mut self) {
        self.visible_indices = match self.load_state.dataset() {
            Some(ds) => filtered_indices(ds, &self.filters),
            None => Vec::new(),
        };
    }

    pub fn set_query(&mut self, query: String) {
        self.filters.query = query;
        self.refilter();
    }

    pub fn set_days(&mut self, days: BTreeSet<String>) {
        self.filters.days = days;
        self.refilter();
    }

    pub fn set_building(&mut self, building: Option<String>) {
        self.filters.building = building;
        self.refilter();
    }

    pub fn set_major_restrictions(&mut self, majors: BTreeSet<String>) {
        self.filters.major_restrictions = majors;
        self.refilter();
    }

    pub fn clear_filters(&mut self) {
        self.filters = FilterState::default();
        self.refilter();
    }

    /// Which end-user state the table area is in.
    pub fn view_status(&self) -> ViewStatus {
        match &self.load_state {
            LoadState::NoSourceSelected => ViewStatus::NoSourceSelected,
            LoadState::Loading { .. } => ViewStatus::Loading,
            LoadState::LoadFailed(e) => ViewStatus::Failed(e.to_string()),
            LoadState::EmptyDataset => ViewStatus::EmptyDataset,
            LoadState::Loaded(_) if self.visible_indices.is_empty() => ViewStatus::NoResultsForFilter,
            LoadState::Loaded(_) => ViewStatus::Rows,
        }
    }
}
