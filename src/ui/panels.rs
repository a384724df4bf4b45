use eframe::egui::{self, Color32, RichText, ScrollArea, TextEdit, Ui};

use crate::context::AppContext;
use crate::data::index::IndexState;
use crate::state::AppState;
use crate::ui::select::{DropdownSelect, SelectValue};

/// Where the archived CSV files come from.
const SOURCE_REPO_URL: &str = "https://github.com/keepdying/itu-web-archive";

// ---------------------------------------------------------------------------
// Left side panel – source selection and filter widgets
// ---------------------------------------------------------------------------

/// Render the left panel: source dropdowns, then filters for the loaded table.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Timetable");
            ui.separator();
            source_selectors(ui, state);

            ui.add_space(8.0);
            ui.heading("Filters");
            ui.separator();

            if state.load_state.dataset().is_none() {
                ui.label("No timetable loaded.");
                return;
            }
            filter_controls(ui, state);
        });
}

fn index_message<T>(ui: &mut Ui, index: &IndexState<T>, loading: &str) {
    match index {
        IndexState::Loading => {
            ui.label(loading);
        }
        IndexState::Failed(msg) => {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
        IndexState::Loaded(_) => {}
    }
}

fn source_selectors(ui: &mut Ui, state: &mut AppState) {
    let width = ui.available_width() - 8.0;

    let dates = state.date_options().to_vec();
    let current = SelectValue::Single(Some(state.selected_date.clone()));
    DropdownSelect::new("dates", "Dates", &dates)
        .enabled(!state.dates.is_loading())
        .placeholder("Select a date")
        .width(width)
        .show(ui, &current, |value| {
            if let SelectValue::Single(date) = value {
                state.set_date(date.unwrap_or_default());
            }
        });
    index_message(ui, &state.dates, "Loading dates...");
    ui.add_space(4.0);

    let levels = state.level_options();
    if levels.len() > 1 {
        let current = SelectValue::Single(Some(state.selected_level.clone()));
        DropdownSelect::new("levels", "Level", &levels)
            .width(width)
            .show(ui, &current, |value| {
                if let SelectValue::Single(Some(level)) = value {
                    state.set_level(level);
                }
            });
        ui.add_space(4.0);
    }

    let courses = state.course_options();
    let current = SelectValue::Single(Some(state.selected_course.clone()));
    DropdownSelect::new("courses", "Courses", &courses)
        .enabled(!state.courses.is_loading())
        .placeholder("Select a course")
        .width(width)
        .show(ui, &current, |value| {
            if let SelectValue::Single(course) = value {
                state.set_course(course.unwrap_or_default());
            }
        });
    index_message(ui, &state.courses, "Loading courses...");
}

fn filter_controls(ui: &mut Ui, state: &mut AppState) {
    let width = ui.available_width() - 8.0;

    ui.label("Search");
    let mut query = state.filters.query.clone();
    let response = ui.add(
        TextEdit::singleline(&mut query)
            .hint_text("Search all columns…")
            .desired_width(width),
    );
    if response.changed() {
        state.set_query(query);
    }
    ui.add_space(4.0);

    // Option lists are cloned so the change callbacks may borrow `state`.
    if !state.day_options.is_empty() {
        let options = state.day_options.clone();
        let current = SelectValue::Multi(state.filters.days.clone());
        DropdownSelect::new("days", "Day", &options)
            .clearable(true)
            .placeholder("Any")
            .width(width)
            .show(ui, &current, |value| {
                if let SelectValue::Multi(days) = value {
                    state.set_days(days);
                }
            });
        ui.add_space(4.0);
    }

    if !state.building_options.is_empty() {
        let options = state.building_options.clone();
        let current = SelectValue::Single(state.filters.building.clone());
        DropdownSelect::new("building", "Building", &options)
            .clearable(true)
            .placeholder("Any")
            .width(width)
            .show(ui, &current, |value| {
                if let SelectValue::Single(building) = value {
                    state.set_building(building);
                }
            });
        ui.add_space(4.0);
    }

    if !state.major_options.is_empty() {
        let options = state.major_options.clone();
        let current = SelectValue::Multi(state.filters.major_restrictions.clone());
        DropdownSelect::new("majors", "Major Restriction", &options)
            .clearable(true)
            .placeholder("Any")
            .width(width)
            .show(ui, &current, |value| {
                if let SelectValue::Multi(majors) = value {
                    state.set_major_restrictions(majors);
                }
            });
        ui.add_space(4.0);
    }

    ui.add_space(4.0);
    if ui
        .add_enabled(!state.filters.is_empty(), egui::Button::new("Clear filters"))
        .clicked()
    {
        state.clear_filters();
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the title bar. Returns `true` when the theme setting changed.
pub fn top_bar(ui: &mut Ui, state: &AppState, context: &mut AppContext) -> bool {
    let mut theme_changed = false;

    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.heading("ITU Web Archive");
        ui.separator();

        if state.load_state.is_loading() {
            ui.spinner();
        }
        if let Some(ds) = state.load_state.dataset() {
            ui.label(format!(
                "{} rows loaded, {} visible",
                ds.len(),
                state.visible_indices.len()
            ));
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui: &mut Ui| {
            let theme = context.theme;
            if ui
                .button(theme.icon())
                .on_hover_text(theme.toggle_hint())
                .clicked()
            {
                let next = context.cycle_theme();
                log::info!("Theme switched to {next}");
                theme_changed = true;
            }
        });
    });

    theme_changed
}

// ---------------------------------------------------------------------------
// Footer
// ---------------------------------------------------------------------------

pub fn footer(ui: &mut Ui) {
    ui.horizontal(|ui: &mut Ui| {
        ui.weak("Archived ITU course schedules.");
        ui.hyperlink_to("Source data", SOURCE_REPO_URL);
    });
}
