//! Browser for archived ITU course timetables.
//!
//! The `data` layer is UI-independent: it fetches a timetable CSV, derives
//! the filter choices, and computes the visible rows. `state` ties it to the
//! source selection, and `app` / `ui` render it with egui.

pub mod app;
pub mod config;
pub mod context;
pub mod data;
pub mod state;
pub mod ui;
