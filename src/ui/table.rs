use eframe::egui::{self, Align, Layout, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::{columns, Row, PLACEHOLDER};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Cell mapping
// ---------------------------------------------------------------------------

/// A displayable cell. Placeholder cells are shown de-emphasised, never hidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell<'a> {
    pub text: &'a str,
    pub placeholder: bool,
}

/// Map the cell at `index` of `row`; a short row yields an empty cell.
pub fn cell(row: &Row, index: usize) -> Cell<'_> {
    let text = row.get(index).unwrap_or("");
    Cell {
        text,
        placeholder: text == PLACEHOLDER,
    }
}

/// Width class of a column, by header name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnWidth {
    Narrow,
    Normal,
    Wide,
}

pub fn column_width(name: &str) -> ColumnWidth {
    match name {
        columns::COURSE_TITLE | columns::INSTRUCTOR | columns::MAJOR_RESTRICTION => ColumnWidth::Wide,
        columns::CRN | columns::CAPACITY | columns::ENROLLED | columns::CREDIT | "" => {
            ColumnWidth::Narrow
        }
        _ => ColumnWidth::Normal,
    }
}

fn column_spec(name: &str) -> Column {
    let column = match column_width(name) {
        ColumnWidth::Narrow => Column::initial(70.0).at_least(40.0),
        ColumnWidth::Normal => Column::initial(110.0).at_least(60.0),
        ColumnWidth::Wide => Column::initial(240.0).at_least(120.0),
    };
    column.clip(true)
}

// ---------------------------------------------------------------------------
// Timetable (central panel)
// ---------------------------------------------------------------------------

/// Render the filtered timetable, or the status line when there are no rows.
pub fn timetable(ui: &mut Ui, state: &AppState) {
    if let Some(message) = state.view_status().message() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading(message);
        });
        return;
    }

    let Some(dataset) = state.load_state.dataset() else {
        return;
    };

    let row_height = egui::TextStyle::Body.resolve(ui.style()).size + 8.0;
    let visible = &state.visible_indices;

    // Column widths are remembered per source, not carried across files.
    ui.push_id(state.csv_url(), |ui: &mut Ui| {
        let mut table = TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .cell_layout(Layout::left_to_right(Align::Center))
            .min_scrolled_height(0.0);
        for name in &dataset.columns {
            table = table.column(column_spec(name));
        }

        table
            .header(row_height + 4.0, |mut header| {
                for name in &dataset.columns {
                    header.col(|ui: &mut Ui| {
                        ui.strong(name);
                    });
                }
            })
            .body(|body| {
                body.rows(row_height, visible.len(), |mut table_row| {
                    let row = &dataset.rows[visible[table_row.index()]];
                    for (idx, name) in dataset.columns.iter().enumerate() {
                        let shown = cell(row, idx);
                        table_row.col(|ui: &mut Ui| {
                            if shown.placeholder {
                                ui.weak(shown.text);
                            } else if column_width(name) == ColumnWidth::Wide {
                                ui.add(egui::Label::new(shown.text).truncate());
                            } else {
                                ui.label(RichText::new(shown.text));
                            }
                        });
                    }
                });
            });
    });
}
