use std::collections::BTreeSet;

use eframe::egui::{self, Ui};

use crate::data::classify::SelectOption;

/// Current value of a dropdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectValue {
    Single(Option<String>),
    Multi(BTreeSet<String>),
}

impl SelectValue {
    /// Text shown on the closed dropdown.
    fn summary(&self, options: &[SelectOption], placeholder: &str) -> String {
        let label_of = |value: &str| {
            options
                .iter()
                .find(|o| o.value == value)
                .map(|o| o.label.clone())
                .unwrap_or_else(|| value.to_string())
        };
        match self {
            SelectValue::Single(Some(v)) if !v.is_empty() => label_of(v.as_str()),
            SelectValue::Multi(set) if !set.is_empty() => {
                set.iter().map(|v| label_of(v.as_str())).collect::<Vec<_>>().join(", ")
            }
            _ => placeholder.to_string(),
        }
    }

    /// Value after the user picks `option` (toggled in multi mode).
    fn pick(&self, option: &str) -> SelectValue {
        match self {
            SelectValue::Single(_) => SelectValue::Single(Some(option.to_string())),
            SelectValue::Multi(set) => {
                let mut set = set.clone();
                if !set.remove(option) {
                    set.insert(option.to_string());
                }
                SelectValue::Multi(set)
            }
        }
    }

    fn cleared(&self) -> SelectValue {
        match self {
            SelectValue::Single(_) => SelectValue::Single(None),
            SelectValue::Multi(_) => SelectValue::Multi(BTreeSet::new()),
        }
    }

    fn is_selected(&self, option: &str) -> bool {
        match self {
            SelectValue::Single(v) => v.as_deref() == Some(option),
            SelectValue::Multi(set) => set.contains(option),
        }
    }

    /// Multi-select popups stay open while options are toggled.
    fn close_behavior(&self) -> egui::PopupCloseBehavior {
        match self {
            SelectValue::Single(_) => egui::PopupCloseBehavior::CloseOnClick,
            SelectValue::Multi(_) => egui::PopupCloseBehavior::CloseOnClickOutside,
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            SelectValue::Single(v) => v.as_deref().map_or(true, str::is_empty),
            SelectValue::Multi(set) => set.is_empty(),
        }
    }
}

// ---------------------------------------------------------------------------
// Dropdown widget
// ---------------------------------------------------------------------------

/// Labelled dropdown over a `{label, value}` option list. Single or multi
/// select is decided by the [`SelectValue`] passed to [`show`](Self::show).
pub struct DropdownSelect<'a> {
    id: &'a str,
    label: &'a str,
    options: &'a [SelectOption],
    enabled: bool,
    clearable: bool,
    placeholder: &'a str,
    width: f32,
}

impl<'a> DropdownSelect<'a> {
    pub fn new(id: &'a str, label: &'a str, options: &'a [SelectOption]) -> Self {
        Self {
            id,
            label,
            options,
            enabled: true,
            clearable: false,
            placeholder: "",
            width: 200.0,
        }
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Offer an entry that resets the selection.
    pub fn clearable(mut self, clearable: bool) -> Self {
        self.clearable = clearable;
        self
    }

    pub fn placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = placeholder;
        self
    }

    pub fn width(mut self, width: f32) -> Self {
        self.width = width;
        self
    }

    /// Render the dropdown; `on_change` runs once with the new value when the
    /// user changes it.
    pub fn show(self, ui: &mut Ui, value: &SelectValue, on_change: impl FnOnce(SelectValue)) {
        let mut changed: Option<SelectValue> = None;

        ui.add_enabled_ui(self.enabled && !self.options.is_empty(), |ui: &mut Ui| {
            ui.vertical(|ui: &mut Ui| {
                ui.label(self.label);
                egui::ComboBox::from_id_salt(self.id)
                    .selected_text(value.summary(self.options, self.placeholder))
                    .width(self.width)
                    .close_behavior(value.close_behavior())
                    .show_ui(ui, |ui: &mut Ui| {
                        if self.clearable && ui.selectable_label(value.is_empty(), "Any").clicked() {
                            changed = Some(value.cleared());
                        }
                        for option in self.options {
                            let selected = value.is_selected(&option.value);
                            let clicked = match value {
                                SelectValue::Single(_) => {
                                    ui.selectable_label(selected, &option.label).clicked()
                                }
                                SelectValue::Multi(_) => {
                                    let mut checked = selected;
                                    ui.checkbox(&mut checked, &option.label).changed()
                                }
                            };
                            if clicked {
                                changed = Some(value.pick(&option.value));
                            }
                        }
                    });
            });
        });

        if let Some(new_value) = changed {
            if new_value != *value {
                on_change(new_value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> Vec<SelectOption> {
        vec![
            SelectOption {
                label: "Undergraduate".into(),
                value: "LS".into(),
            },
            SelectOption::same("LU"),
        ]
    }

    #[test]
    fn summary_uses_labels() {
        let opts = options();
        assert_eq!(
            SelectValue::Single(Some("LS".into())).summary(&opts, "Select"),
            "Undergraduate"
        );
        assert_eq!(SelectValue::Single(None).summary(&opts, "Select"), "Select");

        let both = SelectValue::Multi(["LS".to_string(), "LU".to_string()].into());
        assert_eq!(both.summary(&opts, "Any"), "Undergraduate, LU");
    }

    #[test]
    fn multi_pick_toggles() {
        let empty = SelectValue::Multi(BTreeSet::new());
        let one = empty.pick("Mon");
        assert!(one.is_selected("Mon"));
        assert!(one.pick("Mon").is_empty());
    }

    #[test]
    fn single_pick_replaces_and_clear_resets() {
        let value = SelectValue::Single(Some("A".into())).pick("B");
        assert_eq!(value, SelectValue::Single(Some("B".into())));
        assert!(value.cleared().is_empty());
        assert!(SelectValue::Single(Some(String::new())).is_empty());
    }

    #[test]
    fn multi_select_popup_survives_toggles() {
        assert!(matches!(
            SelectValue::Multi(BTreeSet::new()).close_behavior(),
            egui::PopupCloseBehavior::CloseOnClickOutside
        ));
        assert!(matches!(
            SelectValue::Single(None).close_behavior(),
            egui::PopupCloseBehavior::CloseOnClick
        ));
    }
}
