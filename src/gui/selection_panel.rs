//! Selection Panel Widget
//! Left side panel with the state, location, type, year and month selectors.

use crate::data::{CanonicalTable, Choice, Selection};
use egui::{Color32, ComboBox, RichText};
use std::fmt::Display;

/// Options offered by each selector, refreshed from the canonical table.
#[derive(Default, Clone)]
pub struct SelectorOptions {
    pub states: Vec<String>,
    pub locations: Vec<String>,
    pub pollutant_types: Vec<String>,
    pub years: Vec<Choice<i32>>,
    pub months: Vec<Choice<u32>>,
}

impl SelectorOptions {
    pub fn from_table(table: &CanonicalTable, state: &str) -> Self {
        Self {
            states: table.states(),
            locations: table.locations_for(state),
            pollutant_types: table.pollutant_types(),
            years: table.year_choices(),
            months: table.month_choices(),
        }
    }
}

/// Left side panel with the filter selectors and export controls.
pub struct SelectionPanel {
    pub options: SelectorOptions,
    pub row_count: usize,
    pub status: String,
}

impl Default for SelectionPanel {
    fn default() -> Self {
        Self {
            options: SelectorOptions::default(),
            row_count: 0,
            status: "Ready".to_string(),
        }
    }
}

impl SelectionPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill every selector from a freshly loaded table.
    pub fn update_options(&mut self, table: &CanonicalTable, selection: Option<&Selection>) {
        let state = selection.map(|s| s.state.as_str()).unwrap_or_default();
        self.options = SelectorOptions::from_table(table, state);
        self.row_count = table.len();
    }

    /// Refresh the location list after the state changed.
    pub fn update_locations(&mut self, table: &CanonicalTable, state: &str) {
        self.options.locations = table.locations_for(state);
    }

    /// Draw the panel, editing `selection` in place.
    pub fn show(&mut self, ui: &mut egui::Ui, selection: Option<&mut Selection>) -> SelectionPanelAction {
        let mut action = SelectionPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("🌫 Air Quality")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(
                RichText::new(format!("{} readings", self.row_count))
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        let Some(selection) = selection else {
            ui.label(RichText::new("No data loaded").color(Color32::GRAY));
            return action;
        };

        // ===== Place Section =====
        ui.label(RichText::new("📍 Place").size(14.0).strong());
        ui.add_space(5.0);

        if Self::selector(ui, "Select a State", "state", &mut selection.state, &self.options.states) {
            action = SelectionPanelAction::StateChanged;
        }
        if Self::selector(
            ui,
            "Select a Location",
            "location",
            &mut selection.location,
            &self.options.locations,
        ) {
            action = action.or(SelectionPanelAction::SelectionChanged);
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Reading Section =====
        ui.label(RichText::new("🔧 Reading").size(14.0).strong());
        ui.add_space(5.0);

        if Self::selector(
            ui,
            "Select Type",
            "pollutant_type",
            &mut selection.pollutant_type,
            &self.options.pollutant_types,
        ) {
            action = action.or(SelectionPanelAction::SelectionChanged);
        }
        if Self::selector(ui, "Select Year", "year", &mut selection.year, &self.options.years) {
            action = action.or(SelectionPanelAction::SelectionChanged);
        }
        if Self::selector(ui, "Select Month", "month", &mut selection.month, &self.options.months) {
            action = action.or(SelectionPanelAction::SelectionChanged);
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Action Buttons =====
        ui.vertical_centered(|ui| {
            let button = egui::Button::new(RichText::new("🖼 Export Charts").size(14.0))
                .min_size(egui::vec2(150.0, 30.0));
            if ui.add(button).clicked() {
                action = SelectionPanelAction::ExportCharts;
            }
        });

        ui.add_space(10.0);

        let status_color = if self.status.starts_with("Error") {
            Color32::from_rgb(220, 53, 69)
        } else if self.status.starts_with("Exported") {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }

    /// Labeled combo box. Returns true when the value changed.
    fn selector<T: Clone + PartialEq + Display>(
        ui: &mut egui::Ui,
        label: &str,
        id: &str,
        current: &mut T,
        options: &[T],
    ) -> bool {
        let label_width = 110.0;
        let combo_width = 150.0;
        let mut changed = false;

        ui.horizontal(|ui| {
            ui.add_sized([label_width, 20.0], egui::Label::new(label));
            ComboBox::from_id_salt(id)
                .width(combo_width)
                .selected_text(current.to_string())
                .show_ui(ui, |ui| {
                    for option in options {
                        let selected = *current == *option;
                        if ui.selectable_label(selected, option.to_string()).clicked() && !selected {
                            *current = option.clone();
                            changed = true;
                        }
                    }
                });
        });
        ui.add_space(5.0);

        changed
    }

    /// Set status line
    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }
}

/// Actions triggered by the selection panel
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionPanelAction {
    None,
    StateChanged,
    SelectionChanged,
    ExportCharts,
}

impl SelectionPanelAction {
    /// Keep the more specific of two actions from the same frame.
    fn or(self, other: SelectionPanelAction) -> SelectionPanelAction {
        match self {
            SelectionPanelAction::None => other,
            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Reading;
    use chrono::NaiveDate;

    #[test]
    fn test_options_from_table() {
        let date = NaiveDate::from_ymd_opt(2001, 4, 1).unwrap();
        let table = CanonicalTable::from_readings(vec![
            Reading::new("Goa", "Panaji", "RSPM", date, None, None),
            Reading::new("Delhi", "Shahdara", "Residential", date, None, None),
        ]);

        let mut panel = SelectionPanel::new();
        let selection = Selection::initial(&table).unwrap();
        panel.update_options(&table, Some(&selection));

        assert_eq!(panel.options.states, vec!["Goa", "Delhi"]);
        assert_eq!(panel.options.locations, vec!["Panaji"]);
        assert_eq!(panel.options.years, vec![Choice::All, Choice::Only(2001)]);
        assert_eq!(panel.row_count, 2);

        panel.update_locations(&table, "Delhi");
        assert_eq!(panel.options.locations, vec!["Shahdara"]);
    }

    #[test]
    fn test_state_change_wins_over_other_changes() {
        use SelectionPanelAction as A;
        assert_eq!(A::StateChanged.or(A::SelectionChanged), A::StateChanged);
        assert_eq!(A::None.or(A::SelectionChanged), A::SelectionChanged);
        assert_eq!(A::None.or(A::None), A::None);
    }
}
