//! Data Viewer Widget
//! Central scrollable panel: caption, filtered table, pie charts and the trend chart.
//! Columns wrap to a single stack when the window is too narrow.

use crate::charts::ChartPlotter;
use crate::view::{TrendPanel, ViewModel, DASHBOARD_TITLE, STATE_CHART_TITLE, TYPE_CHART_TITLE};
use egui::{Color32, RichText, ScrollArea};

const SECTION_SPACING: f32 = 15.0;
const PIE_SIZE: f32 = 240.0;
const TABLE_HEIGHT: f32 = 320.0;
/// Below this width the three top sections are stacked vertically.
const MIN_COLUMNS_WIDTH: f32 = 900.0;

/// Scrollable dashboard body, redrawn from the latest view model.
#[derive(Default)]
pub struct DataViewer {
    view: Option<ViewModel>,
}

impl DataViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_view(&mut self, view: ViewModel) {
        self.view = Some(view);
    }

    pub fn view(&self) -> Option<&ViewModel> {
        self.view.as_ref()
    }

    pub fn show(&self, ui: &mut egui::Ui) {
        let Some(view) = &self.view else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Data").size(20.0));
            });
            return;
        };

        ScrollArea::vertical()
            .id_salt("dashboard_body")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.vertical_centered(|ui| {
                    ui.heading(RichText::new(DASHBOARD_TITLE).size(24.0).strong());
                });
                ui.add_space(SECTION_SPACING);

                if ui.available_width() >= MIN_COLUMNS_WIDTH {
                    ui.columns(3, |columns| {
                        Self::draw_table_card(&mut columns[0], view);
                        ChartPlotter::draw_pie_chart(
                            &mut columns[1],
                            STATE_CHART_TITLE,
                            &view.state_distribution,
                            PIE_SIZE,
                        );
                        ChartPlotter::draw_pie_chart(
                            &mut columns[2],
                            TYPE_CHART_TITLE,
                            &view.type_distribution,
                            PIE_SIZE,
                        );
                    });
                } else {
                    Self::draw_table_card(ui, view);
                    ui.add_space(SECTION_SPACING);
                    ChartPlotter::draw_pie_chart(
                        ui,
                        STATE_CHART_TITLE,
                        &view.state_distribution,
                        PIE_SIZE,
                    );
                    ui.add_space(SECTION_SPACING);
                    ChartPlotter::draw_pie_chart(
                        ui,
                        TYPE_CHART_TITLE,
                        &view.type_distribution,
                        PIE_SIZE,
                    );
                }

                ui.add_space(SECTION_SPACING);
                ui.separator();
                ui.add_space(SECTION_SPACING);

                match &view.trend {
                    TrendPanel::Chart(chart) => ChartPlotter::draw_trend_chart(ui, chart),
                    TrendPanel::NoData(message) => {
                        ui.label(RichText::new(*message).size(14.0).color(Color32::GRAY));
                    }
                }
            });
    }

    /// Caption followed by the filtered rows.
    fn draw_table_card(ui: &mut egui::Ui, view: &ViewModel) {
        ui.label(RichText::new(&view.caption).size(13.0).monospace());
        ui.add_space(8.0);
        ChartPlotter::draw_data_table(ui, &view.table, TABLE_HEIGHT);
    }
}
