//! Air Quality Dashboard Main Application
//! Main window with the selection panel and the dashboard body.

use crate::charts::StaticChartRenderer;
use crate::data::Selection;
use crate::gui::{DataViewer, SelectionPanel, SelectionPanelAction};
use crate::view::Dashboard;
use egui::SidePanel;

/// Main application window.
pub struct DashboardApp {
    dashboard: Dashboard,
    /// `None` only when the table has no rows.
    selection: Option<Selection>,
    selection_panel: SelectionPanel,
    data_viewer: DataViewer,
}

impl DashboardApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, dashboard: Dashboard) -> Self {
        let selection = Selection::initial(dashboard.table());

        let mut selection_panel = SelectionPanel::new();
        selection_panel.update_options(dashboard.table(), selection.as_ref());

        let mut app = Self {
            dashboard,
            selection,
            selection_panel,
            data_viewer: DataViewer::new(),
        };
        app.refresh_view();
        app
    }

    /// Re-run the pipeline for the current selection.
    fn refresh_view(&mut self) {
        if let Some(selection) = &self.selection {
            let view = self.dashboard.render(selection);
            log::debug!(
                "Rendered {} rows for {}/{}",
                view.table.rows.len(),
                selection.month,
                selection.year
            );
            if !view.has_data() {
                log::debug!("No readings match the current selection");
            }
            self.data_viewer.set_view(view);
        }
    }

    /// Location options depend on the state, so rebuild them first.
    fn handle_state_changed(&mut self) {
        let Some(selection) = self.selection.as_mut() else {
            return;
        };
        let table = self.dashboard.table();
        if selection.reconcile(table) {
            log::debug!("Location reset to {}", selection.location);
        }
        self.selection_panel.update_locations(table, &selection.state);
        self.refresh_view();
    }

    /// Ask for a folder and write the current charts there as PNG.
    fn handle_export_charts(&mut self) {
        let Some(view) = self.data_viewer.view() else {
            self.selection_panel.set_status("No charts to export");
            return;
        };

        let Some(dir) = rfd::FileDialog::new().pick_folder() else {
            return; // User cancelled
        };

        match StaticChartRenderer::export_view(view, &dir) {
            Ok(files) => {
                self.selection_panel
                    .set_status(&format!("Exported {} charts", files.len()));
            }
            Err(e) => {
                log::error!("Chart export failed: {e}");
                self.selection_panel.set_status(&format!("Error: {e}"));
            }
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Left panel - Selection Panel
        SidePanel::left("selection_panel")
            .min_width(300.0)
            .max_width(350.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.selection_panel.show(ui, self.selection.as_mut());

                    match action {
                        SelectionPanelAction::StateChanged => self.handle_state_changed(),
                        SelectionPanelAction::SelectionChanged => self.refresh_view(),
                        SelectionPanelAction::ExportCharts => self.handle_export_charts(),
                        SelectionPanelAction::None => {}
                    }
                });
            });

        // Central panel - Dashboard
        egui::CentralPanel::default().show(ctx, |ui| {
            self.data_viewer.show(ui);
        });
    }
}
