//! GUI module - User interface components

mod app;
mod data_viewer;
mod selection_panel;

pub use app::DashboardApp;
pub use data_viewer::DataViewer;
pub use selection_panel::{SelectionPanel, SelectionPanelAction};
