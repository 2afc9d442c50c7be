//! Chart Plotter Module
//! Draws the interactive pie charts, SO2/NO2 line chart and data grid with egui.

use crate::data::{Distribution, TrendPoint, OTHER_LABEL};
use crate::view::{DisplayTable, TrendChart};
use chrono::{Datelike, NaiveDate};
use egui::{Color32, RichText, ScrollArea, Sense, Shape, Stroke};
use egui_plot::{Legend, Line, Plot, PlotPoints};
use std::f32::consts::TAU;

/// Color of the merged "Other" slice
pub const OTHER_COLOR: Color32 = Color32::from_rgb(149, 165, 166);

pub const SO2_COLOR: Color32 = Color32::from_rgb(52, 152, 219); // Blue
pub const NO2_COLOR: Color32 = Color32::from_rgb(231, 76, 60); // Red

pub const PALETTE: [Color32; 10] = [
    Color32::from_rgb(52, 152, 219), // Blue
    Color32::from_rgb(231, 76, 60),  // Red
    Color32::from_rgb(46, 204, 113), // Green
    Color32::from_rgb(155, 89, 182), // Purple
    Color32::from_rgb(243, 156, 18), // Orange
    Color32::from_rgb(26, 188, 156), // Teal
    Color32::from_rgb(233, 30, 99),  // Pink
    Color32::from_rgb(0, 188, 212),  // Cyan
    Color32::from_rgb(255, 87, 34),  // Deep Orange
    Color32::from_rgb(121, 85, 72),  // Brown
];

/// Radians covered by one triangle of a pie slice.
const SLICE_STEP: f32 = 0.04;
const TABLE_ROW_HEIGHT: f32 = 18.0;

/// Creates the dashboard charts using egui and egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Get color for a slice.
    pub fn get_slice_color(label: &str, index: usize) -> Color32 {
        if label == OTHER_LABEL {
            OTHER_COLOR
        } else {
            PALETTE[index % PALETTE.len()]
        }
    }

    /// Draw a pie chart with a legend below it.
    /// Slices start at twelve o'clock and run clockwise, largest first.
    pub fn draw_pie_chart(ui: &mut egui::Ui, title: &str, distribution: &Distribution, size: f32) {
        ui.label(RichText::new(title).size(14.0).strong());
        ui.add_space(5.0);

        if distribution.is_empty() {
            ui.label(RichText::new("No Data").color(Color32::GRAY));
            return;
        }

        let (rect, response) = ui.allocate_exact_size(egui::vec2(size, size), Sense::hover());
        let painter = ui.painter_at(rect);
        let center = rect.center();
        let radius = size * 0.45;

        let mut start = -TAU / 4.0;
        let mut hovered: Option<usize> = None;
        let hover_pos = response.hover_pos();

        for (idx, slice) in distribution.slices.iter().enumerate() {
            let span = slice.frequency as f32 * TAU;
            let color = Self::get_slice_color(&slice.label, idx);
            let steps = ((span / SLICE_STEP).ceil() as usize).max(1);

            for step in 0..steps {
                let a0 = start + span * step as f32 / steps as f32;
                let a1 = start + span * (step + 1) as f32 / steps as f32;
                let p0 = center + radius * egui::vec2(a0.cos(), a0.sin());
                let p1 = center + radius * egui::vec2(a1.cos(), a1.sin());
                painter.add(Shape::convex_polygon(vec![center, p0, p1], color, Stroke::NONE));
            }

            if let Some(pos) = hover_pos {
                if Self::angle_in_slice(pos - center, radius, start, span) {
                    hovered = Some(idx);
                }
            }
            start += span;
        }

        if let Some(idx) = hovered {
            let slice = &distribution.slices[idx];
            response.on_hover_text(format!(
                "{}: {} ({:.1}%)",
                slice.label,
                slice.count,
                slice.frequency * 100.0
            ));
        }

        ui.add_space(5.0);
        Self::draw_legend(ui, distribution);
    }

    fn angle_in_slice(offset: egui::Vec2, radius: f32, start: f32, span: f32) -> bool {
        if offset.length() > radius {
            return false;
        }
        // Normalize into [start, start + TAU)
        let mut angle = offset.y.atan2(offset.x);
        while angle < start {
            angle += TAU;
        }
        while angle >= start + TAU {
            angle -= TAU;
        }
        angle < start + span
    }

    fn draw_legend(ui: &mut egui::Ui, distribution: &Distribution) {
        egui::Grid::new(ui.make_persistent_id(format!("legend_{}", distribution.column)))
            .spacing([8.0, 2.0])
            .show(ui, |ui| {
                for (idx, slice) in distribution.slices.iter().enumerate() {
                    let color = Self::get_slice_color(&slice.label, idx);
                    ui.horizontal(|ui| {
                        let (rect, _) =
                            ui.allocate_exact_size(egui::vec2(12.0, 12.0), Sense::hover());
                        ui.painter().rect_filled(rect, 2.0, color);
                        ui.label(RichText::new(&slice.label).size(12.0));
                    });
                    ui.label(RichText::new(format!("{:.1}%", slice.frequency * 100.0)).size(12.0));
                    ui.end_row();
                }
            });
    }

    /// Draw SO2 and NO2 against date.
    pub fn draw_trend_chart(ui: &mut egui::Ui, chart: &TrendChart) {
        ui.label(RichText::new(&chart.title).size(14.0).strong());
        ui.add_space(5.0);

        Plot::new("trend_chart")
            .height(320.0)
            .legend(Legend::default())
            .allow_scroll(false)
            .x_axis_label("date")
            .y_axis_label("value")
            .x_axis_formatter(|mark, _range| format_day(mark.value))
            .label_formatter(|name, value| {
                if name.is_empty() {
                    format!("{}\n{:.2}", format_day(value.x), value.y)
                } else {
                    format!("{}\n{}: {:.2}", format_day(value.x), name, value.y)
                }
            })
            .show(ui, |plot_ui| {
                let series: [(&str, Color32, fn(&TrendPoint) -> Option<f64>); 2] =
                    [("so2", SO2_COLOR, |p| p.so2), ("no2", NO2_COLOR, |p| p.no2)];

                for (name, color, pick) in series {
                    for segment in trend_segments(&chart.points, pick) {
                        plot_ui.line(
                            Line::new(PlotPoints::from(segment))
                                .color(color)
                                .width(1.5)
                                .name(name),
                        );
                    }
                }
            });
    }

    /// Draw the filtered rows as a striped grid. Only visible rows are laid out.
    pub fn draw_data_table(ui: &mut egui::Ui, table: &DisplayTable, max_height: f32) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.label(
                    RichText::new(format!("{} rows", table.rows.len()))
                        .size(11.0)
                        .color(Color32::GRAY),
                );

                ScrollArea::both()
                    .id_salt("data_table")
                    .max_height(max_height)
                    .auto_shrink([false, true])
                    .show_rows(ui, TABLE_ROW_HEIGHT, table.rows.len(), |ui, row_range| {
                        egui::Grid::new("data_table_grid")
                            .striped(true)
                            .min_col_width(70.0)
                            .spacing([12.0, 4.0])
                            .show(ui, |ui| {
                                // Headers
                                for header in &table.headers {
                                    ui.label(RichText::new(header).strong().size(12.0));
                                }
                                ui.end_row();

                                // Header stays on top of whichever rows are visible
                                for row in &table.rows[row_range] {
                                    for cell in row {
                                        ui.label(RichText::new(cell).size(12.0));
                                    }
                                    ui.end_row();
                                }
                            });
                    });
            });
    }
}

/// X coordinate used for a date on the line chart.
pub fn day_number(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

/// Inverse of [`day_number`], formatted for axis labels.
pub fn format_day(value: f64) -> String {
    NaiveDate::from_num_days_from_ce_opt(value.round() as i32)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Split a series into runs of consecutive present values so gaps stay visible.
pub fn trend_segments(
    points: &[TrendPoint],
    pick: fn(&TrendPoint) -> Option<f64>,
) -> Vec<Vec<[f64; 2]>> {
    let mut segments = Vec::new();
    let mut current: Vec<[f64; 2]> = Vec::new();

    for point in points {
        match pick(point) {
            Some(value) => current.push([day_number(point.date), value]),
            None => {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }

    segments
}
