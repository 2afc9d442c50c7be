//! Static Chart Renderer
//! Renders the dashboard charts to PNG files with plotters.
//!
//! Output per export:
//! 1. `state_distribution.png` - pie chart of states
//! 2. `type_distribution.png` - pie chart of pollutant types
//! 3. `trend.png` - SO2/NO2 line chart, only when the filtered view has rows

use crate::charts::plotter::{day_number, format_day, trend_segments};
use crate::data::{Distribution, TrendPoint, OTHER_LABEL};
use crate::view::{TrendChart, TrendPanel, ViewModel, STATE_CHART_TITLE, TYPE_CHART_TITLE};
use image::RgbImage;
use plotters::element::Pie;
use plotters::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;

// Colors matching the interactive palette
const SO2: RGBColor = RGBColor(52, 152, 219);
const NO2: RGBColor = RGBColor(231, 76, 60);
const OTHER: RGBColor = RGBColor(149, 165, 166);
const PALETTE: [RGBColor; 10] = [
    RGBColor(52, 152, 219),
    RGBColor(231, 76, 60),
    RGBColor(46, 204, 113),
    RGBColor(155, 89, 182),
    RGBColor(243, 156, 18),
    RGBColor(26, 188, 156),
    RGBColor(233, 30, 99),
    RGBColor(0, 188, 212),
    RGBColor(255, 87, 34),
    RGBColor(121, 85, 72),
];

pub const EXPORT_WIDTH: u32 = 1200;
pub const EXPORT_HEIGHT: u32 = 800;

#[derive(Error, Debug)]
pub enum ChartExportError {
    #[error("Failed to draw chart: {0}")]
    Draw(String),
    #[error("Failed to write image: {0}")]
    Image(#[from] image::ImageError),
    #[error("Failed to create {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Bitmap buffer does not match {0}x{1}")]
    Buffer(u32, u32),
}

fn draw_err<E: std::fmt::Display>(e: E) -> ChartExportError {
    ChartExportError::Draw(e.to_string())
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Write every chart of `view` into `dir`, returning the files created.
    pub fn export_view(view: &ViewModel, dir: &Path) -> Result<Vec<PathBuf>, ChartExportError> {
        std::fs::create_dir_all(dir).map_err(|source| ChartExportError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut written = Vec::new();

        let path = dir.join("state_distribution.png");
        Self::render_pie_chart(
            &view.state_distribution,
            STATE_CHART_TITLE,
            EXPORT_WIDTH,
            EXPORT_HEIGHT,
        )?
        .save(&path)?;
        written.push(path);

        let path = dir.join("type_distribution.png");
        Self::render_pie_chart(
            &view.type_distribution,
            TYPE_CHART_TITLE,
            EXPORT_WIDTH,
            EXPORT_HEIGHT,
        )?
        .save(&path)?;
        written.push(path);

        if let TrendPanel::Chart(chart) = &view.trend {
            let path = dir.join("trend.png");
            Self::render_trend_chart(chart, EXPORT_WIDTH, EXPORT_HEIGHT)?.save(&path)?;
            written.push(path);
        }

        log::info!("Exported {} charts to {}", written.len(), dir.display());
        Ok(written)
    }

    /// Render a pie chart to an RGB image.
    pub fn render_pie_chart(
        distribution: &Distribution,
        title: &str,
        width: u32,
        height: u32,
    ) -> Result<RgbImage, ChartExportError> {
        let mut buffer = vec![255u8; (width * height * 3) as usize];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            root.fill(&WHITE).map_err(draw_err)?;
            root.titled(title, ("sans-serif", 30).into_font().color(&BLACK))
                .map_err(draw_err)?;

            if distribution.is_empty() {
                root.draw(&Text::new(
                    "No Data",
                    (width as i32 / 2 - 40, height as i32 / 2),
                    ("sans-serif", 24).into_font(),
                ))
                .map_err(draw_err)?;
            } else {
                let center = (width as i32 / 2, height as i32 / 2 + 20);
                let radius = f64::from(width.min(height)) * 0.32;
                let sizes: Vec<f64> = distribution.slices.iter().map(|s| s.count as f64).collect();
                let colors: Vec<RGBColor> = distribution
                    .slices
                    .iter()
                    .enumerate()
                    .map(|(idx, s)| slice_color(&s.label, idx))
                    .collect();
                let labels: Vec<&str> = distribution.labels();

                let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
                pie.start_angle(-90.0);
                pie.label_style(("sans-serif", 16).into_font().color(&BLACK));
                pie.percentages(("sans-serif", 14).into_font().color(&WHITE));
                root.draw(&pie).map_err(draw_err)?;
            }

            root.present().map_err(draw_err)?;
        }

        RgbImage::from_raw(width, height, buffer).ok_or(ChartExportError::Buffer(width, height))
    }

    /// Render the SO2/NO2 line chart to an RGB image.
    pub fn render_trend_chart(
        chart: &TrendChart,
        width: u32,
        height: u32,
    ) -> Result<RgbImage, ChartExportError> {
        let (x_range, y_range) = Self::get_ranges(&chart.points);

        let mut buffer = vec![255u8; (width * height * 3) as usize];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            root.fill(&WHITE).map_err(draw_err)?;

            let mut ctx = ChartBuilder::on(&root)
                .caption(&chart.title, ("sans-serif", 26))
                .margin(20)
                .x_label_area_size(45)
                .y_label_area_size(60)
                .build_cartesian_2d(x_range.0..x_range.1, y_range.0..y_range.1)
                .map_err(draw_err)?;

            ctx.configure_mesh()
                .x_desc("date")
                .y_desc("value")
                .x_labels(8)
                .x_label_formatter(&|x| format_day(*x))
                .draw()
                .map_err(draw_err)?;

            let series: [(&str, RGBColor, fn(&TrendPoint) -> Option<f64>); 2] =
                [("so2", SO2, |p| p.so2), ("no2", NO2, |p| p.no2)];

            for (name, color, pick) in series {
                for (idx, segment) in trend_segments(&chart.points, pick).into_iter().enumerate() {
                    let drawn = ctx
                        .draw_series(LineSeries::new(
                            segment.into_iter().map(|[x, y]| (x, y)),
                            color.stroke_width(2),
                        ))
                        .map_err(draw_err)?;
                    // One legend entry per series
                    if idx == 0 {
                        drawn.label(name).legend(move |(x, y)| {
                            PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
                        });
                    }
                }
            }

            ctx.configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()
                .map_err(draw_err)?;

            root.present().map_err(draw_err)?;
        }

        RgbImage::from_raw(width, height, buffer).ok_or(ChartExportError::Buffer(width, height))
    }

    /// Axis ranges with a little padding; degenerate ranges are widened.
    fn get_ranges(points: &[TrendPoint]) -> ((f64, f64), (f64, f64)) {
        let mut x_min = f64::INFINITY;
        let mut x_max = f64::NEG_INFINITY;
        let mut y_min = f64::INFINITY;
        let mut y_max = f64::NEG_INFINITY;

        for p in points {
            let x = day_number(p.date);
            x_min = x_min.min(x);
            x_max = x_max.max(x);
            for v in [p.so2, p.no2].into_iter().flatten() {
                y_min = y_min.min(v);
                y_max = y_max.max(v);
            }
        }

        if x_min.is_infinite() {
            (x_min, x_max) = (0.0, 1.0);
        }
        if x_max - x_min < 1.0 {
            x_min -= 1.0;
            x_max += 1.0;
        }
        if y_min.is_infinite() {
            (y_min, y_max) = (0.0, 1.0);
        }
        let pad = ((y_max - y_min) * 0.1).max(1.0);

        ((x_min, x_max), (y_min - pad, y_max + pad))
    }
}

fn slice_color(label: &str, idx: usize) -> RGBColor {
    if label == OTHER_LABEL {
        OTHER
    } else {
        PALETTE[idx % PALETTE.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn point(day: u32, so2: Option<f64>, no2: Option<f64>) -> TrendPoint {
        TrendPoint {
            date: NaiveDate::from_ymd_opt(2015, 3, day).unwrap(),
            so2,
            no2,
        }
    }

    #[test]
    fn test_ranges_cover_all_values() {
        let points = vec![point(1, Some(4.0), Some(30.0)), point(11, None, Some(50.0))];
        let ((x0, x1), (y0, y1)) = StaticChartRenderer::get_ranges(&points);

        assert_eq!(x1 - x0, 10.0);
        assert!(y0 < 4.0 && y1 > 50.0);
    }

    #[test]
    fn test_ranges_for_single_point_and_no_values() {
        let ((x0, x1), _) = StaticChartRenderer::get_ranges(&[point(5, Some(1.0), None)]);
        assert_eq!(x1 - x0, 2.0);

        let (_, (y0, y1)) = StaticChartRenderer::get_ranges(&[point(5, None, None)]);
        assert!(y0 < 0.0 && y1 > 1.0);

        let ((x0, x1), _) = StaticChartRenderer::get_ranges(&[]);
        assert!(x1 > x0);
    }

    #[test]
    fn test_slice_color_for_other() {
        assert_eq!(slice_color(OTHER_LABEL, 3), OTHER);
        assert_eq!(slice_color("Delhi", 12), PALETTE[2]);
    }
}
