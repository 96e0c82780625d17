#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Line chart of monthly average temperatures across the five series
//! slots, rendered to PNG and returned as base64.
//!
//! Only unset months are gaps in a line. A monthly average of exactly
//! `0.0` is a real value and is plotted at zero.

pub mod fonts;

use std::io::Cursor;
use std::ops::Range;
use std::path::PathBuf;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::{ImageFormat, RgbImage};
use plotters::coord::Shift;
use plotters::coord::types::{RangedCoordf64, RangedCoordi32};
use plotters::prelude::*;
use weather_compare_weather_models::{MonthlySeries, SeriesSlot};

use crate::fonts::FONT_FAMILY;

const TITLE: &str = "年度別 月平均気温の比較";
const X_LABEL: &str = "月";
const Y_LABEL: &str = "平均気温 (°C)";

const LINE_WIDTH: u32 = 3;
const MARKER_SIZE: i32 = 6;

/// Padding added above and below the data range, in degrees.
const Y_PADDING: f64 = 2.0;

/// Y range used when no series has any value.
const EMPTY_Y_RANGE: Range<f64> = 0.0..30.0;

type Chart<'a, 'b> = ChartContext<'a, BitMapBackend<'b>, Cartesian2d<RangedCoordi32, RangedCoordf64>>;

/// Errors that can occur while rendering a chart.
#[derive(Debug, thiserror::Error)]
pub enum ChartError {
    /// Drawing onto the bitmap failed.
    #[error("Drawing failed: {0}")]
    Drawing(String),

    /// PNG encoding failed.
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

fn drawing_error(e: impl std::fmt::Display) -> ChartError {
    ChartError::Drawing(e.to_string())
}

/// Output size and fonts for [`ChartRenderer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartConfig {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Font files tried in order.
    pub font_candidates: Vec<PathBuf>,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 1440,
            height: 720,
            font_candidates: fonts::default_candidates(),
        }
    }
}

impl ChartConfig {
    /// Puts `path` ahead of the default font candidates.
    #[must_use]
    pub fn with_font_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.font_candidates.insert(0, path.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    Circle,
    Square,
    Triangle,
    Diamond,
    Cross,
}

#[derive(Debug, Clone, Copy)]
struct SeriesStyle {
    color: RGBColor,
    marker: Marker,
}

impl SeriesStyle {
    const fn for_slot(slot: SeriesSlot) -> Self {
        let (color, marker) = match slot {
            SeriesSlot::Current => (RGBColor(0xFF, 0x6B, 0x6B), Marker::Circle),
            SeriesSlot::TenYearsAgo => (RGBColor(0x4E, 0xCD, 0xC4), Marker::Square),
            SeriesSlot::TwentyYearsAgo => (RGBColor(0x45, 0xB7, 0xD1), Marker::Triangle),
            SeriesSlot::ThirtyYearsAgo => (RGBColor(0xFF, 0xA0, 0x7A), Marker::Diamond),
            SeriesSlot::FortyYearsAgo => (RGBColor(0x98, 0xD8, 0xC8), Marker::Cross),
        };
        Self { color, marker }
    }
}

/// Renders [`MonthlySeries`] into a base64-encoded PNG line chart.
#[derive(Debug, Clone, Default)]
pub struct ChartRenderer {
    config: ChartConfig,
}

impl ChartRenderer {
    /// Creates a renderer.
    #[must_use]
    pub const fn new(config: ChartConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration this renderer was built with.
    #[must_use]
    pub const fn config(&self) -> &ChartConfig {
        &self.config
    }

    /// Renders the chart and returns the PNG as standard base64.
    ///
    /// Series with no values are left out; a chart with no values at all
    /// is still produced.
    ///
    /// # Errors
    ///
    /// Returns [`ChartError`] if drawing or PNG encoding fails.
    pub fn render(&self, series: &[MonthlySeries], current_year: i32) -> Result<String, ChartError> {
        let png = self.render_png(series, current_year)?;
        Ok(STANDARD.encode(png))
    }

    /// Renders the chart and returns the raw PNG bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ChartError`] if drawing or PNG encoding fails.
    pub fn render_png(&self, series: &[MonthlySeries], current_year: i32) -> Result<Vec<u8>, ChartError> {
        let with_text = fonts::ensure_font(&self.config.font_candidates);
        let (width, height) = (self.config.width, self.config.height);
        let mut buffer = vec![0u8; width as usize * height as usize * 3];

        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            draw(&root, series, current_year, with_text)?;
            root.present().map_err(drawing_error)?;
        }

        let image = RgbImage::from_raw(width, height, buffer)
            .ok_or_else(|| ChartError::Drawing("pixel buffer does not match chart size".to_owned()))?;

        let mut png = Vec::new();
        image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

        log::debug!("Rendered {width}x{height} chart ({} bytes)", png.len());

        Ok(png)
    }
}

fn draw(
    root: &DrawingArea<BitMapBackend<'_>, Shift>,
    series: &[MonthlySeries],
    current_year: i32,
    with_text: bool,
) -> Result<(), ChartError> {
    root.fill(&WHITE).map_err(drawing_error)?;

    let mut builder = ChartBuilder::on(root);
    builder.margin(24);
    if with_text {
        builder
            .caption(TITLE, (FONT_FAMILY, 32))
            .x_label_area_size(60)
            .y_label_area_size(80);
    }

    let mut chart = builder
        .build_cartesian_2d(0i32..13, value_range(series))
        .map_err(drawing_error)?;

    if with_text {
        chart
            .configure_mesh()
            .x_labels(14)
            .x_label_formatter(&|m: &i32| month_label(*m))
            .x_desc(X_LABEL)
            .y_desc(Y_LABEL)
            .label_style((FONT_FAMILY, 16))
            .axis_desc_style((FONT_FAMILY, 20))
            .draw()
            .map_err(drawing_error)?;
    }

    let mut drawn = 0;
    for entry in series.iter().filter(|s| !s.is_empty()) {
        draw_series(&mut chart, entry, &entry.slot.label(current_year))?;
        drawn += 1;
    }

    if with_text && drawn > 0 {
        chart
            .configure_series_labels()
            .label_font((FONT_FAMILY, 16))
            .background_style(WHITE.mix(0.85))
            .border_style(BLACK)
            .position(SeriesLabelPosition::UpperRight)
            .draw()
            .map_err(drawing_error)?;
    }

    Ok(())
}

fn draw_series(chart: &mut Chart<'_, '_>, entry: &MonthlySeries, label: &str) -> Result<(), ChartError> {
    let SeriesStyle { color, marker } = SeriesStyle::for_slot(entry.slot);
    let line = color.stroke_width(LINE_WIDTH);

    for (i, segment) in segments(entry).into_iter().enumerate() {
        let annotation = chart
            .draw_series(LineSeries::new(segment, line))
            .map_err(drawing_error)?;

        if i == 0 {
            annotation
                .label(label)
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 24, y)], line));
        }
    }

    let points: Vec<(i32, f64)> = entry
        .points()
        .filter_map(|(month, value)| i32::try_from(month).ok().map(|m| (m, value)))
        .collect();

    draw_markers(chart, &points, color, marker)
}

fn draw_markers(
    chart: &mut Chart<'_, '_>,
    points: &[(i32, f64)],
    color: RGBColor,
    marker: Marker,
) -> Result<(), ChartError> {
    let fill = color.filled();
    let points = points.iter().copied();
    let s = MARKER_SIZE;

    match marker {
        Marker::Circle => chart.draw_series(points.map(|p| Circle::new(p, s, fill))),
        Marker::Square => chart.draw_series(
            points.map(|p| EmptyElement::at(p) + Rectangle::new([(-s, -s), (s, s)], fill)),
        ),
        Marker::Triangle => chart.draw_series(points.map(|p| TriangleMarker::new(p, s, fill))),
        Marker::Diamond => chart.draw_series(points.map(|p| {
            EmptyElement::at(p) + Polygon::new(vec![(0, -s), (s, 0), (0, s), (-s, 0)], fill)
        })),
        Marker::Cross => {
            chart.draw_series(points.map(|p| Cross::new(p, s, color.stroke_width(2))))
        }
    }
    .map(|_| ())
    .map_err(drawing_error)
}

/// Splits a series into runs of consecutive months with values.
fn segments(entry: &MonthlySeries) -> Vec<Vec<(i32, f64)>> {
    let mut segments = Vec::new();
    let mut current = Vec::new();

    for (month, value) in (1i32..).zip(entry.values.iter()) {
        match value {
            Some(v) => current.push((month, *v)),
            None if !current.is_empty() => segments.push(std::mem::take(&mut current)),
            None => {}
        }
    }

    if !current.is_empty() {
        segments.push(current);
    }

    segments
}

fn value_range(series: &[MonthlySeries]) -> Range<f64> {
    let bounds = series
        .iter()
        .flat_map(|s| s.values.iter().flatten().copied())
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        });

    match bounds {
        Some((lo, hi)) => (lo - Y_PADDING)..(hi + Y_PADDING),
        None => EMPTY_Y_RANGE,
    }
}

fn month_label(month: i32) -> String {
    if (1..=12).contains(&month) {
        format!("{month}月")
    } else {
        String::new()
    }
}
