use crate::error::{ProcessingError, Result};
use crate::models::{DailyAggregate, DailyMetric, ObservationTable};
use crate::processors::DailyAggregator;
use crate::settings::{ReferenceLine, RenderSettings};
use crate::utils::constants::{HUMIDITY_COLUMN, TEMPERATURE_COLUMN, WET_BULB_COLUMN};
use crate::utils::filename::{overview_plot_filename, station_plot_filename, ImageFormat};
use crate::utils::progress::ProgressReporter;
use arrow::array::{Array, Float64Array};
use chrono::{Duration, NaiveDateTime};
use plotters::coord::types::{RangedCoordf64, RangedDateTime};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::{register_font, FontStyle};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const FONT_FAMILY: &str = "sans-serif";
const WET_BULB_COLOR: RGBColor = RGBColor(0, 0, 139);
const TEMPERATURE_COLOR: RGBColor = RGBColor(200, 70, 40);
const HUMIDITY_COLOR: RGBColor = RGBColor(30, 130, 90);

/// One stacked panel of a station figure
struct Panel {
    title: &'static str,
    unit: &'static str,
    color: RGBColor,
    metric: DailyMetric,
    points: Vec<(NaiveDateTime, f64)>,
    with_reference_lines: bool,
}

/// Daily band sample: (noon of day, min, mean, max)
type BandPoint = (NaiveDateTime, f64, f64, f64);

#[derive(Debug, Default)]
pub struct RenderSummary {
    pub rendered: Vec<PathBuf>,
    pub skipped: Vec<String>,
}

impl RenderSummary {
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "Rendering Summary:\n\
            - Stations rendered: {}\n\
            - Stations skipped (no data): {}",
            self.rendered.len(),
            self.skipped.len()
        );
        for id in &self.skipped {
            summary.push_str(&format!("\n  - {}", id));
        }
        summary
    }
}

/// Renders per-station figures and the all-station overview
pub struct PlotWriter {
    settings: RenderSettings,
    format: ImageFormat,
    output_dir: PathBuf,
    labels: bool,
}

impl PlotWriter {
    pub fn new(settings: &RenderSettings, output_dir: impl Into<PathBuf>) -> Result<Self> {
        let format = settings.image_format()?;
        let labels = match &settings.font_path {
            Some(path) => {
                register_font_file(path)?;
                true
            }
            None => {
                debug!("No font configured, plots are rendered without text");
                false
            }
        };

        Ok(Self {
            settings: settings.clone(),
            format,
            output_dir: output_dir.into(),
            labels,
        })
    }

    pub fn station_path(&self, station_id: &str) -> PathBuf {
        station_plot_filename(&self.output_dir, station_id, self.format)
    }

    /// Render each requested station; stations without rows are logged and
    /// skipped, any other failure aborts.
    pub fn render_stations(
        &self,
        table: &ObservationTable,
        station_ids: &[String],
        progress: Option<&ProgressReporter>,
    ) -> Result<RenderSummary> {
        let mut summary = RenderSummary::default();

        for station_id in station_ids {
            if let Some(p) = progress {
                p.set_message(&format!("Rendering station {}...", station_id));
            }

            match self.render_station(table, station_id) {
                Ok(path) => summary.rendered.push(path),
                Err(ProcessingError::NoDataForStation { station_id }) => {
                    info!("No data found for station ID: {}", station_id);
                    summary.skipped.push(station_id);
                }
                Err(e) => return Err(e),
            }

            if let Some(p) = progress {
                p.increment(1);
            }
        }

        Ok(summary)
    }

    /// Render one station's wet-bulb, temperature and humidity panels
    pub fn render_station(&self, table: &ObservationTable, station_id: &str) -> Result<PathBuf> {
        let station = table.filter_station(station_id)?;
        if station.is_empty() {
            return Err(ProcessingError::NoDataForStation {
                station_id: station_id.to_string(),
            });
        }
        info!("Station {}: {}", station_id, station.num_rows());

        let times: Vec<NaiveDateTime> = station
            .event_times()?
            .into_iter()
            .map(|t| t.naive_utc())
            .collect();
        let x_range = time_range(&times);

        let panels = vec![
            Panel {
                title: "Wet Bulb Temperature",
                unit: "Wet Bulb Temperature (°C)",
                color: WET_BULB_COLOR,
                metric: DailyMetric::WetBulb,
                points: series(&times, station.float_column(WET_BULB_COLUMN)?),
                with_reference_lines: true,
            },
            Panel {
                title: "Outdoor Temperature",
                unit: "Temperature (°C)",
                color: TEMPERATURE_COLOR,
                metric: DailyMetric::Temperature,
                points: series(&times, station.float_column(TEMPERATURE_COLUMN)?),
                with_reference_lines: false,
            },
            Panel {
                title: "Outdoor Humidity",
                unit: "Relative Humidity (%)",
                color: HUMIDITY_COLOR,
                metric: DailyMetric::Humidity,
                points: series(&times, station.float_column(HUMIDITY_COLUMN)?),
                with_reference_lines: false,
            },
        ];
        let daily = DailyAggregator::new().aggregate(&station)?;

        std::fs::create_dir_all(&self.output_dir)?;
        let path = self.station_path(station_id);
        let size = (self.settings.width, self.settings.height);
        let title = format!("Data for Station {}", station_id);

        match self.format {
            ImageFormat::Png => {
                let root = BitMapBackend::new(&path, size).into_drawing_area();
                self.draw_station(&root, &title, &panels, &daily, x_range)?;
                root.present().map_err(plot_error)?;
            }
            ImageFormat::Svg => {
                let root = SVGBackend::new(&path, size).into_drawing_area();
                self.draw_station(&root, &title, &panels, &daily, x_range)?;
                root.present().map_err(plot_error)?;
            }
        }

        debug!(path = %path.display(), "Wrote station plot");
        Ok(path)
    }

    /// Grid of every station's wet-bulb series on a shared y-range.
    ///
    /// Pages hold at most `overview_rows` x `overview_columns` stations; a
    /// single page is written as `overview.<ext>`, several as `overview_<n>.<ext>`.
    pub fn render_overview(&self, table: &ObservationTable) -> Result<Vec<PathBuf>> {
        let stations = table.partition_by_station()?;
        let columns = self.settings.overview_columns.max(1);
        let per_page = columns * self.settings.overview_rows.max(1);

        let mut cells = Vec::with_capacity(stations.len());
        for (station_id, station) in &stations {
            let times: Vec<NaiveDateTime> = station
                .event_times()?
                .into_iter()
                .map(|t| t.naive_utc())
                .collect();
            let points = series(&times, station.float_column(WET_BULB_COLUMN)?);
            cells.push((station_id.as_str(), points));
        }

        std::fs::create_dir_all(&self.output_dir)?;
        let pages: Vec<_> = cells.chunks(per_page).collect();
        let mut paths = Vec::with_capacity(pages.len().max(1));

        for (index, page_cells) in pages.iter().enumerate() {
            let page = (pages.len() > 1).then_some(index + 1);
            let path = overview_plot_filename(&self.output_dir, page, self.format);
            self.render_overview_page(&path, columns, page_cells)?;
            paths.push(path);
        }
        if pages.is_empty() {
            let path = overview_plot_filename(&self.output_dir, None, self.format);
            self.render_overview_page(&path, columns, &[])?;
            paths.push(path);
        }

        info!(pages = paths.len(), stations = stations.len(), "Wrote overview plots");
        Ok(paths)
    }

    fn render_overview_page(
        &self,
        path: &Path,
        columns: usize,
        cells: &[(&str, Vec<(NaiveDateTime, f64)>)],
    ) -> Result<()> {
        let rows = cells.len().div_ceil(columns).max(1);
        let size = (
            self.settings.overview_cell_width * columns as u32,
            self.settings.overview_cell_height * rows as u32,
        );

        match self.format {
            ImageFormat::Png => {
                let root = BitMapBackend::new(path, size).into_drawing_area();
                self.draw_overview(&root, (rows, columns), cells)?;
                root.present().map_err(plot_error)?;
            }
            ImageFormat::Svg => {
                let root = SVGBackend::new(path, size).into_drawing_area();
                self.draw_overview(&root, (rows, columns), cells)?;
                root.present().map_err(plot_error)?;
            }
        }

        debug!(path = %path.display(), "Wrote overview page");
        Ok(())
    }

    fn draw_station<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
        title: &str,
        panels: &[Panel],
        daily: &[DailyAggregate],
        x_range: (NaiveDateTime, NaiveDateTime),
    ) -> Result<()> {
        root.fill(&WHITE).map_err(plot_error)?;

        let body = if self.labels {
            root.titled(title, (FONT_FAMILY, 22)).map_err(plot_error)?
        } else {
            root.clone()
        };

        let areas = body.split_evenly((panels.len(), 1));
        for (area, panel) in areas.iter().zip(panels) {
            let band: Vec<BandPoint> = daily
                .iter()
                .filter_map(|day| {
                    // Keep band points inside the time axis for partial days
                    let noon = day.date.and_hms_opt(12, 0, 0)?.clamp(x_range.0, x_range.1);
                    day.metric(panel.metric)
                        .map(|m| (noon, m.min, m.mean, m.max))
                })
                .collect();
            self.draw_panel(area, panel, &band, x_range)?;
        }

        Ok(())
    }

    fn draw_panel<DB: DrawingBackend>(
        &self,
        area: &DrawingArea<DB, Shift>,
        panel: &Panel,
        band: &[BandPoint],
        (x_start, x_end): (NaiveDateTime, NaiveDateTime),
    ) -> Result<()> {
        let reference_values: Vec<f64> = if panel.with_reference_lines {
            self.settings.reference_lines.iter().map(|l| l.value).collect()
        } else {
            Vec::new()
        };
        let (y_min, y_max) = value_range(
            panel
                .points
                .iter()
                .map(|(_, v)| *v)
                .chain(band.iter().flat_map(|(_, lo, _, hi)| [*lo, *hi]))
                .chain(reference_values),
        );

        let mut builder = ChartBuilder::on(area);
        builder.margin(10);
        if self.labels {
            builder
                .caption(panel.title, (FONT_FAMILY, 16))
                .x_label_area_size(35)
                .y_label_area_size(55);
        }
        let mut chart = builder
            .build_cartesian_2d(RangedDateTime::from(x_start..x_end), y_min..y_max)
            .map_err(plot_error)?;

        if self.labels {
            chart
                .configure_mesh()
                .x_labels(8)
                .x_desc("Timestamp")
                .y_desc(panel.unit)
                .x_label_formatter(&|dt: &NaiveDateTime| dt.format("%Y-%m-%d").to_string())
                .light_line_style(BLACK.mix(0.1))
                .draw()
                .map_err(plot_error)?;
        }

        if band.len() > 1 {
            let mut outline: Vec<(NaiveDateTime, f64)> =
                band.iter().map(|(x, _, _, hi)| (*x, *hi)).collect();
            outline.extend(band.iter().rev().map(|(x, lo, _, _)| (*x, *lo)));
            chart
                .draw_series(std::iter::once(Polygon::new(
                    outline,
                    panel.color.mix(0.2).filled(),
                )))
                .map_err(plot_error)?;
        }

        chart
            .draw_series(LineSeries::new(
                panel.points.iter().copied(),
                panel.color.mix(0.6).stroke_width(1),
            ))
            .map_err(plot_error)?;

        chart
            .draw_series(LineSeries::new(
                band.iter().map(|(x, _, mean, _)| (*x, *mean)),
                panel.color.stroke_width(2),
            ))
            .map_err(plot_error)?;

        if panel.with_reference_lines {
            for line in &self.settings.reference_lines {
                draw_reference_line(&mut chart, line, (x_start, x_end))?;
            }
        }

        Ok(())
    }

    fn draw_overview<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
        grid: (usize, usize),
        cells: &[(&str, Vec<(NaiveDateTime, f64)>)],
    ) -> Result<()> {
        root.fill(&WHITE).map_err(plot_error)?;
        let areas = root.split_evenly(grid);
        let y_range = self.settings.overview_y_min..self.settings.overview_y_max;

        for (area, (station_id, points)) in areas.iter().zip(cells) {
            if points.is_empty() {
                if self.labels {
                    area.titled(
                        &format!("Station {} - No Data", station_id),
                        (FONT_FAMILY, 14),
                    )
                    .map_err(plot_error)?;
                }
                continue;
            }

            let times: Vec<NaiveDateTime> = points.iter().map(|(t, _)| *t).collect();
            let (x_start, x_end) = time_range(&times);

            let mut builder = ChartBuilder::on(area);
            builder.margin(6);
            if self.labels {
                builder
                    .caption(format!("Station {}", station_id), (FONT_FAMILY, 14))
                    .x_label_area_size(30)
                    .y_label_area_size(35);
            }
            let mut chart = builder
                .build_cartesian_2d(RangedDateTime::from(x_start..x_end), y_range.clone())
                .map_err(plot_error)?;

            if self.labels {
                chart
                    .configure_mesh()
                    .x_labels(4)
                    .x_label_formatter(&|dt: &NaiveDateTime| dt.format("%m-%d").to_string())
                    .light_line_style(BLACK.mix(0.1))
                    .draw()
                    .map_err(plot_error)?;
            }

            chart
                .draw_series(LineSeries::new(
                    points.iter().copied(),
                    WET_BULB_COLOR.stroke_width(1),
                ))
                .map_err(plot_error)?;

            for line in &self.settings.reference_lines {
                draw_reference_line(&mut chart, line, (x_start, x_end))?;
            }
        }

        Ok(())
    }
}

fn draw_reference_line<DB: DrawingBackend>(
    chart: &mut ChartContext<'_, DB, Cartesian2d<RangedDateTime<NaiveDateTime>, RangedCoordf64>>,
    line: &ReferenceLine,
    (x_start, x_end): (NaiveDateTime, NaiveDateTime),
) -> Result<()> {
    let (r, g, b) = line.rgb()?;
    chart
        .draw_series(LineSeries::new(
            vec![(x_start, line.value), (x_end, line.value)],
            RGBColor(r, g, b).stroke_width(1),
        ))
        .map_err(plot_error)?;
    Ok(())
}

/// Pair timestamps with finite, non-null values
fn series(times: &[NaiveDateTime], values: &Float64Array) -> Vec<(NaiveDateTime, f64)> {
    times
        .iter()
        .enumerate()
        .filter(|(i, _)| values.is_valid(*i))
        .map(|(i, t)| (*t, values.value(i)))
        .filter(|(_, v)| v.is_finite())
        .collect()
}

/// Time axis bounds; a single instant is widened to one hour
fn time_range(times: &[NaiveDateTime]) -> (NaiveDateTime, NaiveDateTime) {
    let start = times.iter().min().copied().unwrap_or_default();
    let end = times.iter().max().copied().unwrap_or_default();
    if end > start {
        (start, end)
    } else {
        (start, start + Duration::hours(1))
    }
}

/// Value axis bounds with 10% padding (or ±1 when flat)
fn value_range<I: IntoIterator<Item = f64>>(values: I) -> (f64, f64) {
    let (min, max) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

    if !min.is_finite() {
        return (0.0, 1.0);
    }

    let padding = if (max - min).abs() > 1e-6 {
        (max - min) * 0.1
    } else {
        1.0
    };
    (min - padding, max + padding)
}

fn register_font_file(path: &Path) -> Result<()> {
    let bytes = std::fs::read(path)?;
    // Registered fonts must outlive the process-wide font table
    let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());

    register_font(FONT_FAMILY, FontStyle::Normal, bytes).map_err(|_| {
        ProcessingError::Config(format!(
            "Invalid font file {}: not a TrueType/OpenType font",
            path.display()
        ))
    })?;
    info!(path = %path.display(), "Registered plot font");
    Ok(())
}

fn plot_error<E: std::fmt::Display>(error: E) -> ProcessingError {
    ProcessingError::Plot(error.to_string())
}
