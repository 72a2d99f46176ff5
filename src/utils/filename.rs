use std::path::{Path, PathBuf};

/// Image formats the plot writer can emit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Svg,
}

impl ImageFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "svg" => Some(ImageFormat::Svg),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Svg => "svg",
        }
    }
}

/// Keep station ids filesystem-safe: anything outside [A-Za-z0-9_-] becomes '_'
fn sanitize_station_id(station_id: &str) -> String {
    station_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Generate the plot path for a station: {dir}/station_{id}.{ext}
pub fn station_plot_filename(output_dir: &Path, station_id: &str, format: ImageFormat) -> PathBuf {
    output_dir.join(format!(
        "station_{}.{}",
        sanitize_station_id(station_id),
        format.extension()
    ))
}

/// Overview path: {dir}/overview.{ext}, or {dir}/overview_{page}.{ext} when paged
pub fn overview_plot_filename(
    output_dir: &Path,
    page: Option<usize>,
    format: ImageFormat,
) -> PathBuf {
    match page {
        Some(page) => output_dir.join(format!("overview_{}.{}", page, format.extension())),
        None => output_dir.join(format!("overview.{}", format.extension())),
    }
}
