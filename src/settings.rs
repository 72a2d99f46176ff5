use crate::error::{ProcessingError, Result};
use crate::processors::{StullCoefficients, UnitNormalizer, WetBulbAugmenter, WetBulbEstimator};
use crate::utils::constants::{
    DEFAULT_FAHRENHEIT_THRESHOLD, DEFAULT_OVERVIEW_CELL_HEIGHT, DEFAULT_OVERVIEW_CELL_WIDTH,
    DEFAULT_OVERVIEW_COLUMNS, DEFAULT_OVERVIEW_ROWS, DEFAULT_PLOT_HEIGHT, DEFAULT_PLOT_WIDTH, WET_BULB_CAUTION,
    WET_BULB_DANGER,
};
use crate::utils::ImageFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;
use validator::Validate;

/// Runtime settings: built-in defaults, optionally overlaid by a config file
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Settings {
    #[validate(nested)]
    pub normalizer: NormalizerSettings,

    pub wet_bulb: StullCoefficients,

    /// Dew-point-aware input variant
    pub require_dew_point: bool,

    #[validate(nested)]
    pub render: RenderSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct NormalizerSettings {
    pub enabled: bool,

    #[validate(range(min = -100.0, max = 200.0))]
    pub threshold: f64,
}

impl Default for NormalizerSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: DEFAULT_FAHRENHEIT_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct RenderSettings {
    #[validate(range(min = 200, max = 10000))]
    pub width: u32,

    #[validate(range(min = 200, max = 10000))]
    pub height: u32,

    #[validate(range(min = 1, max = 20))]
    pub overview_columns: usize,

    /// Rows per overview page; more stations spill onto further pages
    #[validate(range(min = 1, max = 20))]
    pub overview_rows: usize,

    #[validate(range(min = 100, max = 4000))]
    pub overview_cell_width: u32,

    #[validate(range(min = 100, max = 4000))]
    pub overview_cell_height: u32,

    pub overview_y_min: f64,
    pub overview_y_max: f64,

    /// Horizontal wet-bulb markers
    pub reference_lines: Vec<ReferenceLine>,

    /// TTF/OTF file for captions and axis labels; none means no text
    pub font_path: Option<PathBuf>,

    /// "png" or "svg"
    pub format: String,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: DEFAULT_PLOT_WIDTH,
            height: DEFAULT_PLOT_HEIGHT,
            overview_columns: DEFAULT_OVERVIEW_COLUMNS,
            overview_rows: DEFAULT_OVERVIEW_ROWS,
            overview_cell_width: DEFAULT_OVERVIEW_CELL_WIDTH,
            overview_cell_height: DEFAULT_OVERVIEW_CELL_HEIGHT,
            overview_y_min: 0.0,
            overview_y_max: 40.0,
            reference_lines: vec![
                ReferenceLine::new(WET_BULB_CAUTION, "#000000"),
                ReferenceLine::new(WET_BULB_DANGER, "#ff0000"),
            ],
            font_path: None,
            format: "png".to_string(),
        }
    }
}

impl RenderSettings {
    pub fn image_format(&self) -> Result<ImageFormat> {
        ImageFormat::parse(&self.format).ok_or_else(|| {
            ProcessingError::Config(format!("Unsupported image format: {}", self.format))
        })
    }

    fn check(&self) -> Result<()> {
        self.image_format()?;

        if self.overview_y_min >= self.overview_y_max {
            return Err(ProcessingError::Config(format!(
                "overview_y_min ({}) must be below overview_y_max ({})",
                self.overview_y_min, self.overview_y_max
            )));
        }

        for line in &self.reference_lines {
            line.rgb()?;
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceLine {
    pub value: f64,
    /// `#rrggbb`
    pub color: String,
}

impl ReferenceLine {
    pub fn new(value: f64, color: &str) -> Self {
        Self {
            value,
            color: color.to_string(),
        }
    }

    pub fn rgb(&self) -> Result<(u8, u8, u8)> {
        let invalid = || ProcessingError::Config(format!("Invalid colour: '{}'", self.color));

        let hex = self.color.strip_prefix('#').ok_or_else(invalid)?;
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(invalid());
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| invalid())
        };
        Ok((channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl Settings {
    /// Load defaults, overlay `path` (TOML, JSON, YAML... by extension) and validate
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults = config::Config::try_from(&Settings::default())?;
        let mut builder = config::Config::builder().add_source(defaults);

        if let Some(path) = path {
            debug!(path = %path.display(), "Reading settings file");
            builder = builder.add_source(config::File::from(path));
        }

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.check()?;
        Ok(settings)
    }

    pub fn check(&self) -> Result<()> {
        self.validate()?;
        self.render.check()
    }

    pub fn unit_normalizer(&self) -> Option<UnitNormalizer> {
        self.normalizer
            .enabled
            .then(|| UnitNormalizer::with_threshold(self.normalizer.threshold))
    }

    pub fn estimator(&self) -> WetBulbEstimator {
        WetBulbEstimator::with_coefficients(self.wet_bulb)
    }

    pub fn augmenter(&self) -> WetBulbAugmenter {
        WetBulbAugmenter::new(self.estimator())
            .with_normalizer(self.unit_normalizer())
            .with_require_dew_point(self.require_dew_point)
    }
}
