pub mod augmentation;
pub mod daily_aggregator;
pub mod pipeline;
pub mod station_identifier;
pub mod unit_normalizer;
pub mod wet_bulb;

pub use augmentation::{AugmentationReport, WetBulbAugmenter};
pub use daily_aggregator::DailyAggregator;
pub use pipeline::{AnalysisOutcome, AnalysisPipeline, AnalysisRequest};
pub use station_identifier::{summarize_stations, StationIdentifier};
pub use unit_normalizer::{fahrenheit_to_celsius, NormalizationReport, UnitNormalizer};
pub use wet_bulb::{StullCoefficients, WetBulbEstimator};
