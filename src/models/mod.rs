pub mod daily;
pub mod observation;
pub mod station;
pub mod table;

pub use daily::{DailyAggregate, DailyMetric, MetricSummary};
pub use observation::ObservationRecord;
pub use station::{StationReference, StationSummary};
pub use table::{ColumnSet, ObservationTable};
