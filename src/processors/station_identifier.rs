use crate::error::Result;
use crate::models::{ObservationTable, StationReference, StationSummary};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::debug;
use validator::Validate;

/// Finds station ids in anonymous telemetry by comparing each station's
/// sample count and first observation day against known reference values.
pub struct StationIdentifier {
    reference: StationReference,
}

impl StationIdentifier {
    pub fn new(reference: StationReference) -> Result<Self> {
        reference.validate()?;
        Ok(Self { reference })
    }

    pub fn reference(&self) -> &StationReference {
        &self.reference
    }

    /// Stations matching the reference, in first-appearance order
    pub fn identify(&self, table: &ObservationTable) -> Result<Vec<StationSummary>> {
        let matches: Vec<StationSummary> = summarize_stations(table)?
            .into_iter()
            .filter(|station| self.reference.matches(station))
            .collect();

        debug!(
            reference_day = %self.reference.first_day,
            matches = matches.len(),
            "Station identification complete"
        );

        Ok(matches)
    }
}

/// One summary per station, in first-appearance order
pub fn summarize_stations(table: &ObservationTable) -> Result<Vec<StationSummary>> {
    let ids = table.station_id_array()?;
    let times = table.event_times()?;

    let mut order: Vec<String> = Vec::new();
    let mut spans: HashMap<String, (usize, DateTime<Utc>, DateTime<Utc>)> = HashMap::new();

    for (id, time) in ids.iter().zip(times) {
        let Some(id) = id else { continue };

        match spans.get_mut(id) {
            Some((count, first, last)) => {
                *count += 1;
                *first = (*first).min(time);
                *last = (*last).max(time);
            }
            None => {
                order.push(id.to_string());
                spans.insert(id.to_string(), (1, time, time));
            }
        }
    }

    Ok(order
        .into_iter()
        .filter_map(|id| {
            spans
                .remove(&id)
                .map(|(sample_count, first, last)| StationSummary {
                    station_id: id,
                    sample_count,
                    first_observation: first,
                    last_observation: last,
                })
        })
        .collect())
}
