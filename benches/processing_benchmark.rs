use arrow::array::Float64Array;
use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use station_wetbulb::models::{ColumnSet, ObservationRecord, ObservationTable, StationReference};
use station_wetbulb::processors::{
    DailyAggregator, StationIdentifier, UnitNormalizer, WetBulbAugmenter, WetBulbEstimator,
};

// Hourly readings, every fifth one reported in Fahrenheit
fn create_test_records(station_count: usize, hours: usize) -> Vec<ObservationRecord> {
    let start = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();
    let mut records = Vec::with_capacity(station_count * hours);

    for station in 0..station_count {
        for hour in 0..hours {
            let celsius = 22.0 + (hour % 24) as f64 * 0.4 + station as f64 * 0.1;
            let temperature = if hour % 5 == 0 {
                celsius * 9.0 / 5.0 + 32.0
            } else {
                celsius
            };
            let humidity = 40.0 + (hour % 48) as f64;

            records.push(ObservationRecord::new(
                format!("{}", 195_790 + station),
                start + Duration::hours(hour as i64),
                Some(temperature),
                Some(humidity),
                None,
            ));
        }
    }

    records
}

fn create_test_table(station_count: usize, hours: usize) -> ObservationTable {
    ObservationTable::from_records(
        &create_test_records(station_count, hours),
        ColumnSet::without_dew_point(),
    )
    .unwrap()
}

fn benchmark_wet_bulb_estimate(c: &mut Criterion) {
    let temperature = Float64Array::from_iter_values((0..10_000).map(|i| (i % 40) as f64));
    let humidity = Float64Array::from_iter_values((0..10_000).map(|i| (i % 100) as f64));
    let estimator = WetBulbEstimator::new();

    c.bench_function("wet_bulb_estimate_10k", |b| {
        b.iter(|| black_box(estimator.estimate(&temperature, &humidity).unwrap().len()))
    });
}

fn benchmark_unit_normalizer(c: &mut Criterion) {
    let temperature =
        Float64Array::from_iter_values((0..10_000).map(|i| if i % 5 == 0 { 86.0 } else { 30.0 }));
    let normalizer = UnitNormalizer::new();

    c.bench_function("unit_normalizer_10k", |b| {
        b.iter(|| black_box(normalizer.normalize(&temperature).len()))
    });
}

fn benchmark_daily_aggregation(c: &mut Criterion) {
    let mut table = create_test_table(1, 24 * 30);
    WetBulbAugmenter::default().augment(&mut table).unwrap();

    c.bench_function("daily_aggregation_30_days", |b| {
        b.iter(|| black_box(DailyAggregator::new().aggregate(&table).unwrap().len()))
    });
}

fn benchmark_station_identification(c: &mut Criterion) {
    let table = create_test_table(20, 24 * 7);
    let first_day = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap().date_naive();
    let reference = StationReference::new(first_day).with_sample_count(24 * 7);
    let identifier = StationIdentifier::new(reference).unwrap();

    c.bench_function("station_identification_20_stations", |b| {
        b.iter(|| black_box(identifier.identify(&table).unwrap().len()))
    });
}

fn benchmark_augmentation_by_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("augmentation_by_size");

    for &station_count in &[1, 10, 50] {
        let table = create_test_table(station_count, 24 * 7);
        group.bench_with_input(
            BenchmarkId::new("stations", station_count),
            &table,
            |b, table| {
                let augmenter = WetBulbAugmenter::default();
                b.iter(|| {
                    let mut table = table.clone();
                    black_box(augmenter.augment(&mut table).unwrap().rows)
                })
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    benchmark_wet_bulb_estimate,
    benchmark_unit_normalizer,
    benchmark_daily_aggregation,
    benchmark_station_identification,
    benchmark_augmentation_by_size
);
criterion_main!(benches);
