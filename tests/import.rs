use std::cell::Cell;
use std::io::Write;

use async_trait::async_trait;
use csv2influx::{
    BatchWriter, CsvSource, FieldValue, ImportError, NormalizedPoint, PointStore, RowNormalizer,
    RunConfig, StoreError, TagValue, run_import,
};
use tempfile::NamedTempFile;

/// In-memory store that keeps every accepted batch
#[derive(Default)]
struct MemoryStore {
    batches: Vec<Vec<NormalizedPoint>>,
    reject_from: Option<usize>,
}

#[async_trait]
impl PointStore for MemoryStore {
    async fn write_points(&mut self, points: &[NormalizedPoint]) -> Result<(), StoreError> {
        if self.reject_from.is_some_and(|n| self.batches.len() >= n) {
            return Err(StoreError::Rejected("database unavailable".to_string()));
        }
        self.batches.push(points.to_vec());
        Ok(())
    }
}

fn csv_file(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file.flush().unwrap();
    file
}

const INPUT: &[&str] = &[
    "timestamp,host,value,status",
    "2024-01-01 00:00:00,web01,1.5,ok",
    "2024-01-01 00:00:01,web02,NaN,ok",
    "2024-01-01 00:00:02,web01,2,true",
    "2024-01-01 00:00:03,web03,3.25,false",
    "2024-01-01 00:00:04,web01,4,degraded",
    "2024-01-01 00:00:05,web02,5,ok",
];

fn config() -> RunConfig {
    RunConfig {
        measurement: "health".to_string(),
        batch_size: 2,
        ..RunConfig::default()
    }
    .with_field_spec("value,status:state")
    .with_tag_spec("host,region=eu")
    .with_nan_spec("value")
}

#[tokio::test]
async fn test_import_batches_and_skips_nan_rows() {
    let file = csv_file(INPUT);
    let config = config();

    let source = CsvSource::open(file.path(), config.delimiter).unwrap();
    let normalizer = RowNormalizer::new(&config);
    normalizer.check_header(source.headers()).unwrap();

    let mut writer = BatchWriter::new(MemoryStore::default(), config.batch_size);
    let summary = run_import(source.records(), &normalizer, &mut writer)
        .await
        .unwrap();

    assert_eq!(summary.lines_read, 6);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.points_written, 5);
    assert_eq!(summary.batches, 3);

    let store = writer.into_store();
    let sizes: Vec<usize> = store.batches.iter().map(Vec::len).collect();
    assert_eq!(sizes, vec![2, 2, 1]);

    let points: Vec<&NormalizedPoint> = store.batches.iter().flatten().collect();
    let first = points[0];
    assert_eq!(first.measurement, "health");
    assert_eq!(first.timestamp_ns, 1_704_067_200_000_000_000);
    assert_eq!(first.tags["host"], TagValue::Text("web01".to_string()));
    assert_eq!(first.tags["region"], TagValue::Text("eu".to_string()));
    assert_eq!(first.fields["value"], FieldValue::Float(1.5));
    assert_eq!(first.fields["state"], FieldValue::Text("ok".to_string()));

    // NaN row dropped, order preserved
    assert_eq!(points[1].timestamp_ns, 1_704_067_202_000_000_000);
    assert_eq!(points[1].fields["state"], FieldValue::Boolean(true));
    assert_eq!(points[2].fields["state"], FieldValue::Boolean(false));
}

#[tokio::test]
async fn test_rejected_write_stops_the_run() {
    let file = csv_file(INPUT);
    let config = RunConfig {
        batch_size: 2,
        ..RunConfig::default()
    };

    let source = CsvSource::open(file.path(), config.delimiter).unwrap();
    let normalizer = RowNormalizer::new(&config);
    let store = MemoryStore {
        reject_from: Some(0),
        ..Default::default()
    };
    let mut writer = BatchWriter::new(store, config.batch_size);

    let rows_pulled = Cell::new(0);
    let records = source.records().inspect(|_| rows_pulled.set(rows_pulled.get() + 1));

    let err = run_import(records, &normalizer, &mut writer)
        .await
        .unwrap_err();

    assert!(matches!(err, ImportError::WriteRejected { attempted: 2, .. }));
    assert_eq!(rows_pulled.get(), 2);
    assert!(writer.into_store().batches.is_empty());
}

#[tokio::test]
async fn test_bad_timestamp_aborts() {
    let file = csv_file(&["timestamp,value", "2024-01-01 00:00:00,1", "01/02/2024,2"]);
    let config = RunConfig::default();

    let source = CsvSource::open(file.path(), config.delimiter).unwrap();
    let normalizer = RowNormalizer::new(&config);
    let mut writer = BatchWriter::new(MemoryStore::default(), config.batch_size);

    let err = run_import(source.records(), &normalizer, &mut writer)
        .await
        .unwrap_err();

    assert!(matches!(err, ImportError::Timestamp { ref value, .. } if value == "01/02/2024"));
    assert!(writer.into_store().batches.is_empty());
}

#[tokio::test]
async fn test_epoch_column_in_other_timezone_and_delimiter() {
    let file = csv_file(&[
        "ts;value",
        "1704067200;1",
        "1704067200000;2",
        "2024-01-01 01:00:00;3",
    ]);
    let config = RunConfig {
        delimiter: b';',
        time_column: "ts".to_string(),
        timezone: "Europe/Paris".parse().unwrap(),
        ..RunConfig::default()
    };

    let source = CsvSource::open(file.path(), config.delimiter).unwrap();
    let normalizer = RowNormalizer::new(&config);
    let mut writer = BatchWriter::new(MemoryStore::default(), config.batch_size);

    let summary = run_import(source.records(), &normalizer, &mut writer)
        .await
        .unwrap();
    assert_eq!(summary.points_written, 3);

    let store = writer.into_store();
    let timestamps: Vec<i64> = store.batches[0].iter().map(|p| p.timestamp_ns).collect();
    assert_eq!(timestamps, vec![1_704_067_200_000_000_000; 3]);

    // The default "host" tag column is absent from this file
    assert_eq!(store.batches[0][0].tags["host"], TagValue::Missing);
}

#[test]
fn test_header_missing_time_column() {
    let file = csv_file(&["time,value", "2024-01-01 00:00:00,1"]);
    let config = RunConfig::default();

    let source = CsvSource::open(file.path(), config.delimiter).unwrap();
    let normalizer = RowNormalizer::new(&config);

    assert!(matches!(
        normalizer.check_header(source.headers()),
        Err(ImportError::MissingColumn { .. })
    ));
}
