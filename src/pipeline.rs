//! The import loop: read a row, normalize it, hand it to the batch writer.

use std::fs::File;
use std::path::Path;

use csv::{Reader, ReaderBuilder, StringRecord};
use log::{debug, info};

use crate::batch::BatchWriter;
use crate::config::{ConnectionConfig, RunConfig};
use crate::error::Result;
use crate::normalize::{RawRecord, RowNormalizer};
use crate::store::{InfluxStore, PointStore};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub lines_read: usize,
    /// Rows dropped by the NaN filter
    pub skipped: usize,
    pub points_written: usize,
    pub batches: usize,
}

/// Delimited input with a header row
pub struct CsvSource {
    reader: Reader<File>,
    headers: StringRecord,
}

impl CsvSource {
    pub fn open(path: &Path, delimiter: u8) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .from_path(path)?;
        let headers = reader.headers()?.clone();
        debug!("Columns in {}: {:?}", path.display(), headers);
        Ok(Self { reader, headers })
    }

    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.headers.iter()
    }

    pub fn records(self) -> impl Iterator<Item = Result<RawRecord>> {
        let CsvSource { reader, headers } = self;
        reader
            .into_records()
            .map(move |row| -> Result<RawRecord> { Ok(to_raw_record(&headers, &row?)) })
    }
}

// Short rows simply lack their trailing columns.
fn to_raw_record(headers: &StringRecord, row: &StringRecord) -> RawRecord {
    headers.iter().zip(row.iter()).collect()
}

/// Drive `records` through normalization and batching, flushing whatever
/// is left at the end. Stops at the first error.
pub async fn run_import<I, S>(
    records: I,
    normalizer: &RowNormalizer<'_>,
    writer: &mut BatchWriter<S>,
) -> Result<ImportSummary>
where
    I: IntoIterator<Item = Result<RawRecord>>,
    S: PointStore,
{
    let mut summary = ImportSummary::default();

    for record in records {
        let record = record?;
        summary.lines_read += 1;

        match normalizer.normalize(&record)? {
            Some((point, time)) => writer.push(point, time.instant, summary.lines_read).await?,
            None => summary.skipped += 1,
        }
    }

    writer.flush(summary.lines_read).await?;

    summary.points_written = writer.points_written();
    summary.batches = writer.batches_written();
    Ok(summary)
}

/// Import one CSV file into InfluxDB.
pub async fn import_file(
    input: &Path,
    config: &RunConfig,
    conn: &ConnectionConfig,
) -> Result<ImportSummary> {
    config.validate()?;

    let source = CsvSource::open(input, config.delimiter)?;
    let normalizer = RowNormalizer::new(config);
    normalizer.check_header(source.headers())?;

    let store = InfluxStore::connect(conn);
    if conn.recreate {
        store.recreate_database().await?;
    }
    if conn.gzip {
        info!("--gzip has no effect: points are sent uncompressed");
    }

    info!(
        "Importing {} into database {} at {}",
        input.display(),
        conn.database,
        conn.url()
    );

    let mut writer = BatchWriter::new(store, config.batch_size);
    let summary = run_import(source.records(), &normalizer, &mut writer).await?;

    info!(
        "Done: {} lines read, {} skipped, {} points written in {} batches",
        summary.lines_read, summary.skipped, summary.points_written, summary.batches
    );
    Ok(summary)
}
