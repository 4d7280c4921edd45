//! Fixed-size batching in front of a [`PointStore`].

use chrono::{DateTime, FixedOffset};
use log::{error, info};

use crate::error::{ImportError, Result};
use crate::point::NormalizedPoint;
use crate::store::PointStore;

pub struct BatchWriter<S> {
    store: S,
    batch_size: usize,
    batch: Vec<NormalizedPoint>,
    last_instant: Option<DateTime<FixedOffset>>,
    points_written: usize,
    batches_written: usize,
}

impl<S: PointStore> BatchWriter<S> {
    pub fn new(store: S, batch_size: usize) -> Self {
        let batch_size = batch_size.max(1);
        Self {
            store,
            batch_size,
            batch: Vec::with_capacity(batch_size),
            last_instant: None,
            points_written: 0,
            batches_written: 0,
        }
    }

    /// Queue a point, flushing once the batch is full. `lines_read` is only
    /// used for progress output.
    pub async fn push(
        &mut self,
        point: NormalizedPoint,
        instant: DateTime<FixedOffset>,
        lines_read: usize,
    ) -> Result<()> {
        self.batch.push(point);
        self.last_instant = Some(instant);

        if self.batch.len() >= self.batch_size {
            self.flush(lines_read).await?;
        }
        Ok(())
    }

    /// Write the pending points. The batch is only cleared once the store
    /// has accepted it.
    pub async fn flush(&mut self, lines_read: usize) -> Result<()> {
        if self.batch.is_empty() {
            return Ok(());
        }

        let attempted = self.batch.len();
        info!("Read {} lines", lines_read);
        info!("Inserting {} datapoints...", attempted);

        if let Err(source) = self.store.write_points(&self.batch).await {
            error!("Problem inserting points, exiting...");
            return Err(ImportError::WriteRejected { attempted, source });
        }

        match self.last_instant {
            Some(instant) => info!("Wrote {} points, up to {}", attempted, instant),
            None => info!("Wrote {} points", attempted),
        }

        self.batch.clear();
        self.points_written += attempted;
        self.batches_written += 1;
        Ok(())
    }

    pub fn pending(&self) -> usize {
        self.batch.len()
    }

    pub fn points_written(&self) -> usize {
        self.points_written
    }

    pub fn batches_written(&self) -> usize {
        self.batches_written
    }

    pub fn into_store(self) -> S {
        self.store
    }
}
