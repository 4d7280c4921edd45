//! Import delimited text files into InfluxDB.
//!
//! Each input row becomes one point: a timestamp resolved from a time
//! column, tags and fields picked out by column mappings, and field values
//! typed as float, boolean or string. Points are written in fixed-size
//! batches and the first rejected batch ends the run.

pub mod batch;
pub mod cli;
pub mod config;
pub mod error;
pub mod infer;
pub mod mapping;
pub mod normalize;
pub mod pipeline;
pub mod point;
pub mod store;
pub mod timestamp;

pub use batch::BatchWriter;
pub use config::{ConnectionConfig, RunConfig, ServerAddress};
pub use error::{ImportError, Result, StoreError};
pub use normalize::{RawRecord, RowNormalizer};
pub use pipeline::{import_file, run_import, CsvSource, ImportSummary};
pub use point::{FieldValue, NormalizedPoint, TagValue};
pub use store::{InfluxStore, PointStore};
