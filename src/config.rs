//! Run configuration.
//!
//! `RunConfig` holds everything the normalization pipeline needs and is
//! never mutated once a run starts. `ConnectionConfig` describes the
//! InfluxDB server and is only used by the store.

use chrono_tz::Tz;

use crate::error::{ImportError, Result};
use crate::infer::NanSentinels;
use crate::mapping::{parse_field_mappings, parse_tag_mappings, ColumnMapping, StaticTag};

pub const DEFAULT_DELIMITER: u8 = b',';
pub const DEFAULT_METRIC: &str = "value";
pub const DEFAULT_TIME_COLUMN: &str = "timestamp";
pub const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const DEFAULT_FIELD_COLUMNS: &str = "value";
pub const DEFAULT_TAG_COLUMNS: &str = "host";
pub const DEFAULT_BATCH_SIZE: usize = 5000;
pub const DEFAULT_SERVER: &str = "localhost:8086";

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub delimiter: u8,
    pub measurement: String,
    pub time_column: String,
    pub time_format: String,
    pub timezone: Tz,
    pub fields: Vec<ColumnMapping>,
    pub tag_columns: Vec<ColumnMapping>,
    pub static_tags: Vec<StaticTag>,
    /// Columns checked against `nan_sentinels`; a match drops the row
    pub nan_columns: Vec<String>,
    pub nan_sentinels: NanSentinels,
    pub batch_size: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        let tags = parse_tag_mappings(DEFAULT_TAG_COLUMNS);
        Self {
            delimiter: DEFAULT_DELIMITER,
            measurement: DEFAULT_METRIC.to_string(),
            time_column: DEFAULT_TIME_COLUMN.to_string(),
            time_format: DEFAULT_TIME_FORMAT.to_string(),
            timezone: Tz::UTC,
            fields: parse_field_mappings(DEFAULT_FIELD_COLUMNS),
            tag_columns: tags.columns,
            static_tags: tags.statics,
            nan_columns: Vec::new(),
            nan_sentinels: NanSentinels::default(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl RunConfig {
    pub fn with_field_spec(mut self, spec: &str) -> Self {
        self.fields = parse_field_mappings(spec);
        self
    }

    pub fn with_tag_spec(mut self, spec: &str) -> Self {
        let tags = parse_tag_mappings(spec);
        self.tag_columns = tags.columns;
        self.static_tags = tags.statics;
        self
    }

    /// NaN filter columns use the field spec syntax; only source names matter
    pub fn with_nan_spec(mut self, spec: &str) -> Self {
        self.nan_columns = parse_field_mappings(spec)
            .into_iter()
            .map(|m| m.source)
            .collect();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(ImportError::config("batch size must be at least 1"));
        }
        if self.time_column.is_empty() {
            return Err(ImportError::config("time column name is empty"));
        }
        if self.measurement.is_empty() {
            return Err(ImportError::config("metric name is empty"));
        }
        Ok(())
    }
}

/// `host:port` split at the last colon
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerAddress {
    pub host: String,
    pub port: u16,
}

impl std::str::FromStr for ServerAddress {
    type Err = ImportError;

    fn from_str(s: &str) -> Result<Self> {
        let (host, port) = s
            .rsplit_once(':')
            .ok_or_else(|| ImportError::config(format!("server '{}' is not host:port", s)))?;
        let port = port
            .parse::<u16>()
            .map_err(|e| ImportError::config(format!("invalid port in '{}': {}", s, e)))?;
        Ok(Self {
            host: host.to_string(),
            port,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub server: ServerAddress,
    pub ssl: bool,
    pub user: String,
    pub password: String,
    pub database: String,
    /// Drop and recreate the database before writing
    pub recreate: bool,
    pub gzip: bool,
}

impl ConnectionConfig {
    pub fn url(&self) -> String {
        let scheme = if self.ssl { "https" } else { "http" };
        format!("{}://{}:{}", scheme, self.server.host, self.server.port)
    }
}
