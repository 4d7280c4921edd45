//! Row normalization: one CSV record in, at most one point out.

use std::collections::{BTreeMap, HashMap};

use crate::config::RunConfig;
use crate::error::{ImportError, Result};
use crate::infer::infer_field;
use crate::point::{FieldValue, NormalizedPoint, TagValue};
use crate::timestamp::{resolve, ResolvedTime};

/// One input row keyed by header name
#[derive(Debug, Clone, Default)]
pub struct RawRecord {
    values: HashMap<String, String>,
}

impl RawRecord {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.values.get(column).map(String::as_str)
    }
}

impl<K, V> FromIterator<(K, V)> for RawRecord
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

pub struct RowNormalizer<'a> {
    config: &'a RunConfig,
}

impl<'a> RowNormalizer<'a> {
    pub fn new(config: &'a RunConfig) -> Self {
        Self { config }
    }

    /// Fail early if the time column or a NaN filter column is not in the
    /// input header.
    pub fn check_header<'h, I>(&self, headers: I) -> Result<()>
    where
        I: IntoIterator<Item = &'h str>,
    {
        let headers: Vec<&str> = headers.into_iter().collect();
        let required = std::iter::once(&self.config.time_column).chain(&self.config.nan_columns);

        for column in required {
            if !headers.contains(&column.as_str()) {
                return Err(ImportError::MissingColumn {
                    column: column.clone(),
                });
            }
        }
        Ok(())
    }

    fn is_nan_row(&self, record: &RawRecord) -> bool {
        self.config.nan_columns.iter().any(|column| {
            record
                .get(column)
                .is_some_and(|value| self.config.nan_sentinels.contains(value))
        })
    }

    /// Returns `Ok(None)` when the row is dropped by the NaN filter.
    pub fn normalize(
        &self,
        record: &RawRecord,
    ) -> Result<Option<(NormalizedPoint, ResolvedTime)>> {
        if self.is_nan_row(record) {
            return Ok(None);
        }

        let config = self.config;
        let raw_time = record
            .get(&config.time_column)
            .ok_or_else(|| ImportError::MissingColumn {
                column: config.time_column.clone(),
            })?;
        let time = resolve(raw_time, &config.time_format, config.timezone)?;

        let mut tags = BTreeMap::new();
        for mapping in &config.tag_columns {
            let value = match record.get(&mapping.source) {
                Some(v) => TagValue::Text(v.to_string()),
                None => TagValue::Missing,
            };
            tags.insert(mapping.destination.clone(), value);
        }
        for tag in &config.static_tags {
            tags.insert(tag.key.clone(), TagValue::Text(tag.value.clone()));
        }

        let mut fields = BTreeMap::new();
        for mapping in &config.fields {
            let value = match record.get(&mapping.source) {
                Some(v) => infer_field(v),
                None => FieldValue::Float(0.0),
            };
            fields.insert(mapping.destination.clone(), value);
        }

        let point = NormalizedPoint {
            measurement: config.measurement.clone(),
            timestamp_ns: time.nanos,
            tags,
            fields,
        };
        Ok(Some((point, time)))
    }
}
