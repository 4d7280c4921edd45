//! Normalized measurement points and their InfluxDB write form.

use std::collections::BTreeMap;

use influxdb::{InfluxDbWriteable, Timestamp, Type, WriteQuery};

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Float(f64),
    Boolean(bool),
    Text(String),
}

/// Tag value. A tag column missing from the row becomes the integer
/// placeholder `0` rather than a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagValue {
    Text(String),
    Missing,
}

impl From<&FieldValue> for Type {
    fn from(value: &FieldValue) -> Self {
        match value {
            FieldValue::Float(f) => Type::Float(*f),
            FieldValue::Boolean(b) => Type::Boolean(*b),
            FieldValue::Text(s) => Type::Text(s.clone()),
        }
    }
}

impl From<&TagValue> for Type {
    fn from(value: &TagValue) -> Self {
        match value {
            TagValue::Text(s) => Type::Text(s.clone()),
            TagValue::Missing => Type::SignedInteger(0),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedPoint {
    pub measurement: String,
    /// Nanoseconds since the Unix epoch, always >= 0
    pub timestamp_ns: i64,
    pub tags: BTreeMap<String, TagValue>,
    pub fields: BTreeMap<String, FieldValue>,
}

impl InfluxDbWriteable for &NormalizedPoint {
    fn into_query<I: Into<String>>(self, name: I) -> WriteQuery {
        // timestamp_ns is non-negative by construction
        let ts = Timestamp::Nanoseconds(self.timestamp_ns.max(0) as u128);
        let mut query = WriteQuery::new(ts, name);

        for (key, value) in &self.tags {
            query = query.add_tag(key, Type::from(value));
        }
        for (key, value) in &self.fields {
            query = query.add_field(key, Type::from(value));
        }

        query
    }
}

impl NormalizedPoint {
    pub fn to_query(&self) -> WriteQuery {
        self.into_query(self.measurement.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use influxdb::Query;

    fn point() -> NormalizedPoint {
        let mut tags = BTreeMap::new();
        tags.insert("host".to_string(), TagValue::Text("web01".to_string()));
        tags.insert("rack".to_string(), TagValue::Missing);

        let mut fields = BTreeMap::new();
        fields.insert("load".to_string(), FieldValue::Float(0.5));
        fields.insert("up".to_string(), FieldValue::Boolean(true));
        fields.insert("state".to_string(), FieldValue::Text("ok".to_string()));

        NormalizedPoint {
            measurement: "cpu".to_string(),
            timestamp_ns: 1_700_000_000_000_000_000,
            tags,
            fields,
        }
    }

    #[test]
    fn test_line_protocol_output() {
        let line = point().to_query().build().unwrap().get();

        assert!(line.starts_with("cpu,host=web01,rack=0 "));
        assert!(line.contains("load=0.5"));
        assert!(line.contains("up=true"));
        assert!(line.contains("state=\"ok\""));
        assert!(line.ends_with(" 1700000000000000000"));
    }
}
