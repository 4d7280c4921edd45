//! Column mapping DSL.
//!
//! Field specs look like `"temp:temperature,humidity"`; tag specs accept the
//! same `source:dest` form plus static `key=value` assignments.

/// CSV column to database name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    pub source: String,
    pub destination: String,
}

impl ColumnMapping {
    pub fn new(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }

    /// Mapping that keeps the column name
    pub fn identity(column: impl Into<String>) -> Self {
        let column = column.into();
        Self {
            destination: column.clone(),
            source: column,
        }
    }
}

/// Tag with a constant value for every point of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticTag {
    pub key: String,
    pub value: String,
}

impl StaticTag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Parsed tag spec: column-sourced tags and literal tags
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagMappings {
    pub columns: Vec<ColumnMapping>,
    pub statics: Vec<StaticTag>,
}

fn tokens(spec: &str) -> impl Iterator<Item = &str> {
    spec.split(',').filter(|token| !token.is_empty())
}

/// Parse a field spec. Only the first two `:` separated parts of a token
/// are used; anything after them is ignored.
pub fn parse_field_mappings(spec: &str) -> Vec<ColumnMapping> {
    tokens(spec)
        .map(|token| {
            let mut parts = token.split(':');
            let source = parts.next().unwrap_or_default();
            match parts.next() {
                Some(destination) => ColumnMapping::new(source, destination),
                None => ColumnMapping::identity(source),
            }
        })
        .collect()
}

/// Parse a tag spec. `:` wins over `=`, so `a:b=c` renames column `a` to
/// the tag `b=c`.
pub fn parse_tag_mappings(spec: &str) -> TagMappings {
    let mut mappings = TagMappings::default();

    for token in tokens(spec) {
        if let Some((source, destination)) = split_pair(token, ':') {
            mappings
                .columns
                .push(ColumnMapping::new(source, destination));
        } else if let Some((key, value)) = split_pair(token, '=') {
            mappings.statics.push(StaticTag::new(key, value));
        } else {
            mappings.columns.push(ColumnMapping::identity(token));
        }
    }

    mappings
}

// First two parts of the split, like taking `m[0], m[1]` of a full split.
fn split_pair(token: &str, separator: char) -> Option<(&str, &str)> {
    let mut parts = token.split(separator);
    let first = parts.next()?;
    let second = parts.next()?;
    Some((first, second))
}
