//! Record-source payloads: stand status rows and raw polygon lists.
//!
//! Fetching is the host's job. This module only decodes what arrives (a
//! published CSV sheet and a `{"polygons": [...]}` JSON document), classifies
//! free-text statuses, and normalises identifiers so polygons and rows match
//! regardless of case or stray whitespace.

#[cfg(test)]
#[path = "records_test.rs"]
mod records_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::align::SourcePolygon;

/// Errors from decoding record-source payloads.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// The status sheet has no column with the expected header.
    #[error("status sheet has no `{0}` column")]
    MissingColumn(String),

    /// The polygon document is not valid JSON.
    #[error("polygon document parse failed: {0}")]
    PolygonJson(#[from] serde_json::Error),
}

/// Availability classes a stand can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKey {
    Available,
    Reserved,
    Unavailable,
    #[default]
    Unknown,
}

impl StatusKey {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Reserved => "reserved",
            Self::Unavailable => "unavailable",
            Self::Unknown => "unknown",
        }
    }
}

/// Trim and lowercase an identifier or header for matching.
#[must_use]
pub fn normalize_id(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Classify free-text status by prefix.
///
/// `avail…` → available, `reser…` or exactly `pending` → reserved,
/// `unavail…` → unavailable, anything else → unknown.
#[must_use]
pub fn classify_status(raw: &str) -> StatusKey {
    let t = normalize_id(raw);
    if t.starts_with("avail") {
        StatusKey::Available
    } else if t.starts_with("reser") || t == "pending" {
        StatusKey::Reserved
    } else if t.starts_with("unavail") {
        StatusKey::Unavailable
    } else {
        StatusKey::Unknown
    }
}

/// One stand's row from the status sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusRecord {
    /// Identifier as written in the sheet, trimmed.
    pub id: String,
    pub status: StatusKey,
    /// Status cell exactly as written.
    pub raw_status: String,
    /// Remaining columns in header order, excluding id and status.
    pub attributes: Vec<(String, String)>,
}

/// Status records keyed by normalised identifier.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusMap {
    records: HashMap<String, StatusRecord>,
}

impl StatusMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert under the record's normalised id, replacing any earlier row.
    pub fn insert(&mut self, record: StatusRecord) {
        self.records.insert(normalize_id(&record.id), record);
    }

    /// Find the record for a polygon id, retrying without a `stand-` prefix.
    #[must_use]
    pub fn lookup(&self, polygon_id: &str) -> Option<&StatusRecord> {
        let key = normalize_id(polygon_id);
        if let Some(rec) = self.records.get(&key) {
            return Some(rec);
        }
        key.strip_prefix("stand-").and_then(|stripped| self.records.get(stripped))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Header names used to find the id and status columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetColumns {
    pub id: String,
    pub status: String,
}

impl Default for SheetColumns {
    fn default() -> Self {
        Self { id: "StandID".into(), status: "Status".into() }
    }
}

/// Split CSV text into rows of fields.
///
/// Handles quoted fields with doubled quotes, embedded commas and newlines.
/// Carriage returns outside quotes are dropped.
#[must_use]
pub fn parse_csv(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
            continue;
        }
        match c {
            '"' => in_quotes = true,
            ',' => row.push(std::mem::take(&mut field)),
            '\n' => {
                row.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut row));
            }
            '\r' => {}
            _ => field.push(c),
        }
    }
    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }
    rows
}

/// Decode the status sheet into a [`StatusMap`].
///
/// An empty sheet yields an empty map. Rows with an empty id are skipped.
///
/// # Errors
///
/// Returns [`RecordError::MissingColumn`] when the header row lacks the id or
/// status column.
pub fn parse_status_sheet(text: &str, columns: &SheetColumns) -> Result<StatusMap, RecordError> {
    let rows = parse_csv(text);
    let Some((header_row, body)) = rows.split_first() else {
        return Ok(StatusMap::new());
    };
    let headers: Vec<String> = header_row.iter().map(|h| h.trim().to_string()).collect();
    let find = |name: &str| {
        let wanted = normalize_id(name);
        headers.iter().position(|h| normalize_id(h) == wanted)
    };
    let id_idx = find(&columns.id).ok_or_else(|| RecordError::MissingColumn(columns.id.clone()))?;
    let status_idx = find(&columns.status).ok_or_else(|| RecordError::MissingColumn(columns.status.clone()))?;

    let mut map = StatusMap::new();
    for row in body {
        let id = row.get(id_idx).map_or("", |s| s.trim());
        if id.is_empty() {
            continue;
        }
        let raw_status = row.get(status_idx).cloned().unwrap_or_default();
        let attributes = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != id_idx && *i != status_idx)
            .map(|(i, h)| (h.clone(), row.get(i).cloned().unwrap_or_default()))
            .collect();
        map.insert(StatusRecord { id: id.to_string(), status: classify_status(&raw_status), raw_status, attributes });
    }
    Ok(map)
}

/// A polygon as delivered by the polygon source: id plus raw point text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPolygon {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub points: String,
}

impl RawPolygon {
    #[must_use]
    pub fn to_source(&self) -> SourcePolygon {
        SourcePolygon::parse(&self.id, &self.points)
    }
}

/// Decode `{"polygons": [...]}`. A missing or non-array `polygons` is empty.
///
/// # Errors
///
/// Returns [`RecordError::PolygonJson`] when the text is not JSON or a
/// polygon entry has the wrong shape.
pub fn parse_polygon_document(text: &str) -> Result<Vec<RawPolygon>, RecordError> {
    let doc: serde_json::Value = serde_json::from_str(text)?;
    match doc.get("polygons") {
        Some(list @ serde_json::Value::Array(_)) => Ok(serde_json::from_value(list.clone())?),
        _ => Ok(Vec::new()),
    }
}
