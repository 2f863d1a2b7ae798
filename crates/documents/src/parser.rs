//! Normalization of raw search index records.
//!
//! The index stores multi-valued fields as arrays even when only one value is
//! present, and the geometry field as a (possibly single-quoted) GeoJSON
//! feature string. [`DocumentParser`] unwraps all of that once, at ingestion,
//! so the rest of the workspace only sees [`CanonicalDocument`]s.

use crate::error::{DocumentError, Result};
use geosearch_geo::{Geometry, GeometryType};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

/// An untyped record as returned by the index.
pub type RawRecord = Map<String, Value>;

/// Default name of the geometry field.
pub const DEFAULT_GEOMETRY_FIELD: &str = "geom";

/// Field holding the access restriction flag.
pub const ACCESS_CONDITION_FIELD: &str = "accessCondition_uui";

/// Flag value marking a restricted document.
pub const RESTRICTED_VALUE: &str = "ja";

/// Flag value marking a public document.
pub const UNRESTRICTED_VALUE: &str = "nein";

/// Flat, unwrapped document properties.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentProperties {
    pub collection: Option<String>,
    pub purl: Option<String>,
    pub thumbnail: Option<String>,
    pub timestamp: Option<String>,
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub doc_type: Option<String>,
    pub record_id: Option<String>,
    pub shelfmark_usi: Option<String>,
    pub restricted: bool,
}

/// A parsed search index document.
///
/// `id` and `geometry` are always present. The original record is kept
/// untouched in `raw`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalDocument {
    pub id: String,
    pub geometry: Geometry,
    pub properties: DocumentProperties,
    #[serde(skip)]
    pub raw: RawRecord,
}

impl CanonicalDocument {
    /// Kind of the document's geometry.
    #[inline]
    pub fn geometry_type(&self) -> GeometryType {
        self.geometry.geometry_type()
    }
}

/// Parses raw records into [`CanonicalDocument`]s.
#[derive(Debug, Clone)]
pub struct DocumentParser {
    geometry_field: String,
}

impl Default for DocumentParser {
    fn default() -> Self {
        Self::new(DEFAULT_GEOMETRY_FIELD)
    }
}

impl DocumentParser {
    /// Creates a parser reading geometries from `geometry_field`.
    pub fn new(geometry_field: impl Into<String>) -> Self {
        Self {
            geometry_field: geometry_field.into(),
        }
    }

    /// Name of the geometry field.
    pub fn geometry_field(&self) -> &str {
        &self.geometry_field
    }

    /// Parses a single record.
    ///
    /// # Errors
    ///
    /// [`DocumentError::MissingField`] if the geometry field or `id` is
    /// absent, [`DocumentError::InvalidGeometry`] if the geometry cannot be
    /// decoded.
    pub fn parse(&self, raw: RawRecord) -> Result<CanonicalDocument> {
        let geometry_value = raw
            .get(&self.geometry_field)
            .filter(|v| !v.is_null())
            .ok_or_else(|| DocumentError::missing_field(&self.geometry_field))?;
        let id = scalar(raw.get("id")).ok_or_else(|| DocumentError::missing_field("id"))?;

        let geometry = parse_geometry(&id, geometry_value)?;

        let properties = DocumentProperties {
            collection: scalar(raw.get("collection")),
            purl: scalar(raw.get("purl")),
            thumbnail: scalar(raw.get("thumbnail")),
            timestamp: scalar(raw.get("timestamp")),
            title: scalar(raw.get("title")),
            doc_type: scalar(raw.get("type")),
            record_id: scalar(raw.get("record_id")),
            shelfmark_usi: scalar(raw.get("shelfmark_usi")),
            restricted: is_restricted(&id, raw.get(ACCESS_CONDITION_FIELD)),
        };

        Ok(CanonicalDocument {
            id,
            geometry,
            properties,
            raw,
        })
    }

    /// Parses any JSON value; non-objects lack every field.
    pub fn parse_value(&self, value: Value) -> Result<CanonicalDocument> {
        match value {
            Value::Object(raw) => self.parse(raw),
            _ => Err(DocumentError::missing_field("id")),
        }
    }
}

/// Unwraps a singleton array and renders the scalar as a string.
///
/// Absent, null and empty values yield `None`.
pub fn scalar(value: Option<&Value>) -> Option<String> {
    let value = match value? {
        Value::Array(items) => items.first()?,
        other => other,
    };
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn is_restricted(id: &str, value: Option<&Value>) -> bool {
    let Some(flag) = scalar(value) else {
        return false;
    };
    let flag = flag.trim().to_lowercase();
    if flag == RESTRICTED_VALUE {
        true
    } else {
        if flag != UNRESTRICTED_VALUE {
            debug!(id, flag = %flag, "Unknown access condition, treating as public");
        }
        false
    }
}

fn parse_geometry(id: &str, value: &Value) -> Result<Geometry> {
    let value = match value {
        Value::Array(items) => items
            .first()
            .ok_or_else(|| DocumentError::invalid_geometry(id, "empty geometry field"))?,
        other => other,
    };

    let shape = match value {
        Value::String(encoded) => serde_json::from_str::<Value>(&encoded.replace('\'', "\""))
            .map_err(|e| DocumentError::invalid_geometry(id, e.to_string()))?,
        Value::Object(_) => value.clone(),
        other => {
            return Err(DocumentError::invalid_geometry(
                id,
                format!("unexpected geometry value {other}"),
            ))
        }
    };

    // Features carry the geometry in a member; bare geometries are taken as-is.
    let geometry = match shape {
        Value::Object(mut feature) if feature.contains_key("geometry") => {
            feature.remove("geometry").unwrap_or(Value::Null)
        }
        bare => bare,
    };

    serde_json::from_value(geometry).map_err(|e| DocumentError::invalid_geometry(id, e.to_string()))
}
