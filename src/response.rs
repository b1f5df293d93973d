//! Typed schema of the CLOVA OCR V2 response.
//!
//! Every optional key carries an explicit serde default so the transformers
//! never have to guess: a missing `inferText` is `""`, a missing
//! `inferConfidence` is `0.0`, a missing `type` is `"NORMAL"`, missing
//! `tables` is empty.
//!
//! Geometry is parsed leniently. A `boundingPoly` that is present but
//! malformed becomes `None`, and a vertex coordinate that is not a number
//! becomes `0.0`, instead of rejecting the whole response.
//!
//! Keys this crate does not model are kept in the `extra` maps. A response
//! parsed with [`OcrResponse::from_json_slice`] also keeps the body exactly
//! as received, and that body is what `ocr_result.json` holds.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::sync::Arc;

/// A complete OCR response: one [`OcrPage`] per input page or image.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,

    /// Pages in document order.
    #[serde(default)]
    pub images: Vec<OcrPage>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,

    /// Untouched service body. Not part of equality.
    #[serde(skip)]
    pub raw: Option<Arc<Value>>,
}

impl PartialEq for OcrResponse {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version
            && self.request_id == other.request_id
            && self.timestamp == other.timestamp
            && self.images == other.images
            && self.extra == other.extra
    }
}

impl OcrResponse {
    /// Parse a JSON body, keeping the original document alongside the
    /// typed view.
    pub fn from_json_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        let raw: Value = serde_json::from_slice(body)?;
        let mut parsed = Self::deserialize(&raw)?;
        parsed.raw = Some(Arc::new(raw));
        Ok(parsed)
    }

    /// The body as received, or the typed view re-serialised when the
    /// response was built in code.
    pub fn to_raw_json(&self) -> Result<Cow<'_, Value>, serde_json::Error> {
        match self.raw {
            Some(ref raw) => Ok(Cow::Borrowed(raw.as_ref())),
            None => serde_json::to_value(self).map(Cow::Owned),
        }
    }

    /// Number of pages in the response.
    pub fn page_count(&self) -> usize {
        self.images.len()
    }

    /// Total number of fields across all pages.
    pub fn field_count(&self) -> usize {
        self.images.iter().map(|p| p.fields.len()).sum()
    }

    /// Get a page by its 1-based number.
    pub fn page(&self, page_num: usize) -> Option<&OcrPage> {
        page_num.checked_sub(1).and_then(|i| self.images.get(i))
    }
}

/// One recognised page (or image).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrPage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// `SUCCESS` or `FAILURE` as reported by the service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub infer_result: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Recognised text spans in reading order.
    #[serde(default)]
    pub fields: Vec<OcrField>,

    /// Detected tables; only present when table detection was requested.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tables: Vec<OcrTable>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One recognised text span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrField {
    #[serde(default)]
    pub infer_text: String,

    /// Confidence in `[0, 1]`.
    #[serde(default)]
    pub infer_confidence: f64,

    #[serde(rename = "type", default = "default_field_type")]
    pub field_type: String,

    /// True when this field ends a visual line.
    #[serde(default)]
    pub line_break: bool,

    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub bounding_poly: Option<BoundingPoly>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for OcrField {
    fn default() -> Self {
        Self {
            infer_text: String::new(),
            infer_confidence: 0.0,
            field_type: default_field_type(),
            line_break: false,
            bounding_poly: None,
            extra: Map::new(),
        }
    }
}

impl OcrField {
    /// First vertex of the bounding polygon, `(0, 0)` when there is none.
    pub fn first_vertex(&self) -> (f64, f64) {
        self.bounding_poly
            .as_ref()
            .and_then(|poly| poly.vertices.first())
            .map(|v| (v.x, v.y))
            .unwrap_or((0.0, 0.0))
    }

    /// Axis-aligned rectangle around the field, when it has a full polygon.
    pub fn bounding_rect(&self) -> Option<Rect> {
        self.bounding_poly.as_ref().and_then(BoundingPoly::bounding_rect)
    }
}

fn default_field_type() -> String {
    "NORMAL".to_string()
}

/// Polygon delimiting a field on the page image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingPoly {
    #[serde(default)]
    pub vertices: Vec<Vertex>,
}

impl BoundingPoly {
    /// Min/max box over the vertices. `None` below four vertices.
    pub fn bounding_rect(&self) -> Option<Rect> {
        if self.vertices.len() < 4 {
            return None;
        }
        let mut rect = Rect {
            x0: f64::INFINITY,
            y0: f64::INFINITY,
            x1: f64::NEG_INFINITY,
            y1: f64::NEG_INFINITY,
        };
        for v in &self.vertices {
            rect.x0 = rect.x0.min(v.x);
            rect.y0 = rect.y0.min(v.y);
            rect.x1 = rect.x1.max(v.x);
            rect.y1 = rect.y1.max(v.y);
        }
        Some(rect)
    }
}

/// A polygon vertex in image pixel coordinates (origin top-left).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    #[serde(default, deserialize_with = "lenient_coord")]
    pub x: f64,
    #[serde(default, deserialize_with = "lenient_coord")]
    pub y: f64,
}

/// Axis-aligned rectangle, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Rect {
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }
}

/// A detected table, as a sparse list of cells.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrTable {
    #[serde(default)]
    pub cells: Vec<TableCell>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One table cell at a zero-based grid position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableCell {
    #[serde(default)]
    pub row_index: usize,

    #[serde(default)]
    pub column_index: usize,

    #[serde(default)]
    pub cell_text_lines: Vec<CellTextLine>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TableCell {
    /// Text of the first line, or `""` for an empty cell.
    pub fn first_line(&self) -> &str {
        self.cell_text_lines
            .first()
            .map(|l| l.text.as_str())
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CellTextLine {
    #[serde(default)]
    pub text: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── Lenient deserialisers ────────────────────────────────────────────────

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

fn lenient_coord<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_keys_take_defaults() {
        let resp: OcrResponse =
            serde_json::from_value(json!({"images": [{"fields": [{}]}]})).unwrap();
        let field = &resp.images[0].fields[0];
        assert_eq!(field.infer_text, "");
        assert_eq!(field.infer_confidence, 0.0);
        assert_eq!(field.field_type, "NORMAL");
        assert!(!field.line_break);
        assert!(field.bounding_poly.is_none());
        assert!(resp.images[0].tables.is_empty());
    }

    #[test]
    fn malformed_bounding_poly_is_ignored() {
        let resp: OcrResponse = serde_json::from_value(json!({
            "images": [{"fields": [
                {"inferText": "a", "boundingPoly": "oops"},
                {"inferText": "b", "boundingPoly": {"vertices": [{"x": "12", "y": null}]}}
            ]}]
        }))
        .unwrap();
        let fields = &resp.images[0].fields;
        assert!(fields[0].bounding_poly.is_none());
        assert_eq!(fields[0].first_vertex(), (0.0, 0.0));
        assert_eq!(fields[1].first_vertex(), (12.0, 0.0));
    }

    #[test]
    fn bounding_rect_needs_four_vertices() {
        let poly = BoundingPoly {
            vertices: vec![Vertex { x: 1.0, y: 2.0 }, Vertex { x: 5.0, y: 2.0 }],
        };
        assert!(poly.bounding_rect().is_none());

        let poly = BoundingPoly {
            vertices: vec![
                Vertex { x: 12.0, y: 40.0 },
                Vertex { x: 90.0, y: 38.0 },
                Vertex { x: 91.0, y: 60.0 },
                Vertex { x: 11.0, y: 61.0 },
            ],
        };
        let rect = poly.bounding_rect().unwrap();
        assert_eq!(rect, Rect { x0: 11.0, y0: 38.0, x1: 91.0, y1: 61.0 });
        assert_eq!(rect.width(), 80.0);
        assert_eq!(rect.height(), 23.0);
    }

    #[test]
    fn unknown_keys_survive_round_trip() {
        let raw = json!({
            "version": "V2",
            "requestId": "abc",
            "timestamp": 1700000000000i64,
            "images": [{
                "uid": "u1",
                "inferResult": "SUCCESS",
                "validationResult": {"result": "NO_REQUESTED"},
                "fields": [{"inferText": "x", "valueType": "ALL"}]
            }]
        });
        let resp: OcrResponse = serde_json::from_value(raw).unwrap();
        assert!(resp.images[0].extra.contains_key("validationResult"));
        let back = serde_json::to_value(&resp).unwrap();
        assert_eq!(back["images"][0]["fields"][0]["valueType"], "ALL");
        assert_eq!(back["images"][0]["validationResult"]["result"], "NO_REQUESTED");
        assert_eq!(back["requestId"], "abc");
    }

    #[test]
    fn raw_body_is_kept_verbatim() {
        let body = json!({
            "images": [{
                "fields": [
                    {"inferText": "a", "boundingPoly": {"vertices": [{"x": 10, "y": 20}]}},
                    {"inferText": "b", "boundingPoly": {"vertices": "bad"}}
                ],
                "tables": []
            }]
        });
        let resp = OcrResponse::from_json_slice(body.to_string().as_bytes()).unwrap();

        assert_eq!(resp.images[0].fields[0].first_vertex(), (10.0, 20.0));
        assert!(resp.images[0].fields[1].bounding_poly.is_none());
        assert_eq!(*resp.to_raw_json().unwrap(), body);

        // Equality ignores the stored body.
        let typed: OcrResponse = serde_json::from_value(body).unwrap();
        assert!(typed.raw.is_none());
        assert_eq!(typed, resp);
        assert_eq!(typed.to_raw_json().unwrap()["images"][0]["fields"][0]["lineBreak"], false);
    }

    #[test]
    fn page_lookup_is_one_based() {
        let resp = OcrResponse {
            images: vec![OcrPage::default(), OcrPage::default()],
            ..Default::default()
        };
        assert!(resp.page(0).is_none());
        assert!(resp.page(1).is_some());
        assert!(resp.page(2).is_some());
        assert!(resp.page(3).is_none());
    }

    #[test]
    fn table_cell_first_line() {
        let cell: TableCell = serde_json::from_value(json!({
            "rowIndex": 1, "columnIndex": 2,
            "cellTextLines": [{"text": "first"}, {"text": "second"}]
        }))
        .unwrap();
        assert_eq!((cell.row_index, cell.column_index), (1, 2));
        assert_eq!(cell.first_line(), "first");
        assert_eq!(TableCell::default().first_line(), "");
    }
}
