//! Tabular view: one row per recognised field.

use crate::response::OcrResponse;
use serde::{Deserialize, Serialize};

/// One field flattened into a table row. Serialises to the `ocr_data.csv`
/// columns `page,field_index,text,confidence,type,line_break,x1,y1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrRow {
    /// 1-based page number.
    pub page: usize,
    /// 1-based index within the page.
    pub field_index: usize,
    pub text: String,
    pub confidence: f64,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(rename = "line_break")]
    pub is_line_break: bool,
    /// First vertex of the bounding polygon; `0` when absent.
    pub x1: f64,
    pub y1: f64,
}

/// Flatten every field of every page into rows, page-major, in field order.
pub fn to_rows(response: &OcrResponse) -> Vec<OcrRow> {
    response
        .images
        .iter()
        .enumerate()
        .flat_map(|(page_idx, page)| {
            page.fields.iter().enumerate().map(move |(field_idx, field)| {
                let (x1, y1) = field.first_vertex();
                OcrRow {
                    page: page_idx + 1,
                    field_index: field_idx + 1,
                    text: field.infer_text.clone(),
                    confidence: field.infer_confidence,
                    field_type: field.field_type.clone(),
                    is_line_break: field.line_break,
                    x1,
                    y1,
                }
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::fixtures::{boxed, field, response};
    use serde_json::json;

    #[test]
    fn single_field_with_box() {
        let resp: OcrResponse = serde_json::from_value(json!({
            "images": [{"fields": [{
                "inferText": "hello",
                "inferConfidence": 0.95,
                "boundingPoly": {"vertices": [
                    {"x": 0, "y": 0}, {"x": 10, "y": 0}, {"x": 10, "y": 5}, {"x": 0, "y": 5}
                ]}
            }]}]
        }))
        .unwrap();

        let rows = to_rows(&resp);
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.page, 1);
        assert_eq!(row.field_index, 1);
        assert_eq!(row.text, "hello");
        assert_eq!(row.confidence, 0.95);
        assert_eq!((row.x1, row.y1), (0.0, 0.0));
        assert_eq!(row.field_type, "NORMAL");
        assert!(!row.is_line_break);
    }

    #[test]
    fn row_count_matches_field_count_and_order_is_page_major() {
        let resp = response(vec![
            vec![field("a", 0.9, false), field("b", 0.8, true)],
            vec![],
            vec![boxed(field("c", 0.7, false), 12.0, 34.0, 5.0, 5.0)],
        ]);
        let rows = to_rows(&resp);

        assert_eq!(rows.len(), resp.field_count());
        let keys: Vec<(usize, usize, &str)> = rows
            .iter()
            .map(|r| (r.page, r.field_index, r.text.as_str()))
            .collect();
        assert_eq!(keys, vec![(1, 1, "a"), (1, 2, "b"), (3, 1, "c")]);
        assert_eq!((rows[2].x1, rows[2].y1), (12.0, 34.0));
        assert!(rows[1].is_line_break);
    }

    #[test]
    fn empty_response_has_no_rows() {
        assert!(to_rows(&OcrResponse::default()).is_empty());
    }
}
