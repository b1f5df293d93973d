//! Plain-text view.

use crate::response::{OcrPage, OcrResponse};

/// Inserted between pages by [`to_text`].
pub const PAGE_SEPARATOR: &str = "\n\n--- Page Break ---\n\n";

/// Concatenate field texts per page and join pages with [`PAGE_SEPARATOR`].
///
/// Each field is followed by `\n` when it ends a line and by a single space
/// otherwise, so a page's text always ends with one of the two.
pub fn to_text(response: &OcrResponse) -> String {
    response
        .images
        .iter()
        .map(page_text)
        .collect::<Vec<_>>()
        .join(PAGE_SEPARATOR)
}

pub(crate) fn page_text(page: &OcrPage) -> String {
    let mut out = String::new();
    for field in &page.fields {
        out.push_str(&field.infer_text);
        out.push(if field.line_break { '\n' } else { ' ' });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::fixtures::{field, response};
    use crate::transform::to_rows;

    #[test]
    fn line_break_controls_separator() {
        let resp = response(vec![vec![field("A", 0.9, false), field("B", 0.9, true)]]);
        assert_eq!(to_text(&resp), "A B\n");
    }

    #[test]
    fn pages_are_joined_with_separator() {
        let resp = response(vec![
            vec![field("first", 0.9, true)],
            vec![field("second", 0.9, false)],
        ]);
        assert_eq!(
            to_text(&resp),
            "first\n\n\n--- Page Break ---\n\nsecond "
        );
    }

    #[test]
    fn agrees_with_rows_without_line_breaks() {
        let resp = response(vec![vec![
            field("안녕하세요", 0.99, false),
            field("테스트입니다", 0.97, false),
            field("end", 0.5, false),
        ]]);
        let joined: String = to_rows(&resp)
            .iter()
            .map(|r| format!("{} ", r.text))
            .collect();
        assert_eq!(to_text(&resp), joined);
    }

    #[test]
    fn empty_pages_still_take_a_slot() {
        let resp = response(vec![vec![], vec![field("x", 1.0, false)]]);
        assert_eq!(to_text(&resp), format!("{PAGE_SEPARATOR}x "));
    }
}
