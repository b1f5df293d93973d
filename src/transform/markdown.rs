//! Markdown view.
//!
//! Output shape for one page with fields `A` and `B⏎`:
//!
//! ```text
//! ## Page 1
//!
//! A B
//!
//!
//! ---
//!
//! ```
//!
//! Lines are collected and joined with `\n`: the heading, one line per
//! paragraph, then a horizontal rule after every page.

use crate::response::OcrResponse;

/// Fields below this confidence are annotated when annotation is enabled.
pub const LOW_CONFIDENCE_THRESHOLD: f64 = 0.9;

/// Render the response as Markdown.
///
/// Field texts are trimmed and empty ones skipped without disturbing the
/// current paragraph. A field whose `line_break` flag is set closes the
/// paragraph after itself; leftovers are flushed at page end. With
/// `include_confidence`, low-confidence fields become `*text* (85.0%)`.
pub fn to_markdown(response: &OcrResponse, include_confidence: bool) -> String {
    let mut lines: Vec<String> = Vec::new();

    for (page_idx, page) in response.images.iter().enumerate() {
        lines.push(format!("## Page {}\n", page_idx + 1));

        let mut paragraph: Vec<String> = Vec::new();
        for field in &page.fields {
            let text = field.infer_text.trim();
            if text.is_empty() {
                continue;
            }

            let text = if include_confidence && field.infer_confidence < LOW_CONFIDENCE_THRESHOLD {
                format!("*{}* ({:.1}%)", text, field.infer_confidence * 100.0)
            } else {
                text.to_string()
            };
            paragraph.push(text);

            if field.line_break {
                lines.push(flush(&mut paragraph));
            }
        }
        if !paragraph.is_empty() {
            lines.push(flush(&mut paragraph));
        }

        lines.push("\n---\n\n".to_string());
    }

    lines.join("\n")
}

fn flush(paragraph: &mut Vec<String>) -> String {
    let line = format!("{}\n", paragraph.join(" "));
    paragraph.clear();
    line
}
