//! Searchable-PDF overlay via pdfium.
//!
//! Every recognised field that carries a full bounding box is written back
//! onto its page as an invisible text object, so the visible page stays
//! untouched while viewers can search and select the OCR text.
//!
//! The service reports boxes in top-left image coordinates; PDF user space
//! starts bottom-left. The baseline goes on the box's bottom edge, flipped
//! through the page height.
//!
//! pdfium is not async-safe, so all work happens inside
//! `tokio::task::spawn_blocking`.

use crate::error::OverlayError;
use crate::response::{OcrResponse, Rect};
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Font size of the inserted text, in points.
pub const OVERLAY_FONT_SIZE: f32 = 11.0;

/// Directory containing the pdfium shared library. Falls back to the
/// system library search path when unset.
pub const ENV_PDFIUM_LIB_PATH: &str = "PDFIUM_LIB_PATH";

/// Text objects to place on one PDF page.
#[derive(Debug, Clone, PartialEq)]
pub struct PagePlan<'a> {
    /// 0-based page index, shared by the response and the PDF.
    pub index: usize,
    pub items: Vec<(Rect, &'a str)>,
}

/// Decide what goes on which page.
///
/// Response pages beyond `pdf_pages` are dropped, as are fields with fewer
/// than four vertices.
pub fn plan_overlay(response: &OcrResponse, pdf_pages: usize) -> Vec<PagePlan<'_>> {
    response
        .images
        .iter()
        .take(pdf_pages)
        .enumerate()
        .map(|(index, page)| PagePlan {
            index,
            items: page
                .fields
                .iter()
                .filter_map(|f| f.bounding_rect().map(|r| (r, f.infer_text.as_str())))
                .collect(),
        })
        .collect()
}

/// Text origin in PDF user space for a box in top-left image coordinates:
/// left edge, baseline on the box bottom.
pub fn text_origin(rect: &Rect, page_height: f32) -> (f32, f32) {
    (rect.x0 as f32, page_height - rect.y1 as f32)
}

/// Bind to the pdfium library.
pub fn bind_pdfium() -> Result<Pdfium, OverlayError> {
    let bindings = match std::env::var_os(ENV_PDFIUM_LIB_PATH) {
        Some(dir) => {
            let lib = Pdfium::pdfium_platform_library_name_at_path(&PathBuf::from(dir));
            debug!("Binding pdfium from {:?}", lib);
            Pdfium::bind_to_library(lib)
        }
        None => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| OverlayError::PdfiumUnavailable(format!("{:?}", e)))?;

    Ok(Pdfium::new(bindings))
}

/// Overlay the OCR text on `source` and save the result to `output`.
///
/// Blocking. Returns the number of text objects inserted.
pub fn write_searchable_pdf(
    source: &Path,
    response: &OcrResponse,
    output: &Path,
) -> Result<usize, OverlayError> {
    let pdfium = bind_pdfium()?;
    write_searchable_pdf_with(&pdfium, source, response, output)
}

/// [`write_searchable_pdf`] with an already bound library.
pub fn write_searchable_pdf_with(
    pdfium: &Pdfium,
    source: &Path,
    response: &OcrResponse,
    output: &Path,
) -> Result<usize, OverlayError> {
    let mut document =
        pdfium
            .load_pdf_from_file(source, None)
            .map_err(|e| OverlayError::OpenFailed {
                path: source.to_path_buf(),
                detail: format!("{:?}", e),
            })?;

    let font = document.fonts_mut().helvetica();
    let page_count = document.pages().len() as usize;
    if response.page_count() > page_count {
        warn!(
            "Response has {} pages but {} has {}; extra pages skipped",
            response.page_count(),
            source.display(),
            page_count
        );
    }

    let mut inserted = 0usize;
    for plan in plan_overlay(response, page_count) {
        let page_num = plan.index + 1;
        let page_err = |e: PdfiumError| OverlayError::PageFailed {
            page: page_num,
            detail: format!("{:?}", e),
        };

        let mut page = document.pages().get(plan.index as u16).map_err(page_err)?;
        let page_height = page.height().value;

        for (rect, text) in &plan.items {
            let (x, y) = text_origin(rect, page_height);
            let mut object = page
                .objects_mut()
                .create_text_object(
                    PdfPoints::new(x),
                    PdfPoints::new(y),
                    *text,
                    font,
                    PdfPoints::new(OVERLAY_FONT_SIZE),
                )
                .map_err(page_err)?;

            if let Some(text) = object.as_text_object_mut() {
                text.set_render_mode(PdfPageTextRenderMode::Invisible)
                    .map_err(page_err)?;
            }
            inserted += 1;
        }
        debug!("Page {}: {} text objects", page_num, plan.items.len());
    }

    document
        .save_to_file(output)
        .map_err(|e| OverlayError::SaveFailed {
            path: output.to_path_buf(),
            detail: format!("{:?}", e),
        })?;

    Ok(inserted)
}

/// Produce `output` from `source` with an invisible OCR text layer.
///
/// Never fails: any error is logged and reported as `false`.
pub async fn to_searchable_pdf(
    source: impl AsRef<Path>,
    response: Arc<OcrResponse>,
    output: impl AsRef<Path>,
) -> bool {
    let source = source.as_ref().to_path_buf();
    let output = output.as_ref().to_path_buf();

    let result = {
        let (source, output) = (source.clone(), output.clone());
        tokio::task::spawn_blocking(move || write_searchable_pdf(&source, &response, &output))
            .await
            .map_err(|e| OverlayError::TaskPanicked(e.to_string()))
            .and_then(|r| r)
    };

    match result {
        Ok(count) => {
            info!(
                "Searchable PDF written: {} ({} text objects)",
                output.display(),
                count
            );
            true
        }
        Err(e) => {
            error!("Searchable PDF from {} failed: {}", source.display(), e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::fixtures::{boxed, field, response};
    use tempfile::TempDir;

    #[test]
    fn baseline_is_flipped_through_page_height() {
        let rect = Rect { x0: 12.0, y0: 40.0, x1: 91.0, y1: 61.0 };
        assert_eq!(text_origin(&rect, 842.0), (12.0, 781.0));
        assert_eq!(text_origin(&rect, 61.0), (12.0, 0.0));
    }

    #[test]
    fn plan_drops_pages_past_the_pdf() {
        let resp = response(vec![
            vec![boxed(field("one", 0.9, true), 10.0, 20.0, 30.0, 5.0)],
            vec![boxed(field("two", 0.9, true), 10.0, 20.0, 30.0, 5.0)],
        ]);
        let plan = plan_overlay(&resp, 1);
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].index, 0);
        assert_eq!(plan[0].items.len(), 1);
        assert_eq!(plan[0].items[0].1, "one");
        assert_eq!(
            plan[0].items[0].0,
            Rect { x0: 10.0, y0: 20.0, x1: 40.0, y1: 25.0 }
        );

        assert_eq!(plan_overlay(&resp, 5).len(), 2);
        assert!(plan_overlay(&resp, 0).is_empty());
    }

    #[test]
    fn plan_skips_fields_without_a_full_box() {
        let mut short = boxed(field("short", 0.9, false), 0.0, 0.0, 5.0, 5.0);
        if let Some(poly) = short.bounding_poly.as_mut() {
            poly.vertices.truncate(3);
        }
        let resp = response(vec![vec![
            field("nobox", 0.9, false),
            short,
            boxed(field("kept", 0.9, true), 1.0, 2.0, 3.0, 4.0),
        ]]);

        let plan = plan_overlay(&resp, 1);
        let texts: Vec<&str> = plan[0].items.iter().map(|(_, t)| *t).collect();
        assert_eq!(texts, vec!["kept"]);
    }

    #[tokio::test]
    async fn missing_source_yields_false() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("searchable.pdf");
        let ok = to_searchable_pdf(
            dir.path().join("nope.pdf"),
            Arc::new(OcrResponse::default()),
            &out,
        )
        .await;
        assert!(!ok);
        assert!(!out.exists());
    }

    #[test]
    fn blocking_writer_reports_an_error_for_missing_source() {
        let dir = TempDir::new().unwrap();
        let err = write_searchable_pdf(
            &dir.path().join("nope.pdf"),
            &OcrResponse::default(),
            &dir.path().join("out.pdf"),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            OverlayError::PdfiumUnavailable(_) | OverlayError::OpenFailed { .. }
        ));
    }
}
