//! Cache-checked OCR client.
//!
//! [`OcrClient`] pairs an [`OcrService`] with a [`ResponseCache`]. Asking for
//! the same file, language and table flag twice within a process returns the
//! first response without a second request.

use crate::cache::{CacheKey, ResponseCache};
use crate::config::OcrConfig;
use crate::error::ClovaOcrError;
use crate::pipeline::request;
use crate::pipeline::service::{ClovaHttpService, OcrService};
use crate::response::OcrResponse;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};

/// OCR client owning its response cache.
pub struct OcrClient {
    service: Arc<dyn OcrService>,
    cache: ResponseCache,
}

impl fmt::Debug for OcrClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OcrClient")
            .field("service", &"<dyn OcrService>")
            .field("cached", &self.cache.len())
            .finish()
    }
}

impl OcrClient {
    /// Build a client from the configuration.
    ///
    /// A pre-constructed `config.service` is used as-is; otherwise a
    /// [`ClovaHttpService`] is created from the URL, key and timeout.
    pub fn new(config: &OcrConfig) -> Result<Self, ClovaOcrError> {
        let service: Arc<dyn OcrService> = match config.service {
            Some(ref service) => Arc::clone(service),
            None => Arc::new(ClovaHttpService::from_config(config)?),
        };
        Ok(Self::with_service(service))
    }

    pub fn with_service(service: Arc<dyn OcrService>) -> Self {
        Self {
            service,
            cache: ResponseCache::new(),
        }
    }

    /// Run OCR on a PDF or image file.
    ///
    /// The cache is consulted first. On a miss the file is validated and read
    /// (a missing file fails here, before any network activity), one request
    /// is sent, and a successful response is cached. Failures are logged and
    /// returned; nothing is cached for them.
    pub async fn ocr_from_file(
        &mut self,
        path: impl AsRef<Path>,
        lang: &str,
        enable_table: bool,
    ) -> Result<Arc<OcrResponse>, ClovaOcrError> {
        let path = path.as_ref();
        let key = CacheKey::new(path, lang, enable_table);
        if let Some(hit) = self.cache.get(&key) {
            info!("Returning cached OCR result for {}", path.display());
            return Ok(hit);
        }

        let request = request::build_request(path, lang, enable_table).await?;

        match self.service.recognize(request).await {
            Ok(response) => {
                let response = Arc::new(response);
                self.cache.insert(key, Arc::clone(&response));
                info!(
                    "OCR complete for {}: {} pages, {} fields",
                    path.display(),
                    response.page_count(),
                    response.field_count()
                );
                Ok(response)
            }
            Err(e) => {
                error!("OCR request failed for {}: {}", path.display(), e);
                Err(e)
            }
        }
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}
