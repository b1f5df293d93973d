//! Configuration types for OCR processing.
//!
//! All workflow behaviour is controlled through [`OcrConfig`], built via its
//! [`OcrConfigBuilder`] or loaded from the environment with
//! [`OcrConfig::from_env`]. Both paths end in the same validation step, so a
//! missing API URL or secret key is reported once, at startup, as
//! [`ClovaOcrError::MissingCredential`].

use crate::error::ClovaOcrError;
use crate::pipeline::service::OcrService;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

/// Environment variable holding the API invoke URL.
pub const ENV_API_URL: &str = "CLOVA_OCR_API_URL";
/// Environment variable holding the `X-OCR-SECRET` value.
pub const ENV_SECRET_KEY: &str = "CLOVA_OCR_SECRET_KEY";
/// Optional environment override for the language code.
pub const ENV_LANG: &str = "CLOVA_OCR_LANG";
/// Optional environment override for the request timeout in seconds.
pub const ENV_TIMEOUT: &str = "CLOVA_OCR_TIMEOUT";

pub const DEFAULT_LANG: &str = "ko";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_OUTPUT_BASE: &str = "./output";

/// Configuration for OCR requests and the output workflow.
///
/// # Example
/// ```rust
/// use clova_ocr::{OcrConfig, OutputFormat};
///
/// let config = OcrConfig::builder()
///     .api_url("https://example.apigw.ntruss.com/custom/v1/1/abc/general")
///     .secret_key("secret")
///     .lang("ja")
///     .output_formats(vec![OutputFormat::Text, OutputFormat::Markdown])
///     .build()
///     .unwrap();
/// assert_eq!(config.timeout_secs, 30);
/// ```
#[derive(Clone)]
pub struct OcrConfig {
    /// CLOVA OCR invoke URL (the "general" endpoint of the domain).
    pub api_url: String,

    /// Value of the `X-OCR-SECRET` header.
    pub secret_key: String,

    /// Recognition language code. Default: `ko`.
    pub lang: String,

    /// Per-request timeout in seconds. Default: 30.
    pub timeout_secs: u64,

    /// Ask the service for table detection. Default: false.
    pub enable_table: bool,

    /// Outputs written by the workflow. Default: json, text, csv.
    pub output_formats: Vec<OutputFormat>,

    /// Root under which per-project directories are created. Default: `./output`.
    pub output_base: PathBuf,

    /// Project directory name. If None, the source file stem is used.
    pub project_name: Option<String>,

    /// Annotate low-confidence fields in `document.md`. Default: false.
    pub include_confidence: bool,

    /// Print the summary report to stdout after each OCR call. Default: true.
    pub print_summary: bool,

    /// Pre-constructed OCR service. Takes precedence over `api_url`/`secret_key`.
    pub service: Option<Arc<dyn OcrService>>,

    /// Receives per-file and per-output events from the workflow.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            secret_key: String::new(),
            lang: DEFAULT_LANG.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            enable_table: false,
            output_formats: OutputFormat::defaults(),
            output_base: PathBuf::from(DEFAULT_OUTPUT_BASE),
            project_name: None,
            include_confidence: false,
            print_summary: true,
            service: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for OcrConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OcrConfig")
            .field("api_url", &self.api_url)
            .field(
                "secret_key",
                &if self.secret_key.is_empty() { "" } else { "<redacted>" },
            )
            .field("lang", &self.lang)
            .field("timeout_secs", &self.timeout_secs)
            .field("enable_table", &self.enable_table)
            .field("output_formats", &self.output_formats)
            .field("output_base", &self.output_base)
            .field("project_name", &self.project_name)
            .field("include_confidence", &self.include_confidence)
            .field("print_summary", &self.print_summary)
            .field("service", &self.service.as_ref().map(|_| "<dyn OcrService>"))
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl OcrConfig {
    /// Create a new builder for `OcrConfig`.
    pub fn builder() -> OcrConfigBuilder {
        OcrConfigBuilder {
            config: Self::default(),
        }
    }

    /// Load the configuration from `CLOVA_OCR_*` environment variables.
    ///
    /// `CLOVA_OCR_API_URL` and `CLOVA_OCR_SECRET_KEY` are required.
    pub fn from_env() -> Result<Self, ClovaOcrError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ClovaOcrError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_url = get(ENV_API_URL).ok_or(ClovaOcrError::MissingCredential { var: ENV_API_URL })?;
        let secret_key = get(ENV_SECRET_KEY).ok_or(ClovaOcrError::MissingCredential {
            var: ENV_SECRET_KEY,
        })?;

        let mut builder = Self::builder().api_url(api_url).secret_key(secret_key);
        if let Some(lang) = get(ENV_LANG) {
            builder = builder.lang(lang);
        }
        if let Some(raw) = get(ENV_TIMEOUT) {
            let secs = raw.trim().parse::<u64>().map_err(|_| {
                ClovaOcrError::InvalidConfig(format!("{ENV_TIMEOUT} must be whole seconds, got '{raw}'"))
            })?;
            builder = builder.timeout_secs(secs);
        }
        builder.build()
    }

    /// Whether the workflow should write `format`.
    pub fn wants(&self, format: OutputFormat) -> bool {
        self.output_formats.contains(&format)
    }
}

/// Builder for [`OcrConfig`].
#[derive(Debug)]
pub struct OcrConfigBuilder {
    config: OcrConfig,
}

impl OcrConfigBuilder {
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into().trim().to_string();
        self
    }

    pub fn secret_key(mut self, key: impl Into<String>) -> Self {
        self.config.secret_key = key.into().trim().to_string();
        self
    }

    pub fn lang(mut self, lang: impl Into<String>) -> Self {
        self.config.lang = lang.into();
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = secs.max(1);
        self
    }

    pub fn enable_table(mut self, v: bool) -> Self {
        self.config.enable_table = v;
        self
    }

    /// Set the output formats. Duplicates are dropped, order is kept.
    pub fn output_formats(mut self, formats: Vec<OutputFormat>) -> Self {
        let mut unique = Vec::with_capacity(formats.len());
        for f in formats {
            if !unique.contains(&f) {
                unique.push(f);
            }
        }
        self.config.output_formats = unique;
        self
    }

    pub fn output_base(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_base = dir.into();
        self
    }

    pub fn project_name(mut self, name: impl Into<String>) -> Self {
        self.config.project_name = Some(name.into());
        self
    }

    pub fn include_confidence(mut self, v: bool) -> Self {
        self.config.include_confidence = v;
        self
    }

    pub fn print_summary(mut self, v: bool) -> Self {
        self.config.print_summary = v;
        self
    }

    pub fn service(mut self, service: Arc<dyn OcrService>) -> Self {
        self.config.service = Some(service);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<OcrConfig, ClovaOcrError> {
        let c = &self.config;
        if c.service.is_none() {
            if c.api_url.is_empty() {
                return Err(ClovaOcrError::MissingCredential { var: ENV_API_URL });
            }
            if c.secret_key.is_empty() {
                return Err(ClovaOcrError::MissingCredential {
                    var: ENV_SECRET_KEY,
                });
            }
            if !(c.api_url.starts_with("http://") || c.api_url.starts_with("https://")) {
                return Err(ClovaOcrError::InvalidConfig(format!(
                    "API URL must be an HTTP/HTTPS URL, got '{}'",
                    c.api_url
                )));
            }
        }
        if c.lang.trim().is_empty() {
            return Err(ClovaOcrError::InvalidConfig("Language code must not be empty".into()));
        }
        if let Some(ref name) = c.project_name {
            if name.trim().is_empty() || name.contains(['/', '\\']) || name == ".." {
                return Err(ClovaOcrError::InvalidConfig(format!(
                    "Project name must be a single directory name, got '{name}'"
                )));
            }
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// An artefact the workflow can write into the project directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Raw response as `ocr_result.json`.
    Json,
    /// Plain text as `extracted_text.txt`.
    Text,
    /// One row per field as `ocr_data.csv`.
    Csv,
    /// `document.md`.
    Markdown,
    /// Invisible text layer over the source PDF as `searchable.pdf`.
    SearchablePdf,
    /// One `page{P}_table{T}.csv` per detected table (needs table detection).
    Tables,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 6] = [
        OutputFormat::Json,
        OutputFormat::Text,
        OutputFormat::Csv,
        OutputFormat::Markdown,
        OutputFormat::SearchablePdf,
        OutputFormat::Tables,
    ];

    /// The formats written when none are configured.
    pub fn defaults() -> Vec<OutputFormat> {
        vec![OutputFormat::Json, OutputFormat::Text, OutputFormat::Csv]
    }

    /// Canonical lower-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Text => "text",
            OutputFormat::Csv => "csv",
            OutputFormat::Markdown => "markdown",
            OutputFormat::SearchablePdf => "searchable_pdf",
            OutputFormat::Tables => "tables",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = ClovaOcrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "json" => Ok(OutputFormat::Json),
            "text" | "txt" => Ok(OutputFormat::Text),
            "csv" | "dataframe" => Ok(OutputFormat::Csv),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "searchable_pdf" | "pdf" => Ok(OutputFormat::SearchablePdf),
            "tables" => Ok(OutputFormat::Tables),
            other => Err(ClovaOcrError::InvalidConfig(format!(
                "Unknown output format '{other}' (expected json, text, csv, markdown, searchable_pdf, tables)"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn from_lookup_reads_credentials_and_defaults() {
        let config = OcrConfig::from_lookup(lookup(&[
            (ENV_API_URL, "https://mock-api.example.com"),
            (ENV_SECRET_KEY, "mock_secret_key_12345"),
        ]))
        .unwrap();
        assert_eq!(config.api_url, "https://mock-api.example.com");
        assert_eq!(config.secret_key, "mock_secret_key_12345");
        assert_eq!(config.lang, "ko");
        assert_eq!(config.timeout_secs, 30);
        assert!(!config.enable_table);
        assert_eq!(config.output_formats, OutputFormat::defaults());
    }

    #[test]
    fn missing_api_url_is_fatal() {
        let err = OcrConfig::from_lookup(lookup(&[(ENV_SECRET_KEY, "test_key")])).unwrap_err();
        assert!(matches!(
            err,
            ClovaOcrError::MissingCredential { var } if var == ENV_API_URL
        ));
    }

    #[test]
    fn blank_secret_key_is_fatal() {
        let err = OcrConfig::from_lookup(lookup(&[
            (ENV_API_URL, "https://mock-api.example.com"),
            (ENV_SECRET_KEY, "   "),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains(ENV_SECRET_KEY));
    }

    #[test]
    fn optional_overrides_are_applied() {
        let config = OcrConfig::from_lookup(lookup(&[
            (ENV_API_URL, "https://mock-api.example.com"),
            (ENV_SECRET_KEY, "k"),
            (ENV_LANG, "ja"),
            (ENV_TIMEOUT, "45"),
        ]))
        .unwrap();
        assert_eq!(config.lang, "ja");
        assert_eq!(config.timeout_secs, 45);
    }

    #[test]
    fn bad_timeout_is_rejected() {
        let err = OcrConfig::from_lookup(lookup(&[
            (ENV_API_URL, "https://mock-api.example.com"),
            (ENV_SECRET_KEY, "k"),
            (ENV_TIMEOUT, "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ClovaOcrError::InvalidConfig(_)));
    }

    #[test]
    fn builder_rejects_non_http_url() {
        let err = OcrConfig::builder()
            .api_url("ftp://example.com")
            .secret_key("k")
            .build()
            .unwrap_err();
        assert!(matches!(err, ClovaOcrError::InvalidConfig(_)));
    }

    #[test]
    fn builder_rejects_nested_project_name() {
        let err = OcrConfig::builder()
            .api_url("https://example.com")
            .secret_key("k")
            .project_name("a/b")
            .build()
            .unwrap_err();
        assert!(matches!(err, ClovaOcrError::InvalidConfig(_)));
    }

    #[test]
    fn builder_dedups_formats() {
        let config = OcrConfig::builder()
            .api_url("https://example.com")
            .secret_key("k")
            .output_formats(vec![OutputFormat::Text, OutputFormat::Json, OutputFormat::Text])
            .build()
            .unwrap();
        assert_eq!(config.output_formats, vec![OutputFormat::Text, OutputFormat::Json]);
        assert!(config.wants(OutputFormat::Json));
        assert!(!config.wants(OutputFormat::Markdown));
    }

    #[test]
    fn debug_redacts_secret() {
        let config = OcrConfig::builder()
            .api_url("https://example.com")
            .secret_key("super-secret")
            .build()
            .unwrap();
        let dbg = format!("{config:?}");
        assert!(!dbg.contains("super-secret"));
        assert!(dbg.contains("<redacted>"));
    }

    #[test]
    fn output_format_parsing() {
        assert_eq!("dataframe".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert_eq!("MD".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert_eq!(
            "searchable-pdf".parse::<OutputFormat>().unwrap(),
            OutputFormat::SearchablePdf
        );
        assert!("docx".parse::<OutputFormat>().is_err());
        for f in OutputFormat::ALL {
            assert_eq!(f.as_str().parse::<OutputFormat>().unwrap(), f);
        }
    }
}
