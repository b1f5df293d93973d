//! CLI binary for clova-ocr.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `OcrConfig` and reports per-file results.

use anyhow::{Context, Result};
use clap::Parser;
use clova_ocr::{
    filter_by_confidence, load_saved_result, print_summary, process_batch, process_document_with,
    summarize, OcrClient, OcrConfig, OcrRow, OutputFormat, ProcessOutput, ProgressCallback,
    WorkflowProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar over the input files, with a log
/// line per written output.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new(total_files: usize) -> Arc<Self> {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} files  \
             ⏱ {elapsed_precise}  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        let bar = ProgressBar::new(total_files as u64);
        bar.set_style(style);
        bar.set_prefix("OCR");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }
}

impl WorkflowProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_files: usize) {
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Processing {total_files} files…"))
        ));
    }

    fn on_file_start(&self, _file_num: usize, _total_files: usize, path: &Path) {
        self.bar.set_message(path.display().to_string());
    }

    fn on_output_written(&self, format: OutputFormat, path: &Path) {
        self.bar.println(format!(
            "    {} {:<15} {}",
            dim("→"),
            format.as_str(),
            dim(&path.display().to_string())
        ));
    }

    fn on_file_complete(&self, file_num: usize, total_files: usize, field_count: usize) {
        self.bar.println(format!(
            "  {} File {:>3}/{:<3}  {}",
            green("✓"),
            file_num,
            total_files,
            dim(&format!("{field_count} fields")),
        ));
        self.bar.inc(1);
        if file_num == total_files {
            self.bar.finish_and_clear();
        }
    }

    fn on_file_error(&self, file_num: usize, total_files: usize, error: &str) {
        let msg: String = if error.chars().count() > 80 {
            format!("{}\u{2026}", error.chars().take(79).collect::<String>())
        } else {
            error.to_string()
        };
        self.bar.println(format!(
            "  {} File {:>3}/{:<3}  {}",
            red("✗"),
            file_num,
            total_files,
            red(&msg),
        ));
        self.bar.inc(1);
        if file_num == total_files {
            self.bar.finish_and_clear();
        }
    }

    fn on_batch_complete(&self, total_files: usize, success_count: usize) {
        self.bar.finish_and_clear();
        let failed = total_files.saturating_sub(success_count);
        if failed == 0 {
            eprintln!(
                "{} {} files processed successfully",
                green("✔"),
                bold(&success_count.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} files processed  ({} failed)",
                if failed == total_files {
                    red("✘")
                } else {
                    cyan("⚠")
                },
                bold(&success_count.to_string()),
                total_files,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Text, CSV and raw JSON for one scan
  clova-ocr receipt.jpg

  # Every output, tables included, into ./results/contract/
  clova-ocr contract.pdf --tables -f json,text,csv,markdown,searchable_pdf,tables -o results

  # Several files in one run (one project directory per file)
  clova-ocr page1.png page2.png page3.png

  # Japanese document, flag low-confidence words in document.md
  clova-ocr --lang ja -f markdown --confidence scan.pdf

  # Re-read a previous run without calling the API
  clova-ocr --load contract --min-confidence 0.9

OUTPUT FILES (under <output>/<project>/):
  ocr_result.json      raw API response (json)
  extracted_text.txt   plain text, pages separated (text)
  ocr_data.csv         one row per recognised field (csv)
  document.md          Markdown, one section per page (markdown)
  searchable.pdf       source PDF with an invisible text layer (searchable_pdf)
  pageP_tableT.csv     one file per detected table (tables, needs --tables)

ENVIRONMENT VARIABLES:
  CLOVA_OCR_API_URL     CLOVA OCR invoke URL (required)
  CLOVA_OCR_SECRET_KEY  X-OCR-SECRET value (required)
  CLOVA_OCR_LANG        Recognition language (default: ko)
  CLOVA_OCR_TIMEOUT     Request timeout in seconds (default: 30)
  PDFIUM_LIB_PATH       Directory containing libpdfium (searchable_pdf only)
"#;

/// Run CLOVA OCR on PDFs and images and write text, CSV, Markdown and tables.
#[derive(Parser, Debug)]
#[command(
    name = "clova-ocr",
    version,
    about = "Run CLOVA OCR on PDFs and images",
    long_about = "Send PDF or image files to the NAVER CLOVA OCR API and write the result as \
raw JSON, plain text, a per-field CSV, Markdown, per-table CSVs and a searchable PDF.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF or image files, processed in order.
    #[arg(required_unless_present = "load")]
    inputs: Vec<PathBuf>,

    /// Root output directory.
    #[arg(short, long, env = "CLOVA_OCR_OUTPUT", default_value = "./output")]
    output: PathBuf,

    /// Project directory name (single input only). Default: the file stem.
    #[arg(short, long)]
    project: Option<String>,

    /// Recognition language code.
    #[arg(long, env = "CLOVA_OCR_LANG", default_value = "ko")]
    lang: String,

    /// Ask the service to detect tables.
    #[arg(long, env = "CLOVA_OCR_TABLES")]
    tables: bool,

    /// Comma-separated outputs: json, text, csv, markdown, searchable_pdf, tables.
    #[arg(
        short,
        long,
        env = "CLOVA_OCR_FORMATS",
        value_delimiter = ',',
        default_value = "json,text,csv"
    )]
    formats: Vec<OutputFormat>,

    /// Annotate low-confidence words in document.md.
    #[arg(long)]
    confidence: bool,

    /// Request timeout in seconds.
    #[arg(long, env = "CLOVA_OCR_TIMEOUT", default_value_t = 30)]
    timeout: u64,

    /// CLOVA OCR invoke URL.
    #[arg(long, env = "CLOVA_OCR_API_URL", hide_env_values = true)]
    api_url: Option<String>,

    /// X-OCR-SECRET value.
    #[arg(long, env = "CLOVA_OCR_SECRET_KEY", hide_env_values = true)]
    secret_key: Option<String>,

    /// Load a saved project from the output directory instead of calling the API.
    #[arg(long, value_name = "PROJECT", conflicts_with_all = ["inputs", "project"])]
    load: Option<String>,

    /// Report how many fields reach this confidence.
    #[arg(long, value_name = "0.0-1.0")]
    min_confidence: Option<f64>,

    /// Print a JSON report instead of the human summary.
    #[arg(long)]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "CLOVA_OCR_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "CLOVA_OCR_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "CLOVA_OCR_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // While the progress bar is up, only errors reach the terminal.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && cli.load.is_none();
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    if let Some(min) = cli.min_confidence {
        if !(0.0..=1.0).contains(&min) {
            anyhow::bail!("--min-confidence must be between 0.0 and 1.0 (got {min})");
        }
    }

    // ── Load mode ────────────────────────────────────────────────────────
    if let Some(ref project) = cli.load {
        let saved = load_saved_result(project, &cli.output)
            .await
            .with_context(|| format!("Failed to load project '{project}'"))?
            .with_context(|| {
                format!(
                    "No saved result for '{project}' under {}",
                    cli.output.display()
                )
            })?;

        if cli.json {
            let report = json!({
                "project": project,
                "summary": summarize(&saved.response),
                "fields": saved.rows.len(),
                "passing": passing(&saved.rows, cli.min_confidence),
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("Failed to serialise report")?
            );
        } else {
            print_summary(&saved.response);
            report_confidence(&saved.rows, cli.min_confidence);
        }
        return Ok(());
    }

    if cli.project.is_some() && cli.inputs.len() > 1 {
        anyhow::bail!("--project can only be used with a single input file");
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new(cli.inputs.len());
        Some(cb as Arc<dyn WorkflowProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;
    let mut client = OcrClient::new(&config).context("Failed to create OCR client")?;

    // ── Run ──────────────────────────────────────────────────────────────
    let results: Vec<(PathBuf, Result<ProcessOutput, clova_ocr::ClovaOcrError>)> =
        if let [input] = cli.inputs.as_slice() {
            let result = process_document_with(&mut client, input, &config).await;
            vec![(input.clone(), result)]
        } else {
            process_batch(&mut client, &cli.inputs, &config).await
        };

    let failed = results.iter().filter(|(_, r)| r.is_err()).count();

    if cli.json {
        let report: Vec<_> = results
            .iter()
            .map(|(input, result)| match result {
                Ok(out) => json!({
                    "input": input,
                    "project_dir": out.project_dir,
                    "pages": out.response.page_count(),
                    "fields": out.rows.len(),
                    "passing": passing(&out.rows, cli.min_confidence),
                    "written": out.written.iter().map(|w| json!({
                        "format": w.format,
                        "path": w.path,
                    })).collect::<Vec<_>>(),
                    "searchable_pdf": out.searchable_pdf,
                }),
                Err(e) => json!({
                    "input": input,
                    "error": e.to_string(),
                }),
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialise report")?
        );
    } else if !cli.quiet {
        for (input, result) in &results {
            match result {
                Ok(out) => {
                    // The library skips its summary while the bar is drawn.
                    if show_progress {
                        print_summary(&out.response);
                    } else {
                        eprintln!(
                            "{}  {}  →  {}",
                            green("✔"),
                            input.display(),
                            bold(&out.project_dir.display().to_string())
                        );
                    }
                    if out.searchable_pdf == Some(false) {
                        eprintln!("   {} searchable PDF was not produced", cyan("⚠"));
                    }
                    report_confidence(&out.rows, cli.min_confidence);
                }
                Err(e) if !show_progress => {
                    eprintln!("{}  {}: {}", red("✘"), input.display(), e);
                }
                Err(_) => {}
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {} files failed", results.len());
    }
    Ok(())
}

/// Map CLI args to `OcrConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<OcrConfig> {
    let mut builder = OcrConfig::builder()
        .api_url(cli.api_url.clone().unwrap_or_default())
        .secret_key(cli.secret_key.clone().unwrap_or_default())
        .lang(cli.lang.clone())
        .timeout_secs(cli.timeout)
        .enable_table(cli.tables)
        .output_formats(cli.formats.clone())
        .output_base(cli.output.clone())
        .include_confidence(cli.confidence)
        .print_summary(!cli.json && !cli.quiet && progress.is_none());

    if let Some(ref project) = cli.project {
        builder = builder.project_name(project.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }
    if cli.formats.contains(&OutputFormat::Tables) && !cli.tables {
        tracing::warn!("'tables' output requested without --tables; no table files will be written");
    }

    builder.build().context("Invalid configuration")
}

fn passing(rows: &[OcrRow], min: Option<f64>) -> Option<usize> {
    let min = min?;
    Some(filter_by_confidence(rows, min).map_or(0, |kept| kept.len()))
}

fn report_confidence(rows: &[OcrRow], min: Option<f64>) {
    if let (Some(min), Some(count)) = (min, passing(rows, min)) {
        eprintln!(
            "   {} of {} fields with confidence ≥ {:.0}%",
            bold(&count.to_string()),
            rows.len(),
            min * 100.0
        );
    }
}
