//! CLI binary for lookbook-catalog.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ExtractConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use lookbook_catalog::{
    extract, read_catalog, validate_payload, DocumentStats, ExtractConfig, ExtractOutput,
    ExtractProgressCallback, ImageFormat, ProgressCallback, Taxonomy,
};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
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
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
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

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress: one bar per document, one summary line per document.
struct CliProgressCallback {
    bar: ProgressBar,
    documents_total: AtomicUsize,
    documents_done: AtomicUsize,
    page_errors: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Scanning PDFs…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            documents_total: AtomicUsize::new(0),
            documents_done: AtomicUsize::new(0),
            page_errors: AtomicUsize::new(0),
        })
    }

    fn page_bar_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS)
    }
}

impl ExtractProgressCallback for CliProgressCallback {
    fn on_run_start(&self, total_documents: usize) {
        self.documents_total.store(total_documents, Ordering::SeqCst);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Extracting {total_documents} look books…"))
        ));
    }

    fn on_document_start(&self, slug: &str, label: &str, total_pages: usize) {
        let n = self.documents_done.load(Ordering::SeqCst) + 1;
        let total = self.documents_total.load(Ordering::SeqCst);
        self.bar.set_style(Self::page_bar_style());
        self.bar.set_length(total_pages as u64);
        self.bar.set_position(0);
        self.bar.set_prefix(format!("[{n}/{total}] {slug}"));
        self.bar.set_message(dim(label));
        self.bar.reset_eta();
    }

    fn on_page_complete(&self, _slug: &str, _page_num: usize, _total: usize, _items: usize) {
        self.bar.inc(1);
    }

    fn on_page_error(&self, slug: &str, page_num: usize, total: usize, error: &str) {
        self.page_errors.fetch_add(1, Ordering::SeqCst);

        // Truncate very long error messages to keep output tidy.
        let msg: String = if error.chars().count() > 80 {
            error.chars().take(79).chain(['\u{2026}']).collect()
        } else {
            error.to_string()
        };

        self.bar.println(format!(
            "  {} {} page {:>3}/{:<3}  {}",
            yellow("⚠"),
            slug,
            page_num,
            total,
            red(&msg),
        ));
    }

    fn on_document_complete(&self, slug: &str, stats: &DocumentStats) {
        self.documents_done.fetch_add(1, Ordering::SeqCst);
        self.bar.println(format!(
            "  {} {:<28} {}",
            green("✓"),
            slug,
            dim(&format!(
                "{:>3} pages, {:>3} with items",
                stats.pages_total, stats.pages_with_items
            )),
        ));
    }

    fn on_document_skipped(&self, path: &str, error: &str) {
        self.documents_done.fetch_add(1, Ordering::SeqCst);
        self.bar
            .println(format!("  {} {}  {}", red("✗"), path, red(error)));
    }

    fn on_run_complete(&self, total_documents: usize, skipped_documents: usize) {
        self.bar.finish_and_clear();
        let done = total_documents.saturating_sub(skipped_documents);
        let page_errors = self.page_errors.load(Ordering::SeqCst);

        if skipped_documents == 0 && page_errors == 0 {
            eprintln!(
                "{} {} look books extracted",
                green("✔"),
                bold(&done.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} look books extracted  ({} skipped, {} page images failed)",
                cyan("⚠"),
                bold(&done.to_string()),
                total_documents,
                red(&skipped_documents.to_string()),
                red(&page_errors.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Extract ./pdfs into ./images and ./data/collections.json
  lookbook

  # Different folders, PNG output at 1.5x
  lookbook --pdf-dir ~/lookbooks --output-dir site --image-format png --scale 1.5

  # Rebuild the catalog only, no page images
  lookbook --no-render

  # Start from scratch and skip unreadable PDFs
  lookbook --clean --keep-going

  # Custom categories
  lookbook --print-categories > categories.json
  lookbook --categories categories.json

  # Validate an edited catalog
  lookbook --check data/collections.json

OUTPUT LAYOUT:
  <output-dir>/images/<slug>/page_<n>.jpg   one image per PDF page
  <output-dir>/data/collections.json         the catalog

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH   Path to the pdfium shared library file
  RUST_LOG          Override the log filter (e.g. lookbook_catalog=debug)

SETUP:
  pdfium is loaded at run time. Put libpdfium in the working directory,
  a system library path, or point PDFIUM_LIB_PATH at it.
"#;

/// Build a searchable outfit catalog from PDF look books.
#[derive(Parser, Debug)]
#[command(
    name = "lookbook",
    version,
    about = "Build a searchable outfit catalog from PDF look books",
    long_about = "Render every page of every PDF look book in a folder to an image, \
extract the clothing items listed on each page, categorise them, and write a single \
JSON catalog mapping item names to the pages they appear on.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Folder containing the look book PDFs.
    #[arg(long, env = "LOOKBOOK_PDF_DIR", default_value = "pdfs")]
    pdf_dir: PathBuf,

    /// Root folder for images/ and data/.
    #[arg(short, long, env = "LOOKBOOK_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Render scale relative to the page's native size.
    #[arg(long, env = "LOOKBOOK_SCALE", default_value_t = 2.0)]
    scale: f32,

    /// Page image format.
    #[arg(long, env = "LOOKBOOK_IMAGE_FORMAT", value_enum, default_value = "jpg")]
    image_format: FormatArg,

    /// JPEG quality (1–100).
    #[arg(long, env = "LOOKBOOK_JPG_QUALITY", default_value_t = 85,
          value_parser = clap::value_parser!(u8).range(1..=100))]
    jpg_quality: u8,

    /// Only extract text; do not render page images.
    #[arg(long, env = "LOOKBOOK_NO_RENDER")]
    no_render: bool,

    /// Re-render page images that already exist.
    #[arg(long, env = "LOOKBOOK_OVERWRITE_IMAGES")]
    overwrite_images: bool,

    /// Delete previous images and catalog before extracting.
    #[arg(long, env = "LOOKBOOK_CLEAN")]
    clean: bool,

    /// Skip PDFs that cannot be read instead of aborting.
    #[arg(long, env = "LOOKBOOK_KEEP_GOING")]
    keep_going: bool,

    /// JSON file with category keywords, order and icons.
    #[arg(long, env = "LOOKBOOK_CATEGORIES")]
    categories: Option<PathBuf>,

    /// Print the category tables as JSON and exit.
    #[arg(long)]
    print_categories: bool,

    /// Validate an existing catalog file and exit.
    #[arg(long, value_name = "FILE")]
    check: Option<PathBuf>,

    /// Disable progress bar.
    #[arg(long, env = "LOOKBOOK_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "LOOKBOOK_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "LOOKBOOK_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Jpg,
    Png,
}

impl From<FormatArg> for ImageFormat {
    fn from(v: FormatArg) -> Self {
        match v {
            FormatArg::Jpg => ImageFormat::Jpg,
            FormatArg::Png => ImageFormat::Png,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO-level library logs.
    let show_progress = !cli.quiet && !cli.no_progress;
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

    let taxonomy = load_taxonomy(cli.categories.as_deref())?;

    // ── Print-categories mode ────────────────────────────────────────────
    if cli.print_categories {
        let json = taxonomy
            .to_json_pretty()
            .context("Failed to serialise categories")?;
        println!("{json}");
        return Ok(());
    }

    // ── Check mode ───────────────────────────────────────────────────────
    if let Some(ref path) = cli.check {
        return check_catalog(path, cli.quiet);
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new();
        Some(cb as Arc<dyn ExtractProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, taxonomy, progress_cb)?;

    // ── Run extraction ───────────────────────────────────────────────────
    let output = extract(&config).context("Extraction failed")?;

    if !cli.quiet {
        print_summary(&output, show_progress);
    }

    Ok(())
}

fn load_taxonomy(path: Option<&Path>) -> Result<Taxonomy> {
    match path {
        Some(p) => Taxonomy::from_file(p)
            .with_context(|| format!("Failed to load categories from {}", p.display())),
        None => Ok(Taxonomy::default()),
    }
}

/// Map CLI args to `ExtractConfig`.
fn build_config(
    cli: &Cli,
    taxonomy: Taxonomy,
    progress: Option<ProgressCallback>,
) -> Result<ExtractConfig> {
    let mut builder = ExtractConfig::builder()
        .pdf_dir(&cli.pdf_dir)
        .output_dir(&cli.output_dir)
        .scale(cli.scale)
        .image_format(cli.image_format.into())
        .jpg_quality(cli.jpg_quality)
        .render_images(!cli.no_render)
        .skip_existing_images(!cli.overwrite_images)
        .clean(cli.clean)
        .keep_going(cli.keep_going)
        .taxonomy(taxonomy);

    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Validate a catalog file on disk without touching it.
fn check_catalog(path: &Path, quiet: bool) -> Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let payload: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    validate_payload(&payload).with_context(|| format!("{} is not a catalog", path.display()))?;

    // The edit contract only needs the two maps; a full parse is a bonus.
    match read_catalog(path) {
        Ok(catalog) if !quiet => {
            println!(
                "{} {}  {} item names, {} pages, {} sources",
                green("✔"),
                bold(&path.display().to_string()),
                catalog.all_index.len(),
                catalog.all_items.len(),
                catalog.source_labels.len(),
            );
        }
        Ok(_) => {}
        Err(e) if !quiet => {
            println!(
                "{} {}  valid payload, but not a full catalog: {}",
                cyan("⚠"),
                bold(&path.display().to_string()),
                e
            );
        }
        Err(_) => {}
    }
    Ok(())
}

fn print_summary(output: &ExtractOutput, show_progress: bool) {
    let catalog = &output.catalog;
    if !show_progress {
        eprintln!(
            "Extracted {} look books in {}ms",
            catalog.source_labels.len(),
            output.duration_ms
        );
        if !output.skipped_documents.is_empty() {
            eprintln!("  {} documents skipped", output.skipped_documents.len());
        }
    }
    eprintln!(
        "   {} item names on {} pages  —  images {} rendered / {} kept / {} failed",
        dim(&catalog.all_index.len().to_string()),
        dim(&catalog.all_items.len().to_string()),
        output.images_rendered,
        output.images_skipped,
        output.render_errors.len(),
    );
    eprintln!("   → {}", bold(&output.catalog_path.display().to_string()));
}
