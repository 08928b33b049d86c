mod error;
mod logging;
mod output;
mod parser;
mod schema;
mod settings;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use error::DocumentError;
use parser::DocumentOutcome;
use settings::{Overrides, Settings};

#[derive(Parser)]
#[command(
    name = "antv_schema",
    about = "Extract JSON schemas from G2Plot API reference pages"
)]
struct Cli {
    /// Settings file (default: ./antv_schema.{toml,yaml,json} when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract every page under the input directory and render the manifest
    Run {
        /// Directory of saved API reference pages
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Directory receiving the schemas and the manifest
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Extract a single page and print its schema (nothing is written)
    Extract {
        /// Saved API reference page
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let overrides = match &cli.command {
        Commands::Run { input, output } => Overrides {
            input_dir: input.clone(),
            output_dir: output.clone(),
        },
        Commands::Extract { .. } => Overrides::default(),
    };
    let settings = Settings::load(cli.config.as_deref(), overrides)?;
    let _log_guard = logging::init(&settings.log_dir, cli.verbose)?;

    let t0 = Instant::now();

    let result = match cli.command {
        Commands::Run { .. } => {
            let report = run_pipeline(&settings)?;
            report.print();
            Ok(())
        }
        Commands::Extract { file } => {
            let layout = settings.layout()?;
            let html = fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {:?}", file))?;
            match parser::extract_schema(&html, &parser::document_name(&file), &layout)? {
                Some(schema) => println!("{}", serde_json::to_string_pretty(&schema)?),
                None => eprintln!("No attributes found in {:?}.", file),
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        eprintln!("\nDone in {}", format_duration(elapsed));
    }

    result
}

#[derive(Debug, Default)]
struct RunReport {
    persisted: Vec<String>,
    skipped: Vec<String>,
    failed: Vec<(String, DocumentError)>,
    manifest: Option<PathBuf>,
}

impl RunReport {
    fn print(&self) {
        println!(
            "Wrote {} schemas ({} without attributes, {} failed).",
            self.persisted.len(),
            self.skipped.len(),
            self.failed.len(),
        );

        if !self.failed.is_empty() {
            println!("\n{:<24} | {:<20} | {}", "Page", "Failure", "Detail");
            println!("{}", "-".repeat(80));
            for (name, err) in &self.failed {
                println!("{:<24} | {:<20} | {}", truncate(name, 24), err.kind(), err);
            }
        }

        if let Some(path) = &self.manifest {
            println!("\nManifest: {}", path.display());
        }
    }
}

/// Every `.html` file under `input_dir`, in file-name order.
fn discover_documents(input_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut documents = Vec::new();
    for entry in WalkDir::new(input_dir).sort_by_file_name() {
        let entry =
            entry.with_context(|| format!("Failed to read input directory {:?}", input_dir))?;
        let is_html = entry.path().extension().is_some_and(|ext| ext == "html");
        if entry.file_type().is_file() && is_html {
            documents.push(entry.into_path());
        }
    }
    Ok(documents)
}

/// Process each page once, in order. A page failure is recorded and the run
/// moves on; only directory-level I/O aborts it. Once a page name has been
/// written, later pages with the same file stem fail instead of overwriting it.
fn run_pipeline(settings: &Settings) -> Result<RunReport> {
    let layout = settings.layout()?;
    let documents = discover_documents(&settings.input_dir)?;
    fs::create_dir_all(&settings.output_dir).with_context(|| {
        format!("Failed to create output directory {:?}", settings.output_dir)
    })?;

    info!(
        count = documents.len(),
        input = %settings.input_dir.display(),
        "processing pages"
    );

    let pb = ProgressBar::new(documents.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let mut report = RunReport::default();
    let mut written: HashMap<String, PathBuf> = HashMap::new();
    for path in &documents {
        let name = parser::document_name(path);
        pb.set_message(name.clone());
        let outcome = match written.get(&name) {
            Some(first) => Err(DocumentError::DuplicateName {
                name: name.clone(),
                first: first.clone(),
            }),
            None => parser::process_document(path, &layout, &settings.output_dir),
        };
        match outcome {
            Ok(DocumentOutcome::Persisted { path: json, properties }) => {
                info!(name, properties, path = %json.display(), "schema written");
                written.insert(name.clone(), path.clone());
                report.persisted.push(name);
            }
            Ok(DocumentOutcome::NoContent) => {
                debug!(name, "no attributes, nothing written");
                report.skipped.push(name);
            }
            Err(e) => {
                warn!(name, kind = e.kind(), "page abandoned: {}", e);
                report.failed.push((name, e));
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    let manifest = output::render_manifest(&report.persisted, settings.template_dir.as_deref())?;
    let manifest_path =
        output::write_manifest(&manifest, &settings.output_dir, &settings.manifest_file)?;
    info!(
        entries = report.persisted.len(),
        path = %manifest_path.display(),
        "manifest written"
    );
    report.manifest = Some(manifest_path);

    Ok(report)
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else {
        format!("{}m {}s", secs / 60, secs % 60)
    }
}
