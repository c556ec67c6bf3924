use clap::{Parser, Subcommand};
use folio_media::accept::mime_from_filename;
use folio_media::config::{self, Widget};
use folio_media::manager::MediaManager;
use folio_media::notify::TracingSink;
use folio_media::output;
use folio_media::preview::MemoryPreviews;
use folio_media::types::Candidate;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "folio-media")]
#[command(about = "Check media against the portfolio dashboard's upload widgets")]
#[command(long_about = "\
Check media against the portfolio dashboard's upload widgets

Files are validated exactly as the dashboard would validate a drop onto the
widget: in order, against the widget's file count, size limit and accepted
types. Directories are walked recursively, in name order.

Widgets:

  avatar    single replaceable image (first valid file wins)
  gallery   ordered collection of images and documents

Limits come from uploads.toml in the config directory; run
'folio-media gen-config' to print a documented default.")]
#[command(version = version_string())]
struct Cli {
    /// Directory containing uploads.toml
    #[arg(long, default_value = ".", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate files as if they were dropped onto a widget
    Check {
        /// Widget preset to validate against
        #[arg(long, value_enum, default_value_t = Widget::Gallery)]
        widget: Widget,
        /// Files or directories to check
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Print a stock uploads.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Check { widget, paths } => {
            let media_config = config::load_config(&cli.config)?;
            let widget_config = media_config.widget(widget).clone();
            let candidates = collect_candidates(&paths)?;

            println!("==> Checking {} file(s)", candidates.len());
            let mut manager =
                MediaManager::new(widget_config, MemoryPreviews::new(), TracingSink)?;
            let outcome = manager.select(candidates);
            output::print_check_output(manager.config(), manager.pending(), &outcome.report);
            manager.teardown();

            if outcome.report.is_empty() {
                println!("==> All files accepted");
            } else {
                println!("==> {} file(s) rejected", outcome.report.len());
                std::process::exit(1);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Expand paths into candidates, walking directories in name order.
fn collect_candidates(paths: &[PathBuf]) -> Result<Vec<Candidate>, Box<dyn std::error::Error>> {
    let mut candidates = Vec::new();
    for path in paths {
        for entry in WalkDir::new(path).sort_by_file_name() {
            let entry = entry?;
            if entry.file_type().is_file() {
                candidates.push(read_candidate(entry.path())?);
            }
        }
    }
    Ok(candidates)
}

fn read_candidate(path: &Path) -> std::io::Result<Candidate> {
    let filename = path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let bytes = std::fs::read(path)?;
    Ok(Candidate::local(
        &filename,
        &mime_from_filename(&filename),
        bytes,
    ))
}
