//! slag CLI - render the showcase page and copy its snippets

// Global invariants enforced:
// - Ingot order is preserved from config or crucible to every output
// - Identical input yields byte-for-byte identical page output

use anyhow::Context;
use clap::{Parser, Subcommand};
use slag_core::clipboard::{
    copy_companion_document, copy_snippet, CompanionDocument, ControlState, CopyControl,
    DocumentSource, SystemClipboard,
};
use slag_core::config::{self, ResolvedConfig};
use slag_core::{log_canonical_text, render_markup, render_page, LogSink, WriterSink};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "slag")]
#[command(about = "Render slag ingots as a showcase page and canonical S-expressions")]
#[command(version = env!("SLAG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the showcase page (or just the ingot cards)
    Render {
        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Read ingots from a crucible file instead of the config
        #[arg(long)]
        crucible: Option<PathBuf>,

        /// Emit only the ingot card fragment
        #[arg(long)]
        fragment: bool,

        /// Output file path (page default: dist/index.html, fragment default: stdout)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print every ingot in canonical S-expression form
    Log {
        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Read ingots from a crucible file instead of the config
        #[arg(long)]
        crucible: Option<PathBuf>,
    },
    /// Copy a snippet to the system clipboard
    Copy {
        /// Text to copy (default: read stdin)
        text: Option<String>,

        /// Copy the full contents of a file
        #[arg(long, conflicts_with = "text")]
        file: Option<PathBuf>,

        /// Stay until the confirmation reverts, printing each label change
        #[arg(long)]
        linger: bool,

        /// Seconds to keep serving the clipboard on Linux (default: until
        /// another program takes it over)
        #[arg(long, value_name = "SECS")]
        hold: Option<u64>,
    },
    /// Fetch the companion Markdown document and copy it to the clipboard
    CopyDoc {
        /// Built site directory containing the document
        #[arg(long, conflicts_with = "url", required_unless_present = "url")]
        site: Option<PathBuf>,

        /// Base URL of the deployed site
        #[arg(long)]
        url: Option<String>,

        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Stay until the confirmation reverts, printing each label change
        #[arg(long)]
        linger: bool,

        /// Seconds to keep serving the clipboard on Linux (default: until
        /// another program takes it over)
        #[arg(long, value_name = "SECS")]
        hold: Option<u64>,
    },
    /// Validate or show the configuration
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Validate a config file without rendering
    Validate {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Show the resolved configuration (merged defaults + config file)
    Show {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            config: config_path,
            crucible,
            fragment,
            output,
        } => {
            let resolved = load_config(config_path.as_deref(), crucible.as_deref())?;

            if fragment {
                let markup = render_markup(&resolved.ingots);
                match output {
                    Some(path) => write_output(&path, &markup)?,
                    None => print!("{}", markup),
                }
            } else {
                let html = render_page(&resolved);
                let output_path = output.unwrap_or_else(|| PathBuf::from("dist/index.html"));
                write_output(&output_path, &html)?;
                eprintln!("Page written to: {}", output_path.display());
            }

            log_canonical_text(&resolved.ingots, &mut LogSink);
        }
        Commands::Log {
            config: config_path,
            crucible,
        } => {
            let resolved = load_config(config_path.as_deref(), crucible.as_deref())?;
            let mut sink = WriterSink::new(std::io::stdout().lock());
            log_canonical_text(&resolved.ingots, &mut sink);
        }
        Commands::Copy {
            text,
            file,
            linger,
            hold,
        } => {
            let text = match (text, file) {
                (Some(text), _) => text,
                (None, Some(path)) => std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read {}", path.display()))?,
                (None, None) => {
                    let mut buf = String::new();
                    std::io::stdin()
                        .read_to_string(&mut buf)
                        .context("failed to read stdin")?;
                    buf
                }
            };

            let control = CopyControl::snippet();
            let mut clipboard = system_clipboard(hold);
            let result = copy_snippet(&mut clipboard, &control, &text).await;
            report_control(&control, linger).await;
            result?;
        }
        Commands::CopyDoc {
            site,
            url,
            config: config_path,
            linger,
            hold,
        } => {
            let resolved = load_config(config_path.as_deref(), None)?;
            let source = match (site, url) {
                (Some(dir), _) => DocumentSource::Site(dir),
                (None, Some(url)) => DocumentSource::Remote(url),
                (None, None) => anyhow::bail!("one of --site or --url is required"),
            };
            let document = CompanionDocument::new(source, resolved.companion_document);

            let control = CopyControl::document();
            let mut clipboard = system_clipboard(hold);
            let result = copy_companion_document(&document, &mut clipboard, &control).await;
            report_control(&control, linger).await;
            let bytes = result?;
            eprintln!("Copied {} bytes from {}", bytes, document.location());
        }
        Commands::Config { action } => match action {
            ConfigAction::Validate { path } => {
                let project_root = std::env::current_dir()?;
                match config::load_and_resolve(&project_root, path.as_deref()) {
                    Ok(resolved) => {
                        if let Some(ref p) = resolved.config_path {
                            println!("Config valid: {}", p.display());
                        } else {
                            println!("No config file found. Using defaults.");
                        }
                    }
                    Err(e) => {
                        eprintln!("Config validation failed: {:#}", e);
                        std::process::exit(1);
                    }
                }
            }
            ConfigAction::Show { path } => {
                let project_root = std::env::current_dir()?;
                let resolved = config::load_and_resolve(&project_root, path.as_deref())?;
                print_config(&resolved);
            }
        },
    }

    Ok(())
}

/// Load config from the current directory, optionally overriding the ingots
/// with a crucible file
fn load_config(config_path: Option<&Path>, crucible: Option<&Path>) -> anyhow::Result<ResolvedConfig> {
    let project_root = std::env::current_dir()?;
    let resolved = config::load_and_resolve(&project_root, config_path)
        .context("failed to load configuration")?;

    if let Some(config_path) = &resolved.config_path {
        eprintln!("Using config: {}", config_path.display());
    }

    match crucible {
        Some(path) => resolved.with_crucible(path),
        None => Ok(resolved),
    }
}

fn system_clipboard(hold_secs: Option<u64>) -> SystemClipboard {
    match hold_secs {
        Some(secs) => SystemClipboard::holding_for(Duration::from_secs(secs)),
        None => SystemClipboard::new(),
    }
}

/// Print the control's label, then each change until it is idle again
async fn report_control(control: &CopyControl, linger: bool) {
    println!("[{}]", control.label());
    if !linger || control.state() == ControlState::Idle {
        return;
    }

    let labels = control.labels();
    let mut rx = control.subscribe();
    while rx.changed().await.is_ok() {
        let state = *rx.borrow_and_update();
        println!("[{}]", labels.for_state(state));
        if state == ControlState::Idle {
            break;
        }
    }
}

fn print_config(resolved: &ResolvedConfig) {
    match resolved.config_path {
        Some(ref p) => println!("Config file:        {}", p.display()),
        None => println!("Config file:        (defaults)"),
    }
    println!("Title:              {}", resolved.title);
    println!("Tagline:            {}", resolved.tagline);
    println!("Container id:       {}", resolved.container_id);
    println!("Companion document: {}", resolved.companion_document);
    println!("Snippets:");
    for snippet in &resolved.snippets {
        println!("  {:<10} {}", snippet.label, snippet.command);
    }
    println!("Ingots:             {}", resolved.ingots.len());
}

/// Write output to file with atomic write pattern
fn write_output(path: &Path, content: &str) -> anyhow::Result<()> {
    use std::fs;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    // Temp + rename
    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);
    fs::write(&temp_path, content)
        .with_context(|| format!("Failed to write temporary file: {}", temp_path.display()))?;
    fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to rename temporary file to: {}", path.display()))?;

    Ok(())
}
