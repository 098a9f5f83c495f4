use clap::{Parser, Subcommand};
use rikoten::config::{self, DEFAULT_CONFIG_FILE};
use rikoten::dispatch::{Context, Request, Response, dispatch};
use rikoten::gallery::{self, GalleryView};
use rikoten::upload::UploadRequest;
use rikoten::{imaging, output, retention};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "rikoten")]
#[command(about = "Event photo booth: ring collages with a time-boxed gallery")]
#[command(long_about = "\
Event photo booth: ring collages with a time-boxed gallery

Each upload is stored as received and turned into a 1200x1200 collage: four
copies of the photo on a ring, rotated 0, 90, 180 and 270 degrees, around a
small white square.

Storage layout (defaults):

  uploads/
  ├── 20261017_143005_IMG_0001.jpg                  # Raw upload
  └── processed/
      └── processed_20261017_143005_IMG_0001.jpg    # Collage

Files older than retention.expire_seconds are deleted whenever an upload or
a gallery view runs.

Run 'rikoten gen-config' to generate a documented rikoten.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Config file (missing file means stock defaults)
    #[arg(long, default_value = DEFAULT_CONFIG_FILE, global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Upload a photo and build its collage
    Upload {
        /// Photo to upload
        file: PathBuf,
        /// File name to record instead of FILE's own
        #[arg(long)]
        name: Option<String>,
    },
    /// Show the gallery (sweeps expired files first)
    Gallery {
        /// Gallery passcode; prompted for when absent
        #[arg(long, env = "RIKOTEN_PASSCODE", hide_env_values = true)]
        passcode: Option<String>,
        /// Print the entries as JSON
        #[arg(long, conflicts_with = "interactive")]
        json: bool,
        /// Also write an HTML page to this path
        #[arg(long, value_name = "OUT")]
        html: Option<PathBuf>,
        /// Keep the gallery open: Enter refreshes, q quits
        #[arg(long)]
        interactive: bool,
    },
    /// Delete expired uploads and collages now
    Sweep,
    /// Build a collage from SRC into DST without storing anything
    Composite { src: PathBuf, dst: PathBuf },
    /// Print a stock rikoten.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Upload { file, name } => {
            let ctx = Context::new(config::load_config(&cli.config)?);
            let file_name = match name {
                Some(name) => name,
                None => file_name_of(&file)?,
            };
            let bytes = std::fs::read(&file)?;
            let request = Request::Upload(UploadRequest {
                file_name: file_name.clone(),
                bytes,
            });
            if let Response::Upload(outcome) = dispatch(&request, &ctx)? {
                output::print_upload(&file_name, &outcome);
            }
        }
        Command::Gallery {
            passcode,
            json,
            html,
            interactive,
        } => {
            let ctx = Context::new(config::load_config(&cli.config)?);
            let passcode = match passcode {
                Some(p) => p,
                None => prompt("Passcode: ")?,
            };
            let request = Request::Gallery { passcode };
            loop {
                if let Response::Gallery(view) = dispatch(&request, &ctx)? {
                    show_gallery(&view, json, html.as_deref())?;
                }
                if !interactive || !wait_for_refresh()? {
                    break;
                }
            }
        }
        Command::Sweep => {
            let config = config::load_config(&cli.config)?;
            let report = retention::cleanup_old_files(&config)?;
            output::print_sweep(&report);
        }
        Command::Composite { src, dst } => {
            imaging::process_image(&src, &dst)?;
            println!("{} → {}", src.display(), dst.display());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn show_gallery(
    view: &GalleryView,
    json: bool,
    html: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(&view.entries)?);
    } else {
        output::print_gallery(&view.entries);
    }
    if let Some(path) = html {
        std::fs::write(path, gallery::render_html(&view.entries).into_string())?;
        if !json {
            println!("HTML: {}", path.display());
        }
    }
    Ok(())
}

fn file_name_of(path: &Path) -> io::Result<String> {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} has no file name", path.display()),
            )
        })
}

fn prompt(label: &str) -> io::Result<String> {
    eprint!("{label}");
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Block until the operator asks for a refresh. `false` means quit.
fn wait_for_refresh() -> io::Result<bool> {
    eprint!("[Enter] refresh, [q] quit: ");
    io::stderr().flush()?;
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(false);
    }
    Ok(!line.trim().eq_ignore_ascii_case("q"))
}
