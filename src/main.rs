//! # Bingocard CLI
//!
//! Command-line host for the bingo card editor. A card lives in a JSON file
//! (the same record format sessions use); subcommands edit it, export it as
//! a JPEG, or save and restore it as a named session.
//!
//! ## Usage
//!
//! ```bash
//! # Fill in a card
//! bingocard header --card card.json --title "My Card" --pseudo Alice --date 25122024
//! bingocard cell --card card.json 0 --text "A very long sentence that needs wrapping"
//! bingocard gallery add --card card.json logo.png
//! bingocard center-image --card card.json --gallery 0
//!
//! # Export as JPEG into ./out
//! bingocard export --card card.json --out out
//!
//! # Sessions
//! bingocard session save work --card card.json
//! bingocard session list
//! bingocard session load work --card card.json
//! ```

use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use bingocard::{
    BingoError, CardConfig, EditorState,
    export::DirectorySink,
    grid::UploadedImage,
    render::{Compositor, Surface},
    resolve::SourceDecoder,
    session::{SaveOutcome, Session, SessionSerializer},
};

/// Bingocard - bingo card editor and exporter
#[derive(Parser, Debug)]
#[command(name = "bingocard")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Render/export config file (JSON)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render the card and save it as a JPEG
    Export {
        #[arg(long, default_value = "card.json")]
        card: PathBuf,

        /// Directory the image is written to
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },

    /// Set header fields
    Header {
        #[arg(long, default_value = "card.json")]
        card: PathBuf,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        pseudo: Option<String>,

        /// Date digits, formatted as DD/MM/YYYY
        #[arg(long)]
        date: Option<String>,
    },

    /// Edit one cell
    Cell {
        #[arg(long, default_value = "card.json")]
        card: PathBuf,

        /// Cell index (0-24, row-major)
        index: usize,

        #[arg(long)]
        text: Option<String>,

        /// Assign the gallery image at this position
        #[arg(long, conflicts_with = "no_image")]
        image: Option<usize>,

        /// Remove the cell image
        #[arg(long)]
        no_image: bool,
    },

    /// Set or remove the free-cell image
    CenterImage {
        #[arg(long, default_value = "card.json")]
        card: PathBuf,

        /// Gallery position to use (omit to remove the center image)
        #[arg(long)]
        gallery: Option<usize>,
    },

    /// Empty every cell and the pseudo/date fields
    Clear {
        #[arg(long, default_value = "card.json")]
        card: PathBuf,
    },

    /// Manage uploaded images
    Gallery {
        #[command(subcommand)]
        action: GalleryAction,
    },

    /// Save, list and load named sessions
    Session {
        /// Directory holding the session store
        #[arg(long, default_value = ".bingocard")]
        store: PathBuf,

        #[command(subcommand)]
        action: SessionAction,
    },
}

#[derive(Subcommand, Debug)]
enum GalleryAction {
    /// Upload image files into the gallery
    Add {
        #[arg(long, default_value = "card.json")]
        card: PathBuf,

        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// List gallery images
    List {
        #[arg(long, default_value = "card.json")]
        card: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
enum SessionAction {
    /// Save the card under a name (overwrites an existing session)
    Save {
        name: String,

        #[arg(long, default_value = "card.json")]
        card: PathBuf,
    },
    /// List stored sessions
    List,
    /// Load a session into the card file
    Load {
        name: String,

        #[arg(long, default_value = "card.json")]
        card: PathBuf,
    },
}

/// Initialize tracing on stderr.
///
/// `RUST_LOG` sets the filter (default: info); `RUST_LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("RUST_LOG_FORMAT").is_ok_and(|v| v == "json");

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), BingoError> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => CardConfig::load(path)?,
        None => CardConfig::default(),
    };

    match cli.command {
        Commands::Export { card, out } => {
            let state = read_card(&card)?;
            let compositor = Compositor::with_decoder(config, Arc::new(SourceDecoder::new()?));
            let mut surface = Surface::default();
            let mut sink = DirectorySink::new(&out);
            let today = chrono::Local::now().date_naive();

            let summary = compositor
                .export(&state, Some(&mut surface), &mut sink, today)
                .await?;
            println!(
                "Saved {} ({}x{}, {} bytes)",
                out.join(&summary.filename).display(),
                summary.report.layout.width,
                summary.report.layout.height,
                summary.bytes
            );
        }

        Commands::Header {
            card,
            title,
            pseudo,
            date,
        } => {
            let mut state = read_card(&card)?;
            if let Some(title) = title {
                state.header.title = title;
            }
            if let Some(pseudo) = pseudo {
                state.header.pseudo = pseudo;
            }
            if let Some(date) = date {
                state.header.set_date_input(&date);
            }
            write_card(&card, &state)?;
        }

        Commands::Cell {
            card,
            index,
            text,
            image,
            no_image,
        } => {
            let mut state = read_card(&card)?;
            if let Some(text) = text {
                state.grid.set_text(index, &text)?;
            }
            if let Some(position) = image {
                let data = gallery_data(&state, position)?;
                state.grid.set_image(index, Some(data))?;
            } else if no_image {
                state.grid.set_image(index, None)?;
            }
            write_card(&card, &state)?;
        }

        Commands::CenterImage { card, gallery } => {
            let mut state = read_card(&card)?;
            state.center_image = gallery
                .map(|position| gallery_data(&state, position))
                .transpose()?;
            write_card(&card, &state)?;
        }

        Commands::Clear { card } => {
            let mut state = read_card(&card)?;
            state.clear();
            write_card(&card, &state)?;
        }

        Commands::Gallery { action } => match action {
            GalleryAction::Add { card, files } => {
                let mut state = read_card(&card)?;
                for file in files {
                    let bytes = std::fs::read(&file)?;
                    let mime = mime_guess::from_path(&file).first_or_octet_stream();
                    let name = file
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_else(|| "image".to_string());
                    let position = state.upload(UploadedImage::from_bytes(&name, mime.essence_str(), &bytes));
                    println!("{}: {}", position, name);
                }
                write_card(&card, &state)?;
            }
            GalleryAction::List { card } => {
                let state = read_card(&card)?;
                for (position, image) in state.gallery.iter().enumerate() {
                    println!("{}: {}", position, image.name);
                }
            }
        },

        Commands::Session { store, action } => {
            let sessions = SessionSerializer::in_dir(&store);
            match action {
                SessionAction::Save { name, card } => {
                    let state = read_card(&card)?;
                    match sessions.save(&name, &state)? {
                        SaveOutcome::Saved => println!("Saved session '{}'", name),
                        SaveOutcome::Cancelled => println!("Save cancelled: empty name"),
                    }
                }
                SessionAction::List => {
                    let list = sessions.list()?;
                    if list.is_empty() {
                        println!("No saved sessions");
                    }
                    for summary in list {
                        let when = summary
                            .created_at
                            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                            .unwrap_or_else(|| "-".to_string());
                        println!("{}  {}", when, summary.name);
                    }
                }
                SessionAction::Load { name, card } => {
                    let session = match sessions.load(&name) {
                        Ok(session) => session,
                        Err(BingoError::SessionNotFound(_)) => {
                            println!("Session '{}' not found", name);
                            return Ok(());
                        }
                        Err(e) => return Err(e),
                    };
                    let mut state = read_card(&card)?;
                    session.apply_to(&mut state);
                    write_card(&card, &state)?;
                    println!("Loaded session '{}' into {}", name, card.display());
                }
            }
        }
    }

    Ok(())
}

/// Read a card file, starting from an empty card when it does not exist yet.
fn read_card(path: &Path) -> Result<EditorState, BingoError> {
    let mut state = EditorState::new();
    if !path.exists() {
        return Ok(state);
    }
    let text = std::fs::read_to_string(path)?;
    let record: Session = serde_json::from_str(&text)
        .map_err(|e| BingoError::Config(format!("Invalid card file {}: {}", path.display(), e)))?;
    record.apply_to(&mut state);
    Ok(state)
}

fn write_card(path: &Path, state: &EditorState) -> Result<(), BingoError> {
    let record = Session::capture(state, Utc::now());
    std::fs::write(path, serde_json::to_string_pretty(&record)?)?;
    Ok(())
}

fn gallery_data(state: &EditorState, position: usize) -> Result<String, BingoError> {
    state
        .gallery
        .get(position)
        .map(|image| image.data.clone())
        .ok_or_else(|| BingoError::Config(format!("No gallery image at position {}", position)))
}
