mod config;
mod render;

use crate::config::{init_logger, load_environment, DATA_PATH, STORE_PATH};
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use gallery_core::settings::SettingKey;
use gallery_core::transfer::EXPORT_FILE_NAME;
use gallery_core::{
    load_records, DetailSession, Gallery, GalleryConfig, JsonFileStore, PendingWrite,
    SettingsPatch,
};
use log::{error, info};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "gallery", about = "Browse the bundled video catalog")]
struct Cli {
    /// Bundled dataset (defaults to GALLERY_DATA_PATH)
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Persisted state file (defaults to GALLERY_STORE_PATH)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List videos with the current settings
    List {
        #[arg(long, default_value_t = 0)]
        page: usize,
        #[arg(long, default_value = "")]
        search: String,
    },
    /// Open a video by id, or by a `?videoId=` query string
    Open {
        #[arg(required_unless_present = "link")]
        id: Option<String>,
        #[arg(long)]
        link: Option<String>,
    },
    /// Mark or unmark a video as watched
    Watched {
        id: String,
        #[arg(long)]
        unset: bool,
    },
    /// Add or remove a favorite
    Favorite {
        id: String,
        #[arg(long)]
        unset: bool,
    },
    #[command(subcommand)]
    Settings(SettingsCommand),
}

#[derive(Subcommand)]
enum SettingsCommand {
    Show,
    /// Set one field, e.g. `sort duration-asc`
    Set { key: String, value: String },
    Reset,
    Export { file: Option<PathBuf> },
    Import { file: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    load_environment();
    init_logger();

    let cli = Cli::parse();
    let data_path = cli.data.unwrap_or_else(|| PathBuf::from(&*DATA_PATH));
    let store_path = cli.store.unwrap_or_else(|| PathBuf::from(&*STORE_PATH));

    let dataset = std::fs::read_to_string(&data_path)
        .with_context(|| format!("Failed to read dataset {}", data_path.display()))?;
    let records = load_records(&dataset).context("Failed to parse dataset")?;

    let store = Arc::new(JsonFileStore::new(store_path));
    let gallery = Gallery::load(store, records, GalleryConfig::from_env()).await;

    let pending = run(&gallery, cli.command)?;
    flush(pending).await;
    Ok(())
}

fn run(gallery: &Gallery, command: Command) -> Result<Vec<PendingWrite>> {
    let mut pending = Vec::new();
    match command {
        Command::List { page, search } => {
            gallery.set_search_query(&search);
            println!("{}", render::render_header(gallery));
            let items = gallery.view(page);
            println!(
                "{}",
                render::render_list(&items, gallery.total_matching(), &search, page)
            );
        }
        Command::Open { id, link } => {
            let id = match (id, link) {
                (Some(id), _) => id,
                (None, Some(link)) => {
                    let query = link.split_once('?').map_or(link.as_str(), |(_, q)| q);
                    match gallery.select_from_query(query) {
                        Some(record) => record.id.clone(),
                        None => {
                            info!("Deep link {link} matched no video");
                            return Ok(pending);
                        }
                    }
                }
                (None, None) => return Err(anyhow!("an id or --link is required")),
            };
            let mut session = DetailSession::new();
            pending.extend(session.open(gallery, &id)?);
            if let Some(view) = session.view(gallery) {
                println!("{}", render::render_detail(&view));
            }
        }
        Command::Watched { id, unset } => {
            pending.push(gallery.toggle_watched(&id, !unset)?);
            println!("{}", render::render_header(gallery));
        }
        Command::Favorite { id, unset } => {
            pending.push(gallery.toggle_favorite(&id, !unset)?);
            println!("{}", render::render_header(gallery));
        }
        Command::Settings(command) => pending = run_settings(gallery, command)?,
    }
    Ok(pending)
}

fn run_settings(gallery: &Gallery, command: SettingsCommand) -> Result<Vec<PendingWrite>> {
    let pending = match command {
        SettingsCommand::Show => Vec::new(),
        SettingsCommand::Set { key, value } => {
            let key = SettingKey::from_field_name(&key)
                .ok_or_else(|| anyhow!("Unknown setting: {key}"))?;
            let mut patch = SettingsPatch::default();
            patch.set(key, &Value::String(value))?;
            gallery.update_settings(&patch)
        }
        SettingsCommand::Reset => gallery.reset_settings(),
        SettingsCommand::Export { file } => {
            let file = file.unwrap_or_else(|| PathBuf::from(EXPORT_FILE_NAME));
            std::fs::write(&file, gallery.export_settings()?)
                .with_context(|| format!("Failed to write {}", file.display()))?;
            println!("Settings exported to {}", file.display());
            Vec::new()
        }
        SettingsCommand::Import { file } => {
            let document = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            gallery
                .import_settings(&document)
                .context("Could not import settings")?
        }
    };
    println!("{}", render::render_settings(&gallery.snapshot().settings));
    Ok(pending)
}

/// The process is about to exit, so wait for queued writes to land.
async fn flush(pending: Vec<PendingWrite>) {
    for write in pending {
        let name = write.key().storage_name();
        if let Err(e) = write.wait().await {
            error!("Could not save {name}: {e}");
        }
    }
}
