use caption_gallery::config::{self, GalleryConfig};
use caption_gallery::gallery::{Gallery, LoadState};
use caption_gallery::output;
use caption_gallery::paginate::{self, Pagination};
use caption_gallery::pipeline::PipelineOutput;
use caption_gallery::session;
use caption_gallery::store::RestStore;
use caption_gallery::types::DisplayItem;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(name = "caption-gallery")]
#[command(version)]
#[command(about = "Browse a shuffled gallery of images and their captions")]
#[command(long_about = "\
Browse a shuffled gallery of images and their captions

Images and captions are read in full from a PostgREST store, each caption is
paired with its image, and the result is shuffled and shown a page at a time.
Images without captions appear once on their own.

Reading the gallery requires a signed-in session: pass the session's access
token with --access-token or GALLERY_ACCESS_TOKEN.

Run 'caption-gallery gen-config' to generate a documented gallery.toml.")]
struct Cli {
    /// Config file
    #[arg(long, default_value = "gallery.toml", global = true)]
    config: PathBuf,

    /// Access token of the signed-in session
    #[arg(long, env = "GALLERY_ACCESS_TOKEN", hide_env_values = true, global = true)]
    access_token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load the gallery and print one page of it
    Page {
        /// Page number, starting at 1
        #[arg(default_value_t = 1)]
        number: usize,
        /// Print the page as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Load the gallery and print table and item counts
    Stats,
    /// Show who the access token belongs to
    Whoami,
    /// Print a stock gallery.toml with all options documented
    GenConfig,
}

/// JSON shape of the `page --json` output.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PageJson<'a> {
    total_items: usize,
    pagination: &'a Pagination,
    items: &'a [DisplayItem],
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr so `page --json` stays clean on stdout.
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Command::Whoami => {
            let config = config::load_config(&cli.config)?;
            let store = RestStore::new(&config.store)?;
            let session = session::resolve_session(&store, cli.access_token.as_deref()).await?;
            output::print_session(session.as_ref());
        }
        Command::Page { number, json } => {
            let config = config::load_config(&cli.config)?;
            let gallery = load_gallery(&config, cli.access_token.as_deref()).await?;
            let pagination = &config.pagination;

            let items = &gallery.items;
            let page = paginate::paginate(items, pagination.page_size, number);
            let nav = Pagination::new(
                items.len(),
                pagination.page_size,
                number,
                pagination.max_page_buttons,
            );

            if json {
                let body = PageJson {
                    total_items: items.len(),
                    pagination: &nav,
                    items: page,
                };
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                let first_position = paginate::first_position(number, pagination.page_size);
                output::print_page(page, first_position, items.len(), &nav);
            }
        }
        Command::Stats => {
            let config = config::load_config(&cli.config)?;
            let gallery = load_gallery(&config, cli.access_token.as_deref()).await?;
            let page_size = config.pagination.page_size;
            let total_pages = paginate::total_pages(gallery.items.len(), page_size);
            output::print_stats(&gallery.stats, page_size, total_pages);
        }
    }

    Ok(())
}

/// Resolve the session, then run the pipeline for it.
///
/// Without a session nothing is fetched and the command fails.
async fn load_gallery(
    config: &GalleryConfig,
    access_token: Option<&str>,
) -> Result<Arc<PipelineOutput>, Box<dyn std::error::Error>> {
    let store = RestStore::new(&config.store)?;
    let Some(session) = session::resolve_session(&store, access_token).await? else {
        output::print_session(None);
        return Err("a signed-in session is required to load the gallery".into());
    };

    let gallery = Gallery::new();
    let reader = store.for_session(&session);
    gallery.sign_in(&reader, config, session).await;

    match gallery.state() {
        LoadState::Ready(output) => Ok(output),
        LoadState::Failed(message) => Err(message.into()),
        LoadState::SignedOut | LoadState::Loading => Err("gallery did not finish loading".into()),
    }
}
