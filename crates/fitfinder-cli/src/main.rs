mod search;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "fitfinder-cli")]
#[command(about = "Search fashion retailers for products matching clothing attributes")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search every enabled retailer for the given attributes
    Search {
        /// Garment type, e.g. `skirt`
        #[arg(long = "type")]
        clothing_type: Option<String>,

        #[arg(long)]
        color: Option<String>,

        /// Free-text query used by every retailer without its own override
        #[arg(long)]
        search_string: Option<String>,

        /// Extra attribute as `key=value`; repeatable
        #[arg(long = "attr", value_parser = search::parse_attr)]
        attrs: Vec<(String, String)>,

        /// Restrict the search to these retailer keys; repeatable
        #[arg(long = "retailer")]
        retailers: Vec<String>,
    },
    /// Search using a classifier record stored as JSON
    ClassifyFile {
        /// Path to a JSON file shaped like the `/api/scrape` request body
        file: PathBuf,

        #[arg(long = "retailer")]
        retailers: Vec<String>,
    },
    /// List configured retailers
    Retailers,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = fitfinder_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Search {
            clothing_type,
            color,
            search_string,
            attrs,
            retailers,
        }) => {
            let body = search::request_body(
                clothing_type.as_deref(),
                color.as_deref(),
                search_string.as_deref(),
                &attrs,
            );
            search::run_search(&config, &body, &retailers).await?;
        }
        Some(Commands::ClassifyFile { file, retailers }) => {
            let body = std::fs::read(&file)
                .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", file.display()))?;
            search::run_search(&config, &body, &retailers).await?;
        }
        Some(Commands::Retailers) => search::list_retailers(&config)?,
        None => println!("fitfinder-cli ready; run with --help for commands"),
    }

    Ok(())
}
