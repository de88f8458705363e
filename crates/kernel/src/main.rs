//! Folio CLI
//!
//! Resolves navigation from YAML collection files and prints the result.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use folio_kernel::NavigationConfig;
use folio_kernel::navigation::NavigationController;
use folio_kernel::persistence::{YamlConfigPersistence, invalid_collection_paths, yaml};
use folio_sdk::types::User;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "folio", version, about = "Inspect Folio navigation")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the resolved top-level navigation as JSON.
    Navigation {
        #[command(flatten)]
        source: SourceArgs,

        /// Print the whole model: collections, views and navigation.
        #[arg(long)]
        full: bool,
    },
    /// Replace aliases in a collection path with real paths.
    ResolveAlias {
        #[command(flatten)]
        source: SourceArgs,

        path: String,
    },
    /// Check that every collection path has an odd number of segments.
    Validate { file: PathBuf },
}

#[derive(Args)]
struct SourceArgs {
    /// Declared collections (defaults to FOLIO_COLLECTIONS_FILE).
    #[arg(long)]
    collections: Option<PathBuf>,

    /// Persisted collections (defaults to FOLIO_PERSISTED_COLLECTIONS_FILE).
    #[arg(long)]
    persisted: Option<PathBuf>,

    /// User id to resolve permissions for.
    #[arg(long, default_value = "cli")]
    uid: String,

    /// Role held by the user; repeatable.
    #[arg(long = "role")]
    roles: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = NavigationConfig::from_env().context("failed to load configuration")?;

    match cli.command {
        Command::Navigation { source, full } => {
            let controller = build_controller(&config, &source).await?;
            let context = controller.context();
            let json = if full {
                serde_json::to_string_pretty(&context.model())?
            } else {
                serde_json::to_string_pretty(&context.top_level_navigation())?
            };
            println!("{json}");
        }
        Command::ResolveAlias { source, path } => {
            let controller = build_controller(&config, &source).await?;
            println!("{}", controller.context().resolve_aliases_from(&path)?);
        }
        Command::Validate { file } => {
            let document = yaml::load_document(&file).await?;
            let invalid = invalid_collection_paths(&document.collections);
            if !invalid.is_empty() {
                for path in &invalid {
                    eprintln!("invalid collection path: {path}");
                }
                bail!("{} invalid collection path(s) in {}", invalid.len(), file.display());
            }
            println!(
                "{}: {} collection(s) OK",
                file.display(),
                document.collections.len()
            );
        }
    }

    Ok(())
}

async fn build_controller(
    config: &NavigationConfig,
    source: &SourceArgs,
) -> Result<NavigationController> {
    let collections_file = source
        .collections
        .clone()
        .or_else(|| config.collections_file.clone())
        .context("no collections file: pass --collections or set FOLIO_COLLECTIONS_FILE")?;

    let document = yaml::load_document(&collections_file).await?;
    info!(
        file = %collections_file.display(),
        collections = document.collections.len(),
        views = document.views.len(),
        "declared collections loaded"
    );

    let mut builder = NavigationController::builder(config)
        .collections(document.collections)
        .views(document.views);

    if let Some(path) = source
        .persisted
        .clone()
        .or_else(|| config.persisted_collections_file.clone())
    {
        let store = YamlConfigPersistence::open(path).await;
        builder = builder.config_persistence(Arc::new(store));
    }

    let controller = builder.build();
    let user = User {
        roles: source.roles.clone(),
        ..User::new(source.uid.clone())
    };
    controller.refresh(Some(&user));

    if let Some(error) = controller.context().navigation_loading_error() {
        warn!(%error, "persisted collections unavailable; showing declared collections only");
    }

    Ok(controller)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("folio=info,folio_kernel=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
