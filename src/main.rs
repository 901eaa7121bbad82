mod app;
mod commands;
mod event;
mod render;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use std::path::PathBuf;

use recipes::config::Config;
use recipes::logging;

#[derive(Parser, Debug)]
#[command(name = "recipes")]
#[command(about = "Browse and manage recipes from the terminal")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/recipes/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Recipe API base URL
  #[arg(long)]
  api: Option<String>,

  /// Skip the local recipe cache
  #[arg(long)]
  no_cache: bool,

  #[command(subcommand)]
  command: Option<Cmd>,
}

#[derive(Subcommand, Debug)]
enum Cmd {
  /// Interactive list with keyword filter and search (default)
  Browse,
  /// Print the filtered recipe list
  List {
    /// Keyword that every listed recipe must carry (repeatable)
    #[arg(short, long = "keyword")]
    keywords: Vec<String>,
    /// Free-text search over title, ingredient names, steps and keywords
    #[arg(short, long)]
    search: Option<String>,
    /// Discard the cache and reload everything
    #[arg(long)]
    refresh: bool,
  },
  /// Show one recipe
  Show { id: String },
  /// Create a recipe from a YAML or JSON file
  Add { file: PathBuf },
  /// Replace a recipe with the contents of a YAML or JSON file
  Edit { id: String, file: PathBuf },
  /// Print a recipe as an editable YAML draft
  Export { id: String },
  /// Delete a recipe
  Delete {
    id: String,
    /// Do not ask for confirmation
    #[arg(short, long)]
    yes: bool,
  },
  /// List keywords, most used first
  Keywords,
  /// List every ingredient name
  Ingredients,
  /// Store a bearer token for this server
  Login { token: String },
  /// Forget the stored token and cached recipes
  Logout,
  /// Drop the cached recipe list
  CacheClear,
  /// Show the server's public configuration
  ServerConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration
  let mut config = Config::load(args.config.as_deref())?;

  // Command line overrides
  if let Some(api) = args.api {
    config.api.url = api;
  }
  if args.no_cache {
    config.cache.enabled = false;
  }

  let _guard = logging::init(config.log_level.as_deref())?;
  tracing::info!(api = %config.api.url, cache = config.cache.enabled, "starting");

  let mut app = app::App::new(config)?;
  match args.command.unwrap_or(Cmd::Browse) {
    Cmd::Browse => app.browse().await?,
    Cmd::List {
      keywords,
      search,
      refresh,
    } => app.list(&keywords, search.as_deref(), refresh).await?,
    Cmd::Show { id } => app.show(&id).await?,
    Cmd::Add { file } => app.add(&file).await?,
    Cmd::Edit { id, file } => app.edit(&id, &file).await?,
    Cmd::Export { id } => app.export(&id).await?,
    Cmd::Delete { id, yes } => app.delete(&id, yes).await?,
    Cmd::Keywords => app.keywords().await?,
    Cmd::Ingredients => app.ingredients().await?,
    Cmd::Login { token } => app.login(&token)?,
    Cmd::Logout => app.logout(),
    Cmd::CacheClear => app.clear_cache(),
    Cmd::ServerConfig => app.server_config().await?,
  }

  Ok(())
}
