use color_eyre::{eyre::eyre, Result};
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use recipes::auth::TokenStore;
use recipes::cache::{namespace, CacheLayer, CacheStorage, MemoryStorage, NoopStorage, SqliteStorage};
use recipes::config::Config;
use recipes::debounce::Debouncer;
use recipes::error::DeleteError;
use recipes::keywords;
use recipes::recipe::{CachedRecipeClient, Recipe, RecipeClient, RecipeDraft};
use recipes::session::Session;

use crate::commands::{self, BrowseCommand};
use crate::event::{Event, EventHandler};
use crate::render;

/// Storage backend picked at startup
pub type Storage = Box<dyn CacheStorage>;

/// Main application state
pub struct App {
  /// Application configuration
  config: Config,

  /// Recipe client with list caching
  client: CachedRecipeClient<Storage>,

  /// Persisted sign-in token
  tokens: TokenStore<Storage>,

  /// Selection state for list and browse views
  session: Session,

  /// Browse-mode delete waiting for a yes/no answer
  pending_delete: Option<String>,
}

/// Open the on-disk store, falling back to memory so the run can continue.
fn open_storage() -> Storage {
  match SqliteStorage::open() {
    Ok(storage) => Box::new(storage),
    Err(e) => {
      warn!(error = %e, "cache database unavailable, using in-memory storage");
      Box::new(MemoryStorage::new())
    }
  }
}

impl App {
  pub fn new(config: Config) -> Result<Self> {
    let shared: Arc<Storage> = Arc::new(open_storage());
    let ns = namespace(&config.api.url);

    let tokens = TokenStore::new(Arc::clone(&shared), &ns);
    let token = Config::token_from_env().or_else(|| tokens.get());

    let cache_storage: Arc<Storage> = if config.cache.enabled {
      shared
    } else {
      Arc::new(Box::new(NoopStorage))
    };
    let cache = CacheLayer::new(cache_storage, &ns).with_merge(config.cache.merge);

    let inner = RecipeClient::new(&config.api.url, config.api.timeout(), token)
      .map_err(|e| eyre!("Failed to create recipe client for {}: {}", config.api.url, e))?;

    Ok(Self {
      config,
      client: CachedRecipeClient::new(inner, cache),
      tokens,
      session: Session::new(),
      pending_delete: None,
    })
  }

  /// Sync the recipe list into the session.
  ///
  /// On failure the session keeps whatever it showed before.
  async fn load_recipes(&mut self, refresh: bool) -> Result<()> {
    let result = if refresh {
      self.client.reload().await
    } else {
      self.client.recipes().await
    };

    let synced = result.map_err(|e| eyre!("Failed to load recipes: {}", e))?;
    self.session.set_recipes(synced.data);
    Ok(())
  }

  pub async fn list(&mut self, keywords: &[String], search: Option<&str>, refresh: bool) -> Result<()> {
    self.load_recipes(refresh).await?;
    for keyword in keywords {
      self.session.add_keyword(keyword);
    }
    if let Some(term) = search {
      self.session.set_search_term(term);
    }

    self.redraw();
    Ok(())
  }

  pub async fn show(&self, id: &str) -> Result<()> {
    let id = require_id(id)?;
    let recipe = self
      .client
      .get(id)
      .await
      .map_err(|e| eyre!("Could not load recipe {}: {}", id, e))?;
    print!("{}", render::recipe_detail(&recipe));
    Ok(())
  }

  pub async fn add(&self, path: &Path) -> Result<()> {
    let draft = read_draft(path)?;
    let recipe = self
      .client
      .create(&draft)
      .await
      .map_err(|e| eyre!("Error saving recipe: {}", e))?;
    println!("Created {} ({})", recipe.title, recipe.id);
    Ok(())
  }

  pub async fn edit(&self, id: &str, path: &Path) -> Result<()> {
    let id = require_id(id)?;
    let draft = read_draft(path)?;
    let recipe = self
      .client
      .update(id, &draft)
      .await
      .map_err(|e| eyre!("Error saving recipe: {}", e))?;
    println!("Updated {} ({})", recipe.title, recipe.id);
    Ok(())
  }

  /// Dump an existing recipe as a YAML draft, ready for `edit`.
  pub async fn export(&self, id: &str) -> Result<()> {
    let id = require_id(id)?;
    let recipe = self
      .client
      .get(id)
      .await
      .map_err(|e| eyre!("Could not load recipe {}: {}", id, e))?;
    let yaml = serde_yaml::to_string(&RecipeDraft::from(&recipe))
      .map_err(|e| eyre!("Failed to serialize recipe {}: {}", id, e))?;
    print!("{}", yaml);
    Ok(())
  }

  pub async fn delete(&mut self, id: &str, assume_yes: bool) -> Result<()> {
    let id = require_id(id)?;
    self.load_recipes(false).await?;

    if !assume_yes {
      let title = self
        .session
        .recipes()
        .iter()
        .find(|r| r.id == id)
        .map_or(id, |r| r.title.as_str());
      if !confirm(&delete_question(title)).await? {
        println!("Kept {}", id);
        return Ok(());
      }
    }

    self.delete_loaded(id).await
  }

  /// Delete a recipe from the loaded session.
  async fn delete_loaded(&mut self, id: &str) -> Result<()> {
    match self.client.delete(id, self.session.recipes()).await {
      Ok(_) => {
        self.session.remove_recipe(id);
        println!("Deleted {}", id);
        Ok(())
      }
      Err(DeleteError { error, reloaded }) => {
        if let Some(recipes) = reloaded {
          self.session.set_recipes(recipes);
        }
        Err(eyre!("Error deleting recipe {}: {}", id, error))
      }
    }
  }

  pub async fn keywords(&mut self) -> Result<()> {
    self.load_recipes(false).await?;
    for keyword in self.session.common_keywords() {
      println!("{}", keyword);
    }
    Ok(())
  }

  pub async fn ingredients(&mut self) -> Result<()> {
    self.load_recipes(false).await?;
    for name in keywords::ingredient_names(self.session.recipes()) {
      println!("{}", name);
    }
    Ok(())
  }

  pub async fn server_config(&self) -> Result<()> {
    let config = self
      .client
      .inner()
      .server_config()
      .await
      .map_err(|e| eyre!("Failed to fetch server config: {}", e))?;
    println!("googleClientId: {}", config.google_client_id);
    Ok(())
  }

  pub fn login(&self, token: &str) -> Result<()> {
    if token.trim().is_empty() {
      return Err(eyre!("Token must not be empty"));
    }
    self
      .tokens
      .set(token)
      .map_err(|e| eyre!("Failed to store token: {}", e))?;
    println!("Signed in to {}", self.config.api.url);
    Ok(())
  }

  pub fn logout(&mut self) {
    self.tokens.clear();
    self.client.clear_cache();
    self.session.reset();
    info!("signed out");
    println!("Signed out");
  }

  pub fn clear_cache(&self) {
    self.client.clear_cache();
    println!("Cache cleared");
  }

  /// Interactive list view driven by line commands on stdin.
  pub async fn browse(&mut self) -> Result<()> {
    self.load_recipes(false).await?;

    let mut events = EventHandler::with_stdin();
    let (debouncer, settled) = Debouncer::spawn(self.config.search.debounce());
    events.forward_searches(settled);

    // Redraw once per event, after the session settles
    let dirty = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&dirty);
    self.session.on_change(Box::new(move |_: &[&Recipe]| {
      flag.store(true, Ordering::Relaxed);
    }));

    self.redraw();
    println!("Type 'help' for commands.");

    while let Some(event) = events.next().await {
      match event {
        Event::Input(line) => {
          if let Some(id) = self.pending_delete.take() {
            if is_yes(&line) {
              if let Err(e) = self.delete_loaded(&id).await {
                eprintln!("{}", e);
              }
            } else {
              println!("Kept {}", id);
            }
          } else {
            match BrowseCommand::parse(&line) {
              BrowseCommand::Search(term) => {
                debouncer.push(term);
              }
              BrowseCommand::Quit => break,
              command => {
                if let Err(e) = self.run_browse_command(command).await {
                  eprintln!("{}", e);
                }
              }
            }
          }
        }
        Event::Search(term) => self.session.set_search_term(term),
        Event::Closed => break,
      }

      if dirty.swap(false, Ordering::Relaxed) {
        self.redraw();
      }
    }

    self.session.clear_observer();
    Ok(())
  }

  async fn run_browse_command(&mut self, command: BrowseCommand) -> Result<()> {
    match command {
      BrowseCommand::Toggle(keyword) => {
        self.session.toggle_keyword(&keyword);
      }
      BrowseCommand::Keywords => {
        let selected = self.session.selected_keywords();
        for keyword in self.session.common_keywords() {
          let mark = if selected.contains(keyword) { "*" } else { " " };
          println!("{} {}", mark, keyword);
        }
      }
      BrowseCommand::Show(n) => {
        let (id, _) = self.nth_in_view(n)?;
        self.show(&id).await?;
      }
      BrowseCommand::Delete(n) => {
        let (id, title) = self.nth_in_view(n)?;
        print!("{} [y/N] ", delete_question(&title));
        std::io::stdout().flush()?;
        self.pending_delete = Some(id);
      }
      BrowseCommand::Reload => {
        self.load_recipes(true).await?;
      }
      BrowseCommand::Clear => {
        let selected: Vec<String> = self.session.selected_keywords().iter().cloned().collect();
        for keyword in selected {
          self.session.toggle_keyword(&keyword);
        }
        self.session.set_search_term("");
      }
      BrowseCommand::Help => println!("{}", commands::help_text()),
      BrowseCommand::Redraw => self.redraw(),
      BrowseCommand::Unknown { input, suggestion } => match suggestion {
        Some(name) => return Err(eyre!("Unknown command '{}'. Did you mean '{}'?", input, name)),
        None => return Err(eyre!("Unknown command '{}'. Type 'help'.", input)),
      },
      BrowseCommand::Search(_) | BrowseCommand::Quit => {}
    }
    Ok(())
  }

  fn redraw(&self) {
    print!(
      "{}",
      render::recipe_list(&self.session.view(), self.session.recipes().len())
    );
  }

  /// Id and title of the 1-based `n`th recipe of the current view
  fn nth_in_view(&self, n: usize) -> Result<(String, String)> {
    let view = self.session.view();
    n.checked_sub(1)
      .and_then(|i| view.get(i))
      .map(|r| (r.id.clone(), r.title.clone()))
      .ok_or_else(|| eyre!("No recipe {} in the current list ({} shown)", n, view.len()))
  }
}

fn delete_question(title: &str) -> String {
  format!("Are you sure you want to delete '{}'?", title)
}

/// Only an explicit yes counts
fn is_yes(answer: &str) -> bool {
  matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Ask a yes/no question on stdout and read the answer from stdin.
async fn confirm(question: &str) -> Result<bool> {
  print!("{} [y/N] ", question);
  std::io::stdout().flush()?;

  let mut answer = String::new();
  BufReader::new(tokio::io::stdin()).read_line(&mut answer).await?;
  Ok(is_yes(&answer))
}

fn require_id(id: &str) -> Result<&str> {
  let id = id.trim();
  if id.is_empty() {
    return Err(eyre!("A recipe id is required"));
  }
  Ok(id)
}

/// Read, normalize and validate a recipe draft from a YAML or JSON file.
fn read_draft(path: &Path) -> Result<RecipeDraft> {
  let contents = std::fs::read_to_string(path)
    .map_err(|e| eyre!("Failed to read recipe file {}: {}", path.display(), e))?;
  parse_draft(&contents).map_err(|e| eyre!("{}: {}", path.display(), e))
}

fn parse_draft(contents: &str) -> Result<RecipeDraft> {
  // YAML is a superset of JSON, so one parser covers both formats
  let draft: RecipeDraft =
    serde_yaml::from_str(contents).map_err(|e| eyre!("Invalid recipe: {}", e))?;
  let draft = draft.normalized();
  draft.validate()?;
  Ok(draft)
}
