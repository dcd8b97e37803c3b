use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use secrecy::SecretString;
use std::path::PathBuf;
use std::sync::Arc;

use briefly::cache::{CacheKey, CachedFetch, ManualConnectivity};
use briefly::config::Config;
use briefly::models::{Article, Category, SavedArticle};
use briefly::output;
use briefly::reader::Reader;
use briefly::remote::SupabaseClient;
use briefly::storage::{Database, DatabaseError, MemoryStore, SlotStore};

const LINE_WIDTH: usize = 100;

/// Get the config directory path (~/.config/briefly/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("briefly"))
}

#[derive(Parser, Debug)]
#[command(name = "briefly", about = "News reader that keeps working offline")]
struct Args {
    /// Skip the network and answer from the local cache
    #[arg(long, global = true)]
    offline: bool,

    /// Keep the cache in memory only (nothing is read from or written to disk)
    #[arg(long, global = true)]
    ephemeral: bool,

    /// Config file (default: ~/.config/briefly/config.toml)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List published articles
    Articles,
    /// List saved articles of the signed-in user
    Saved {
        /// User id (overrides config and BRIEFLY_USER_ID)
        #[arg(long)]
        user: Option<String>,
    },
    /// List categories
    Categories,
    /// Search published articles by title or summary
    Search { query: String },
    /// Inspect or clear the local cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand, Debug)]
enum CacheAction {
    /// Show every stored slot with its size
    Status,
    /// Print the snapshot stored in a slot
    Show { key: CacheKey },
    /// Remove one slot, or all of them
    Clear { key: Option<CacheKey> },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so list output on stdout stays pipeable
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config_dir = get_config_dir()?;
    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| config_dir.join("config.toml"));
    let mut config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
    config.apply_env(|name| std::env::var(name).ok());

    if args.ephemeral {
        tracing::debug!("Using in-memory cache");
        return run(args, config, Arc::new(MemoryStore::new())).await;
    }

    let db_path = match &config.database_path {
        Some(path) => path.clone(),
        None => {
            ensure_private_dir(&config_dir)?;
            config_dir.join("cache.db")
        }
    };
    let db_path_str = db_path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Invalid UTF-8 in database path"))?;
    let db = match Database::open(db_path_str).await {
        Ok(db) => db,
        Err(DatabaseError::InstanceLocked) => {
            eprintln!(
                "Error: Another instance of briefly appears to be running. Please close it and try again."
            );
            std::process::exit(1);
        }
        Err(e) => return Err(anyhow::anyhow!("Failed to open cache database: {}", e)),
    };

    run(args, config, Arc::new(db)).await
}

fn ensure_private_dir(dir: &std::path::Path) -> Result<()> {
    if !dir.exists() {
        std::fs::create_dir_all(dir).context("Failed to create config directory")?;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o700);
        if let Err(e) = std::fs::set_permissions(dir, perms) {
            tracing::warn!(
                path = %dir.display(),
                error = %e,
                "Failed to set config directory permissions to 0700"
            );
        }
    }
    Ok(())
}

async fn run<S: SlotStore>(args: Args, config: Config, store: Arc<S>) -> Result<()> {
    let connectivity = Arc::new(ManualConnectivity::new(!args.offline));
    let cache = CachedFetch::with_connectivity(store, connectivity);

    match args.command {
        Command::Articles => print_articles(&reader(&config, cache, args.offline)?.articles().await),
        Command::Saved { user } => {
            let user = user.or_else(|| config.user_id.clone());
            if user.is_none() {
                eprintln!("Not signed in: set user_id in config, BRIEFLY_USER_ID, or pass --user.");
            }
            let saved = reader(&config, cache, args.offline)?
                .saved_articles(user.as_deref())
                .await;
            print_saved(&saved);
        }
        Command::Categories => {
            print_categories(&reader(&config, cache, args.offline)?.categories().await)
        }
        Command::Search { query } => {
            print_articles(&reader(&config, cache, args.offline)?.search(&query).await)
        }
        Command::Cache { action } => cache_command(action, &cache).await?,
    }

    Ok(())
}

/// Offline runs never reach the backend, so they do not need one configured.
fn reader<S: SlotStore>(config: &Config, cache: CachedFetch<S>, offline: bool) -> Result<Reader<S>> {
    let reader = if offline {
        Reader::cache_only(cache)
    } else {
        Reader::new(build_client(config)?, cache)
    };
    Ok(reader.with_article_limit(config.article_limit))
}

fn build_client(config: &Config) -> Result<SupabaseClient> {
    let url = config
        .supabase_url
        .as_deref()
        .context("No backend configured: set supabase_url in config or SUPABASE_URL")?;
    let anon_key = config
        .supabase_anon_key
        .clone()
        .context("No anon key configured: set supabase_anon_key in config or SUPABASE_ANON_KEY")?;

    let http = reqwest::Client::builder()
        .user_agent(concat!("briefly/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")?;

    let mut client = SupabaseClient::new(
        http,
        url,
        SecretString::from(anon_key),
        config.request_timeout(),
    )
    .context("Invalid backend URL")?;

    if let Some(token) = config.access_token.clone() {
        client = client.with_access_token(SecretString::from(token));
    }
    Ok(client)
}

async fn cache_command<S: SlotStore>(action: CacheAction, cache: &CachedFetch<S>) -> Result<()> {
    match action {
        CacheAction::Status => {
            let slots = cache
                .store()
                .slots()
                .await
                .context("Failed to read cache slots")?;
            if slots.is_empty() {
                println!("Cache is empty.");
            }
            for info in &slots {
                println!("{}", output::slot_line(info));
            }
        }
        CacheAction::Show { key } => match key {
            CacheKey::Articles => {
                print_articles(&cache.snapshot::<Article>(key).await.unwrap_or_default())
            }
            CacheKey::SavedArticles => {
                print_saved(&cache.snapshot::<SavedArticle>(key).await.unwrap_or_default())
            }
            CacheKey::Categories => {
                print_categories(&cache.snapshot::<Category>(key).await.unwrap_or_default())
            }
        },
        CacheAction::Clear { key } => {
            let keys = match key {
                Some(key) => vec![key],
                None => CacheKey::ALL.to_vec(),
            };
            for key in keys {
                cache
                    .clear(key)
                    .await
                    .with_context(|| format!("Failed to clear cache slot {key}"))?;
                println!("Cleared {key}");
            }
        }
    }
    Ok(())
}

fn print_articles(articles: &[Article]) {
    if articles.is_empty() {
        println!("No articles.");
    }
    for article in articles {
        println!("{}", output::article_line(article, LINE_WIDTH));
    }
}

fn print_saved(saved: &[SavedArticle]) {
    if saved.is_empty() {
        println!("No saved articles.");
    }
    for item in saved {
        println!("{}", output::saved_line(item, LINE_WIDTH));
    }
}

fn print_categories(categories: &[Category]) {
    if categories.is_empty() {
        println!("No categories.");
    }
    for category in categories {
        println!("{}", output::category_line(category));
    }
}
