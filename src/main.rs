//! gymscout - exercise library search

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use gymscout::catalog::{ExerciseSearch, LocalCatalog};
use gymscout::config::{DEFAULT_DB_PATH, DEFAULT_DEBOUNCE_MS, DEFAULT_PAGE_SIZE, SearchConfig};
use gymscout::db::{Database, KeyValueStore, MemoryStore};
use gymscout::search::{
    FilterSet, SearchHistory, SearchSession, SortField, SortOrder, SortSpec, parse, to_filters,
};
use gymscout::tui::App;

#[derive(Parser)]
#[command(name = "gymscout")]
#[command(author, version, about = "Exercise library search with field:value operators")]
struct Cli {
    /// SQLite file holding history and saved searches
    #[arg(long, global = true, env = "GYMSCOUT_DB", default_value = DEFAULT_DB_PATH)]
    db: String,

    /// Quiet period after typing before a search runs
    #[arg(long, global = true, env = "GYMSCOUT_DEBOUNCE_MS", default_value_t = DEFAULT_DEBOUNCE_MS)]
    debounce_ms: u64,

    /// Results per page
    #[arg(long, global = true, env = "GYMSCOUT_PAGE_SIZE", default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: usize,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    Relevance,
    Name,
    Difficulty,
    Calories,
}

impl From<SortArg> for SortField {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Relevance => SortField::Relevance,
            SortArg::Name => SortField::Name,
            SortArg::Difficulty => SortField::Difficulty,
            SortArg::Calories => SortField::Calories,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Open interactive search
    Tui,

    /// Run a search (e.g. "chest equipment:barbell difficulty:advanced")
    Search {
        query: String,

        /// Number of results to show
        #[arg(short, long)]
        limit: Option<usize>,

        /// Skip this many results
        #[arg(short, long, default_value = "0")]
        offset: usize,

        #[arg(short, long, value_enum, default_value = "relevance")]
        sort: SortArg,

        /// Sort descending
        #[arg(long)]
        desc: bool,
    },

    /// Show suggestions for a partial query
    Suggest { partial: String },

    /// Show how a query is split into text and filters
    Parse { query: String },

    /// Show recent searches
    History {
        /// Forget all recent searches
        #[arg(long)]
        clear: bool,
    },

    /// Save a search under a name
    Save { name: String, query: String },

    /// List saved searches
    Saved {
        /// Delete the saved search with this id
        #[arg(long)]
        remove: Option<String>,
    },

    /// Show search statistics
    Stats,
}

/// History store; falls back to memory when the database cannot be opened
fn open_store(path: &str) -> Arc<dyn KeyValueStore> {
    match Database::open(path) {
        Ok(db) => Arc::new(db),
        Err(e) => {
            warn!("Could not open {}, history will not persist: {:#}", path, e);
            Arc::new(MemoryStore::new())
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = SearchConfig::default()
        .with_db_path(&cli.db)
        .with_debounce_ms(cli.debounce_ms)
        .with_page_size(cli.page_size);

    let store = open_store(&config.db_path.to_string_lossy());
    let history = SearchHistory::new(store, config.history_limit);
    let catalog = Arc::new(LocalCatalog::new());
    let session = Arc::new(SearchSession::new(catalog.clone(), history, config)?);

    match cli.command {
        Some(Commands::Search { query, limit, offset, sort, desc }) => {
            let parsed = parse(&query);
            let filters = to_filters(&parsed.operators, &FilterSet::default());
            let order = if desc { SortOrder::Desc } else { SortOrder::Asc };
            let sort = SortSpec::new(sort.into(), order);
            let limit = limit.unwrap_or(session.config().page_size);

            // Paged lookups go straight to the catalog; page one goes through the session
            // so it lands in history like an interactive search would.
            let result = if offset == 0 && limit == session.config().page_size {
                session.set_sort(sort);
                session.set_query(query.clone());
                session.search_now().await.unwrap_or_default()
            } else {
                catalog
                    .search_exercises(&parsed.clean_query, &filters, sort, limit, offset)
                    .await
                    .unwrap_or_default()
            };

            println!(
                "{} of {} exercises match ({:.2} ms)",
                result.filtered_count, result.total_count, result.search_time_ms
            );
            println!("{:-<72}", "");
            for e in &result.items {
                let muscles: Vec<_> = e.muscle_groups.iter().map(|m| m.as_str()).collect();
                println!(
                    "{} {:30} | {:12} | {}",
                    e.category.emoji(),
                    e.name,
                    e.difficulty.as_str(),
                    muscles.join(", ")
                );
            }
            if result.has_more {
                println!("... more with --offset {}", offset + result.items.len());
            }
        }

        Some(Commands::Suggest { partial }) => {
            for s in session.suggestions(&partial) {
                match &s.detail {
                    Some(detail) => println!("[{}] {}  ({})", s.kind.label(), s.text, detail),
                    None => println!("[{}] {}", s.kind.label(), s.text),
                }
            }
        }

        Some(Commands::Parse { query }) => {
            let parsed = parse(&query);
            let filters = to_filters(&parsed.operators, &FilterSet::default());
            println!("Text: {:?}", parsed.clean_query);
            for op in &parsed.operators {
                let note = if op.field.is_recognized() { "" } else { " (ignored)" };
                println!("  {}:{}{}", op.field, op.value, note);
            }
            println!("Filters: {}", filters.to_operator_string());
        }

        Some(Commands::History { clear }) => {
            if clear {
                session.history().clear();
                println!("History cleared");
            } else {
                println!("Recent searches:");
                println!("{:-<60}", "");
                for h in session.history().entries() {
                    println!(
                        "{} | {:35} | {} results",
                        h.timestamp.format("%Y-%m-%d %H:%M"),
                        h.query,
                        h.result_count
                    );
                }
            }
        }

        Some(Commands::Save { name, query }) => {
            if query.trim().is_empty() {
                println!("Nothing to save: query is empty");
            } else {
                let saved = session.history().save(&name, &query, &FilterSet::default());
                println!("Saved '{}' (id: {})", saved.name, saved.id);
            }
        }

        Some(Commands::Saved { remove }) => {
            if let Some(id) = remove {
                if session.history().remove_saved(&id) {
                    println!("Removed {}", id);
                } else {
                    println!("No saved search with id {}", id);
                }
            } else {
                for s in session.history().saved() {
                    println!("{} | {:20} | {}", s.id, s.name, s.query);
                }
            }
        }

        Some(Commands::Stats) => {
            let analytics = session.history().analytics();
            println!("Search Statistics");
            println!("{:-<40}", "");
            println!("Total searches: {}", analytics.total_searches);
            println!("Zero-result rate: {:.0}%", analytics.zero_result_rate() * 100.0);
            if let Some(last) = analytics.last_search_at {
                println!("Last search: {}", last.format("%Y-%m-%d %H:%M"));
            }
            for (query, count) in analytics.popular_queries(5) {
                println!("  {:30} {}", query, count);
            }
        }

        Some(Commands::Tui) | None => {
            let mut app = App::new(session)?;
            app.run()?;
        }
    }

    Ok(())
}
