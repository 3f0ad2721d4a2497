use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use palisade::config::{Config, ScorerBackend};
use palisade::db::{Database, SqliteDatabase};
use palisade::moderation::ModerationQueryService;
use palisade::scoring::ContentScorer;

/// Palisade: a content-moderation decision pipeline.
///
/// Scores user-generated content for toxicity (Perspective API with a
/// deterministic heuristic fallback), holds flagged items for human review,
/// and keeps a full audit trail of every status change.
#[derive(Parser)]
#[command(name = "palisade", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database
    Init,

    /// Run the HTTP API server
    Serve {
        /// Port to listen on
        #[arg(long, default_value = "3001")]
        port: u16,

        /// Address to bind
        #[arg(long, default_value = "0.0.0.0")]
        bind: String,
    },

    /// Score a piece of text with the configured scorer (policy debugging)
    Score {
        /// The text to score
        text: String,
    },

    /// Print the review queue
    Queue {
        /// Page number (1-based)
        #[arg(long, default_value = "1")]
        page: u32,

        /// Results per page (max 100)
        #[arg(long, default_value = "20")]
        limit: u32,
    },

    /// Print aggregate moderation stats
    Stats,

    /// Show system status (DB path, table count, item counts, scorer backend)
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("palisade=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => {
            info!("Initializing Palisade database...");
            let config = Config::load()?;
            let db = init_database(&config)?;
            let table_count = db.table_count().await?;
            println!("Database initialized at: {}", config.db_path);
            println!("Tables created: {table_count}");
            println!("\nPalisade is ready. Next step: cargo run -- serve");
        }

        Commands::Serve { port, bind } => {
            let config = Config::load()?;
            let db = init_database(&config)?;
            let scorer = Arc::new(ContentScorer::from_config(&config)?);
            palisade::web::run_server(config, db, scorer, port, &bind).await?;
        }

        Commands::Score { text } => {
            let config = Config::load()?;
            let scorer = ContentScorer::from_config(&config)?;

            let result = scorer.score(&text).await;

            let verdict = if result.is_toxic {
                "TOXIC".red().bold()
            } else {
                "CLEAN".green().bold()
            };
            println!("Verdict:    {verdict}");
            println!("Confidence: {:.3}", result.confidence);
            println!("Provider:   {}", result.provider_id);
            if result.degraded {
                println!("{}", "Degraded: primary provider unavailable".yellow());
            }
            if !result.reasons.is_empty() {
                println!("Reasons:");
                for reason in &result.reasons {
                    println!("  - {reason}");
                }
            }
        }

        Commands::Queue { page, limit } => {
            let config = Config::load()?;
            let db = open_database(&config)?;
            let queries = ModerationQueryService::new(db);

            let queue = queries.review_queue(Some(page), Some(limit)).await?;

            if queue.items.is_empty() {
                println!("Review queue is empty.");
                return Ok(());
            }

            println!(
                "{}",
                format!(
                    "Review queue — page {}/{} ({} total)",
                    queue.pagination.page, queue.pagination.total_pages, queue.pagination.total
                )
                .bold()
            );
            println!("  {:<38} {:<12} {:<14} {:<8} Text", "Id", "Status", "Owner", "Appeal");
            for item in &queue.items {
                let appeal = item
                    .appeal
                    .as_ref()
                    .map(|a| a.status.as_str())
                    .unwrap_or("-");
                let preview: String = item.text.chars().take(40).collect();
                println!(
                    "  {:<38} {:<12} {:<14} {:<8} {}",
                    item.id, item.status, item.owner_id, appeal, preview
                );
            }
        }

        Commands::Stats => {
            let config = Config::load()?;
            let db = open_database(&config)?;
            let queries = ModerationQueryService::new(db);

            let stats = queries.stats().await?;
            println!("{}", "Moderation stats".bold());
            println!("  Total items:     {}", stats.total_items);
            println!(
                "  Approved:        {} ({}%)",
                stats.approved.count, stats.approved.percentage
            );
            println!(
                "  Rejected:        {} ({}%)",
                stats.rejected.count, stats.rejected.percentage
            );
            println!("  Pending review:  {}", stats.pending_review);
            println!("  Pending appeals: {}", stats.pending_appeals);
        }

        Commands::Status => {
            let config = Config::load()?;
            let db = open_database(&config)?;

            let backend = match config.scorer_backend {
                ScorerBackend::Heuristic => "heuristic",
                ScorerBackend::Perspective => "perspective",
            };

            let table_count = db.table_count().await?;
            let stats = db.moderation_stats().await?;

            println!("{}", "Palisade status".bold());
            println!("  Database:        {}", config.db_path);
            println!("  Tables:          {table_count}");
            println!("  Scorer backend:  {backend}");
            println!("  Total items:     {}", stats.total_items);
            println!("  Pending review:  {}", stats.pending_review);
            println!("  Pending appeals: {}", stats.pending_appeals);
        }
    }

    Ok(())
}

/// Create (or migrate) the database and wrap it in the Database trait.
fn init_database(config: &Config) -> Result<Arc<dyn Database>> {
    let conn = palisade::db::initialize(&config.db_path)?;
    Ok(Arc::new(SqliteDatabase::new(conn)))
}

/// Open an existing database (fails with a hint if `init` hasn't run).
fn open_database(config: &Config) -> Result<Arc<dyn Database>> {
    let conn = palisade::db::open(&config.db_path)?;
    Ok(Arc::new(SqliteDatabase::new(conn)))
}
