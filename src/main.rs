use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

mod classify;
mod collect;
mod detail;
mod feed;
mod models;
mod normalize;
mod render;
mod store;

#[derive(Parser)]
#[command(name = "activity-feed")]
#[command(about = "Classroom activity feed aggregator for LexiLearn", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load realistic seed data
    Seed,
    /// Aggregate and print the recent activity feed
    Feed {
        #[arg(long, default_value_t = feed::DEFAULT_LIMIT)]
        limit: usize,
        #[arg(long)]
        json: bool,
    },
    /// Show one event with its classification and detail panels
    Show {
        #[arg(long)]
        actor: Uuid,
        #[arg(long)]
        event: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set to a Postgres instance")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")?;
    let store = Arc::new(store::PgActivityStore::new(pool));

    match cli.command {
        Commands::InitDb => {
            store.init_db().await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            store.seed().await?;
            println!("Seed data inserted.");
        }
        Commands::Feed { limit, json } => {
            let groups = feed::FeedEngine::new(store).recent_feed(limit).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&render::feed_json(&groups))?);
            } else {
                print!("{}", render::render_feed(&groups));
            }
        }
        Commands::Show { actor, event } => {
            let Some(profile) = store.find_actor(actor).await? else {
                println!("No actor with id {actor}.");
                return Ok(());
            };
            let Some(raw) = store.find_event(actor, &event).await? else {
                println!("No event {event} for actor {actor}.");
                return Ok(());
            };
            let record = normalize::normalize(&raw, &profile);
            print!("{}", render::render_detail(&record));
        }
    }

    Ok(())
}
