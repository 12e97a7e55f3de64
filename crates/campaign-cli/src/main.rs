mod posts;
mod run;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "campaign-cli")]
#[command(about = "Generate and schedule campaign posts from a case study")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Generate text and images for a campaign and store the scheduled posts
    Run {
        /// Campaign file (YAML) with the case study and campaign parameters
        #[arg(long)]
        campaign: PathBuf,
    },
    /// Show the publication slots a campaign would get, without calling any service
    Preview {
        #[arg(long)]
        campaign: PathBuf,

        /// Day before the first possible slot (defaults to today, UTC)
        #[arg(long)]
        start: Option<NaiveDate>,
    },
    /// List stored posts for a case study
    Posts {
        #[arg(long)]
        case_study: Uuid,
    },
    /// Apply pending database migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing()?;

    let cli = Cli::parse();
    match cli.command {
        Commands::Run { campaign } => {
            let config = campaign_core::load_app_config()?;
            let pool = connect(&config).await?;
            run::run_campaign(&pool, &config, &campaign).await?;
        }
        Commands::Preview { campaign, start } => {
            run::run_preview(&campaign, start)?;
        }
        Commands::Posts { case_study } => {
            let config = campaign_core::load_app_config()?;
            let pool = connect(&config).await?;
            posts::run_posts(&pool, case_study).await?;
        }
        Commands::Migrate => {
            let config = campaign_core::load_app_config()?;
            let pool = connect(&config).await?;
            let applied = campaign_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
        }
    }

    Ok(())
}

/// `RUST_LOG` wins; otherwise `CAMPAIGN_LOG_LEVEL`, then `info`.
fn init_tracing() -> anyhow::Result<()> {
    let fallback = std::env::var("CAMPAIGN_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(fallback))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    Ok(())
}

async fn connect(config: &campaign_core::AppConfig) -> anyhow::Result<sqlx::PgPool> {
    let pool_config = campaign_db::PoolConfig::from_app_config(config);
    let pool = campaign_db::connect_pool(&config.database_url, pool_config).await?;
    Ok(pool)
}
