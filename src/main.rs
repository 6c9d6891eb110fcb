mod compose;
mod config;
mod directory;
mod error;
mod job;
mod platform;
mod poster;
mod scheduler;
mod selector;
mod stats;

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};

use config::Config;
use job::IntroJob;
use platform::traq::TraqClient;
use scheduler::Scheduler;
use selector::Selector;

#[derive(Parser)]
#[command(
    name = "channel-intro",
    version,
    about = "Introduces a random traQ channel with its stats on a schedule"
)]
struct Cli {
    #[arg(short, long, default_value = "~/.channel-intro/config.toml")]
    config: String,
    /// Bot access token
    #[arg(long, env = "TRAQ_ACCESS_TOKEN", hide_env_values = true)]
    token: Option<String>,
    /// Destination channel id; overrides [post] channel_id
    #[arg(long, env = "TRAQ_INTRO_CHANNEL_ID")]
    channel_id: Option<String>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Introduce a channel at every scheduled tick
    Run,
    /// Introduce a channel once and exit
    Once {
        /// Print the message instead of posting it
        #[arg(long)]
        dry_run: bool,
    },
    /// Write a default config file
    Init,
    /// Show the next scheduled run times
    Next {
        #[arg(short = 'n', long, default_value_t = 5)]
        count: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Init) => {
            let path = config::init_config(&cli.config).await?;
            tracing::info!("Config at {}", path.display());
        }
        Some(Commands::Next { count }) => {
            let cfg = config::load(&cli.config)?;
            let scheduler = Scheduler::new(&cfg.schedule)?;
            for t in scheduler.upcoming(Utc::now(), count) {
                println!("{}", t.to_rfc3339());
            }
        }
        Some(Commands::Once { dry_run }) => {
            let cfg = config::load(&cli.config)?;
            let (job, client) = prepare(cfg, &cli, dry_run)?;
            let mut stdout = std::io::stdout();
            let report = job.run(&client, &mut stdout).await?;
            tracing::info!("Introduced {}", report.full_path);
        }
        Some(Commands::Run) | None => {
            let cfg = config::load(&cli.config)?;
            let scheduler = Scheduler::new(&cfg.schedule)?;
            tracing::info!(
                "Scheduling introductions with '{}' ({})",
                cfg.schedule.cron,
                cfg.schedule.timezone
            );
            let (job, client) = prepare(cfg, &cli, false)?;
            scheduler.start(&job, &client).await?;
        }
    }
    Ok(())
}

/// Build the job and the platform client from config, CLI and environment.
fn prepare(mut cfg: Config, cli: &Cli, dry_run: bool) -> Result<(IntroJob, TraqClient)> {
    let Some(token) = cli.token.as_deref().filter(|t| !t.is_empty()) else {
        anyhow::bail!("Access token required. Set TRAQ_ACCESS_TOKEN or pass --token.");
    };
    if let Some(id) = &cli.channel_id {
        cfg.post.channel_id = id.clone();
    }
    if dry_run {
        cfg.post.channel_id.clear();
    }
    if cfg.post.channel_id.is_empty() {
        tracing::warn!("No destination channel configured, messages go to stdout");
    }

    let client = TraqClient::new(&cfg.api, token)?;
    let job = IntroJob {
        selector: Selector::from_config(&cfg.selection)?,
        message: cfg.message,
        post: cfg.post,
    };
    Ok((job, client))
}
