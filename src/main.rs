use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use jellywatch::config::{self, Config};
use jellywatch::integrations::discord::DiscordNotifier;
use jellywatch::integrations::jellyfin::JellyfinClient;
use jellywatch::integrations::{MediaGateway, Notifier};
use jellywatch::status;
use jellywatch::watch::Scheduler;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "jellywatch")]
#[command(about = "Discord notifications for Jellyfin playback and new media")]
#[command(version)]
struct Args {
    /// Initialize configuration
    #[arg(long)]
    init: bool,

    /// Path to config file
    #[arg(long, short)]
    config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Watch sessions and new items until interrupted (default)
    Run,
    /// Show current playback activity on the server
    Stats {
        /// Also post the report to the Discord channel
        #[arg(long)]
        post: bool,
    },
    /// Run a single tick of each watcher and print the results
    Tick,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("jellywatch=info".parse()?),
        )
        .init();

    if args.init {
        config::init_wizard(args.config.as_deref()).await?;
        return Ok(());
    }

    let config = config::load(args.config.as_deref())?;
    let gateway = connect_gateway(&config);
    let notifier: Arc<dyn Notifier> = Arc::new(DiscordNotifier::from_config(&config.discord));

    match args.command.unwrap_or(Command::Run) {
        Command::Run => run(&config, gateway, notifier).await,
        Command::Stats { post } => {
            let report = status::current_activity(gateway.as_deref()).await;
            println!("{}", report.to_plain_text());
            if post {
                notifier.ready().await?;
                notifier
                    .send(&report)
                    .await
                    .context("Failed to post status report")?;
            }
            Ok(())
        }
        Command::Tick => {
            let gateway = gateway.context("Jellyfin is not configured")?;
            let mut scheduler =
                Scheduler::new(gateway, notifier, &config.polling, config.jellyfin.user_id.clone());
            let (sessions, recent) = scheduler.tick_once().await;
            println!("sessions:       {}", sessions);
            println!("recently added: {}", recent);
            Ok(())
        }
    }
}

/// Build the media gateway, or log why it is unavailable
fn connect_gateway(config: &Config) -> Option<Arc<dyn MediaGateway>> {
    let timeout = Duration::from_secs(config.polling.request_timeout_secs.max(1));
    match JellyfinClient::with_timeout(&config.jellyfin, timeout) {
        Ok(client) => {
            tracing::info!("Using Jellyfin server at {}", client.server_url());
            let client: Arc<dyn MediaGateway> = Arc::new(client);
            Some(client)
        }
        Err(e) => {
            tracing::error!("Error initializing Jellyfin client: {}", e);
            None
        }
    }
}

async fn run(
    config: &Config,
    gateway: Option<Arc<dyn MediaGateway>>,
    notifier: Arc<dyn Notifier>,
) -> Result<()> {
    if config.discord.bot_token.is_none() {
        anyhow::bail!("DISCORD_BOT_TOKEN is not set. Run `jellywatch --init` or export it.");
    }
    if config.discord.channel_id.is_none() {
        tracing::warn!("DISCORD_CHANNEL_ID is not set. Cannot send notifications.");
    }

    let handles = match gateway {
        Some(gateway) => {
            let scheduler = Scheduler::new(
                gateway,
                notifier,
                &config.polling,
                config.jellyfin.user_id.clone(),
            );
            Some(scheduler.spawn())
        }
        None => {
            tracing::warn!("Watchers disabled until Jellyfin is configured");
            None
        }
    };

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    tracing::info!("Shutting down");

    if let Some(handles) = handles {
        handles.abort();
    }

    Ok(())
}
