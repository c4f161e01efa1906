use anyhow::Context;
use background_service::BackgroundService;
use clap::Parser;
use issuewatch_core::{parse_duration, AppConfig, FileConfig};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "issuewatch=info,issuewatch_core=info,background_service=info,github_client=info,seen_store=info,webhook_notifier=info";

/// Watch a repository's issue listing and relay new issues to chat webhooks.
#[derive(Parser, Debug)]
#[command(name = "issuewatch", version)]
struct Cli {
    /// Issue listing URL, e.g. https://github.com/owner/repo/issues
    #[arg(long, env = "ISSUEWATCH_GITHUB_REPO")]
    github_repo: Option<String>,

    /// Discord webhook URL
    #[arg(long, env = "ISSUEWATCH_DISCORD_HOOK_URL")]
    discord_hook_url: Option<String>,

    /// Google Chat webhook URL
    #[arg(long, env = "ISSUEWATCH_GOOGLE_CHAT_HOOK_URL")]
    google_chat_hook_url: Option<String>,

    /// Time between checks, e.g. 10m or 90s [default: 10m]
    #[arg(long, env = "ISSUEWATCH_REFRESH_INTERVAL", value_parser = parse_duration)]
    refresh_interval: Option<Duration>,

    /// File holding already-notified issue ids [default: .local/cache/issue_cache.txt]
    #[arg(long, env = "ISSUEWATCH_CACHE_FILE")]
    cache_file: Option<PathBuf>,

    /// Pause after each new issue [default: 500ms]
    #[arg(long, env = "ISSUEWATCH_NOTIFY_DELAY", value_parser = parse_duration)]
    notify_delay: Option<Duration>,

    /// Optional TOML file with the same settings; flags take precedence
    #[arg(long, env = "ISSUEWATCH_CONFIG")]
    config: Option<PathBuf>,
}

impl Cli {
    fn into_config(self) -> anyhow::Result<AppConfig> {
        let mut config = AppConfig::default();

        if let Some(path) = &self.config {
            let file = FileConfig::load(path)
                .with_context(|| format!("loading {}", path.display()))?;
            config.apply_file(file);
        }

        if let Some(repo) = self.github_repo {
            config.github_repo = repo;
        }
        if self.discord_hook_url.is_some() {
            config.discord_hook_url = self.discord_hook_url;
        }
        if self.google_chat_hook_url.is_some() {
            config.google_chat_hook_url = self.google_chat_hook_url;
        }
        if let Some(interval) = self.refresh_interval {
            config.refresh_interval = interval;
        }
        if let Some(cache_file) = self.cache_file {
            config.cache_file = cache_file;
        }
        if let Some(delay) = self.notify_delay {
            config.notify_delay = delay;
        }

        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stdout)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config = Cli::parse().into_config().map_err(|e| {
        tracing::error!("Invalid configuration: {:#}", e);
        e
    })?;

    let mut service = BackgroundService::new(&config).map_err(|e| {
        tracing::error!("Startup failed: {}", e);
        e
    })?;

    tracing::info!(
        "Starting issuewatch for {} (cache: {})",
        config.github_repo,
        config.cache_file.display()
    );

    service.start().await?;
    Ok(())
}
