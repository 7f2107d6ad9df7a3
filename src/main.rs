use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hostwatch::render::{self, Console};
use hostwatch::Settings;
use hostwatch_adapters::CheckMkTransport;
use hostwatch_sdk::{check_triggers, FileTriggers, Poller, TransitionDetector};

/// How often trigger files are checked.
const TRIGGER_SCAN_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Parser, Debug)]
#[command(name = "hostwatch")]
#[command(about = "Watch CheckMK host states and print state-change animations")]
struct Args {
    /// Config file (TOML, YAML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// CheckMK site URL, e.g. http://monitor:5000/cmk
    #[arg(long)]
    endpoint: Option<String>,

    /// Automation user
    #[arg(short, long)]
    user: Option<String>,

    /// Automation secret (prefer HOSTWATCH_SECRET)
    #[arg(long)]
    secret: Option<String>,

    /// Seconds between polls
    #[arg(short, long)]
    interval: Option<u64>,

    /// Seconds before a fetch times out
    #[arg(long)]
    timeout: Option<u64>,

    /// Directory watched for trigger files
    #[arg(long)]
    trigger_dir: Option<PathBuf>,

    /// How often the console drains events, in milliseconds
    #[arg(long, default_value = "100")]
    refresh_ms: u64,

    /// Poll once, write the host list as JSON to this file and exit
    #[arg(short, long)]
    export: Option<PathBuf>,
}

impl Args {
    fn apply(&self, settings: &mut Settings) {
        if let Some(endpoint) = &self.endpoint {
            settings.endpoint = endpoint.clone();
        }
        if let Some(user) = &self.user {
            settings.user = user.clone();
        }
        if let Some(secret) = &self.secret {
            settings.secret = secret.clone();
        }
        if let Some(interval) = self.interval {
            settings.interval_secs = interval;
        }
        if let Some(timeout) = self.timeout {
            settings.timeout_secs = timeout;
        }
        if let Some(dir) = &self.trigger_dir {
            settings.trigger_dir = dir.clone();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hostwatch=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let mut settings = Settings::load(args.config.as_deref())?;
    args.apply(&mut settings);
    settings.validate()?;

    tracing::info!(
        endpoint = %settings.endpoint,
        user = %settings.user,
        interval_secs = settings.interval_secs,
        "Starting hostwatch",
    );

    let transport = CheckMkTransport::new().context("failed to create CheckMK client")?;
    let poller = Arc::new(
        Poller::builder(Arc::new(transport))
            .endpoint(settings.monitoring_endpoint())
            .interval(settings.interval())
            .timeout(settings.timeout())
            .poll_immediately(settings.poll_immediately)
            .detector(TransitionDetector::new().require_prior_poll(settings.require_prior_poll))
            .build(),
    );

    if let Some(export_path) = args.export {
        return export_once(&poller, &export_path, &settings.endpoint).await;
    }

    run(poller, &settings, Duration::from_millis(args.refresh_ms.max(1))).await
}

/// Poll once and write the JSON export.
async fn export_once(poller: &Poller, path: &std::path::Path, endpoint: &str) -> Result<()> {
    poller
        .poll_once()
        .await
        .context("could not fetch hosts for export")?;
    render::write_export(path, &poller.get_hosts(), endpoint)?;
    println!("Exported {} hosts to {}", poller.get_hosts().len(), path.display());
    Ok(())
}

/// Run the poller and print until Ctrl-C.
async fn run(poller: Arc<Poller>, settings: &Settings, refresh: Duration) -> Result<()> {
    poller.start()?;

    let triggers = FileTriggers::new(settings.trigger_dir.clone());
    let trigger_task = {
        let poller = poller.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(TRIGGER_SCAN_INTERVAL);
            loop {
                interval.tick().await;
                check_triggers(&triggers, &poller).await;
            }
        })
    };

    let mut console = Console::new();
    let mut refresh_timer = tokio::time::interval(refresh);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = refresh_timer.tick() => {
                let events = poller.drain_animation_events();
                let notify = poller.take_notification_request();
                for line in console.frame(&poller.get_hosts(), &events, notify) {
                    println!("{line}");
                }
            }
            result = &mut shutdown => {
                result.context("failed to listen for Ctrl-C")?;
                tracing::info!("Shutting down");
                break;
            }
        }
    }

    trigger_task.abort();
    poller.stop().await;
    Ok(())
}
