use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use upcheck::config::WorkerConfig;
use upcheck::notifications::{AlertDispatcher, TwilioSender, WebhookSender};
use upcheck::store::FileStore;
use upcheck::worker::{CheckWorker, HttpProber};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long)]
    config: Option<String>,
}

fn init_logging(log_dir: &str) {
    // Log to a file: JSON format, daily rotation
    let file_appender = rolling::daily(log_dir, "upcheck.log");
    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .json();

    // Log to stdout: human-readable format
    let stdout_layer = fmt::layer().with_writer(std::io::stdout);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();
}

fn build_dispatcher(config: &WorkerConfig) -> Result<Arc<dyn AlertDispatcher>, String> {
    match config.alert_channel.as_str() {
        "twilio" => {
            let account_sid = config
                .twilio_account_sid
                .clone()
                .ok_or("twilio_account_sid is required for the twilio alert channel")?;
            let auth_token = config
                .twilio_auth_token
                .clone()
                .ok_or("twilio_auth_token is required for the twilio alert channel")?;
            let from_phone = config
                .twilio_from_phone
                .clone()
                .ok_or("twilio_from_phone is required for the twilio alert channel")?;
            Ok(Arc::new(TwilioSender::new(
                account_sid,
                auth_token,
                from_phone,
            )))
        }
        "webhook" => {
            let url = config
                .webhook_url
                .clone()
                .ok_or("webhook_url is required for the webhook alert channel")?;
            Ok(Arc::new(WebhookSender::new(url)))
        }
        other => Err(format!("Unsupported alert channel: {other}")),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();

    let config = match WorkerConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load worker configuration: {e}");
            return Err(e.into());
        }
    };

    init_logging(&config.log_dir);
    info!(
        interval = config.pass_interval_seconds,
        max_probes = config.max_concurrent_probes,
        channel = %config.alert_channel,
        "Starting check monitoring worker"
    );

    let store = Arc::new(FileStore::new(config.data_dir.clone()));
    let dispatcher = build_dispatcher(&config)?;
    let prober = Arc::new(HttpProber::new()?);

    let worker = Arc::new(CheckWorker::new(
        store,
        dispatcher,
        prober,
        Duration::from_secs(config.pass_interval_seconds),
        config.max_concurrent_probes,
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(());
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for shutdown signal");
            return;
        }
        info!("Ctrl-C received, shutting down");
        let _ = shutdown_tx.send(());
    });

    worker.run(shutdown_rx).await;
    info!("Worker stopped");
    Ok(())
}
