mod config;

use anyhow::Context;
use dotenvy::dotenv;
use matrix_sdk::ruma::UserId;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

use config::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let settings = Settings::new().context("Failed to load configuration")?;

    let user_id = UserId::parse(&settings.matrix.user)
        .map_err(|e| anyhow::anyhow!("Invalid Matrix User ID: {}", e))?;

    let bot_config = adapter::BotConfig {
        homeserver_url: settings.matrix.homeserver_url.clone(),
        user_id,
        access_token: settings.matrix.token.clone(),
        device_id: settings
            .matrix
            .device_id
            .clone()
            .unwrap_or_else(|| "CURATORBOT".to_string()),
        channel: settings.curator.channel.clone(),
        reply_timeout: Duration::from_secs(settings.curator.reply_timeout_secs),
    };

    let cancel_token = CancellationToken::new();
    let worker_token = cancel_token.clone();

    let mut worker = tokio::spawn(async move {
        if let Err(e) = adapter::start_with_cancel_token(bot_config, worker_token).await {
            tracing::error!("Matrix worker crashed: {:?}", e);
        }
    });

    tokio::select! {
        _ = shutdown_signal() => {
            cancel_token.cancel();
            let _ = worker.await;
        }
        _ = &mut worker => {}
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down gracefully...");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully...");
        },
    }
}
