use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

use coursewatch::canvas::client::CanvasClient;
use coursewatch::config::Config;
use coursewatch::notifications::discord::DiscordChannel;
use coursewatch::notifications::service::Notifier;
use coursewatch::scheduler::service::PollScheduler;
use coursewatch::store::db::SqliteStore;
use coursewatch::store::seen::SqliteSeenStore;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load().context("failed to load configuration")?;
    coursewatch::logging::init(config.log_level());
    config.validate().context("invalid configuration")?;

    let store = SqliteStore::new(config.store().path());
    store.touch().context("failed to initialise seen-item store")?;
    tracing::info!(event = "store_ready", path = %store.path(), "seen-item store ready");

    let client =
        CanvasClient::from_config(&config.canvas()).context("failed to build Canvas client")?;
    let channel = DiscordChannel::from_config(&config.discord())
        .context("failed to build Discord client")?;
    let notifier = Notifier::new(Arc::new(channel));
    let scheduler = PollScheduler::new(
        client,
        Arc::new(SqliteSeenStore::new(store)),
        notifier,
        config.poll().interval(),
    );

    scheduler.ensure_channel().await;

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!(event = "shutdown_requested", "shutting down");
            signal.cancel();
        }
    });

    scheduler.run_loop(shutdown).await;
    Ok(())
}
