mod common;
mod curator;
mod drivers;
mod traits;

pub use curator::submissions::{DeleteOutcome, SubmissionManager};
pub use drivers::bot::BotConfig;
pub use traits::{ChatDriver, Conversation};

use drivers::bot::BotDriver;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub async fn start_with_cancel_token(
    config: BotConfig,
    cancel_token: CancellationToken,
) -> anyhow::Result<()> {
    info!("Initializing Matrix adapter...");
    let driver: Box<dyn ChatDriver> = Box::new(BotDriver::new(config));
    driver.run(cancel_token).await
}

pub async fn start(config: BotConfig) -> anyhow::Result<()> {
    start_with_cancel_token(config, CancellationToken::new()).await
}
