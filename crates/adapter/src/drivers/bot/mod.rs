mod driver;
mod handlers;

pub use driver::{BotConfig, BotDriver};
