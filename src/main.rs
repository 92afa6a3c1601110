mod captions;
mod claims;
mod config;
mod errors;
mod log_config;
mod model;
mod payload;
mod platform;
mod registry;
mod relay;
mod telegram;

use crate::config::{Config, load_env};
use crate::log_config::init_logging;
use crate::relay::{ProofRelay, RelaySettings};
use crate::telegram::{BotName, TelegramPlatform};
use anyhow::Context;
use std::sync::Arc;
use teloxide::prelude::*;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::UnboundedReceiverStream;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment (including .env) and refuse to start on incomplete config
    load_env();
    let config = Config::from_env().context("refusing to start")?;
    init_logging(&config.log_file, config.log_level)?;
    for warning in config.warnings() {
        log::warn!("{}", warning);
    }

    let bot = Bot::new(config.bot_token.clone());
    let me = bot.get_me().await.context("could not reach the Telegram Bot API")?;
    let bot_name = me.username().to_string();

    let platform = TelegramPlatform::new(
        bot.clone(),
        config.moderation_chat_id,
        config.restricted_channel_id,
    );
    let relay = Arc::new(ProofRelay::new(platform, RelaySettings::from(&config)));
    log::info!(
        "Invites to channel {} expire after {} minutes",
        config.restricted_channel_id,
        config.invite_expiry.num_minutes()
    );

    // updates arrive through the dispatcher and are handled one task per event
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let mut dispatcher = Dispatcher::builder(bot, telegram::schema())
        .dependencies(dptree::deps![events_tx, BotName(bot_name.clone())])
        .default_handler(|_| async {})
        .error_handler(LoggingErrorHandler::with_custom_text("Dispatcher error"))
        .build();
    let shutdown = dispatcher.shutdown_token();
    let dispatch_handle = tokio::spawn(async move { dispatcher.dispatch().await });
    log::info!("Bot @{} started, polling for updates", bot_name);

    let mut events = UnboundedReceiverStream::new(events_rx);
    tokio::select! {
        _ = async {
            while let Some(event) = events.next().await {
                let relay = relay.clone();
                tokio::spawn(async move { relay.process_event(event).await });
            }
        } => {},
        _ = tokio::signal::ctrl_c() => {
            log::info!(
                "Shutting down with {} proofs still pending.",
                relay.registry().len()
            );
        }
    }

    if let Ok(stopped) = shutdown.shutdown() {
        stopped.await;
    }
    let _ = dispatch_handle.await;
    Ok(())
}
