//! Token Swap Bot for Telegram - Main executable
//!
//! Entry point for the Telegram bot that connects a user's wallet and swaps
//! ERC-20 tokens through an on-chain swap contract at owner-set rates.
use anyhow::Context;
use dotenv::dotenv;
use log::{info, warn};
use std::env;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands as _;
use token_swap_bot::{BotCommands, Router, Settings};

/// Application entry point
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    // Initialize logging with default level of "info"
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    info!("Starting Token Swap Telegram Bot v{}", token_swap_bot::VERSION);

    // Load and validate configuration
    let bot_token = env::var("TELEGRAM_BOT_TOKEN")
        .context("TELEGRAM_BOT_TOKEN must be set in environment variables")?;
    let settings = Settings::load()?;
    info!(
        "Swap contract {} via {} ({} tokens configured)",
        settings.swap_contract,
        settings.rpc_url,
        settings.tokens.len()
    );

    // Create Telegram bot instance
    let bot = Bot::new(bot_token);

    // Initialize the application components
    info!("Initializing bot application...");
    let (router, bot, service_container, storage) =
        token_swap_bot::create_application(bot, &settings)?;

    if let Err(e) = bot.set_my_commands(BotCommands::bot_commands()).await {
        warn!("Failed to register bot commands: {}", e);
    }

    // Get the handler from the router
    let handler = router.setup_handlers();

    // Build dispatcher with dependency injections and control-C handling
    let mut dispatcher = teloxide::dispatching::Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![service_container, storage])
        .enable_ctrlc_handler()
        .build();

    info!("Bot is running! Press Ctrl+C to stop.");
    dispatcher.dispatch().await;

    Ok(())
}
