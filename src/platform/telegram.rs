use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{BotCommand, User};
use tracing::{debug, info, warn};

use crate::commands::CommandRegistry;
use crate::error::BotError;
use crate::platform::{InboundEvent, Messenger};
use crate::router::CommandRouter;

/// `Messenger` backed by the Telegram Bot API.
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn send_message(&self, chat_id: &str, text: &str) -> Result<(), BotError> {
        let id: i64 = chat_id.parse().map_err(|_| BotError::Delivery {
            chat_id: chat_id.to_string(),
            reason: "chat id is not numeric".to_string(),
        })?;

        self.bot
            .send_message(ChatId(id), text.to_string())
            .await
            .map(|_| ())
            .map_err(|e| BotError::Delivery {
                chat_id: chat_id.to_string(),
                reason: e.to_string(),
            })
    }
}

/// Publish the registered commands so clients show them in the menu.
/// Best effort.
pub async fn publish_commands(bot: &Bot, registry: &CommandRegistry) {
    let commands: Vec<BotCommand> = registry
        .list()
        .map(|(name, description)| BotCommand::new(name, description.unwrap_or(name)))
        .collect();

    match bot.set_my_commands(commands).await {
        Ok(_) => info!("Published {} commands to Telegram", registry.len()),
        Err(e) => warn!("Failed to publish command list: {}", e),
    }
}

/// Run the Telegram dispatcher until interrupted.
pub async fn run(bot: Bot, router: Arc<CommandRouter>) -> Result<()> {
    info!("Starting Telegram platform...");

    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint(handle_message))
        .branch(Update::filter_callback_query().endpoint(handle_callback));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![router])
        .default_handler(|upd| async move {
            warn!("Unhandled update: {:?}", upd.id);
        })
        .error_handler(LoggingErrorHandler::with_custom_text("telegram"))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

/// This bot's @username, used to ignore commands addressed to other bots.
pub async fn bot_username(bot: &Bot) -> Result<Option<String>> {
    let me = bot.get_me().await.context("Failed to fetch bot identity")?;
    Ok(me.user.username.clone())
}

fn user_fields(user: Option<&User>) -> (Option<String>, Option<String>) {
    match user {
        Some(user) => (Some(user.id.0.to_string()), Some(user.full_name())),
        None => (None, None),
    }
}

/// `None` for messages without text (stickers, photos, service messages).
pub fn event_from_message(msg: &Message) -> Option<InboundEvent> {
    let text = msg.text()?;
    let (user_id, user_name) = user_fields(msg.from.as_ref());
    Some(InboundEvent::from_text(
        user_id,
        user_name,
        Some(msg.chat.id.0.to_string()),
        text,
    ))
}

/// The chat is unknown when the button's message is no longer available
/// (inline-mode results).
pub fn event_from_callback(q: &CallbackQuery) -> InboundEvent {
    let (user_id, user_name) = user_fields(Some(&q.from));
    let chat_id = q.message.as_ref().map(|m| m.chat().id.0.to_string());
    InboundEvent::callback(user_id, user_name, chat_id, q.data.clone().unwrap_or_default())
}

async fn handle_message(msg: Message, router: Arc<CommandRouter>) -> ResponseResult<()> {
    match event_from_message(&msg) {
        Some(event) => {
            router.dispatch(&event).await;
        }
        None => debug!("Skipping non-text message in chat {}", msg.chat.id),
    }
    Ok(())
}

async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    router: Arc<CommandRouter>,
) -> ResponseResult<()> {
    // Stop the client's loading indicator whatever happens next.
    if let Err(e) = bot.answer_callback_query(q.id.clone()).await {
        warn!("Failed to answer callback query: {}", e);
    }

    router.dispatch(&event_from_callback(&q)).await;
    Ok(())
}
