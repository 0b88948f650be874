use std::sync::Arc;

use tracing::{debug, error, info};

use crate::auth::AdminId;
use crate::commands::fallback::{ButtonCallbackHandler, UnknownCommandHandler};
use crate::commands::{Command, CommandHandler, CommandRegistry, Context};
use crate::error::BotError;
use crate::platform::{EventKind, InboundEvent, Messenger};

pub const APOLOGY_REPLY: &str = "Oops, something went wrong! We're working on it, don't worry.\n\n\
     Remember you can always use /help to see everything I can do for you!";

pub const STARTUP_NOTICE: &str = "🚀 The bot has started successfully!";

/// Where an event ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Command(String),
    Callback,
    UnknownCommand,
    Ignored,
}

/// Routes inbound events to registered commands, the callback handler, or
/// the unknown-command fallback. Handler errors stop here.
pub struct CommandRouter {
    registry: Arc<CommandRegistry>,
    admin_id: AdminId,
    messenger: Arc<dyn Messenger>,
    callback: Arc<dyn CommandHandler>,
    fallback: Arc<dyn CommandHandler>,
    bot_username: Option<String>,
}

impl CommandRouter {
    pub fn new(
        registry: Arc<CommandRegistry>,
        admin_id: AdminId,
        messenger: Arc<dyn Messenger>,
    ) -> Self {
        Self {
            registry,
            admin_id,
            messenger,
            callback: Arc::new(ButtonCallbackHandler),
            fallback: Arc::new(UnknownCommandHandler),
            bot_username: None,
        }
    }

    /// Commands addressed to another bot (`/start@OtherBot`) then fall
    /// through to the unknown-command reply.
    pub fn with_bot_username(mut self, username: Option<String>) -> Self {
        self.bot_username = username;
        self
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    fn context(&self) -> Context<'_> {
        Context {
            messenger: self.messenger.as_ref(),
            registry: &self.registry,
            admin_id: &self.admin_id,
        }
    }

    /// Handle one event end to end. Never fails.
    pub async fn dispatch(&self, event: &InboundEvent) -> Route {
        info!("{}", event);

        let (route, handler) = match &event.kind {
            EventKind::Command {
                name,
                mention,
                args,
                ..
            } => match self.resolve(name, mention.as_deref()) {
                Some(command) => {
                    info!(
                        "Command: /{} | Args: {} | User ID: {} | Chat ID: {}",
                        name,
                        args,
                        event.user_id.as_deref().unwrap_or("N/A"),
                        event.chat_id.as_deref().unwrap_or("N/A")
                    );
                    (Route::Command(name.clone()), &command.handler)
                }
                None => (Route::UnknownCommand, &self.fallback),
            },
            EventKind::Callback { .. } => (Route::Callback, &self.callback),
            EventKind::Text { .. } => {
                debug!("Ignoring plain text message");
                return Route::Ignored;
            }
        };

        let ctx = self.context();
        if let Err(e) = handler.handle(event, &ctx).await {
            self.report_error(event, &e).await;
        }
        route
    }

    fn resolve(&self, name: &str, mention: Option<&str>) -> Option<&Command> {
        if let (Some(mention), Some(me)) = (mention, self.bot_username.as_deref()) {
            if !mention.eq_ignore_ascii_case(me) {
                return None;
            }
        }
        self.registry.resolve(name)
    }

    async fn report_error(&self, event: &InboundEvent, err: &anyhow::Error) {
        if BotError::is_delivery(err) {
            error!("Reply not delivered: {} - {:#}", event, err);
            return;
        }
        error!("Error in update: {} - {:#}", event, err);

        let Some(chat_id) = event.chat_id.as_deref() else {
            return;
        };
        if let Err(e) = self.messenger.send_message(chat_id, APOLOGY_REPLY).await {
            error!("Failed to send apology: {}", e);
        }
    }

    /// Tell the admin the bot is up. Best effort.
    pub async fn notify_startup(&self) {
        let message = format!(
            "{}\n{}",
            STARTUP_NOTICE,
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        );
        match self
            .messenger
            .send_message(self.admin_id.as_str(), &message)
            .await
        {
            Ok(()) => info!("Sent admin notification: {}", STARTUP_NOTICE),
            Err(e) => error!("Failed to send admin notification: {}", e),
        }
    }
}
