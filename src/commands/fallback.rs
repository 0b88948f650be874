//! Handlers for paths that are not registered commands.

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use super::{CommandHandler, Context};
use crate::platform::{EventKind, InboundEvent};

pub const UNKNOWN_COMMAND_REPLY: &str = "Oops, we didn't understand that command!\n\n\
     Remember you can always use /help to see everything I can do for you!";

/// Replies to commands that match no registry entry.
pub struct UnknownCommandHandler;

#[async_trait]
impl CommandHandler for UnknownCommandHandler {
    async fn handle(&self, event: &InboundEvent, ctx: &Context<'_>) -> Result<()> {
        ctx.reply(event, UNKNOWN_COMMAND_REPLY).await?;
        info!("Unknown command: {}", event.text());
        Ok(())
    }
}

/// Acknowledges inline keyboard presses by echoing the button payload.
pub struct ButtonCallbackHandler;

#[async_trait]
impl CommandHandler for ButtonCallbackHandler {
    async fn handle(&self, event: &InboundEvent, ctx: &Context<'_>) -> Result<()> {
        let EventKind::Callback { data } = &event.kind else {
            return Ok(());
        };
        ctx.reply(event, &format!("You selected: {}", data)).await
    }
}
