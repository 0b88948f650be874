use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, error, warn};

use crate::commands::{CommandHandler, Context};
use crate::error::BotError;
use crate::platform::InboundEvent;

pub const NOT_AUTHORIZED_REPLY: &str = "You are not authorized to use this command.";
pub const GATED_FAILURE_REPLY: &str = "An error occurred while processing your request.";

/// Identity of the single user allowed to run privileged commands.
///
/// Compared as a string so numeric and textual ids from the platform match
/// the same configured value. Formatting differences such as leading zeros
/// are not normalised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminId(String);

impl AdminId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn matches(&self, user_id: &str) -> bool {
        self.0 == user_id
    }
}

/// Wrap `handler` so only the configured admin can invoke it.
pub fn gate(handler: Arc<dyn CommandHandler>) -> Arc<dyn CommandHandler> {
    Arc::new(AdminGate { inner: handler })
}

/// Admin-only wrapper. Denials and inner failures end here: the user gets
/// one reply and nothing propagates to the router.
pub struct AdminGate {
    inner: Arc<dyn CommandHandler>,
}

impl AdminGate {
    fn authorize(&self, event: &InboundEvent, ctx: &Context<'_>) -> Result<(), BotError> {
        let user_id = event.user_id.as_deref().unwrap_or_default();
        debug!(
            "User ID: {}, Admin ID: {}, Command: {}",
            user_id,
            ctx.admin_id.as_str(),
            event.text()
        );

        if !user_id.is_empty() && ctx.admin_id.matches(user_id) {
            Ok(())
        } else {
            Err(BotError::Unauthorized {
                user_id: event.user_id.clone().unwrap_or_else(|| "N/A".to_string()),
                command: event.text().to_string(),
            })
        }
    }
}

#[async_trait]
impl CommandHandler for AdminGate {
    async fn handle(&self, event: &InboundEvent, ctx: &Context<'_>) -> Result<()> {
        if let Err(denied) = self.authorize(event, ctx) {
            warn!("Unauthorized access: {}", denied);
            if let Err(e) = ctx.reply(event, NOT_AUTHORIZED_REPLY).await {
                error!("Failed to send denial reply: {:#}", e);
            }
            return Ok(());
        }

        if let Err(e) = self.inner.handle(event, ctx).await {
            if BotError::is_delivery(&e) {
                error!("Reply not delivered: {:#} ({})", e, event);
                return Ok(());
            }
            error!("Error while executing command: {:#} ({})", e, event);
            if let Err(e) = ctx.reply(event, GATED_FAILURE_REPLY).await {
                error!("Failed to send error reply: {:#}", e);
            }
        }
        Ok(())
    }
}
