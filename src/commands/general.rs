//! Public commands: greeting and help.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use super::{CommandHandler, CommandRegistry, Context, RegistryError};
use crate::platform::InboundEvent;

pub const GREETING: &str = "Konichiwa";

/// Entries the help listing leaves out.
const RESERVED: [&str; 2] = ["start", "help"];

pub fn register(registry: &mut CommandRegistry) -> Result<(), RegistryError> {
    registry.register("start", Arc::new(StartHandler), Some("Greet the user."))?;
    registry.register("help", Arc::new(HelpHandler), Some("Show this help."))?;
    Ok(())
}

pub struct StartHandler;

#[async_trait]
impl CommandHandler for StartHandler {
    async fn handle(&self, event: &InboundEvent, ctx: &Context<'_>) -> Result<()> {
        let name = event.user_name.as_deref().unwrap_or("friend");
        ctx.reply(event, &format!("{}, nice to meet you {}!", GREETING, name))
            .await
    }
}

pub struct HelpHandler;

#[async_trait]
impl CommandHandler for HelpHandler {
    async fn handle(&self, event: &InboundEvent, ctx: &Context<'_>) -> Result<()> {
        ctx.reply(event, &render_help(ctx.registry)).await
    }
}

pub fn render_help(registry: &CommandRegistry) -> String {
    let lines: Vec<String> = registry
        .list()
        .filter(|(name, _)| !RESERVED.contains(name))
        .map(|(name, description)| {
            format!("/{}: {}", name, description.unwrap_or("No description."))
        })
        .collect();

    format!(
        "{}, here is a list of commands:\n\n{}\n\n\
         Remember you can always use /help to see this list again.",
        GREETING,
        lines.join("\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AdminId;
    use crate::testing::{command_event, CountingHandler, RecordingMessenger};

    #[tokio::test]
    async fn test_start_greets_by_name() {
        let messenger = RecordingMessenger::default();
        let registry = CommandRegistry::new();
        let admin = AdminId::new("42");
        let ctx = Context {
            messenger: &messenger,
            registry: &registry,
            admin_id: &admin,
        };

        StartHandler
            .handle(&command_event("7", "100", "/start"), &ctx)
            .await
            .unwrap();

        assert_eq!(
            messenger.sent().await,
            vec![(
                "100".to_string(),
                "Konichiwa, nice to meet you Test User!".to_string()
            )]
        );
    }

    #[test]
    fn test_help_skips_reserved_and_keeps_order() {
        let mut registry = CommandRegistry::new();
        register(&mut registry).unwrap();
        registry
            .register(
                "uptime",
                Arc::new(CountingHandler::default()),
                Some("Send the system's uptime."),
            )
            .unwrap();
        registry
            .register("my_id", Arc::new(CountingHandler::default()), None)
            .unwrap();

        let help = render_help(&registry);
        assert!(help.contains("/uptime: Send the system's uptime.\n/my_id: No description."));
        assert!(!help.contains("/start:"));
        assert!(!help.contains("/help:"));
    }
}
