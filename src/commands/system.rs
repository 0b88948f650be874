//! Admin-only system commands.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context as _, Result};
use async_trait::async_trait;

use super::{CommandHandler, CommandRegistry, Context, RegistryError};
use crate::auth::gate;
use crate::platform::InboundEvent;

const PROC_UPTIME: &str = "/proc/uptime";

/// `started` is the moment the bot process came up, reported by `/uptime`.
pub fn register(registry: &mut CommandRegistry, started: Instant) -> Result<(), RegistryError> {
    registry.register(
        "uptime",
        gate(Arc::new(UptimeHandler::new(started))),
        Some("Send the system's uptime."),
    )?;
    registry.register(
        "admin_cmd",
        gate(Arc::new(AdminCheckHandler)),
        Some("Access admin-only command."),
    )?;
    registry.register(
        "my_id",
        gate(Arc::new(MyIdHandler)),
        Some("Show the user's ID."),
    )?;
    Ok(())
}

pub struct UptimeHandler {
    started: Instant,
}

impl UptimeHandler {
    pub fn new(started: Instant) -> Self {
        Self { started }
    }
}

#[async_trait]
impl CommandHandler for UptimeHandler {
    async fn handle(&self, event: &InboundEvent, ctx: &Context<'_>) -> Result<()> {
        let content = tokio::fs::read_to_string(PROC_UPTIME)
            .await
            .with_context(|| format!("Failed to read {}", PROC_UPTIME))?;
        let system = parse_proc_uptime(&content)?;
        let bot = self.started.elapsed().as_secs();

        ctx.reply(
            event,
            &format!(
                "System uptime: {}\nBot uptime: {}",
                or_zero(format_duration(system)),
                or_zero(format_duration(bot))
            ),
        )
        .await
    }
}

pub struct AdminCheckHandler;

#[async_trait]
impl CommandHandler for AdminCheckHandler {
    async fn handle(&self, event: &InboundEvent, ctx: &Context<'_>) -> Result<()> {
        ctx.reply(event, "You have admin access.").await
    }
}

pub struct MyIdHandler;

#[async_trait]
impl CommandHandler for MyIdHandler {
    async fn handle(&self, event: &InboundEvent, ctx: &Context<'_>) -> Result<()> {
        let user_id = event.user_id.as_deref().context("Event has no user")?;
        ctx.reply(event, &format!("Your user ID is: {}", user_id))
            .await
    }
}

/// Seconds since boot, from the first field of `/proc/uptime`.
pub fn parse_proc_uptime(content: &str) -> Result<u64> {
    let field = content
        .split_whitespace()
        .next()
        .context("Empty uptime file")?;
    let seconds: f64 = field
        .parse()
        .with_context(|| format!("Invalid uptime value: {}", field))?;
    Ok(seconds as u64)
}

/// Render seconds as "N days, N hours, N minutes, N seconds", dropping
/// zero-valued units. Zero seconds renders as an empty string.
pub fn format_duration(seconds: u64) -> String {
    let days = seconds / 86_400;
    let hours = seconds % 86_400 / 3_600;
    let minutes = seconds % 3_600 / 60;
    let secs = seconds % 60;

    [(days, "day"), (hours, "hour"), (minutes, "minute"), (secs, "second")]
        .iter()
        .filter(|(value, _)| *value != 0)
        .map(|(value, unit)| {
            let plural = if *value == 1 { "" } else { "s" };
            format!("{} {}{}", value, unit, plural)
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn or_zero(formatted: String) -> String {
    if formatted.is_empty() {
        "0 seconds".to_string()
    } else {
        formatted
    }
}
