pub mod fallback;
pub mod general;
pub mod system;

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use crate::auth::AdminId;
use crate::platform::{InboundEvent, Messenger};

/// Executable logic bound to a command or to a fallback path.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn handle(&self, event: &InboundEvent, ctx: &Context<'_>) -> Result<()>;
}

/// Read-only state handed to every handler invocation.
pub struct Context<'a> {
    pub messenger: &'a dyn Messenger,
    pub registry: &'a CommandRegistry,
    pub admin_id: &'a AdminId,
}

impl Context<'_> {
    /// Send `text` to the chat the event came from.
    pub async fn reply(&self, event: &InboundEvent, text: &str) -> Result<()> {
        let chat_id = event
            .chat_id
            .as_deref()
            .context("Event has no destination chat")?;
        self.messenger.send_message(chat_id, text).await?;
        Ok(())
    }
}

/// A registered command
#[derive(Clone)]
pub struct Command {
    pub name: String,
    pub description: Option<String>,
    pub handler: Arc<dyn CommandHandler>,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    #[error("command name must not be empty")]
    EmptyName,

    #[error("invalid command name '{0}': use 1-32 of a-z, 0-9 and _")]
    InvalidName(String),

    #[error("command '{0}' is already registered")]
    Duplicate(String),
}

/// Maximum command length accepted by Telegram.
const MAX_NAME_LEN: usize = 32;

/// Commands keyed by name, iterated in registration order.
#[derive(Default)]
pub struct CommandRegistry {
    commands: Vec<Command>,
    index: HashMap<String, usize>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command. A rejected registration leaves the registry
    /// unchanged.
    pub fn register(
        &mut self,
        name: &str,
        handler: Arc<dyn CommandHandler>,
        description: Option<&str>,
    ) -> Result<(), RegistryError> {
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }
        let valid = name.len() <= MAX_NAME_LEN
            && name
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
        if !valid {
            return Err(RegistryError::InvalidName(name.to_string()));
        }
        if self.index.contains_key(name) {
            return Err(RegistryError::Duplicate(name.to_string()));
        }

        info!("Registered command: /{}", name);
        self.index.insert(name.to_string(), self.commands.len());
        self.commands.push(Command {
            name: name.to_string(),
            description: description.map(str::to_string),
            handler,
        });
        Ok(())
    }

    /// Get a command by name
    pub fn resolve(&self, name: &str) -> Option<&Command> {
        self.index.get(name).map(|&i| &self.commands[i])
    }

    /// `(name, description)` pairs in registration order
    pub fn list(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.commands
            .iter()
            .map(|c| (c.name.as_str(), c.description.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::CountingHandler;

    #[test]
    fn test_resolve_returns_registered_handler() {
        let mut registry = CommandRegistry::new();
        let handler: Arc<dyn CommandHandler> = Arc::new(CountingHandler::default());
        registry
            .register("ping", handler.clone(), Some("Ping the bot."))
            .unwrap();

        let command = registry.resolve("ping").unwrap();
        assert!(Arc::ptr_eq(&command.handler, &handler));
        assert_eq!(command.description.as_deref(), Some("Ping the bot."));
        assert!(registry.resolve("pong").is_none());
    }

    #[test]
    fn test_duplicate_rejected_without_mutation() {
        let mut registry = CommandRegistry::new();
        let first: Arc<dyn CommandHandler> = Arc::new(CountingHandler::default());
        registry.register("ping", first.clone(), Some("first")).unwrap();

        let err = registry
            .register("ping", Arc::new(CountingHandler::default()), Some("second"))
            .unwrap_err();
        assert_eq!(err, RegistryError::Duplicate("ping".to_string()));
        assert_eq!(registry.len(), 1);

        let command = registry.resolve("ping").unwrap();
        assert!(Arc::ptr_eq(&command.handler, &first));
        assert_eq!(command.description.as_deref(), Some("first"));
    }

    #[test]
    fn test_empty_and_invalid_names_rejected() {
        let mut registry = CommandRegistry::new();
        assert_eq!(
            registry
                .register("", Arc::new(CountingHandler::default()), None)
                .unwrap_err(),
            RegistryError::EmptyName
        );
        assert!(matches!(
            registry.register("Start", Arc::new(CountingHandler::default()), None),
            Err(RegistryError::InvalidName(_))
        ));
        assert!(matches!(
            registry.register("/start", Arc::new(CountingHandler::default()), None),
            Err(RegistryError::InvalidName(_))
        ));
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_list_keeps_registration_order() {
        let mut registry = CommandRegistry::new();
        for name in ["zeta", "alpha", "mid"] {
            registry
                .register(name, Arc::new(CountingHandler::default()), None)
                .unwrap();
        }
        let names: Vec<&str> = registry.list().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }
}
