pub mod telegram;

use std::fmt;

use async_trait::async_trait;

use crate::error::BotError;

/// Outbound side of the messaging platform.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send_message(&self, chat_id: &str, text: &str) -> Result<(), BotError>;
}

/// What an inbound update carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// `/name@mention args`, with `raw` holding the original text
    Command {
        name: String,
        mention: Option<String>,
        args: String,
        raw: String,
    },
    /// An inline keyboard button press
    Callback { data: String },
    /// Anything that is not a command
    Text { text: String },
}

/// A single update received from the platform, already stripped of
/// platform-specific types.
#[derive(Debug, Clone)]
pub struct InboundEvent {
    /// Platform-specific user ID as string
    pub user_id: Option<String>,
    /// Display name of the user
    pub user_name: Option<String>,
    /// Platform-specific chat ID as string
    pub chat_id: Option<String>,
    pub kind: EventKind,
}

impl InboundEvent {
    /// Build an event from message text, classifying it as a command or
    /// plain text.
    pub fn from_text(
        user_id: Option<String>,
        user_name: Option<String>,
        chat_id: Option<String>,
        text: &str,
    ) -> Self {
        let kind = match parse_command(text) {
            Some(ParsedCommand {
                name,
                mention,
                args,
            }) => EventKind::Command {
                name,
                mention,
                args,
                raw: text.to_string(),
            },
            None => EventKind::Text {
                text: text.to_string(),
            },
        };
        Self {
            user_id,
            user_name,
            chat_id,
            kind,
        }
    }

    pub fn callback(
        user_id: Option<String>,
        user_name: Option<String>,
        chat_id: Option<String>,
        data: String,
    ) -> Self {
        Self {
            user_id,
            user_name,
            chat_id,
            kind: EventKind::Callback { data },
        }
    }

    /// The text the user sent, or the callback payload.
    pub fn text(&self) -> &str {
        match &self.kind {
            EventKind::Command { raw, .. } => raw,
            EventKind::Callback { data } => data,
            EventKind::Text { text } => text,
        }
    }
}

impl fmt::Display for InboundEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            EventKind::Command { .. } => "Command",
            EventKind::Callback { .. } => "Callback",
            EventKind::Text { .. } => "Text",
        };
        write!(
            f,
            "Update Type: {} | Chat ID: {} | User ID: {} | Text: {}",
            kind,
            self.chat_id.as_deref().unwrap_or("N/A"),
            self.user_id.as_deref().unwrap_or("N/A"),
            self.text()
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    /// Lowercased command name
    pub name: String,
    /// Bot username after `@`, if the command was addressed to one
    pub mention: Option<String>,
    pub args: String,
}

/// Split `/name@bot args`. A command must start at the first character,
/// as Telegram only marks commands at offset 0.
pub fn parse_command(text: &str) -> Option<ParsedCommand> {
    let rest = text.strip_prefix('/')?;
    let (head, args) = match rest.split_once(char::is_whitespace) {
        Some((head, args)) => (head, args.trim()),
        None => (rest, ""),
    };
    let (name, mention) = match head.split_once('@') {
        Some((name, mention)) => (name, Some(mention.to_string())),
        None => (head, None),
    };
    Some(ParsedCommand {
        name: name.to_lowercase(),
        mention,
        args: args.to_string(),
    })
}
