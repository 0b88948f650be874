use thiserror::Error;

/// Errors surfaced by the bot core.
#[derive(Error, Debug)]
pub enum BotError {
    /// A required secret is missing from the environment.
    #[error("{0} is missing from the environment variables")]
    MissingSecret(&'static str),

    #[error("user {user_id} is not authorized to run {command}")]
    Unauthorized { user_id: String, command: String },

    /// The platform rejected or never received an outbound message.
    #[error("failed to deliver message to chat {chat_id}: {reason}")]
    Delivery { chat_id: String, reason: String },
}

impl BotError {
    /// True when `err` (or anything it wraps) is a failed outbound send.
    pub fn is_delivery(err: &anyhow::Error) -> bool {
        err.chain().any(|cause| {
            matches!(
                cause.downcast_ref::<BotError>(),
                Some(BotError::Delivery { .. })
            )
        })
    }
}
