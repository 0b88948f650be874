//! Fakes shared by the unit tests.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use tracing::field::{Field, Visit};
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{self, Layer, SubscriberExt};

use crate::commands::{CommandHandler, Context};
use crate::error::BotError;
use crate::platform::{InboundEvent, Messenger};

/// Records every delivered message; the first `fail_first` sends fail.
#[derive(Default)]
pub struct RecordingMessenger {
    sent: tokio::sync::Mutex<Vec<(String, String)>>,
    attempts: AtomicUsize,
    fail_first: usize,
}

impl RecordingMessenger {
    pub fn failing() -> Self {
        Self::failing_first(usize::MAX)
    }

    pub fn failing_first(n: usize) -> Self {
        Self {
            fail_first: n,
            ..Default::default()
        }
    }

    pub async fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().await.clone()
    }

    /// Every send, delivered or not.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send_message(&self, chat_id: &str, text: &str) -> Result<(), BotError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if attempt < self.fail_first {
            return Err(BotError::Delivery {
                chat_id: chat_id.to_string(),
                reason: "network unreachable".to_string(),
            });
        }
        self.sent
            .lock()
            .await
            .push((chat_id.to_string(), text.to_string()));
        Ok(())
    }
}

#[derive(Default)]
pub struct CountingHandler {
    calls: AtomicUsize,
}

impl CountingHandler {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CommandHandler for CountingHandler {
    async fn handle(&self, _event: &InboundEvent, _ctx: &Context<'_>) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub struct FailingHandler;

#[async_trait]
impl CommandHandler for FailingHandler {
    async fn handle(&self, _event: &InboundEvent, _ctx: &Context<'_>) -> Result<()> {
        anyhow::bail!("boom")
    }
}

pub fn command_event(user_id: &str, chat_id: &str, text: &str) -> InboundEvent {
    InboundEvent::from_text(
        Some(user_id.to_string()),
        Some("Test User".to_string()),
        Some(chat_id.to_string()),
        text,
    )
}

/// Log lines captured on the current thread while the handle is alive.
pub struct CapturedLogs {
    lines: Arc<Mutex<Vec<(Level, String)>>>,
    _guard: DefaultGuard,
}

impl CapturedLogs {
    pub fn at(&self, level: Level) -> Vec<String> {
        self.lines
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    pub fn containing(&self, needle: &str) -> Vec<String> {
        self.lines
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, m)| m.contains(needle))
            .map(|(_, m)| m.clone())
            .collect()
    }
}

pub fn capture_logs() -> CapturedLogs {
    let lines = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::registry().with(CaptureLayer(lines.clone()));
    CapturedLogs {
        lines,
        _guard: tracing::subscriber::set_default(subscriber),
    }
}

struct CaptureLayer(Arc<Mutex<Vec<(Level, String)>>>);

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: layer::Context<'_, S>) {
        let mut visitor = MessageVisitor(String::new());
        event.record(&mut visitor);
        self.0
            .lock()
            .unwrap()
            .push((*event.metadata().level(), visitor.0));
    }
}

struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{:?}", value);
        }
    }
}
