//! Transient UI messages
//!
//! Every message clears itself after a fixed delay, like the toasts of the web
//! dashboard. A newer message is never cleared by an older message's timer.

use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Classification of a message, used for styling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Success,
    Error,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MessageKind::Success => "success",
            MessageKind::Error => "error",
        })
    }
}

/// A message shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UiMessage {
    pub text: String,
    pub kind: MessageKind,
}

impl UiMessage {
    pub fn new(text: impl Into<String>, kind: MessageKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::new(text, MessageKind::Success)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(text, MessageKind::Error)
    }
}

#[derive(Debug)]
struct Posted {
    generation: u64,
    message: UiMessage,
}

/// Single-slot message banner with auto-dismiss
#[derive(Debug, Clone)]
pub struct MessageBanner {
    slot: Arc<RwLock<Option<Posted>>>,
    generation: Arc<AtomicU64>,
    timeout: Duration,
}

impl MessageBanner {
    pub fn new(timeout: Duration) -> Self {
        Self {
            slot: Arc::new(RwLock::new(None)),
            generation: Arc::new(AtomicU64::new(0)),
            timeout,
        }
    }

    /// Replace the current message and schedule its removal
    pub async fn show(&self, message: UiMessage) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        match message.kind {
            MessageKind::Error => tracing::info!(text = %message.text, "Showing error message"),
            _ => tracing::debug!(kind = %message.kind, text = %message.text, "Showing message"),
        }

        *self.slot.write().await = Some(Posted {
            generation,
            message,
        });

        let slot = Arc::clone(&self.slot);
        let timeout = self.timeout;
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            let mut current = slot.write().await;
            if current.as_ref().map(|p| p.generation) == Some(generation) {
                *current = None;
            }
        });
    }

    /// The message currently displayed, if any
    pub async fn current(&self) -> Option<UiMessage> {
        self.slot.read().await.as_ref().map(|p| p.message.clone())
    }
}
