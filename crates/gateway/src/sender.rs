//! Chat delivery port and implementations.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::Result;

/// Sends text to a chat.
///
/// Abstracted so the gateway can run without a chat protocol adapter.
#[async_trait]
pub trait ChatSender: Send + Sync {
    /// Send `text` to the chat identified by `chat_id`.
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<()>;
}

/// A no-op sender that discards all messages.
#[derive(Debug, Clone, Default)]
pub struct NoOpSender;

#[async_trait]
impl ChatSender for NoOpSender {
    async fn send_message(&self, _chat_id: i64, _text: &str) -> Result<()> {
        Ok(())
    }
}

/// A sender that logs every message instead of delivering it.
#[derive(Debug, Clone, Default)]
pub struct LoggingSender;

#[async_trait]
impl ChatSender for LoggingSender {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        tracing::info!("Sending message to chat {}: {}", chat_id, text);
        Ok(())
    }
}

/// Keeps every message in memory.
#[derive(Debug, Default)]
pub struct RecordingSender {
    sent: Mutex<Vec<(i64, String)>>,
}

impl RecordingSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(chat_id, text)` pairs in send order.
    pub fn sent(&self) -> Vec<(i64, String)> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ChatSender for RecordingSender {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push((chat_id, text.to_string()));
        }
        Ok(())
    }
}
