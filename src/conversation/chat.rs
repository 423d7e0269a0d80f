use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::buttons::{ButtonSet, EXIT_DATA};
use crate::config::ConversationConfig;
use crate::conversation::{
    Asked, Conversation, OutgoingMessage, Outbox, Validation, Validator, Waited,
};
use crate::error::{ReaderError, Result};
use crate::update::{ChatKey, Update};

/// Conversation with one chat, fed by the gateway through an update queue.
pub struct ChatConversation {
    chat: ChatKey,
    updates: Mutex<mpsc::Receiver<Update>>,
    outbox: Arc<dyn Outbox>,
    config: ConversationConfig,
}

impl ChatConversation {
    pub fn new(
        chat: ChatKey,
        updates: mpsc::Receiver<Update>,
        outbox: Arc<dyn Outbox>,
        config: ConversationConfig,
    ) -> Self {
        Self {
            chat,
            updates: Mutex::new(updates),
            outbox,
            config,
        }
    }

    /// Send a message without waiting for anything.
    pub async fn say(&self, text: &str) -> Result<()> {
        self.outbox.send(self.chat, self.new_message(text)).await
    }

    /// An update already queued for this chat, without waiting.
    pub async fn try_next(&self) -> Option<Update> {
        self.updates.lock().await.try_recv().ok()
    }

    /// Exit button or one of the configured exit commands.
    fn is_exit(&self, update: &Update) -> bool {
        match update {
            Update::Callback { data } => data == EXIT_DATA,
            Update::Message { text: Some(text) } => {
                let text = text.trim();
                self.config.exit_commands.iter().any(|c| c == text)
            }
            _ => false,
        }
    }

    async fn recv(
        &self,
        updates: &mut mpsc::Receiver<Update>,
        deadline: Option<Instant>,
    ) -> Result<Update> {
        let secs = self.config.reply_timeout_secs.unwrap_or_default();
        let received = match deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, updates.recv())
                .await
                .map_err(|_| ReaderError::Timeout(secs))?,
            None => updates.recv().await,
        };
        received.ok_or_else(|| {
            ReaderError::Conversation(format!("update stream for chat {} closed", self.chat))
        })
    }
}

#[async_trait]
impl Conversation for ChatConversation {
    fn chat(&self) -> ChatKey {
        self.chat
    }

    async fn ask(
        &self,
        cancel: &CancellationToken,
        message: OutgoingMessage,
        navigation: &ButtonSet,
        validator: Validator<'_>,
        allow_exit: bool,
    ) -> Result<Asked> {
        let keyboard = if allow_exit {
            navigation.with_exit(&self.config.exit_button_text)
        } else {
            navigation.clone()
        };
        self.outbox
            .send(self.chat, message.with_buttons(keyboard.clone()))
            .await?;

        let deadline = self
            .config
            .reply_timeout_secs
            .map(|secs| Instant::now() + Duration::from_secs(secs));
        let mut updates = self.updates.lock().await;

        loop {
            let update = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(ReaderError::Cancelled),
                update = self.recv(&mut updates, deadline) => update?,
            };

            if allow_exit && self.is_exit(&update) {
                debug!(chat = %self.chat, "User left the prompt");
                return Ok(Asked::Exit);
            }

            if let Update::Callback { data } = &update {
                if navigation.contains(data) {
                    return Ok(Asked::Update(update));
                }
                debug!(chat = %self.chat, data = %data, "Ignoring stale callback");
                continue;
            }

            match validator(&update) {
                Validation::Accept => return Ok(Asked::Update(update)),
                Validation::Reject(text) => {
                    debug!(chat = %self.chat, kind = update.kind(), "Reply rejected");
                    self.outbox
                        .send(self.chat, OutgoingMessage::new(text).with_buttons(keyboard.clone()))
                        .await?;
                }
            }
        }
    }

    async fn next_update(&self, cancel: &CancellationToken, timeout: Duration) -> Waited {
        let mut updates = self.updates.lock().await;
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Waited::Exit,
            received = tokio::time::timeout(timeout, updates.recv()) => match received {
                Err(_) => Waited::TimedOut,
                Ok(None) => Waited::Exit,
                Ok(Some(update)) if self.is_exit(&update) => Waited::Exit,
                Ok(Some(update)) => Waited::Update(update),
            },
        }
    }
}
