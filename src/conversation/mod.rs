//! Conversation primitives the readers are built on.
//!
//! A conversation is bound to one chat. It can send a prompt and wait for an
//! answer that passes a validator, or wait a bounded time for whatever the
//! user sends next.

pub mod chat;

use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::buttons::ButtonSet;
use crate::error::Result;
use crate::update::{ChatKey, Update};

pub use chat::ChatConversation;

/// An outbound message. Building one has no side effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub text: String,
    pub buttons: ButtonSet,
}

impl OutgoingMessage {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            buttons: ButtonSet::new(),
        }
    }

    pub fn with_buttons(mut self, buttons: ButtonSet) -> Self {
        self.buttons = buttons;
        self
    }
}

/// Verdict of a validator on an incoming update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Accept,
    /// Reject and re-prompt with this text.
    Reject(String),
}

pub type Validator<'a> = &'a (dyn Fn(&Update) -> Validation + Send + Sync);

/// Outcome of [`Conversation::ask`].
#[derive(Debug, Clone, PartialEq)]
pub enum Asked {
    /// An accepted update, or a navigation callback from the prompt's buttons.
    Update(Update),
    /// The user left the prompt.
    Exit,
}

/// Outcome of [`Conversation::next_update`]. Exactly one of these happens.
#[derive(Debug, Clone, PartialEq)]
pub enum Waited {
    Update(Update),
    Exit,
    TimedOut,
}

#[async_trait]
pub trait Conversation: Send + Sync {
    fn chat(&self) -> ChatKey;

    fn new_message(&self, text: &str) -> OutgoingMessage {
        OutgoingMessage::new(text)
    }

    /// Send `message` with `navigation` attached and wait until the user
    /// answers with an update `validator` accepts, presses a navigation
    /// button, or exits (only when `allow_exit`).
    async fn ask(
        &self,
        cancel: &CancellationToken,
        message: OutgoingMessage,
        navigation: &ButtonSet,
        validator: Validator<'_>,
        allow_exit: bool,
    ) -> Result<Asked>;

    /// Wait up to `timeout` for the next update. Never fails: cancellation
    /// and a closed update stream are reported as [`Waited::Exit`].
    async fn next_update(&self, cancel: &CancellationToken, timeout: Duration) -> Waited;
}

/// Delivery of outbound messages to a chat.
#[async_trait]
pub trait Outbox: Send + Sync {
    async fn send(&self, chat: ChatKey, message: OutgoingMessage) -> Result<()>;
}
