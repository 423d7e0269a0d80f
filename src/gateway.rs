use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::ConversationConfig;
use crate::conversation::{ChatConversation, Outbox};
use crate::error::Result;
use crate::update::{ChatKey, Update};

/// A conversation flow started by the first update of an idle chat.
///
/// Updates left in the conversation when `run` returns start the next flow.
#[async_trait]
pub trait FlowHandler: Send + Sync {
    async fn run(
        &self,
        conversation: &ChatConversation,
        first: Update,
        cancel: CancellationToken,
    ) -> Result<()>;
}

/// Routes inbound updates to the running flow of their chat, starting a new
/// flow when the chat has none.
pub struct Gateway {
    handler: Arc<dyn FlowHandler>,
    outbox: Arc<dyn Outbox>,
    config: ConversationConfig,
    /// Chat → queue of its running flow
    flows: Arc<Mutex<HashMap<ChatKey, mpsc::Sender<Update>>>>,
    shutdown: CancellationToken,
}

impl Gateway {
    pub fn new(
        handler: Arc<dyn FlowHandler>,
        outbox: Arc<dyn Outbox>,
        config: ConversationConfig,
    ) -> Self {
        Self {
            handler,
            outbox,
            config,
            flows: Arc::new(Mutex::new(HashMap::new())),
            shutdown: CancellationToken::new(),
        }
    }

    pub async fn dispatch(&self, chat: ChatKey, update: Update) {
        let mut flows = self.flows.lock().await;

        let update = match flows.get(&chat) {
            Some(tx) => match tx.try_send(update) {
                Ok(()) => return,
                Err(mpsc::error::TrySendError::Full(update)) => {
                    warn!(chat = %chat, kind = update.kind(), "Flow queue full, dropping update");
                    return;
                }
                // Flow tasks remove their entry before dropping the receiver,
                // so this only happens if a flow task panicked.
                Err(mpsc::error::TrySendError::Closed(update)) => update,
            },
            None => update,
        };

        let (tx, rx) = mpsc::channel(self.config.update_buffer.max(1));
        flows.insert(chat, tx);
        drop(flows);

        let conversation =
            ChatConversation::new(chat, rx, self.outbox.clone(), self.config.clone());
        let handler = self.handler.clone();
        let flows = self.flows.clone();
        let cancel = self.shutdown.child_token();

        debug!(chat = %chat, kind = update.kind(), "Starting flow");
        tokio::spawn(async move {
            let mut first = update;
            loop {
                if let Err(e) = handler.run(&conversation, first, cancel.clone()).await {
                    warn!(chat = %chat, "Flow ended with error: {e}");
                }

                // Holding the map lock keeps `dispatch` from queueing more
                // updates while the leftovers are inspected.
                let mut flows = flows.lock().await;
                match conversation.try_next().await {
                    Some(next) if !cancel.is_cancelled() => {
                        debug!(
                            chat = %chat,
                            kind = next.kind(),
                            "Starting flow from leftover update"
                        );
                        first = next;
                    }
                    leftover => {
                        if let Some(update) = leftover {
                            debug!(
                                chat = %chat,
                                kind = update.kind(),
                                "Dropping update after shutdown"
                            );
                        }
                        flows.remove(&chat);
                        break;
                    }
                }
            }
        });
    }

    pub async fn active_flows(&self) -> usize {
        self.flows.lock().await.len()
    }

    /// Cancel every running flow.
    pub fn shutdown(&self) {
        info!("Cancelling running flows");
        self.shutdown.cancel();
    }
}
