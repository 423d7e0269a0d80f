//! Test helpers: an in-memory outbox and update constructors.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::config::ConversationConfig;
use crate::conversation::{ChatConversation, OutgoingMessage, Outbox};
use crate::error::{ReaderError, Result};
use crate::update::{ChatKey, ImageSet, MediaGroupId, PhotoSize, Update};

/// Records every message instead of delivering it.
#[derive(Default)]
pub struct MemoryOutbox {
    sent: Mutex<Vec<(ChatKey, OutgoingMessage)>>,
    fail: bool,
}

impl MemoryOutbox {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        })
    }

    pub fn sent(&self) -> Vec<OutgoingMessage> {
        self.sent.lock().unwrap().iter().map(|(_, m)| m.clone()).collect()
    }

    pub fn sent_to(&self, chat: ChatKey) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, _)| *c == chat)
            .map(|(_, m)| m.text.clone())
            .collect()
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent().into_iter().map(|m| m.text).collect()
    }
}

#[async_trait]
impl Outbox for MemoryOutbox {
    async fn send(&self, chat: ChatKey, message: OutgoingMessage) -> Result<()> {
        if self.fail {
            return Err(ReaderError::Channel("outbox unavailable".to_string()));
        }
        self.sent.lock().unwrap().push((chat, message));
        Ok(())
    }
}

/// A conversation with chat 1, the sender feeding it and its outbox.
pub fn conversation(
    config: ConversationConfig,
) -> (ChatConversation, mpsc::Sender<Update>, Arc<MemoryOutbox>) {
    let outbox = MemoryOutbox::new();
    let (tx, rx) = mpsc::channel(16);
    let conv = ChatConversation::new(ChatKey(1), rx, outbox.clone(), config);
    (conv, tx, outbox)
}

/// Photo message with two resolutions whose file ids start with `id`.
pub fn photo(group: Option<&str>, id: &str) -> Update {
    let sizes = [(90, 60), (1280, 853)]
        .into_iter()
        .map(|(width, height)| PhotoSize {
            file_id: format!("{id}-{width}"),
            file_unique_id: format!("{id}-{width}-u"),
            width,
            height,
            file_size: None,
        })
        .collect();
    Update::Photo {
        media_group_id: group.and_then(MediaGroupId::new),
        image: ImageSet::new(sizes).unwrap(),
    }
}
