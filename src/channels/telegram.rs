use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use teloxide::net::default_reqwest_settings;
use teloxide::payloads::{GetUpdatesSetters, SendMessageSetters};
use teloxide::requests::Requester;
use teloxide::types::{CallbackQuery, ChatId, Message, UpdateKind};
use teloxide::Bot;
use tracing::{debug, info, warn};

use crate::channels::Channel;
use crate::config::TelegramConfig;
use crate::conversation::{OutgoingMessage, Outbox};
use crate::error::{ReaderError, Result};
use crate::gateway::Gateway;
use crate::update::{ChatKey, ImageSet, MediaGroupId, PhotoSize, Update};

pub struct TelegramChannel {
    config: TelegramConfig,
    bot: Bot,
    running: Arc<AtomicBool>,
}

impl TelegramChannel {
    pub fn new(config: TelegramConfig) -> Result<Self> {
        let token = config
            .bot_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ReaderError::Channel("Telegram bot_token is required".to_string()))?;

        // Default teloxide client has a 17s timeout, too short for long-polling.
        let client = default_reqwest_settings()
            .timeout(std::time::Duration::from_secs(
                u64::from(config.poll_timeout_secs) + 30,
            ))
            .build()
            .map_err(|e| ReaderError::Channel(format!("Failed to build HTTP client: {e}")))?;

        let bot = Bot::with_client(token, client);
        Ok(Self {
            config,
            bot,
            running: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn outbox(&self) -> Arc<TelegramOutbox> {
        Arc::new(TelegramOutbox {
            bot: self.bot.clone(),
        })
    }

    fn is_allowed(&self, user_id: i64) -> bool {
        self.config.allowed_users.is_empty() || self.config.allowed_users.contains(&user_id)
    }
}

#[async_trait]
impl Channel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn start(&self, gateway: Arc<Gateway>) -> Result<()> {
        self.running.store(true, Ordering::SeqCst);
        let mut offset: i32 = 0;

        while self.running.load(Ordering::SeqCst) {
            let updates = match self
                .bot
                .get_updates()
                .offset(offset)
                .timeout(self.config.poll_timeout_secs)
                .await
            {
                Ok(updates) => updates,
                Err(e) => {
                    warn!("Telegram getUpdates error: {e}");
                    tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                    continue;
                }
            };

            for update in updates {
                offset = update.id.0 as i32 + 1;

                let (chat, user_id, converted) = match &update.kind {
                    UpdateKind::Message(message) => {
                        let Some(from) = &message.from else {
                            continue;
                        };
                        (
                            ChatKey(message.chat.id.0),
                            from.id.0 as i64,
                            convert_message(message),
                        )
                    }
                    UpdateKind::CallbackQuery(query) => {
                        if let Err(e) = self.bot.answer_callback_query(query.id.clone()).await {
                            warn!("Failed to answer callback query: {e}");
                        }
                        let Some((chat, converted)) = convert_callback(query) else {
                            continue;
                        };
                        (chat, query.from.id.0 as i64, converted)
                    }
                    _ => continue,
                };

                if !self.is_allowed(user_id) {
                    debug!("Ignoring update from unauthorized user {user_id}");
                    continue;
                }

                gateway.dispatch(chat, converted).await;
            }
        }

        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        self.running.store(false, Ordering::SeqCst);
        info!("Telegram channel stopped");
        Ok(())
    }
}

/// Sends prompts through the Bot API, with buttons as an inline keyboard.
pub struct TelegramOutbox {
    bot: Bot,
}

#[async_trait]
impl Outbox for TelegramOutbox {
    async fn send(&self, chat: ChatKey, message: OutgoingMessage) -> Result<()> {
        let request = self.bot.send_message(ChatId(chat.0), message.text);
        if message.buttons.is_empty() {
            request.await?;
        } else {
            request
                .reply_markup(message.buttons.to_inline_keyboard())
                .await?;
        }
        Ok(())
    }
}

/// Reduce a Telegram message to an [`Update`].
pub fn convert_message(message: &Message) -> Update {
    let image = message
        .photo()
        .and_then(|sizes| ImageSet::new(sizes.iter().map(convert_photo_size).collect()));

    match image {
        Some(image) => Update::Photo {
            media_group_id: message
                .media_group_id()
                .and_then(|id| MediaGroupId::new(id.to_string())),
            image,
        },
        None => Update::Message {
            text: message.text().map(str::to_string),
        },
    }
}

/// Reduce a button press to an [`Update`] keyed by the chat the button was
/// posted in. Presses without data or without their message are skipped.
pub fn convert_callback(query: &CallbackQuery) -> Option<(ChatKey, Update)> {
    let chat = query.message.as_ref().map(|m| m.chat().id.0)?;
    let data = query.data.clone()?;
    Some((ChatKey(chat), Update::Callback { data }))
}

fn convert_photo_size(size: &teloxide::types::PhotoSize) -> PhotoSize {
    PhotoSize {
        file_id: size.file.id.to_string(),
        file_unique_id: size.file.unique_id.to_string(),
        width: size.width,
        height: size.height,
        file_size: Some(size.file.size),
    }
}
