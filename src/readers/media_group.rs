use std::time::Duration;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::buttons::ButtonSet;
use crate::config::ReadersConfig;
use crate::conversation::{Asked, Conversation, Waited};
use crate::error::Result;
use crate::readers::{accepts_grouped_image, verdict};
use crate::update::{ImageSet, Update};

/// How long to wait for the next photo of an album before calling it complete.
pub const MEDIA_GROUP_WAIT: Duration = Duration::from_secs(2);

/// Answer to [`MediaGroupReader::read`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MediaGroupReply {
    /// The user left, either at the prompt or while the album was arriving.
    pub exit: bool,
    /// Payload of the navigation button the user pressed instead.
    pub data: Option<String>,
    /// One entry per album message, in arrival order.
    pub images: Vec<ImageSet>,
}

/// Asks the user to send several images as one album.
///
/// Telegram delivers an album as separate messages sharing a media group id.
/// After the first photo the reader keeps polling with an idle window that
/// re-arms on every photo of the same album. Silence ends the album. Any
/// other update also ends it and is dropped.
#[derive(Debug, Clone, Copy)]
pub struct MediaGroupReader {
    wait: Duration,
}

impl Default for MediaGroupReader {
    fn default() -> Self {
        Self::new(MEDIA_GROUP_WAIT)
    }
}

impl MediaGroupReader {
    pub fn new(wait: Duration) -> Self {
        Self { wait }
    }

    pub fn from_config(config: &ReadersConfig) -> Self {
        Self::new(config.media_group_wait())
    }

    pub fn wait(&self) -> Duration {
        self.wait
    }

    pub async fn read<C: Conversation + ?Sized>(
        &self,
        conversation: &C,
        cancel: &CancellationToken,
        text: &str,
        navigation: &ButtonSet,
        on_incorrect: &str,
    ) -> Result<MediaGroupReply> {
        let message = conversation.new_message(text);
        let validator = |update: &Update| verdict(accepts_grouped_image(update), on_incorrect);

        let asked = conversation
            .ask(cancel, message, navigation, &validator, true)
            .await?;

        let mut reply = MediaGroupReply::default();
        let (group, first) = match asked {
            Asked::Exit => {
                reply.exit = true;
                return Ok(reply);
            }
            Asked::Update(Update::Callback { data }) => {
                reply.data = Some(data);
                return Ok(reply);
            }
            Asked::Update(Update::Photo {
                media_group_id: Some(group),
                image,
            }) => (group, image),
            Asked::Update(
                Update::Photo {
                    media_group_id: None,
                    ..
                }
                | Update::Message { .. }
                | Update::Other,
            ) => {
                return Ok(reply);
            }
        };
        reply.images.push(first);

        loop {
            match conversation.next_update(cancel, self.wait).await {
                Waited::Exit => {
                    reply.exit = true;
                    break;
                }
                Waited::TimedOut => break,
                Waited::Update(Update::Photo {
                    media_group_id: Some(id),
                    image,
                }) if id == group => reply.images.push(image),
                Waited::Update(other) => {
                    debug!(
                        chat = %conversation.chat(),
                        group = %group,
                        kind = other.kind(),
                        "Update outside the album ends it and is dropped"
                    );
                    break;
                }
            }
        }

        debug!(
            chat = %conversation.chat(),
            group = %group,
            photos = reply.images.len(),
            exit = reply.exit,
            "Album collected"
        );
        Ok(reply)
    }
}
