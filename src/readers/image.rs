use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::buttons::ButtonSet;
use crate::conversation::{Asked, Conversation};
use crate::error::Result;
use crate::readers::{accepts_image, verdict};
use crate::update::{ImageSet, Update};

/// Answer to [`ImageReader::read`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImageReply {
    /// The user left the prompt.
    pub exit: bool,
    /// Payload of the navigation button the user pressed instead.
    pub data: Option<String>,
    pub image: Option<ImageSet>,
}

/// Asks the user to send one image.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageReader;

impl ImageReader {
    pub async fn read<C: Conversation + ?Sized>(
        &self,
        conversation: &C,
        cancel: &CancellationToken,
        text: &str,
        navigation: &ButtonSet,
        on_incorrect: &str,
    ) -> Result<ImageReply> {
        let message = conversation.new_message(text);
        let validator = |update: &Update| verdict(accepts_image(update), on_incorrect);

        let asked = conversation
            .ask(cancel, message, navigation, &validator, true)
            .await?;

        let mut reply = ImageReply::default();
        match asked {
            Asked::Exit => reply.exit = true,
            Asked::Update(Update::Callback { data }) => reply.data = Some(data),
            Asked::Update(Update::Photo { image, .. }) => {
                debug!(
                    chat = %conversation.chat(),
                    sizes = image.sizes().len(),
                    "Image received"
                );
                reply.image = Some(image);
            }
            Asked::Update(Update::Message { .. } | Update::Other) => {}
        }
        Ok(reply)
    }
}
