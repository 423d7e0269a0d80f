use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::buttons::{Button, ButtonSet};
use crate::config::Config;
use crate::conversation::ChatConversation;
use crate::error::Result;
use crate::gateway::FlowHandler;
use crate::readers::{ImageReader, ImageReply, MediaGroupReader, MediaGroupReply};
use crate::update::{ImageSet, Update};

const SKIP_DATA: &str = "skip";

const HELP: &str = "Send /image to share one photo or /album to share several at once.";

/// Bot entry flow: `/image` reads one photo, `/album` reads an album.
pub struct IntakeFlow {
    image: ImageReader,
    album: MediaGroupReader,
}

impl IntakeFlow {
    pub fn new(config: &Config) -> Self {
        Self {
            image: ImageReader,
            album: MediaGroupReader::from_config(&config.readers),
        }
    }

    fn navigation() -> ButtonSet {
        ButtonSet::new().row(vec![Button::new("Skip", SKIP_DATA)])
    }
}

#[async_trait]
impl FlowHandler for IntakeFlow {
    async fn run(
        &self,
        conversation: &ChatConversation,
        first: Update,
        cancel: CancellationToken,
    ) -> Result<()> {
        let command = match &first {
            Update::Message { text: Some(text) } => text.trim(),
            _ => "",
        };

        match command {
            "/image" => {
                let reply = self
                    .image
                    .read(
                        conversation,
                        &cancel,
                        "Send me a photo.",
                        &Self::navigation(),
                        "That is not a photo. Please send a photo.",
                    )
                    .await?;
                debug!(reply = %serde_json::to_string(&reply)?, "Image reply");
                conversation.say(&describe_image(&reply)).await
            }
            "/album" => {
                let reply = self
                    .album
                    .read(
                        conversation,
                        &cancel,
                        "Send me several photos as one album.",
                        &Self::navigation(),
                        "Please select several photos and send them together.",
                    )
                    .await?;
                info!(photos = reply.images.len(), exit = reply.exit, "Album received");
                debug!(reply = %serde_json::to_string(&reply)?, "Album reply");
                conversation.say(&describe_album(&reply)).await
            }
            _ => conversation.say(HELP).await,
        }
    }
}

fn describe_size(image: &ImageSet) -> String {
    let largest = image.largest();
    format!("{}x{}", largest.width, largest.height)
}

pub fn describe_image(reply: &ImageReply) -> String {
    if reply.exit {
        return "Cancelled.".to_string();
    }
    match (&reply.image, reply.data.as_deref()) {
        (Some(image), _) => format!("Got your photo ({}).", describe_size(image)),
        (None, Some(SKIP_DATA)) => "Skipped.".to_string(),
        (None, _) => "No photo received.".to_string(),
    }
}

pub fn describe_album(reply: &MediaGroupReply) -> String {
    if reply.images.is_empty() {
        return match (reply.exit, reply.data.as_deref()) {
            (true, _) => "Cancelled.".to_string(),
            (false, Some(SKIP_DATA)) => "Skipped.".to_string(),
            (false, _) => "No photos received.".to_string(),
        };
    }

    let sizes = reply
        .images
        .iter()
        .map(describe_size)
        .collect::<Vec<_>>()
        .join(", ");
    let mut text = format!("Got {} photo(s): {sizes}.", reply.images.len());
    if reply.exit {
        text.push_str(" Stopped early.");
    }
    text
}
