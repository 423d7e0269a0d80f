//! Readers that ask the user for images.

mod image;
mod media_group;

pub use image::{ImageReader, ImageReply};
pub use media_group::{MediaGroupReader, MediaGroupReply, MEDIA_GROUP_WAIT};

use crate::conversation::Validation;
use crate::update::Update;

/// Accepts any message that carries a photo.
pub fn accepts_image(update: &Update) -> bool {
    update.image().is_some()
}

/// Accepts a photo only when it belongs to an album.
pub fn accepts_grouped_image(update: &Update) -> bool {
    update.image().is_some() && update.media_group_id().is_some()
}

fn verdict(accepted: bool, on_incorrect: &str) -> Validation {
    if accepted {
        Validation::Accept
    } else {
        Validation::Reject(on_incorrect.to_string())
    }
}
