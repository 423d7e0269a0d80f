use serde::{Deserialize, Serialize};

/// Chat a conversation is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatKey(pub i64);

impl std::fmt::Display for ChatKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier shared by every message of one album.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MediaGroupId(pub String);

impl MediaGroupId {
    /// Empty identifiers mean "not grouped".
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        if id.is_empty() {
            None
        } else {
            Some(Self(id))
        }
    }
}

impl std::fmt::Display for MediaGroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One resolution of a photo as Telegram stores it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoSize {
    pub file_id: String,
    pub file_unique_id: String,
    pub width: u32,
    pub height: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u32>,
}

/// All resolutions of the photo attached to one message. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ImageSet(Vec<PhotoSize>);

impl ImageSet {
    pub fn new(sizes: Vec<PhotoSize>) -> Option<Self> {
        if sizes.is_empty() {
            None
        } else {
            Some(Self(sizes))
        }
    }

    pub fn sizes(&self) -> &[PhotoSize] {
        &self.0
    }

    /// The variant with the most pixels.
    pub fn largest(&self) -> &PhotoSize {
        self.0
            .iter()
            .max_by_key(|p| u64::from(p.width) * u64::from(p.height))
            .unwrap_or(&self.0[0])
    }

    pub fn into_sizes(self) -> Vec<PhotoSize> {
        self.0
    }
}

/// An inbound update, already reduced to what the readers care about.
#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    /// A navigation button was pressed.
    Callback { data: String },
    /// A message carrying a photo, possibly part of an album.
    Photo {
        media_group_id: Option<MediaGroupId>,
        image: ImageSet,
    },
    /// A message without a photo.
    Message { text: Option<String> },
    /// Anything else Telegram delivers (edits, polls, member changes...).
    Other,
}

impl Update {
    pub fn callback(data: impl Into<String>) -> Self {
        Self::Callback { data: data.into() }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::Message {
            text: Some(text.into()),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Callback { .. } => "callback",
            Self::Photo { .. } => "photo",
            Self::Message { .. } => "message",
            Self::Other => "other",
        }
    }

    pub fn image(&self) -> Option<&ImageSet> {
        match self {
            Self::Photo { image, .. } => Some(image),
            _ => None,
        }
    }

    pub fn media_group_id(&self) -> Option<&MediaGroupId> {
        match self {
            Self::Photo { media_group_id, .. } => media_group_id.as_ref(),
            _ => None,
        }
    }
}
