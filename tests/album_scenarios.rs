use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pawprint::buttons::ButtonSet;
use pawprint::config::ConversationConfig;
use pawprint::conversation::{ChatConversation, OutgoingMessage, Outbox};
use pawprint::error::Result;
use pawprint::readers::{ImageReader, MediaGroupReader};
use pawprint::update::{ChatKey, ImageSet, MediaGroupId, PhotoSize, Update};
use tokio::sync::mpsc;
use tokio_test::{assert_err, assert_ok};
use tokio_util::sync::CancellationToken;

#[derive(Default)]
struct Recorder {
    texts: Mutex<Vec<String>>,
}

#[async_trait]
impl Outbox for Recorder {
    async fn send(&self, _chat: ChatKey, message: OutgoingMessage) -> Result<()> {
        self.texts.lock().unwrap().push(message.text);
        Ok(())
    }
}

fn setup() -> (ChatConversation, mpsc::Sender<Update>, Arc<Recorder>) {
    let recorder = Arc::new(Recorder::default());
    let (tx, rx) = mpsc::channel(16);
    let conv = ChatConversation::new(
        ChatKey(99),
        rx,
        recorder.clone(),
        ConversationConfig::default(),
    );
    (conv, tx, recorder)
}

fn album_photo(group: &str, id: &str) -> Update {
    let image = ImageSet::new(vec![PhotoSize {
        file_id: id.to_string(),
        file_unique_id: format!("{id}-u"),
        width: 800,
        height: 600,
        file_size: Some(40_000),
    }])
    .unwrap();
    Update::Photo {
        media_group_id: MediaGroupId::new(group),
        image,
    }
}

#[tokio::test(start_paused = true)]
async fn three_photo_album_then_silence() {
    let (conv, tx, recorder) = setup();
    tokio::spawn(async move {
        for id in ["one", "two", "three"] {
            tx.send(album_photo("trip", id)).await.unwrap();
            tokio::time::sleep(Duration::from_millis(300)).await;
        }
        // Keep the chat open through the silence.
        tokio::time::sleep(Duration::from_secs(10)).await;
    });

    let result = MediaGroupReader::default()
        .read(&conv, &CancellationToken::new(), "send 3 photos", &ButtonSet::new(), "album please")
        .await;
    let reply = assert_ok!(result);

    assert!(!reply.exit);
    let ids: Vec<_> = reply
        .images
        .iter()
        .map(|image| image.sizes()[0].file_id.as_str())
        .collect();
    assert_eq!(ids, vec!["one", "two", "three"]);
    assert_eq!(*recorder.texts.lock().unwrap(), vec!["send 3 photos"]);
}

#[tokio::test(start_paused = true)]
async fn one_photo_then_unrelated_text() {
    let (conv, tx, _recorder) = setup();
    tx.send(album_photo("trip", "one")).await.unwrap();
    tx.send(Update::text("done")).await.unwrap();

    let reply = assert_ok!(
        MediaGroupReader::default()
            .read(
                &conv,
                &CancellationToken::new(),
                "send photos",
                &ButtonSet::new(),
                "album please",
            )
            .await
    );

    assert_eq!(reply.images.len(), 1);
    assert!(!reply.exit);
}

#[tokio::test]
async fn cancel_before_any_photo() {
    let (conv, tx, _recorder) = setup();
    tx.send(Update::text("/cancel")).await.unwrap();

    let reply = assert_ok!(
        MediaGroupReader::default()
            .read(
                &conv,
                &CancellationToken::new(),
                "send photos",
                &ButtonSet::new(),
                "album please",
            )
            .await
    );

    assert!(reply.exit);
    assert!(reply.images.is_empty());
    assert!(reply.data.is_none());
}

#[tokio::test]
async fn single_photo_is_fine_for_image_reader_but_not_for_album_reader() {
    let (conv, tx, recorder) = setup();
    let single = Update::Photo {
        media_group_id: None,
        image: album_photo("x", "solo").image().unwrap().clone(),
    };

    tx.send(single.clone()).await.unwrap();
    let reply = assert_ok!(
        ImageReader
            .read(&conv, &CancellationToken::new(), "one photo", &ButtonSet::new(), "photo please")
            .await
    );
    assert!(reply.image.is_some());

    tx.send(single).await.unwrap();
    tx.send(album_photo("trip", "a")).await.unwrap();
    drop(tx);
    let reply = assert_ok!(
        MediaGroupReader::new(Duration::from_millis(50))
            .read(&conv, &CancellationToken::new(), "album", &ButtonSet::new(), "album please")
            .await
    );
    // Stream closed after the album photo: reported as exit, photo kept.
    assert!(reply.exit);
    assert_eq!(reply.images.len(), 1);
    assert_eq!(
        *recorder.texts.lock().unwrap(),
        vec!["one photo", "album", "album please"]
    );
}

#[tokio::test]
async fn closed_conversation_is_an_error() {
    let (conv, tx, _recorder) = setup();
    drop(tx);

    assert_err!(
        ImageReader
            .read(&conv, &CancellationToken::new(), "one photo", &ButtonSet::new(), "photo please")
            .await
    );
}
