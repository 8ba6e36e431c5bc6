pub mod telegram;

use async_trait::async_trait;

/// A message received from the chat platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Platform chat ID the message came from
    pub chat_id: i64,
    /// The message text; `None` for stickers, photos and other non-text updates
    pub text: Option<String>,
}

/// Chat transport as seen by the ingestion loop: a pull-based stream of
/// inbound messages plus a way to reply.
#[async_trait]
pub trait MessageSource: Send {
    /// Wait for the next inbound message. `None` means the transport closed.
    async fn next_message(&mut self) -> Option<InboundMessage>;

    /// Send `text` to `chat_id`. Delivery failures are the transport's to log.
    async fn send_text(&self, chat_id: i64, text: &str);
}
