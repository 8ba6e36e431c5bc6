use tracing::{error, info};

use crate::platform::{InboundMessage, MessageSource};
use crate::storage::{FeedbackRecord, FeedbackSink};

/// Command that asks for feedback instead of submitting it
pub const START_COMMAND: &str = "/start";
pub const START_PROMPT: &str = "Оставьте свой отзыв🤍";
pub const THANK_YOU: &str = "Thank you for your feedback!";

/// What happened to a single inbound message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// No text payload, nothing done
    Skipped,
    /// `/start` received, prompt sent
    Prompted,
    /// Feedback stored under the given record ID and acknowledged
    Stored(String),
    /// Storage failed; no reply was sent
    Dropped,
}

/// Reads inbound messages one at a time and turns feedback into records.
pub struct IngestionLoop<S, K> {
    source: S,
    sink: K,
}

impl<S, K> IngestionLoop<S, K>
where
    S: MessageSource,
    K: FeedbackSink,
{
    pub fn new(source: S, sink: K) -> Self {
        Self { source, sink }
    }

    /// Process messages until the source closes.
    pub async fn run(&mut self) {
        info!("Waiting for feedback...");
        while let Some(msg) = self.source.next_message().await {
            self.handle(msg).await;
        }
        info!("Message source closed, ingestion stopped");
    }

    /// Handle one inbound message end to end.
    pub async fn handle(&self, msg: InboundMessage) -> Outcome {
        let chat_id = msg.chat_id;
        let text = match msg.text {
            Some(t) if !t.is_empty() => t,
            _ => return Outcome::Skipped,
        };

        if text == START_COMMAND {
            self.source.send_text(chat_id, START_PROMPT).await;
            return Outcome::Prompted;
        }

        let record = FeedbackRecord::new(chat_id, text);
        match self.sink.insert(&record).await {
            Ok(id) => {
                info!(record_id = %id, chat_id, "Inserted feedback");
                self.source.send_text(chat_id, THANK_YOU).await;
                Outcome::Stored(id)
            }
            Err(e) => {
                error!("Could not insert feedback from chat {}: {:#}", chat_id, e);
                Outcome::Dropped
            }
        }
    }
}
