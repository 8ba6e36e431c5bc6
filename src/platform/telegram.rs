use async_trait::async_trait;
use teloxide::prelude::*;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::platform::{InboundMessage, MessageSource};

/// How many updates the dispatcher may queue ahead of the ingestion loop
const UPDATE_BUFFER: usize = 64;

impl From<&Message> for InboundMessage {
    fn from(msg: &Message) -> Self {
        Self {
            chat_id: msg.chat.id.0,
            text: msg.text().map(str::to_owned),
        }
    }
}

/// Telegram transport: a teloxide dispatcher running in the background feeds
/// messages into a channel that the ingestion loop drains one at a time.
pub struct TelegramSource {
    bot: Bot,
    updates: mpsc::Receiver<InboundMessage>,
}

impl TelegramSource {
    /// Start polling Telegram in a background task.
    ///
    /// The dispatcher owns the only sender, so once it stops (Ctrl-C or a
    /// closed connection) `next_message` returns `None`.
    pub fn spawn(bot: Bot) -> Self {
        let (tx, updates) = mpsc::channel(UPDATE_BUFFER);

        let handler = Update::filter_message().endpoint(forward_message);

        let mut dispatcher = Dispatcher::builder(bot.clone(), handler)
            .dependencies(dptree::deps![tx])
            .default_handler(|upd| async move {
                debug!("Ignoring non-message update: {:?}", upd.id);
            })
            .error_handler(LoggingErrorHandler::with_custom_text("telegram"))
            .enable_ctrlc_handler()
            .build();

        info!("Starting Telegram platform...");
        tokio::spawn(async move {
            dispatcher.dispatch().await;
            info!("Telegram dispatcher stopped");
        });

        Self { bot, updates }
    }
}

async fn forward_message(msg: Message, tx: mpsc::Sender<InboundMessage>) -> ResponseResult<()> {
    let inbound = InboundMessage::from(&msg);
    let chat_id = inbound.chat_id;
    debug!("Telegram update from chat {}: {:?}", chat_id, inbound.text);

    if tx.send(inbound).await.is_err() {
        warn!(
            "Ingestion loop has stopped, dropping message from chat {}",
            chat_id
        );
    }

    Ok(())
}

#[async_trait]
impl MessageSource for TelegramSource {
    async fn next_message(&mut self) -> Option<InboundMessage> {
        self.updates.recv().await
    }

    async fn send_text(&self, chat_id: i64, text: &str) {
        if let Err(e) = self.bot.send_message(ChatId(chat_id), text).await {
            warn!("Failed to send reply to chat {}: {}", chat_id, e);
        }
    }
}
