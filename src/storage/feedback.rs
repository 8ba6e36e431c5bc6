use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::FeedbackStore;

/// One piece of feedback submitted from a chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackRecord {
    pub chat_id: i64,
    pub text: String,
}

impl FeedbackRecord {
    pub fn new(chat_id: i64, text: String) -> Self {
        Self { chat_id, text }
    }
}

/// Storage collaborator of the ingestion loop.
#[async_trait]
pub trait FeedbackSink: Send + Sync {
    /// Persist one record and return its generated identifier.
    async fn insert(&self, record: &FeedbackRecord) -> Result<String>;
}

/// A record as read back from the store
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct StoredFeedback {
    pub id: String,
    pub record: FeedbackRecord,
    pub received_at: String,
}

#[async_trait]
impl FeedbackSink for FeedbackStore {
    async fn insert(&self, record: &FeedbackRecord) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let received_at = Utc::now().to_rfc3339();

        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO feedback (id, chat_id, text, received_at) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![&id, record.chat_id, &record.text, &received_at],
        )
        .context("Failed to insert feedback")?;

        Ok(id)
    }
}

impl FeedbackStore {
    /// Total number of stored feedback records
    pub async fn count(&self) -> Result<u64> {
        let conn = self.conn.lock().await;
        let count: i64 = conn
            .query_row("SELECT count(*) FROM feedback", [], |row| row.get(0))
            .context("Failed to count feedback")?;
        Ok(count.max(0) as u64)
    }

    /// All feedback from one chat, oldest first
    #[cfg(test)]
    pub async fn feedback_for_chat(&self, chat_id: i64) -> Result<Vec<StoredFeedback>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id, chat_id, text, received_at
             FROM feedback
             WHERE chat_id = ?1
             ORDER BY rowid ASC",
        )?;

        let rows = stmt
            .query_map(rusqlite::params![chat_id], |row| {
                Ok(StoredFeedback {
                    id: row.get(0)?,
                    record: FeedbackRecord {
                        chat_id: row.get(1)?,
                        text: row.get(2)?,
                    },
                    received_at: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to load feedback")?;

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_and_read_back() {
        let store = FeedbackStore::open_in_memory().unwrap();

        let id = store
            .insert(&FeedbackRecord::new(7, "Great app!".to_string()))
            .await
            .unwrap();

        let rows = store.feedback_for_chat(7).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, id);
        assert_eq!(rows[0].record, FeedbackRecord::new(7, "Great app!".to_string()));
        assert!(chrono::DateTime::parse_from_rfc3339(&rows[0].received_at).is_ok());
    }

    #[tokio::test]
    async fn test_same_chat_can_submit_many_times() {
        let store = FeedbackStore::open_in_memory().unwrap();

        let first = store
            .insert(&FeedbackRecord::new(7, "same".to_string()))
            .await
            .unwrap();
        let second = store
            .insert(&FeedbackRecord::new(7, "same".to_string()))
            .await
            .unwrap();

        assert_ne!(first, second);
        let rows = store.feedback_for_chat(7).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, first);
        assert_eq!(rows[1].id, second);
    }

    #[tokio::test]
    async fn test_text_is_stored_verbatim() {
        let store = FeedbackStore::open_in_memory().unwrap();
        let text = "  Оставьте 🤍\nline two; DROP TABLE feedback; --  ".to_string();

        store
            .insert(&FeedbackRecord::new(-100123, text.clone()))
            .await
            .unwrap();

        let rows = store.feedback_for_chat(-100123).await.unwrap();
        assert_eq!(rows[0].record.text, text);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_records_are_scoped_by_chat() {
        let store = FeedbackStore::open_in_memory().unwrap();
        store
            .insert(&FeedbackRecord::new(1, "one".to_string()))
            .await
            .unwrap();
        store
            .insert(&FeedbackRecord::new(2, "two".to_string()))
            .await
            .unwrap();

        let rows = store.feedback_for_chat(2).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].record.text, "two");
        assert_eq!(store.count().await.unwrap(), 2);
    }
}
