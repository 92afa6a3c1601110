//! Outbound operations the relay needs from the messaging platform.

use crate::errors::PlatformError;
use crate::model::{ProofMessageId, UserId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::future::Future;
use std::time::Duration;

#[async_trait]
pub trait Platform: Send + Sync {
    /// Post a proof photo to the moderation surface with Accept/Decline buttons
    /// whose payloads name `payer_id`. Returns the id of the new post.
    async fn send_proof(
        &self,
        photo_ref: &str,
        caption: &str,
        payer_id: UserId,
    ) -> Result<ProofMessageId, PlatformError>;

    /// Send a private text message.
    async fn send_message(&self, user_id: UserId, text: &str) -> Result<(), PlatformError>;

    /// Replace the caption of a proof post.
    async fn edit_caption(
        &self,
        message_id: ProofMessageId,
        caption: &str,
    ) -> Result<(), PlatformError>;

    /// Create an invite to the restricted channel. Returns the invite URL.
    async fn create_invite_link(
        &self,
        member_limit: u32,
        expires_at: DateTime<Utc>,
    ) -> Result<String, PlatformError>;

    /// Acknowledge a button press, optionally showing `text` to the presser only.
    async fn answer_button(&self, query_id: &str, text: Option<&str>)
    -> Result<(), PlatformError>;
}

/// Run an outbound call with an upper bound on how long it may take.
pub async fn bounded<T, F>(limit: Duration, call: F) -> Result<T, PlatformError>
where
    F: Future<Output = Result<T, PlatformError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(PlatformError::Timeout(limit)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bounded_passes_result_through() {
        let ok = bounded(Duration::from_secs(1), async { Ok::<_, PlatformError>(7) }).await;
        assert_eq!(ok.unwrap(), 7);

        let err = bounded(Duration::from_secs(1), async {
            Err::<(), _>(PlatformError::Request("chat not found".into()))
        })
        .await;
        assert!(matches!(err, Err(PlatformError::Request(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_bounded_times_out() {
        let result = bounded(Duration::from_millis(50), async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<_, PlatformError>(())
        })
        .await;
        assert!(matches!(result, Err(PlatformError::Timeout(d)) if d == Duration::from_millis(50)));
    }
}
