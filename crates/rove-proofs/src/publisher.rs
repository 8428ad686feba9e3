use crate::error::{ProofError, Result};
use crate::store::ProofStoreBackend;
use rove_types::{Cid, ContentStore, RoundId, SubmissionRecord};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Packages a round's proof-store contents and uploads them to
/// content-addressed storage.
pub struct ProofPublisher<S, C> {
    store: Arc<S>,
    cas: Arc<C>,
    upload_attempts: u32,
    retry_delay: Duration,
}

impl<S: ProofStoreBackend, C: ContentStore> ProofPublisher<S, C> {
    pub fn new(store: Arc<S>, cas: Arc<C>) -> Self {
        Self {
            store,
            cas,
            upload_attempts: 3,
            retry_delay: Duration::from_secs(3),
        }
    }

    pub fn with_retry(mut self, attempts: u32, delay: Duration) -> Self {
        self.upload_attempts = attempts.max(1);
        self.retry_delay = delay;
        self
    }

    /// Publish a round's artifacts and record the resulting cid.
    ///
    /// Returns `Ok(None)` when the round collected nothing (not an error,
    /// and no submission record is created). Republishing a round returns
    /// the already-recorded cid. Upload failures after bounded retries
    /// surface to the caller; the orchestrator decides whether to skip the
    /// round.
    pub async fn publish(&self, round: RoundId) -> Result<Option<Cid>> {
        if let Some(existing) = self.store.get_submission(round).await? {
            info!(round, cid = existing.cid.short(), "Round already published");
            return Ok(Some(existing.cid));
        }

        let artifacts = self.store.get_artifacts(round).await?;
        if artifacts.is_empty() {
            info!(round, "No artifacts for round, nothing to publish");
            return Ok(None);
        }

        let payload = serde_json::to_vec(&artifacts)
            .map_err(|e| ProofError::Serialization(e.to_string()))?;

        let cid = self.upload_with_retry(&payload, round).await?;

        self.store
            .put_submission(&SubmissionRecord {
                round,
                cid: cid.clone(),
            })
            .await?;

        info!(
            round,
            cid = cid.short(),
            artifacts = artifacts.len(),
            "📤 Round proof published"
        );
        Ok(Some(cid))
    }

    async fn upload_with_retry(&self, payload: &[u8], round: RoundId) -> Result<Cid> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.cas.upload(payload).await {
                Ok(cid) => return Ok(cid),
                Err(e) if e.is_transient() && attempt < self.upload_attempts => {
                    warn!(round, attempt, error = %e, "Proof upload failed, retrying");
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(e) => {
                    return Err(ProofError::UploadFailed {
                        attempts: attempt,
                        last: e,
                    })
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cas::MemoryContentStore;
    use crate::memory::MemoryProofStore;
    use rove_crypto::FingerprintEngine;
    use rove_types::{Artifact, ItemId, ItemIdentity};

    fn artifact(id: &str, round: RoundId) -> Artifact {
        Artifact {
            item_id: ItemId(id.to_string()),
            identity: ItemIdentity {
                handle: "handle".to_string(),
                display_name: "name".to_string(),
                profile_url: None,
            },
            content: "hello world".to_string(),
            time_posted: 1_700_000_000,
            fingerprint: FingerprintEngine::new().tag("hello world", round),
            action: None,
        }
    }

    #[tokio::test]
    async fn test_empty_round_publishes_nothing() {
        let store = Arc::new(MemoryProofStore::new());
        let cas = Arc::new(MemoryContentStore::new());
        let publisher = ProofPublisher::new(store.clone(), cas);

        assert!(publisher.publish(9).await.unwrap().is_none());
        assert!(store.get_submission(9).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_republish_returns_same_cid() {
        let store = Arc::new(MemoryProofStore::new());
        let cas = Arc::new(MemoryContentStore::new());
        store.put_artifact(7, &artifact("1", 7)).await.unwrap();

        let publisher = ProofPublisher::new(store.clone(), cas);
        let first = publisher.publish(7).await.unwrap().unwrap();
        let second = publisher.publish(7).await.unwrap().unwrap();
        assert_eq!(first, second);
        assert_eq!(store.get_submission(7).await.unwrap().unwrap().cid, first);
    }

    #[tokio::test]
    async fn test_published_payload_round_trips() {
        let store = Arc::new(MemoryProofStore::new());
        let cas = Arc::new(MemoryContentStore::new());
        store.put_artifact(7, &artifact("1", 7)).await.unwrap();
        store.put_artifact(7, &artifact("2", 7)).await.unwrap();

        let publisher = ProofPublisher::new(store, cas.clone());
        let cid = publisher.publish(7).await.unwrap().unwrap();

        let bytes = cas.download(&cid).await.unwrap();
        let artifacts: Vec<Artifact> = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(artifacts.len(), 2);
    }

    #[tokio::test]
    async fn test_upload_retries_then_succeeds() {
        let store = Arc::new(MemoryProofStore::new());
        let cas = Arc::new(MemoryContentStore::new().with_failures(2));
        store.put_artifact(3, &artifact("1", 3)).await.unwrap();

        let publisher =
            ProofPublisher::new(store, cas).with_retry(3, Duration::from_millis(1));
        assert!(publisher.publish(3).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_malformed_persisted_cid_fails_publish_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        // A submissions file whose record carries a truncated cid string
        std::fs::write(
            dir.path().join("submissions.json"),
            r#"{"7":{"round":7,"cid":"abc"}}"#,
        )
        .unwrap();

        let store = Arc::new(crate::file::JsonFileStore::open(dir.path()).unwrap());
        let publisher = ProofPublisher::new(store, Arc::new(MemoryContentStore::new()));
        assert!(matches!(
            publisher.publish(7).await,
            Err(ProofError::Serialization(_))
        ));
    }

    #[tokio::test]
    async fn test_exhausted_retries_surface_error() {
        let store = Arc::new(MemoryProofStore::new());
        let cas = Arc::new(MemoryContentStore::new().with_failures(5));
        store.put_artifact(3, &artifact("1", 3)).await.unwrap();

        let publisher =
            ProofPublisher::new(store.clone(), cas).with_retry(3, Duration::from_millis(1));
        let err = publisher.publish(3).await.unwrap_err();
        assert!(matches!(err, ProofError::UploadFailed { attempts: 3, .. }));
        // Failed publish leaves no submission record
        assert!(store.get_submission(3).await.unwrap().is_none());
    }
}
