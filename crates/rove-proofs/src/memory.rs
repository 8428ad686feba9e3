use crate::error::Result;
use crate::store::ProofStoreBackend;
use async_trait::async_trait;
use rove_types::{Artifact, ItemId, LastAction, RoundId, SubmissionRecord};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory proof store for testing and development.
#[derive(Default)]
pub struct MemoryProofStore {
    artifacts: Arc<RwLock<HashMap<(RoundId, ItemId), Artifact>>>,
    submissions: Arc<RwLock<HashMap<RoundId, SubmissionRecord>>>,
    session_material: Arc<RwLock<Option<Vec<u8>>>>,
    last_action: Arc<RwLock<LastAction>>,
}

impl MemoryProofStore {
    pub fn new() -> Self {
        Self {
            artifacts: Arc::new(RwLock::new(HashMap::new())),
            submissions: Arc::new(RwLock::new(HashMap::new())),
            session_material: Arc::new(RwLock::new(None)),
            last_action: Arc::new(RwLock::new(LastAction::None)),
        }
    }

    /// Test helper: force a corrupt last-action record.
    pub async fn poison_last_action(&self) {
        *self.last_action.write().await = LastAction::Corrupt;
    }
}

#[async_trait]
impl ProofStoreBackend for MemoryProofStore {
    async fn put_artifact(&self, round: RoundId, artifact: &Artifact) -> Result<()> {
        let mut artifacts = self.artifacts.write().await;
        artifacts
            .entry((round, artifact.item_id.clone()))
            .or_insert_with(|| artifact.clone());
        Ok(())
    }

    async fn get_artifacts(&self, round: RoundId) -> Result<Vec<Artifact>> {
        let artifacts = self.artifacts.read().await;
        let mut out: Vec<Artifact> = artifacts
            .iter()
            .filter(|((r, _), _)| *r == round)
            .map(|(_, a)| a.clone())
            .collect();
        out.sort_by(|a, b| a.item_id.as_str().cmp(b.item_id.as_str()));
        Ok(out)
    }

    async fn put_submission(&self, record: &SubmissionRecord) -> Result<()> {
        let mut submissions = self.submissions.write().await;
        submissions.insert(record.round, record.clone());
        Ok(())
    }

    async fn get_submission(&self, round: RoundId) -> Result<Option<SubmissionRecord>> {
        let submissions = self.submissions.read().await;
        Ok(submissions.get(&round).cloned())
    }

    async fn put_session_material(&self, material: &[u8]) -> Result<()> {
        *self.session_material.write().await = Some(material.to_vec());
        Ok(())
    }

    async fn get_session_material(&self) -> Result<Option<Vec<u8>>> {
        Ok(self.session_material.read().await.clone())
    }

    async fn put_last_action(&self, at: i64) -> Result<()> {
        *self.last_action.write().await = LastAction::At(at);
        Ok(())
    }

    async fn get_last_action(&self) -> Result<LastAction> {
        Ok(*self.last_action.read().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rove_crypto::FingerprintEngine;
    use rove_types::ItemIdentity;

    fn artifact(id: &str, content: &str, round: RoundId) -> Artifact {
        Artifact {
            item_id: ItemId(id.to_string()),
            identity: ItemIdentity {
                handle: "handle".to_string(),
                display_name: "name".to_string(),
                profile_url: None,
            },
            content: content.to_string(),
            time_posted: 1_700_000_000,
            fingerprint: FingerprintEngine::new().tag(content, round),
            action: None,
        }
    }

    #[tokio::test]
    async fn test_duplicate_insert_is_idempotent() {
        let store = MemoryProofStore::new();
        let first = artifact("1", "original", 3);
        let second = artifact("1", "changed", 3);

        store.put_artifact(3, &first).await.unwrap();
        store.put_artifact(3, &second).await.unwrap();

        let stored = store.get_artifacts(3).await.unwrap();
        assert_eq!(stored.len(), 1);
        // First write wins; artifacts are immutable once stored
        assert_eq!(stored[0].content, "original");
    }

    #[tokio::test]
    async fn test_rounds_are_isolated() {
        let store = MemoryProofStore::new();
        store.put_artifact(1, &artifact("a", "one", 1)).await.unwrap();
        store.put_artifact(2, &artifact("b", "two", 2)).await.unwrap();

        assert_eq!(store.get_artifacts(1).await.unwrap().len(), 1);
        assert_eq!(store.get_artifacts(2).await.unwrap().len(), 1);
        assert!(store.get_artifacts(3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_last_action_lifecycle() {
        let store = MemoryProofStore::new();
        assert_eq!(store.get_last_action().await.unwrap(), LastAction::None);

        store.put_last_action(1_700_000_000).await.unwrap();
        assert_eq!(
            store.get_last_action().await.unwrap(),
            LastAction::At(1_700_000_000)
        );

        store.poison_last_action().await;
        assert_eq!(store.get_last_action().await.unwrap(), LastAction::Corrupt);
    }

    #[tokio::test]
    async fn test_session_material_overwrite() {
        let store = MemoryProofStore::new();
        assert!(store.get_session_material().await.unwrap().is_none());

        store.put_session_material(b"old cookies").await.unwrap();
        store.put_session_material(b"new cookies").await.unwrap();
        assert_eq!(
            store.get_session_material().await.unwrap().unwrap(),
            b"new cookies".to_vec()
        );
    }
}
