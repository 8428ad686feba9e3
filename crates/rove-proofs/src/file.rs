use crate::error::{ProofError, Result};
use crate::store::ProofStoreBackend;
use async_trait::async_trait;
use rove_types::{Artifact, LastAction, RoundId, SubmissionRecord};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// File-backed proof store: one JSON document per state section under the
/// node's data directory. Small enough that whole-document rewrites are
/// cheaper than a database dependency, and a restart resumes from whatever
/// was last flushed.
pub struct JsonFileStore {
    dir: PathBuf,
    // Serializes read-modify-write cycles on the artifact documents
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    fn artifacts_path(&self, round: RoundId) -> PathBuf {
        self.dir.join(format!("artifacts-{}.json", round))
    }

    fn submissions_path(&self) -> PathBuf {
        self.dir.join("submissions.json")
    }

    fn session_path(&self) -> PathBuf {
        self.dir.join("session-material.bin")
    }

    fn last_action_path(&self) -> PathBuf {
        self.dir.join("last-action.json")
    }

    fn read_artifacts(&self, round: RoundId) -> Result<Vec<Artifact>> {
        let path = self.artifacts_path(round);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&path)?;
        serde_json::from_str(&content).map_err(|e| ProofError::Serialization(e.to_string()))
    }

    fn read_submissions(&self) -> Result<HashMap<RoundId, SubmissionRecord>> {
        let path = self.submissions_path();
        if !path.exists() {
            return Ok(HashMap::new());
        }
        let content = std::fs::read_to_string(&path)?;
        serde_json::from_str(&content).map_err(|e| ProofError::Serialization(e.to_string()))
    }

    fn write_json<T: serde::Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        let content = serde_json::to_string_pretty(value)
            .map_err(|e| ProofError::Serialization(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[async_trait]
impl ProofStoreBackend for JsonFileStore {
    async fn put_artifact(&self, round: RoundId, artifact: &Artifact) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut artifacts = self.read_artifacts(round)?;
        if artifacts.iter().any(|a| a.item_id == artifact.item_id) {
            debug!(round, item_id = %artifact.item_id, "Duplicate artifact insert ignored");
            return Ok(());
        }
        artifacts.push(artifact.clone());
        self.write_json(&self.artifacts_path(round), &artifacts)
    }

    async fn get_artifacts(&self, round: RoundId) -> Result<Vec<Artifact>> {
        self.read_artifacts(round)
    }

    async fn put_submission(&self, record: &SubmissionRecord) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut submissions = self.read_submissions()?;
        submissions.insert(record.round, record.clone());
        self.write_json(&self.submissions_path(), &submissions)
    }

    async fn get_submission(&self, round: RoundId) -> Result<Option<SubmissionRecord>> {
        Ok(self.read_submissions()?.remove(&round))
    }

    async fn put_session_material(&self, material: &[u8]) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        std::fs::write(self.session_path(), material)?;
        Ok(())
    }

    async fn get_session_material(&self) -> Result<Option<Vec<u8>>> {
        let path = self.session_path();
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(std::fs::read(path)?))
    }

    async fn put_last_action(&self, at: i64) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.write_json(&self.last_action_path(), &at)
    }

    async fn get_last_action(&self) -> Result<LastAction> {
        let path = self.last_action_path();
        if !path.exists() {
            return Ok(LastAction::None);
        }
        let content = std::fs::read_to_string(&path)?;
        match serde_json::from_str::<i64>(&content) {
            Ok(at) => Ok(LastAction::At(at)),
            Err(e) => {
                // Unreadable history must not unlock the limiter
                warn!(error = %e, "Corrupt last-action record");
                Ok(LastAction::Corrupt)
            }
        }
    }
}
