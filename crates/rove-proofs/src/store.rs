use crate::error::Result;
use async_trait::async_trait;
use rove_types::{Artifact, LastAction, RoundId, SubmissionRecord};

/// Backend for the node's persisted local state.
///
/// Everything behind this trait survives a process restart: per-round
/// artifact sets, per-round submission records, reusable session material
/// and the last rate-limited action timestamp.
#[async_trait]
pub trait ProofStoreBackend: Send + Sync {
    /// Append an artifact to a round. Duplicate `(round, item_id)` inserts
    /// are idempotent no-ops; artifacts are immutable once stored.
    async fn put_artifact(&self, round: RoundId, artifact: &Artifact) -> Result<()>;

    /// All artifacts collected for a round.
    async fn get_artifacts(&self, round: RoundId) -> Result<Vec<Artifact>>;

    /// Record a round's submission. Overwrites any existing record for the
    /// round (the publisher only does this once per round).
    async fn put_submission(&self, record: &SubmissionRecord) -> Result<()>;

    async fn get_submission(&self, round: RoundId) -> Result<Option<SubmissionRecord>>;

    /// Persist reusable session material, overwriting previous material.
    async fn put_session_material(&self, material: &[u8]) -> Result<()>;

    async fn get_session_material(&self) -> Result<Option<Vec<u8>>>;

    /// Record the timestamp of a performed rate-limited action.
    async fn put_last_action(&self, at: i64) -> Result<()>;

    /// Last-action history; a backend that finds an unreadable record
    /// reports `LastAction::Corrupt` rather than erroring.
    async fn get_last_action(&self) -> Result<LastAction>;
}
