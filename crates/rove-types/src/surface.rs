use crate::artifact::{ActionDetails, ItemId, ItemIdentity};
use crate::cid::Cid;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure raised by an external collaborator.
///
/// Transient failures are retryable; terminal failures are not (bad
/// credentials, rejected upload). Callers that exhaust retries degrade to
/// "nothing this round" instead of crashing.
#[derive(Error, Debug, Clone)]
pub enum SurfaceError {
    #[error("Transient collaborator failure: {0}")]
    Transient(String),

    #[error("Terminal collaborator failure: {0}")]
    Terminal(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl SurfaceError {
    pub fn is_transient(&self) -> bool {
        matches!(self, SurfaceError::Transient(_))
    }
}

/// Credentials for the automation surface.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    /// Answer to the secondary verification challenge, if the operator has one
    pub verification: Option<String>,
}

/// What to collect during a round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSpec {
    pub target: String,
    pub limit: usize,
    pub depth: u32,
    pub round: u64,
}

/// An item as collected from the target surface, before fingerprinting.
#[derive(Debug, Clone)]
pub struct CollectedItem {
    pub item_id: ItemId,
    pub identity: ItemIdentity,
    pub content: String,
    pub time_posted: i64,
}

/// Reference used to re-observe a previously acted-on item.
#[derive(Debug, Clone)]
pub struct ItemRef {
    pub actor_id: String,
    pub target_id: String,
}

impl From<&ActionDetails> for ItemRef {
    fn from(action: &ActionDetails) -> Self {
        Self {
            actor_id: action.actor_id.clone(),
            target_id: action.target_id.clone(),
        }
    }
}

/// A fresh read-only observation of an item.
#[derive(Debug, Clone)]
pub struct ObservedItem {
    pub content: String,
    pub time_posted: i64,
}

/// Result of one interactive authentication attempt.
#[derive(Debug, Clone)]
pub enum AuthOutcome {
    /// Authenticated; material is reusable session state (e.g. cookies)
    Granted { material: Vec<u8> },

    /// Credentials rejected by the surface
    Denied,

    /// A secondary verification challenge appeared and could not be satisfied
    ChallengeFailed,
}

/// The browsing/automation collaborator.
///
/// One instance owns one interactive session; no two concurrent operations
/// may share an instance. Implementations are out of scope for this core.
#[async_trait]
pub trait AutomationSurface: Send + Sync {
    /// Try to reuse persisted session material. Ok(false) means the material
    /// was stale; fall through to interactive authentication.
    async fn restore_session(&self, material: &[u8]) -> Result<bool, SurfaceError>;

    /// One interactive authentication attempt, including any secondary
    /// challenge step encountered along the way.
    async fn authenticate(&self, credentials: &Credentials) -> Result<AuthOutcome, SurfaceError>;

    /// Cheap liveness check of the current session, distinct from
    /// authentication.
    async fn probe_liveness(&self) -> Result<bool, SurfaceError>;

    /// Collect items for a round.
    async fn collect(&self, spec: &SearchSpec) -> Result<Vec<CollectedItem>, SurfaceError>;

    /// Attempt the rate-limited action on an item. Ok(None) means the surface
    /// declined (already acted, item gone) without error.
    async fn perform_action(
        &self,
        item: &CollectedItem,
        text: &str,
    ) -> Result<Option<ActionDetails>, SurfaceError>;

    /// Re-observe an item for audit. Ok(None) means the item no longer exists.
    async fn fetch_item(&self, target: &ItemRef) -> Result<Option<ObservedItem>, SurfaceError>;
}

/// Text-generation collaborator. May return empty or refused text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String, SurfaceError>;
}

/// Content-addressable storage collaborator. Same bytes yield the same cid,
/// and uploaded payloads are publicly fetchable by any node.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn upload(&self, data: &[u8]) -> Result<Cid, SurfaceError>;

    async fn download(&self, cid: &Cid) -> Result<Vec<u8>, SurfaceError>;
}

/// Externally driven monotonic round counter.
#[async_trait]
pub trait RoundClock: Send + Sync {
    async fn current_round(&self) -> Result<u64, SurfaceError>;
}
