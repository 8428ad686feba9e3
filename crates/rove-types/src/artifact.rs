use crate::fingerprint::Fingerprint;
use serde::{Deserialize, Serialize};

/// Identifier of a single item on the target surface.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(pub String);

impl ItemId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Authorship details collected alongside an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemIdentity {
    pub handle: String,
    pub display_name: String,
    pub profile_url: Option<String>,
}

/// Record of a rate-limited action taken on an item.
///
/// Present on an artifact only if the rate limiter allowed the action
/// during the round that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDetails {
    /// Acting node's handle on the target surface
    pub actor_id: String,

    /// Item the action was applied to
    pub target_id: String,

    /// Text posted by the action
    pub action_text: String,

    /// Endpoint that produced the action text, if any
    pub endpoint: Option<String>,
}

/// One unit of collected content for a round.
///
/// Immutable once appended to the proof store. The fingerprint is derived
/// at collection time and is never independently settable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    pub item_id: ItemId,
    pub identity: ItemIdentity,

    /// Opaque collected text
    pub content: String,

    /// Unix seconds the item was posted on the target surface
    pub time_posted: i64,

    /// Salted tamper-evidence digest over content + round. Not usable for
    /// equality checks; audit always compares raw content.
    pub fingerprint: Fingerprint,

    pub action: Option<ActionDetails>,
}

/// Published pointer to a round's full proof-store snapshot.
///
/// At most one exists per round per node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub round: u64,
    pub cid: crate::cid::Cid,
}

/// Persisted last-action history as seen by the rate limiter.
///
/// A corrupt persisted timestamp is distinguished from absent history:
/// absent history always allows the next action, a corrupt record fails
/// safe toward not re-acting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LastAction {
    #[default]
    None,
    At(i64),
    Corrupt,
}
