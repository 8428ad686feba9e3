//! In-process collaborators for local development and integration tests.
//!
//! The local surface fabricates deterministic items per round, accepts any
//! non-empty password and remembers performed actions, so a locally run
//! audit can re-observe what the node posted.

use async_trait::async_trait;
use chrono::Utc;
use rove_types::{
    ActionDetails, AuthOutcome, AutomationSurface, CollectedItem, Credentials, ItemId,
    ItemIdentity, ItemRef, ObservedItem, RoundClock, SearchSpec, SurfaceError, TextGenerator,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

pub struct LocalSurface {
    actor: String,
    posted: Arc<RwLock<HashMap<String, ObservedItem>>>,
}

impl LocalSurface {
    pub fn new(actor: &str) -> Self {
        Self {
            actor: actor.to_string(),
            posted: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// A second surface instance sharing this one's observation state.
    /// Audits need their own instance but must see the same world.
    pub fn linked_view(&self) -> Self {
        Self {
            actor: self.actor.clone(),
            posted: self.posted.clone(),
        }
    }
}

#[async_trait]
impl AutomationSurface for LocalSurface {
    async fn restore_session(&self, material: &[u8]) -> Result<bool, SurfaceError> {
        Ok(!material.is_empty())
    }

    async fn authenticate(&self, credentials: &Credentials) -> Result<AuthOutcome, SurfaceError> {
        if credentials.password.is_empty() {
            return Ok(AuthOutcome::Denied);
        }
        Ok(AuthOutcome::Granted {
            material: format!("local-session:{}", credentials.username).into_bytes(),
        })
    }

    async fn probe_liveness(&self) -> Result<bool, SurfaceError> {
        Ok(true)
    }

    async fn collect(&self, spec: &SearchSpec) -> Result<Vec<CollectedItem>, SurfaceError> {
        let now = Utc::now().timestamp();
        let count = spec.limit.min(3);
        Ok((0..count)
            .map(|i| CollectedItem {
                item_id: ItemId(format!("{}-{}-{}", spec.target, spec.round, i)),
                identity: ItemIdentity {
                    handle: format!("author{}", i),
                    display_name: format!("Author {}", i),
                    profile_url: None,
                },
                content: format!("note {} about {}", i, spec.target),
                time_posted: now - 60 * i as i64,
            })
            .collect())
    }

    async fn perform_action(
        &self,
        item: &CollectedItem,
        text: &str,
    ) -> Result<Option<ActionDetails>, SurfaceError> {
        self.posted.write().await.insert(
            item.item_id.0.clone(),
            ObservedItem {
                content: text.to_string(),
                time_posted: Utc::now().timestamp(),
            },
        );
        Ok(Some(ActionDetails {
            actor_id: self.actor.clone(),
            target_id: item.item_id.0.clone(),
            action_text: text.to_string(),
            endpoint: Some("local".to_string()),
        }))
    }

    async fn fetch_item(&self, target: &ItemRef) -> Result<Option<ObservedItem>, SurfaceError> {
        Ok(self.posted.read().await.get(&target.target_id).cloned())
    }
}

/// Echoes a shortened form of the source back as the reply.
pub struct EchoGenerator;

#[async_trait]
impl TextGenerator for EchoGenerator {
    async fn generate(&self, prompt: &str, _max_tokens: u32) -> Result<String, SurfaceError> {
        let excerpt: String = prompt.chars().take(60).collect();
        Ok(format!("Noted: {}", excerpt))
    }
}

/// Derives the round number from wall-clock time.
pub struct IntervalRoundClock {
    genesis: i64,
    round_secs: i64,
}

impl IntervalRoundClock {
    pub fn new(genesis: i64, round_secs: i64) -> Self {
        Self {
            genesis,
            round_secs: round_secs.max(1),
        }
    }

    pub fn starting_now(round_secs: i64) -> Self {
        Self::new(Utc::now().timestamp(), round_secs)
    }
}

#[async_trait]
impl RoundClock for IntervalRoundClock {
    async fn current_round(&self) -> Result<u64, SurfaceError> {
        let elapsed = (Utc::now().timestamp() - self.genesis).max(0);
        Ok((elapsed / self.round_secs) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_collect_is_deterministic_per_round() {
        let surface = LocalSurface::new("me");
        let spec = SearchSpec {
            target: "rove".to_string(),
            limit: 10,
            depth: 1,
            round: 4,
        };
        let a = surface.collect(&spec).await.unwrap();
        let b = surface.collect(&spec).await.unwrap();
        assert_eq!(a.len(), 3);
        assert_eq!(a[0].item_id, b[0].item_id);
    }

    #[tokio::test]
    async fn test_linked_view_sees_posted_actions() {
        let surface = LocalSurface::new("me");
        let auditor_view = surface.linked_view();
        let spec = SearchSpec {
            target: "rove".to_string(),
            limit: 1,
            depth: 1,
            round: 0,
        };
        let item = surface.collect(&spec).await.unwrap().remove(0);
        let details = surface
            .perform_action(&item, "a reply")
            .await
            .unwrap()
            .unwrap();

        let observed = auditor_view
            .fetch_item(&ItemRef::from(&details))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(observed.content, "a reply");
    }
}
