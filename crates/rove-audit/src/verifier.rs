use crate::config::{AuditConfig, MissingItemPolicy};
use rand::seq::SliceRandom;
use rand::Rng;
use rove_crypto::FingerprintEngine;
use rove_types::{Artifact, AutomationSurface, Cid, ContentStore, ItemRef, SurfaceError};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Verdict on a single re-observed artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemVerdict {
    Pass,
    Fail,
    Missing,
}

/// Checks a peer's published round proof by re-observation.
///
/// The verifier owns its own surface instance; it never shares the
/// collection session. All outcomes reduce to a boolean vote: any
/// failure to obtain the submitted data (bad cid, exhausted downloads,
/// unparseable payload) counts as no data and votes against.
pub struct AuditVerifier<A, C> {
    surface: Arc<A>,
    cas: Arc<C>,
    fingerprints: FingerprintEngine,
    config: AuditConfig,
}

impl<A: AutomationSurface, C: ContentStore> AuditVerifier<A, C> {
    pub fn new(surface: Arc<A>, cas: Arc<C>) -> Self {
        Self::with_config(surface, cas, AuditConfig::default())
    }

    pub fn with_config(surface: Arc<A>, cas: Arc<C>, config: AuditConfig) -> Self {
        Self {
            surface,
            cas,
            fingerprints: FingerprintEngine::new(),
            config,
        }
    }

    /// Audit one published submission for `round`.
    pub async fn audit_submission(&self, cid: &str, round: u64, now: i64) -> bool {
        self.audit_submission_with_rng(cid, round, now, &mut rand::thread_rng())
            .await
    }

    /// Audit with an injected randomness source for the artifact sample.
    pub async fn audit_submission_with_rng<R: Rng>(
        &self,
        cid: &str,
        round: u64,
        now: i64,
        rng: &mut R,
    ) -> bool {
        let cid = match Cid::parse(cid) {
            Ok(cid) => cid,
            Err(e) => {
                warn!(round, error = %e, "Submitted cid is malformed, voting against");
                return false;
            }
        };

        let payload = match self.download_with_retry(&cid).await {
            Some(payload) => payload,
            None => {
                warn!(round, cid = %cid.short(), "Could not fetch submission payload, voting against");
                return false;
            }
        };

        let artifacts: Vec<Artifact> = match serde_json::from_slice(&payload) {
            Ok(artifacts) => artifacts,
            Err(e) => {
                warn!(round, cid = %cid.short(), error = %e, "Submission payload unparseable, voting against");
                return false;
            }
        };
        if artifacts.is_empty() {
            warn!(round, cid = %cid.short(), "Submission contains no artifacts, voting against");
            return false;
        }

        let sample_size = self.config.sample_size.max(1);
        for artifact in artifacts.choose_multiple(rng, sample_size) {
            match self.verify_item(artifact, round, now).await {
                ItemVerdict::Pass => {}
                ItemVerdict::Missing => {
                    if self.config.on_missing == MissingItemPolicy::Fail {
                        info!(round, item = %artifact.item_id, "Sampled item missing, voting against");
                        return false;
                    }
                    debug!(round, item = %artifact.item_id, "Sampled item missing, policy passes it");
                }
                ItemVerdict::Fail => {
                    info!(round, item = %artifact.item_id, "Sampled item failed verification, voting against");
                    return false;
                }
            }
        }

        info!(round, cid = %cid.short(), "✅ Submission passed audit");
        true
    }

    /// Verify one artifact: fingerprint self-consistency, then a fresh
    /// read-only observation checked for freshness and content containment.
    pub async fn verify_item(&self, artifact: &Artifact, round: u64, now: i64) -> ItemVerdict {
        if !self
            .fingerprints
            .matches(&artifact.content, round, &artifact.fingerprint)
        {
            warn!(item = %artifact.item_id, "Fingerprint does not match submitted content");
            return ItemVerdict::Fail;
        }

        let action = match &artifact.action {
            Some(action) => action,
            None => return ItemVerdict::Missing,
        };

        let item_ref = ItemRef::from(action);
        let fetch = self.surface.fetch_item(&item_ref);
        let observed = match tokio::time::timeout(
            Duration::from_secs(self.config.fetch_timeout_secs),
            fetch,
        )
        .await
        {
            Err(_) => {
                warn!(item = %artifact.item_id, "Re-observation timed out");
                return ItemVerdict::Fail;
            }
            Ok(Err(SurfaceError::NotFound(_))) | Ok(Ok(None)) => return ItemVerdict::Missing,
            Ok(Err(e)) => {
                warn!(item = %artifact.item_id, error = %e, "Re-observation failed");
                return ItemVerdict::Fail;
            }
            Ok(Ok(Some(observed))) => observed,
        };

        let age = now - observed.time_posted;
        if age > self.config.freshness_bound_secs {
            debug!(
                item = %artifact.item_id,
                age,
                bound = self.config.freshness_bound_secs,
                "Observed item too old"
            );
            return ItemVerdict::Fail;
        }

        // Containment, not equality: the surface may decorate the text
        let matches = observed
            .content
            .to_lowercase()
            .contains(&action.action_text.to_lowercase());
        if matches {
            ItemVerdict::Pass
        } else {
            debug!(item = %artifact.item_id, "Recorded text not found in observed content");
            ItemVerdict::Fail
        }
    }

    async fn download_with_retry(&self, cid: &Cid) -> Option<Vec<u8>> {
        let timeout = Duration::from_secs(self.config.fetch_timeout_secs);
        for attempt in 1..=self.config.download_retries.max(1) {
            let result = match tokio::time::timeout(timeout, self.cas.download(cid)).await {
                Ok(result) => result,
                Err(_) => Err(SurfaceError::Transient("download timed out".to_string())),
            };
            match result {
                Ok(payload) => return Some(payload),
                Err(e) => {
                    warn!(
                        attempt,
                        retries = self.config.download_retries,
                        cid = %cid.short(),
                        error = %e,
                        "Submission download failed"
                    );
                    if !e.is_transient() {
                        return None;
                    }
                    if attempt < self.config.download_retries {
                        tokio::time::sleep(Duration::from_secs(
                            self.config.download_retry_delay_secs,
                        ))
                        .await;
                    }
                }
            }
        }
        None
    }
}
