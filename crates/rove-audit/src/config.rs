use serde::{Deserialize, Serialize};

/// What to do when a sampled item cannot be re-observed because it no
/// longer exists on the target surface.
///
/// Deleted items are indistinguishable from fabricated ones, so the
/// strict default votes against the submission; operators on surfaces
/// with heavy churn can opt into giving the submitter the benefit of
/// the doubt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingItemPolicy {
    /// A missing item fails the audit
    Fail,
    /// A missing item passes the audit
    Pass,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Maximum observed item age in seconds for a submission to count as fresh
    pub freshness_bound_secs: i64,

    /// Verdict for items that no longer exist on the surface
    pub on_missing: MissingItemPolicy,

    /// Number of artifacts sampled per audited submission
    pub sample_size: usize,

    /// Per-item re-observation timeout in seconds
    pub fetch_timeout_secs: u64,

    /// Attempts to download the submission payload from content storage
    pub download_retries: u32,

    /// Delay between download attempts in seconds
    pub download_retry_delay_secs: u64,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            freshness_bound_secs: 3600,
            on_missing: MissingItemPolicy::Fail,
            sample_size: 1,
            fetch_timeout_secs: 30,
            download_retries: 3,
            download_retry_delay_secs: 3,
        }
    }
}
