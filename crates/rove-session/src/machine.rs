use crate::error::{FatalReason, Result, SessionError};
use rand::Rng;
use rove_proofs::ProofStoreBackend;
use rove_types::{AuthOutcome, AutomationSurface, Credentials};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Availability of the node's authenticated session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// No session material yet; first use triggers authentication
    Uninitialized,

    /// An authentication attempt is in flight
    Authenticating,

    /// Session is usable
    Valid,

    /// A liveness probe failed; renegotiation pending
    Expired,

    /// Explicitly invalidated by the caller after a session-looking failure
    Invalid,

    /// Unrecoverable credential failure; the node must stop
    Fatal(FatalReason),
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Interactive authentication attempts before giving up
    pub max_retry: u32,

    /// Minimum seconds between renegotiation attempts after a failure
    pub recheck_grace_secs: i64,

    /// Seconds a Valid session is trusted before it is re-probed
    pub liveness_interval_secs: i64,

    /// Base backoff between authentication attempts, milliseconds
    pub backoff_base_ms: u64,

    /// Random extra backoff per attempt, milliseconds
    pub backoff_jitter_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_retry: 3,
            recheck_grace_secs: 50,
            liveness_interval_secs: 300,
            backoff_base_ms: 2_000,
            backoff_jitter_ms: 1_000,
        }
    }
}

/// Drives the session lifecycle against the automation surface.
///
/// `Uninitialized → Authenticating → Valid → (Expired | Invalid) →
/// Authenticating …`, with `Fatal` terminal. The machine persists reusable
/// credential material through the proof store and always tries the cached
/// material before interactive authentication. It never terminates the
/// process itself; fatal outcomes are typed errors for the caller.
pub struct SessionManager<A, S> {
    surface: Arc<A>,
    store: Arc<S>,
    credentials: Credentials,
    config: SessionConfig,
    status: RwLock<SessionStatus>,
    last_checked_at: RwLock<Option<i64>>,
}

impl<A: AutomationSurface, S: ProofStoreBackend> SessionManager<A, S> {
    pub fn new(surface: Arc<A>, store: Arc<S>, credentials: Credentials) -> Self {
        Self::with_config(surface, store, credentials, SessionConfig::default())
    }

    pub fn with_config(
        surface: Arc<A>,
        store: Arc<S>,
        credentials: Credentials,
        config: SessionConfig,
    ) -> Self {
        Self {
            surface,
            store,
            credentials,
            config,
            status: RwLock::new(SessionStatus::Uninitialized),
            last_checked_at: RwLock::new(None),
        }
    }

    pub async fn status(&self) -> SessionStatus {
        *self.status.read().await
    }

    /// Mark the session invalid after a failure that looks session-related.
    /// The next `check_session` past the grace interval renegotiates.
    pub async fn mark_invalid(&self) {
        let mut status = self.status.write().await;
        if !matches!(*status, SessionStatus::Fatal(_)) {
            *status = SessionStatus::Invalid;
        }
    }

    /// Report whether the session is currently usable, transitioning per
    /// the state rules. Never blocks indefinitely: it either answers from
    /// the current state or runs one bounded negotiation.
    pub async fn check_session(&self, now: i64) -> Result<bool> {
        let status = *self.status.read().await;
        match status {
            SessionStatus::Fatal(reason) => Err(SessionError::Fatal(reason)),
            SessionStatus::Valid => {
                if self.liveness_due(now).await {
                    self.probe(now).await
                } else {
                    Ok(true)
                }
            }
            SessionStatus::Uninitialized => self.negotiate_session(now).await,
            SessionStatus::Authenticating => Ok(false),
            SessionStatus::Expired | SessionStatus::Invalid => {
                if self.grace_elapsed(now).await {
                    self.negotiate_session(now).await
                } else {
                    debug!("Session not yet valid, within re-auth grace interval");
                    Ok(false)
                }
            }
        }
    }

    /// Explicit on-demand renegotiation. Cached-credential reuse first,
    /// then up to `max_retry` interactive attempts with randomized backoff.
    pub async fn negotiate_session(&self, now: i64) -> Result<bool> {
        {
            let status = *self.status.read().await;
            if let SessionStatus::Fatal(reason) = status {
                return Err(SessionError::Fatal(reason));
            }
        }
        *self.status.write().await = SessionStatus::Authenticating;
        *self.last_checked_at.write().await = Some(now);

        if self.try_cached_material().await? {
            info!("🔑 Session restored from cached material");
            *self.status.write().await = SessionStatus::Valid;
            return Ok(true);
        }

        for attempt in 1..=self.config.max_retry {
            match self.surface.authenticate(&self.credentials).await {
                Ok(AuthOutcome::Granted { material }) => {
                    self.store.put_session_material(&material).await?;
                    *self.status.write().await = SessionStatus::Valid;
                    info!(attempt, "✅ Session established");
                    return Ok(true);
                }
                Ok(AuthOutcome::Denied) => {
                    warn!(attempt, "Credentials rejected by surface");
                    return self.fail(FatalReason::CredentialsRejected).await;
                }
                Ok(AuthOutcome::ChallengeFailed) => {
                    warn!(attempt, "Verification challenge could not be satisfied");
                    return self.fail(FatalReason::UnrecoverableChallenge).await;
                }
                Err(e) if e.is_transient() => {
                    warn!(
                        attempt,
                        max_retry = self.config.max_retry,
                        error = %e,
                        "Authentication attempt failed, backing off"
                    );
                    if attempt < self.config.max_retry {
                        tokio::time::sleep(self.backoff(attempt)).await;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Terminal surface failure during authentication");
                    return self.fail(FatalReason::CredentialsRejected).await;
                }
            }
        }
        self.fail(FatalReason::RetriesExhausted).await
    }

    async fn try_cached_material(&self) -> Result<bool> {
        let material = match self.store.get_session_material().await? {
            Some(m) => m,
            None => {
                debug!("No cached session material");
                return Ok(false);
            }
        };
        match self.surface.restore_session(&material).await {
            Ok(true) => Ok(true),
            Ok(false) => {
                debug!("Cached session material stale, falling back to authentication");
                Ok(false)
            }
            Err(e) => {
                warn!(error = %e, "Cached-session restore failed");
                Ok(false)
            }
        }
    }

    async fn probe(&self, now: i64) -> Result<bool> {
        *self.last_checked_at.write().await = Some(now);
        match self.surface.probe_liveness().await {
            Ok(true) => Ok(true),
            Ok(false) => {
                info!("Session liveness probe failed, marking expired");
                *self.status.write().await = SessionStatus::Expired;
                Ok(false)
            }
            Err(e) => {
                warn!(error = %e, "Liveness probe errored, marking expired");
                *self.status.write().await = SessionStatus::Expired;
                Ok(false)
            }
        }
    }

    async fn fail(&self, reason: FatalReason) -> Result<bool> {
        *self.status.write().await = SessionStatus::Fatal(reason);
        Err(SessionError::Fatal(reason))
    }

    async fn grace_elapsed(&self, now: i64) -> bool {
        match *self.last_checked_at.read().await {
            Some(at) => now - at >= self.config.recheck_grace_secs,
            None => true,
        }
    }

    async fn liveness_due(&self, now: i64) -> bool {
        match *self.last_checked_at.read().await {
            Some(at) => now - at >= self.config.liveness_interval_secs,
            None => true,
        }
    }

    fn backoff(&self, attempt: u32) -> Duration {
        let jitter = if self.config.backoff_jitter_ms > 0 {
            rand::thread_rng().gen_range(0..self.config.backoff_jitter_ms)
        } else {
            0
        };
        // Grows with the attempt number and is never zero
        Duration::from_millis(self.config.backoff_base_ms.max(1) * attempt as u64 + jitter)
    }
}
