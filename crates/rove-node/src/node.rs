use crate::orchestrator::{Result, RoundOrchestrator};
use chrono::Utc;
use rove_proofs::ProofStoreBackend;
use rove_types::{AutomationSurface, ContentStore, RoundClock, RoundId, TextGenerator};
use std::time::Duration;
use tracing::{info, warn};

/// Poll the round clock and run each new round exactly once.
///
/// Only fatal session errors return; everything else is logged and the
/// loop moves on to the next round. A failed round is still marked as
/// attempted so the node does not hot-loop on it.
pub async fn run<A, G, S, C, K>(
    orchestrator: &RoundOrchestrator<A, G, S, C>,
    clock: &K,
    poll: Duration,
) -> Result<()>
where
    A: AutomationSurface,
    G: TextGenerator,
    S: ProofStoreBackend,
    C: ContentStore,
    K: RoundClock,
{
    let mut last_round: Option<RoundId> = None;
    loop {
        let round = match clock.current_round().await {
            Ok(round) => round,
            Err(e) => {
                warn!(error = %e, "Round clock unavailable");
                tokio::time::sleep(poll).await;
                continue;
            }
        };

        if last_round != Some(round) {
            let now = Utc::now().timestamp();
            match orchestrator.run_round(round, now).await {
                Ok(Some(cid)) => info!(round, cid = cid.short(), "Round complete"),
                Ok(None) => info!(round, "Round complete, nothing published"),
                Err(e) => {
                    if e.fatal_reason().is_some() {
                        return Err(e);
                    }
                    warn!(round, error = %e, "Round failed");
                }
            }
            last_round = Some(round);
        }

        tokio::time::sleep(poll).await;
    }
}
