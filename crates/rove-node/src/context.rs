use crate::composer::ReplyComposer;
use crate::config::{CollectionConfig, NodeConfig};
use rove_audit::AuditVerifier;
use rove_crypto::FingerprintEngine;
use rove_proofs::{ProofPublisher, ProofStoreBackend};
use rove_session::{ActionRateLimiter, SessionManager};
use rove_types::{AutomationSurface, ContentStore, Credentials, TextGenerator};
use std::sync::Arc;

/// Everything a round needs, wired once at startup and passed by
/// reference. Collaborators are explicit constructor arguments; nothing
/// here is global.
pub struct NodeContext<A, G, S, C> {
    pub surface: Arc<A>,
    pub store: Arc<S>,
    pub session: Arc<SessionManager<A, S>>,
    pub limiter: ActionRateLimiter,
    pub publisher: ProofPublisher<S, C>,
    pub auditor: AuditVerifier<A, C>,
    pub composer: ReplyComposer<G>,
    pub fingerprints: FingerprintEngine,
    pub collection: CollectionConfig,
}

impl<A, G, S, C> NodeContext<A, G, S, C>
where
    A: AutomationSurface,
    G: TextGenerator,
    S: ProofStoreBackend,
    C: ContentStore,
{
    /// Wire a context. `audit_surface` must be a separate instance from
    /// `surface`: audits never share the collection session.
    pub fn new(
        surface: Arc<A>,
        audit_surface: Arc<A>,
        generator: Arc<G>,
        store: Arc<S>,
        cas: Arc<C>,
        credentials: Credentials,
        config: &NodeConfig,
    ) -> Self {
        let session = Arc::new(SessionManager::with_config(
            surface.clone(),
            store.clone(),
            credentials,
            config.session.clone().into(),
        ));
        Self {
            publisher: ProofPublisher::new(store.clone(), cas.clone()),
            auditor: AuditVerifier::with_config(audit_surface, cas, config.audit.clone()),
            composer: ReplyComposer::with_config(generator, config.composer.clone()),
            limiter: config.limiter.limiter(),
            fingerprints: FingerprintEngine::new(),
            collection: config.collection.clone(),
            surface,
            store,
            session,
        }
    }
}
