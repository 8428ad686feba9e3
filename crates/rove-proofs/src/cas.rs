use async_trait::async_trait;
use rove_types::{Cid, ContentStore, SurfaceError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// In-memory content-addressable store for tests and local development.
///
/// Uploads are keyed by the sha256 of their bytes, so the same payload
/// always maps to the same cid, matching the collaborator contract. A
/// configurable failure budget lets tests exercise the retry paths.
#[derive(Default)]
pub struct MemoryContentStore {
    blobs: Arc<RwLock<HashMap<Cid, Vec<u8>>>>,
    failures_remaining: AtomicU32,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self {
            blobs: Arc::new(RwLock::new(HashMap::new())),
            failures_remaining: AtomicU32::new(0),
        }
    }

    /// Fail the next `n` operations with a transient error.
    pub fn with_failures(self, n: u32) -> Self {
        self.failures_remaining.store(n, Ordering::SeqCst);
        self
    }

    /// Arm the failure budget on an already-populated store.
    pub fn fail_next(&self, n: u32) {
        self.failures_remaining.store(n, Ordering::SeqCst);
    }

    pub async fn blob_count(&self) -> usize {
        self.blobs.read().await.len()
    }

    fn take_failure(&self) -> bool {
        self.failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn upload(&self, data: &[u8]) -> Result<Cid, SurfaceError> {
        if self.take_failure() {
            return Err(SurfaceError::Transient("simulated upload failure".into()));
        }
        let cid = Cid::from_bytes(data);
        self.blobs.write().await.insert(cid.clone(), data.to_vec());
        debug!(cid = cid.short(), bytes = data.len(), "Blob stored");
        Ok(cid)
    }

    async fn download(&self, cid: &Cid) -> Result<Vec<u8>, SurfaceError> {
        if self.take_failure() {
            return Err(SurfaceError::Transient("simulated download failure".into()));
        }
        self.blobs
            .read()
            .await
            .get(cid)
            .cloned()
            .ok_or_else(|| SurfaceError::NotFound(cid.to_string()))
    }
}
