pub mod cas;
pub mod error;
pub mod file;
pub mod memory;
pub mod publisher;
pub mod store;

pub use cas::MemoryContentStore;
pub use error::{ProofError, Result};
pub use file::JsonFileStore;
pub use memory::MemoryProofStore;
pub use publisher::ProofPublisher;
pub use store::ProofStoreBackend;
