pub mod config;
pub mod verifier;

pub use config::{AuditConfig, MissingItemPolicy};
pub use verifier::{AuditVerifier, ItemVerdict};
