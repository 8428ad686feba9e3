pub mod composer;
pub mod config;
pub mod context;
pub mod local;
pub mod node;
pub mod orchestrator;

pub use composer::{ComposerConfig, ReplyComposer};
pub use config::{credentials_from_env, NodeConfig};
pub use context::NodeContext;
pub use orchestrator::{NodeError, RoundOrchestrator};
