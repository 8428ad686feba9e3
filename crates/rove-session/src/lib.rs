pub mod error;
pub mod limiter;
pub mod machine;

pub use error::{FatalReason, Result, SessionError};
pub use limiter::{ActionRateLimiter, DEFAULT_MAX_COOLDOWN, DEFAULT_MIN_COOLDOWN};
pub use machine::{SessionConfig, SessionManager, SessionStatus};
