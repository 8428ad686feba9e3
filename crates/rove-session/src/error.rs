use rove_proofs::ProofError;
use thiserror::Error;

/// Why the session reached the terminal failure state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatalReason {
    /// The surface rejected the configured credentials
    CredentialsRejected,

    /// A secondary verification challenge could not be satisfied
    UnrecoverableChallenge,

    /// All authentication attempts failed transiently
    RetriesExhausted,
}

impl std::fmt::Display for FatalReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FatalReason::CredentialsRejected => write!(f, "credentials rejected"),
            FatalReason::UnrecoverableChallenge => write!(f, "unrecoverable verification challenge"),
            FatalReason::RetriesExhausted => write!(f, "authentication retries exhausted"),
        }
    }
}

#[derive(Error, Debug)]
pub enum SessionError {
    /// Unrecoverable credential failure. The node cannot produce meaningful
    /// rounds without a session, so the outermost layer should terminate
    /// the process; the state machine itself never exits.
    #[error("Fatal session failure: {0}")]
    Fatal(FatalReason),

    #[error("Proof store error: {0}")]
    Store(#[from] ProofError),
}

pub type Result<T> = std::result::Result<T, SessionError>;
