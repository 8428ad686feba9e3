use rove_types::SurfaceError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProofError {
    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Upload failed after {attempts} attempts: {last}")]
    UploadFailed { attempts: u32, last: SurfaceError },
}

pub type Result<T> = std::result::Result<T, ProofError>;
