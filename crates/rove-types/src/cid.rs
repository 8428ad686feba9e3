use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CidError {
    #[error("Invalid CID length: expected 64 hex chars, got {0}")]
    InvalidLength(usize),

    #[error("Invalid CID character at position {0}")]
    InvalidCharacter(usize),
}

/// Content identifier: lowercase hex SHA-256 of the uploaded bytes.
///
/// The content-addressable store guarantees the same bytes map to the
/// same cid, so a cid computed locally over downloaded bytes can be
/// checked against the advertised one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Cid(String);

/// Deserialization goes through `parse`, so a persisted record carrying a
/// malformed cid fails to load instead of producing an invalid `Cid`.
impl<'de> Deserialize<'de> for Cid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Cid::parse(&s).map_err(D::Error::custom)
    }
}

impl Cid {
    /// Validate and wrap an externally supplied cid string.
    pub fn parse(s: &str) -> Result<Self, CidError> {
        if s.len() != 64 {
            return Err(CidError::InvalidLength(s.len()));
        }
        if let Some(pos) = s.find(|c: char| !c.is_ascii_hexdigit() || c.is_ascii_uppercase()) {
            return Err(CidError::InvalidCharacter(pos));
        }
        Ok(Self(s.to_string()))
    }

    /// Compute the cid for a byte payload.
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short prefix form for log lines.
    pub fn short(&self) -> &str {
        self.0.get(..12).unwrap_or(&self.0)
    }
}

impl std::fmt::Display for Cid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cid_deterministic() {
        let a = Cid::from_bytes(b"some payload");
        let b = Cid::from_bytes(b"some payload");
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), 64);
    }

    #[test]
    fn test_cid_differs_for_different_bytes() {
        assert_ne!(Cid::from_bytes(b"a"), Cid::from_bytes(b"b"));
    }

    #[test]
    fn test_parse_round_trips_computed_cid() {
        let cid = Cid::from_bytes(b"payload");
        let parsed = Cid::parse(cid.as_str()).unwrap();
        assert_eq!(parsed, cid);
    }

    #[test]
    fn test_parse_rejects_bad_length() {
        assert_eq!(Cid::parse("abc123"), Err(CidError::InvalidLength(6)));
    }

    #[test]
    fn test_parse_rejects_non_hex() {
        let mut s = "0".repeat(63);
        s.push('g');
        assert!(matches!(Cid::parse(&s), Err(CidError::InvalidCharacter(63))));
    }

    #[test]
    fn test_parse_rejects_uppercase() {
        let s = "A".repeat(64);
        assert!(matches!(Cid::parse(&s), Err(CidError::InvalidCharacter(0))));
    }

    #[test]
    fn test_deserialize_validates() {
        let cid = Cid::from_bytes(b"payload");
        let json = serde_json::to_string(&cid).unwrap();
        let back: Cid = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cid);

        assert!(serde_json::from_str::<Cid>("\"abc\"").is_err());
        assert!(serde_json::from_str::<Cid>(&format!("\"{}\"", "G".repeat(64))).is_err());
    }

    #[test]
    fn test_short_prefix() {
        let cid = Cid::from_bytes(b"x");
        assert_eq!(cid.short().len(), 12);
        assert!(cid.as_str().starts_with(cid.short()));
    }
}
