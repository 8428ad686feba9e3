use serde::de::Error as DeError;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Salted tamper-evidence digest over an artifact's content and round.
///
/// The salt is drawn fresh every time a fingerprint is produced, so two
/// fingerprints over identical content in the same round differ. Digest
/// equality therefore means nothing across artifacts; callers that need
/// content equality compare the raw content instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fingerprint {
    pub salt: [u8; 16],
    pub digest: [u8; 32],
}

impl Fingerprint {
    pub fn salt_hex(&self) -> String {
        hex::encode(self.salt)
    }

    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest)
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut st = serializer.serialize_struct("Fingerprint", 2)?;
        st.serialize_field("salt", &self.salt_hex())?;
        st.serialize_field("digest", &self.digest_hex())?;
        st.end()
    }
}

impl<'de> Deserialize<'de> for Fingerprint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw {
            salt: String,
            digest: String,
        }
        let raw = Raw::deserialize(deserializer)?;
        Ok(Fingerprint {
            salt: decode_fixed(&raw.salt).map_err(D::Error::custom)?,
            digest: decode_fixed(&raw.digest).map_err(D::Error::custom)?,
        })
    }
}

fn decode_fixed<const N: usize>(s: &str) -> Result<[u8; N], String> {
    let bytes = hex::decode(s).map_err(|e| format!("invalid hex: {}", e))?;
    if bytes.len() != N {
        return Err(format!("expected {} bytes, got {}", N, bytes.len()));
    }
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes);
    Ok(out)
}
