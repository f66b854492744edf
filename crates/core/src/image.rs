use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Where a bitmap came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ImageSource {
    Camera,
    Library,
}

impl std::fmt::Display for ImageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageSource::Camera => write!(f, "camera"),
            ImageSource::Library => write!(f, "library"),
        }
    }
}

impl std::str::FromStr for ImageSource {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "camera" => Ok(ImageSource::Camera),
            "library" => Ok(ImageSource::Library),
            other => Err(format!("Unknown image source: '{other}'")),
        }
    }
}

/// One captured or selected photo. The session holds at most one of these
/// at a time and replaces it wholesale on every acquisition.
#[derive(Debug, Clone)]
pub struct AcquiredImage {
    /// Encoded bytes exactly as the picker handed them over (PNG, JPEG, ...).
    pub bytes: Vec<u8>,
    /// SHA-256 hex of `bytes`. Stage results carry this tag so completions
    /// computed from a replaced image can be recognized and dropped.
    pub fingerprint: String,
    pub source: ImageSource,
    pub acquired_at: DateTime<Utc>,
}

impl AcquiredImage {
    pub fn new(bytes: Vec<u8>, source: ImageSource) -> Self {
        let fingerprint = fingerprint_hex(&bytes);
        Self {
            bytes,
            fingerprint,
            source,
            acquired_at: Utc::now(),
        }
    }
}

/// The result of one picker round trip. Dismissing the picker is not an
/// error; it yields `Cancelled` and leaves all prior state untouched.
#[derive(Debug, Clone)]
pub enum Acquisition {
    Image(AcquiredImage),
    Cancelled,
}

/// SHA-256 of a byte slice as a lowercase 64-char hex string.
pub fn fingerprint_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let digest: [u8; 32] = hasher.finalize().into();
    digest.iter().map(|b| format!("{b:02x}")).collect()
}
