//! Fragment fingerprints for cache addressing and invalidation.

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use std::fmt;

/// A 160-bit SHA-1 fingerprint identifying one cached fragment.
///
/// The fingerprint is derived from the model cache key, the canonical view
/// identifier, and the modification times of the view and every tracked
/// dependency. Two fragments with the same `Fingerprint` are assumed to
/// render identically, so a stored fragment can be replayed in place of a
/// render. The persisted key format is the 40-character lowercase hex digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint([u8; 20]);

impl Fingerprint {
    /// Computes a fingerprint as the SHA-1 digest of the given bytes.
    pub fn digest(data: &[u8]) -> Self {
        let mut hasher = Sha1::new();
        hasher.update(data);
        Self(hasher.finalize().into())
    }

    /// Returns the raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({:02x}{:02x}..)", self.0[0], self.0[1])
    }
}
