//! Content-derived identities for decision alternatives.

use std::fmt::{Display, Formatter};

use sha3::{Digest, Keccak256};

use crate::constant::SHORT_IDENTITY_BYTES;

/// The identity of a decision alternative: the Keccak-256 digest of its
/// canonical form.
///
/// Two alternatives constructed independently from the same canonical form
/// have the same identity, and are interchangeable.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Identity([u8; 32]);

impl Identity {
    /// Computes the identity of the alternative whose canonical form is
    /// `canonical`.
    #[must_use]
    pub fn of(canonical: &str) -> Self {
        let mut hasher = Keccak256::new();
        hasher.update(canonical.as_bytes());
        let mut digest = [0u8; 32];
        digest.copy_from_slice(&hasher.finalize());
        Self(digest)
    }

    /// Gets the bytes of the digest.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Gets an abbreviated hexadecimal rendering of the identity for use in
    /// logs.
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..SHORT_IDENTITY_BYTES])
    }
}

impl Display for Identity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}
