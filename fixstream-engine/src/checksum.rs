/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Content identity of an engine configuration.

use sha2::{Digest, Sha256};
use std::fmt;

/// SHA-256 of a configuration file's raw bytes.
///
/// Two files with byte-identical content have the same checksum regardless of
/// where they live on disk.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConfigChecksum([u8; 32]);

impl ConfigChecksum {
    /// Hashes raw configuration bytes.
    #[must_use]
    pub fn of(bytes: &[u8]) -> Self {
        Self(Sha256::digest(bytes).into())
    }

    /// Returns the digest bytes.
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for ConfigChecksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for ConfigChecksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConfigChecksum({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_of_empty_input() {
        assert_eq!(
            ConfigChecksum::of(b"").to_string(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_checksum_identity() {
        let a = ConfigChecksum::of(b"[DEFAULT]\nFileStorePath=store\n");
        let b = ConfigChecksum::of(b"[DEFAULT]\nFileStorePath=store\n");
        let c = ConfigChecksum::of(b"[DEFAULT]\nFileStorePath=stora\n");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.as_bytes().len(), 32);
    }
}
