// Copyright (c) 2026 MindEase Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Double Anonymization
//!
//! User identifiers are hashed twice before they reach storage:
//!
//! 1. **Caller stage** ([`hash_caller_identity`]): the chat/voice client turns
//!    its raw user id into `hex(sha256("mindease/caller/v1" || 0x00 || raw))[..16]`.
//!    The engine never sees the raw id.
//! 2. **Ingestion stage** ([`IdentityHasher::rehash`]): the engine hashes the
//!    caller value again with its own versioned salt, producing
//!    `"<version>:" + hex(sha256(salt || 0x00 || caller_hash))`.
//!
//! Only the stage-two value is stored, and only the crisis gate may emit it.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::config::IdentityConfig;
use crate::domain::error::EngineError;

/// Salt used by clients for the first hashing stage.
pub const CALLER_SALT_V1: &str = "mindease/caller/v1";

/// Length of the caller-stage hash in hex characters.
pub const CALLER_HASH_LEN: usize = 16;

fn salted_sha256(salt: &str, value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update([0u8]);
    hasher.update(value.as_bytes());
    hex::encode(hasher.finalize())
}

/// Stage one, run by the client before calling `ingest`.
pub fn hash_caller_identity(raw_user_id: &str) -> String {
    let mut digest = salted_sha256(CALLER_SALT_V1, raw_user_id);
    digest.truncate(CALLER_HASH_LEN);
    digest
}

/// Stored, twice-hashed user identifier.
///
/// `Debug` is redacted so the value cannot leak through logs by accident.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HashedUserId(String);

impl HashedUserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Salt version prefix, e.g. `"v1"`.
    pub fn version(&self) -> Option<&str> {
        self.0.split_once(':').map(|(version, _)| version)
    }
}

impl fmt::Debug for HashedUserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HashedUserId(<redacted>)")
    }
}

/// Second hashing stage, applied on ingestion and on erasure lookups.
#[derive(Clone)]
pub struct IdentityHasher {
    version: String,
    salt: String,
}

impl IdentityHasher {
    pub fn new(version: impl Into<String>, salt: impl Into<String>) -> Result<Self, EngineError> {
        let version = version.into();
        let salt = salt.into();

        if version.is_empty() || version.contains(':') {
            return Err(EngineError::InvalidInput(
                "identity salt version must be non-empty and must not contain ':'".to_string(),
            ));
        }
        if salt.is_empty() {
            return Err(EngineError::InvalidInput("identity salt cannot be empty".to_string()));
        }

        Ok(Self { version, salt })
    }

    pub fn from_config(config: &IdentityConfig) -> Result<Self, EngineError> {
        Self::new(config.salt_version.clone(), config.salt.clone())
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn rehash(&self, caller_hash: &str) -> HashedUserId {
        HashedUserId(format!(
            "{}:{}",
            self.version,
            salted_sha256(&self.salt, caller_hash)
        ))
    }
}

impl fmt::Debug for IdentityHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityHasher")
            .field("version", &self.version)
            .field("salt", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caller_hash_is_stable_and_short() {
        let a = hash_caller_identity("eng_user_001");
        let b = hash_caller_identity("eng_user_001");
        assert_eq!(a, b);
        assert_eq!(a.len(), CALLER_HASH_LEN);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, hash_caller_identity("eng_user_002"));
    }

    #[test]
    fn test_rehash_is_versioned_and_salt_dependent() {
        let v1 = IdentityHasher::new("v1", "pepper-one").unwrap();
        let v2 = IdentityHasher::new("v2", "pepper-two").unwrap();
        let caller = hash_caller_identity("arts_user_007");

        let stored = v1.rehash(&caller);
        assert_eq!(stored.version(), Some("v1"));
        assert_eq!(stored.as_str().len(), "v1:".len() + 64);
        assert_eq!(stored, v1.rehash(&caller));
        assert_ne!(stored, v2.rehash(&caller));
        assert!(!stored.as_str().contains(&caller));
    }

    #[test]
    fn test_debug_is_redacted() {
        let hasher = IdentityHasher::new("v1", "secret-salt").unwrap();
        let stored = hasher.rehash("abcdef0123456789");
        assert_eq!(format!("{:?}", stored), "HashedUserId(<redacted>)");
        assert!(!format!("{:?}", hasher).contains("secret-salt"));
    }

    #[test]
    fn test_rejects_bad_salt_config() {
        assert!(IdentityHasher::new("", "salt").is_err());
        assert!(IdentityHasher::new("v:1", "salt").is_err());
        assert!(IdentityHasher::new("v1", "").is_err());
    }
}
