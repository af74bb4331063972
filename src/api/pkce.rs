// PKCE (RFC 7636) S256 verifier/challenge generation
use crate::error::{Result, ViewerError};
use base64::{engine::general_purpose, Engine as _};
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::sync::Arc;

/// Only challenge method we emit.
pub const CHALLENGE_METHOD: &str = "S256";

/// Random bytes drawn per verifier; encodes to 43 characters.
pub const VERIFIER_BYTES: usize = 32;

pub const MIN_VERIFIER_LEN: usize = 43;
pub const MAX_VERIFIER_LEN: usize = 128;

/// Source of cryptographically secure random bytes.
pub trait SecureRandomSource: Send + Sync {
    fn fill(&self, dest: &mut [u8]) -> Result<()>;
}

/// SHA-256 primitive.
pub trait DigestFunction: Send + Sync {
    fn sha256(&self, data: &[u8]) -> Result<[u8; 32]>;
}

/// Operating system RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsRandom;

impl SecureRandomSource for OsRandom {
    fn fill(&self, dest: &mut [u8]) -> Result<()> {
        rand::rngs::OsRng
            .try_fill_bytes(dest)
            .map_err(|e| ViewerError::CryptoUnavailable(format!("os random source: {}", e)))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Sha2Digest;

impl DigestFunction for Sha2Digest {
    fn sha256(&self, data: &[u8]) -> Result<[u8; 32]> {
        Ok(Sha256::digest(data).into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PkcePair {
    pub verifier: String,
    pub challenge: String,
}

impl PkcePair {
    /// Rebuild a pair from a stored verifier, validating it first.
    pub fn from_verifier(verifier: &str) -> Result<Self> {
        validate_verifier(verifier)?;
        Ok(Self {
            verifier: verifier.to_string(),
            challenge: code_challenge_s256(verifier),
        })
    }

    pub fn method(&self) -> &'static str {
        CHALLENGE_METHOD
    }

    pub fn is_consistent(&self) -> bool {
        code_challenge_s256(&self.verifier) == self.challenge
    }
}

/// Verifier/challenge generator over injectable primitives.
#[derive(Clone)]
pub struct PkceGenerator {
    random: Arc<dyn SecureRandomSource>,
    digest: Arc<dyn DigestFunction>,
}

impl Default for PkceGenerator {
    fn default() -> Self {
        Self::new(Arc::new(OsRandom), Arc::new(Sha2Digest))
    }
}

impl PkceGenerator {
    pub fn new(random: Arc<dyn SecureRandomSource>, digest: Arc<dyn DigestFunction>) -> Self {
        Self { random, digest }
    }

    pub fn generate(&self) -> Result<PkcePair> {
        let mut bytes = [0u8; VERIFIER_BYTES];
        self.random.fill(&mut bytes)?;
        let verifier = general_purpose::URL_SAFE_NO_PAD.encode(bytes);
        let challenge = self.challenge_for(&verifier)?;
        Ok(PkcePair { verifier, challenge })
    }

    pub fn challenge_for(&self, verifier: &str) -> Result<String> {
        let hash = self.digest.sha256(verifier.as_bytes())?;
        Ok(general_purpose::URL_SAFE_NO_PAD.encode(hash))
    }
}

pub fn code_challenge_s256(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    general_purpose::URL_SAFE_NO_PAD.encode(hash)
}

/// 43..=128 characters from the unreserved set `[A-Za-z0-9-._~]`.
pub fn validate_verifier(verifier: &str) -> Result<()> {
    let len = verifier.len();
    if !(MIN_VERIFIER_LEN..=MAX_VERIFIER_LEN).contains(&len) {
        return Err(ViewerError::InvalidVerifier(format!(
            "length {} outside {}..={}",
            len, MIN_VERIFIER_LEN, MAX_VERIFIER_LEN
        )));
    }
    if let Some(c) = verifier
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~')))
    {
        return Err(ViewerError::InvalidVerifier(format!("character '{}' not allowed", c)));
    }
    Ok(())
}
