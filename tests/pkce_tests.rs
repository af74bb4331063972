use std::sync::Arc;

use document_ai_viewer::api::pkce::{
    code_challenge_s256, DigestFunction, PkceGenerator, PkcePair, SecureRandomSource, Sha2Digest,
    CHALLENGE_METHOD,
};
use document_ai_viewer::ViewerError;

struct FixedRandom(u8);

impl SecureRandomSource for FixedRandom {
    fn fill(&self, dest: &mut [u8]) -> document_ai_viewer::Result<()> {
        dest.iter_mut().for_each(|b| *b = self.0);
        Ok(())
    }
}

struct NoRandom;

impl SecureRandomSource for NoRandom {
    fn fill(&self, _dest: &mut [u8]) -> document_ai_viewer::Result<()> {
        Err(ViewerError::CryptoUnavailable("no entropy source".into()))
    }
}

struct NoDigest;

impl DigestFunction for NoDigest {
    fn sha256(&self, _data: &[u8]) -> document_ai_viewer::Result<[u8; 32]> {
        Err(ViewerError::CryptoUnavailable("no subtle crypto".into()))
    }
}

#[test]
fn verifier_is_43_url_safe_chars() {
    let pair = PkceGenerator::default().generate().unwrap();
    assert_eq!(pair.verifier.len(), 43);
    assert!(pair
        .verifier
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    assert!(!pair.verifier.contains('='));
    assert!(!pair.challenge.contains('='));
    assert_eq!(pair.challenge.len(), 43);
    assert!(pair.is_consistent());
    assert_eq!(pair.method(), CHALLENGE_METHOD);
}

#[test]
fn challenge_is_deterministic() {
    let g = PkceGenerator::default();
    let pair = g.generate().unwrap();
    assert_eq!(g.challenge_for(&pair.verifier).unwrap(), pair.challenge);
    assert_eq!(code_challenge_s256(&pair.verifier), pair.challenge);
}

#[test]
fn independent_verifiers_differ() {
    let g = PkceGenerator::default();
    let a = g.generate().unwrap();
    let b = g.generate().unwrap();
    assert_ne!(a.verifier, b.verifier);
}

#[test]
fn fixed_bytes_give_fixed_verifier() {
    let g = PkceGenerator::new(Arc::new(FixedRandom(0xff)), Arc::new(Sha2Digest));
    let pair = g.generate().unwrap();
    // 0xff bytes hit the '_' slot of the URL-safe alphabet
    assert_eq!(pair.verifier, format!("{}8", "_".repeat(42)));
    assert!(pair.is_consistent());
}

#[test]
fn missing_random_source_is_surfaced() {
    let g = PkceGenerator::new(Arc::new(NoRandom), Arc::new(Sha2Digest));
    assert!(matches!(g.generate(), Err(ViewerError::CryptoUnavailable(_))));
}

#[test]
fn missing_digest_is_surfaced() {
    let g = PkceGenerator::new(Arc::new(FixedRandom(1)), Arc::new(NoDigest));
    assert!(matches!(g.generate(), Err(ViewerError::CryptoUnavailable(_))));
}

#[test]
fn stored_verifier_roundtrips_through_from_verifier() {
    let pair = PkceGenerator::default().generate().unwrap();
    let again = PkcePair::from_verifier(&pair.verifier).unwrap();
    assert_eq!(again, pair);
    assert!(matches!(PkcePair::from_verifier("short"), Err(ViewerError::InvalidVerifier(_))));
}
