//! Short deterministic digests of arbitrary text.
//!
//! Fingerprints seed the scope tokens embedded into generated CSS selectors,
//! so their alphabet is restricted to characters that are valid inside an
//! identifier or a file name.

use std::collections::HashMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};

/// Number of characters kept from the encoded digest.
pub const FINGERPRINT_LEN: usize = 8;

/// Computes and memoizes SHA-256 based fingerprints.
///
/// Each distinct input is hashed at most once for the lifetime of the
/// `Fingerprinter`. Scope tokens only need to be unique within one build's
/// file set, so the truncated digest is sufficient.
#[derive(Debug, Default)]
pub struct Fingerprinter {
    memo: Mutex<HashMap<String, String>>,
}

impl Fingerprinter {
    /// Creates a fingerprinter with an empty memo.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the fingerprint of `text`.
    pub fn fingerprint(&self, text: &str) -> String {
        if let Some(hit) = self.memo.lock().get(text) {
            return hit.clone();
        }
        let token = compute(text);
        self.memo.lock().insert(text.to_string(), token.clone());
        token
    }

    /// Returns the number of distinct inputs fingerprinted so far.
    pub fn memoized(&self) -> usize {
        self.memo.lock().len()
    }
}

fn compute(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    STANDARD
        .encode(digest)
        .chars()
        .filter(|c| *c != '=')
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .take(FINGERPRINT_LEN)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic() {
        let fp = Fingerprinter::new();
        let a = fp.fingerprint("components/button/index.html");
        let b = fp.fingerprint("components/button/index.html");
        assert_eq!(a, b);
        assert_eq!(a, compute("components/button/index.html"));
    }

    #[test]
    fn different_inputs_differ() {
        let fp = Fingerprinter::new();
        assert_ne!(fp.fingerprint("a.html"), fp.fingerprint("b.html"));
    }

    #[test]
    fn fixed_length_and_safe_alphabet() {
        let fp = Fingerprinter::new();
        for input in ["", "x", "components/card/card.html", "ünïcødé/path"] {
            let token = fp.fingerprint(input);
            assert_eq!(token.len(), FINGERPRINT_LEN);
            assert!(
                token
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'),
                "unsafe character in {token}"
            );
        }
    }

    #[test]
    fn memoizes_per_distinct_input() {
        let fp = Fingerprinter::new();
        fp.fingerprint("one");
        fp.fingerprint("one");
        fp.fingerprint("two");
        assert_eq!(fp.memoized(), 2);
    }

    #[test]
    fn known_digest_prefix() {
        // sha256("") = 47DEQpj8HBSa+/TImW+5JCeuQeRkm5NMpJWZG3hSuFU=
        assert_eq!(compute(""), "47DEQpj8");
        // sha256("abc") = ungWv48Bz+pBQUDeXa4iI7ADYaOWF3qctBD/YfIAFa0=
        assert_eq!(compute("abc"), "ungWv48B");
    }
}
