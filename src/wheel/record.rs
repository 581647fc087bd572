//! RECORD file generation.
//!
//! Each line is `path,sha256=<digest>,<size>` with the digest in URL-safe
//! base64 without padding. RECORD lists itself with empty hash and size.

use base64::Engine;
use sha2::{Digest, Sha256};

/// URL-safe, unpadded base64 SHA-256 of `data`.
pub fn digest(data: &[u8]) -> String {
    let hash = Sha256::digest(data);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(hash)
}

/// Render RECORD for `entries` (name, content), listing `record_name` last.
pub fn render<'a>(entries: impl IntoIterator<Item = (&'a str, &'a [u8])>, record_name: &str) -> String {
    let mut out = String::new();
    for (name, data) in entries {
        out.push_str(&format!("{},sha256={},{}\n", name, digest(data), data.len()));
    }
    out.push_str(&format!("{record_name},,\n"));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_urlsafe_unpadded() {
        // sha256("") = e3b0c442...b855
        assert_eq!(digest(b""), "47DEQpj8HBSa-_TImW-5JCeuQeRkm5NMpJWZG3hSuFU");
    }

    #[test]
    fn record_lists_itself_last() {
        let record = render(
            [("pkg/a", b"abc".as_slice())],
            "pkg-1.0.dist-info/RECORD",
        );
        let lines: Vec<&str> = record.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("pkg/a,sha256="));
        assert!(lines[0].ends_with(",3"));
        assert_eq!(lines[1], "pkg-1.0.dist-info/RECORD,,");
    }
}
