//! Request fingerprinting and the cache key layout.
//!
//! The fingerprint is a hash of `(method, path, sorted(query), body)` so it
//! is deterministic regardless of query-parameter map ordering. The
//! stored key always holds the full hex digest; only a `tracing` field
//! ever truncates it for log lines.

use sha2::{Digest, Sha256};

/// Computes the full-length request fingerprint. Query pairs are sorted by
/// key before hashing so `?a=1&b=2` and `?b=2&a=1` collide to one entry.
pub fn fingerprint(method: &str, path: &str, query: &[(String, String)], body: &[u8]) -> String {
    let mut sorted_query = query.to_vec();
    sorted_query.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

    let mut hasher = Sha256::new();
    hasher.update(method.as_bytes());
    hasher.update(b"\0");
    hasher.update(path.as_bytes());
    hasher.update(b"\0");
    for (k, v) in &sorted_query {
        hasher.update(k.as_bytes());
        hasher.update(b"=");
        hasher.update(v.as_bytes());
        hasher.update(b"&");
    }
    hasher.update(b"\0");
    hasher.update(body);
    format!("{:x}", hasher.finalize())
}

/// The literal cache key: `artifact:{artifact_id}:{kind}:{request_hash}`.
/// Never truncated.
pub fn cache_key(artifact_id: &str, kind: &str, request_hash: &str) -> String {
    format!("artifact:{artifact_id}:{kind}:{request_hash}")
}

/// The glob used for scoped invalidation: `artifact:{artifact_id}:{kind}:*`.
pub fn invalidation_prefix(artifact_id: &str, kind: &str) -> String {
    format!("artifact:{artifact_id}:{kind}:")
}

/// Shortens a hash for a `tracing` field; never use this for a stored key.
pub fn short_for_logging(hash: &str) -> &str {
    &hash[..hash.len().min(8)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_order_independent_over_query() {
        let a = fingerprint("GET", "/artifacts", &[("b".into(), "2".into()), ("a".into(), "1".into())], b"");
        let b = fingerprint("GET", "/artifacts", &[("a".into(), "1".into()), ("b".into(), "2".into())], b"");
        assert_eq!(a, b);
    }

    #[test]
    fn fingerprint_differs_by_body() {
        let a = fingerprint("POST", "/artifacts", &[], b"{}");
        let b = fingerprint("POST", "/artifacts", &[], b"{\"x\":1}");
        assert_ne!(a, b);
    }

    #[test]
    fn cache_key_matches_schema() {
        let key = cache_key("abc123", "model", "deadbeef");
        assert_eq!(key, "artifact:abc123:model:deadbeef");
        assert!(key.starts_with(&invalidation_prefix("abc123", "model")));
    }
}
