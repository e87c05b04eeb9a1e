//! Mock document pinning service.
//!
//! Generates `Qm`-prefixed identifiers with the shape of an IPFS CIDv0 and a
//! public gateway URL. No content addressing happens; the identifier is
//! random, matching the upstream simulation.

use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Serialize;

const GATEWAY_BASE: &str = "https://ipfs.io/ipfs";
const CID_SUFFIX_LEN: usize = 44;

#[derive(Clone, Debug, Serialize)]
pub struct PinnedFile {
    pub hash: String,
    pub url: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct FileLocation {
    pub exists: bool,
    pub url: String,
}

/// "Pin" a file: mint a random content id and its gateway URL.
pub fn pin() -> PinnedFile {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(CID_SUFFIX_LEN)
        .map(char::from)
        .collect();
    let hash = format!("Qm{}", suffix);
    let url = format!("{}/{}", GATEWAY_BASE, hash);
    PinnedFile { hash, url }
}

/// The mock store reports every hash as present behind the gateway.
pub fn locate(hash: &str) -> FileLocation {
    FileLocation { exists: true, url: format!("{}/{}", GATEWAY_BASE, hash) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pinned_hash_has_cid_shape() {
        let pinned = pin();
        assert!(pinned.hash.starts_with("Qm"));
        assert_eq!(pinned.hash.len(), 2 + CID_SUFFIX_LEN);
        assert!(pinned.hash.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_eq!(pinned.url, format!("https://ipfs.io/ipfs/{}", pinned.hash));
    }

    #[test]
    fn pins_are_not_repeated() {
        // Random ids; a collision here would mean the generator is broken
        assert_ne!(pin().hash, pin().hash);
    }

    #[test]
    fn locate_always_resolves() {
        let loc = locate("QmNkWk8v8z4J7Y6t5r4e3w2q1p9o8i7u6y5t4r3e2w1q");
        assert!(loc.exists);
        assert!(loc.url.ends_with("QmNkWk8v8z4J7Y6t5r4e3w2q1p9o8i7u6y5t4r3e2w1q"));
    }
}
