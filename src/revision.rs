//! Opaque revision tokens
//!
//! Every new instance of a versioned record (version config, alias, resource
//! policy) carries a freshly generated token. Callers echo the token back on
//! conditional updates; a mismatch is a `ResourceConflict`.

use rand::Rng;
use uuid::Uuid;

/// Generate a new random revision token.
///
/// Tokens are random (v4) UUIDs, e.g. `3f2b8c1e-5d4a-4e7f-9a10-2b3c4d5e6f70`.
#[must_use]
pub fn new_revision_id() -> String {
    Uuid::new_v4().to_string()
}

/// Generate a short random identifier (artifact ids, function URL ids).
#[must_use]
pub fn short_id(len: usize) -> String {
    const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| char::from(ALPHABET[rng.gen_range(0..ALPHABET.len())]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revision_id_format() {
        let id = new_revision_id();
        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts.len(), 5);
        assert_eq!(
            parts.iter().map(|p| p.len()).collect::<Vec<_>>(),
            vec![8, 4, 4, 4, 12]
        );
        assert!(parts[2].starts_with('4'));
        assert_eq!(Uuid::parse_str(&id).unwrap().get_version_num(), 4);
    }

    #[test]
    fn test_revision_ids_are_unique() {
        let ids: std::collections::HashSet<String> = (0..1000).map(|_| new_revision_id()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_short_id_alphabet() {
        let id = short_id(32);
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }
}
