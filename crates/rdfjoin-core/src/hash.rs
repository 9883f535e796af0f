//! Hash functions for join keys.
//!
//! Both functions are pure and deterministic; probe phases rely on hashing
//! the same key to the same bucket on every call. Bucket hits are only
//! candidates: callers must re-check true key equality to rule out
//! collisions.

/// Hash an integer join key with an xorshift mix.
pub fn hash_key(key: u64) -> u64 {
    let mut a = key;
    a ^= a << 13;
    a ^= a >> 17;
    a ^= a << 5;
    a
}

/// Hash a string with the SDBM rolling hash.
pub fn hash_str(s: &str) -> u64 {
    let mut hash: u64 = 0;
    for b in s.bytes() {
        hash = (b as u64)
            .wrapping_add(hash << 6)
            .wrapping_add(hash << 16)
            .wrapping_sub(hash);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_hash_is_deterministic() {
        assert_eq!(hash_key(42), hash_key(42));
        assert_ne!(hash_key(42), hash_key(43));
    }

    #[test]
    fn integer_hash_preserves_zero() {
        // xorshift maps 0 to 0; key 0 never appears because dictionary
        // keys start at 1 and subjects are dense ids
        assert_eq!(hash_key(0), 0);
    }

    #[test]
    fn string_hash_is_deterministic() {
        assert_eq!(hash_str("wsdbm:likes"), hash_str("wsdbm:likes"));
        assert_ne!(hash_str("wsdbm:likes"), hash_str("wsdbm:follows"));
        assert_eq!(hash_str(""), 0);
    }
}
