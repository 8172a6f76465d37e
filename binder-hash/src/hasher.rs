//! Polynomial path hash
//!
//! Every entry in a BHD header is keyed by a rolling polynomial hash of its
//! normalized archive path. Early generations use 32-bit hashes with prime
//! 37; Elden Ring and later use 64-bit hashes with prime 133.

const PRIME_32: u32 = 37;
const PRIME_64: u64 = 133;

/// Normalise an archive path for hashing.
///
/// Surrounding whitespace is trimmed, backslashes become forward slashes,
/// ASCII letters are lowercased and a leading `/` is ensured.
pub fn normalize_path(path: &str) -> String {
    let mut normalized = path.trim().replace('\\', "/");
    normalized.make_ascii_lowercase();
    if !normalized.starts_with('/') {
        normalized.insert(0, '/');
    }
    normalized
}

/// Hash a path with the selected bit width.
///
/// The root slash seeds the accumulator at 1; every following byte folds in
/// as `h * prime + byte`. 32-bit hashes wrap in 32-bit arithmetic and are
/// returned zero-extended.
pub fn hash_path(path: &str, bit64: bool) -> u64 {
    let normalized = normalize_path(path);
    let bytes = &normalized.as_bytes()[1..];
    if bit64 {
        bytes
            .iter()
            .fold(1u64, |h, &c| h.wrapping_mul(PRIME_64).wrapping_add(c as u64))
    } else {
        bytes
            .iter()
            .fold(1u32, |h, &c| h.wrapping_mul(PRIME_32).wrapping_add(c as u32))
            as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_letter_vectors() {
        assert_eq!(hash_path("/a", false), 37 + 97);
        assert_eq!(hash_path("/a", true), 133 + 97);
    }

    #[test]
    fn test_normalization_equivalence() {
        for bit64 in [false, true] {
            let canonical = hash_path("/a/b", bit64);
            assert_eq!(hash_path("A\\B", bit64), canonical);
            assert_eq!(hash_path("  /A/B  ", bit64), canonical);
            assert_eq!(hash_path("a/b", bit64), canonical);
        }
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("  CHR\\c0000.BND  "), "/chr/c0000.bnd");
        assert_eq!(normalize_path("/already/fine"), "/already/fine");
        assert_eq!(normalize_path(""), "/");
    }

    #[test]
    fn test_widths_disagree() {
        let path = "/map/m10_00_00_00.msb";
        assert_ne!(hash_path(path, false), hash_path(path, true));
    }

    #[test]
    fn test_wrapping_on_long_paths() {
        // Long enough to overflow both widths several times over.
        let path = format!("/{}", "x".repeat(64));
        let h32 = hash_path(&path, false);
        assert!(h32 <= u32::MAX as u64);
        // Deterministic across calls.
        assert_eq!(h32, hash_path(&path, false));
        assert_eq!(hash_path(&path, true), hash_path(&path, true));
    }
}
