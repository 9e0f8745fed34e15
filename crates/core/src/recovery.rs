//! Single-use account recovery codes.
//!
//! Codes are formatted `XXXX-XXXX-XXXX` over an alphabet that excludes the
//! easily-confused characters `0`, `O`, `I`, and `1`, since users read them
//! off paper. Hashing and storage live in the api/db crates; this module
//! only generates and normalizes the plaintext form.

use std::collections::HashSet;

use rand::Rng;

/// 32-character alphabet: digits and uppercase letters minus 0/O/I/1.
const ALPHABET: &[u8] = b"23456789ABCDEFGHJKLMNPQRSTUVWXYZ";

/// Number of random characters per code (excluding dashes).
const CODE_LEN: usize = 12;

/// Generate one recovery code in `XXXX-XXXX-XXXX` form.
pub fn generate_recovery_code() -> String {
    let mut rng = rand::rng();
    let mut code = String::with_capacity(CODE_LEN + 2);

    for i in 0..CODE_LEN {
        if i > 0 && i % 4 == 0 {
            code.push('-');
        }
        let idx = rng.random_range(0..ALPHABET.len());
        code.push(ALPHABET[idx] as char);
    }

    code
}

/// Generate `count` distinct recovery codes.
pub fn generate_recovery_codes(count: usize) -> Vec<String> {
    let mut codes = HashSet::with_capacity(count);
    while codes.len() < count {
        codes.insert(generate_recovery_code());
    }
    codes.into_iter().collect()
}

/// Normalize user input for hashing/comparison: strip dashes and uppercase.
pub fn normalize_recovery_code(code: &str) -> String {
    code.chars()
        .filter(|c| *c != '-')
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_format() {
        let code = generate_recovery_code();
        assert_eq!(code.len(), 14, "12 chars + 2 dashes");
        let groups: Vec<&str> = code.split('-').collect();
        assert_eq!(groups.len(), 3);
        assert!(groups.iter().all(|g| g.len() == 4));
    }

    #[test]
    fn test_code_uses_unambiguous_alphabet() {
        for _ in 0..50 {
            let code = generate_recovery_code();
            for c in code.chars().filter(|c| *c != '-') {
                assert!(
                    ALPHABET.contains(&(c as u8)),
                    "unexpected character {c:?} in {code}"
                );
            }
        }
    }

    #[test]
    fn test_generated_codes_are_distinct() {
        let codes = generate_recovery_codes(10);
        assert_eq!(codes.len(), 10);
        let unique: HashSet<&String> = codes.iter().collect();
        assert_eq!(unique.len(), 10);
    }

    #[test]
    fn test_normalize_strips_dashes_and_uppercases() {
        assert_eq!(normalize_recovery_code("ab2c-DE3F-gh4j"), "AB2CDE3FGH4J");
        assert_eq!(normalize_recovery_code("AB2CDE3FGH4J"), "AB2CDE3FGH4J");
    }
}
