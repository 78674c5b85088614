//! Reversible fixed-width transform applied to numeric identifiers before
//! they are used as keys in the identity directory.
//!
//! The first two and last two characters swap places around an untouched
//! middle: `12345678` becomes `78345612`. Strings shorter than four
//! characters pass through unchanged. The transform is its own inverse.

/// Number of characters swapped at each end.
const EDGE: usize = 2;

/// Transform an identifier into its stored form.
pub fn encrypt(id: &str) -> String {
    swap_edges(id)
}

/// Recover an identifier from its stored form.
pub fn decrypt(stored: &str) -> String {
    swap_edges(stored)
}

fn swap_edges(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() < EDGE * 2 {
        return value.to_string();
    }

    let (head, rest) = chars.split_at(EDGE);
    let (middle, tail) = rest.split_at(rest.len() - EDGE);
    tail.iter().chain(middle).chain(head).collect()
}
