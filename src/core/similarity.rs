use crate::core::hash::Fingerprint;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Fingerprint length mismatch: {left} bits vs {right} bits")]
pub struct LengthMismatchError {
    pub left: usize,
    pub right: usize,
}

/// Count the bit positions where `a` and `b` differ.
pub fn hamming_distance(a: &Fingerprint, b: &Fingerprint) -> Result<u32, LengthMismatchError> {
    if a.len() != b.len() {
        return Err(LengthMismatchError {
            left: a.len(),
            right: b.len(),
        });
    }

    Ok(a.as_bytes()
        .iter()
        .zip(b.as_bytes())
        .map(|(x, y)| (x ^ y).count_ones())
        .sum())
}

/// Whether `a` and `b` are close enough to count as the same picture.
pub fn are_duplicates(
    a: &Fingerprint,
    b: &Fingerprint,
    tolerance: u32,
) -> Result<bool, LengthMismatchError> {
    Ok(hamming_distance(a, b)? <= tolerance)
}
