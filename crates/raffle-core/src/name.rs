//! Name normalization for duplicate detection.

/// Returns the comparison key for a participant name.
///
/// Two names are the same participant iff their keys are equal.
#[must_use]
pub fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}
