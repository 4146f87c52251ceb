//! Cheap change detection between two fetched sequences.
//!
//! Sequences are sorted newest first, so fresh data shows up at the head.
//! Only the length and the first [`HEAD_LEN`] elements are compared. A change
//! deeper in an equal-length sequence goes unnoticed until the head moves.

/// Number of leading elements compared.
pub const HEAD_LEN: usize = 3;

/// Whether `new` should replace `previous`.
///
/// True when there is no previous sequence, the lengths differ, or any of
/// the first [`HEAD_LEN`] elements differ.
pub fn has_data_changed<T: PartialEq>(new: &[T], previous: Option<&[T]>) -> bool {
    // ---
    let Some(previous) = previous else {
        return true;
    };

    if new.len() != previous.len() {
        return true;
    }

    new.iter()
        .zip(previous)
        .take(HEAD_LEN)
        .any(|(fresh, held)| fresh != held)
}
