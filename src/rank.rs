//! Competition-ranking primitive
//!
//! Assigns dense ranks over a sequence already sorted by the rule's
//! comparison key, using a binary tie predicate: tied elements share a
//! rank, and the next distinct element takes its 1-based position, so two
//! rank-1 ties are followed by rank 3.

/// Rank a sorted sequence with standard competition ranking
///
/// The predicate must be consistent with the upstream sort key; rank
/// assignment over an inconsistently sorted sequence is undefined.
pub fn ranked<T, F>(items: impl IntoIterator<Item = T>, tied: F) -> Vec<(usize, T)>
where
    F: Fn(&T, &T) -> bool,
{
    let mut out: Vec<(usize, T)> = Vec::new();
    for (position, item) in items.into_iter().enumerate() {
        let rank = match out.last() {
            Some((prev_rank, prev)) if tied(prev, &item) => *prev_rank,
            _ => position + 1,
        };
        out.push((rank, item));
    }
    out
}
