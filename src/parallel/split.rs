//! Even partitioning of an index range for worker fan-out.

/// Split `total` items into at most `parts` contiguous `[start, end)` ranges,
/// front-loading the remainder so no range differs in size by more than one.
pub fn split_even(total: usize, parts: usize) -> Vec<(usize, usize)> {
    if total == 0 || parts == 0 {
        return Vec::new();
    }
    let parts = parts.min(total);
    let base = total / parts;
    let remainder = total % parts;
    let mut ranges = Vec::with_capacity(parts);
    let mut start = 0;
    for part in 0..parts {
        let size = base + usize::from(part < remainder);
        ranges.push((start, start + size));
        start += size;
    }
    ranges
}
