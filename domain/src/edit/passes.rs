//! Splitting edit actions into sequential passes.

/// Split `items` into `min(passes, len)` contiguous chunks.
///
/// Chunk sizes differ by at most one, earlier chunks taking the extra items.
/// A pass count of zero is treated as one. Empty input yields no chunks.
pub fn chunk_actions<T>(items: &[T], passes: usize) -> Vec<&[T]> {
    if items.is_empty() {
        return Vec::new();
    }

    let count = passes.clamp(1, items.len());
    let base = items.len() / count;
    let extra = items.len() % count;

    let mut chunks = Vec::with_capacity(count);
    let mut start = 0;
    for i in 0..count {
        let size = base + usize::from(i < extra);
        chunks.push(&items[start..start + size]);
        start += size;
    }
    chunks
}
