use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Truncate an entity label to a fixed character budget for on-canvas text.
pub fn truncate_label(label: &str, budget: usize) -> &str {
    match label.char_indices().nth(budget) {
        Some((cut, _)) => &label[..cut],
        None => label,
    }
}

/// Deterministic point in [-1, 1]^2 derived from a seed and a node id.
///
/// The same (seed, id) pair always hashes to the same point, so a snapshot
/// re-initialized with identical input reproduces its initial placement.
pub fn seeded_pair(seed: u64, id: &str) -> (f32, f32) {
    let mut hasher = DefaultHasher::new();
    seed.hash(&mut hasher);
    id.hash(&mut hasher);
    let hash = hasher.finish();

    let x = ((hash & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    let y = (((hash >> 32) & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    ((x * 2.0) - 1.0, (y * 2.0) - 1.0)
}
