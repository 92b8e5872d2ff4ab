//! Splitting oversized row sets into chunks.
//!
//! A row set larger than the threshold is split into contiguous,
//! order-preserving chunks; every chunk becomes one output artifact.
//!
//! | Policy    | n ≤ threshold | n > threshold                                   |
//! |-----------|---------------|-------------------------------------------------|
//! | `halve`   | 1 chunk       | 2 chunks: `ceil(n/2)` + remainder               |
//! | `bounded` | 1 chunk       | `k = ceil(n/threshold)` chunks of `ceil(n/k)`   |
//!
//! `halve` is the default. It does not bound chunk size: above twice the
//! threshold each half is still larger than the threshold. `bounded`
//! guarantees every chunk fits.

use serde::{Deserialize, Serialize};

/// Row count above which a row set is split.
pub const DEFAULT_CHUNK_THRESHOLD: usize = 200;

/// How a row set above the threshold is split.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitPolicy {
    /// Exactly two halves, whatever the size.
    #[default]
    Halve,
    /// As many near-equal chunks as needed to stay within the threshold.
    Bounded,
}

impl std::str::FromStr for SplitPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "halve" => Ok(Self::Halve),
            "bounded" => Ok(Self::Bounded),
            other => Err(format!("unknown split policy '{}' (expected halve or bounded)", other)),
        }
    }
}

/// Chunk size for `n` items under `policy`, or `None` if no split is needed.
pub fn chunk_size(n: usize, threshold: usize, policy: SplitPolicy) -> Option<usize> {
    let threshold = threshold.max(1);
    if n <= threshold {
        return None;
    }
    let parts = match policy {
        SplitPolicy::Halve => 2,
        SplitPolicy::Bounded => n.div_ceil(threshold),
    };
    Some(n.div_ceil(parts))
}

/// Split `items` into contiguous chunks. Always returns at least one chunk
/// (possibly empty), so `concat(chunks) == items`.
pub fn split<T>(items: &[T], threshold: usize, policy: SplitPolicy) -> Vec<&[T]> {
    match chunk_size(items.len(), threshold, policy) {
        Some(size) => items.chunks(size).collect(),
        None => vec![items],
    }
}
