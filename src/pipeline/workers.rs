//! Per-component fan-out over a rayon pool.

use rayon::prelude::*;
use tracing::warn;

/// Applies `f` to every item, preserving input order.
///
/// Uses a dedicated pool of `jobs` threads when `jobs > 1`; otherwise, or if
/// the pool cannot be built, runs sequentially on the caller's thread.
pub fn map<T, R, F>(jobs: usize, items: &[T], f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync + Send,
{
    if jobs <= 1 || items.len() <= 1 {
        return items.iter().map(f).collect();
    }

    match rayon::ThreadPoolBuilder::new().num_threads(jobs).build() {
        Ok(pool) => pool.install(|| items.par_iter().map(&f).collect()),
        Err(err) => {
            warn!(jobs, error = %err, "could not build worker pool; running sequentially");
            items.iter().map(f).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_and_parallel_agree() {
        let items: Vec<u32> = (0..200).collect();
        let sequential = map(1, &items, |n| n * 3);
        let parallel = map(4, &items, |n| n * 3);
        assert_eq!(sequential, parallel);
        assert_eq!(parallel[199], 597);
    }

    #[test]
    fn empty_input_is_fine() {
        let items: Vec<u32> = Vec::new();
        assert!(map(8, &items, |n| *n).is_empty());
    }
}
