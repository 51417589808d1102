//! Conditional parallel iteration over independent units.
//!
//! Uses rayon when the `parallel` feature is enabled and the configuration allows it
//! for the given collection size. Output order always matches input order.

use zrisk_config::model::ParallelConfig;

/// Returns true if `count` units should run on the rayon pool.
#[must_use]
pub fn should_parallelize(config: &ParallelConfig, count: usize) -> bool {
    cfg!(feature = "parallel") && config.allows(count)
}

/// Maps a function over items, conditionally using parallel iteration.
///
/// # Example
///
/// ```ignore
/// let results = maybe_parallel_map(&units, &config.parallel, |u| engine.run_unit(u.0, u.1));
/// ```
#[allow(unused_variables)]
pub fn maybe_parallel_map<T, U, F>(items: &[T], config: &ParallelConfig, f: F) -> Vec<U>
where
    T: Sync,
    U: Send,
    F: Fn(&T) -> U + Sync + Send,
{
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        if should_parallelize(config, items.len()) {
            return items.par_iter().map(f).collect();
        }
    }

    items.iter().map(f).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maybe_parallel_map_sequential() {
        let items = vec![1, 2, 3, 4, 5];
        let results: Vec<i32> = maybe_parallel_map(&items, &ParallelConfig::sequential(), |x| x * 2);
        assert_eq!(results, vec![2, 4, 6, 8, 10]);
    }

    #[test]
    fn test_order_is_preserved() {
        let config = ParallelConfig {
            enabled: true,
            threshold: 1,
        };
        let items: Vec<usize> = (0..500).collect();
        let results = maybe_parallel_map(&items, &config, |x| x + 1);
        assert_eq!(results, (1..=500).collect::<Vec<_>>());
    }

    #[test]
    fn test_threshold() {
        let config = ParallelConfig {
            enabled: true,
            threshold: 10,
        };
        assert!(!should_parallelize(&config, 5));
        #[cfg(feature = "parallel")]
        assert!(should_parallelize(&config, 100));
        assert!(!should_parallelize(&ParallelConfig::sequential(), 100));
    }
}
