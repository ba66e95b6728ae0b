//! Seeded shuffle and train/dev/test partitioning.

use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::DatasetConfig;

/// Requested partition sizes. Sizes are clamped to what is available, in
/// the order train, dev, test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitSizes {
    pub train: usize,
    pub dev: usize,
    /// `None` takes everything left over.
    pub test: Option<usize>,
}

impl From<&DatasetConfig> for SplitSizes {
    fn from(config: &DatasetConfig) -> Self {
        Self {
            train: config.train_size,
            dev: config.dev_size,
            test: config.test_size,
        }
    }
}

/// The three partitions.
#[derive(Debug, Clone, PartialEq)]
pub struct Splits<T> {
    pub train: Vec<T>,
    pub dev: Vec<T>,
    pub test: Vec<T>,
}

impl<T> Splits<T> {
    pub fn map<U, E, F>(self, mut f: F) -> Result<Splits<U>, E>
    where
        F: FnMut(Vec<T>) -> Result<Vec<U>, E>,
    {
        Ok(Splits {
            train: f(self.train)?,
            dev: f(self.dev)?,
            test: f(self.test)?,
        })
    }
}

/// Shuffle `items` with `seed` and cut them into train/dev/test by index range.
///
/// The same seed and input always give the same partitions.
pub fn split_dataset<T>(mut items: Vec<T>, seed: u64, sizes: SplitSizes) -> Splits<T> {
    let mut rng = StdRng::seed_from_u64(seed);
    items.shuffle(&mut rng);

    let total = items.len();
    let train_end = sizes.train.min(total);
    let dev_end = (train_end + sizes.dev).min(total);
    let test_end = match sizes.test {
        Some(test) => (dev_end + test).min(total),
        None => total,
    };

    items.truncate(test_end);
    let test = items.split_off(dev_end);
    let dev = items.split_off(train_end);
    Splits {
        train: items,
        dev,
        test,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sizes(train: usize, dev: usize, test: Option<usize>) -> SplitSizes {
        SplitSizes { train, dev, test }
    }

    #[test]
    fn test_same_seed_same_partitions() {
        let items: Vec<u32> = (0..50).collect();
        let a = split_dataset(items.clone(), 42, sizes(20, 10, None));
        let b = split_dataset(items, 42, sizes(20, 10, None));
        assert_eq!(a, b);
        assert_eq!((a.train.len(), a.dev.len(), a.test.len()), (20, 10, 20));
    }

    #[test]
    fn test_different_seed_reorders() {
        let items: Vec<u32> = (0..50).collect();
        let a = split_dataset(items.clone(), 1, sizes(20, 10, None));
        let b = split_dataset(items, 2, sizes(20, 10, None));
        assert_ne!(a.train, b.train);
    }

    #[test]
    fn test_partitions_are_disjoint_and_complete() {
        let items: Vec<u32> = (0..30).collect();
        let splits = split_dataset(items, 7, sizes(10, 10, None));
        let mut all: Vec<u32> = splits
            .train
            .iter()
            .chain(&splits.dev)
            .chain(&splits.test)
            .copied()
            .collect();
        all.sort_unstable();
        assert_eq!(all, (0..30).collect::<Vec<_>>());
    }

    #[test]
    fn test_sizes_clamped_to_dataset() {
        let items: Vec<u32> = (0..15).collect();
        let splits = split_dataset(items, 0, sizes(10, 10, Some(10)));
        assert_eq!((splits.train.len(), splits.dev.len(), splits.test.len()), (10, 5, 0));

        let items: Vec<u32> = (0..30).collect();
        let splits = split_dataset(items, 0, sizes(10, 10, Some(3)));
        assert_eq!(splits.test.len(), 3);
    }
}
