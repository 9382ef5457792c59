use itertools::Itertools;
use rustc_hash::{FxHashMap, FxHasher};
use std::hash::{Hash, Hasher};

/// The number of elements per partition if nothing else is specified.
pub const DEFAULT_PARTITION_SIZE: usize = 8192;

/// An in-process partitioned collection.
///
/// Transformations are applied to each partition independently. No order is defined between
/// partitions and operations must not rely on the partitioning of the input. Aggregations go
/// through [Self::combine_by_key], which only requires an associative merge of partial results.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Partitions<T> {
    partitions: Vec<Vec<T>>,
}

impl<T> Default for Partitions<T> {
    fn default() -> Self {
        Self {
            partitions: Vec::new(),
        }
    }
}

impl<T> Partitions<T> {
    /// Creates a new [Partitions] from pre-partitioned data.
    pub fn new(partitions: Vec<Vec<T>>) -> Self {
        Self { partitions }
    }

    /// Splits `iter` into partitions of at most `partition_size` elements.
    pub fn from_iter_chunked(iter: impl IntoIterator<Item = T>, partition_size: usize) -> Self {
        let chunks = iter.into_iter().chunks(partition_size.max(1));
        let partitions = chunks
            .into_iter()
            .map(Iterator::collect::<Vec<_>>)
            .collect();
        Self { partitions }
    }

    /// The number of partitions.
    pub fn partition_count(&self) -> usize {
        self.partitions.len()
    }

    /// The total number of elements.
    pub fn len(&self) -> usize {
        self.partitions.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.partitions.iter().all(Vec::is_empty)
    }

    pub fn partitions(&self) -> &[Vec<T>] {
        &self.partitions
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.partitions.iter().flatten()
    }

    #[must_use]
    pub fn map<U>(self, f: impl Fn(T) -> U) -> Partitions<U> {
        self.map_partitions(|partition| partition.into_iter().map(&f).collect())
    }

    #[must_use]
    pub fn flat_map<U, I: IntoIterator<Item = U>>(self, f: impl Fn(T) -> I) -> Partitions<U> {
        self.map_partitions(|partition| partition.into_iter().flat_map(&f).collect())
    }

    #[must_use]
    pub fn filter_map<U>(self, f: impl Fn(T) -> Option<U>) -> Partitions<U> {
        self.map_partitions(|partition| partition.into_iter().filter_map(&f).collect())
    }

    /// Applies a fallible transformation to each element.
    ///
    /// # Errors
    ///
    /// Returns the first error in partition order.
    pub fn try_map<U, E>(self, f: impl Fn(T) -> Result<U, E>) -> Result<Partitions<U>, E> {
        let partitions = self
            .partitions
            .into_iter()
            .map(|partition| partition.into_iter().map(&f).collect::<Result<Vec<_>, _>>())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Partitions { partitions })
    }

    /// Applies `f` to each partition as a whole.
    #[must_use]
    pub fn map_partitions<U>(self, f: impl Fn(Vec<T>) -> Vec<U>) -> Partitions<U> {
        Partitions {
            partitions: self.partitions.into_iter().map(f).collect(),
        }
    }

    /// Concatenates the partitions of `self` and `other`. Duplicates are kept.
    #[must_use]
    pub fn union(mut self, other: Self) -> Self {
        self.partitions.extend(other.partitions);
        self
    }

    /// Redistributes the elements into partitions of at most `partition_size` elements.
    #[must_use]
    pub fn repartition(self, partition_size: usize) -> Self {
        Self::from_iter_chunked(self, partition_size)
    }

    /// Aggregates the elements by key.
    ///
    /// Each partition is folded independently: the first element of a key creates an accumulator
    /// (`create`), further elements are added with `merge_value`. The partial accumulators of all
    /// partitions are then merged with `merge_combiners`, which must be associative. The result
    /// does not depend on the partitioning of the input, apart from the order of the elements
    /// inside the accumulators.
    ///
    /// The result is hash-partitioned by key into `partition_count` partitions.
    pub fn combine_by_key<K, C>(
        self,
        key: impl Fn(&T) -> K,
        create: impl Fn(T) -> C,
        merge_value: impl Fn(C, T) -> C,
        merge_combiners: impl Fn(C, C) -> C,
        partition_count: usize,
    ) -> Partitions<(K, C)>
    where
        K: Hash + Eq,
    {
        let partials = self.partitions.into_iter().map(|partition| {
            let mut accumulators = FxHashMap::<K, C>::default();
            for element in partition {
                let element_key = key(&element);
                let accumulator = match accumulators.remove(&element_key) {
                    Some(accumulator) => merge_value(accumulator, element),
                    None => create(element),
                };
                accumulators.insert(element_key, accumulator);
            }
            accumulators
        });

        let mut combined = FxHashMap::<K, C>::default();
        for partial in partials {
            for (key, accumulator) in partial {
                let accumulator = match combined.remove(&key) {
                    Some(existing) => merge_combiners(existing, accumulator),
                    None => accumulator,
                };
                combined.insert(key, accumulator);
            }
        }

        let partition_count = partition_count.max(1);
        let mut partitions = (0..partition_count).map(|_| Vec::new()).collect::<Vec<_>>();
        for (key, accumulator) in combined {
            let index = partition_for(&key, partition_count);
            partitions[index].push((key, accumulator));
        }
        Partitions { partitions }
    }

    /// Groups the elements by key without any deduplication.
    pub fn group_by<K: Hash + Eq>(
        self,
        key: impl Fn(&T) -> K,
        partition_count: usize,
    ) -> Partitions<(K, Vec<T>)> {
        self.combine_by_key(
            key,
            |element| vec![element],
            |mut group, element| {
                group.push(element);
                group
            },
            |mut left, right| {
                left.extend(right);
                left
            },
            partition_count,
        )
    }
}

/// Returns the partition of `key` among `partition_count` partitions.
#[allow(clippy::cast_possible_truncation)]
pub fn partition_for<K: Hash + ?Sized>(key: &K, partition_count: usize) -> usize {
    let mut hasher = FxHasher::default();
    key.hash(&mut hasher);
    (hasher.finish() % partition_count.max(1) as u64) as usize
}

impl<T> IntoIterator for Partitions<T> {
    type Item = T;
    type IntoIter = std::iter::Flatten<std::vec::IntoIter<Vec<T>>>;

    fn into_iter(self) -> Self::IntoIter {
        self.partitions.into_iter().flatten()
    }
}

impl<T> FromIterator<T> for Partitions<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_iter_chunked(iter, DEFAULT_PARTITION_SIZE)
    }
}
