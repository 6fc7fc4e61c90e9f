// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use std::collections::BTreeMap;
use std::hash::Hash;

use super::BloomFilter;
use crate::error::Error;
use crate::hash::HashMethod;

/// A counting Bloom filter: a [`BloomFilter`] whose bits are backed by saturating counters.
///
/// Every position carries a counter of `counting_bits` bits. The membership bit of a position
/// is always `counter > 0`; queries only consult the bits, while [`remove()`](Self::remove)
/// walks the counters. Only non-zero counters are stored.
///
/// Use [`super::BloomFilterBuilder::build_counting`] to construct instances.
#[derive(Debug, Clone, PartialEq)]
pub struct CountingBloomFilter {
    /// Membership bits, derived from `counters`
    pub(super) filter: BloomFilter,
    /// Width of every counter in bits (c)
    pub(super) counting_bits: u8,
    /// Non-zero counters by bit position
    pub(super) counters: BTreeMap<u64, u64>,
}

impl CountingBloomFilter {
    /// Tests whether an item is possibly in the set.
    pub fn contains<T: Hash>(&self, item: &T) -> bool {
        self.filter.contains(item)
    }

    /// Inserts an item, incrementing each of its `k` counters.
    ///
    /// Counters that already hold [`max_count()`](Self::max_count) stay there.
    pub fn insert<T: Hash>(&mut self, item: T) {
        let max_count = self.max_count();
        for position in self.filter.bit_indexes(&item) {
            let counter = self.counters.entry(position).or_insert(0);
            *counter = counter.saturating_add(1).min(max_count);
            self.filter.set_bit(position, true);
        }
    }

    /// Removes one occurrence of an item, decrementing each of its `k` counters.
    ///
    /// Items that are definitely absent are ignored, since decrementing their counters would
    /// erase other items. Returns whether the item was possibly present before the removal.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomjson::bloom::BloomFilterBuilder;
    /// let mut filter = BloomFilterBuilder::with_size(480, 4).build_counting();
    /// filter.insert("Twice");
    /// filter.insert("Twice");
    ///
    /// assert!(filter.remove(&"Twice"));
    /// assert!(filter.contains(&"Twice"));
    /// assert!(filter.remove(&"Twice"));
    /// assert!(filter.is_empty());
    /// ```
    pub fn remove<T: Hash>(&mut self, item: &T) -> bool {
        if !self.contains(item) {
            return false;
        }

        for position in self.filter.bit_indexes(item) {
            let remaining = self.count_of(position).saturating_sub(1);
            self.write_counter(position, remaining);
        }
        true
    }

    /// Estimates how many times an item was inserted: the minimum over its `k` counters.
    pub fn estimate_count<T: Hash>(&self, item: &T) -> u64 {
        self.filter
            .bit_indexes(item)
            .into_iter()
            .map(|position| self.count_of(position))
            .min()
            .unwrap_or(0)
    }

    /// Returns the counter at `position` (0 if the position was never set).
    pub fn count_of(&self, position: u64) -> u64 {
        self.counters.get(&position).copied().unwrap_or(0)
    }

    /// Returns the sparse count map: every position with a non-zero counter.
    ///
    /// The map is a snapshot; mutating it does not affect the filter.
    pub fn count_map(&self) -> BTreeMap<u64, u64> {
        self.counters.clone()
    }

    /// Sets the counter at `position` to `count` and the membership bit to `count > 0`.
    ///
    /// Both writes happen together or not at all.
    ///
    /// # Errors
    ///
    /// Returns an error if `position` is not below the capacity or `count` exceeds
    /// [`max_count()`](Self::max_count).
    pub fn set_counter_and_bit(&mut self, position: u64, count: u64) -> Result<(), Error> {
        if position >= self.capacity() {
            return Err(Error::invalid_argument("position out of range")
                .with_context("position", position)
                .with_context("capacity", self.capacity()));
        }
        if count > self.max_count() {
            return Err(Error::invalid_argument("count exceeds counter width")
                .with_context("count", count)
                .with_context("counting_bits", self.counting_bits));
        }

        self.write_counter(position, count);
        Ok(())
    }

    fn write_counter(&mut self, position: u64, count: u64) {
        if count == 0 {
            self.counters.remove(&position);
        } else {
            self.counters.insert(position, count);
        }
        self.filter.set_bit(position, count > 0);
    }

    /// Resets every counter and bit.
    pub fn reset(&mut self) {
        self.counters.clear();
        self.filter.reset();
    }

    /// Returns whether no counter is set.
    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }

    /// Returns the width of each counter in bits (c).
    pub fn counting_bits(&self) -> u8 {
        self.counting_bits
    }

    /// Returns the largest value a counter can hold, `2^c - 1`.
    pub fn max_count(&self) -> u64 {
        u64::MAX >> (64 - u32::from(self.counting_bits))
    }

    /// Returns the total number of bits in the filter (m).
    pub fn capacity(&self) -> u64 {
        self.filter.capacity()
    }

    /// Returns the number of hash functions used (k).
    pub fn num_hashes(&self) -> u16 {
        self.filter.num_hashes()
    }

    /// Returns the hash method.
    pub fn hash_method(&self) -> HashMethod {
        self.filter.hash_method()
    }

    /// Returns the membership bits as bytes, in the layout of [`BloomFilter::to_bytes`].
    pub fn to_bytes(&self) -> Vec<u8> {
        self.filter.to_bytes()
    }

    /// Returns the membership bits as a plain filter.
    pub fn as_bloom_filter(&self) -> &BloomFilter {
        &self.filter
    }

    /// Drops the counters, keeping the membership bits as a plain filter.
    pub fn into_bloom_filter(self) -> BloomFilter {
        self.filter
    }
}

#[cfg(test)]
mod tests {
    use crate::bloom::BloomFilterBuilder;
    use crate::error::ErrorKind;

    #[test]
    fn test_insert_counts_every_position() {
        let mut filter = BloomFilterBuilder::with_size(480, 4).build_counting();
        filter.insert("Once");
        filter.insert("Twice");
        filter.insert("Twice");

        assert!(filter.contains(&"Once"));
        assert!(filter.contains(&"Twice"));
        assert!(filter.estimate_count(&"Twice") >= 2);
        assert!(filter.estimate_count(&"Once") >= 1);
        for (&position, &count) in &filter.count_map() {
            assert!(count > 0);
            assert!(filter.as_bloom_filter().get_bit(position));
        }
        assert_eq!(
            filter.as_bloom_filter().bits_used(),
            filter.count_map().len() as u64
        );
    }

    #[test]
    fn test_counters_saturate() {
        let mut filter = BloomFilterBuilder::with_size(64, 1)
            .counting_bits(2)
            .build_counting();
        assert_eq!(filter.max_count(), 3);
        for _ in 0..10 {
            filter.insert(7_u32);
        }
        assert_eq!(filter.estimate_count(&7_u32), 3);
    }

    #[test]
    fn test_max_count_of_full_width() {
        let filter = BloomFilterBuilder::with_size(64, 1)
            .counting_bits(64)
            .build_counting();
        assert_eq!(filter.max_count(), u64::MAX);
    }

    #[test]
    fn test_remove_absent_item_is_noop() {
        let mut filter = BloomFilterBuilder::with_size(4096, 3).build_counting();
        filter.insert("present");
        let before = filter.count_map();
        assert!(!filter.remove(&"absent"));
        assert_eq!(filter.count_map(), before);
    }

    #[test]
    fn test_set_counter_and_bit_keeps_bit_in_sync() {
        let mut filter = BloomFilterBuilder::with_size(100, 2).build_counting();
        filter.set_counter_and_bit(42, 5).unwrap();
        assert_eq!(filter.count_of(42), 5);
        assert!(filter.as_bloom_filter().get_bit(42));

        filter.set_counter_and_bit(42, 0).unwrap();
        assert_eq!(filter.count_of(42), 0);
        assert!(!filter.as_bloom_filter().get_bit(42));
        assert!(filter.count_map().is_empty());
        assert!(filter.is_empty());
    }

    #[test]
    fn test_set_counter_and_bit_rejects_bad_input() {
        let mut filter = BloomFilterBuilder::with_size(100, 2)
            .counting_bits(4)
            .build_counting();

        let err = filter.set_counter_and_bit(100, 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let err = filter.set_counter_and_bit(10, 16).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        assert!(filter.is_empty());
        assert!(filter.as_bloom_filter().is_empty());
    }

    #[test]
    fn test_reset() {
        let mut filter = BloomFilterBuilder::with_size(100, 2).build_counting();
        filter.insert("a");
        filter.reset();
        assert!(filter.is_empty());
        assert!(!filter.contains(&"a"));
    }
}
