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

use super::BloomFilter;
use super::CountingBloomFilter;
use crate::hash::HashMethod;

/// Smallest supported filter size in bits.
pub const MIN_NUM_BITS: u64 = 1;
/// Largest supported filter size in bits.
pub const MAX_NUM_BITS: u64 = i32::MAX as u64;
/// Smallest supported number of hash functions.
pub const MIN_NUM_HASHES: u16 = 1;
/// Largest supported number of hash functions.
pub const MAX_NUM_HASHES: u16 = i16::MAX as u16;
/// Narrowest supported counter.
pub const MIN_COUNTING_BITS: u8 = 1;
/// Widest supported counter.
pub const MAX_COUNTING_BITS: u8 = 64;
/// Counter width used unless [`BloomFilterBuilder::counting_bits`] says otherwise.
pub const DEFAULT_COUNTING_BITS: u8 = 16;

/// Builder for creating [`BloomFilter`] and [`CountingBloomFilter`] instances.
///
/// Provides two construction modes:
/// - [`with_accuracy()`](Self::with_accuracy): Specify target items and false positive rate
///   (recommended)
/// - [`with_size()`](Self::with_size): Specify bit count and hash functions (manual)
#[derive(Debug, Clone)]
pub struct BloomFilterBuilder {
    num_bits: u64,
    num_hashes: u16,
    hash_method: HashMethod,
    counting_bits: u8,
}

impl BloomFilterBuilder {
    /// Creates a builder with optimal parameters for a target accuracy.
    ///
    /// # Panics
    ///
    /// Panics if `max_items` is 0 or `fpp` is not in (0.0, 1.0].
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomjson::bloom::BloomFilterBuilder;
    /// let filter = BloomFilterBuilder::with_accuracy(10_000, 0.01).build();
    /// assert_eq!(filter.num_hashes(), 7);
    /// ```
    pub fn with_accuracy(max_items: u64, fpp: f64) -> Self {
        assert!(max_items > 0, "max_items must be greater than 0");
        assert!(
            fpp > 0.0 && fpp <= 1.0,
            "fpp must be between 0.0 and 1.0 (inclusive of 1.0)"
        );

        let num_bits = Self::suggest_num_bits(max_items, fpp);
        let num_hashes = Self::suggest_num_hashes(max_items, num_bits);
        Self::new(num_bits, num_hashes)
    }

    /// Creates a builder with manual size specification.
    ///
    /// Unlike word-aligned filters, the capacity is exactly `num_bits`: bit positions are
    /// computed modulo `num_bits` and the serialized size is reported verbatim.
    ///
    /// # Panics
    ///
    /// Panics if `num_bits` is outside `[MIN_NUM_BITS, MAX_NUM_BITS]` or `num_hashes` is
    /// outside `[MIN_NUM_HASHES, MAX_NUM_HASHES]`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomjson::bloom::BloomFilterBuilder;
    /// let filter = BloomFilterBuilder::with_size(320, 3).build();
    /// assert_eq!(filter.capacity(), 320);
    /// ```
    pub fn with_size(num_bits: u64, num_hashes: u16) -> Self {
        assert!(
            (MIN_NUM_BITS..=MAX_NUM_BITS).contains(&num_bits),
            "num_bits must be between {MIN_NUM_BITS} and {MAX_NUM_BITS}"
        );
        assert!(
            (MIN_NUM_HASHES..=MAX_NUM_HASHES).contains(&num_hashes),
            "num_hashes must be between {MIN_NUM_HASHES} and {MAX_NUM_HASHES}"
        );
        Self::new(num_bits, num_hashes)
    }

    fn new(num_bits: u64, num_hashes: u16) -> Self {
        BloomFilterBuilder {
            num_bits,
            num_hashes,
            hash_method: HashMethod::default(),
            counting_bits: DEFAULT_COUNTING_BITS,
        }
    }

    /// Sets the hash method (default: [`HashMethod::Murmur3KirschMitzenmacher`]).
    ///
    /// **Important**: Filters built with different methods disagree on membership and cannot
    /// be merged.
    pub fn hash_method(mut self, hash_method: HashMethod) -> Self {
        self.hash_method = hash_method;
        self
    }

    /// Sets the width of each counter of a counting filter (default: 16).
    ///
    /// Counters saturate at `2^counting_bits - 1`. Ignored by [`build()`](Self::build).
    ///
    /// # Panics
    ///
    /// Panics if `counting_bits` is outside `[MIN_COUNTING_BITS, MAX_COUNTING_BITS]`.
    pub fn counting_bits(mut self, counting_bits: u8) -> Self {
        assert!(
            (MIN_COUNTING_BITS..=MAX_COUNTING_BITS).contains(&counting_bits),
            "counting_bits must be between {MIN_COUNTING_BITS} and {MAX_COUNTING_BITS}"
        );
        self.counting_bits = counting_bits;
        self
    }

    /// Builds a plain Bloom filter.
    pub fn build(self) -> BloomFilter {
        let num_words = self.num_bits.div_ceil(64) as usize;
        BloomFilter {
            hash_method: self.hash_method,
            num_hashes: self.num_hashes,
            capacity_bits: self.num_bits,
            num_bits_set: 0,
            bit_array: vec![0u64; num_words],
        }
    }

    /// Builds a counting Bloom filter.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomjson::bloom::BloomFilterBuilder;
    /// let mut filter = BloomFilterBuilder::with_size(480, 4)
    ///     .counting_bits(8)
    ///     .build_counting();
    /// filter.insert("Twice");
    /// filter.insert("Twice");
    /// assert!(filter.count_map().values().all(|&count| count == 2));
    /// ```
    pub fn build_counting(self) -> CountingBloomFilter {
        let counting_bits = self.counting_bits;
        CountingBloomFilter {
            filter: self.build(),
            counting_bits,
            counters: BTreeMap::new(),
        }
    }

    /// Suggests optimal number of bits given max items and target FPP.
    ///
    /// Formula: `m = -n * ln(p) / (ln(2)^2)`
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomjson::bloom::BloomFilterBuilder;
    /// let bits = BloomFilterBuilder::suggest_num_bits(1000, 0.01);
    /// assert!(bits > 9000 && bits < 10000); // ~9585 bits
    /// ```
    pub fn suggest_num_bits(max_items: u64, fpp: f64) -> u64 {
        let n = max_items as f64;
        let ln2_squared = std::f64::consts::LN_2 * std::f64::consts::LN_2;
        let bits = (-n * fpp.ln() / ln2_squared).ceil() as u64;
        bits.clamp(MIN_NUM_BITS, MAX_NUM_BITS)
    }

    /// Suggests optimal number of hash functions given max items and bit count.
    ///
    /// Formula: `k = (m/n) * ln(2)`
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomjson::bloom::BloomFilterBuilder;
    /// assert_eq!(BloomFilterBuilder::suggest_num_hashes(1000, 10000), 7);
    /// ```
    pub fn suggest_num_hashes(max_items: u64, num_bits: u64) -> u16 {
        let k = (num_bits as f64 / max_items as f64 * std::f64::consts::LN_2).ceil();
        k.clamp(f64::from(MIN_NUM_HASHES), f64::from(MAX_NUM_HASHES)) as u16
    }
}
