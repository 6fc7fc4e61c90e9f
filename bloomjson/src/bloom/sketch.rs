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

use std::hash::Hash;

use byteorder::ByteOrder;
use byteorder::LE;

use crate::error::Error;
use crate::hash::HashMethod;

/// A Bloom filter for probabilistic set membership testing.
///
/// Provides fast membership queries with:
/// - No false negatives (inserted items always return `true`)
/// - Tunable false positive rate
/// - Constant space usage
///
/// Use [`super::BloomFilterBuilder`] to construct instances.
#[derive(Debug, Clone, PartialEq)]
pub struct BloomFilter {
    /// Method mapping items to bit positions
    pub(super) hash_method: HashMethod,
    /// Number of hash functions to use (k)
    pub(super) num_hashes: u16,
    /// Total number of bits in the filter (m)
    pub(super) capacity_bits: u64,
    /// Count of bits set to 1 (for statistics)
    pub(super) num_bits_set: u64,
    /// Bit array packed into u64 words, bit `i` at word `i / 64`, offset `i % 64`
    pub(super) bit_array: Vec<u64>,
}

impl BloomFilter {
    /// Tests whether an item is possibly in the set.
    ///
    /// Returns:
    /// - `true`: Item was **possibly** inserted (or false positive)
    /// - `false`: Item was **definitely not** inserted
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomjson::bloom::BloomFilterBuilder;
    /// let mut filter = BloomFilterBuilder::with_accuracy(100, 0.01).build();
    /// filter.insert("apple");
    ///
    /// assert!(filter.contains(&"apple"));
    /// assert!(!filter.contains(&"grape"));
    /// ```
    pub fn contains<T: Hash>(&self, item: &T) -> bool {
        if self.is_empty() {
            return false;
        }
        self.bit_indexes(item)
            .into_iter()
            .all(|bit_index| self.get_bit(bit_index))
    }

    /// Tests and inserts an item in a single operation.
    ///
    /// Returns whether the item was possibly already in the set before insertion.
    pub fn contains_and_insert<T: Hash>(&mut self, item: &T) -> bool {
        let mut was_present = true;
        for bit_index in self.bit_indexes(item) {
            was_present &= self.get_bit(bit_index);
            self.set_bit(bit_index, true);
        }
        was_present
    }

    /// Inserts an item into the filter.
    ///
    /// After insertion, `contains(item)` will always return `true`.
    pub fn insert<T: Hash>(&mut self, item: T) {
        for bit_index in self.bit_indexes(&item) {
            self.set_bit(bit_index, true);
        }
    }

    /// Resets the filter to its initial empty state.
    ///
    /// Clears all bits while preserving capacity and configuration.
    pub fn reset(&mut self) {
        self.bit_array.fill(0);
        self.num_bits_set = 0
    }

    /// Merges another filter into this one via bitwise OR (union).
    ///
    /// # Panics
    ///
    /// Panics if the filters are not compatible (different size, hashes, or hash method).
    /// Use [`is_compatible()`](Self::is_compatible) to check first.
    pub fn union(&mut self, other: &BloomFilter) {
        assert!(
            self.is_compatible(other),
            "Cannot union incompatible Bloom filters"
        );

        let mut num_bits_set = 0;
        for (word, other_word) in self.bit_array.iter_mut().zip(&other.bit_array) {
            *word |= *other_word;
            num_bits_set += word.count_ones() as u64;
        }
        self.num_bits_set = num_bits_set;
    }

    /// Returns whether the filter is empty (no bit set).
    pub fn is_empty(&self) -> bool {
        self.num_bits_set == 0
    }

    /// Returns the number of bits set to 1.
    pub fn bits_used(&self) -> u64 {
        self.num_bits_set
    }

    /// Returns the total number of bits in the filter (m).
    pub fn capacity(&self) -> u64 {
        self.capacity_bits
    }

    /// Returns the number of hash functions used (k).
    pub fn num_hashes(&self) -> u16 {
        self.num_hashes
    }

    /// Returns the hash method.
    pub fn hash_method(&self) -> HashMethod {
        self.hash_method
    }

    /// Returns the current load factor (fraction of bits set).
    pub fn load_factor(&self) -> f64 {
        self.num_bits_set as f64 / self.capacity_bits as f64
    }

    /// Estimates the current false positive probability as `load_factor^k`.
    pub fn estimated_fpp(&self) -> f64 {
        self.load_factor().powf(f64::from(self.num_hashes))
    }

    /// Checks if two filters are compatible for merging.
    ///
    /// Filters are compatible if they have the same capacity, number of hash functions and
    /// hash method.
    pub fn is_compatible(&self, other: &BloomFilter) -> bool {
        self.capacity_bits == other.capacity_bits
            && self.num_hashes == other.num_hashes
            && self.hash_method == other.hash_method
    }

    /// Returns the bit array as bytes, least-significant bit first.
    ///
    /// Bit `i` lives in byte `i / 8` at bit `i % 8`. Trailing all-zero bytes are omitted, so an
    /// empty filter yields an empty vector.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomjson::bloom::BloomFilterBuilder;
    /// let filter = BloomFilterBuilder::with_size(320, 3).build();
    /// assert!(filter.to_bytes().is_empty());
    /// ```
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = vec![0u8; self.bit_array.len() * 8];
        LE::write_u64_into(&self.bit_array, &mut bytes);
        let len = bytes.iter().rposition(|&b| b != 0).map_or(0, |last| last + 1);
        bytes.truncate(len);
        bytes
    }

    /// Replaces the bit array with `bytes`, in the layout produced by
    /// [`to_bytes()`](Self::to_bytes).
    ///
    /// Bits beyond the end of `bytes` are cleared. The filter is left untouched on error.
    ///
    /// # Errors
    ///
    /// Returns an error if `bytes` is longer than `ceil(capacity / 8)` or sets a bit at an index
    /// at or beyond the capacity.
    pub fn set_bytes(&mut self, bytes: &[u8]) -> Result<(), Error> {
        let max_len = self.capacity_bits.div_ceil(8);
        if bytes.len() as u64 > max_len {
            return Err(Error::invalid_argument("bit array longer than filter")
                .with_context("bytes", bytes.len())
                .with_context("capacity", self.capacity_bits));
        }

        let mut padded = vec![0u8; self.bit_array.len() * 8];
        padded[..bytes.len()].copy_from_slice(bytes);
        let mut bit_array = vec![0u64; self.bit_array.len()];
        LE::read_u64_into(&padded, &mut bit_array);

        let excess_bits = self.capacity_bits % 64;
        if excess_bits != 0 {
            if let Some(&last) = bit_array.last() {
                if last >> excess_bits != 0 {
                    return Err(Error::invalid_argument("bit set beyond filter capacity")
                        .with_context("capacity", self.capacity_bits));
                }
            }
        }

        self.num_bits_set = bit_array.iter().map(|w| w.count_ones() as u64).sum();
        self.bit_array = bit_array;
        Ok(())
    }

    pub(super) fn bit_indexes<T: Hash>(&self, item: &T) -> Vec<u64> {
        self.hash_method
            .bit_indexes(item, self.num_hashes, self.capacity_bits)
    }

    /// Gets the value of a single bit.
    pub(crate) fn get_bit(&self, bit_index: u64) -> bool {
        let word_index = (bit_index >> 6) as usize;
        let mask = 1u64 << (bit_index & 63);
        (self.bit_array[word_index] & mask) != 0
    }

    /// Sets or clears a single bit, keeping the set-bit count current.
    pub(crate) fn set_bit(&mut self, bit_index: u64, value: bool) {
        let word_index = (bit_index >> 6) as usize;
        let mask = 1u64 << (bit_index & 63);
        let was_set = (self.bit_array[word_index] & mask) != 0;

        match (was_set, value) {
            (false, true) => {
                self.bit_array[word_index] |= mask;
                self.num_bits_set += 1;
            }
            (true, false) => {
                self.bit_array[word_index] &= !mask;
                self.num_bits_set -= 1;
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::bloom::BloomFilterBuilder;
    use crate::error::ErrorKind;
    use crate::hash::HashMethod;

    #[test]
    fn test_builder_with_accuracy() {
        let filter = BloomFilterBuilder::with_accuracy(1000, 0.01).build();
        assert!(filter.capacity() >= 9000);
        assert_eq!(filter.num_hashes(), 7);
        assert_eq!(filter.hash_method(), HashMethod::Murmur3KirschMitzenmacher);
        assert!(filter.is_empty());
    }

    #[test]
    fn test_builder_with_size_is_exact() {
        let filter = BloomFilterBuilder::with_size(1000, 5).build();
        assert_eq!(filter.capacity(), 1000);
        assert_eq!(filter.num_hashes(), 5);
    }

    #[test]
    fn test_insert_and_contains() {
        for method in HashMethod::ALL {
            let mut filter = BloomFilterBuilder::with_accuracy(100, 0.01)
                .hash_method(method)
                .build();
            assert!(!filter.contains(&"apple"));
            filter.insert("apple");
            assert!(filter.contains(&"apple"));
            assert!(!filter.is_empty());
        }
    }

    #[test]
    fn test_contains_and_insert() {
        let mut filter = BloomFilterBuilder::with_accuracy(100, 0.01).build();
        assert!(!filter.contains_and_insert(&42_u64));
        assert!(filter.contains_and_insert(&42_u64));
    }

    #[test]
    fn test_reset() {
        let mut filter = BloomFilterBuilder::with_accuracy(100, 0.01).build();
        filter.insert("test");
        filter.reset();
        assert!(filter.is_empty());
        assert!(!filter.contains(&"test"));
    }

    #[test]
    fn test_union() {
        let mut f1 = BloomFilterBuilder::with_accuracy(100, 0.01).build();
        let mut f2 = BloomFilterBuilder::with_accuracy(100, 0.01).build();
        f1.insert("a");
        f2.insert("b");

        f1.union(&f2);
        assert!(f1.contains(&"a"));
        assert!(f1.contains(&"b"));
    }

    #[test]
    fn test_is_compatible() {
        let f1 = BloomFilterBuilder::with_size(640, 3).build();
        let f2 = BloomFilterBuilder::with_size(640, 3).build();
        let f3 = BloomFilterBuilder::with_size(640, 3)
            .hash_method(HashMethod::Murmur3)
            .build();
        assert!(f1.is_compatible(&f2));
        assert!(!f1.is_compatible(&f3));
    }

    #[test]
    fn test_bytes_are_lsb_first_and_trimmed() {
        let mut filter = BloomFilterBuilder::with_size(320, 3).build();
        filter.set_bit(0, true);
        filter.set_bit(9, true);
        filter.set_bit(70, true);

        let bytes = filter.to_bytes();
        assert_eq!(bytes.len(), 9);
        assert_eq!(bytes[0], 0b0000_0001);
        assert_eq!(bytes[1], 0b0000_0010);
        assert_eq!(bytes[8], 0b0100_0000);
        assert!(bytes[2..8].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_set_bytes_restores_bits() {
        let mut original = BloomFilterBuilder::with_size(100, 4).build();
        original.insert("x");
        original.insert("y");

        let mut restored = BloomFilterBuilder::with_size(100, 4).build();
        restored.set_bytes(&original.to_bytes()).unwrap();
        assert_eq!(original, restored);
        assert_eq!(restored.bits_used(), original.bits_used());
    }

    #[test]
    fn test_set_bytes_rejects_oversized_input() {
        let mut filter = BloomFilterBuilder::with_size(12, 2).build();
        let err = filter.set_bytes(&[0, 0, 1]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        // bit 12 is outside a 12-bit filter
        let err = filter.set_bytes(&[0, 0b0001_0000]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(filter.is_empty());

        filter.set_bytes(&[0, 0b0000_1000]).unwrap();
        assert!(filter.get_bit(11));
    }

    #[test]
    fn test_set_bit_tracks_count() {
        let mut filter = BloomFilterBuilder::with_size(64, 1).build();
        filter.set_bit(3, true);
        filter.set_bit(3, true);
        assert_eq!(filter.bits_used(), 1);
        filter.set_bit(3, false);
        assert_eq!(filter.bits_used(), 0);
    }

    #[test]
    #[should_panic(expected = "max_items must be greater than 0")]
    fn test_invalid_max_items() {
        BloomFilterBuilder::with_accuracy(0, 0.01);
    }

    #[test]
    #[should_panic(expected = "num_bits must be between")]
    fn test_invalid_num_bits() {
        BloomFilterBuilder::with_size(0, 3);
    }
}
