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

//! Plain and counting Bloom filters.
//!
//! A Bloom filter is a space-efficient probabilistic data structure used to test whether
//! an element is a member of a set. False positive matches are possible, but false negatives
//! are not. In other words, a query returns either "possibly in set" or "definitely not in set".
//!
//! A counting Bloom filter backs every bit with a small saturating counter, which makes
//! removal possible. The bit of a position is set exactly when its counter is non-zero.
//!
//! # Usage
//!
//! ```rust
//! use bloomjson::bloom::BloomFilterBuilder;
//!
//! // Create a filter optimized for 1000 items with 1% false positive rate
//! let mut filter = BloomFilterBuilder::with_accuracy(1000, 0.01).build();
//! filter.insert("apple");
//! filter.insert(42_u64);
//! assert!(filter.contains(&"apple"));
//!
//! // Counting filters support removal
//! let mut counting = BloomFilterBuilder::with_accuracy(1000, 0.01)
//!     .counting_bits(8)
//!     .build_counting();
//! counting.insert("apple");
//! assert!(counting.remove(&"apple"));
//! assert!(!counting.contains(&"apple"));
//! ```
//!
//! # Implementation Details
//!
//! - Uses MurmurHash3 x64/128 for hashing, see [`HashMethod`](crate::hash::HashMethod)
//! - Bits packed in `u64` words, exposed as least-significant-bit-first bytes
//! - Counters are stored sparsely, only non-zero values are kept

mod any;
mod builder;
mod counting;
mod sketch;

pub use self::any::AnyBloomFilter;
pub use self::any::FilterRef;
pub use self::builder::BloomFilterBuilder;
pub use self::builder::DEFAULT_COUNTING_BITS;
pub use self::builder::MAX_COUNTING_BITS;
pub use self::builder::MAX_NUM_BITS;
pub use self::builder::MAX_NUM_HASHES;
pub use self::builder::MIN_COUNTING_BITS;
pub use self::builder::MIN_NUM_BITS;
pub use self::builder::MIN_NUM_HASHES;
pub use self::counting::CountingBloomFilter;
pub use self::sketch::BloomFilter;
