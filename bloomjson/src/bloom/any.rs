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

use super::BloomFilter;
use super::CountingBloomFilter;
use crate::hash::HashMethod;

/// An owned filter of either kind, as produced by decoding.
#[derive(Debug, Clone, PartialEq)]
pub enum AnyBloomFilter {
    /// A plain Bloom filter.
    Plain(BloomFilter),
    /// A counting Bloom filter.
    Counting(CountingBloomFilter),
}

/// A borrowed filter of either kind, as consumed by encoding.
#[derive(Debug, Clone, Copy)]
pub enum FilterRef<'a> {
    /// A plain Bloom filter.
    Plain(&'a BloomFilter),
    /// A counting Bloom filter.
    Counting(&'a CountingBloomFilter),
}

impl AnyBloomFilter {
    /// Borrows this filter for encoding.
    pub fn as_filter_ref(&self) -> FilterRef<'_> {
        match self {
            AnyBloomFilter::Plain(filter) => FilterRef::Plain(filter),
            AnyBloomFilter::Counting(filter) => FilterRef::Counting(filter),
        }
    }

    /// Tests whether an item is possibly in the set.
    pub fn contains<T: Hash>(&self, item: &T) -> bool {
        match self {
            AnyBloomFilter::Plain(filter) => filter.contains(item),
            AnyBloomFilter::Counting(filter) => filter.contains(item),
        }
    }

    /// Returns whether this is a counting filter.
    pub fn is_counting(&self) -> bool {
        matches!(self, AnyBloomFilter::Counting(_))
    }

    /// Returns the total number of bits in the filter (m).
    pub fn capacity(&self) -> u64 {
        self.as_filter_ref().capacity()
    }

    /// Returns the number of hash functions used (k).
    pub fn num_hashes(&self) -> u16 {
        self.as_filter_ref().num_hashes()
    }

    /// Returns the hash method.
    pub fn hash_method(&self) -> HashMethod {
        self.as_filter_ref().hash_method()
    }

    /// Returns the membership bits as bytes, in the layout of [`BloomFilter::to_bytes`].
    pub fn to_bytes(&self) -> Vec<u8> {
        self.as_filter_ref().to_bytes()
    }

    /// Returns the plain filter, if this is one.
    pub fn as_plain(&self) -> Option<&BloomFilter> {
        match self {
            AnyBloomFilter::Plain(filter) => Some(filter),
            AnyBloomFilter::Counting(_) => None,
        }
    }

    /// Returns the counting filter, if this is one.
    pub fn as_counting(&self) -> Option<&CountingBloomFilter> {
        match self {
            AnyBloomFilter::Plain(_) => None,
            AnyBloomFilter::Counting(filter) => Some(filter),
        }
    }

    /// Returns the counting filter mutably, if this is one.
    pub fn as_counting_mut(&mut self) -> Option<&mut CountingBloomFilter> {
        match self {
            AnyBloomFilter::Plain(_) => None,
            AnyBloomFilter::Counting(filter) => Some(filter),
        }
    }

    /// Converts into a plain filter, if this is one.
    pub fn into_plain(self) -> Option<BloomFilter> {
        match self {
            AnyBloomFilter::Plain(filter) => Some(filter),
            AnyBloomFilter::Counting(_) => None,
        }
    }

    /// Converts into a counting filter, if this is one.
    pub fn into_counting(self) -> Option<CountingBloomFilter> {
        match self {
            AnyBloomFilter::Plain(_) => None,
            AnyBloomFilter::Counting(filter) => Some(filter),
        }
    }
}

impl FilterRef<'_> {
    /// Returns the total number of bits in the filter (m).
    pub fn capacity(&self) -> u64 {
        match self {
            FilterRef::Plain(filter) => filter.capacity(),
            FilterRef::Counting(filter) => filter.capacity(),
        }
    }

    /// Returns the number of hash functions used (k).
    pub fn num_hashes(&self) -> u16 {
        match self {
            FilterRef::Plain(filter) => filter.num_hashes(),
            FilterRef::Counting(filter) => filter.num_hashes(),
        }
    }

    /// Returns the hash method.
    pub fn hash_method(&self) -> HashMethod {
        match self {
            FilterRef::Plain(filter) => filter.hash_method(),
            FilterRef::Counting(filter) => filter.hash_method(),
        }
    }

    /// Returns the membership bits as bytes, in the layout of [`BloomFilter::to_bytes`].
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            FilterRef::Plain(filter) => filter.to_bytes(),
            FilterRef::Counting(filter) => filter.to_bytes(),
        }
    }
}

impl From<BloomFilter> for AnyBloomFilter {
    fn from(filter: BloomFilter) -> Self {
        AnyBloomFilter::Plain(filter)
    }
}

impl From<CountingBloomFilter> for AnyBloomFilter {
    fn from(filter: CountingBloomFilter) -> Self {
        AnyBloomFilter::Counting(filter)
    }
}

impl<'a> From<&'a BloomFilter> for FilterRef<'a> {
    fn from(filter: &'a BloomFilter) -> Self {
        FilterRef::Plain(filter)
    }
}

impl<'a> From<&'a CountingBloomFilter> for FilterRef<'a> {
    fn from(filter: &'a CountingBloomFilter) -> Self {
        FilterRef::Counting(filter)
    }
}

impl<'a> From<&'a AnyBloomFilter> for FilterRef<'a> {
    fn from(filter: &'a AnyBloomFilter) -> Self {
        filter.as_filter_ref()
    }
}
