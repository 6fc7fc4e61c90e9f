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

//! Hash methods that map an item onto the bit positions of a Bloom filter.

mod murmurhash;

use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

pub(crate) use self::murmurhash::MurmurHash3X64128;
use crate::error::Error;

/// The closed set of hash methods a filter can be built with.
///
/// Two filters only agree on membership if they use the same method, so the method is part of a
/// filter's identity even though the legacy JSON format does not carry it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum HashMethod {
    /// One MurmurHash3 x64/128 evaluation, expanded into `k` positions by double hashing
    /// (Kirsch-Mitzenmacher):
    ///
    /// ```text
    /// index_i = ((h1 + i * h2) >> 1) % m,  i in 1..=k
    /// ```
    #[default]
    Murmur3KirschMitzenmacher,
    /// `k` independent MurmurHash3 x64/128 evaluations, seeded with `0..k`:
    ///
    /// ```text
    /// index_i = (h1(seed = i) >> 1) % m
    /// ```
    Murmur3,
}

impl HashMethod {
    /// All supported methods.
    pub const ALL: [HashMethod; 2] = [HashMethod::Murmur3KirschMitzenmacher, HashMethod::Murmur3];

    /// The wire name of this method.
    pub const fn name(self) -> &'static str {
        match self {
            HashMethod::Murmur3KirschMitzenmacher => "Murmur3KirschMitzenmacher",
            HashMethod::Murmur3 => "Murmur3",
        }
    }

    /// Looks up a method by its wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|method| method.name() == name)
    }

    /// Computes the `num_hashes` bit positions of `item` in a filter of `num_bits` bits.
    ///
    /// Positions may repeat; callers treat the result as a multiset.
    pub(crate) fn bit_indexes<T: Hash>(self, item: &T, num_hashes: u16, num_bits: u64) -> Vec<u64> {
        debug_assert!(num_bits > 0);
        match self {
            HashMethod::Murmur3KirschMitzenmacher => {
                let (h1, h2) = hash_item(item, 0);
                (1..=u64::from(num_hashes))
                    .map(|i| (h1.wrapping_add(i.wrapping_mul(h2)) >> 1) % num_bits)
                    .collect()
            }
            HashMethod::Murmur3 => (0..u64::from(num_hashes))
                .map(|seed| (hash_item(item, seed).0 >> 1) % num_bits)
                .collect(),
        }
    }
}

fn hash_item<T: Hash>(item: &T, seed: u64) -> (u64, u64) {
    let mut hasher = MurmurHash3X64128::with_seed(seed);
    item.hash(&mut hasher);
    hasher.finish128()
}

impl fmt::Display for HashMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| {
            Error::invalid_argument(format!("unsupported hash method: {s}"))
                .with_context("supported", "Murmur3KirschMitzenmacher, Murmur3")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for method in HashMethod::ALL {
            assert_eq!(method.name().parse::<HashMethod>().unwrap(), method);
            assert_eq!(method.to_string(), method.name());
        }
        assert!("Cassandra".parse::<HashMethod>().is_err());
        assert_eq!(HashMethod::default(), HashMethod::Murmur3KirschMitzenmacher);
    }

    #[test]
    fn test_bit_indexes_in_range_and_stable() {
        for method in HashMethod::ALL {
            let first = method.bit_indexes(&"Ululu", 7, 101);
            assert_eq!(first.len(), 7);
            assert!(first.iter().all(|&idx| idx < 101));
            assert_eq!(first, method.bit_indexes(&"Ululu", 7, 101));
        }
    }

    #[test]
    fn test_methods_disagree() {
        let km = HashMethod::Murmur3KirschMitzenmacher.bit_indexes(&42_u64, 4, 1 << 20);
        let plain = HashMethod::Murmur3.bit_indexes(&42_u64, 4, 1 << 20);
        assert_ne!(km, plain);
    }
}
