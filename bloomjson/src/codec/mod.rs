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

//! JSON wire format for plain and counting Bloom filters.
//!
//! A filter is a JSON object:
//!
//! | Field | Type | Present when | Meaning |
//! |-------|------|--------------|---------|
//! | `m` | integer | always | filter size in bits |
//! | `h` | integer | always | number of hash functions |
//! | `b` | base64 string | plain filter | packed bit array |
//! | `c` | integer | counting filter | bits per counter |
//! | `counts` | object of string → integer | counting filter | non-zero counters by position |
//! | `hashMethod` | string | optional | name of the [`HashMethod`] |
//!
//! The bit array is packed least-significant bit first (bit `i` in byte `i / 8` at bit `i % 8`)
//! with trailing zero bytes dropped, then encoded with the standard padded base64 alphabet. A
//! counting filter never ships its bit array: the decoder derives every bit from its counter.
//!
//! Payloads without `hashMethod` are decoded with [`HashMethod::Murmur3KirschMitzenmacher`]
//! unless the [`JsonCodec`] says otherwise.
//!
//! # Examples
//!
//! ```
//! use bloomjson::bloom::BloomFilterBuilder;
//! use bloomjson::codec;
//!
//! let mut filter = BloomFilterBuilder::with_size(320, 3).build();
//! filter.insert("Ululu");
//!
//! let json = codec::to_json(&filter);
//! assert_eq!(json["m"], 320);
//! assert_eq!(json["h"], 3);
//!
//! let restored = codec::from_json(&json).unwrap();
//! assert!(!restored.is_counting());
//! assert!(restored.contains(&"Ululu"));
//! ```

mod decode;
mod encode;
mod kind;

use std::collections::BTreeMap;

use serde_json::Value;

pub use self::kind::BodyKind;
use crate::bloom::AnyBloomFilter;
use crate::bloom::FilterRef;
use crate::error::Error;
use crate::hash::HashMethod;

/// Filter size in bits.
pub const FIELD_SIZE: &str = "m";
/// Number of hash functions.
pub const FIELD_HASHES: &str = "h";
/// Base64 bit array of a plain filter.
pub const FIELD_BITS: &str = "b";
/// Counter width of a counting filter.
pub const FIELD_COUNTING_BITS: &str = "c";
/// Sparse count map of a counting filter.
pub const FIELD_COUNTS: &str = "counts";
/// Optional hash method name.
pub const FIELD_HASH_METHOD: &str = "hashMethod";

/// Options of the JSON encoder and decoder.
///
/// The default codec reads and writes the legacy format: no `hashMethod` field is written, and
/// payloads without one are assumed to use [`HashMethod::Murmur3KirschMitzenmacher`].
///
/// # Examples
///
/// ```
/// use bloomjson::bloom::BloomFilterBuilder;
/// use bloomjson::codec::JsonCodec;
/// use bloomjson::hash::HashMethod;
///
/// let filter = BloomFilterBuilder::with_size(64, 2)
///     .hash_method(HashMethod::Murmur3)
///     .build();
///
/// let codec = JsonCodec::new().emit_hash_method(true);
/// let json = codec.encode(&filter);
/// assert_eq!(json["hashMethod"], "Murmur3");
/// assert_eq!(codec.decode(&json).unwrap().hash_method(), HashMethod::Murmur3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonCodec {
    emit_hash_method: bool,
    default_hash_method: HashMethod,
}

impl Default for JsonCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonCodec {
    /// Creates a codec for the legacy format.
    pub const fn new() -> Self {
        JsonCodec {
            emit_hash_method: false,
            default_hash_method: HashMethod::Murmur3KirschMitzenmacher,
        }
    }

    /// Whether [`encode()`](Self::encode) writes the `hashMethod` field (default: `false`).
    pub const fn emit_hash_method(mut self, emit: bool) -> Self {
        self.emit_hash_method = emit;
        self
    }

    /// The hash method assumed for payloads without a `hashMethod` field.
    pub const fn default_hash_method(mut self, hash_method: HashMethod) -> Self {
        self.default_hash_method = hash_method;
        self
    }
}

/// Filter parameters shared by both body kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metadata {
    /// Filter size in bits (m).
    pub num_bits: u64,
    /// Number of hash functions (k).
    pub num_hashes: u16,
    /// Hash method, explicit or defaulted.
    pub hash_method: HashMethod,
}

/// A validated filter body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// Packed bit array, least-significant bit first.
    Plain {
        /// Bytes decoded from base64, at most `ceil(m / 8)` long.
        bytes: Vec<u8>,
    },
    /// Counter width and non-zero counters.
    Counting {
        /// Bits per counter (c).
        counting_bits: u8,
        /// Counters by position, every position below m and every count below `2^c`.
        counts: BTreeMap<u64, u64>,
    },
}

impl Body {
    /// The kind of this body.
    pub fn kind(&self) -> BodyKind {
        match self {
            Body::Plain { .. } => BodyKind::Plain,
            Body::Counting { .. } => BodyKind::Counting,
        }
    }
}

/// Encodes a filter with the default codec.
///
/// Encoding cannot fail. See [`JsonCodec::encode`].
pub fn to_json<'a>(filter: impl Into<FilterRef<'a>>) -> Value {
    JsonCodec::new().encode(filter)
}

/// Encodes only the membership bits of a filter of either kind as a base64 string.
///
/// # Examples
///
/// ```
/// use bloomjson::bloom::BloomFilterBuilder;
/// use bloomjson::codec;
///
/// let mut counting = BloomFilterBuilder::with_size(64, 2).build_counting();
/// assert_eq!(codec::to_base64(&counting), "");
/// counting.insert("x");
/// assert!(!codec::to_base64(&counting).is_empty());
/// ```
pub fn to_base64<'a>(filter: impl Into<FilterRef<'a>>) -> String {
    encode::encode_bits(&filter.into().to_bytes())
}

/// Decodes a filter with the default codec. See [`JsonCodec::decode`].
pub fn from_json(json: &Value) -> Result<AnyBloomFilter, Error> {
    JsonCodec::new().decode(json)
}

/// Parses JSON text and decodes it with the default codec. See [`JsonCodec::decode_str`].
pub fn from_json_str(json: &str) -> Result<AnyBloomFilter, Error> {
    JsonCodec::new().decode_str(json)
}
