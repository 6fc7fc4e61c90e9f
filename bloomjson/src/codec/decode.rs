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

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde_json::Map;
use serde_json::Value;
use tracing::debug;
use tracing::trace;

use super::Body;
use super::BodyKind;
use super::FIELD_BITS;
use super::FIELD_COUNTING_BITS;
use super::FIELD_COUNTS;
use super::FIELD_HASH_METHOD;
use super::FIELD_HASHES;
use super::FIELD_SIZE;
use super::JsonCodec;
use super::Metadata;
use crate::bloom::AnyBloomFilter;
use crate::bloom::BloomFilterBuilder;
use crate::bloom::MAX_COUNTING_BITS;
use crate::bloom::MAX_NUM_BITS;
use crate::bloom::MAX_NUM_HASHES;
use crate::bloom::MIN_COUNTING_BITS;
use crate::bloom::MIN_NUM_BITS;
use crate::bloom::MIN_NUM_HASHES;
use crate::error::Error;
use crate::hash::HashMethod;

type Object = Map<String, Value>;

impl JsonCodec {
    /// Decodes a filter from its JSON object.
    ///
    /// The object is a counting filter when both `c` and `counts` are present, and a plain
    /// filter otherwise. A counting filter is rebuilt counter by counter, with each membership
    /// bit derived from its counter; positions absent from `counts` stay at zero.
    ///
    /// # Errors
    ///
    /// Decoding is all-or-nothing. It fails with
    /// - [`MalformedJson`] if the value is not an object, `m`, `h` or `c` are missing, not
    ///   integers or out of range, `b` or `counts` have the wrong type, `hashMethod` is unknown,
    ///   or the bit array does not fit in `m` bits;
    /// - [`InvalidBase64`] if `b` is not valid base64;
    /// - [`InvalidCountEntry`] if a key of `counts` is not a position below `m`, or a value is
    ///   not an integer that fits in `c` bits.
    ///
    /// [`MalformedJson`]: crate::error::ErrorKind::MalformedJson
    /// [`InvalidBase64`]: crate::error::ErrorKind::InvalidBase64
    /// [`InvalidCountEntry`]: crate::error::ErrorKind::InvalidCountEntry
    ///
    /// # Examples
    ///
    /// ```
    /// use bloomjson::codec::JsonCodec;
    /// use serde_json::json;
    ///
    /// let json = json!({"m": 480, "h": 4, "c": 8, "counts": {"7": 2, "300": 1}});
    /// let filter = JsonCodec::new().decode(&json).unwrap().into_counting().unwrap();
    /// assert_eq!(filter.count_of(7), 2);
    /// assert_eq!(filter.count_of(8), 0);
    /// assert_eq!(filter.counting_bits(), 8);
    /// ```
    pub fn decode(&self, json: &Value) -> Result<AnyBloomFilter, Error> {
        let root = json
            .as_object()
            .ok_or_else(|| Error::malformed("filter must be a JSON object"))?;

        let metadata = self.read_metadata(root)?;
        let kind = BodyKind::detect(root);
        debug!(
            kind = kind.name(),
            num_bits = metadata.num_bits,
            num_hashes = metadata.num_hashes,
            hash_method = metadata.hash_method.name(),
            "decoding bloom filter"
        );

        let body = match kind {
            BodyKind::Plain => read_plain_body(root, &metadata)?,
            BodyKind::Counting => read_counting_body(root, &metadata)?,
        };
        restore(&metadata, body)
    }

    /// Parses JSON text, then decodes it like [`decode()`](Self::decode).
    ///
    /// # Errors
    ///
    /// Returns a [`MalformedJson`](crate::error::ErrorKind::MalformedJson) error if the text is
    /// not JSON, otherwise any error of [`decode()`](Self::decode).
    pub fn decode_str(&self, json: &str) -> Result<AnyBloomFilter, Error> {
        let value: Value = serde_json::from_str(json).map_err(|err| {
            Error::malformed(format!("invalid JSON: {err}"))
                .with_context("line", err.line())
                .with_context("column", err.column())
        })?;
        self.decode(&value)
    }

    fn read_metadata(&self, root: &Object) -> Result<Metadata, Error> {
        let num_bits = read_integer(root, FIELD_SIZE, MIN_NUM_BITS, MAX_NUM_BITS)?;
        let num_hashes = read_integer(
            root,
            FIELD_HASHES,
            u64::from(MIN_NUM_HASHES),
            u64::from(MAX_NUM_HASHES),
        )? as u16;

        let hash_method = match root.get(FIELD_HASH_METHOD) {
            None => self.default_hash_method,
            Some(value) => {
                let name = value
                    .as_str()
                    .ok_or_else(|| Error::invalid_field(FIELD_HASH_METHOD, "a string"))?;
                HashMethod::from_name(name).ok_or_else(|| {
                    Error::malformed(format!("unsupported hash method: {name}"))
                        .with_context("field", FIELD_HASH_METHOD)
                })?
            }
        };

        Ok(Metadata {
            num_bits,
            num_hashes,
            hash_method,
        })
    }
}

fn read_integer(root: &Object, field: &'static str, min: u64, max: u64) -> Result<u64, Error> {
    let value = root.get(field).ok_or_else(|| Error::missing_field(field))?;
    value
        .as_u64()
        .filter(|n| (min..=max).contains(n))
        .ok_or_else(|| {
            Error::invalid_field(field, format!("an integer between {min} and {max}"))
                .with_context("value", value)
        })
}

fn read_plain_body(root: &Object, metadata: &Metadata) -> Result<Body, Error> {
    let encoded = root
        .get(FIELD_BITS)
        .ok_or_else(|| Error::missing_field(FIELD_BITS))?
        .as_str()
        .ok_or_else(|| Error::invalid_field(FIELD_BITS, "a base64 string"))?;
    let bytes = STANDARD.decode(encoded).map_err(Error::invalid_base64)?;

    let max_len = metadata.num_bits.div_ceil(8);
    if bytes.len() as u64 > max_len {
        return Err(Error::malformed("bit array longer than filter size")
            .with_context("bytes", bytes.len())
            .with_context("m", metadata.num_bits));
    }
    Ok(Body::Plain { bytes })
}

fn read_counting_body(root: &Object, metadata: &Metadata) -> Result<Body, Error> {
    let counting_bits = read_integer(
        root,
        FIELD_COUNTING_BITS,
        u64::from(MIN_COUNTING_BITS),
        u64::from(MAX_COUNTING_BITS),
    )? as u8;
    let max_count = u64::MAX >> (64 - u32::from(counting_bits));

    let entries = root
        .get(FIELD_COUNTS)
        .and_then(Value::as_object)
        .ok_or_else(|| Error::invalid_field(FIELD_COUNTS, "an object"))?;

    let mut counts = BTreeMap::new();
    for (key, value) in entries {
        let position = key.parse::<u64>().map_err(|_| {
            Error::invalid_count_entry("position is not a non-negative integer")
                .with_context("position", key)
        })?;
        if position >= metadata.num_bits {
            return Err(Error::invalid_count_entry("position out of range")
                .with_context("position", position)
                .with_context("m", metadata.num_bits));
        }

        let count = value.as_u64().ok_or_else(|| {
            Error::invalid_count_entry("count is not a non-negative integer")
                .with_context("position", position)
                .with_context("count", value)
        })?;
        if count > max_count {
            return Err(Error::invalid_count_entry("count exceeds counter width")
                .with_context("position", position)
                .with_context("count", count)
                .with_context("c", counting_bits));
        }

        counts.insert(position, count);
    }

    Ok(Body::Counting {
        counting_bits,
        counts,
    })
}

fn restore(metadata: &Metadata, body: Body) -> Result<AnyBloomFilter, Error> {
    let builder = BloomFilterBuilder::with_size(metadata.num_bits, metadata.num_hashes)
        .hash_method(metadata.hash_method);

    match body {
        Body::Plain { bytes } => {
            let mut filter = builder.build();
            filter.set_bytes(&bytes).map_err(|err| {
                Error::malformed(err.message()).with_context("m", metadata.num_bits)
            })?;
            Ok(filter.into())
        }
        Body::Counting {
            counting_bits,
            counts,
        } => {
            let mut filter = builder.counting_bits(counting_bits).build_counting();
            trace!(entries = counts.len(), "restoring counters");
            for (position, count) in counts {
                filter.set_counter_and_bit(position, count).map_err(|err| {
                    Error::invalid_count_entry(err.message()).with_context("position", position)
                })?;
            }
            Ok(filter.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::codec::from_json;
    use crate::error::ErrorKind;

    fn decode_err(json: Value) -> ErrorKind {
        from_json(&json).unwrap_err().kind()
    }

    #[test]
    fn test_decode_empty_plain_filter() {
        let filter = from_json(&json!({"m": 320, "h": 3, "b": ""}))
            .unwrap()
            .into_plain()
            .unwrap();
        assert_eq!(filter.capacity(), 320);
        assert_eq!(filter.num_hashes(), 3);
        assert!(filter.is_empty());
        assert_eq!(filter.hash_method(), HashMethod::Murmur3KirschMitzenmacher);
    }

    #[test]
    fn test_decode_zero_extends_bits() {
        let filter = from_json(&json!({"m": 100, "h": 1, "b": "AYA="}))
            .unwrap()
            .into_plain()
            .unwrap();
        assert!(filter.get_bit(0));
        assert!(filter.get_bit(15));
        assert_eq!(filter.bits_used(), 2);
        assert_eq!(filter.to_bytes(), vec![0x01, 0x80]);
    }

    #[test]
    fn test_decode_counting_derives_bits() {
        let filter = from_json(&json!({"m": 64, "h": 2, "c": 4, "counts": {"1": 3, "63": 1, "5": 0}}))
            .unwrap()
            .into_counting()
            .unwrap();
        assert_eq!(filter.count_map(), BTreeMap::from([(1, 3), (63, 1)]));
        let bits = filter.as_bloom_filter();
        assert!(bits.get_bit(1));
        assert!(bits.get_bit(63));
        assert!(!bits.get_bit(5));
        assert_eq!(bits.bits_used(), 2);
    }

    #[test]
    fn test_counting_body_ignores_b() {
        let filter = from_json(&json!({"m": 8, "h": 1, "b": "/w==", "c": 2, "counts": {}})).unwrap();
        assert!(filter.is_counting());
        assert!(filter.to_bytes().is_empty());
    }

    #[test]
    fn test_metadata_errors() {
        assert_eq!(decode_err(json!([1, 2])), ErrorKind::MalformedJson);
        assert_eq!(decode_err(json!({"h": 3, "b": ""})), ErrorKind::MalformedJson);
        assert_eq!(decode_err(json!({"m": 320, "b": ""})), ErrorKind::MalformedJson);
        assert_eq!(decode_err(json!({"m": "320", "h": 3, "b": ""})), ErrorKind::MalformedJson);
        assert_eq!(decode_err(json!({"m": 320.5, "h": 3, "b": ""})), ErrorKind::MalformedJson);
        assert_eq!(decode_err(json!({"m": 0, "h": 3, "b": ""})), ErrorKind::MalformedJson);
        assert_eq!(decode_err(json!({"m": -8, "h": 3, "b": ""})), ErrorKind::MalformedJson);
        assert_eq!(decode_err(json!({"m": 320, "h": 0, "b": ""})), ErrorKind::MalformedJson);
        assert_eq!(decode_err(json!({"m": 320, "h": 70000, "b": ""})), ErrorKind::MalformedJson);
    }

    #[test]
    fn test_plain_body_errors() {
        assert_eq!(decode_err(json!({"m": 8, "h": 1})), ErrorKind::MalformedJson);
        assert_eq!(decode_err(json!({"m": 8, "h": 1, "b": 7})), ErrorKind::MalformedJson);
        assert_eq!(decode_err(json!({"m": 8, "h": 1, "b": "!!"})), ErrorKind::InvalidBase64);
        assert_eq!(decode_err(json!({"m": 8, "h": 1, "b": "AQ"})), ErrorKind::InvalidBase64);
        // two bytes do not fit in eight bits
        assert_eq!(decode_err(json!({"m": 8, "h": 1, "b": "AQE="})), ErrorKind::MalformedJson);
        // bit 4 of a four-bit filter
        assert_eq!(decode_err(json!({"m": 4, "h": 1, "b": "EA=="})), ErrorKind::MalformedJson);
    }

    #[test]
    fn test_counting_body_errors() {
        let counting = |c: Value, counts: Value| json!({"m": 16, "h": 2, "c": c, "counts": counts});

        assert_eq!(decode_err(counting(json!(0), json!({}))), ErrorKind::MalformedJson);
        assert_eq!(decode_err(counting(json!(65), json!({}))), ErrorKind::MalformedJson);
        assert_eq!(decode_err(counting(json!("8"), json!({}))), ErrorKind::MalformedJson);
        assert_eq!(decode_err(counting(json!(8), json!([1]))), ErrorKind::MalformedJson);

        for counts in [
            json!({"x": 1}),
            json!({"-1": 1}),
            json!({"1.5": 1}),
            json!({"16": 1}),
            json!({"3": -1}),
            json!({"3": 1.5}),
            json!({"3": "1"}),
            json!({"3": 256}),
        ] {
            assert_eq!(
                decode_err(counting(json!(8), counts.clone())),
                ErrorKind::InvalidCountEntry,
                "counts: {counts}"
            );
        }
    }

    #[test]
    fn test_hash_method_field() {
        let filter = from_json(&json!({"m": 8, "h": 1, "hashMethod": "Murmur3", "b": ""})).unwrap();
        assert_eq!(filter.hash_method(), HashMethod::Murmur3);

        assert_eq!(
            decode_err(json!({"m": 8, "h": 1, "hashMethod": "MD5", "b": ""})),
            ErrorKind::MalformedJson
        );
        assert_eq!(
            decode_err(json!({"m": 8, "h": 1, "hashMethod": 1, "b": ""})),
            ErrorKind::MalformedJson
        );

        let legacy = JsonCodec::new()
            .default_hash_method(HashMethod::Murmur3)
            .decode(&json!({"m": 8, "h": 1, "b": ""}))
            .unwrap();
        assert_eq!(legacy.hash_method(), HashMethod::Murmur3);
    }

    #[test]
    fn test_decode_str() {
        let filter = JsonCodec::new()
            .decode_str(r#"{"m":320,"h":3,"b":""}"#)
            .unwrap();
        assert_eq!(filter.capacity(), 320);

        let err = JsonCodec::new().decode_str(r#"{"m":320,"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedJson);
    }
}
