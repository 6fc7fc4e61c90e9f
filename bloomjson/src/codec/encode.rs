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

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde_json::Map;
use serde_json::Value;

use super::FIELD_BITS;
use super::FIELD_COUNTING_BITS;
use super::FIELD_COUNTS;
use super::FIELD_HASH_METHOD;
use super::FIELD_HASHES;
use super::FIELD_SIZE;
use super::JsonCodec;
use crate::bloom::FilterRef;

impl JsonCodec {
    /// Encodes a filter as a JSON object.
    ///
    /// Writes `m` and `h`, then either the counter width `c` and the non-zero `counts` of a
    /// counting filter, or the base64 bit array `b` of a plain filter. Encoding takes a snapshot
    /// and cannot fail.
    ///
    /// # Examples
    ///
    /// ```
    /// use bloomjson::bloom::BloomFilterBuilder;
    /// use bloomjson::codec::JsonCodec;
    ///
    /// let mut filter = BloomFilterBuilder::with_size(480, 4)
    ///     .counting_bits(8)
    ///     .build_counting();
    /// filter.insert("Twice");
    /// filter.insert("Twice");
    ///
    /// let json = JsonCodec::new().encode(&filter);
    /// assert_eq!(json["c"], 8);
    /// assert!(json.get("b").is_none());
    /// for count in json["counts"].as_object().unwrap().values() {
    ///     assert!(count.as_u64().unwrap() >= 2);
    /// }
    /// ```
    pub fn encode<'a>(&self, filter: impl Into<FilterRef<'a>>) -> Value {
        let filter = filter.into();

        let mut root = Map::new();
        root.insert(FIELD_SIZE.to_string(), Value::from(filter.capacity()));
        root.insert(FIELD_HASHES.to_string(), Value::from(filter.num_hashes()));
        if self.emit_hash_method {
            root.insert(
                FIELD_HASH_METHOD.to_string(),
                Value::from(filter.hash_method().name()),
            );
        }

        match filter {
            FilterRef::Counting(counting) => {
                root.insert(
                    FIELD_COUNTING_BITS.to_string(),
                    Value::from(counting.counting_bits()),
                );

                let counts: Map<String, Value> = counting
                    .count_map()
                    .into_iter()
                    .filter(|&(_, count)| count > 0)
                    .map(|(position, count)| (position.to_string(), Value::from(count)))
                    .collect();
                root.insert(FIELD_COUNTS.to_string(), Value::Object(counts));
            }
            FilterRef::Plain(plain) => {
                root.insert(
                    FIELD_BITS.to_string(),
                    Value::from(encode_bits(&plain.to_bytes())),
                );
            }
        }

        Value::Object(root)
    }
}

pub(super) fn encode_bits(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::bloom::BloomFilterBuilder;
    use crate::codec::to_base64;
    use crate::codec::to_json;

    #[test]
    fn test_empty_plain_filter() {
        let filter = BloomFilterBuilder::with_size(320, 3).build();
        assert_eq!(to_json(&filter), json!({"m": 320, "h": 3, "b": ""}));
    }

    #[test]
    fn test_plain_filter_bits() {
        let mut filter = BloomFilterBuilder::with_size(16, 1).build();
        filter.set_bit(0, true);
        filter.set_bit(15, true);
        // bytes [0x01, 0x80]
        assert_eq!(to_json(&filter), json!({"m": 16, "h": 1, "b": "AYA="}));
        assert_eq!(to_base64(&filter), "AYA=");
    }

    #[test]
    fn test_field_order() {
        let filter = BloomFilterBuilder::with_size(8, 1).build();
        let json = JsonCodec::new().emit_hash_method(true).encode(&filter);
        assert_eq!(
            json.to_string(),
            r#"{"m":8,"h":1,"hashMethod":"Murmur3KirschMitzenmacher","b":""}"#
        );
    }

    #[test]
    fn test_counting_filter_body() {
        let mut filter = BloomFilterBuilder::with_size(100, 2)
            .counting_bits(8)
            .build_counting();
        filter.set_counter_and_bit(3, 2).unwrap();
        filter.set_counter_and_bit(70, 1).unwrap();
        filter.set_counter_and_bit(12, 0).unwrap();

        assert_eq!(
            to_json(&filter),
            json!({"m": 100, "h": 2, "c": 8, "counts": {"3": 2, "70": 1}})
        );
        // the membership bits are still available on their own
        assert_eq!(to_base64(&filter), "CAAAAAAAAABA");
    }

    #[test]
    fn test_empty_counting_filter() {
        let filter = BloomFilterBuilder::with_size(100, 2).build_counting();
        assert_eq!(
            to_json(&filter),
            json!({"m": 100, "h": 2, "c": 16, "counts": {}})
        );
    }
}
