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

use bloomjson::bloom::CountingBloomFilter;

/// Distinct items that were never inserted into any filter of these tests.
#[allow(dead_code)] // false-positive
pub fn probe_items(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("probe-{i}")).collect()
}

/// Asserts that every membership bit of a counting filter equals `counter > 0`.
#[allow(dead_code)] // false-positive
pub fn assert_bits_match_counters(filter: &CountingBloomFilter) {
    let bytes = filter.to_bytes();
    for position in 0..filter.capacity() {
        let byte = bytes.get((position / 8) as usize).copied().unwrap_or(0);
        let bit = byte & (1 << (position % 8)) != 0;
        assert_eq!(
            bit,
            filter.count_of(position) > 0,
            "bit and counter disagree at position {position}"
        );
    }
}
