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

//! # Bloom filters over JSON
//!
//! Plain and counting Bloom filters, and a compact JSON wire format that carries them between
//! processes with full fidelity. A plain filter travels as its packed bit array; a counting
//! filter travels as a sparse map of its non-zero counters, from which the decoder rebuilds both
//! the counters and the membership bits.
//!
//! ```
//! use bloomjson::bloom::BloomFilterBuilder;
//! use bloomjson::codec;
//!
//! let mut filter = BloomFilterBuilder::with_accuracy(50, 0.1).build_counting();
//! filter.insert("Multi");
//! filter.insert("Multi");
//!
//! let json = codec::to_json(&filter).to_string();
//! let mut restored = codec::from_json_str(&json)
//!     .unwrap()
//!     .into_counting()
//!     .unwrap();
//! assert_eq!(restored.count_map(), filter.count_map());
//!
//! restored.remove(&"Multi");
//! assert!(restored.contains(&"Multi"));
//! ```
//!
//! This library is divided into modules that constitute distinct groups of functionality.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]

pub mod bloom;
pub mod codec;
pub mod error;
pub mod hash;
