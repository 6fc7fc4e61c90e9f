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

use serde_json::Map;
use serde_json::Value;

use super::FIELD_BITS;
use super::FIELD_COUNTING_BITS;
use super::FIELD_COUNTS;

/// The two body encodings of the wire format.
///
/// The format carries no discriminator: the kind is inferred from which body fields are present.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BodyKind {
    /// Packed bit array in field `b`.
    Plain,
    /// Counter width in field `c` and sparse count map in field `counts`.
    Counting,
}

impl BodyKind {
    /// Detects the body kind of a filter object.
    ///
    /// An object is a counting filter exactly when both `c` and `counts` are present, whatever
    /// their values; everything else is decoded as a plain filter.
    pub fn detect(root: &Map<String, Value>) -> BodyKind {
        if BodyKind::Counting
            .fields()
            .iter()
            .all(|field| root.contains_key(*field))
        {
            BodyKind::Counting
        } else {
            BodyKind::Plain
        }
    }

    /// The body fields of this kind.
    pub const fn fields(self) -> &'static [&'static str] {
        match self {
            BodyKind::Plain => &[FIELD_BITS],
            BodyKind::Counting => &[FIELD_COUNTING_BITS, FIELD_COUNTS],
        }
    }

    /// A short name for diagnostics.
    pub const fn name(self) -> &'static str {
        match self {
            BodyKind::Plain => "plain",
            BodyKind::Counting => "counting",
        }
    }
}
