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

//! Error types for Bloom filter encoding and decoding.

use std::fmt;

/// ErrorKind is all kinds of Error of bloomjson.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The argument provided is invalid.
    InvalidArgument,
    /// The JSON document is not a filter: mandatory fields are missing or mis-typed, or the
    /// body does not fit the declared filter size.
    MalformedJson,
    /// The packed bit array of a plain filter is not valid base64.
    InvalidBase64,
    /// An entry of a counting filter's count map has a non-integer key or value, or names a
    /// position outside the filter.
    InvalidCountEntry,
}

impl ErrorKind {
    /// Convert this error kind instance into static str.
    pub const fn into_static(self) -> &'static str {
        match self {
            ErrorKind::InvalidArgument => "InvalidArgument",
            ErrorKind::MalformedJson => "MalformedJson",
            ErrorKind::InvalidBase64 => "InvalidBase64",
            ErrorKind::InvalidCountEntry => "InvalidCountEntry",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.into_static())
    }
}

/// Error is the error struct returned by all bloomjson functions.
///
/// # Examples
///
/// ```
/// # use bloomjson::error::Error;
/// # use bloomjson::error::ErrorKind;
/// let err = Error::new(ErrorKind::MalformedJson, "missing field `m`");
/// assert_eq!(err.kind(), ErrorKind::MalformedJson);
/// assert_eq!(err.message(), "missing field `m`");
/// ```
pub struct Error {
    kind: ErrorKind,
    message: String,
    context: Vec<(&'static str, String)>,
}

impl Error {
    /// Create a new Error with error kind and message.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            context: vec![],
        }
    }

    /// Add more context in error.
    pub fn with_context(mut self, key: &'static str, value: impl ToString) -> Self {
        self.context.push((key, value.to_string()));
        self
    }

    /// Return error's kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Return error's message.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }
}

// Convenient constructors used within bloomjson crate.
impl Error {
    pub(crate) fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, msg)
    }

    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedJson, msg)
    }

    pub(crate) fn missing_field(field: &'static str) -> Self {
        Self::malformed(format!("missing field `{field}`"))
    }

    pub(crate) fn invalid_field(field: &'static str, expected: impl fmt::Display) -> Self {
        Self::malformed(format!("invalid field `{field}`: expected {expected}"))
    }

    pub(crate) fn invalid_base64(cause: impl fmt::Display) -> Self {
        Self::new(ErrorKind::InvalidBase64, format!("invalid base64: {cause}"))
    }

    pub(crate) fn invalid_count_entry(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidCountEntry, msg)
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // If alternate has been specified, we will print like Debug.
        if f.alternate() {
            let mut de = f.debug_struct("Error");
            de.field("kind", &self.kind);
            de.field("message", &self.message);
            de.field("context", &self.context);
            return de.finish();
        }

        write!(f, "{}", self.kind)?;
        if !self.message.is_empty() {
            write!(f, " => {}", self.message)?;
        }
        writeln!(f)?;

        if !self.context.is_empty() {
            writeln!(f)?;
            writeln!(f, "Context:")?;
            for (k, v) in self.context.iter() {
                writeln!(f, "   {k}: {v}")?;
            }
        }

        Ok(())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;

        if !self.context.is_empty() {
            write!(f, ", context: {{ ")?;
            for (i, (k, v)) in self.context.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{k}: {v}")?;
            }
            write!(f, " }}")?;
        }

        if !self.message.is_empty() {
            write!(f, " => {}", self.message)?;
        }

        Ok(())
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;

    use super::*;

    #[test]
    fn test_format_consistency() {
        let err = Error::missing_field("m");
        assert_snapshot!(err, @"MalformedJson => missing field `m`");
    }

    #[test]
    fn test_format_with_context() {
        let err = Error::invalid_count_entry("position out of range")
            .with_context("position", 480)
            .with_context("size", 480);
        assert_snapshot!(err, @"InvalidCountEntry, context: { position: 480, size: 480 } => position out of range");
    }

    #[test]
    fn test_invalid_base64_message() {
        let err = Error::invalid_base64("bad padding");
        assert_eq!(err.kind(), ErrorKind::InvalidBase64);
        assert_eq!(err.message(), "invalid base64: bad padding");
    }
}
