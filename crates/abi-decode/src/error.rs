// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Error types for type construction and decoding.

use alloy_primitives::U256;
use core::fmt;
use thiserror::Error;

/// Errors raised while building or parsing a type descriptor.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TypeError {
    /// The descriptor is structurally invalid.
    #[error("malformed type: {0}")]
    MalformedType(String),
    /// The signature text does not follow the type grammar.
    #[error("syntax error at position {position}: {reason}")]
    Syntax {
        /// Byte position in the input where parsing stopped.
        position: usize,
        /// What the parser expected.
        reason: String,
    },
}

impl TypeError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedType(reason.into())
    }
}

/// The kind of violation that aborted a decode.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeErrorKind {
    /// A read would extend past the end of the buffer.
    #[error("buffer too short: need {needed} bytes at offset {offset}, buffer has {len}")]
    BufferTooShort {
        /// Start of the attempted read.
        offset: usize,
        /// Bytes the read needed.
        needed: usize,
        /// Total buffer length.
        len: usize,
    },
    /// A head slot holds an offset outside the enclosing tail region.
    #[error("offset {offset} out of bounds: region starts at {base}, buffer has {len} bytes")]
    OffsetOutOfBounds {
        /// Offset value as read from the head slot.
        offset: U256,
        /// Start of the region the offset is relative to.
        base: usize,
        /// Total buffer length.
        len: usize,
    },
    /// A declared count or byte length cannot fit in the remaining buffer.
    #[error("declared length {length} (x{unit} bytes) exceeds the {remaining} remaining bytes")]
    LengthOverflow {
        /// Length value as read from the count word.
        length: U256,
        /// Bytes occupied by one unit of the length.
        unit: usize,
        /// Bytes left after the count word.
        remaining: usize,
    },
    /// A bool word is neither 0 nor 1.
    #[error("invalid bool encoding: {0:#x}")]
    InvalidBoolEncoding(U256),
    /// An enum ordinal is outside the declared member range.
    #[error("enum ordinal {ordinal} out of range for {cardinality} members")]
    InvalidEnumOrdinal {
        /// Ordinal as read from the word.
        ordinal: U256,
        /// Number of declared members.
        cardinality: u16,
    },
    /// An integer or address word carries bits outside its declared width.
    #[error("value {value:#x} out of range for {bits}-bit integer (signed: {signed})")]
    InvalidIntegerRange {
        /// Raw word as unsigned.
        value: U256,
        /// Declared bit width.
        bits: u16,
        /// Whether the declared type is signed.
        signed: bool,
    },
    /// A `string` payload is not valid UTF-8.
    #[error("invalid utf-8 in string payload")]
    InvalidUtf8,
    /// The buffer continues past the last referenced byte.
    #[error("trailing bytes: {consumed} of {len} bytes referenced")]
    TrailingBytes {
        /// Furthest byte referenced by the decode.
        consumed: usize,
        /// Total buffer length.
        len: usize,
    },
}

/// One step from a parent value to a child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Named struct field or parameter.
    Field(String),
    /// Array element.
    Index(usize),
}

/// Location of a failing value, from the root of the decoded tree.
///
/// Rendered as `$` for the root, `$.b[1][1]` for nested children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypePath(Vec<PathSegment>);

impl TypePath {
    /// The root path.
    pub fn root() -> Self {
        Self::default()
    }

    /// Segments from the root to the failing value.
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    fn prepend(&mut self, segment: PathSegment) {
        self.0.insert(0, segment);
    }
}

impl fmt::Display for TypePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for segment in &self.0 {
            match segment {
                PathSegment::Field(name) => write!(f, ".{name}")?,
                PathSegment::Index(i) => write!(f, "[{i}]")?,
            }
        }
        Ok(())
    }
}

/// A decode failure with the path of the value being decoded.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{kind} at {path}")]
pub struct DecodeError {
    kind: DecodeErrorKind,
    path: TypePath,
}

impl DecodeError {
    /// What went wrong.
    pub fn kind(&self) -> &DecodeErrorKind {
        &self.kind
    }

    /// Where it went wrong.
    pub fn path(&self) -> &TypePath {
        &self.path
    }

    /// Re-root this error one level up, under `segment`.
    pub(crate) fn within(mut self, segment: PathSegment) -> Self {
        self.path.prepend(segment);
        self
    }
}

impl From<DecodeErrorKind> for DecodeError {
    fn from(kind: DecodeErrorKind) -> Self {
        Self {
            kind,
            path: TypePath::root(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_renders_fields_and_indices() {
        let err = DecodeError::from(DecodeErrorKind::InvalidUtf8)
            .within(PathSegment::Index(1))
            .within(PathSegment::Index(0))
            .within(PathSegment::Field("b".into()));
        assert_eq!(err.path().to_string(), "$.b[0][1]");
        assert_eq!(err.to_string(), "invalid utf-8 in string payload at $.b[0][1]");
    }

    #[test]
    fn root_path_is_dollar() {
        let err = DecodeError::from(DecodeErrorKind::InvalidBoolEncoding(U256::from(2u8)));
        assert_eq!(err.path().to_string(), "$");
        assert!(err.path().segments().is_empty());
        let msg = err.to_string();
        assert!(msg.starts_with("invalid bool encoding"), "{msg}");
        assert!(msg.ends_with(" at $"), "{msg}");
    }
}
