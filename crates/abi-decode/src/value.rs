// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Decoded value tree.
//!
//! A [`Value`] mirrors the [`TypeDescriptor`](crate::TypeDescriptor) it was
//! decoded against. It owns all of its children and has no behaviour beyond
//! construction, inspection and structural equality.

use crate::word::{Word, WORD_SIZE};
use alloy_primitives::ruint::UintTryFrom;
use alloy_primitives::{Address, B256, I256, U256};
use core::fmt;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A decoded value.
///
/// Serialized as `{ "kind": "...", "value": ... }` when the `serde` feature is on.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", content = "value", rename_all = "snake_case"))]
pub enum Value {
    /// Unsigned integer and its declared bit width.
    Uint(U256, u16),
    /// Signed integer and its declared bit width.
    Int(I256, u16),
    /// Boolean.
    Bool(bool),
    /// Address.
    Address(Address),
    /// Fixed bytes, left-aligned in a word, and the declared size.
    FixedBytes(B256, u8),
    /// Enum ordinal.
    Enum(u8),
    /// Dynamic byte string.
    Bytes(Vec<u8>),
    /// Dynamic string.
    String(String),
    /// Elements of a `T[k]`.
    FixedArray(Vec<Value>),
    /// Elements of a `T[]`.
    Array(Vec<Value>),
    /// Fields of a struct or parameter list, in order.
    Tuple(Vec<Value>),
}

impl Value {
    /// Unsigned integer of the given width.
    pub fn uint<T>(value: T, bits: u16) -> Self
    where
        U256: UintTryFrom<T>,
    {
        Self::Uint(U256::from(value), bits)
    }

    /// Signed integer of the given width.
    pub fn int(value: i64, bits: u16) -> Self {
        let mut word: Word = if value < 0 {
            [0xff; WORD_SIZE]
        } else {
            [0; WORD_SIZE]
        };
        word[WORD_SIZE - 8..].copy_from_slice(&value.to_be_bytes());
        Self::Int(I256::from_raw(U256::from_be_bytes(word)), bits)
    }

    /// Fixed bytes from a slice of `1..=32` bytes.
    pub fn fixed_bytes(bytes: &[u8]) -> Option<Self> {
        let size = u8::try_from(bytes.len()).ok()?;
        if bytes.is_empty() || bytes.len() > WORD_SIZE {
            return None;
        }
        let mut word = B256::ZERO;
        word[..bytes.len()].copy_from_slice(bytes);
        Some(Self::FixedBytes(word, size))
    }

    /// The unsigned integer, if this is one.
    pub fn as_uint(&self) -> Option<U256> {
        match self {
            Self::Uint(value, _) => Some(*value),
            _ => None,
        }
    }

    /// The signed integer, if this is one.
    pub fn as_int(&self) -> Option<I256> {
        match self {
            Self::Int(value, _) => Some(*value),
            _ => None,
        }
    }

    /// The boolean, if this is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// The address, if this is one.
    pub fn as_address(&self) -> Option<Address> {
        match self {
            Self::Address(value) => Some(*value),
            _ => None,
        }
    }

    /// The enum ordinal, if this is one.
    pub fn as_enum(&self) -> Option<u8> {
        match self {
            Self::Enum(ordinal) => Some(*ordinal),
            _ => None,
        }
    }

    /// The significant bytes of fixed bytes or the payload of dynamic bytes.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::FixedBytes(word, size) => word.get(..usize::from(*size)),
            Self::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// The string, if this is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Children of an array or tuple.
    pub fn as_slice(&self) -> Option<&[Value]> {
        match self {
            Self::FixedArray(items) | Self::Array(items) | Self::Tuple(items) => Some(items),
            _ => None,
        }
    }

    /// Follow child indices from this value.
    ///
    /// `value.at(&[1, 1])` is `b[1][1]` when `value` is the array `b`.
    pub fn at(&self, path: &[usize]) -> Option<&Value> {
        let Some((first, rest)) = path.split_first() else {
            return Some(self);
        };
        self.as_slice()?.get(*first)?.at(rest)
    }

    /// Whether this value is encoded behind an offset.
    pub fn is_dynamic(&self) -> bool {
        match self {
            Self::Bytes(_) | Self::String(_) | Self::Array(_) => true,
            Self::FixedArray(items) | Self::Tuple(items) => items.iter().any(Value::is_dynamic),
            _ => false,
        }
    }
}

fn write_seq(
    f: &mut fmt::Formatter<'_>,
    open: &str,
    items: &[Value],
    close: &str,
) -> fmt::Result {
    f.write_str(open)?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        fmt::Display::fmt(item, f)?;
    }
    f.write_str(close)
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uint(value, _) => write!(f, "{value}"),
            Self::Int(value, _) => write!(f, "{value}"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Address(value) => write!(f, "{value}"),
            Self::Enum(ordinal) => write!(f, "{ordinal}"),
            Self::FixedBytes(..) | Self::Bytes(_) => {
                write!(f, "0x{}", hex::encode(self.as_bytes().unwrap_or_default()))
            }
            Self::String(s) => write!(f, "{s:?}"),
            Self::FixedArray(items) | Self::Array(items) => write_seq(f, "[", items, "]"),
            Self::Tuple(items) => write_seq(f, "(", items, ")"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_int_is_sign_extended() {
        let v = Value::int(-1, 16);
        assert_eq!(v.as_int(), Some(I256::MINUS_ONE));
        assert_eq!(Value::int(4, 24).as_int().map(I256::into_raw), Some(U256::from(4u8)));
    }

    #[test]
    fn fixed_bytes_are_left_aligned() {
        let v = Value::fixed_bytes(b"abc").unwrap();
        assert_eq!(v.as_bytes(), Some(&b"abc"[..]));
        let Value::FixedBytes(word, 3) = v else {
            panic!("expected bytes3");
        };
        assert_eq!(&word[..3], b"abc");
        assert!(word[3..].iter().all(|b| *b == 0));
        assert!(Value::fixed_bytes(&[]).is_none());
        assert!(Value::fixed_bytes(&[0; 33]).is_none());
    }

    #[test]
    fn uint_accepts_any_primitive_width() {
        assert_eq!(Value::uint(11u8, 16), Value::Uint(U256::from(11u64), 16));
        assert_eq!(Value::uint(0xffffu16, 16).as_uint(), Some(U256::from(65_535u32)));
        assert_eq!(Value::uint(u128::MAX, 128).as_uint(), Some(U256::from(u128::MAX)));
        assert_eq!(Value::uint(U256::MAX, 256).as_uint(), Some(U256::MAX));
    }

    #[test]
    fn path_lookup() {
        let v = Value::Array(vec![
            Value::Array(vec![]),
            Value::Array(vec![Value::uint(11u8, 16), Value::uint(12u8, 16)]),
        ]);
        assert_eq!(v.at(&[1, 1]).and_then(Value::as_uint), Some(U256::from(12u8)));
        assert_eq!(v.at(&[]), Some(&v));
        assert!(v.at(&[0, 0]).is_none());
        assert!(v.at(&[1, 1, 0]).is_none());
    }

    #[test]
    fn dynamic_classification() {
        assert!(!Value::Tuple(vec![Value::Bool(true)]).is_dynamic());
        assert!(Value::FixedArray(vec![Value::String(String::new())]).is_dynamic());
        assert!(Value::Array(vec![]).is_dynamic());
    }

    #[test]
    fn display_is_compact() {
        let v = Value::Tuple(vec![
            Value::uint(7u8, 256),
            Value::int(-3, 8),
            Value::fixed_bytes(b"ab").unwrap(),
            Value::Array(vec![Value::Bool(true), Value::Enum(1)]),
            Value::String("hi".into()),
        ]);
        assert_eq!(v.to_string(), "(7, -3, 0x6162, [true, 1], \"hi\")");
        assert_eq!(Value::FixedArray(vec![]).to_string(), "[]");
    }
}
