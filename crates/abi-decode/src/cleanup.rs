// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Per-kind cleanup rules: raw word → validated scalar.
//!
//! Word layout per kind:
//!
//! - `uint<N>`: low-order N/8 bytes, higher bytes zero.
//! - `int<N>`: low-order N/8 bytes, higher bytes a copy of the sign bit.
//! - `bool`: lowest bit, all other bits zero.
//! - `address`: low-order 20 bytes.
//! - `bytes<N>`: high-order N bytes; the rest is ignored.
//! - `enum`: like `uint8`, ordinal below the member count.
//!
//! Strict policy rejects a word that violates its layout. Legacy policy coerces
//! it: integers and addresses are truncated to their width, any nonzero bool is
//! `true`, enums keep their low byte.

use crate::error::DecodeErrorKind;
use crate::policy::DecoderPolicy;
use crate::types::Primitive;
use crate::value::Value;
use crate::word::{word_to_u256, Word, WORD_SIZE};
use alloy_primitives::{Address, B256, I256, U256};

const ADDRESS_SIZE: usize = 20;

/// Validate or coerce `raw` as a `primitive`.
pub fn cleanup_scalar(
    raw: &Word,
    primitive: Primitive,
    policy: DecoderPolicy,
) -> Result<Value, DecodeErrorKind> {
    match primitive {
        Primitive::Uint(bits) => {
            let word = narrow(raw, int_width(bits), 0x00, policy).ok_or_else(|| {
                DecodeErrorKind::InvalidIntegerRange {
                    value: word_to_u256(raw),
                    bits,
                    signed: false,
                }
            })?;
            Ok(Value::Uint(U256::from_be_bytes(word), bits))
        }
        Primitive::Int(bits) => {
            let width = int_width(bits);
            let fill = if raw[WORD_SIZE - width] & 0x80 == 0 {
                0x00
            } else {
                0xff
            };
            let word = narrow(raw, width, fill, policy).ok_or_else(|| {
                DecodeErrorKind::InvalidIntegerRange {
                    value: word_to_u256(raw),
                    bits,
                    signed: true,
                }
            })?;
            Ok(Value::Int(I256::from_raw(U256::from_be_bytes(word)), bits))
        }
        Primitive::Address => {
            let word = narrow(raw, ADDRESS_SIZE, 0x00, policy).ok_or_else(|| {
                DecodeErrorKind::InvalidIntegerRange {
                    value: word_to_u256(raw),
                    bits: 160,
                    signed: false,
                }
            })?;
            Ok(Value::Address(Address::from_word(B256::from(word))))
        }
        Primitive::Bool => {
            let value = word_to_u256(raw);
            if value > U256::from(1u8) && policy.enforces_bool_encoding() {
                return Err(DecodeErrorKind::InvalidBoolEncoding(value));
            }
            Ok(Value::Bool(!value.is_zero()))
        }
        Primitive::FixedBytes(size) => {
            let mut word = *raw;
            word[usize::from(size).min(WORD_SIZE)..].fill(0);
            Ok(Value::FixedBytes(B256::from(word), size))
        }
        Primitive::Enum(cardinality) => {
            let ordinal = word_to_u256(raw);
            if ordinal >= U256::from(cardinality) && policy.enforces_enum_range() {
                return Err(DecodeErrorKind::InvalidEnumOrdinal {
                    ordinal,
                    cardinality,
                });
            }
            Ok(Value::Enum(raw[WORD_SIZE - 1]))
        }
    }
}

/// Validate or coerce a `string` payload.
pub fn cleanup_string(bytes: &[u8], policy: DecoderPolicy) -> Result<String, DecodeErrorKind> {
    if policy.enforces_utf8() {
        core::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| DecodeErrorKind::InvalidUtf8)
    } else {
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}

fn int_width(bits: u16) -> usize {
    usize::from(bits / 8).clamp(1, WORD_SIZE)
}

/// Check that every byte above the low `width` bytes equals `fill`.
///
/// Returns the word with those bytes forced to `fill`, or `None` when the
/// policy enforces integer range and the check failed.
fn narrow(raw: &Word, width: usize, fill: u8, policy: DecoderPolicy) -> Option<Word> {
    let mut word = *raw;
    let high = &mut word[..WORD_SIZE - width];
    if high.iter().any(|b| *b != fill) {
        if policy.enforces_integer_range() {
            return None;
        }
        high.fill(fill);
    }
    Some(word)
}
