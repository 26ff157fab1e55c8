// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Canonical encoder, the inverse of [`decode`](crate::decode).
//!
//! Only produces canonical layouts: tails in field order directly after the
//! head region, byte strings zero-padded to a word, no gaps.

use crate::value::Value;
use crate::word::{padded_len, usize_to_word, Word, WORD_SIZE};
use alloy_primitives::B256;

/// In-place encoding of `value`.
pub fn encode(value: &Value) -> Vec<u8> {
    let mut out = Vec::new();
    enc_value(value, &mut out);
    out
}

/// Call-data encoding of a parameter list.
pub fn encode_params(params: &[Value]) -> Vec<u8> {
    let mut out = Vec::new();
    enc_seq(params, &mut out);
    out
}

fn enc_value(value: &Value, out: &mut Vec<u8>) {
    match value {
        Value::Uint(v, _) => out.extend_from_slice(&v.to_be_bytes::<WORD_SIZE>()),
        Value::Int(v, _) => out.extend_from_slice(&v.into_raw().to_be_bytes::<WORD_SIZE>()),
        Value::Bool(b) => out.extend_from_slice(&usize_to_word(usize::from(*b))),
        Value::Address(a) => out.extend_from_slice(a.into_word().as_slice()),
        Value::FixedBytes(word, size) => out.extend_from_slice(fixed_word(word, *size).as_slice()),
        Value::Enum(ordinal) => out.extend_from_slice(&usize_to_word(usize::from(*ordinal))),
        Value::Bytes(bytes) => enc_bytes(bytes, out),
        Value::String(s) => enc_bytes(s.as_bytes(), out),
        Value::Array(items) => {
            out.extend_from_slice(&usize_to_word(items.len()));
            enc_seq(items, out);
        }
        Value::FixedArray(items) | Value::Tuple(items) => enc_seq(items, out),
    }
}

fn fixed_word(word: &B256, size: u8) -> Word {
    let mut raw = word.0;
    raw[usize::from(size).min(WORD_SIZE)..].fill(0);
    raw
}

fn enc_bytes(bytes: &[u8], out: &mut Vec<u8>) {
    out.extend_from_slice(&usize_to_word(bytes.len()));
    out.extend_from_slice(bytes);
    let padded = padded_len(bytes.len()).unwrap_or(bytes.len());
    out.resize(out.len() + (padded - bytes.len()), 0);
}

/// Heads for every item, then the tails of the dynamic ones.
fn enc_seq(items: &[Value], out: &mut Vec<u8>) {
    let head_len: usize = items
        .iter()
        .map(|item| {
            if item.is_dynamic() {
                WORD_SIZE
            } else {
                static_len(item)
            }
        })
        .sum();
    let mut tails = Vec::new();
    for item in items {
        if item.is_dynamic() {
            out.extend_from_slice(&usize_to_word(head_len + tails.len()));
            enc_value(item, &mut tails);
        } else {
            enc_value(item, out);
        }
    }
    out.extend_from_slice(&tails);
}

fn static_len(value: &Value) -> usize {
    match value {
        Value::FixedArray(items) | Value::Tuple(items) => items.iter().map(static_len).sum(),
        _ => WORD_SIZE,
    }
}
