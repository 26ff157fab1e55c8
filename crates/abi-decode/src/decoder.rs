// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Head/tail decoder.
//!
//! Layout recap:
//!
//! - A static type is encoded in place: scalars take one word, static arrays
//!   and structs take their children back to back.
//! - A dynamic type takes one head word holding a byte offset. The offset is
//!   relative to the start of the head region that contains the slot, and
//!   points at the value's tail.
//! - A dynamic array's tail is a count word followed by a new head region for
//!   its elements. `bytes`/`string` tails are a length word followed by the
//!   payload, right-padded to a word; the padding must be present.
//!
//! The decoder threads the current region base through the recursion and
//! bounds-checks every dereference against the buffer before reading.

use crate::cleanup::{cleanup_scalar, cleanup_string};
use crate::error::{DecodeError, DecodeErrorKind, PathSegment};
use crate::policy::DecoderPolicy;
use crate::types::{TypeDescriptor, TypeKind};
use crate::value::Value;
use crate::word::{padded_len, word_to_u256, word_to_usize, Word, WORD_SIZE};
use alloy_primitives::U256;
use tracing::{debug, instrument, trace};

type Result<T> = std::result::Result<T, DecodeError>;

/// Decode the in-place encoding of `ty` at the start of `buffer`.
///
/// For a struct this is the call-data layout: the fields' head region starts
/// at byte 0.
#[instrument(
    level = "debug",
    skip_all,
    fields(len = buffer.len(), ty = %ty, mode = ?policy.mode())
)]
pub fn decode(buffer: &[u8], ty: &TypeDescriptor, policy: DecoderPolicy) -> Result<Value> {
    let mut cursor = Cursor::new(buffer, policy);
    let result = cursor
        .decode_in_place(ty, 0)
        .and_then(|value| cursor.finish().map(|()| value));
    if let Err(err) = &result {
        debug!(%err, "decode failed");
    }
    result
}

/// Per-call decode state.
struct Cursor<'a> {
    buf: &'a [u8],
    policy: DecoderPolicy,
    /// Furthest byte referenced so far.
    high_water: usize,
}

impl<'a> Cursor<'a> {
    fn new(buf: &'a [u8], policy: DecoderPolicy) -> Self {
        Self {
            buf,
            policy,
            high_water: 0,
        }
    }

    fn too_short(&self, offset: usize, needed: usize) -> DecodeErrorKind {
        DecodeErrorKind::BufferTooShort {
            offset,
            needed,
            len: self.buf.len(),
        }
    }

    fn remaining(&self, from: usize) -> usize {
        self.buf.len().saturating_sub(from)
    }

    fn mark(&mut self, end: usize) {
        self.high_water = self.high_water.max(end.min(self.buf.len()));
    }

    fn read(
        &mut self,
        offset: usize,
        len: usize,
    ) -> std::result::Result<&'a [u8], DecodeErrorKind> {
        let bytes = offset
            .checked_add(len)
            .and_then(|end| self.buf.get(offset..end))
            .ok_or_else(|| self.too_short(offset, len))?;
        self.mark(offset + len);
        Ok(bytes)
    }

    fn word(&mut self, offset: usize) -> std::result::Result<&'a Word, DecodeErrorKind> {
        let bytes = self.read(offset, WORD_SIZE)?;
        bytes
            .try_into()
            .map_err(|_| self.too_short(offset, WORD_SIZE))
    }

    /// Read the count word at `at` and check `count * unit` fits after it.
    fn length(&mut self, at: usize, unit: usize) -> std::result::Result<usize, DecodeErrorKind> {
        let raw = *self.word(at)?;
        let remaining = self.remaining(at + WORD_SIZE);
        word_to_usize(&raw)
            .filter(|count| {
                count
                    .checked_mul(unit)
                    .is_some_and(|total| total <= remaining)
            })
            .ok_or_else(|| DecodeErrorKind::LengthOverflow {
                length: word_to_u256(&raw),
                unit,
                remaining,
            })
    }

    /// Turn the offset in head slot `raw` into an absolute position.
    ///
    /// The offset must land inside the buffer; see `decode_head` for the one
    /// exception.
    fn resolve(&self, raw: &Word, region: usize) -> std::result::Result<usize, DecodeErrorKind> {
        let remaining = self.remaining(region);
        let offset = word_to_usize(raw)
            .filter(|offset| *offset < remaining)
            .ok_or_else(|| DecodeErrorKind::OffsetOutOfBounds {
                offset: word_to_u256(raw),
                base: region,
                len: self.buf.len(),
            })?;
        trace!(offset, base = region, "tail offset");
        Ok(region + offset)
    }

    fn finish(&self) -> Result<()> {
        if self.policy.rejects_trailing_bytes() && self.high_water < self.buf.len() {
            return Err(DecodeErrorKind::TrailingBytes {
                consumed: self.high_water,
                len: self.buf.len(),
            }
            .into());
        }
        Ok(())
    }

    /// Decode `ty` from its head slot at `head` inside the region based at `region`.
    fn decode_head(&mut self, ty: &TypeDescriptor, head: usize, region: usize) -> Result<Value> {
        if !ty.is_dynamic() {
            return self.decode_in_place(ty, head);
        }
        let raw = *self.word(head)?;
        // A dynamic array may point one past the end: it reads as empty.
        if matches!(ty.kind(), TypeKind::DynamicArray { .. })
            && word_to_usize(&raw) == Some(self.remaining(region))
        {
            trace!(base = region, "empty array at the buffer end");
            return Ok(Value::Array(Vec::new()));
        }
        let tail = self.resolve(&raw, region)?;
        self.decode_in_place(ty, tail)
    }

    /// Decode the encoding of `ty` that starts at `at`.
    fn decode_in_place(&mut self, ty: &TypeDescriptor, at: usize) -> Result<Value> {
        match ty.kind() {
            TypeKind::Primitive(primitive) => {
                let raw = self.word(at)?;
                Ok(cleanup_scalar(raw, *primitive, self.policy)?)
            }
            TypeKind::Bytes => Ok(Value::Bytes(self.byte_string(at)?.to_vec())),
            TypeKind::String => {
                let bytes = self.byte_string(at)?;
                Ok(Value::String(cleanup_string(bytes, self.policy)?))
            }
            TypeKind::FixedArray { element, length } => {
                let step = element.head_bytes();
                let needed = length
                    .checked_mul(step)
                    .filter(|needed| *needed <= self.remaining(at))
                    .ok_or_else(|| self.too_short(at, length.saturating_mul(step)))?;
                self.mark(at + needed);
                Ok(Value::FixedArray(self.elements(element, *length, at)?))
            }
            TypeKind::DynamicArray { element } => {
                let count = self.length(at, element.head_bytes())?;
                Ok(Value::Array(self.elements(element, count, at + WORD_SIZE)?))
            }
            TypeKind::Struct { fields } => {
                let mut values = Vec::with_capacity(fields.len());
                let mut head = at;
                for field in fields {
                    let value = self
                        .decode_head(field.ty(), head, at)
                        .map_err(|err| err.within(PathSegment::Field(field.name().to_owned())))?;
                    values.push(value);
                    // The slot was just read, so `head` is still inside the buffer.
                    head += field.ty().head_bytes();
                }
                Ok(Value::Tuple(values))
            }
        }
    }

    /// Decode `count` element heads laid out from `region`.
    ///
    /// Callers have checked that `count` heads fit in the buffer.
    fn elements(
        &mut self,
        element: &TypeDescriptor,
        count: usize,
        region: usize,
    ) -> Result<Vec<Value>> {
        let step = element.head_bytes();
        let mut items = Vec::with_capacity(count);
        for i in 0..count {
            let value = self
                .decode_head(element, region + i * step, region)
                .map_err(|err| err.within(PathSegment::Index(i)))?;
            items.push(value);
        }
        Ok(items)
    }

    /// Payload of a `bytes`/`string` tail. The zero padding must be present too.
    fn byte_string(&mut self, at: usize) -> std::result::Result<&'a [u8], DecodeErrorKind> {
        let len = self.length(at, 1)?;
        let start = at + WORD_SIZE;
        let remaining = self.remaining(start);
        let padded = padded_len(len)
            .filter(|padded| *padded <= remaining)
            .ok_or_else(|| DecodeErrorKind::LengthOverflow {
                length: U256::from(len),
                unit: 1,
                remaining,
            })?;
        let bytes = self.read(start, len)?;
        self.mark(start + padded);
        Ok(bytes)
    }
}
