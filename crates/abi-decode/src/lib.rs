// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Head/tail ABI decoder over 32-byte word buffers.
//!
//! Decodes a call-data (or memory) buffer against a [`TypeDescriptor`] into a
//! [`Value`] tree, trusting nothing in the buffer:
//!
//! - every offset and length is bounds-checked before it is followed,
//! - nested dynamic values are addressed relative to their own head region,
//! - scalars go through per-kind cleanup rules.
//!
//! Two regimes share the same traversal and differ only in the predicates on
//! [`DecoderPolicy`]:
//!
//! - **strict** rejects dirty high bits, bools other than 0/1, out-of-range
//!   enum ordinals, invalid UTF-8 and unreferenced trailing bytes;
//! - **legacy** masks, truncates and sign-extends instead, and ignores
//!   trailing bytes.
//!
//! ```
//! use abi_decode::{decode, encode_params, DecoderPolicy, TypeDescriptor, Value};
//!
//! let ty: TypeDescriptor = "(uint256,uint16[])".parse()?;
//! let data = encode_params(&[
//!     Value::uint(9u8, 256),
//!     Value::Array(vec![Value::uint(11u8, 16), Value::uint(12u8, 16)]),
//! ]);
//! let value = decode(&data, &ty, DecoderPolicy::strict())?;
//! assert_eq!(value.at(&[1, 1]), Some(&Value::uint(12u8, 16)));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cleanup;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod policy;
pub mod signature;
pub mod types;
pub mod value;
pub mod word;

pub use alloy_primitives::{Address, B256, I256, U256};
pub use cleanup::{cleanup_scalar, cleanup_string};
pub use decoder::decode;
pub use encoder::{encode, encode_params};
pub use error::{DecodeError, DecodeErrorKind, PathSegment, TypeError, TypePath};
pub use policy::{DecoderMode, DecoderPolicy, TrailingBytes};
pub use signature::FunctionSignature;
pub use types::{Field, Primitive, TypeDescriptor, TypeKind, MAX_ENUM_MEMBERS, MAX_TYPE_DEPTH};
pub use value::Value;
pub use word::{Word, WORD_SIZE};

/// Decode call data (without selector) against a function's parameter list.
pub fn decode_params(
    buffer: &[u8],
    signature: &FunctionSignature,
    policy: DecoderPolicy,
) -> Result<Value, DecodeError> {
    signature.decode_params(buffer, policy)
}
