// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Decoder policy: which validation regime a decode runs under.
//!
//! The traversal is shared by both regimes. Every place the regimes differ
//! asks one of the predicates on [`DecoderPolicy`]; nothing else branches on
//! the mode.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Validation regime for scalar cleanup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DecoderMode {
    /// Out-of-range scalar encodings are coerced (masked, truncated, sign-extended).
    Legacy,
    /// Out-of-range scalar encodings are rejected.
    #[default]
    Strict,
}

/// Handling of bytes past the furthest byte a decode referenced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TrailingBytes {
    /// Unreferenced trailing bytes are ignored.
    Allow,
    /// Unreferenced trailing bytes fail the decode.
    #[default]
    Reject,
}

/// Immutable decoder configuration, passed by value through the traversal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DecoderPolicy {
    mode: DecoderMode,
    trailing_bytes: TrailingBytes,
}

impl DecoderPolicy {
    /// Strict scalar validation, trailing bytes rejected.
    pub const fn strict() -> Self {
        Self {
            mode: DecoderMode::Strict,
            trailing_bytes: TrailingBytes::Reject,
        }
    }

    /// Lenient scalar coercion, trailing bytes ignored.
    pub const fn legacy() -> Self {
        Self {
            mode: DecoderMode::Legacy,
            trailing_bytes: TrailingBytes::Allow,
        }
    }

    /// Preset for `mode`.
    pub const fn for_mode(mode: DecoderMode) -> Self {
        match mode {
            DecoderMode::Legacy => Self::legacy(),
            DecoderMode::Strict => Self::strict(),
        }
    }

    /// Same policy with a different trailing-bytes rule.
    pub const fn with_trailing_bytes(self, trailing_bytes: TrailingBytes) -> Self {
        Self {
            mode: self.mode,
            trailing_bytes,
        }
    }

    /// Scalar validation regime.
    pub const fn mode(self) -> DecoderMode {
        self.mode
    }

    /// Trailing-bytes rule.
    pub const fn trailing_bytes(self) -> TrailingBytes {
        self.trailing_bytes
    }

    /// Integers and addresses must not carry bits outside their width.
    pub const fn enforces_integer_range(self) -> bool {
        matches!(self.mode, DecoderMode::Strict)
    }

    /// Bools must be exactly 0 or 1.
    pub const fn enforces_bool_encoding(self) -> bool {
        matches!(self.mode, DecoderMode::Strict)
    }

    /// Enum ordinals must name a declared member.
    pub const fn enforces_enum_range(self) -> bool {
        matches!(self.mode, DecoderMode::Strict)
    }

    /// `string` payloads must be valid UTF-8.
    pub const fn enforces_utf8(self) -> bool {
        matches!(self.mode, DecoderMode::Strict)
    }

    /// The buffer must end at the furthest referenced byte.
    pub const fn rejects_trailing_bytes(self) -> bool {
        matches!(self.trailing_bytes, TrailingBytes::Reject)
    }
}
