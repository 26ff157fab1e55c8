// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Type descriptor tree.
//!
//! A [`TypeDescriptor`] describes the shape a buffer is expected to have. It is
//! validated once at construction, and the two layout facts the decoder needs
//! at every node are cached there:
//!
//! - whether the type is *dynamic* (encoded through an offset into a tail region),
//! - for static types, the number of 32-byte words it occupies in place.
//!
//! Descriptors are never mutated after construction, so a tree built once per
//! signature can be shared freely across threads.

use crate::error::TypeError;
use crate::word::WORD_SIZE;
use core::fmt;

/// Largest member count an enum can declare (its ordinal is a `uint8`).
pub const MAX_ENUM_MEMBERS: u16 = 256;

/// Deepest nesting of arrays and structs a descriptor may have.
pub const MAX_TYPE_DEPTH: usize = 32;

/// Scalar kinds. Every primitive occupies exactly one word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// Unsigned integer of the given bit width.
    Uint(u16),
    /// Two's-complement signed integer of the given bit width.
    Int(u16),
    /// Boolean.
    Bool,
    /// 20-byte account address.
    Address,
    /// Fixed-length byte string of `1..=32` bytes.
    FixedBytes(u8),
    /// Enum with the given number of members.
    Enum(u16),
}

impl Primitive {
    /// Width of the meaningful part of the word, in bits.
    pub fn bit_width(self) -> u16 {
        match self {
            Self::Uint(bits) | Self::Int(bits) => bits,
            Self::Bool | Self::Enum(_) => 8,
            Self::Address => 160,
            Self::FixedBytes(size) => u16::from(size) * 8,
        }
    }

    /// Whether the value is sign-extended to the full word.
    pub fn is_signed(self) -> bool {
        matches!(self, Self::Int(_))
    }

    fn validate(self) -> Result<Self, TypeError> {
        match self {
            Self::Uint(bits) | Self::Int(bits) => {
                if bits == 0 || bits > 256 || bits % 8 != 0 {
                    return Err(TypeError::malformed(format!(
                        "integer width {bits} is not a multiple of 8 in 8..=256"
                    )));
                }
            }
            Self::FixedBytes(size) => {
                if size == 0 || usize::from(size) > WORD_SIZE {
                    return Err(TypeError::malformed(format!(
                        "fixed bytes size {size} is not in 1..=32"
                    )));
                }
            }
            Self::Enum(cardinality) => {
                if cardinality == 0 {
                    return Err(TypeError::malformed("enum declares no members"));
                }
                if cardinality > MAX_ENUM_MEMBERS {
                    return Err(TypeError::malformed(format!(
                        "enum declares {cardinality} members, max is {MAX_ENUM_MEMBERS}"
                    )));
                }
            }
            Self::Bool | Self::Address => {}
        }
        Ok(self)
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uint(bits) => write!(f, "uint{bits}"),
            Self::Int(bits) => write!(f, "int{bits}"),
            Self::Bool => f.write_str("bool"),
            Self::Address => f.write_str("address"),
            Self::FixedBytes(size) => write!(f, "bytes{size}"),
            Self::Enum(cardinality) => write!(f, "enum({cardinality})"),
        }
    }
}

/// Named member of a [`TypeKind::Struct`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    name: String,
    ty: TypeDescriptor,
}

impl Field {
    /// Field name (parameter name, or its index when unnamed).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Field type.
    pub fn ty(&self) -> &TypeDescriptor {
        &self.ty
    }
}

/// The closed set of type shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind {
    /// One-word scalar.
    Primitive(Primitive),
    /// Variable-length byte string.
    Bytes,
    /// Variable-length UTF-8 string.
    String,
    /// `T[length]`.
    FixedArray {
        /// Element type.
        element: Box<TypeDescriptor>,
        /// Number of elements, always positive.
        length: usize,
    },
    /// `T[]`.
    DynamicArray {
        /// Element type.
        element: Box<TypeDescriptor>,
    },
    /// Ordered field list (also used for parameter tuples).
    Struct {
        /// Fields in encoding order.
        fields: Vec<Field>,
    },
}

/// A validated type with its layout facts precomputed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    kind: TypeKind,
    dynamic: bool,
    static_words: Option<usize>,
    depth: usize,
}

impl TypeDescriptor {
    /// Build a descriptor for a scalar.
    pub fn primitive(primitive: Primitive) -> Result<Self, TypeError> {
        Ok(Self::scalar(primitive.validate()?))
    }

    /// `uint<bits>`.
    pub fn uint(bits: u16) -> Result<Self, TypeError> {
        Self::primitive(Primitive::Uint(bits))
    }

    /// `int<bits>`.
    pub fn int(bits: u16) -> Result<Self, TypeError> {
        Self::primitive(Primitive::Int(bits))
    }

    /// `bool`.
    pub fn bool() -> Self {
        Self::scalar(Primitive::Bool)
    }

    /// `address`.
    pub fn address() -> Self {
        Self::scalar(Primitive::Address)
    }

    /// `bytes<size>`.
    pub fn fixed_bytes(size: usize) -> Result<Self, TypeError> {
        let size = u8::try_from(size).map_err(|_| {
            TypeError::malformed(format!("fixed bytes size {size} is not in 1..=32"))
        })?;
        Self::primitive(Primitive::FixedBytes(size))
    }

    /// Enum with `cardinality` members.
    pub fn enumeration(cardinality: usize) -> Result<Self, TypeError> {
        let cardinality = u16::try_from(cardinality).map_err(|_| {
            TypeError::malformed(format!(
                "enum declares {cardinality} members, max is {MAX_ENUM_MEMBERS}"
            ))
        })?;
        Self::primitive(Primitive::Enum(cardinality))
    }

    /// Dynamic `bytes`.
    pub fn bytes() -> Self {
        Self::dynamic_leaf(TypeKind::Bytes)
    }

    /// Dynamic `string`.
    pub fn string() -> Self {
        Self::dynamic_leaf(TypeKind::String)
    }

    /// `element[length]`.
    pub fn fixed_array(element: TypeDescriptor, length: usize) -> Result<Self, TypeError> {
        if length == 0 {
            return Err(TypeError::malformed(format!(
                "fixed array of {element} has zero length"
            )));
        }
        element.check_array_element()?;
        let static_words = if element.dynamic {
            None
        } else {
            Some(Self::checked_words(element.head_words(), length)?)
        };
        Ok(Self {
            dynamic: element.dynamic,
            static_words,
            depth: Self::checked_depth(element.depth)?,
            kind: TypeKind::FixedArray {
                element: Box::new(element),
                length,
            },
        })
    }

    /// `element[]`.
    pub fn dynamic_array(element: TypeDescriptor) -> Result<Self, TypeError> {
        element.check_array_element()?;
        Ok(Self {
            dynamic: true,
            static_words: None,
            depth: Self::checked_depth(element.depth)?,
            kind: TypeKind::DynamicArray {
                element: Box::new(element),
            },
        })
    }

    /// Struct with named fields, in encoding order.
    pub fn structure<I, S>(fields: I) -> Result<Self, TypeError>
    where
        I: IntoIterator<Item = (S, TypeDescriptor)>,
        S: Into<String>,
    {
        let fields: Vec<Field> = fields
            .into_iter()
            .map(|(name, ty)| Field {
                name: name.into(),
                ty,
            })
            .collect();
        let dynamic = fields.iter().any(|field| field.ty.dynamic);
        let static_words = if dynamic {
            None
        } else {
            let mut total = 0usize;
            for field in &fields {
                total = total
                    .checked_add(field.ty.head_words())
                    .ok_or_else(|| TypeError::malformed("struct size overflows"))?;
            }
            Some(Self::checked_words(total, 1)?)
        };
        let deepest = fields.iter().map(|field| field.ty.depth).max().unwrap_or(0);
        let depth = Self::checked_depth(deepest)?;
        Ok(Self {
            kind: TypeKind::Struct { fields },
            dynamic,
            static_words,
            depth,
        })
    }

    /// Struct whose fields are named by their index, like an unnamed parameter list.
    pub fn tuple(types: Vec<TypeDescriptor>) -> Result<Self, TypeError> {
        Self::structure(
            types
                .into_iter()
                .enumerate()
                .map(|(i, ty)| (i.to_string(), ty)),
        )
    }

    /// The shape of this type.
    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    /// Whether values of this type live in a tail region behind an offset.
    pub fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    /// Words occupied in place, for static types.
    pub fn static_words(&self) -> Option<usize> {
        self.static_words
    }

    /// Words this type occupies in its parent's head region.
    pub fn head_words(&self) -> usize {
        self.static_words.unwrap_or(1)
    }

    /// Bytes this type occupies in its parent's head region.
    pub fn head_bytes(&self) -> usize {
        // Construction guarantees this product fits.
        self.head_words().saturating_mul(WORD_SIZE)
    }

    /// Nesting depth: 1 for scalars and byte strings, one more per array or struct level.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Fields when this is a struct, otherwise an empty slice.
    pub fn fields(&self) -> &[Field] {
        match &self.kind {
            TypeKind::Struct { fields } => fields,
            _ => &[],
        }
    }

    fn scalar(primitive: Primitive) -> Self {
        Self {
            kind: TypeKind::Primitive(primitive),
            dynamic: false,
            static_words: Some(1),
            depth: 1,
        }
    }

    fn dynamic_leaf(kind: TypeKind) -> Self {
        Self {
            kind,
            dynamic: true,
            static_words: None,
            depth: 1,
        }
    }

    fn checked_depth(child: usize) -> Result<usize, TypeError> {
        let depth = child + 1;
        if depth > MAX_TYPE_DEPTH {
            return Err(TypeError::malformed(format!(
                "nesting depth exceeds {MAX_TYPE_DEPTH}"
            )));
        }
        Ok(depth)
    }

    fn check_array_element(&self) -> Result<(), TypeError> {
        if self.static_words == Some(0) {
            return Err(TypeError::malformed(format!(
                "array element {self} occupies no words"
            )));
        }
        Ok(())
    }

    fn checked_words(words: usize, count: usize) -> Result<usize, TypeError> {
        words
            .checked_mul(count)
            .filter(|total| total.checked_mul(WORD_SIZE).is_some())
            .ok_or_else(|| TypeError::malformed("static size overflows"))
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TypeKind::Primitive(primitive) => primitive.fmt(f),
            TypeKind::Bytes => f.write_str("bytes"),
            TypeKind::String => f.write_str("string"),
            TypeKind::FixedArray { element, length } => write!(f, "{element}[{length}]"),
            TypeKind::DynamicArray { element } => write!(f, "{element}[]"),
            TypeKind::Struct { fields } => {
                f.write_str("(")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    field.ty.fmt(f)?;
                }
                f.write_str(")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uint16() -> TypeDescriptor {
        TypeDescriptor::uint(16).unwrap()
    }

    #[test]
    fn static_sizes_are_cached() {
        let inner = TypeDescriptor::fixed_array(uint16(), 2).unwrap();
        let outer = TypeDescriptor::fixed_array(inner, 3).unwrap();
        assert!(!outer.is_dynamic());
        assert_eq!(outer.static_words(), Some(6));
        assert_eq!(outer.head_bytes(), 192);
        assert_eq!(outer.to_string(), "uint16[2][3]");
    }

    #[test]
    fn dynamic_flag_propagates_through_composites() {
        let dynamic = TypeDescriptor::dynamic_array(TypeDescriptor::uint(256).unwrap()).unwrap();
        let fixed_of_dynamic = TypeDescriptor::fixed_array(dynamic, 3).unwrap();
        assert!(fixed_of_dynamic.is_dynamic());
        assert_eq!(fixed_of_dynamic.static_words(), None);
        assert_eq!(fixed_of_dynamic.head_words(), 1);

        let st = TypeDescriptor::structure([
            ("a", TypeDescriptor::bool()),
            ("b", TypeDescriptor::string()),
        ])
        .unwrap();
        assert!(st.is_dynamic());
        assert_eq!(st.to_string(), "(bool,string)");
        assert_eq!(st.fields()[1].name(), "b");
    }

    #[test]
    fn static_struct_sums_field_heads() {
        let st = TypeDescriptor::tuple(vec![
            TypeDescriptor::address(),
            TypeDescriptor::fixed_array(uint16(), 4).unwrap(),
        ])
        .unwrap();
        assert!(!st.is_dynamic());
        assert_eq!(st.static_words(), Some(5));
        assert_eq!(st.fields()[0].name(), "0");
    }

    #[test]
    fn rejects_malformed_types() {
        assert!(matches!(
            TypeDescriptor::fixed_array(uint16(), 0),
            Err(TypeError::MalformedType(_))
        ));
        assert!(TypeDescriptor::fixed_bytes(33).is_err());
        assert!(TypeDescriptor::fixed_bytes(0).is_err());
        assert!(TypeDescriptor::enumeration(0).is_err());
        assert!(TypeDescriptor::enumeration(257).is_err());
        assert!(TypeDescriptor::uint(7).is_err());
        assert!(TypeDescriptor::int(264).is_err());
        assert!(TypeDescriptor::uint(0).is_err());
    }

    #[test]
    fn rejects_zero_sized_array_elements() {
        let empty = TypeDescriptor::tuple(vec![]).unwrap();
        assert_eq!(empty.static_words(), Some(0));
        assert!(TypeDescriptor::dynamic_array(empty.clone()).is_err());
        assert!(TypeDescriptor::fixed_array(empty, 2).is_err());
    }

    #[test]
    fn rejects_static_size_overflow() {
        let big = TypeDescriptor::fixed_array(uint16(), usize::MAX / 16).unwrap_err();
        assert!(matches!(big, TypeError::MalformedType(_)));
    }

    #[test]
    fn rejects_excessive_nesting() {
        let mut ty = uint16();
        for _ in 1..MAX_TYPE_DEPTH {
            ty = TypeDescriptor::dynamic_array(ty).unwrap();
        }
        assert_eq!(ty.depth(), MAX_TYPE_DEPTH);
        assert!(TypeDescriptor::dynamic_array(ty.clone()).is_err());
        assert!(TypeDescriptor::tuple(vec![ty]).is_err());
    }

    #[test]
    fn primitive_widths() {
        assert_eq!(Primitive::Address.bit_width(), 160);
        assert_eq!(Primitive::FixedBytes(3).bit_width(), 24);
        assert!(Primitive::Int(24).is_signed());
        assert!(!Primitive::Enum(2).is_signed());
        assert_eq!(Primitive::Enum(2).to_string(), "enum(2)");
    }

    #[test]
    fn descriptors_are_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TypeDescriptor>();
    }
}
