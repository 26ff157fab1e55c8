// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Type-string and function-signature parser.
//!
//! Grammar (whitespace allowed between tokens):
//!
//! ```text
//! signature := ('function'? name)? '(' params ')'
//! params    := (param (',' param)*)?
//! param     := type location? name?
//! type      := base ('[' digits? ']')*
//! base      := uint<N> | int<N> | uint | int | bool | address | string
//!            | bytes | bytes<N> | byte | enum '(' digits ')'
//!            | tuple? '(' params ')'
//! location  := memory | calldata | storage
//! ```
//!
//! `T[2][3]` is an array of three `T[2]`. Unnamed parameters are named by
//! their index.

use crate::decoder::decode;
use crate::error::{DecodeError, TypeError};
use crate::policy::DecoderPolicy;
use crate::types::{TypeDescriptor, MAX_TYPE_DEPTH};
use crate::value::Value;
use core::fmt;
use core::str::FromStr;

/// A named parameter list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSignature {
    name: String,
    params: TypeDescriptor,
}

impl FunctionSignature {
    /// Parse `name(type [name], ...)`. The function name may be omitted and
    /// may be preceded by the `function` keyword.
    pub fn parse(input: &str) -> Result<Self, TypeError> {
        let mut parser = Parser::new(input);
        parser.skip_ws();
        let mut name = if parser.peek() == Some(b'(') {
            ""
        } else {
            parser.identifier()?
        };
        parser.skip_ws();
        if name == "function" && parser.at_identifier() {
            name = parser.identifier()?;
        }
        let name = name.to_owned();
        parser.skip_ws();
        let params = parser.tuple_body()?;
        parser.finish()?;
        Ok(Self { name, params })
    }

    /// Build a signature from an already-built parameter struct.
    pub fn new(name: impl Into<String>, params: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }

    /// Function name (empty when the signature had none).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameters as a struct.
    pub fn params(&self) -> &TypeDescriptor {
        &self.params
    }

    /// Decode call data (without selector) against the parameter list.
    pub fn decode_params(
        &self,
        buffer: &[u8],
        policy: DecoderPolicy,
    ) -> Result<Value, DecodeError> {
        decode(buffer, &self.params, policy)
    }
}

impl fmt::Display for FunctionSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.params)
    }
}

impl FromStr for FunctionSignature {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl FromStr for TypeDescriptor {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parser = Parser::new(s);
        let ty = parser.parse_type()?;
        parser.finish()?;
        Ok(ty)
    }
}

const DATA_LOCATIONS: [&str; 3] = ["memory", "calldata", "storage"];

struct Parser<'a> {
    input: &'a str,
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            depth: 0,
        }
    }

    fn error(&self, reason: impl Into<String>) -> TypeError {
        TypeError::Syntax {
            position: self.pos,
            reason: reason.into(),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, byte: u8) -> Result<(), TypeError> {
        self.skip_ws();
        if self.peek() != Some(byte) {
            return Err(self.error(format!("expected '{}'", char::from(byte))));
        }
        self.pos += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), TypeError> {
        self.skip_ws();
        if self.pos != self.input.len() {
            return Err(self.error("unexpected trailing input"));
        }
        Ok(())
    }

    fn at_identifier(&self) -> bool {
        self.peek()
            .is_some_and(|b| b.is_ascii_alphabetic() || b == b'_' || b == b'$')
    }

    fn identifier(&mut self) -> Result<&'a str, TypeError> {
        if !self.at_identifier() {
            return Err(self.error("expected identifier"));
        }
        let input = self.input;
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'$')
        {
            self.pos += 1;
        }
        Ok(&input[start..self.pos])
    }

    fn number(&mut self) -> Result<Option<usize>, TypeError> {
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        if start == self.pos {
            return Ok(None);
        }
        self.input[start..self.pos]
            .parse()
            .map(Some)
            .map_err(|_| self.error("number too large"))
    }

    fn parse_type(&mut self) -> Result<TypeDescriptor, TypeError> {
        self.skip_ws();
        let mut ty = if self.peek() == Some(b'(') {
            self.tuple_body()?
        } else {
            let start = self.pos;
            let word = self.identifier()?;
            self.skip_ws();
            if word == "tuple" && self.peek() == Some(b'(') {
                self.tuple_body()?
            } else {
                self.base(word, start)?
            }
        };
        loop {
            self.skip_ws();
            if self.peek() != Some(b'[') {
                break;
            }
            self.pos += 1;
            self.skip_ws();
            let length = self.number()?;
            self.expect(b']')?;
            ty = match length {
                Some(length) => TypeDescriptor::fixed_array(ty, length)?,
                None => TypeDescriptor::dynamic_array(ty)?,
            };
        }
        Ok(ty)
    }

    /// `'(' params ')'`.
    fn tuple_body(&mut self) -> Result<TypeDescriptor, TypeError> {
        self.depth += 1;
        if self.depth > MAX_TYPE_DEPTH {
            return Err(TypeError::MalformedType(format!(
                "nesting depth exceeds {MAX_TYPE_DEPTH}"
            )));
        }
        self.expect(b'(')?;
        self.skip_ws();
        let mut fields = Vec::new();
        if self.peek() == Some(b')') {
            self.pos += 1;
        } else {
            loop {
                let ty = self.parse_type()?;
                self.skip_ws();
                let name = self.param_name()?.unwrap_or_else(|| fields.len().to_string());
                fields.push((name, ty));
                self.skip_ws();
                match self.peek() {
                    Some(b',') => self.pos += 1,
                    Some(b')') => {
                        self.pos += 1;
                        break;
                    }
                    _ => return Err(self.error("expected ',' or ')'")),
                }
            }
        }
        self.depth -= 1;
        TypeDescriptor::structure(fields)
    }

    /// Optional data location followed by an optional name.
    fn param_name(&mut self) -> Result<Option<String>, TypeError> {
        if !self.at_identifier() {
            return Ok(None);
        }
        let mut word = self.identifier()?;
        if DATA_LOCATIONS.contains(&word) {
            self.skip_ws();
            if !self.at_identifier() {
                return Ok(None);
            }
            word = self.identifier()?;
        }
        Ok(Some(word.to_owned()))
    }

    fn base(&mut self, word: &str, start: usize) -> Result<TypeDescriptor, TypeError> {
        let ty = match word {
            "bool" => TypeDescriptor::bool(),
            "address" => TypeDescriptor::address(),
            "string" => TypeDescriptor::string(),
            "bytes" => TypeDescriptor::bytes(),
            "byte" => TypeDescriptor::fixed_bytes(1)?,
            "uint" => TypeDescriptor::uint(256)?,
            "int" => TypeDescriptor::int(256)?,
            "enum" => {
                self.expect(b'(')?;
                self.skip_ws();
                let members = self
                    .number()?
                    .ok_or_else(|| self.error("expected enum member count"))?;
                self.expect(b')')?;
                TypeDescriptor::enumeration(members)?
            }
            _ => {
                if let Some(bits) = sized(word, "uint") {
                    TypeDescriptor::uint(width_u16(bits))?
                } else if let Some(bits) = sized(word, "int") {
                    TypeDescriptor::int(width_u16(bits))?
                } else if let Some(size) = sized(word, "bytes") {
                    TypeDescriptor::fixed_bytes(size)?
                } else {
                    return Err(TypeError::Syntax {
                        position: start,
                        reason: format!("unknown type '{word}'"),
                    });
                }
            }
        };
        Ok(ty)
    }
}

/// `prefix` followed only by decimal digits.
fn sized(word: &str, prefix: &str) -> Option<usize> {
    let digits = word.strip_prefix(prefix)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    // Too many digits to be a valid width: report it as malformed, not unknown.
    Some(digits.parse().unwrap_or(usize::MAX))
}

fn width_u16(bits: usize) -> u16 {
    u16::try_from(bits).unwrap_or(u16::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Primitive, TypeKind};

    fn ty(s: &str) -> TypeDescriptor {
        s.parse().unwrap()
    }

    #[test]
    fn canonical_round_trip() {
        for s in [
            "uint256",
            "int24",
            "bytes3",
            "bool",
            "address",
            "bytes",
            "string",
            "enum(2)",
            "uint16[2][3]",
            "uint16[][]",
            "uint256[][3]",
            "(uint256,(bool,string)[])[2]",
            "()",
        ] {
            assert_eq!(ty(s).to_string(), s);
        }
    }

    #[test]
    fn aliases_normalize() {
        assert_eq!(ty("uint").to_string(), "uint256");
        assert_eq!(ty("int").to_string(), "int256");
        assert_eq!(ty("byte").to_string(), "bytes1");
        assert_eq!(ty("tuple(uint8, bool)").to_string(), "(uint8,bool)");
        assert_eq!(ty(" uint16 [ 2 ] [ ] ").to_string(), "uint16[2][]");
    }

    #[test]
    fn array_suffixes_nest_outward() {
        let t = ty("uint16[2][3]");
        let TypeKind::FixedArray { element, length: 3 } = t.kind() else {
            panic!("expected outer length 3, got {t}");
        };
        assert!(matches!(element.kind(), TypeKind::FixedArray { length: 2, .. }));
    }

    #[test]
    fn function_signature_with_names() {
        let sig = FunctionSignature::parse("f(uint a, uint16[] calldata b, bytes3)").unwrap();
        assert_eq!(sig.name(), "f");
        assert_eq!(sig.to_string(), "f(uint256,uint16[],bytes3)");
        let names: Vec<&str> = sig.params().fields().iter().map(|f| f.name()).collect();
        assert_eq!(names, ["a", "b", "2"]);
        assert!(sig.params().is_dynamic());
    }

    #[test]
    fn solidity_declaration_prefix() {
        let sig = FunctionSignature::parse("function g(string memory s, bytes calldata)").unwrap();
        assert_eq!(sig.name(), "g");
        assert_eq!(sig.to_string(), "g(string,bytes)");
        assert_eq!(FunctionSignature::parse("function(bool)").unwrap().name(), "function");
    }

    #[test]
    fn nameless_and_empty_signatures() {
        let sig: FunctionSignature = "()".parse().unwrap();
        assert_eq!(sig.name(), "");
        assert!(sig.params().fields().is_empty());
        let sig = FunctionSignature::parse("g()").unwrap();
        assert_eq!(sig.to_string(), "g()");
    }

    #[test]
    fn enum_syntax() {
        let t = ty("enum(3)");
        assert_eq!(t.kind(), &TypeKind::Primitive(Primitive::Enum(3)));
        assert!(matches!("enum(0)".parse::<TypeDescriptor>(), Err(TypeError::MalformedType(_))));
        assert!(matches!("enum()".parse::<TypeDescriptor>(), Err(TypeError::Syntax { .. })));
    }

    #[test]
    fn malformed_sizes() {
        for s in [
            "uint7",
            "uint264",
            "int0",
            "bytes33",
            "bytes0",
            "uint8[0]",
            "uint99999999999999999999999",
        ] {
            assert!(
                matches!(s.parse::<TypeDescriptor>(), Err(TypeError::MalformedType(_))),
                "{s} should be malformed"
            );
        }
    }

    #[test]
    fn syntax_errors_carry_positions() {
        assert_eq!(
            "uint16[".parse::<TypeDescriptor>(),
            Err(TypeError::Syntax {
                position: 7,
                reason: "expected ']'".into()
            })
        );
        assert!(matches!(
            "foo".parse::<TypeDescriptor>(),
            Err(TypeError::Syntax { position: 0, .. })
        ));
        assert!(matches!(
            FunctionSignature::parse("f(uint8"),
            Err(TypeError::Syntax { .. })
        ));
        assert!(matches!(
            FunctionSignature::parse("f(uint8) x"),
            Err(TypeError::Syntax { .. })
        ));
        assert!(matches!(
            FunctionSignature::parse("f(uint8,)"),
            Err(TypeError::Syntax { .. })
        ));
    }

    #[test]
    fn deep_tuples_are_rejected_before_recursing_further() {
        let deep = format!("{}uint8{}", "(".repeat(40), ")".repeat(40));
        assert!(matches!(
            deep.parse::<TypeDescriptor>(),
            Err(TypeError::MalformedType(_))
        ));
        let deep_arrays = format!("uint8{}", "[]".repeat(40));
        assert!(matches!(
            deep_arrays.parse::<TypeDescriptor>(),
            Err(TypeError::MalformedType(_))
        ));
    }
}
