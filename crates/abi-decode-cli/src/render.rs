// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! JSON views of decoded values and type trees.

use abi_decode::{FunctionSignature, TypeDescriptor, TypeKind, Value};
use serde_json::{json, Value as Json};

fn hex0x(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Plain JSON for one value: integers as decimal strings, byte data as `0x` hex,
/// arrays and tuples as JSON arrays.
pub fn value(v: &Value) -> Json {
    match v {
        Value::Uint(n, _) => Json::String(n.to_string()),
        Value::Int(n, _) => Json::String(n.to_string()),
        Value::Bool(b) => Json::Bool(*b),
        Value::Address(a) => Json::String(hex0x(a.as_slice())),
        Value::Enum(ordinal) => json!(ordinal),
        Value::FixedBytes(..) | Value::Bytes(_) => {
            Json::String(hex0x(v.as_bytes().unwrap_or_default()))
        }
        Value::String(s) => Json::String(s.clone()),
        Value::FixedArray(items) | Value::Array(items) | Value::Tuple(items) => {
            Json::Array(items.iter().map(value).collect())
        }
    }
}

/// Parameters as an ordered list of `{ name, type, value }`.
pub fn params(signature: &FunctionSignature, decoded: &Value) -> Json {
    let values = decoded.as_slice().unwrap_or_default();
    let entries = signature
        .params()
        .fields()
        .iter()
        .zip(values)
        .map(|(field, v)| {
            json!({
                "name": field.name(),
                "type": field.ty().to_string(),
                "value": value(v),
            })
        })
        .collect();
    Json::Array(entries)
}

/// Shape of a type tree: canonical form, dynamic flag, head size, children.
///
/// `head_words` is the slot size in the parent's head region; `region_words`
/// is the size of a struct's or static array's own head region.
pub fn describe(ty: &TypeDescriptor) -> Json {
    let mut node = json!({
        "type": ty.to_string(),
        "dynamic": ty.is_dynamic(),
        "head_words": ty.head_words(),
    });
    if let Some(words) = ty.static_words() {
        node["static_words"] = json!(words);
    }
    match ty.kind() {
        TypeKind::Primitive(_) | TypeKind::Bytes | TypeKind::String => {}
        TypeKind::FixedArray { element, length } => {
            node["length"] = json!(length);
            node["region_words"] = json!(element.head_words().saturating_mul(*length));
            node["element"] = describe(element);
        }
        TypeKind::DynamicArray { element } => {
            node["element"] = describe(element);
        }
        TypeKind::Struct { fields } => {
            let region: usize = fields.iter().map(|field| field.ty().head_words()).sum();
            node["region_words"] = json!(region);
            node["fields"] = fields
                .iter()
                .map(|field| {
                    let mut child = describe(field.ty());
                    child["name"] = json!(field.name());
                    child
                })
                .collect();
        }
    }
    node
}
