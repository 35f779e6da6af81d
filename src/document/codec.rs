//! Block codec: turns serialized blocks into `Node` trees and back.
//!
//! Blocks are stored as DAG-JSON style documents. Plain JSON maps, lists,
//! strings, booleans and null map onto the matching node kinds; integral
//! numbers become `Int` and all other numbers `Float`. Two reserved object
//! shapes carry the kinds JSON cannot express:
//!
//! - `{"/": "<address>"}` is a link
//! - `{"/": {"bytes": "<base64>"}}` is a byte string
//!
//! YAML is accepted as an input format for hand-written documents such as
//! selector specs; it goes through the same mapping.
//!
//! # Example
//!
//! ```
//! use linkquill::document::codec::{decode_json, encode_json};
//! use linkquill::document::node::{Kind, Node};
//!
//! let node = decode_json(br#"{"alink": {"/": "b3-abc"}, "n": 1}"#).unwrap();
//! assert_eq!(node.lookup_field("alink").unwrap().kind(), Kind::Link);
//! assert_eq!(node.lookup_field("n").unwrap(), &Node::Int(1));
//!
//! let bytes = encode_json(&node).unwrap();
//! assert_eq!(decode_json(&bytes).unwrap(), node);
//! ```

use std::io::Read;

use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine;
use indexmap::IndexMap;
use serde_json::{Map as SerdeMap, Number, Value as SerdeValue};
use thiserror::Error;

use super::node::{Link, Node};

const RESERVED_KEY: &str = "/";
const BYTES_KEY: &str = "bytes";

/// Errors raised while decoding or encoding blocks.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("failed to read block: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid reserved object: {0}")]
    InvalidReserved(String),
    #[error("invalid base64 in bytes object: {0}")]
    InvalidBytes(#[from] base64::DecodeError),
    #[error("integer {0} does not fit in 64 signed bits")]
    IntegerOutOfRange(u64),
    #[error("float {0} cannot be encoded")]
    NonFiniteFloat(f64),
}

/// Decodes a byte stream into a node.
///
/// Traversal hands the reader returned by a link loader to its decoder, so
/// storage formats plug in here.
pub trait NodeDecoder: Send + Sync {
    fn decode(&self, reader: &mut dyn Read) -> Result<Node, CodecError>;
}

/// The default DAG-JSON style decoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct DagJson;

impl NodeDecoder for DagJson {
    fn decode(&self, reader: &mut dyn Read) -> Result<Node, CodecError> {
        let value: SerdeValue = serde_json::from_reader(reader)?;
        from_value(&value)
    }
}

/// Decodes a JSON block.
pub fn decode_json(bytes: &[u8]) -> Result<Node, CodecError> {
    let value: SerdeValue = serde_json::from_slice(bytes)?;
    from_value(&value)
}

/// Decodes a YAML document.
pub fn decode_yaml(text: &str) -> Result<Node, CodecError> {
    let value: SerdeValue = serde_yaml::from_str(text)?;
    from_value(&value)
}

/// Encodes a node as a compact JSON block.
pub fn encode_json(node: &Node) -> Result<Vec<u8>, CodecError> {
    Ok(serde_json::to_vec(&to_value(node)?)?)
}

/// Converts a `serde_json::Value` into a node.
pub fn from_value(value: &SerdeValue) -> Result<Node, CodecError> {
    let node = match value {
        SerdeValue::Null => Node::Null,
        SerdeValue::Bool(b) => Node::Bool(*b),
        SerdeValue::Number(n) => number_to_node(n)?,
        SerdeValue::String(s) => Node::String(s.clone()),
        SerdeValue::Array(items) => {
            Node::List(items.iter().map(from_value).collect::<Result<_, _>>()?)
        }
        SerdeValue::Object(map) => {
            if let Some(reserved) = reserved_value(map) {
                return reserved_to_node(reserved);
            }
            let mut entries = IndexMap::with_capacity(map.len());
            for (key, v) in map {
                entries.insert(key.clone(), from_value(v)?);
            }
            Node::Map(entries)
        }
    };
    Ok(node)
}

/// Converts a node into a `serde_json::Value`.
pub fn to_value(node: &Node) -> Result<SerdeValue, CodecError> {
    let value = match node {
        Node::Null => SerdeValue::Null,
        Node::Bool(b) => SerdeValue::Bool(*b),
        Node::Int(i) => SerdeValue::Number(Number::from(*i)),
        Node::Float(f) => {
            SerdeValue::Number(Number::from_f64(*f).ok_or(CodecError::NonFiniteFloat(*f))?)
        }
        Node::String(s) => SerdeValue::String(s.clone()),
        Node::Bytes(b) => reserved_object(single_entry(
            BYTES_KEY,
            SerdeValue::String(STANDARD_NO_PAD.encode(b)),
        )),
        Node::List(items) => {
            SerdeValue::Array(items.iter().map(to_value).collect::<Result<_, _>>()?)
        }
        Node::Map(entries) => {
            let mut map = SerdeMap::with_capacity(entries.len());
            for (key, child) in entries {
                map.insert(key.clone(), to_value(child)?);
            }
            SerdeValue::Object(map)
        }
        Node::Link(link) => reserved_object(SerdeValue::String(link.as_str().to_string())),
    };
    Ok(value)
}

fn number_to_node(n: &Number) -> Result<Node, CodecError> {
    if let Some(i) = n.as_i64() {
        return Ok(Node::Int(i));
    }
    if let Some(u) = n.as_u64() {
        return Err(CodecError::IntegerOutOfRange(u));
    }
    Ok(Node::Float(n.as_f64().unwrap_or(f64::NAN)))
}

fn reserved_value(map: &SerdeMap<String, SerdeValue>) -> Option<&SerdeValue> {
    if map.len() == 1 {
        map.get(RESERVED_KEY)
    } else {
        None
    }
}

fn reserved_to_node(reserved: &SerdeValue) -> Result<Node, CodecError> {
    match reserved {
        SerdeValue::String(address) => Ok(Node::Link(Link::new(address.clone()))),
        SerdeValue::Object(inner) if inner.len() == 1 => match inner.get(BYTES_KEY) {
            Some(SerdeValue::String(encoded)) => {
                let decoded = STANDARD_NO_PAD.decode(encoded.trim_end_matches('='))?;
                Ok(Node::Bytes(decoded))
            }
            _ => Err(CodecError::InvalidReserved(reserved.to_string())),
        },
        other => Err(CodecError::InvalidReserved(other.to_string())),
    }
}

fn single_entry(key: &str, value: SerdeValue) -> SerdeValue {
    let mut map = SerdeMap::with_capacity(1);
    map.insert(key.to_string(), value);
    SerdeValue::Object(map)
}

fn reserved_object(inner: SerdeValue) -> SerdeValue {
    single_entry(RESERVED_KEY, inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::node::Kind;

    #[test]
    fn test_numbers_split_into_int_and_float() {
        let node = decode_json(b"[1, -2, 2.5]").unwrap();
        assert_eq!(
            node,
            Node::List(vec![Node::Int(1), Node::Int(-2), Node::Float(2.5)])
        );
    }

    #[test]
    fn test_object_order_is_preserved() {
        let node = decode_json(br#"{"z": 1, "a": 2, "m": 3}"#).unwrap();
        let keys: Vec<&String> = node.map_iter().unwrap().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_bytes_object() {
        let node = decode_json(br#"{"/": {"bytes": "aGVsbG8"}}"#).unwrap();
        assert_eq!(node, Node::Bytes(b"hello".to_vec()));

        let padded = decode_json(br#"{"/": {"bytes": "aGVsbG8="}}"#).unwrap();
        assert_eq!(padded, Node::Bytes(b"hello".to_vec()));

        let encoded = encode_json(&Node::Bytes(b"hello".to_vec())).unwrap();
        assert_eq!(encoded, br#"{"/":{"bytes":"aGVsbG8"}}"#.to_vec());
    }

    #[test]
    fn test_slash_key_alongside_others_is_plain_map() {
        let node = decode_json(br#"{"/": "x", "other": true}"#).unwrap();
        assert_eq!(node.kind(), Kind::Map);
    }

    #[test]
    fn test_malformed_reserved_object_is_rejected() {
        assert!(matches!(
            decode_json(br#"{"/": 5}"#),
            Err(CodecError::InvalidReserved(_))
        ));
        assert!(matches!(
            decode_json(br#"{"/": {"bytes": "!!!"}}"#),
            Err(CodecError::InvalidBytes(_))
        ));
    }

    #[test]
    fn test_large_unsigned_is_rejected() {
        assert!(matches!(
            decode_json(b"18446744073709551615"),
            Err(CodecError::IntegerOutOfRange(_))
        ));
    }

    #[test]
    fn test_non_finite_float_cannot_encode() {
        assert!(matches!(
            encode_json(&Node::Float(f64::INFINITY)),
            Err(CodecError::NonFiniteFloat(_))
        ));
    }

    #[test]
    fn test_yaml_document() {
        let node = decode_yaml("exploreAll:\n  next:\n    matcher: {}\n").unwrap();
        let next = node
            .lookup_field("exploreAll")
            .and_then(|body| body.lookup_field("next"))
            .unwrap();
        assert_eq!(next.lookup_field("matcher").unwrap().kind(), Kind::Map);
    }

    #[test]
    fn test_dag_json_decoder_reads_stream() {
        let mut reader: &[u8] = br#""alpha""#;
        let node = DagJson.decode(&mut reader).unwrap();
        assert_eq!(node, Node::from("alpha"));
    }
}
