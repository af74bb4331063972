use crate::error::{Result, ViewerError};
use crate::models::{DecodedDocument, PlainValue, TaggedDocument, TaggedValue, DEFAULT_MAX_DEPTH};
use log::trace;
use serde_json::{Map, Value};

/// Strips type tags from a tagged tree, producing a plain tree of the same shape.
#[derive(Debug, Clone, Copy)]
pub struct Decoder {
    max_depth: usize,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl Decoder {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn decode(&self, node: &TaggedValue) -> Result<PlainValue> {
        self.decode_at(node, 0)
    }

    fn decode_at(&self, node: &TaggedValue, depth: usize) -> Result<PlainValue> {
        if depth > self.max_depth {
            return Err(ViewerError::DepthExceeded(self.max_depth));
        }
        match node {
            TaggedValue::Scalar(v) => {
                trace!("untagged node passed through at depth {}", depth);
                Ok(v.clone())
            }
            TaggedValue::ArrayNode(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(self.decode_at(item, depth + 1)?);
                }
                Ok(Value::Array(out))
            }
            TaggedValue::ObjectNode(fields) => {
                let mut out = Map::new();
                for (k, v) in fields {
                    out.insert(k.clone(), self.decode_at(v, depth + 1)?);
                }
                Ok(Value::Object(out))
            }
            TaggedValue::UnknownTag { tag, value } => {
                trace!("terminal tag '{}' at depth {}", tag, depth);
                Ok(value.clone())
            }
        }
    }

    /// Decode every top-level field, keeping source order.
    pub fn decode_document(&self, doc: &TaggedDocument) -> Result<DecodedDocument> {
        let mut out = Map::new();
        for (k, v) in &doc.fields {
            out.insert(k.clone(), self.decode(v)?);
        }
        Ok(out)
    }

    /// Classify and decode a raw JSON value in one step.
    pub fn decode_json(&self, value: Value) -> Result<PlainValue> {
        let node = TaggedValue::from_json(value, self.max_depth)?;
        self.decode(&node)
    }
}

/// Decode with the default depth limit.
pub fn decode(node: &TaggedValue) -> Result<PlainValue> {
    Decoder::default().decode(node)
}
