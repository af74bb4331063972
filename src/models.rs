use crate::error::{Result, ViewerError};
use serde_json::{Map, Value};

/// Plain decoded value (tags stripped).
pub type PlainValue = Value;

/// Decoded document: field name -> plain value, in source order.
pub type DecodedDocument = Map<String, Value>;

/// Default nesting limit for tagged trees. Matches serde_json's own parser limit.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// A node of the extraction API's self-describing JSON.
///
/// Tagged nodes are JSON objects carrying both a `type` and a `value` key.
/// Everything else is a `Scalar` and is passed through as-is.
#[derive(Debug, Clone, PartialEq)]
pub enum TaggedValue {
    Scalar(Value),
    ArrayNode(Vec<TaggedValue>),
    ObjectNode(Vec<(String, TaggedValue)>),
    /// Any other tag. The payload is terminal and never inspected.
    UnknownTag { tag: String, value: Value },
}

impl TaggedValue {
    /// Classify a JSON tree, failing once nesting goes past `max_depth`.
    pub fn from_json(value: Value, max_depth: usize) -> Result<Self> {
        Self::classify(value, 0, max_depth)
    }

    fn classify(value: Value, depth: usize, max_depth: usize) -> Result<Self> {
        if depth > max_depth {
            return Err(ViewerError::DepthExceeded(max_depth));
        }
        let mut obj = match value {
            Value::Object(obj) if obj.contains_key("type") && obj.contains_key("value") => obj,
            other => return Ok(TaggedValue::Scalar(other)),
        };
        // both keys are present, checked above
        let tag = obj.remove("type").unwrap_or(Value::Null);
        let payload = obj.remove("value").unwrap_or(Value::Null);

        match payload {
            Value::Array(items) if tag.as_str() == Some("array") => {
                let mut nodes = Vec::with_capacity(items.len());
                for item in items {
                    nodes.push(Self::classify(item, depth + 1, max_depth)?);
                }
                Ok(TaggedValue::ArrayNode(nodes))
            }
            Value::Object(fields) if tag.as_str() == Some("object") => {
                let mut nodes = Vec::with_capacity(fields.len());
                for (k, v) in fields {
                    nodes.push((k, Self::classify(v, depth + 1, max_depth)?));
                }
                Ok(TaggedValue::ObjectNode(nodes))
            }
            payload => Ok(TaggedValue::UnknownTag {
                tag: match tag {
                    Value::String(s) => s,
                    other => other.to_string(),
                },
                value: payload,
            }),
        }
    }
}

/// Top-level extraction response: field name -> tagged node, in source order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TaggedDocument {
    pub fields: Vec<(String, TaggedValue)>,
}

impl TaggedDocument {
    pub fn from_json(value: Value, max_depth: usize) -> Result<Self> {
        let obj = match value {
            Value::Object(obj) => obj,
            _ => return Err(ViewerError::NotAnObject),
        };
        let mut fields = Vec::with_capacity(obj.len());
        for (k, v) in obj {
            fields.push((k, TaggedValue::from_json(v, max_depth)?));
        }
        Ok(Self { fields })
    }

    pub fn parse(text: &str, max_depth: usize) -> anyhow::Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Ok(Self::from_json(value, max_depth)?)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
