use crate::decode::Decoder;
use crate::error::Result;
use crate::models::{DecodedDocument, TaggedDocument};
use crate::util::{display_cell, display_opt};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

/// Decoded fields split by shape: arrays get their own table, everything else
/// goes in the two-column key/value table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldPartition {
    pub simple_fields: Map<String, Value>,
    pub array_fields: Map<String, Value>,
}

pub fn partition(doc: &DecodedDocument) -> FieldPartition {
    let mut out = FieldPartition::default();
    for (k, v) in doc {
        if v.is_array() {
            out.array_fields.insert(k.clone(), v.clone());
        } else {
            out.simple_fields.insert(k.clone(), v.clone());
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TableKind {
    Simple,
    Array,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableDescriptor {
    pub kind: TableKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<Vec<String>>,
    pub rows: Vec<Vec<String>>,
}

impl TableDescriptor {
    /// Alternate shading for readability: odd rows are shaded.
    pub fn is_shaded(&self, row: usize) -> bool {
        self.kind == TableKind::Array && row % 2 == 1
    }
}

/// Non-fatal issues met while building array tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Degradation {
    /// First element is not a record, so the table has no headers.
    NonRecordHeader { field: String },
    /// A later element is not a record; its cells render empty.
    NonRecordRow { field: String, row: usize },
    /// Record lacks a header key; the cell renders empty.
    MissingCell { field: String, row: usize, column: String },
    /// Record has keys the first record does not; they are not rendered.
    DroppedColumns { field: String, row: usize, keys: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedTableSet {
    pub tables: Vec<TableDescriptor>,
    /// Decoded document, pretty-printed with 2-space indent.
    pub raw_json: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub degradations: Vec<Degradation>,
}

impl RenderedTableSet {
    pub fn simple_table(&self) -> Option<&TableDescriptor> {
        self.tables.iter().find(|t| t.kind == TableKind::Simple)
    }

    pub fn array_tables(&self) -> impl Iterator<Item = &TableDescriptor> {
        self.tables.iter().filter(|t| t.kind == TableKind::Array)
    }

    pub fn table(&self, title: &str) -> Option<&TableDescriptor> {
        self.tables.iter().find(|t| t.title.as_deref() == Some(title))
    }
}

/// Turns a tagged extraction response into a table set.
#[derive(Debug, Clone, Default)]
pub struct TableRenderer {
    decoder: Decoder,
}

impl TableRenderer {
    pub fn new(decoder: Decoder) -> Self {
        Self { decoder }
    }

    pub fn render(&self, doc: &TaggedDocument) -> Result<RenderedTableSet> {
        let decoded = self.decoder.decode_document(doc)?;
        Ok(render_decoded(&decoded))
    }
}

/// Render an already decoded document.
pub fn render_decoded(decoded: &DecodedDocument) -> RenderedTableSet {
    let parts = partition(decoded);
    let mut degradations = Vec::new();
    let mut tables = Vec::with_capacity(1 + parts.array_fields.len());

    tables.push(TableDescriptor {
        kind: TableKind::Simple,
        title: None,
        headers: None,
        rows: parts
            .simple_fields
            .iter()
            .map(|(k, v)| vec![k.clone(), display_cell(v)])
            .collect(),
    });

    for (field, value) in &parts.array_fields {
        let items = match value.as_array() {
            Some(items) if !items.is_empty() => items,
            _ => {
                debug!("skipping empty array field '{}'", field);
                continue;
            }
        };
        tables.push(array_table(field, items, &mut degradations));
    }

    // Value serialization cannot fail: keys are strings and numbers are finite.
    let raw_json = serde_json::to_string_pretty(&Value::Object(decoded.clone())).unwrap_or_default();

    RenderedTableSet { tables, raw_json, degradations }
}

fn array_table(field: &str, items: &[Value], degradations: &mut Vec<Degradation>) -> TableDescriptor {
    let headers: Vec<String> = match items[0].as_object() {
        Some(first) => first.keys().cloned().collect(),
        None => {
            degradations.push(Degradation::NonRecordHeader { field: field.to_string() });
            Vec::new()
        }
    };

    let mut rows = Vec::with_capacity(items.len());
    for (idx, item) in items.iter().enumerate() {
        let record = match item.as_object() {
            Some(r) => r,
            None => {
                if idx > 0 {
                    degradations.push(Degradation::NonRecordRow { field: field.to_string(), row: idx });
                }
                rows.push(vec![String::new(); headers.len()]);
                continue;
            }
        };

        let mut cells = Vec::with_capacity(headers.len());
        for h in &headers {
            let cell = record.get(h);
            if cell.is_none() {
                degradations.push(Degradation::MissingCell {
                    field: field.to_string(),
                    row: idx,
                    column: h.clone(),
                });
            }
            cells.push(display_opt(cell));
        }

        let extra: Vec<String> = record.keys().filter(|k| !headers.contains(k)).cloned().collect();
        if !extra.is_empty() {
            debug!("'{}' row {}: dropping columns {:?}", field, idx, extra);
            degradations.push(Degradation::DroppedColumns { field: field.to_string(), row: idx, keys: extra });
        }
        rows.push(cells);
    }

    TableDescriptor {
        kind: TableKind::Array,
        title: Some(field.to_string()),
        headers: Some(headers),
        rows,
    }
}
