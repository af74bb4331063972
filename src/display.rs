//! Presentation of extraction responses: the raw-text fallback, terminal
//! formatting of table sets, and the context that backs the copy action.

use crate::decode::Decoder;
use crate::models::TaggedDocument;
use crate::render::{RenderedTableSet, TableDescriptor, TableKind, TableRenderer};
use crate::util::text_width;
use serde_json::Value;
use std::fmt::Write as _;
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub enum Presentation {
    Tables(RenderedTableSet),
    /// Response was not a JSON object; shown verbatim.
    RawText(String),
}

/// Render a response body, falling back to its raw text when it is not a
/// JSON object (or nests deeper than the decoder allows).
pub fn present_response(body: &str, decoder: Decoder) -> Presentation {
    let value: Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(e) => {
            warn!("response is not JSON ({}), showing raw text", e);
            return Presentation::RawText(body.to_string());
        }
    };
    let rendered = TaggedDocument::from_json(value, decoder.max_depth())
        .and_then(|doc| TableRenderer::new(decoder).render(&doc));
    match rendered {
        Ok(set) => Presentation::Tables(set),
        Err(e) => {
            warn!("cannot render response ({}), showing raw text", e);
            Presentation::RawText(body.to_string())
        }
    }
}

/// Holds the last successfully rendered result.
#[derive(Debug, Default)]
pub struct ViewerContext {
    decoder: Decoder,
    last: Option<RenderedTableSet>,
}

impl ViewerContext {
    pub fn new(decoder: Decoder) -> Self {
        Self { decoder, last: None }
    }

    /// Present a response. A raw-text fallback leaves the previous result in place.
    pub fn show(&mut self, body: &str) -> Presentation {
        let p = present_response(body, self.decoder);
        if let Presentation::Tables(set) = &p {
            self.last = Some(set.clone());
        }
        p
    }

    pub fn last_result(&self) -> Option<&RenderedTableSet> {
        self.last.as_ref()
    }

    /// Clean (tag-free) JSON of the last result, ready for the clipboard.
    pub fn copy_json(&self) -> Option<&str> {
        self.last.as_ref().map(|s| s.raw_json.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TextOptions {
    /// Expand the raw JSON section instead of a one-line summary.
    pub show_raw: bool,
}

pub fn format_text(set: &RenderedTableSet, opts: TextOptions) -> String {
    let mut out = String::new();
    for table in &set.tables {
        if table.kind == TableKind::Simple && table.rows.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push('\n');
        }
        if let Some(title) = &table.title {
            let _ = writeln!(out, "{}", title);
        }
        write_table(&mut out, table);
    }

    if !out.is_empty() {
        out.push('\n');
    }
    if opts.show_raw {
        let _ = writeln!(out, "v Raw JSON");
        let _ = writeln!(out, "{}", set.raw_json);
    } else {
        let _ = writeln!(out, "> Raw JSON ({} lines, use --raw to expand)", set.raw_json.lines().count());
    }
    out
}

pub fn format_presentation(p: &Presentation, opts: TextOptions) -> String {
    match p {
        Presentation::Tables(set) => format_text(set, opts),
        Presentation::RawText(s) => s.clone(),
    }
}

fn write_table(out: &mut String, table: &TableDescriptor) {
    let headers: &[String] = table.headers.as_deref().unwrap_or(&[]);
    let cols = table
        .rows
        .iter()
        .map(Vec::len)
        .chain(std::iter::once(headers.len()))
        .max()
        .unwrap_or(0);
    if cols == 0 {
        let _ = writeln!(out, "({} rows, no columns)", table.rows.len());
        return;
    }

    let mut widths = vec![0usize; cols];
    for row in std::iter::once(headers).chain(table.rows.iter().map(Vec::as_slice)) {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(text_width(cell));
        }
    }

    let rule = |fill: char| {
        let mut s = String::from("+");
        for w in &widths {
            s.extend(std::iter::repeat(fill).take(w + 2));
            s.push('+');
        }
        s
    };
    let line = |cells: &[String]| {
        let mut s = String::from("|");
        for (i, w) in widths.iter().enumerate() {
            let cell = cells.get(i).map(String::as_str).unwrap_or("");
            let pad = w - text_width(cell);
            let _ = write!(s, " {}{} |", cell, " ".repeat(pad));
        }
        s
    };

    let _ = writeln!(out, "{}", rule('-'));
    if !headers.is_empty() {
        let _ = writeln!(out, "{}", line(headers));
        let _ = writeln!(out, "{}", rule('='));
    }
    for row in &table.rows {
        let _ = writeln!(out, "{}", line(row.as_slice()));
    }
    let _ = writeln!(out, "{}", rule('-'));
}
