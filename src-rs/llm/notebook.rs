//! Notebook snapshot types and the text rendering embedded in every prompt.
//!
//! Snapshots arrive in nbformat-like JSON (`cells[].cell_type`, `source`,
//! `outputs`). Multiline fields may be a string or a list of strings.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotebookSnapshot {
    #[serde(default)]
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellKind {
    Code,
    Markdown,
    #[default]
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Cell {
    #[serde(rename = "cell_type", default)]
    pub kind: CellKind,
    #[serde(default, deserialize_with = "multiline_text")]
    pub source: String,
    #[serde(default)]
    pub outputs: Vec<Output>,
}

impl Cell {
    pub fn code(source: impl Into<String>, outputs: Vec<Output>) -> Self {
        Self {
            kind: CellKind::Code,
            source: source.into(),
            outputs,
        }
    }

    pub fn markdown(source: impl Into<String>) -> Self {
        Self {
            kind: CellKind::Markdown,
            source: source.into(),
            outputs: Vec::new(),
        }
    }
}

/// One cell output, classified by the first recognized shape:
/// `data["text/plain"]`, then `text`, then `traceback`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "Value")]
pub enum Output {
    PlainData(String),
    Text(String),
    Traceback(Vec<String>),
    Unrecognized,
}

impl From<Value> for Output {
    fn from(raw: Value) -> Self {
        if let Some(text) = raw
            .get("data")
            .and_then(|d| d.get("text/plain"))
            .and_then(text_from_value)
        {
            return Output::PlainData(text);
        }
        if let Some(text) = raw.get("text").and_then(text_from_value) {
            return Output::Text(text);
        }
        if let Some(lines) = raw.get("traceback").and_then(|v| v.as_array()) {
            let lines = lines
                .iter()
                .filter_map(|l| l.as_str().map(str::to_string))
                .collect();
            return Output::Traceback(lines);
        }
        Output::Unrecognized
    }
}

impl Output {
    pub fn fragment(&self) -> Option<String> {
        match self {
            Output::PlainData(s) | Output::Text(s) => Some(s.clone()),
            Output::Traceback(lines) => Some(lines.join("\n")),
            Output::Unrecognized => None,
        }
    }
}

fn text_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Array(parts) => Some(parts.iter().filter_map(|p| p.as_str()).collect()),
        _ => None,
    }
}

fn multiline_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(text_from_value).unwrap_or_default())
}

/// Renders the snapshot as labeled blocks separated by a blank line.
/// Cells are labeled by their position; kinds other than code and markdown are skipped.
pub fn format_notebook(snapshot: &NotebookSnapshot) -> String {
    let mut blocks: Vec<String> = Vec::new();

    for (idx, cell) in snapshot.cells.iter().enumerate() {
        match cell.kind {
            CellKind::Code => {
                blocks.push(format!("Cell [{}] (Code):\n```python\n{}\n```", idx, cell.source));

                let fragments: Vec<String> =
                    cell.outputs.iter().filter_map(Output::fragment).collect();
                if !fragments.is_empty() {
                    blocks.push(format!("Output:\n```\n{}\n```", fragments.concat()));
                }
            }
            CellKind::Markdown => {
                blocks.push(format!("Cell [{}] (Markdown):\n{}", idx, cell.source));
            }
            CellKind::Other => {}
        }
    }

    blocks.join("\n\n")
}
