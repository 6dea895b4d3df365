//! Multi-document manifest splitting
//!
//! A manifest file holds several resources separated by `---` lines. Each
//! resource is kept as a `RawDocument`: the exact text between two separator
//! lines, so that documents we do not touch can be written back verbatim.

use serde_yaml::Value;
use std::fmt;

use crate::error::{KubeError, Result};

/// Separator written between documents on output
pub const DOCUMENT_SEPARATOR: &str = "\n---\n";

/// Serialization style of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    Yaml,
    Json,
}

/// The `kind` of a resource, read without decoding the rest of it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceKind(String);

impl ResourceKind {
    pub fn new(kind: impl Into<String>) -> Self {
        Self(kind.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_deployment(&self) -> bool {
        self.0 == "Deployment"
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One document of a manifest file, as found between separators
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    index: usize,
    content: String,
    /// Exact text between the previous document and this one
    separator: Option<String>,
}

impl RawDocument {
    pub fn new(index: usize, content: impl Into<String>) -> Self {
        Self {
            index,
            content: content.into(),
            separator: None,
        }
    }

    fn with_separator(mut self, separator: &str) -> Self {
        self.separator = Some(separator.to_string());
        self
    }

    /// Zero-based position in the file
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// The separator text that preceded this document in its source, if any
    pub fn separator(&self) -> Option<&str> {
        self.separator.as_deref()
    }

    /// True when the document holds nothing but whitespace, comments or markers
    pub fn is_blank(&self) -> bool {
        self.content.lines().all(|line| {
            let line = line.trim();
            line.is_empty() || line.starts_with('#') || is_separator(line)
        })
    }

    /// Documents whose first meaningful line opens a JSON object are JSON
    pub fn format(&self) -> ManifestFormat {
        if json_start(&self.content).is_some() {
            ManifestFormat::Json
        } else {
            ManifestFormat::Yaml
        }
    }

    /// The text a decoder should see, without any leading marker or comment for JSON
    pub fn body(&self) -> &str {
        match json_start(&self.content) {
            Some(start) => &self.content[start..],
            None => &self.content,
        }
    }

    /// Read the `kind` field
    ///
    /// Returns `None` for blank documents and documents without a kind.
    pub fn kind(&self) -> Result<Option<ResourceKind>> {
        if self.is_blank() {
            return Ok(None);
        }

        let value: Value = match self.format() {
            ManifestFormat::Json => {
                serde_json::from_str(self.body()).map_err(|e| self.parse_error(e))?
            }
            ManifestFormat::Yaml => {
                serde_yaml::from_str(self.body()).map_err(|e| self.parse_error(e))?
            }
        };

        match value {
            Value::Null => Ok(None),
            Value::Mapping(map) => match map.get("kind") {
                None | Some(Value::Null) => Ok(None),
                Some(Value::String(kind)) => Ok(Some(ResourceKind::new(kind.clone()))),
                Some(other) => Err(self.parse_error(format!(
                    "'kind' must be a string, found {}",
                    describe(other)
                ))),
            },
            other => Err(self.parse_error(format!(
                "expected a mapping, found {}",
                describe(&other)
            ))),
        }
    }

    fn parse_error(&self, message: impl fmt::Display) -> KubeError {
        KubeError::Parse {
            index: self.index,
            message: message.to_string(),
        }
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

/// Byte offset of the opening `{` when the first meaningful line starts with one
fn json_start(content: &str) -> Option<usize> {
    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        let trimmed = line.trim();
        if !(trimmed.is_empty() || trimmed.starts_with('#') || is_separator(trimmed)) {
            return trimmed
                .starts_with('{')
                .then(|| offset + line.find('{').unwrap_or(0));
        }
        offset += line.len();
    }
    None
}

/// A column-0 `---` line, optionally followed by whitespace or a comment
fn is_separator(line: &str) -> bool {
    let Some(rest) = line.strip_prefix("---") else {
        return false;
    };
    let rest = rest.trim_end_matches(['\n', '\r']);
    if rest.is_empty() {
        return true;
    }
    rest.starts_with([' ', '\t']) && {
        let rest = rest.trim_start();
        rest.is_empty() || rest.starts_with('#')
    }
}

/// Split a manifest into its documents
///
/// Each document excludes its separator line and the newline in front of it.
/// That text is kept as the document's [`RawDocument::separator`], so
/// [`join_documents`] gives back the input byte for byte.
/// A marker on the very first line opens the first document and is kept in it.
pub fn split_documents(content: &str) -> Vec<RawDocument> {
    let mut documents = Vec::new();
    let mut separator = None;
    let mut start = 0;
    let mut offset = 0;

    for line in content.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();

        if line_start == 0 || !is_separator(line) {
            continue;
        }

        // line_start > 0, so the byte before it is the previous line's '\n'
        // unless that line was a separator too
        let end = (line_start - 1).max(start);
        documents.push(document(documents.len(), &content[start..end], separator));
        separator = Some(&content[end..offset]);
        start = offset;
    }

    documents.push(document(documents.len(), &content[start..], separator));
    tracing::debug!(count = documents.len(), "split manifest into documents");
    documents
}

fn document(index: usize, content: &str, separator: Option<&str>) -> RawDocument {
    let document = RawDocument::new(index, content);
    match separator {
        Some(separator) => document.with_separator(separator),
        None => document,
    }
}

/// Join documents back together
///
/// Each document after the first is preceded by the separator it was split
/// on, or by [`DOCUMENT_SEPARATOR`] when it was not produced by a split.
pub fn join_documents<'a>(documents: impl IntoIterator<Item = &'a RawDocument>) -> String {
    let mut output = String::new();
    for (position, document) in documents.into_iter().enumerate() {
        if position > 0 {
            output.push_str(document.separator().unwrap_or(DOCUMENT_SEPARATOR));
        }
        output.push_str(document.content());
    }
    output
}
