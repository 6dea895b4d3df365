//! YAML 1.1 octal integers
//!
//! Kubernetes manifests are read as YAML 1.1, where a plain `0644` is the
//! octal integer 420. serde_yaml follows YAML 1.2 and reads it as the string
//! `"0644"`. Before a Deployment is decoded, such plain scalars are rewritten
//! to their decimal value. Quoted and tagged scalars are left alone.

use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;
use yaml_rust2::parser::{Event, MarkedEventReceiver, Parser};
use yaml_rust2::scanner::{Marker, TScalarStyle};

use crate::error::{KubeError, Result};

static OCTAL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([-+]?)0([0-7]+)$").expect("octal regex is valid"));

/// Decimal form of a YAML 1.1 octal literal such as `0400`
fn octal_to_decimal(scalar: &str) -> Option<String> {
    let caps = OCTAL_REGEX.captures(scalar)?;
    let value = i64::from_str_radix(&caps[2], 8).ok()?;
    Some(if &caps[1] == "-" {
        format!("-{}", value)
    } else {
        value.to_string()
    })
}

/// A plain octal scalar found in the source
struct OctalScalar {
    /// Char offset of the scalar's first character
    position: usize,
    literal: String,
    decimal: String,
}

#[derive(Default)]
struct OctalCollector {
    scalars: Vec<OctalScalar>,
}

impl MarkedEventReceiver for OctalCollector {
    fn on_event(&mut self, event: Event, mark: Marker) {
        if let Event::Scalar(literal, TScalarStyle::Plain, _, None) = event {
            if let Some(decimal) = octal_to_decimal(&literal) {
                self.scalars.push(OctalScalar {
                    position: mark.index(),
                    literal,
                    decimal,
                });
            }
        }
    }
}

/// Rewrite plain octal integer scalars to decimal
///
/// Returns the input unchanged when there is nothing to rewrite.
pub fn resolve_octal_scalars(content: &str) -> Result<Cow<'_, str>> {
    let mut collector = OctalCollector::default();
    Parser::new_from_str(content)
        .load(&mut collector, false)
        .map_err(|e| KubeError::Decode(e.to_string()))?;

    if collector.scalars.is_empty() {
        return Ok(Cow::Borrowed(content));
    }

    let mut output = String::with_capacity(content.len());
    let mut copied = 0;
    for scalar in &collector.scalars {
        let start = byte_offset(content, scalar.position);
        let end = start + scalar.literal.len();
        if start < copied || content.get(start..end) != Some(scalar.literal.as_str()) {
            // Marker did not land on the literal (anchored or tagged node)
            continue;
        }
        output.push_str(&content[copied..start]);
        output.push_str(&scalar.decimal);
        copied = end;
    }
    output.push_str(&content[copied..]);

    tracing::debug!(
        count = collector.scalars.len(),
        "resolved YAML 1.1 octal integers"
    );
    Ok(Cow::Owned(output))
}

fn byte_offset(content: &str, char_index: usize) -> usize {
    content
        .char_indices()
        .nth(char_index)
        .map_or(content.len(), |(offset, _)| offset)
}
