//! Output assembly

use crate::document::{DOCUMENT_SEPARATOR, RawDocument};

/// Rebuild the manifest stream: the Deployment first, then every other
/// document verbatim, in its original order
///
/// The encoded Deployment's trailing newlines are dropped in favour of the
/// separator. With no other document the output ends with a single newline.
pub fn assemble(deployment: &str, others: &[RawDocument]) -> String {
    let deployment = deployment.trim_end_matches('\n');
    let capacity = deployment.len()
        + others
            .iter()
            .map(|doc| doc.content().len() + DOCUMENT_SEPARATOR.len())
            .sum::<usize>()
        + 1;

    let mut output = String::with_capacity(capacity);
    output.push_str(deployment);

    if others.is_empty() {
        output.push('\n');
    }
    for document in others {
        output.push_str(DOCUMENT_SEPARATOR);
        output.push_str(document.content());
    }

    output
}
