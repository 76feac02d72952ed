//! Text rendering of pointed elements for MCP responses

use std::fmt::Write;

use crate::schema::TargetedElement;

/// Returned whenever nothing is selected (never written, cleared, or unreadable)
pub const NO_SELECTION_MESSAGE: &str = "No element is currently pointed. \
The user needs to point an element in their browser using Option+Click.";

/// Outcome of looking up one requested index
#[derive(Debug, Clone, PartialEq)]
pub enum IndexLookup<'a> {
    Found(&'a TargetedElement),
    OutOfRange,
}

/// Resolve each requested index against `elements`, in request order
pub fn lookup_indices<'a>(
    elements: &'a [TargetedElement],
    indices: &[i64],
) -> Vec<(i64, IndexLookup<'a>)> {
    indices
        .iter()
        .map(|&index| {
            let found = usize::try_from(index)
                .ok()
                .and_then(|i| elements.get(i))
                .map_or(IndexLookup::OutOfRange, IndexLookup::Found);
            (index, found)
        })
        .collect()
}

/// `0..N-1` description of the valid index range
pub fn valid_range(count: usize) -> String {
    format!("0..{}", count.saturating_sub(1))
}

/// Render every selected element with a 1-based display index
pub fn format_selection(elements: &[TargetedElement]) -> String {
    let mut output = format!("Selected {} element(s):\n", elements.len());
    for (position, element) in elements.iter().enumerate() {
        output.push('\n');
        push_element(&mut output, &format!("Element {}", position + 1), element);
    }
    output
}

/// Render the per-index lookup, one section per requested index
pub fn format_indexed(elements: &[TargetedElement], indices: &[i64]) -> String {
    let range = valid_range(elements.len());

    if indices.is_empty() {
        return format!(
            "No indices requested. {} element(s) are pointed (valid range: {}).\n",
            elements.len(),
            range
        );
    }

    let results = lookup_indices(elements, indices);
    let found = results
        .iter()
        .filter(|(_, r)| matches!(r, IndexLookup::Found(_)))
        .count();

    let mut output = format!(
        "Requested {} index(es), {} found (valid range: {}):\n",
        indices.len(),
        found,
        range
    );
    for (index, result) in results {
        output.push('\n');
        match result {
            IndexLookup::Found(element) => {
                push_element(&mut output, &format!("Index {}", index), element)
            }
            IndexLookup::OutOfRange => {
                let _ = writeln!(
                    output,
                    "## Index {}\nError: index {} is out of range (valid range: {})",
                    index, index, range
                );
            }
        }
    }
    output
}

fn push_element(output: &mut String, heading: &str, element: &TargetedElement) {
    let json = serde_json::to_string_pretty(element).unwrap_or_else(|_| "{}".to_string());
    let _ = writeln!(output, "## {}: {}", heading, element.label());
    if !element.url.is_empty() {
        let _ = writeln!(output, "url: {}", element.url);
    }
    let _ = writeln!(output, "```json\n{}\n```", json);
}
