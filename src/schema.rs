//! Data model shared by the ingress socket, the state store and the MCP server
//!
//! A [`TargetedElement`] is a snapshot of one DOM element taken by the browser
//! extension when the user pointed at it. The relay never inspects the style
//! bundle or any field it does not know about: unknown keys are captured in
//! [`TargetedElement::extra`] and written back out verbatim.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Geometric position of an element in page coordinates
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementPosition {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Component-framework descriptor (React fiber name, Vue component, ...)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
    /// Framework tag, e.g. "react", "vue", "angular", "svelte"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub framework: Option<String>,
}

/// One DOM element captured at selection time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetedElement {
    /// 1-based selection order when several elements are tracked
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idx: Option<u32>,
    pub selector: String,
    #[serde(default)]
    pub tag_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub inner_text: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub position: ElementPosition,
    /// Style bundle, passed through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css_properties: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_info: Option<ComponentInfo>,
    /// Capture time in epoch milliseconds
    #[serde(default)]
    pub timestamp: u64,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab_id: Option<i64>,
    /// Any other field the extension sent (outerHTML, allCss, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TargetedElement {
    /// Minimal element with only a selector, mostly useful in tests
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            idx: None,
            selector: selector.into(),
            tag_name: String::new(),
            id: None,
            classes: Vec::new(),
            inner_text: String::new(),
            attributes: BTreeMap::new(),
            position: ElementPosition::default(),
            css_properties: None,
            component_info: None,
            timestamp: 0,
            url: String::new(),
            tab_id: None,
            extra: Map::new(),
        }
    }

    /// Short one-line label: `<div#id.class> selector`
    pub fn label(&self) -> String {
        let mut tag = self.tag_name.to_lowercase();
        if tag.is_empty() {
            tag.push('?');
        }
        if let Some(id) = self.id.as_deref().filter(|id| !id.is_empty()) {
            tag.push('#');
            tag.push_str(id);
        }
        for class in self.classes.iter().take(3) {
            tag.push('.');
            tag.push_str(class);
        }
        format!("<{}> {}", tag, self.selector)
    }
}

/// Decode a `data` payload that is either a single element or an array of
/// elements, assigning 1-based `idx` values to elements that lack one.
pub fn elements_from_payload(payload: Value) -> serde_json::Result<Vec<TargetedElement>> {
    let mut elements = match payload {
        Value::Array(items) => items
            .into_iter()
            .map(serde_json::from_value)
            .collect::<serde_json::Result<Vec<TargetedElement>>>()?,
        other => vec![serde_json::from_value(other)?],
    };

    for (position, element) in elements.iter_mut().enumerate() {
        if element.idx.is_none() {
            element.idx = Some(position as u32 + 1);
        }
    }

    Ok(elements)
}

/// What the shared state store currently holds
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// Never written, missing, or unreadable storage
    Unset,
    /// Explicitly cleared by the last write
    Cleared,
    /// One or more elements, in selection order
    Elements(Vec<TargetedElement>),
}

impl Selection {
    /// Build a selection from a list, mapping an empty list to `Cleared`
    pub fn from_elements(elements: Vec<TargetedElement>) -> Self {
        if elements.is_empty() {
            Self::Cleared
        } else {
            Self::Elements(elements)
        }
    }

    pub fn elements(&self) -> &[TargetedElement] {
        match self {
            Self::Elements(elements) => elements,
            Self::Unset | Self::Cleared => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.elements().is_empty()
    }

    pub fn len(&self) -> usize {
        self.elements().len()
    }
}

/// Status report exchanged with the extension in `server-status` frames
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerStatus {
    #[serde(default)]
    pub running: bool,
    #[serde(default)]
    pub port: u16,
    pub connected: bool,
    pub elements_inspected: u64,
    /// Milliseconds since this instance became leader
    pub uptime: u64,
}
