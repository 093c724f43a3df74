// crates/gateway-soap/src/dom.rs
// ============================================================================
// Module: XML Element Tree
// Description: Minimal namespace-aware DOM built over quick-xml events.
// Purpose: Give fault parsing and response mapping a queryable tree.
// Dependencies: quick-xml, thiserror
// ============================================================================

//! ## Overview
//! The upstream services answer with modest documents (a search response
//! tops out at tens of kilobytes), so mapping works on a fully materialized
//! element tree instead of streaming events. Lookups by local name are
//! case-insensitive and namespace-blind; wrapper elements are additionally
//! matched by namespace. quick-xml does not expand entities, so the tree is
//! safe against XXE by construction.
//! Invariants:
//! - Nesting deeper than [`MAX_ELEMENT_DEPTH`] fails closed.
//! - Element text is stored unescaped; blank text reads as absent.

// ============================================================================
// SECTION: Imports
// ============================================================================

use quick_xml::NsReader;
use quick_xml::events::BytesStart;
use quick_xml::events::Event;
use quick_xml::name::ResolveResult;
use thiserror::Error;

use crate::text::xml_escape;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum accepted element nesting depth.
pub const MAX_ELEMENT_DEPTH: usize = 64;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while building the element tree.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum XmlError {
    /// The document is not well-formed XML.
    #[error("xml syntax error: {0}")]
    Syntax(String),
    /// The document contains no root element.
    #[error("xml document has no root element")]
    NoRoot,
    /// Nesting exceeded [`MAX_ELEMENT_DEPTH`].
    #[error("xml nesting exceeds {MAX_ELEMENT_DEPTH} levels")]
    TooDeep,
}

// ============================================================================
// SECTION: Element Tree
// ============================================================================

/// One element of a parsed XML document.
///
/// # Invariants
/// - `local_name` never contains a namespace prefix.
/// - `text` holds the concatenated, entity-decoded direct text content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    /// Local (prefix-free) element name.
    local_name: String,
    /// Resolved namespace URI, when the element is qualified.
    namespace: Option<String>,
    /// Concatenated direct text content.
    text: String,
    /// Child elements in document order.
    children: Vec<XmlElement>,
}

impl XmlElement {
    /// Returns the local element name.
    #[must_use]
    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    /// Returns the resolved namespace URI, if any.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Returns the trimmed text content, or `None` when blank.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        let trimmed = self.text.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }

    /// Returns all child elements in document order.
    #[must_use]
    pub fn children(&self) -> &[Self] {
        &self.children
    }

    /// Returns the first child whose local name matches, case-insensitively.
    #[must_use]
    pub fn child(&self, local: &str) -> Option<&Self> {
        self.children
            .iter()
            .find(|c| c.local_name.eq_ignore_ascii_case(local))
    }

    /// Returns all children whose local name matches, case-insensitively.
    pub fn children_named<'a>(&'a self, local: &'a str) -> impl Iterator<Item = &'a Self> {
        self.children
            .iter()
            .filter(move |c| c.local_name.eq_ignore_ascii_case(local))
    }

    /// Returns the trimmed text of the named child, or `None` when the child
    /// is absent or blank.
    #[must_use]
    pub fn value_of(&self, local: &str) -> Option<String> {
        self.child(local)
            .and_then(Self::text)
            .map(ToString::to_string)
    }

    /// Depth-first search for the first descendant with the given local
    /// name, case-insensitively. Excludes `self`.
    #[must_use]
    pub fn descendant(&self, local: &str) -> Option<&Self> {
        for child in &self.children {
            if child.local_name.eq_ignore_ascii_case(local) {
                return Some(child);
            }
            if let Some(found) = child.descendant(local) {
                return Some(found);
            }
        }
        None
    }

    /// Depth-first search for the first descendant with the given namespace
    /// and local name. Includes `self`.
    #[must_use]
    pub fn descendant_in(&self, namespace: &str, local: &str) -> Option<&Self> {
        if self.local_name.eq_ignore_ascii_case(local) && self.namespace() == Some(namespace) {
            return Some(self);
        }
        self.children
            .iter()
            .find_map(|c| c.descendant_in(namespace, local))
    }

    /// Serializes the subtree as compact XML without namespace prefixes.
    ///
    /// Used when a fault `detail` has no recognizable technical field and
    /// the whole subtree becomes the technical description.
    #[must_use]
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        self.write_xml(&mut out);
        out
    }

    /// Appends this subtree to `out`.
    fn write_xml(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.local_name);
        out.push('>');
        out.push_str(&xml_escape(self.text.trim()));
        for child in &self.children {
            child.write_xml(out);
        }
        out.push_str("</");
        out.push_str(&self.local_name);
        out.push('>');
    }
}

// ============================================================================
// SECTION: Parsing
// ============================================================================

/// Parses an XML document into its root element.
///
/// # Errors
///
/// Returns [`XmlError`] when the document is malformed, has no root, or
/// nests deeper than [`MAX_ELEMENT_DEPTH`].
pub fn parse(xml: &str) -> Result<XmlElement, XmlError> {
    let mut reader = NsReader::from_str(xml);
    let mut buf = Vec::new();
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        let (resolve, event) = reader
            .read_resolved_event_into(&mut buf)
            .map_err(|e| XmlError::Syntax(e.to_string()))?;
        match event {
            Event::Start(ref start) => {
                if stack.len() >= MAX_ELEMENT_DEPTH {
                    return Err(XmlError::TooDeep);
                }
                stack.push(element_from(&resolve, start));
            }
            Event::Empty(ref start) => {
                let element = element_from(&resolve, start);
                attach(element, &mut stack, &mut root);
            }
            Event::End(_) => {
                let Some(element) = stack.pop() else {
                    return Err(XmlError::Syntax("unbalanced end tag".to_string()));
                };
                attach(element, &mut stack, &mut root);
            }
            Event::Text(ref t) => {
                if let Some(top) = stack.last_mut() {
                    let decoded = t
                        .unescape()
                        .map_err(|e| XmlError::Syntax(e.to_string()))?;
                    top.text.push_str(&decoded);
                }
            }
            Event::CData(ref t) => {
                if let Some(top) = stack.last_mut() {
                    top.text
                        .push_str(&String::from_utf8_lossy(&t.clone().into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(XmlError::Syntax("unclosed element".to_string()));
    }
    root.ok_or(XmlError::NoRoot)
}

/// Builds an element shell from a start tag and its resolved namespace.
fn element_from(resolve: &ResolveResult<'_>, start: &BytesStart<'_>) -> XmlElement {
    let local_name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
    let namespace = match resolve {
        ResolveResult::Bound(ns) => Some(String::from_utf8_lossy(ns.as_ref()).into_owned()),
        _ => None,
    };
    XmlElement {
        local_name,
        namespace,
        text: String::new(),
        children: Vec::new(),
    }
}

/// Attaches a completed element to its parent, or records it as the root.
fn attach(element: XmlElement, stack: &mut Vec<XmlElement>, root: &mut Option<XmlElement>) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
    } else if root.is_none() {
        *root = Some(element);
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
