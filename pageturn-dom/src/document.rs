use crate::error::Result;
use crate::head::{self, HeadElement};
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

/// Owned snapshot of an element, detached from any live tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub tag: String,
    /// Attributes in document order.
    pub attrs: Vec<(String, String)>,
    pub inner_html: String,
}

impl Element {
    pub fn from_element(element: &ElementRef) -> Self {
        Self {
            tag: element.value().name().to_string(),
            attrs: element
                .value()
                .attrs()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
            inner_html: element.inner_html(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(attr, _)| attr == name)
            .map(|(_, value)| value.as_str())
    }

    /// Dataset-style lookup: `data-foo` exposed under the key `foo`.
    pub fn dataset(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(attr, _)| attr.strip_prefix("data-") == Some(key))
            .map(|(_, value)| value.as_str())
    }

    /// Set or replace an attribute.
    pub fn set_attr(&mut self, name: &str, value: String) {
        if let Some(entry) = self.attrs.iter_mut().find(|(attr, _)| attr == name) {
            entry.1 = value;
        } else {
            self.attrs.push((name.to_string(), value));
        }
    }

    /// Render the element back to markup.
    pub fn outer_html(&self) -> String {
        let mut out = String::new();
        out.push('<');
        out.push_str(&self.tag);
        for (name, value) in &self.attrs {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&value.replace('"', "&quot;"));
            out.push('"');
        }
        out.push('>');
        out.push_str(&self.inner_html);
        out.push_str("</");
        out.push_str(&self.tag);
        out.push('>');
        out
    }
}

/// The page-specific content subtree lifted out of an incoming document,
/// detached from any live tree and hidden until the driver reveals it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    pub element: Element,
}

impl Container {
    /// Whether the inline style still hides the container.
    pub fn is_hidden(&self) -> bool {
        self.element
            .attr("style")
            .map(|style| style.replace(' ', "").contains("visibility:hidden"))
            .unwrap_or(false)
    }

    pub fn outer_html(&self) -> String {
        self.element.outer_html()
    }
}

/// Minimal view of the live page the merger needs: selector lookup over the
/// document plus ordered access to the head children it may rewrite.
///
/// External drivers implement this over a real DOM; [`MemoryDocument`] is
/// the shipped headless implementation.
pub trait Dom {
    /// First element matching the CSS selector, if any.
    fn query_selector(&self, selector: &str) -> Option<Element>;

    /// Snapshot of head children matching the selector group, in document
    /// order.
    fn head_select(&self, selector: &Selector) -> Vec<HeadElement>;

    /// Remove one head child. Returns false when no matching child exists.
    fn head_remove(&mut self, element: &HeadElement) -> bool;

    /// Append a child at the end of the head.
    fn head_append(&mut self, element: HeadElement);

    /// Append a container subtree into the wrapper element. Callers check
    /// wrapper presence first.
    fn append_to_wrapper(&mut self, container: &Container);
}

/// In-memory live page built from raw HTML. Lets the merge protocol run
/// headlessly, and in tests, without a browser.
#[derive(Debug, Clone)]
pub struct MemoryDocument {
    head: Vec<HeadElement>,
    body_html: String,
    /// Containers appended after the initial parse, kept apart from the
    /// original markup so insertion does not re-serialize the body.
    wrapper_children: Vec<Container>,
}

impl MemoryDocument {
    /// Build from a full HTML document. Fails with `MalformedDocument` when
    /// the markup carries no head block.
    pub fn from_html(raw_html: &str) -> Result<Self> {
        let head_markup = head::extract_head_markup(raw_html)?;
        Ok(Self {
            head: head::parse_all_head_elements(head_markup),
            body_html: raw_html.to_string(),
            wrapper_children: Vec::new(),
        })
    }

    /// All head children in document order, allowlisted or not.
    pub fn head(&self) -> &[HeadElement] {
        &self.head
    }

    /// Containers appended into the wrapper so far.
    pub fn wrapper_children(&self) -> &[Container] {
        &self.wrapper_children
    }
}

impl Dom for MemoryDocument {
    fn query_selector(&self, selector: &str) -> Option<Element> {
        let selector = Selector::parse(selector).ok()?;
        let document = Html::parse_document(&self.body_html);
        document
            .select(&selector)
            .next()
            .map(|element| Element::from_element(&element))
    }

    fn head_select(&self, selector: &Selector) -> Vec<HeadElement> {
        self.head
            .iter()
            .filter(|element| element.matches(selector))
            .cloned()
            .collect()
    }

    fn head_remove(&mut self, element: &HeadElement) -> bool {
        match self.head.iter().position(|existing| existing == element) {
            Some(index) => {
                self.head.remove(index);
                true
            }
            None => false,
        }
    }

    fn head_append(&mut self, element: HeadElement) {
        self.head.push(element);
    }

    fn append_to_wrapper(&mut self, container: &Container) {
        self.wrapper_children.push(container.clone());
    }
}
