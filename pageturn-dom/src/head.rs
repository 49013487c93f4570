use crate::document::Dom;
use crate::error::{DomError, Result};
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Head children that travel with a page transition. Everything else in the
/// head (stylesheets, scripts, ...) is left untouched by a swap.
pub const HEAD_TAGS: &[&str] = &[
    "title",
    r#"meta[name="keywords"]"#,
    r#"meta[name="description"]"#,
    r#"meta[property^="og"]"#,
    r#"meta[name^="twitter"]"#,
    "meta[itemprop]",
    "link[itemprop]",
    r#"link[rel="prev"]"#,
    r#"link[rel="next"]"#,
    r#"link[rel="canonical"]"#,
    r#"link[rel="alternate"]"#,
];

/// Compiled selector group for the full allowlist.
pub fn head_selector() -> Selector {
    // Constant input, cannot fail.
    Selector::parse(&HEAD_TAGS.join(",")).unwrap()
}

/// Owned snapshot of one head child, detached from any live tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadElement {
    pub tag: String,
    /// Attributes in document order.
    pub attrs: Vec<(String, String)>,
    pub text: String,
    /// Outer HTML as rendered by the parser.
    pub html: String,
}

impl HeadElement {
    pub fn from_element(element: &ElementRef) -> Self {
        Self {
            tag: element.value().name().to_string(),
            attrs: element
                .value()
                .attrs()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
            text: element.text().collect(),
            html: element.html(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(attr, _)| attr == name)
            .map(|(_, value)| value.as_str())
    }

    /// Whether this element matches the given selector group.
    pub fn matches(&self, selector: &Selector) -> bool {
        let fragment = Html::parse_fragment(&self.html);
        fragment
            .root_element()
            .children()
            .filter_map(ElementRef::wrap)
            .next()
            .map(|element| selector.matches(&element))
            .unwrap_or(false)
    }
}

/// Pull the inner markup of the `<head>` block out of a raw HTML document.
/// Tolerant of attributes on the head tag and of mixed casing.
pub fn extract_head_markup(raw_html: &str) -> Result<&str> {
    // Byte offsets in the lowercased copy line up with the original since
    // ASCII lowercasing preserves length.
    let lower = raw_html.to_ascii_lowercase();

    let open_end = find_head_open(&lower)
        .ok_or_else(|| DomError::MalformedDocument("no <head> block".to_string()))?;
    let close = lower[open_end..]
        .find("</head")
        .ok_or_else(|| DomError::MalformedDocument("unterminated <head> block".to_string()))?;

    Ok(&raw_html[open_end..open_end + close])
}

/// Locate the opening `<head ...>` tag, skipping lookalikes such as
/// `<header>`. Returns the offset just past the closing `>`.
fn find_head_open(lower: &str) -> Option<usize> {
    let mut from = 0;
    while let Some(found) = lower[from..].find("<head") {
        let start = from + found;
        let rest = &lower[start + 5..];
        let at_boundary = rest
            .chars()
            .next()
            .map(|c| c == '>' || c.is_ascii_whitespace() || c == '/')
            .unwrap_or(false);
        if at_boundary {
            let gt = rest.find('>')?;
            return Some(start + 5 + gt + 1);
        }
        from = start + 5;
    }
    None
}

/// Allowlisted elements from a head markup fragment, in source order.
pub fn parse_head_elements(head_markup: &str) -> Vec<HeadElement> {
    let fragment = Html::parse_fragment(head_markup);
    let selector = head_selector();
    fragment
        .select(&selector)
        .map(|element| HeadElement::from_element(&element))
        .collect()
}

/// Every head child from a markup fragment, allowlisted or not.
pub fn parse_all_head_elements(head_markup: &str) -> Vec<HeadElement> {
    let fragment = Html::parse_fragment(head_markup);
    fragment
        .root_element()
        .children()
        .filter_map(ElementRef::wrap)
        .map(|element| HeadElement::from_element(&element))
        .collect()
}

/// Everything a head replacement will do, computed before any mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadSwapPlan {
    /// Live elements to drop, in document order.
    pub remove: Vec<HeadElement>,
    /// Incoming elements to append, in source order.
    pub append: Vec<HeadElement>,
}

impl HeadSwapPlan {
    /// Apply the plan to the live document as one explicit step: removals
    /// first, then appends. Best-effort replace, not transactional.
    pub fn apply(&self, live: &mut impl Dom) {
        for element in &self.remove {
            if !live.head_remove(element) {
                warn!("Head element disappeared before removal: <{}>", element.tag);
            }
        }
        for element in &self.append {
            live.head_append(element.clone());
        }
        debug!(
            "Head swap applied: {} removed, {} appended",
            self.remove.len(),
            self.append.len()
        );
    }
}

/// Build the replacement plan from the live document's allowlisted head
/// elements and the incoming page's. Pure: touches no document.
pub fn plan_head_swap(live: &[HeadElement], incoming: &[HeadElement]) -> HeadSwapPlan {
    HeadSwapPlan {
        remove: live.to_vec(),
        append: incoming.to_vec(),
    }
}
