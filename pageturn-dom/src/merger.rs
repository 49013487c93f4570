use crate::document::{Container, Dom, Element};
use crate::error::{DomError, Result};
use crate::head;
use scraper::{Html, Selector};
use tracing::{debug, warn};

/// Id of the persistent element that hosts containers across transitions.
pub const DEFAULT_WRAPPER_ID: &str = "pageturn-wrapper";

/// Class marking the page-specific content subtree.
pub const DEFAULT_CONTAINER_CLASS: &str = "pageturn-container";

/// Dataset key holding the page-type tag (`data-namespace` in markup).
pub const DEFAULT_NAMESPACE_DATA: &str = "namespace";

/// Merges a freshly fetched page into the live document: lifts out its
/// container subtree and swaps the allowlisted head metadata.
///
/// The merger is the only writer of the live head; each replacement runs as
/// one uninterrupted logical step.
#[derive(Debug, Clone)]
pub struct ContentMerger {
    wrapper_id: String,
    container_class: String,
    container_selector: Selector,
    namespace_data: String,
    last_html: Option<String>,
}

impl ContentMerger {
    pub fn new() -> Self {
        Self {
            wrapper_id: DEFAULT_WRAPPER_ID.to_string(),
            container_class: DEFAULT_CONTAINER_CLASS.to_string(),
            // Constant input, cannot fail.
            container_selector: class_selector(DEFAULT_CONTAINER_CLASS).unwrap(),
            namespace_data: DEFAULT_NAMESPACE_DATA.to_string(),
            last_html: None,
        }
    }

    /// Override the wrapper id. Must form a valid CSS identifier.
    pub fn with_wrapper_id(mut self, wrapper_id: &str) -> Self {
        self.wrapper_id = wrapper_id.to_string();
        self
    }

    /// Override the container class. A class that does not form a valid
    /// CSS identifier is ignored and the previous class kept.
    pub fn with_container_class(mut self, container_class: &str) -> Self {
        match class_selector(container_class) {
            Some(selector) => {
                self.container_selector = selector;
                self.container_class = container_class.to_string();
            }
            None => {
                warn!(
                    "Ignoring container class {:?}: not a valid CSS identifier",
                    container_class
                );
            }
        }
        self
    }

    /// Override the dataset key carrying the namespace tag.
    pub fn with_namespace_data(mut self, namespace_data: &str) -> Self {
        self.namespace_data = namespace_data.to_string();
        self
    }

    /// Parse the raw HTML of a freshly fetched page and lift out its
    /// container subtree, hidden and detached, ready for insertion.
    pub fn parse(&mut self, raw_html: &str, live: &impl Dom) -> Result<Container> {
        // Head extraction runs first so a page with an unusable head fails
        // before anything else is touched.
        let head_markup = head::extract_head_markup(raw_html)?;
        let incoming_head = head::parse_head_elements(head_markup);
        debug!(
            "Incoming page carries {} replaceable head elements",
            incoming_head.len()
        );

        if live.query_selector(&self.wrapper_selector()).is_none() {
            return Err(DomError::ContainerNotFound);
        }

        let document = Html::parse_document(raw_html);
        let container = document
            .select(&self.container_selector)
            .next()
            .ok_or_else(|| {
                DomError::MalformedDocument(format!(
                    "no element with class {:?}",
                    self.container_class
                ))
            })?;

        self.last_html = Some(raw_html.to_string());

        let mut element = Element::from_element(&container);
        hide(&mut element);
        Ok(Container { element })
    }

    /// Replace the live head's allowlisted metadata with the incoming
    /// page's, in source order. Head elements outside the allowlist are
    /// never touched. Best-effort replace, not transactional.
    pub fn update_head(&self, raw_html: &str, live: &mut impl Dom) -> Result<()> {
        let head_markup = head::extract_head_markup(raw_html)?;
        let incoming = head::parse_head_elements(head_markup);

        let selector = head::head_selector();
        let old = live.head_select(&selector);

        let plan = head::plan_head_swap(&old, &incoming);
        plan.apply(live);
        Ok(())
    }

    /// The single element hosting containers across transitions.
    pub fn locate_wrapper(&self, live: &impl Dom) -> Result<Element> {
        live.query_selector(&self.wrapper_selector())
            .ok_or(DomError::WrapperNotFound)
    }

    /// Namespace tag of a container element: structured dataset lookup
    /// first, raw attribute second.
    pub fn read_namespace(&self, element: &Element) -> Option<String> {
        let raw_attr = format!("data-{}", self.namespace_data);
        element
            .dataset(&self.namespace_data)
            .or_else(|| element.attr(&raw_attr))
            .map(str::to_string)
    }

    /// Hide and append a container into the live wrapper. The external
    /// driver reveals it once its transition starts.
    pub fn insert_container(&self, container: &Container, live: &mut impl Dom) -> Result<()> {
        self.locate_wrapper(live)?;
        let mut container = container.clone();
        hide(&mut container.element);
        live.append_to_wrapper(&container);
        Ok(())
    }

    /// Raw HTML of the most recently parsed page.
    pub fn last_html(&self) -> Option<&str> {
        self.last_html.as_deref()
    }

    fn wrapper_selector(&self) -> String {
        format!("#{}", self.wrapper_id)
    }
}

impl Default for ContentMerger {
    fn default() -> Self {
        Self::new()
    }
}

fn class_selector(class: &str) -> Option<Selector> {
    Selector::parse(&format!(".{class}")).ok()
}

/// Fold `visibility: hidden` into the element's inline style, once.
fn hide(element: &mut Element) {
    let style = match element.attr("style") {
        Some(existing) if existing.replace(' ', "").contains("visibility:hidden") => return,
        Some(existing) => {
            let trimmed = existing.trim().trim_end_matches(';').trim_end();
            if trimmed.is_empty() {
                "visibility: hidden".to_string()
            } else {
                format!("{trimmed}; visibility: hidden")
            }
        }
        None => "visibility: hidden".to_string(),
    };
    element.set_attr("style", style);
}
