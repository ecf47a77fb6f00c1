//! Document
//!
//! Owns the top-level elements of a page and drives their lifecycle: elements
//! of a defined tag are constructed when created, mounted when appended and
//! notified when removed. Elements created before their tag was defined are
//! picked up by [`Document::upgrade`].

use std::cell::{Cell, RefCell};

use super::element::{ElementId, ElementRef, ElementState};
use super::error::Result;
use super::markup::parse_custom_elements;
use super::props::Attribute;
use super::registry::ElementRegistry;

/// A page: a flat list of top-level elements bound to one registry.
#[derive(Debug)]
pub struct Document {
    registry: ElementRegistry,
    children: RefCell<Vec<ElementRef>>,
    next_id: Cell<ElementId>,
}

impl Document {
    /// Create an empty document bound to `registry`
    pub fn new(registry: ElementRegistry) -> Self {
        Document {
            registry,
            children: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
        }
    }

    pub fn registry(&self) -> &ElementRegistry {
        &self.registry
    }

    /// Create an element with no attributes, constructing it if its tag is defined
    pub fn create_element(&self, tag: &str) -> Result<ElementRef> {
        self.create_element_with(tag, Vec::<Attribute>::new())
    }

    /// Create an element with attributes already in place, the way the HTML
    /// parser does, so the constructor sees them.
    pub fn create_element_with<I, A>(&self, tag: &str, attributes: I) -> Result<ElementRef>
    where
        I: IntoIterator<Item = A>,
        A: Into<Attribute>,
    {
        let attributes = attributes.into_iter().map(Into::into).collect();
        let element = self.instantiate(tag, attributes, String::new());
        self.construct(&element)?;
        Ok(element)
    }

    fn instantiate(&self, tag: &str, attributes: Vec<Attribute>, inner_html: String) -> ElementRef {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        ElementRef::new(id, tag.to_ascii_lowercase(), attributes, inner_html)
    }

    /// Run the tag's constructor, if the tag is defined
    fn construct(&self, element: &ElementRef) -> Result<bool> {
        match self.registry.get(element.tag()) {
            Some(constructor) => element.construct(&constructor).map(|_| true),
            None => Ok(false),
        }
    }

    /// Insert an element at the end of the document and mount it.
    ///
    /// Appending an element that is already in the document moves it: it is
    /// removed first, then connected again.
    pub fn append(&self, element: &ElementRef) -> Result<()> {
        if element.is_connected() {
            self.remove(element);
        }
        self.children.borrow_mut().push(element.clone());
        element.connect()
    }

    /// Remove an element from the document.
    ///
    /// Its timers and listeners keep running; see [`ElementRef::teardown`].
    pub fn remove(&self, element: &ElementRef) -> bool {
        let removed = {
            let mut children = self.children.borrow_mut();
            match children.iter().position(|child| child.ptr_eq(element)) {
                Some(index) => {
                    children.remove(index);
                    true
                }
                None => false,
            }
        };
        if removed {
            element.disconnect();
        }
        removed
    }

    /// Construct elements whose tag was defined after they were created, and
    /// mount the ones in the document.
    ///
    /// Constructor and mount failures are logged and leave that element
    /// failed; the others still upgrade. Returns how many elements upgraded.
    pub fn upgrade(&self) -> usize {
        let pending: Vec<ElementRef> = self
            .elements()
            .into_iter()
            .filter(|e| e.state() == ElementState::Undefined && self.registry.is_defined(e.tag()))
            .collect();

        let mut upgraded = 0;
        for element in pending {
            if self.construct_and_mount(&element) {
                upgraded += 1;
            }
        }
        upgraded
    }

    fn construct_and_mount(&self, element: &ElementRef) -> bool {
        if let Err(e) = self.construct(element) {
            log::error!("[elements] failed to construct <{}>: {}", element.tag(), e);
            return false;
        }
        if element.is_connected() {
            if let Err(e) = element.connect() {
                log::error!("[elements] failed to mount <{}>: {}", element.tag(), e);
            }
        }
        true
    }

    /// Parse markup and append every outermost custom element it contains.
    ///
    /// Like the HTML parser, a failing element does not stop the others: its
    /// error is logged and it stays in the document unrendered.
    pub fn parse(&self, markup: &str) -> Vec<ElementRef> {
        let mut elements = Vec::new();

        for parsed in parse_custom_elements(markup) {
            let element = self.instantiate(&parsed.tag, parsed.attributes, parsed.inner_html);
            if let Err(e) = self.construct(&element) {
                log::error!("[elements] failed to construct <{}>: {}", element.tag(), e);
            }
            if let Err(e) = self.append(&element) {
                log::error!("[elements] failed to mount <{}>: {}", element.tag(), e);
            }
            elements.push(element);
        }

        log::debug!("[elements] parsed {} custom elements", elements.len());
        elements
    }

    /// Snapshot of the top-level elements, in document order
    pub fn elements(&self) -> Vec<ElementRef> {
        self.children.borrow().clone()
    }

    /// Top-level elements with the given tag
    pub fn query_all(&self, tag: &str) -> Vec<ElementRef> {
        self.children
            .borrow()
            .iter()
            .filter(|e| e.tag() == tag)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.children.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.borrow().is_empty()
    }

    /// Serialize every top-level element, one per line
    pub fn to_html(&self) -> String {
        self.children
            .borrow()
            .iter()
            .map(ElementRef::outer_html)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::component::{Lifecycle, MountResult, RenderCallback, Widget};
    use crate::elements::props::PropMap;
    use crate::elements::registry::{register_components, register_element};
    use std::rc::Rc;

    fn echo() -> Rc<dyn Widget> {
        Rc::new(|props: &PropMap, _: &RenderCallback| -> MountResult {
            Ok(Some(props.get("value").map(|v| v.to_string()).unwrap_or_default()))
        })
    }

    fn document() -> Document {
        let registry = ElementRegistry::new();
        register_components(&registry, [("echo-value", echo())]).unwrap();
        Document::new(registry)
    }

    #[test]
    fn test_append_mounts() {
        let document = document();
        let element = document.create_element_with("echo-value", [("value", "7")]).unwrap();
        assert_eq!(element.state(), ElementState::Constructed);
        assert_eq!(element.inner_html(), "");

        document.append(&element).unwrap();
        assert_eq!(element.state(), ElementState::Mounted);
        assert_eq!(element.inner_html(), "7");
        assert!(element.is_connected());
    }

    #[test]
    fn test_reinsertion_mounts_again_with_original_props() {
        let document = document();
        let element = document.create_element_with("echo-value", [("value", "1")]).unwrap();
        document.append(&element).unwrap();

        assert!(document.remove(&element));
        assert!(!element.is_connected());
        element.set_attribute("value", "2");
        document.append(&element).unwrap();

        assert_eq!(element.mount_count(), 2);
        assert_eq!(element.render_count(), 2);
        assert_eq!(element.inner_html(), "1");
    }

    #[test]
    fn test_append_connected_element_moves_it() {
        let document = document();
        let first = document.create_element_with("echo-value", [("value", "a")]).unwrap();
        let second = document.create_element_with("echo-value", [("value", "b")]).unwrap();
        document.append(&first).unwrap();
        document.append(&second).unwrap();

        document.append(&first).unwrap();
        let order: Vec<u64> = document.elements().iter().map(ElementRef::id).collect();
        assert_eq!(order, vec![second.id(), first.id()]);
        assert_eq!(first.mount_count(), 2);
    }

    #[test]
    fn test_remove_unknown_element() {
        let document = document();
        let element = document.create_element("echo-value").unwrap();
        assert!(!document.remove(&element));
    }

    #[test]
    fn test_create_fails_on_malformed_attribute() {
        let document = document();
        let result = document.create_element_with("echo-value", [("value", "{nope")]);
        assert!(result.is_err());
    }

    #[test]
    fn test_undefined_elements_upgrade_later() {
        let document = Document::new(ElementRegistry::new());
        let element = document.create_element_with("late-widget", [("value", "x")]).unwrap();
        document.append(&element).unwrap();
        assert_eq!(element.state(), ElementState::Undefined);

        register_components(document.registry(), [("late-widget", echo())]).unwrap();
        assert_eq!(document.upgrade(), 1);
        assert_eq!(element.state(), ElementState::Mounted);
        assert_eq!(element.inner_html(), "x");
        assert_eq!(document.upgrade(), 0);
    }

    #[test]
    fn test_parse_isolates_failures() {
        let document = document();
        let elements = document.parse(
            r#"<echo-value value="{broken"></echo-value><echo-value value="ok"></echo-value><unknown-tag>raw</unknown-tag>"#,
        );

        assert_eq!(elements.len(), 3);
        assert_eq!(elements[0].state(), ElementState::Failed);
        assert_eq!(elements[0].inner_html(), "");
        assert_eq!(elements[1].inner_html(), "ok");
        assert_eq!(elements[2].state(), ElementState::Undefined);
        assert_eq!(elements[2].inner_html(), "raw");
        assert_eq!(document.len(), 3);
        assert_eq!(document.query_all("echo-value").len(), 2);
    }

    struct Counter {
        connected: Rc<Cell<u32>>,
        disconnected: Rc<Cell<u32>>,
    }

    impl Lifecycle for Counter {
        fn connected(&mut self) -> Result<()> {
            self.connected.set(self.connected.get() + 1);
            Ok(())
        }

        fn disconnected(&mut self) {
            self.disconnected.set(self.disconnected.get() + 1);
        }
    }

    #[test]
    fn test_raw_lifecycle_callbacks() {
        let document = Document::new(ElementRegistry::new());
        let connected = Rc::new(Cell::new(0));
        let disconnected = Rc::new(Cell::new(0));
        let (c, d) = (connected.clone(), disconnected.clone());
        register_element(document.registry(), "raw-element", move |_| {
            Ok(Counter {
                connected: c.clone(),
                disconnected: d.clone(),
            })
        })
        .unwrap();

        let element = document.create_element("raw-element").unwrap();
        document.append(&element).unwrap();
        document.remove(&element);
        document.append(&element).unwrap();

        assert_eq!(connected.get(), 2);
        assert_eq!(disconnected.get(), 1);
    }

    #[test]
    fn test_to_html() {
        let document = document();
        document.parse(r#"<echo-value value="hi"></echo-value>"#);
        assert_eq!(document.to_html(), r#"<echo-value value="hi">hi</echo-value>"#);
    }
}
