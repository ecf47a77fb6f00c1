//! Element nodes
//!
//! The in-memory stand-in for a DOM element: a tag, its attributes, its inner
//! markup and, once a definition is known, the lifecycle driving it.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use super::component::Lifecycle;
use super::error::Result;
use super::props::Attribute;
use super::registry::ElementConstructor;
use super::subscription::Subscription;

/// Document-unique element identifier
pub type ElementId = u64;

/// Where an element is in its custom element lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementState {
    /// No definition was known when the element was created
    Undefined,
    /// The constructor or the last connected callback raised an error
    Failed,
    /// Props computed, not yet inserted into the document
    Constructed,
    /// Inserted; the last connected callback succeeded
    Mounted,
}

struct ElementNode {
    id: ElementId,
    tag: String,
    attributes: RefCell<Vec<Attribute>>,
    inner_html: RefCell<String>,
    state: Cell<ElementState>,
    connected: Cell<bool>,
    mount_count: Cell<u32>,
    render_count: Cell<u32>,
    lifecycle: RefCell<Option<Box<dyn Lifecycle>>>,
    retained: RefCell<Vec<Subscription>>,
}

/// Shared handle to an element. Clones refer to the same element.
#[derive(Clone)]
pub struct ElementRef(Rc<ElementNode>);

/// Non-owning handle to an element
#[derive(Clone)]
pub struct WeakElement(Weak<ElementNode>);

impl WeakElement {
    pub fn upgrade(&self) -> Option<ElementRef> {
        self.0.upgrade().map(ElementRef)
    }
}

impl ElementRef {
    pub(crate) fn new(
        id: ElementId,
        tag: impl Into<String>,
        attributes: Vec<Attribute>,
        inner_html: impl Into<String>,
    ) -> Self {
        ElementRef(Rc::new(ElementNode {
            id,
            tag: tag.into(),
            attributes: RefCell::new(attributes),
            inner_html: RefCell::new(inner_html.into()),
            state: Cell::new(ElementState::Undefined),
            connected: Cell::new(false),
            mount_count: Cell::new(0),
            render_count: Cell::new(0),
            lifecycle: RefCell::new(None),
            retained: RefCell::new(Vec::new()),
        }))
    }

    pub fn id(&self) -> ElementId {
        self.0.id
    }

    pub fn tag(&self) -> &str {
        &self.0.tag
    }

    pub fn downgrade(&self) -> WeakElement {
        WeakElement(Rc::downgrade(&self.0))
    }

    /// Check if both handles refer to the same element
    pub fn ptr_eq(&self, other: &ElementRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    // ========================================================================
    // Attributes
    // ========================================================================

    /// Snapshot of the current attributes, in order
    pub fn attributes(&self) -> Vec<Attribute> {
        self.0.attributes.borrow().clone()
    }

    pub fn get_attribute(&self, name: &str) -> Option<String> {
        self.0
            .attributes
            .borrow()
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.clone())
    }

    /// Set an attribute, replacing an existing value in place.
    ///
    /// Props of an already constructed element are not recomputed.
    pub fn set_attribute(&self, name: &str, value: impl Into<String>) {
        let value = value.into();
        let mut attributes = self.0.attributes.borrow_mut();
        match attributes.iter_mut().find(|a| a.name == name) {
            Some(attribute) => attribute.value = value,
            None => attributes.push(Attribute::new(name, value)),
        }
    }

    pub fn remove_attribute(&self, name: &str) -> bool {
        let mut attributes = self.0.attributes.borrow_mut();
        let before = attributes.len();
        attributes.retain(|a| a.name != name);
        attributes.len() != before
    }

    // ========================================================================
    // Content
    // ========================================================================

    pub fn inner_html(&self) -> String {
        self.0.inner_html.borrow().clone()
    }

    /// Replace the inner content verbatim. Markup is not escaped.
    pub fn set_inner_html(&self, markup: impl Into<String>) {
        *self.0.inner_html.borrow_mut() = markup.into();
        self.0.render_count.set(self.0.render_count.get() + 1);
    }

    /// How many times the inner content was replaced
    pub fn render_count(&self) -> u32 {
        self.0.render_count.get()
    }

    /// Serialize the element with its attributes and inner content
    pub fn outer_html(&self) -> String {
        let mut html = format!("<{}", self.0.tag);
        for attribute in self.0.attributes.borrow().iter() {
            html.push(' ');
            html.push_str(&attribute.name);
            if !attribute.value.is_empty() {
                html.push_str("=\"");
                html.push_str(&escape_attribute(&attribute.value));
                html.push('"');
            }
        }
        html.push('>');
        html.push_str(&self.0.inner_html.borrow());
        html.push_str(&format!("</{}>", self.0.tag));
        html
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    pub fn state(&self) -> ElementState {
        self.0.state.get()
    }

    pub fn is_connected(&self) -> bool {
        self.0.connected.get()
    }

    /// How many times the connected callback has run
    pub fn mount_count(&self) -> u32 {
        self.0.mount_count.get()
    }

    /// Run a definition's constructor against this element
    pub(crate) fn construct(&self, constructor: &ElementConstructor) -> Result<()> {
        match constructor(self) {
            Ok(lifecycle) => {
                *self.0.lifecycle.borrow_mut() = Some(lifecycle);
                self.0.state.set(ElementState::Constructed);
                Ok(())
            }
            Err(e) => {
                self.0.state.set(ElementState::Failed);
                Err(e)
            }
        }
    }

    /// Mark the element as inserted and fire its connected callback
    pub(crate) fn connect(&self) -> Result<()> {
        self.0.connected.set(true);

        // Taken out for the duration of the callback so a widget touching its
        // own element never finds the lifecycle borrowed.
        let Some(mut lifecycle) = self.0.lifecycle.borrow_mut().take() else {
            return Ok(());
        };
        self.0.mount_count.set(self.0.mount_count.get() + 1);
        let result = lifecycle.connected();
        *self.0.lifecycle.borrow_mut() = Some(lifecycle);
        self.0.state.set(match result {
            Ok(()) => ElementState::Mounted,
            Err(_) => ElementState::Failed,
        });
        result
    }

    /// Mark the element as removed and fire its disconnected callback
    pub(crate) fn disconnect(&self) {
        self.0.connected.set(false);
        let lifecycle = self.0.lifecycle.borrow_mut().take();
        if let Some(mut lifecycle) = lifecycle {
            lifecycle.disconnected();
            *self.0.lifecycle.borrow_mut() = Some(lifecycle);
        }
    }

    // ========================================================================
    // Subscriptions
    // ========================================================================

    /// Keep a timer or listener handle with this element for [`ElementRef::teardown`]
    pub fn retain(&self, subscription: Subscription) {
        self.0.retained.borrow_mut().push(subscription);
    }

    /// Number of handles retained and not yet cancelled
    pub fn retained(&self) -> usize {
        self.0
            .retained
            .borrow()
            .iter()
            .filter(|s| !s.is_cancelled())
            .count()
    }

    /// Cancel every retained timer and listener.
    ///
    /// Nothing calls this implicitly: a removed element keeps its timers
    /// running unless its owner opts in. Returns how many were cancelled.
    pub fn teardown(&self) -> usize {
        let retained = std::mem::take(&mut *self.0.retained.borrow_mut());
        let mut cancelled = 0;
        for subscription in retained {
            if !subscription.is_cancelled() {
                subscription.cancel();
                cancelled += 1;
            }
        }
        if cancelled > 0 {
            log::debug!(
                "[elements] <{}> #{} tore down {} subscriptions",
                self.tag(),
                self.id(),
                cancelled
            );
        }
        cancelled
    }
}

impl fmt::Debug for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementRef")
            .field("id", &self.0.id)
            .field("tag", &self.0.tag)
            .field("state", &self.0.state.get())
            .field("connected", &self.0.connected.get())
            .finish()
    }
}

fn escape_attribute(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}
