//! Widget Lifecycle Adapter
//!
//! Wraps a plain widget function in the custom element lifecycle. A
//! [`Component`] computes the element's [`PropMap`] once when it is
//! constructed, then mounts the widget every time the element is inserted
//! into the document.
//!
//! ```text
//! construct ──> Constructed ──insert──> Mounted
//!                                │  ▲
//!                          remove│  │insert (mounts again, same props)
//!                                ▼  │
//!                              detached
//! ```

use std::fmt;
use std::rc::Rc;

use super::element::{ElementRef, WeakElement};
use super::error::Result;
use super::props::PropMap;
use super::subscription::Subscription;

/// What a widget's mount produced: markup to render, or `None` when the
/// widget renders through its [`RenderCallback`] itself.
pub type MountResult = Result<Option<String>>;

/// Lifecycle callbacks of a defined custom element.
pub trait Lifecycle {
    /// Fired on every insertion into the document
    fn connected(&mut self) -> Result<()>;

    /// Fired on every removal from the document
    fn disconnected(&mut self) {}
}

/// A function from typed props and a render callback to optional markup.
///
/// Implemented for every `Fn(&PropMap, &RenderCallback) -> MountResult`.
/// A widget that keeps the default `mount` has no mount behavior and never
/// renders.
pub trait Widget {
    fn mount(&self, props: &PropMap, render: &RenderCallback) -> MountResult {
        let _ = (props, render);
        Ok(None)
    }
}

impl<F> Widget for F
where
    F: Fn(&PropMap, &RenderCallback) -> MountResult,
{
    fn mount(&self, props: &PropMap, render: &RenderCallback) -> MountResult {
        self(props, render)
    }
}

/// A widget without mount behavior
#[derive(Debug, Clone, Copy, Default)]
pub struct Inert;

impl Widget for Inert {}

/// Replaces the inner content of the element it is bound to.
///
/// Callable any number of times, also after the widget's mount returned and
/// after the element left the document.
#[derive(Clone)]
pub struct RenderCallback {
    element: ElementRef,
}

impl RenderCallback {
    pub fn new(element: ElementRef) -> Self {
        RenderCallback { element }
    }

    /// Replace the element's inner content with `markup`, verbatim
    pub fn render(&self, markup: impl Into<String>) {
        self.element.set_inner_html(markup);
    }

    /// Attach a timer or listener handle to the element so that
    /// [`ElementRef::teardown`] can cancel it
    pub fn retain(&self, subscription: Subscription) {
        self.element.retain(subscription);
    }

    pub fn element(&self) -> &ElementRef {
        &self.element
    }
}

impl fmt::Debug for RenderCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RenderCallback").field(&self.element).finish()
    }
}

/// The generic lifecycle adapter around one widget.
pub struct Component<W: Widget + ?Sized = dyn Widget> {
    element: WeakElement,
    props: PropMap,
    widget: Rc<W>,
}

impl<W: Widget + ?Sized> Component<W> {
    /// Compute props from the element's current attributes.
    ///
    /// Fails when an attribute holds malformed JSON; the element then never
    /// initializes.
    pub fn new(element: &ElementRef, widget: Rc<W>) -> Result<Self> {
        let props = PropMap::from_attributes(&element.attributes())?;
        Ok(Component {
            element: element.downgrade(),
            props,
            widget,
        })
    }

    pub fn props(&self) -> &PropMap {
        &self.props
    }

    /// Run the widget and render what it returns
    pub fn mount(&self) -> Result<()> {
        let Some(element) = self.element.upgrade() else {
            return Ok(());
        };
        log::debug!("[elements] mounting <{}> #{}", element.tag(), element.id());

        let render = RenderCallback::new(element);
        if let Some(markup) = self.widget.mount(&self.props, &render)? {
            render.render(markup);
        }
        Ok(())
    }
}

impl<W: Widget + ?Sized> Lifecycle for Component<W> {
    fn connected(&mut self) -> Result<()> {
        self.mount()
    }
}
