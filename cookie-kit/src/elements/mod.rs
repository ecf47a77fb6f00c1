//! Function components as custom elements
//!
//! A widget is a plain function from typed props to markup. This module turns
//! such functions into custom elements: attributes are coerced into a
//! [`PropMap`], the widget is wrapped in the element lifecycle, and a
//! [`RenderCallback`] lets it update its own content later on.
//!
//! # Architecture
//!
//! ```text
//!   markup / create_element
//!            ↓
//!   Document ──lookup──> ElementRegistry
//!            ↓                 ↓
//!       ElementRef <── ElementConstructor
//!            ↓
//!   Component<W> (PropMap computed once)
//!            ↓ insert
//!   W::mount(props, render) ──> inner markup
//!            ↓
//!   EventLoop timers / map events ──> render(...) again
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use cookie_kit::elements::*;
//!
//! let registry = ElementRegistry::new();
//! register_components(&registry, [("hello-world", Rc::new(hello) as Rc<dyn Widget>)])?;
//!
//! let document = Document::new(registry);
//! document.parse(r#"<hello-world name="Earth"></hello-world>"#);
//! ```

mod component;
mod document;
mod element;
mod error;
mod event_loop;
mod markup;
mod props;
mod registry;
mod subscription;
mod value;

pub use component::*;
pub use document::*;
pub use element::*;
pub use error::*;
pub use event_loop::*;
pub use markup::*;
pub use props::*;
pub use registry::*;
pub use subscription::*;
pub use value::*;
