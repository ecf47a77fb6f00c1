//! Everything a host needs to register widgets and render a page.

pub use crate::elements::{
    Document, ElementError, ElementRef, ElementRegistry, ElementState, EventLoop, MountResult,
    PropMap, PropValue, RenderCallback, Subscription, Widget, register_components,
};
pub use crate::map::{HeadlessMapLibrary, MapLibrary, MapView};
pub use crate::widgets;
