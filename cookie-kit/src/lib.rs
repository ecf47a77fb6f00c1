//! # Description
//!
//! Cookie Kit turns plain widget functions into custom elements. A widget maps
//! typed props, coerced from the element's string attributes, to markup; the
//! kit wraps it in the custom element lifecycle and hands it a render callback
//! for later updates.
//!
//! # Features
//!
//! - Attribute coercion into a typed, ordered [`PropMap`](elements::PropMap).
//! - A lifecycle adapter that mounts a widget on every insertion.
//! - A write-once element registry; re-registering a tag is a no-op.
//! - A headless document, event loop and map library for hosts without a browser.
//! - Example, timer and spinning globe widgets.

pub mod elements;
pub mod map;
pub mod widgets;

pub mod prelude;
