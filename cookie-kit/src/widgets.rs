//! Widgets provided by this crate, ready to be registered as custom elements.
//!
//! Note: The timer and map widgets need the host's event loop and map library,
//! so they are built through [`standard`] rather than used as bare functions.

use std::rc::Rc;

use crate::elements::{EventLoop, Widget};
use crate::map::MapLibrary;

mod example;
mod mapbox;
mod timer;

pub use example::example_component;
pub use mapbox::{
    DEFAULT_CONTAINER_ID, DEFAULT_STYLE, DEFAULT_ZOOM, MAX_SPIN_ZOOM, MapboxComponent, MapboxProps,
    MarkerFeature, SECONDS_PER_REVOLUTION, SLOW_SPIN_ZOOM,
};
pub use timer::{ExampleTimer, TIME_FORMAT};

pub const MAPBOX_COMPONENT: &str = "mapbox-component";
pub const EXAMPLE_COMPONENT: &str = "example-component";
pub const EXAMPLE_TIMER: &str = "example-timer";

/// The standard widget catalog under its tag names.
///
/// Pass the result to [`register_components`](crate::elements::register_components).
pub fn standard(
    event_loop: &EventLoop,
    map_library: Rc<dyn MapLibrary>,
) -> Vec<(&'static str, Rc<dyn Widget>)> {
    let mapbox: Rc<dyn Widget> = Rc::new(MapboxComponent::new(map_library));
    let example: Rc<dyn Widget> = Rc::new(example_component);
    let timer: Rc<dyn Widget> = Rc::new(ExampleTimer::new(event_loop.clone()));

    vec![
        (MAPBOX_COMPONENT, mapbox),
        (EXAMPLE_COMPONENT, example),
        (EXAMPLE_TIMER, timer),
    ]
}
