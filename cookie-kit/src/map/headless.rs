//! Headless map library
//!
//! Keeps map state in memory and drives it through the event loop: a new map
//! emits `style.load` and `load` on the next tick, and `ease_to` completes
//! after its duration with a `moveend`. Interaction events are emitted by the
//! host with [`HeadlessMap::emit`].

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;

use indexmap::IndexMap;

use super::{
    Fog, LngLat, MapError, MapEvent, MapEventHandler, MapLibrary, MapOptions, MapView, Marker,
    StyleLayer,
};
use crate::elements::{EventLoop, Subscription};

/// A [`MapLibrary`] without a renderer.
///
/// The library keeps every map it created, keyed by container id, the way
/// a real library keeps maps alive while their container exists.
pub struct HeadlessMapLibrary {
    event_loop: EventLoop,
    style_layers: Vec<StyleLayer>,
    maps: RefCell<IndexMap<String, Rc<HeadlessMap>>>,
}

impl HeadlessMapLibrary {
    pub fn new(event_loop: EventLoop) -> Self {
        HeadlessMapLibrary {
            event_loop,
            style_layers: Vec::new(),
            maps: RefCell::new(IndexMap::new()),
        }
    }

    /// Layers every created map's style starts with
    pub fn with_style_layers(mut self, layers: Vec<StyleLayer>) -> Self {
        self.style_layers = layers;
        self
    }

    /// The map rendered into the given container
    pub fn map(&self, container: &str) -> Option<Rc<HeadlessMap>> {
        self.maps.borrow().get(container).cloned()
    }

    /// All maps, in creation order
    pub fn maps(&self) -> Vec<Rc<HeadlessMap>> {
        self.maps.borrow().values().cloned().collect()
    }
}

impl MapLibrary for HeadlessMapLibrary {
    fn create_map(&self, options: MapOptions) -> Result<Rc<dyn MapView>, MapError> {
        if options.access_token.as_deref().is_none_or(str::is_empty) {
            return Err(MapError::MissingAccessToken);
        }

        let container = options.container.clone();
        let map = HeadlessMap::new(options, self.style_layers.clone(), self.event_loop.clone());

        let loading = Rc::downgrade(&map);
        self.event_loop.set_timeout(Duration::ZERO, move || {
            if let Some(map) = loading.upgrade() {
                map.emit(MapEvent::StyleLoad);
                map.emit(MapEvent::Load);
            }
        });

        log::debug!("[map] created map in #{}", container);
        self.maps.borrow_mut().insert(container, map.clone());
        Ok(map)
    }
}

struct Listener {
    event: MapEvent,
    handler: MapEventHandler,
    subscription: Subscription,
}

/// In-memory map state
pub struct HeadlessMap {
    this: Weak<HeadlessMap>,
    options: MapOptions,
    event_loop: EventLoop,
    center: Cell<LngLat>,
    zoom: Cell<f64>,
    fog: RefCell<Option<Fog>>,
    markers: RefCell<Vec<Marker>>,
    navigation_controls: Cell<u32>,
    layers: RefCell<Vec<StyleLayer>>,
    listeners: RefCell<Vec<Listener>>,
    easing: RefCell<Option<Subscription>>,
}

impl HeadlessMap {
    fn new(options: MapOptions, layers: Vec<StyleLayer>, event_loop: EventLoop) -> Rc<Self> {
        Rc::new_cyclic(|this| HeadlessMap {
            this: this.clone(),
            center: Cell::new(options.center),
            zoom: Cell::new(options.zoom),
            options,
            event_loop,
            fog: RefCell::new(None),
            markers: RefCell::new(Vec::new()),
            navigation_controls: Cell::new(0),
            layers: RefCell::new(layers),
            listeners: RefCell::new(Vec::new()),
            easing: RefCell::new(None),
        })
    }

    /// Options the map was created with
    pub fn options(&self) -> &MapOptions {
        &self.options
    }

    /// Fire every live listener for `event`. Returns how many ran.
    pub fn emit(&self, event: MapEvent) -> usize {
        let handlers: Vec<MapEventHandler> = self
            .listeners
            .borrow()
            .iter()
            .filter(|l| l.event == event && !l.subscription.is_cancelled())
            .map(|l| l.handler.clone())
            .collect();

        for handler in &handlers {
            handler();
        }
        handlers.len()
    }

    /// Number of live listeners for `event`
    pub fn listener_count(&self, event: MapEvent) -> usize {
        self.listeners
            .borrow()
            .iter()
            .filter(|l| l.event == event && !l.subscription.is_cancelled())
            .count()
    }

    pub fn markers(&self) -> Vec<Marker> {
        self.markers.borrow().clone()
    }

    pub fn navigation_controls(&self) -> u32 {
        self.navigation_controls.get()
    }

    pub fn fog(&self) -> Option<Fog> {
        self.fog.borrow().clone()
    }

    /// Check if a camera animation is in flight
    pub fn is_easing(&self) -> bool {
        self.easing
            .borrow()
            .as_ref()
            .is_some_and(|s| !s.is_cancelled())
    }

    /// Move the camera without animation, as a user zoom would
    pub fn set_zoom(&self, zoom: f64) {
        self.zoom.set(zoom);
    }

    /// Move the camera without animation
    pub fn jump_to(&self, center: LngLat) {
        self.center.set(center);
    }
}

impl MapView for HeadlessMap {
    fn container(&self) -> &str {
        &self.options.container
    }

    fn add_marker(&self, marker: Marker) {
        self.markers.borrow_mut().push(marker);
    }

    fn add_navigation_control(&self) {
        self.navigation_controls.set(self.navigation_controls.get() + 1);
    }

    fn center(&self) -> LngLat {
        self.center.get()
    }

    fn zoom(&self) -> f64 {
        self.zoom.get()
    }

    fn set_fog(&self, fog: Fog) {
        *self.fog.borrow_mut() = Some(fog);
    }

    fn ease_to(&self, center: LngLat, duration: Duration) {
        // A new animation replaces the one in flight.
        if let Some(previous) = self.easing.borrow_mut().take() {
            previous.cancel();
        }

        let this = self.this.clone();
        let subscription = self.event_loop.set_timeout(duration, move || {
            if let Some(map) = this.upgrade() {
                map.center.set(center);
                map.easing.borrow_mut().take();
                map.emit(MapEvent::MoveEnd);
            }
        });
        *self.easing.borrow_mut() = Some(subscription);
    }

    fn on(&self, event: MapEvent, handler: MapEventHandler) -> Subscription {
        let subscription = Subscription::new();
        self.listeners.borrow_mut().push(Listener {
            event,
            handler,
            subscription: subscription.clone(),
        });
        subscription
    }

    fn style_layers(&self) -> Vec<StyleLayer> {
        self.layers.borrow().clone()
    }

    fn remove_layer(&self, id: &str) -> Result<(), MapError> {
        let mut layers = self.layers.borrow_mut();
        match layers.iter().position(|l| l.id == id) {
            Some(index) => {
                layers.remove(index);
                Ok(())
            }
            None => Err(MapError::UnknownLayer(id.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn options(token: Option<&str>) -> MapOptions {
        MapOptions {
            container: "map".to_string(),
            style: Url::parse("mapbox://styles/mapbox/streets-v12").unwrap(),
            center: LngLat::new(0.0, 0.0),
            zoom: 2.0,
            projection: Default::default(),
            access_token: token.map(str::to_string),
        }
    }

    #[test]
    fn test_requires_access_token() {
        let library = HeadlessMapLibrary::new(EventLoop::new());
        assert!(matches!(library.create_map(options(None)), Err(MapError::MissingAccessToken)));
        assert!(matches!(library.create_map(options(Some(""))), Err(MapError::MissingAccessToken)));
        assert!(library.maps().is_empty());
    }

    #[test]
    fn test_load_events_fire_on_next_tick() {
        let event_loop = EventLoop::new();
        let library = HeadlessMapLibrary::new(event_loop.clone());
        let map = library.create_map(options(Some("pk.test"))).unwrap();

        let order = Rc::new(RefCell::new(Vec::new()));
        for event in [MapEvent::Load, MapEvent::StyleLoad] {
            let order = order.clone();
            map.on(event, Rc::new(move || order.borrow_mut().push(event)));
        }
        assert!(order.borrow().is_empty());

        event_loop.advance(Duration::ZERO);
        assert_eq!(*order.borrow(), vec![MapEvent::StyleLoad, MapEvent::Load]);
    }

    #[test]
    fn test_ease_to_completes_with_moveend() {
        let event_loop = EventLoop::new();
        let library = HeadlessMapLibrary::new(event_loop.clone());
        library.create_map(options(Some("pk.test"))).unwrap();
        let map = library.map("map").unwrap();

        let moves = Rc::new(Cell::new(0));
        let counter = moves.clone();
        map.on(MapEvent::MoveEnd, Rc::new(move || counter.set(counter.get() + 1)));

        map.ease_to(LngLat::new(-10.0, 5.0), Duration::from_secs(1));
        assert!(map.is_easing());
        event_loop.advance(Duration::from_millis(999));
        assert_eq!(map.center(), LngLat::new(0.0, 0.0));

        event_loop.advance(Duration::from_millis(1));
        assert_eq!(map.center(), LngLat::new(-10.0, 5.0));
        assert_eq!(moves.get(), 1);
        assert!(!map.is_easing());
    }

    #[test]
    fn test_new_ease_replaces_previous() {
        let event_loop = EventLoop::new();
        let library = HeadlessMapLibrary::new(event_loop.clone());
        library.create_map(options(Some("pk.test"))).unwrap();
        let map = library.map("map").unwrap();

        map.ease_to(LngLat::new(1.0, 1.0), Duration::from_secs(1));
        map.ease_to(LngLat::new(2.0, 2.0), Duration::from_secs(1));
        event_loop.advance(Duration::from_secs(2));

        assert_eq!(map.center(), LngLat::new(2.0, 2.0));
    }

    #[test]
    fn test_cancelled_listener_is_skipped() {
        let library = HeadlessMapLibrary::new(EventLoop::new());
        library.create_map(options(Some("pk.test"))).unwrap();
        let map = library.map("map").unwrap();

        let subscription = map.on(MapEvent::MouseDown, Rc::new(|| {}));
        assert_eq!(map.emit(MapEvent::MouseDown), 1);
        subscription.cancel();
        assert_eq!(map.emit(MapEvent::MouseDown), 0);
        assert_eq!(map.listener_count(MapEvent::MouseDown), 0);
    }

    #[test]
    fn test_remove_layer() {
        let library = HeadlessMapLibrary::new(EventLoop::new())
            .with_style_layers(vec![StyleLayer::new("water", "fill")]);
        library.create_map(options(Some("pk.test"))).unwrap();
        let map = library.map("map").unwrap();

        map.remove_layer("water").unwrap();
        assert!(map.style_layers().is_empty());
        assert!(matches!(map.remove_layer("water"), Err(MapError::UnknownLayer(_))));
    }
}
