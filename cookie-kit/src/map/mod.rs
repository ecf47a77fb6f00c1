//! Map library boundary
//!
//! The capabilities the map widget needs from a map rendering library. The
//! library itself is opaque; widgets only create maps, add markers and
//! controls, move the camera and listen for named events.
//!
//! [`HeadlessMapLibrary`] implements the boundary on top of the
//! [`EventLoop`](crate::elements::EventLoop) for hosts without a renderer and
//! for tests.

mod headless;

pub use headless::*;

use std::rc::Rc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use url::Url;

use crate::elements::Subscription;

/// Map library errors
#[derive(Error, Debug)]
pub enum MapError {
    /// Maps cannot be created without an access token
    #[error("an access token is required to create a map")]
    MissingAccessToken,

    /// The style URL does not parse
    #[error("invalid map style URL: {0}")]
    InvalidStyle(#[from] url::ParseError),

    /// No style layer with this id
    #[error("style has no layer `{0}`")]
    UnknownLayer(String),
}

/// A geographic position, longitude first
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub fn new(lng: f64, lat: f64) -> Self {
        LngLat { lng, lat }
    }
}

impl From<[f64; 2]> for LngLat {
    fn from([lng, lat]: [f64; 2]) -> Self {
        LngLat { lng, lat }
    }
}

/// How the map is projected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Projection {
    #[default]
    Mercator,
    Globe,
}

/// Options a map view is created with
#[derive(Debug, Clone)]
pub struct MapOptions {
    /// Id of the element the map renders into
    pub container: String,
    pub style: Url,
    pub center: LngLat,
    pub zoom: f64,
    pub projection: Projection,
    pub access_token: Option<String>,
}

/// HTML shown when a marker is clicked
#[derive(Debug, Clone, PartialEq)]
pub struct Popup {
    pub html: String,
}

/// A custom marker element instead of the library's default pin
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerIcon {
    pub class_name: String,
    pub background_image: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub lng_lat: LngLat,
    pub popup: Option<Popup>,
    pub icon: Option<MarkerIcon>,
}

impl Marker {
    pub fn new(lng_lat: LngLat) -> Self {
        Marker {
            lng_lat,
            popup: None,
            icon: None,
        }
    }

    pub fn with_popup(mut self, html: impl Into<String>) -> Self {
        self.popup = Some(Popup { html: html.into() });
        self
    }

    pub fn with_icon(mut self, icon: MarkerIcon) -> Self {
        self.icon = Some(icon);
        self
    }
}

/// Atmosphere settings. The default is the library's default atmosphere.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Fog {
    pub color: Option<String>,
    pub horizon_blend: Option<f64>,
}

/// Named map events widgets can listen for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapEvent {
    Load,
    StyleLoad,
    MouseDown,
    MouseUp,
    DragEnd,
    PitchEnd,
    RotateEnd,
    MoveEnd,
}

impl MapEvent {
    /// The library's event name
    pub fn name(&self) -> &'static str {
        match self {
            MapEvent::Load => "load",
            MapEvent::StyleLoad => "style.load",
            MapEvent::MouseDown => "mousedown",
            MapEvent::MouseUp => "mouseup",
            MapEvent::DragEnd => "dragend",
            MapEvent::PitchEnd => "pitchend",
            MapEvent::RotateEnd => "rotateend",
            MapEvent::MoveEnd => "moveend",
        }
    }

    /// Parse from the library's event name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|e| e.name() == name)
    }

    pub fn all() -> &'static [MapEvent] {
        &[
            MapEvent::Load,
            MapEvent::StyleLoad,
            MapEvent::MouseDown,
            MapEvent::MouseUp,
            MapEvent::DragEnd,
            MapEvent::PitchEnd,
            MapEvent::RotateEnd,
            MapEvent::MoveEnd,
        ]
    }
}

/// A layer of the loaded style, as the style document describes it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleLayer {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub layout: Map<String, Value>,
}

impl StyleLayer {
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        StyleLayer {
            id: id.into(),
            kind: kind.into(),
            layout: Map::new(),
        }
    }

    pub fn with_layout(mut self, key: impl Into<String>, value: Value) -> Self {
        self.layout.insert(key.into(), value);
        self
    }

    /// Check if this is a symbol layer drawing text labels
    pub fn is_text_label(&self) -> bool {
        self.kind == "symbol" && self.layout.get("text-field").is_some_and(is_truthy)
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Callback for a map event
pub type MapEventHandler = Rc<dyn Fn()>;

/// A map rendered into a container element
pub trait MapView {
    /// Id of the container element
    fn container(&self) -> &str;

    fn add_marker(&self, marker: Marker);

    fn add_navigation_control(&self);

    fn center(&self) -> LngLat;

    fn zoom(&self) -> f64;

    fn set_fog(&self, fog: Fog);

    /// Animate the camera to `center` linearly over `duration`; emits
    /// [`MapEvent::MoveEnd`] when done
    fn ease_to(&self, center: LngLat, duration: Duration);

    /// Listen for an event until the returned subscription is cancelled
    fn on(&self, event: MapEvent, handler: MapEventHandler) -> Subscription;

    /// Layers of the currently loaded style
    fn style_layers(&self) -> Vec<StyleLayer>;

    fn remove_layer(&self, id: &str) -> Result<(), MapError>;
}

/// Creates map views.
///
/// Event handlers only hold weak references to their map, so the library
/// keeps every map it creates alive, as a page keeps a map alive while its
/// container exists.
pub trait MapLibrary {
    fn create_map(&self, options: MapOptions) -> Result<Rc<dyn MapView>, MapError>;
}
