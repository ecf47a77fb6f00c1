//! Map widget
//!
//! Renders a container and drives a spinning globe inside it. The globe
//! slowly turns west while nobody touches it, pauses while the user
//! interacts, and stops turning once zoomed in past [`MAX_SPIN_ZOOM`].

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::elements::{
    ElementError, MountResult, PropMap, PropValue, RenderCallback, Result, Subscription, Widget,
};
use crate::map::{
    Fog, LngLat, MapEvent, MapLibrary, MapOptions, MapView, Marker, MarkerIcon, Projection,
};

/// Above this zoom the globe does not turn
pub const MAX_SPIN_ZOOM: f64 = 5.0;
/// Between this zoom and [`MAX_SPIN_ZOOM`] the globe turns slower
pub const SLOW_SPIN_ZOOM: f64 = 3.0;
pub const SECONDS_PER_REVOLUTION: f64 = 300.0;

const SPIN_STEP: Duration = Duration::from_secs(1);

pub const DEFAULT_CONTAINER_ID: &str = "mapbox-container";
pub const DEFAULT_STYLE: &str = "mapbox://styles/mapbox/streets-v12";
pub const DEFAULT_ZOOM: f64 = 5.0;

const GREETING_POPUP: &str = r#"
        <div class="text-black">
          <span>Hey! 👋 What's up?</span>
        </div>"#;

/// One entry of the `markers` prop
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerFeature {
    pub coordinates: [f64; 2],
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub icon_size: Option<[u32; 2]>,
}

impl MarkerFeature {
    fn to_marker(&self) -> Marker {
        let mut marker = Marker::new(self.coordinates.into());
        if let Some([width, height]) = self.icon_size {
            marker = marker.with_icon(MarkerIcon {
                class_name: "marker".to_string(),
                background_image: format!("url(https://placekitten.com/g/{width}/{height}/)"),
                width,
                height,
            });
        }
        if let Some(message) = &self.message {
            marker = marker.with_popup(message.clone());
        }
        marker
    }
}

/// The map widget's props, with defaults applied
#[derive(Debug, Clone, PartialEq)]
pub struct MapboxProps {
    pub id: String,
    pub access_token: Option<String>,
    pub map_style: String,
    pub center: LngLat,
    pub zoom: f64,
    pub controls: bool,
    pub spin: bool,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub markers: Vec<MarkerFeature>,
}

impl MapboxProps {
    /// Read the widget's props, failing on a prop of the wrong shape.
    pub fn from_props(props: &PropMap) -> Result<Self> {
        let center: Option<[f64; 2]> = props.deserialize("center", "a [lng, lat] pair")?;
        let markers: Option<Vec<MarkerFeature>> =
            props.deserialize("markers", "an array of marker features")?;

        Ok(MapboxProps {
            id: text(props, "id")?.unwrap_or_else(|| DEFAULT_CONTAINER_ID.to_string()),
            access_token: text(props, "accessToken")?,
            map_style: text(props, "mapStyle")?.unwrap_or_else(|| DEFAULT_STYLE.to_string()),
            center: center.map(LngLat::from).unwrap_or_default(),
            zoom: number(props, "zoom")?.unwrap_or(DEFAULT_ZOOM),
            controls: flag(props, "controls")?.unwrap_or(false),
            spin: flag(props, "spin")?.unwrap_or(true),
            lat: number(props, "lat")?,
            lng: number(props, "lng")?,
            markers: markers.unwrap_or_default(),
        })
    }
}

/// Look a prop up by its camelCase key, or by the all-lowercase key an HTML
/// parser leaves behind for `accessToken="..."`.
fn lookup<'a>(props: &'a PropMap, key: &str) -> Option<&'a PropValue> {
    props
        .get(key)
        .or_else(|| props.get(&key.to_ascii_lowercase()))
}

fn text(props: &PropMap, key: &str) -> Result<Option<String>> {
    match lookup(props, key) {
        None => Ok(None),
        Some(PropValue::String(s)) => Ok(Some(s.clone())),
        // Ids and tokens may look numeric.
        Some(value @ PropValue::Number(_)) => Ok(Some(value.to_string())),
        Some(_) => Err(ElementError::invalid_prop(key, "a string")),
    }
}

fn number(props: &PropMap, key: &str) -> Result<Option<f64>> {
    match lookup(props, key) {
        None => Ok(None),
        Some(value) => value
            .as_number()
            .map(Some)
            .ok_or_else(|| ElementError::invalid_prop(key, "a number")),
    }
}

fn flag(props: &PropMap, key: &str) -> Result<Option<bool>> {
    match lookup(props, key) {
        None => Ok(None),
        Some(value) => value
            .as_bool()
            .map(Some)
            .ok_or_else(|| ElementError::invalid_prop(key, "a boolean")),
    }
}

/// Spin state shared by a map's event handlers
#[derive(Debug)]
struct Spinner {
    enabled: bool,
    interacting: Cell<bool>,
}

impl Spinner {
    /// Ease the globe one step west, unless paused or zoomed in.
    ///
    /// The step ends in a `moveend`, which calls this again.
    fn spin(&self, map: &dyn MapView) {
        let zoom = map.zoom();
        if !self.enabled || self.interacting.get() || zoom >= MAX_SPIN_ZOOM {
            return;
        }

        let mut distance = 360.0 / SECONDS_PER_REVOLUTION;
        if zoom > SLOW_SPIN_ZOOM {
            distance *= (MAX_SPIN_ZOOM - zoom) / (MAX_SPIN_ZOOM - SLOW_SPIN_ZOOM);
        }

        let mut center = map.center();
        center.lng -= distance;
        map.ease_to(center, SPIN_STEP);
    }

    fn resume(&self, map: &dyn MapView) {
        self.interacting.set(false);
        self.spin(map);
    }
}

/// Listen for `event` without the handler keeping the map alive
fn listen<F>(
    map: &Rc<dyn MapView>,
    spinner: &Rc<Spinner>,
    event: MapEvent,
    handler: F,
) -> Subscription
where
    F: Fn(&dyn MapView, &Spinner) + 'static,
{
    let weak = Rc::downgrade(map);
    let spinner = spinner.clone();
    map.on(
        event,
        Rc::new(move || {
            if let Some(map) = weak.upgrade() {
                handler(map.as_ref(), &spinner);
            }
        }),
    )
}

/// Drop text label layers from the loaded style
fn remove_labels(map: &dyn MapView) {
    for layer in map.style_layers() {
        if layer.is_text_label() {
            if let Err(e) = map.remove_layer(&layer.id) {
                log::warn!("[map] could not remove label layer: {}", e);
            }
        }
    }
}

/// The map widget, bound to the library that renders its maps.
#[derive(Clone)]
pub struct MapboxComponent {
    library: Rc<dyn MapLibrary>,
}

impl MapboxComponent {
    pub fn new(library: Rc<dyn MapLibrary>) -> Self {
        MapboxComponent { library }
    }
}

impl Widget for MapboxComponent {
    fn mount(&self, props: &PropMap, render: &RenderCallback) -> MountResult {
        let props = MapboxProps::from_props(props)?;

        render.render(format!(
            r#"<div id="{}" class="h-full w-full animate-fade-in"></div>"#,
            props.id
        ));

        let map = self.library.create_map(MapOptions {
            container: props.id.clone(),
            style: Url::parse(&props.map_style).map_err(crate::map::MapError::from)?,
            center: props.center,
            zoom: props.zoom,
            projection: Projection::Globe,
            access_token: props.access_token.clone(),
        })?;

        for feature in &props.markers {
            map.add_marker(feature.to_marker());
        }

        let spinner = Rc::new(Spinner {
            enabled: props.spin,
            interacting: Cell::new(false),
        });

        let mut subscriptions = vec![
            listen(&map, &spinner, MapEvent::StyleLoad, |map, _| map.set_fog(Fog::default())),
            listen(&map, &spinner, MapEvent::Load, |map, _| remove_labels(map)),
            listen(&map, &spinner, MapEvent::MouseDown, |_, spinner| spinner.interacting.set(true)),
        ];
        // Drag, pitch and rotate may end off the map, where no mouseup fires.
        let interaction_ends = [
            MapEvent::MouseUp,
            MapEvent::DragEnd,
            MapEvent::PitchEnd,
            MapEvent::RotateEnd,
        ];
        for event in interaction_ends {
            subscriptions.push(listen(&map, &spinner, event, |map, spinner| spinner.resume(map)));
        }
        subscriptions.push(listen(&map, &spinner, MapEvent::MoveEnd, |map, spinner| {
            spinner.spin(map)
        }));

        if props.controls {
            map.add_navigation_control();
        }

        if let (Some(lat), Some(lng)) = (props.lat, props.lng) {
            map.add_marker(Marker::new(LngLat::new(lng, lat)).with_popup(GREETING_POPUP));
        }

        spinner.spin(map.as_ref());

        for subscription in subscriptions {
            render.retain(subscription);
        }
        log::info!("[map] mounted map in #{}", props.id);

        Ok(None)
    }
}
