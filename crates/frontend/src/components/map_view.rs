use dioxus::html::geometry::WheelDelta;
use dioxus::html::input_data::MouseButton;
use dioxus::prelude::*;
use popmap_shared::geo;
use popmap_shared::models::{Basemap, Viewpoint, MAX_ZOOM};
use popmap_shared::popup::{coordinates_popup, Popup};
use popmap_shared::visibility::AnnotationLayer;

use crate::api::PointOfInterestData;
use crate::coords;

const MAP_CONTAINER_ID: &str = "popmap-view";

/// Drag threshold in pixels; movement below this is treated as a click.
const DRAG_THRESHOLD: f64 = 3.0;

const ZOOM_MIN: f64 = 2.0;
/// Zoom levels per wheel notch.
const ZOOM_STEP: f64 = 0.25;

fn container_rect() -> Option<web_sys::DomRect> {
    let document = web_sys::window()?.document()?;
    let element = document.get_element_by_id(MAP_CONTAINER_ID)?;
    Some(element.get_bounding_client_rect())
}

/// Convert a wheel delta (pixels / lines / pages) to a uniform pixel-like value.
fn wheel_delta_y(delta: WheelDelta) -> f64 {
    match delta {
        WheelDelta::Pixels(d) => d.y,
        WheelDelta::Lines(d) => d.y * 40.0,
        WheelDelta::Pages(d) => d.y * 400.0,
    }
}

/// Zoom after one wheel notch. Scrolling up zooms in.
fn wheel_zoom(zoom: f64, delta_y: f64) -> f64 {
    let step = if delta_y < 0.0 { ZOOM_STEP } else { -ZOOM_STEP };
    (zoom + step).clamp(ZOOM_MIN, MAX_ZOOM)
}

/// Scale readout like `1:36,112`.
fn format_scale(scale: f64) -> String {
    let digits = format!("{:.0}", scale.max(0.0));
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("1:{}", grouped)
}

/// Absolute position centering a `width` x `height` marker on `point`.
fn marker_style(view: Viewpoint, point: geo::LatLng, width: u32, height: u32) -> String {
    let (dx, dy) = geo::lat_lng_to_screen(view.center, view.zoom, point);
    format!(
        "left: calc(50% + {:.1}px); top: calc(50% + {:.1}px); width: {}px; height: {}px; margin-left: -{}px; margin-top: -{}px;",
        dx,
        dy,
        width,
        height,
        width / 2,
        height / 2
    )
}

#[component]
pub fn MapView(
    basemap: Basemap,
    poi: PointOfInterestData,
    view: Signal<Viewpoint>,
    annotations: ReadSignal<AnnotationLayer>,
    popup: Signal<Option<Popup>>,
) -> Element {
    let mut is_dragging = use_signal(|| false);
    let mut did_drag = use_signal(|| false);
    let mut drag_start = use_signal(|| (0.0_f64, 0.0_f64));
    let mut drag_start_view = use_signal(|| *view.peek());

    let current = *view.read();
    let readout = format!(
        "{} | {}",
        format_scale(current.scale()),
        geo::format_coordinates(current.center)
    );
    let poi_shown = annotations.read().contains(&poi.id);
    let poi_popup = poi.popup.clone();
    let marker_css = marker_style(current, poi.location, poi.picture_width, poi.picture_height);

    rsx! {
        div {
            id: MAP_CONTAINER_ID,
            class: "map-view basemap-{basemap}",

            onwheel: move |evt: Event<WheelData>| {
                evt.prevent_default();
                let old = *view.read();
                let new_zoom = wheel_zoom(old.zoom, wheel_delta_y(evt.data().delta()));
                if (new_zoom - old.zoom).abs() < 1e-9 {
                    return;
                }

                let Some(rect) = container_rect() else { return };
                let client = evt.data().client_coordinates();
                let (x, y) = coords::client_to_container(client.x, client.y, rect.left(), rect.top());
                let offset = coords::container_to_center_offset(x, y, rect.width(), rect.height());

                view.set(Viewpoint {
                    center: coords::zoom_center_at_cursor(old.center, old.zoom, new_zoom, offset),
                    zoom: new_zoom,
                });
            },

            onmousedown: move |evt: Event<MouseData>| {
                if evt.trigger_button() != Some(MouseButton::Primary) {
                    return;
                }
                let client = evt.client_coordinates();
                is_dragging.set(true);
                did_drag.set(false);
                drag_start.set((client.x, client.y));
                drag_start_view.set(*view.read());
            },

            onmousemove: move |evt: Event<MouseData>| {
                if !*is_dragging.read() {
                    return;
                }
                let client = evt.client_coordinates();
                let (sx, sy) = *drag_start.read();
                let dx = client.x - sx;
                let dy = client.y - sy;

                if !*did_drag.read() && (dx.abs() > DRAG_THRESHOLD || dy.abs() > DRAG_THRESHOLD) {
                    did_drag.set(true);
                }
                if *did_drag.read() {
                    let start = *drag_start_view.read();
                    view.set(Viewpoint {
                        center: coords::pan_center(start.center, start.zoom, dx, dy),
                        zoom: start.zoom,
                    });
                }
            },

            onmouseup: move |evt: Event<MouseData>| {
                let was_dragging = *is_dragging.read();
                let was_drag = *did_drag.read();
                is_dragging.set(false);

                // A mouseup without drag movement is a click
                if was_dragging && !was_drag {
                    let client = evt.client_coordinates();
                    let current = *view.read();
                    if let Some(at) = coords::click_to_lat_lng(
                        client.x, client.y, MAP_CONTAINER_ID, current.center, current.zoom,
                    ) {
                        popup.set(Some(coordinates_popup(at)));
                    }
                }
            },

            onmouseleave: move |_| is_dragging.set(false),

            if poi_shown {
                img {
                    class: "poi-marker",
                    src: "{poi.picture_url}",
                    alt: "{poi.name}",
                    style: "{marker_css}",
                    onmousedown: move |evt: Event<MouseData>| evt.stop_propagation(),
                    onclick: move |evt: Event<MouseData>| {
                        evt.stop_propagation();
                        popup.set(Some(poi_popup.clone()));
                    },
                }
            }

            div { class: "map-readout", "{readout}" }
        }
    }
}
