use dioxus::prelude::*;
use gloo_timers::future::TimeoutFuture;
use popmap_shared::models::{NavigationPreset, NavigationTrigger, UiPosition, Widget};
use popmap_shared::popup::Popup;
use popmap_shared::visibility::{AnnotationLayer, ProximityVisibility};

use crate::api::{self, LegendEntryData, MapConfigData};
use crate::components::legend::Legend;
use crate::components::map_view::MapView;
use crate::components::nav_bar::NavBar;
use crate::components::popup_panel::PopupPanel;
use crate::coords;

const FRAME_MS: u32 = 16;

/// Corners that can hold widgets. The bottom-center slot belongs to the popup dock.
const WIDGET_CORNERS: [UiPosition; 4] = [
    UiPosition::TopLeft,
    UiPosition::TopRight,
    UiPosition::BottomLeft,
    UiPosition::BottomRight,
];

/// Animation frames for a flight of `duration_ms`; always at least one.
fn flight_frames(duration_ms: u32) -> u32 {
    (duration_ms / FRAME_MS).max(1)
}

#[component]
pub fn MapPage() -> Element {
    let config_resource = use_resource(|| api::fetch_map_config());
    let legend_resource = use_resource(|| api::fetch_legend());

    // A failed legend fetch leaves the widget empty rather than blocking the map
    let legend: Vec<LegendEntryData> = match &*legend_resource.read() {
        Some(Ok(entries)) => entries.clone(),
        _ => vec![],
    };

    let config = config_resource.read().clone();
    match config {
        Some(Ok(config)) => rsx! {
            MapScreen { config, legend }
        },
        Some(Err(e)) => rsx! {
            div { class: "load-error", "Failed to load map configuration: {e}" }
        },
        None => rsx! {
            div { class: "loading", "Loading map..." }
        },
    }
}

#[component]
fn MapScreen(config: MapConfigData, legend: Vec<LegendEntryData>) -> Element {
    let initial_view = config.initial_view;
    let initial_basemap = config.basemap_toggle();
    let poi_id = config.point_of_interest.id.clone();
    let thresholds = config.thresholds().unwrap_or_default();
    let navigation = config.navigation.clone();

    let mut view = use_signal(|| initial_view);
    let mut basemap = use_signal(|| initial_basemap);
    let popup = use_signal(|| None::<Popup>);
    let mut annotations = use_signal(AnnotationLayer::new);
    let mut visibility = use_signal(move || ProximityVisibility::new(poi_id, thresholds));
    let presets = use_signal(move || navigation);
    let mut flight = use_signal(|| 0u64);

    // Feed every scale change to the POI visibility state machine
    use_effect(move || {
        let scale = view.read().scale();
        visibility
            .write()
            .on_scale_changed(scale, &mut *annotations.write());
    });

    let mut fly_to = move |preset: NavigationPreset| {
        let generation = *flight.peek() + 1;
        flight.set(generation);
        let from = *view.peek();
        let to = preset.viewpoint;
        let frames = flight_frames(preset.duration_ms);
        spawn(async move {
            for frame in 1..=frames {
                TimeoutFuture::new(FRAME_MS).await;
                // A newer flight supersedes this one
                if *flight.peek() != generation {
                    return;
                }
                let t = frame as f64 / frames as f64;
                view.set(coords::interpolate_viewpoint(from, to, t));
            }
        });
    };

    let mut navigate = move |trigger: NavigationTrigger| {
        let preset = presets.peek().iter().find(|p| p.trigger == trigger).cloned();
        if let Some(preset) = preset {
            fly_to(preset);
        }
    };

    let nav_label = config
        .preset_for(NavigationTrigger::NavLink)
        .map(|p| p.label.clone());
    let toggle = *basemap.read();

    rsx! {
        div { class: "app",
            NavBar {
                title: config.point_of_interest.name.clone(),
                nav_label,
                on_navigate: move |t| navigate(t),
            }
            div { class: "map-area",
                MapView {
                    basemap: toggle.current,
                    poi: config.point_of_interest.clone(),
                    view,
                    annotations,
                    popup,
                }
                for corner in WIDGET_CORNERS {
                    div { class: format!("widget-slot {}", corner.css_class()),
                        for widget in config.widgets_at(corner) {
                            {match widget {
                                Widget::Legend => rsx! {
                                    Legend {
                                        title: config.layer.legend_title.clone(),
                                        entries: legend.clone(),
                                    }
                                },
                                Widget::BasemapToggle => rsx! {
                                    button {
                                        class: "basemap-toggle",
                                        title: "Switch basemap",
                                        onclick: move |_| {
                                            let next = basemap.read().toggled();
                                            basemap.set(next);
                                        },
                                        "{toggle.next}"
                                    }
                                },
                                Widget::Home => rsx! {
                                    button {
                                        class: "home-button",
                                        title: "Default map view",
                                        onclick: move |_| navigate(NavigationTrigger::HomeButton),
                                        "Home"
                                    }
                                },
                            }}
                        }
                    }
                }
                PopupPanel { popup, position: config.popup_dock_position }
            }
        }
    }
}
