use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::classify::{Bucket, ClassBreaksRenderer, Ratio};
use crate::geo::{self, Extent, LatLng};
use crate::popup::{Popup, PopupTemplate};
use crate::visibility::Hysteresis;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Basemap {
    Streets,
    Topo,
    Satellite,
    Hybrid,
    Gray,
}

impl Basemap {
    pub fn id(&self) -> &'static str {
        match self {
            Basemap::Streets => "streets",
            Basemap::Topo => "topo",
            Basemap::Satellite => "satellite",
            Basemap::Hybrid => "hybrid",
            Basemap::Gray => "gray",
        }
    }
}

impl std::fmt::Display for Basemap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// The active basemap and the one the toggle widget switches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasemapToggle {
    pub current: Basemap,
    pub next: Basemap,
}

impl BasemapToggle {
    pub fn toggled(self) -> Self {
        BasemapToggle {
            current: self.next,
            next: self.current,
        }
    }
}

impl Default for BasemapToggle {
    fn default() -> Self {
        BasemapToggle {
            current: Basemap::Streets,
            next: Basemap::Topo,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewpoint {
    pub center: LatLng,
    pub zoom: f64,
}

impl Viewpoint {
    pub fn scale(&self) -> f64 {
        geo::scale_for_zoom(self.zoom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NavigationTarget {
    SouthTexas,
    WashingtonDc,
    Office,
}

/// What the user clicks to fire a navigation preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NavigationTrigger {
    NavLink,
    HomeButton,
    Logo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationPreset {
    pub target: NavigationTarget,
    pub trigger: NavigationTrigger,
    pub label: String,
    pub viewpoint: Viewpoint,
    pub duration_ms: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UiPosition {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    BottomCenter,
}

impl UiPosition {
    pub fn id(&self) -> &'static str {
        match self {
            UiPosition::TopLeft => "top-left",
            UiPosition::TopRight => "top-right",
            UiPosition::BottomLeft => "bottom-left",
            UiPosition::BottomRight => "bottom-right",
            UiPosition::BottomCenter => "bottom-center",
        }
    }

    /// CSS class used by the frontend to anchor widgets.
    pub fn css_class(&self) -> &'static str {
        match self {
            UiPosition::TopLeft => "ui-top-left",
            UiPosition::TopRight => "ui-top-right",
            UiPosition::BottomLeft => "ui-bottom-left",
            UiPosition::BottomRight => "ui-bottom-right",
            UiPosition::BottomCenter => "ui-bottom-center",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopupDock {
    pub enabled: bool,
    pub button_enabled: bool,
    pub breakpoint: bool,
    pub position: UiPosition,
}

impl Default for PopupDock {
    fn default() -> Self {
        PopupDock {
            enabled: true,
            button_enabled: false,
            breakpoint: false,
            position: UiPosition::BottomCenter,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Widget {
    Legend,
    BasemapToggle,
    Home,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetPlacement {
    pub widget: Widget,
    pub position: UiPosition,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PictureMarker {
    pub url: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointOfInterest {
    pub id: String,
    pub name: String,
    pub address: String,
    pub motto: String,
    pub location: LatLng,
    pub extent: Extent,
    pub picture: PictureMarker,
    pub popup: PopupTemplate,
}

impl PointOfInterest {
    pub fn blue_raster_office() -> Self {
        PointOfInterest {
            id: "blue-raster-office".to_string(),
            name: "Blue Raster".to_string(),
            address: "2200 Wilson Blvd, Ste 400, Arlington VA, 22201".to_string(),
            motto: "Move beyond dots on a map".to_string(),
            location: LatLng::new(38.890849, -77.086213),
            extent: Extent {
                xmin: -8_582_655.61,
                ymin: 4_704_861.36,
                xmax: -8_578_652.22,
                ymax: 4_707_727.75,
            },
            picture: PictureMarker {
                url: "https://pbs.twimg.com/profile_images/462243963345186816/jGsFjbtb.jpeg"
                    .to_string(),
                width: 45,
                height: 45,
            },
            popup: PopupTemplate::point_of_interest(),
        }
    }

    pub fn attributes(&self) -> Map<String, Value> {
        let mut attrs = Map::new();
        attrs.insert("name".into(), Value::from(self.name.as_str()));
        attrs.insert("address".into(), Value::from(self.address.as_str()));
        attrs.insert("motto".into(), Value::from(self.motto.as_str()));
        attrs
    }

    pub fn render_popup(&self) -> Popup {
        self.popup.render(&self.attributes())
    }
}

/// One county polygon's attribute row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountyFeature {
    #[serde(rename = "COUNTY")]
    pub county: String,
    #[serde(rename = "HISPPOP_CY")]
    pub hispanic_population: Option<f64>,
    #[serde(rename = "TOTPOP")]
    pub total_population: Option<f64>,
}

impl CountyFeature {
    pub fn ratio(&self) -> Ratio {
        Ratio::new(self.hispanic_population, self.total_population)
    }

    pub fn attributes(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureLayerConfig {
    pub url: String,
    pub out_fields: Vec<String>,
    pub renderer: ClassBreaksRenderer,
    pub popup: PopupTemplate,
    pub legend_title: String,
}

impl FeatureLayerConfig {
    pub fn classify<'a>(&'a self, feature: &CountyFeature) -> Bucket<'a> {
        self.renderer.classify(feature.ratio().value())
    }
}

impl Default for FeatureLayerConfig {
    fn default() -> Self {
        FeatureLayerConfig {
            url: "https://services.arcgis.com/V6ZHFr6zdgNZuVG0/ArcGIS/rest/services/pop_growth_south_texas/FeatureServer/0".to_string(),
            out_fields: vec!["COUNTY".into(), "HISPPOP_CY".into(), "TOTPOP".into()],
            renderer: ClassBreaksRenderer::population_share(),
            popup: PopupTemplate::county(),
            legend_title: "Hispanic Population Divided by Total Population".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("layer out fields are missing renderer field {0:?}")]
    MissingOutField(String),
    #[error("zoom {0} is outside 0..=24")]
    ZoomOutOfRange(f64),
    #[error("navigation target {0:?} is configured more than once")]
    DuplicatePreset(NavigationTarget),
    #[error("no navigation preset is bound to {0:?}")]
    UnboundTrigger(NavigationTrigger),
}

pub const MAX_ZOOM: f64 = 24.0;

/// Everything the view is wired with at startup. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MapConfig {
    pub basemap: BasemapToggle,
    pub initial_view: Viewpoint,
    pub popup_dock: PopupDock,
    pub layer: FeatureLayerConfig,
    pub point_of_interest: PointOfInterest,
    pub poi_visibility: Hysteresis,
    pub navigation: Vec<NavigationPreset>,
    pub widgets: Vec<WidgetPlacement>,
}

const NAV_DURATION_MS: u32 = 500;

fn south_texas_view() -> Viewpoint {
    Viewpoint {
        center: LatLng::from_lon_lat(-98.09834411620189, 27.03680088987091),
        zoom: 8.0,
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        MapConfig {
            basemap: BasemapToggle::default(),
            initial_view: south_texas_view(),
            popup_dock: PopupDock::default(),
            layer: FeatureLayerConfig::default(),
            point_of_interest: PointOfInterest::blue_raster_office(),
            poi_visibility: Hysteresis::default(),
            navigation: vec![
                NavigationPreset {
                    target: NavigationTarget::SouthTexas,
                    trigger: NavigationTrigger::NavLink,
                    label: "Southern Texas".to_string(),
                    viewpoint: south_texas_view(),
                    duration_ms: NAV_DURATION_MS,
                },
                NavigationPreset {
                    target: NavigationTarget::WashingtonDc,
                    trigger: NavigationTrigger::HomeButton,
                    label: "Washington, DC".to_string(),
                    viewpoint: Viewpoint {
                        center: LatLng::from_lon_lat(-77.03, 38.91),
                        zoom: 11.0,
                    },
                    duration_ms: NAV_DURATION_MS,
                },
                NavigationPreset {
                    target: NavigationTarget::Office,
                    trigger: NavigationTrigger::Logo,
                    label: "Blue Raster".to_string(),
                    viewpoint: Viewpoint {
                        center: LatLng::from_lon_lat(-77.08614862698474, 38.890812860154256),
                        zoom: 19.0,
                    },
                    duration_ms: NAV_DURATION_MS,
                },
            ],
            widgets: vec![
                WidgetPlacement {
                    widget: Widget::Legend,
                    position: UiPosition::BottomLeft,
                },
                WidgetPlacement {
                    widget: Widget::BasemapToggle,
                    position: UiPosition::BottomRight,
                },
                WidgetPlacement {
                    widget: Widget::Home,
                    position: UiPosition::BottomRight,
                },
            ],
        }
    }
}

impl MapConfig {
    pub fn preset(&self, target: NavigationTarget) -> Option<&NavigationPreset> {
        self.navigation.iter().find(|p| p.target == target)
    }

    pub fn preset_for(&self, trigger: NavigationTrigger) -> Option<&NavigationPreset> {
        self.navigation.iter().find(|p| p.trigger == trigger)
    }

    pub fn widgets_at(&self, position: UiPosition) -> impl Iterator<Item = Widget> + '_ {
        self.widgets
            .iter()
            .filter(move |w| w.position == position)
            .map(|w| w.widget)
    }

    /// Cross-field checks that serde alone can't express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let renderer = &self.layer.renderer;
        for field in std::iter::once(renderer.field()).chain(renderer.normalization_field()) {
            if !self.layer.out_fields.iter().any(|f| f == field) {
                return Err(ConfigError::MissingOutField(field.to_string()));
            }
        }

        let zooms = std::iter::once(self.initial_view.zoom)
            .chain(self.navigation.iter().map(|p| p.viewpoint.zoom));
        for zoom in zooms {
            if !(0.0..=MAX_ZOOM).contains(&zoom) {
                return Err(ConfigError::ZoomOutOfRange(zoom));
            }
        }

        for (i, preset) in self.navigation.iter().enumerate() {
            if self.navigation[..i].iter().any(|p| p.target == preset.target) {
                return Err(ConfigError::DuplicatePreset(preset.target));
            }
        }

        let has_home_widget = self.widgets.iter().any(|w| w.widget == Widget::Home);
        if has_home_widget && self.preset_for(NavigationTrigger::HomeButton).is_none() {
            return Err(ConfigError::UnboundTrigger(NavigationTrigger::HomeButton));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(MapConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_basemap_toggle_swaps() {
        let t = BasemapToggle::default();
        assert_eq!(t.current, Basemap::Streets);
        let t = t.toggled();
        assert_eq!(t.current, Basemap::Topo);
        assert_eq!(t.next, Basemap::Streets);
        assert_eq!(t.toggled(), BasemapToggle::default());
    }

    #[test]
    fn test_basemap_display() {
        assert_eq!(Basemap::Topo.to_string(), "topo");
        assert_eq!(serde_json::to_string(&Basemap::Streets).unwrap(), "\"streets\"");
    }

    #[test]
    fn test_presets_by_trigger() {
        let config = MapConfig::default();
        let home = config.preset_for(NavigationTrigger::HomeButton).unwrap();
        assert_eq!(home.target, NavigationTarget::WashingtonDc);
        assert_eq!(home.viewpoint.zoom, 11.0);
        let logo = config.preset_for(NavigationTrigger::Logo).unwrap();
        assert_eq!(logo.target, NavigationTarget::Office);
        assert_eq!(logo.duration_ms, 500);
    }

    #[test]
    fn test_office_preset_shows_poi_and_home_does_not() {
        let config = MapConfig::default();
        let office = config.preset(NavigationTarget::Office).unwrap();
        let dc = config.preset(NavigationTarget::WashingtonDc).unwrap();
        assert!(office.viewpoint.scale() <= config.poi_visibility.show_threshold());
        assert!(dc.viewpoint.scale() > config.poi_visibility.hide_threshold());
    }

    #[test]
    fn test_widgets_at_bottom_right() {
        let config = MapConfig::default();
        let right: Vec<Widget> = config.widgets_at(UiPosition::BottomRight).collect();
        assert_eq!(right, [Widget::BasemapToggle, Widget::Home]);
        let left: Vec<Widget> = config.widgets_at(UiPosition::BottomLeft).collect();
        assert_eq!(left, [Widget::Legend]);
    }

    #[test]
    fn test_poi_popup_and_location() {
        let poi = PointOfInterest::blue_raster_office();
        let popup = poi.render_popup();
        assert_eq!(popup.title, "Blue Raster");
        assert!(popup.content.starts_with("Located at: 2200 Wilson Blvd"));
        assert!(poi.extent.contains(poi.location.to_web_mercator()));
    }

    #[test]
    fn test_county_feature_json_uses_layer_field_names() {
        let f: CountyFeature = serde_json::from_str(
            r#"{"COUNTY": "Webb", "HISPPOP_CY": 250000, "TOTPOP": 276000}"#,
        )
        .unwrap();
        assert_eq!(f.county, "Webb");
        let layer = FeatureLayerConfig::default();
        assert_eq!(layer.classify(&f).label(), "> 75%");
        let popup = layer.popup.render(&f.attributes());
        assert_eq!(popup.title, "Webb");
    }

    #[test]
    fn test_county_feature_missing_total_is_no_data() {
        let f: CountyFeature =
            serde_json::from_str(r#"{"COUNTY": "Loving", "HISPPOP_CY": 12, "TOTPOP": null}"#)
                .unwrap();
        assert_eq!(FeatureLayerConfig::default().classify(&f).label(), "no data");
    }

    #[test]
    fn test_partial_json_override_fills_defaults() {
        let config: MapConfig =
            serde_json::from_str(r#"{"basemap": {"current": "gray", "next": "streets"}}"#).unwrap();
        assert_eq!(config.basemap.current, Basemap::Gray);
        assert_eq!(config.initial_view, MapConfig::default().initial_view);
        assert_eq!(config.layer, FeatureLayerConfig::default());
    }

    #[test]
    fn test_config_json_round_trip() {
        let config = MapConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: MapConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_validate_catches_missing_out_field() {
        let mut config = MapConfig::default();
        config.layer.out_fields.retain(|f| f != "TOTPOP");
        assert_eq!(
            config.validate(),
            Err(ConfigError::MissingOutField("TOTPOP".to_string()))
        );
    }

    #[test]
    fn test_validate_catches_duplicate_and_bad_zoom() {
        let mut config = MapConfig::default();
        let dup = config.navigation[0].clone();
        config.navigation.push(dup);
        assert_eq!(
            config.validate(),
            Err(ConfigError::DuplicatePreset(NavigationTarget::SouthTexas))
        );

        let mut config = MapConfig::default();
        config.initial_view.zoom = 30.0;
        assert_eq!(config.validate(), Err(ConfigError::ZoomOutOfRange(30.0)));
    }

    #[test]
    fn test_validate_requires_home_binding() {
        let mut config = MapConfig::default();
        config
            .navigation
            .retain(|p| p.trigger != NavigationTrigger::HomeButton);
        assert_eq!(
            config.validate(),
            Err(ConfigError::UnboundTrigger(NavigationTrigger::HomeButton))
        );
    }
}
