use popmap_shared::geo::LatLng;
use popmap_shared::models::{
    Basemap, BasemapToggle, NavigationPreset, NavigationTrigger, UiPosition, Viewpoint, Widget,
    WidgetPlacement,
};
use popmap_shared::popup::Popup;
use popmap_shared::visibility::{Hysteresis, VisibilityError};
use serde::{Deserialize, Serialize};
use wasm_bindgen::JsValue;

#[derive(Debug, Clone, Serialize)]
pub struct GraphQLRequest {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQLResponse<T> {
    pub data: Option<T>,
    pub errors: Option<Vec<GraphQLError>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQLError {
    pub message: String,
}

fn api_url() -> Result<String, String> {
    let window = web_sys::window().ok_or("No window")?;
    let origin = window
        .location()
        .origin()
        .map_err(|e: JsValue| format!("{:?}", e))?;
    Ok(format!("{}/graphql", origin))
}

async fn query<T: for<'de> Deserialize<'de>>(
    query_str: &str,
    variables: Option<serde_json::Value>,
) -> Result<T, String> {
    let req = GraphQLRequest {
        query: query_str.to_string(),
        variables,
    };

    let resp = reqwest::Client::new()
        .post(api_url()?)
        .json(&req)
        .send()
        .await
        .map_err(|e| e.to_string())?;

    let gql_resp: GraphQLResponse<T> = resp.json().await.map_err(|e| e.to_string())?;

    if let Some(errors) = gql_resp.errors {
        if let Some(first) = errors.into_iter().next() {
            return Err(first.message);
        }
    }

    gql_resp.data.ok_or_else(|| "No data returned".to_string())
}

// Types mirroring the GraphQL schema. Enum-valued fields deserialize straight
// into the shared models since both sides use the same wire names.

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerData {
    pub url: String,
    pub out_fields: Vec<String>,
    pub legend_title: String,
    pub field: String,
    pub normalization_field: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointOfInterestData {
    pub id: String,
    pub name: String,
    pub address: String,
    pub motto: String,
    pub location: LatLng,
    pub picture_url: String,
    pub picture_width: u32,
    pub picture_height: u32,
    pub popup: Popup,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapConfigData {
    pub basemap: Basemap,
    pub next_basemap: Basemap,
    pub initial_view: Viewpoint,
    pub popup_dock_position: UiPosition,
    pub layer: LayerData,
    pub point_of_interest: PointOfInterestData,
    pub show_threshold: f64,
    pub hide_threshold: f64,
    pub navigation: Vec<NavigationPreset>,
    pub widgets: Vec<WidgetPlacement>,
}

impl MapConfigData {
    pub fn basemap_toggle(&self) -> BasemapToggle {
        BasemapToggle {
            current: self.basemap,
            next: self.next_basemap,
        }
    }

    pub fn thresholds(&self) -> Result<Hysteresis, VisibilityError> {
        Hysteresis::new(self.show_threshold, self.hide_threshold)
    }

    pub fn preset_for(&self, trigger: NavigationTrigger) -> Option<&NavigationPreset> {
        self.navigation.iter().find(|p| p.trigger == trigger)
    }

    pub fn widgets_at(&self, position: UiPosition) -> Vec<Widget> {
        self.widgets
            .iter()
            .filter(|w| w.position == position)
            .map(|w| w.widget)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegendEntryData {
    pub label: String,
    pub fill_color: String,
    pub outline_color: String,
    pub outline_width: f64,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub is_default: bool,
}

// API functions

const MAP_CONFIG_QUERY: &str = r#"query {
    mapConfig {
        basemap nextBasemap popupDockPosition showThreshold hideThreshold
        initialView { center { latitude longitude } zoom }
        layer { url outFields legendTitle field normalizationField }
        pointOfInterest {
            id name address motto location { latitude longitude }
            pictureUrl pictureWidth pictureHeight popup { title content }
        }
        navigation {
            target trigger label durationMs
            viewpoint { center { latitude longitude } zoom }
        }
        widgets { widget position }
    }
}"#;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapConfigResponse {
    pub map_config: MapConfigData,
}

pub async fn fetch_map_config() -> Result<MapConfigData, String> {
    let resp: MapConfigResponse = query(MAP_CONFIG_QUERY, None).await?;
    Ok(resp.map_config)
}

#[derive(Deserialize)]
pub struct LegendResponse {
    pub legend: Vec<LegendEntryData>,
}

pub async fn fetch_legend() -> Result<Vec<LegendEntryData>, String> {
    let resp: LegendResponse = query(
        r#"query { legend { label fillColor outlineColor outlineWidth minValue maxValue isDefault } }"#,
        None,
    )
    .await?;
    Ok(resp.legend)
}

#[cfg(test)]
mod tests {
    use super::*;
    use popmap_shared::models::NavigationTarget;

    const MAP_CONFIG_JSON: &str = r#"{"mapConfig":{
        "basemap":"streets","nextBasemap":"topo","popupDockPosition":"bottom-center",
        "showThreshold":35000.0,"hideThreshold":65000.0,
        "initialView":{"center":{"latitude":38.91,"longitude":-77.03},"zoom":11.0},
        "layer":{"url":"https://example.com/FeatureServer/0","outFields":["COUNTY","HISPPOP_CY","TOTPOP"],
                 "legendTitle":"Hispanic Population","field":"HISPPOP_CY","normalizationField":"TOTPOP"},
        "pointOfInterest":{"id":"blue-raster-office","name":"Blue Raster","address":"2200 Wilson Blvd",
            "motto":"Move beyond dots on a map","location":{"latitude":38.890849,"longitude":-77.086213},
            "pictureUrl":"https://example.com/logo.jpeg","pictureWidth":45,"pictureHeight":45,
            "popup":{"title":"Blue Raster","content":"Located at: 2200 Wilson Blvd"}},
        "navigation":[
            {"target":"SOUTH_TEXAS","trigger":"NAV_LINK","label":"Southern Texas","durationMs":500,
             "viewpoint":{"center":{"latitude":27.5,"longitude":-98.5},"zoom":8.0}},
            {"target":"WASHINGTON_DC","trigger":"HOME_BUTTON","label":"Home","durationMs":500,
             "viewpoint":{"center":{"latitude":38.91,"longitude":-77.03},"zoom":11.0}}
        ],
        "widgets":[{"widget":"LEGEND","position":"bottom-left"},
                   {"widget":"BASEMAP_TOGGLE","position":"bottom-right"},
                   {"widget":"HOME","position":"bottom-right"}]
    }}"#;

    #[test]
    fn test_graphql_request_serializes_with_variables() {
        let req = GraphQLRequest {
            query: "query { classifyRatio(ratio: $r) { label } }".to_string(),
            variables: Some(serde_json::json!({"r": 0.4})),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["variables"]["r"], 0.4);
    }

    #[test]
    fn test_graphql_request_omits_null_variables() {
        let req = GraphQLRequest {
            query: MAP_CONFIG_QUERY.to_string(),
            variables: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("variables").is_none());
    }

    #[test]
    fn test_map_config_response_deserializes_into_shared_models() {
        let resp: MapConfigResponse = serde_json::from_str(MAP_CONFIG_JSON).unwrap();
        let config = resp.map_config;
        assert_eq!(config.basemap, Basemap::Streets);
        assert_eq!(config.basemap_toggle().toggled().current, Basemap::Topo);
        assert_eq!(config.popup_dock_position, UiPosition::BottomCenter);
        assert_eq!(config.initial_view.zoom, 11.0);
        assert_eq!(config.point_of_interest.popup.title, "Blue Raster");
        assert_eq!(config.navigation[0].target, NavigationTarget::SouthTexas);
        assert_eq!(config.navigation[0].duration_ms, 500);
    }

    #[test]
    fn test_map_config_helpers() {
        let config = serde_json::from_str::<MapConfigResponse>(MAP_CONFIG_JSON)
            .unwrap()
            .map_config;
        let home = config.preset_for(NavigationTrigger::HomeButton).unwrap();
        assert_eq!(home.target, NavigationTarget::WashingtonDc);
        assert!(config.preset_for(NavigationTrigger::Logo).is_none());
        assert_eq!(
            config.widgets_at(UiPosition::BottomRight),
            vec![Widget::BasemapToggle, Widget::Home]
        );
        let t = config.thresholds().unwrap();
        assert_eq!(t.show_threshold(), 35_000.0);
        assert_eq!(t.hide_threshold(), 65_000.0);
    }

    #[test]
    fn test_collapsed_thresholds_are_rejected() {
        let mut config = serde_json::from_str::<MapConfigResponse>(MAP_CONFIG_JSON)
            .unwrap()
            .map_config;
        config.hide_threshold = config.show_threshold;
        assert!(config.thresholds().is_err());
    }

    #[test]
    fn test_legend_response_deserializes() {
        let json = r##"{"legend":[
            {"label":"< 35%","fillColor":"#4da6ff","outlineColor":"#ffffff","outlineWidth":0.5,"minValue":0.0,"maxValue":0.3499,"isDefault":false},
            {"label":"no data","fillColor":"rgba(217,217,217,0.5)","outlineColor":"#ffffff","outlineWidth":0.5,"minValue":null,"maxValue":null,"isDefault":true}
        ]}"##;
        let resp: LegendResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.legend.len(), 2);
        assert_eq!(resp.legend[0].fill_color, "#4da6ff");
        assert!(resp.legend[1].is_default);
        assert!(resp.legend[1].min_value.is_none());
    }

    #[test]
    fn test_graphql_error_response() {
        let json = r#"{"data":null,"errors":[{"message":"No preset for that target"}]}"#;
        let resp: GraphQLResponse<MapConfigResponse> = serde_json::from_str(json).unwrap();
        assert!(resp.data.is_none());
        assert_eq!(resp.errors.unwrap()[0].message, "No preset for that target");
    }
}
