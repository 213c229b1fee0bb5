use std::sync::Arc;

use async_graphql::{Context, EmptyMutation, EmptySubscription, Enum, Object, SimpleObject};
use popmap_shared::{
    classify::{Bucket, LegendEntry, Ratio},
    geo::LatLng,
    models::{
        CountyFeature, NavigationPreset, NavigationTarget, NavigationTrigger, PointOfInterest,
        Viewpoint, Widget,
    },
    popup::Popup,
    visibility::{AnnotationVisibilityState, Transition},
};

use crate::assets::Assets;

// Enums mirrored from the shared models

#[derive(Enum, Copy, Clone, Eq, PartialEq)]
pub enum GqlNavigationTarget {
    SouthTexas,
    WashingtonDc,
    Office,
}

impl From<NavigationTarget> for GqlNavigationTarget {
    fn from(t: NavigationTarget) -> Self {
        match t {
            NavigationTarget::SouthTexas => GqlNavigationTarget::SouthTexas,
            NavigationTarget::WashingtonDc => GqlNavigationTarget::WashingtonDc,
            NavigationTarget::Office => GqlNavigationTarget::Office,
        }
    }
}

impl From<GqlNavigationTarget> for NavigationTarget {
    fn from(t: GqlNavigationTarget) -> Self {
        match t {
            GqlNavigationTarget::SouthTexas => NavigationTarget::SouthTexas,
            GqlNavigationTarget::WashingtonDc => NavigationTarget::WashingtonDc,
            GqlNavigationTarget::Office => NavigationTarget::Office,
        }
    }
}

#[derive(Enum, Copy, Clone, Eq, PartialEq)]
pub enum GqlNavigationTrigger {
    NavLink,
    HomeButton,
    Logo,
}

impl From<NavigationTrigger> for GqlNavigationTrigger {
    fn from(t: NavigationTrigger) -> Self {
        match t {
            NavigationTrigger::NavLink => GqlNavigationTrigger::NavLink,
            NavigationTrigger::HomeButton => GqlNavigationTrigger::HomeButton,
            NavigationTrigger::Logo => GqlNavigationTrigger::Logo,
        }
    }
}

#[derive(Enum, Copy, Clone, Eq, PartialEq)]
pub enum GqlTransition {
    Show,
    Hide,
}

impl From<Transition> for GqlTransition {
    fn from(t: Transition) -> Self {
        match t {
            Transition::Show => GqlTransition::Show,
            Transition::Hide => GqlTransition::Hide,
        }
    }
}

#[derive(Enum, Copy, Clone, Eq, PartialEq)]
pub enum GqlWidget {
    Legend,
    BasemapToggle,
    Home,
}

impl From<Widget> for GqlWidget {
    fn from(w: Widget) -> Self {
        match w {
            Widget::Legend => GqlWidget::Legend,
            Widget::BasemapToggle => GqlWidget::BasemapToggle,
            Widget::Home => GqlWidget::Home,
        }
    }
}

// GraphQL output types

#[derive(SimpleObject, Clone)]
pub struct GqlLatLng {
    pub latitude: f64,
    pub longitude: f64,
}

impl From<LatLng> for GqlLatLng {
    fn from(p: LatLng) -> Self {
        GqlLatLng {
            latitude: p.latitude,
            longitude: p.longitude,
        }
    }
}

#[derive(SimpleObject)]
pub struct GqlViewpoint {
    pub center: GqlLatLng,
    pub zoom: f64,
    pub scale: f64,
}

impl From<&Viewpoint> for GqlViewpoint {
    fn from(v: &Viewpoint) -> Self {
        GqlViewpoint {
            center: v.center.into(),
            zoom: v.zoom,
            scale: v.scale(),
        }
    }
}

#[derive(SimpleObject)]
pub struct GqlNavigationPreset {
    pub target: GqlNavigationTarget,
    pub trigger: GqlNavigationTrigger,
    pub label: String,
    pub viewpoint: GqlViewpoint,
    pub duration_ms: u32,
}

impl From<&NavigationPreset> for GqlNavigationPreset {
    fn from(p: &NavigationPreset) -> Self {
        GqlNavigationPreset {
            target: p.target.into(),
            trigger: p.trigger.into(),
            label: p.label.clone(),
            viewpoint: (&p.viewpoint).into(),
            duration_ms: p.duration_ms,
        }
    }
}

#[derive(SimpleObject)]
pub struct GqlPopup {
    pub title: String,
    pub content: String,
}

impl From<Popup> for GqlPopup {
    fn from(p: Popup) -> Self {
        GqlPopup {
            title: p.title,
            content: p.content,
        }
    }
}

#[derive(SimpleObject)]
pub struct GqlPointOfInterest {
    pub id: String,
    pub name: String,
    pub address: String,
    pub motto: String,
    pub location: GqlLatLng,
    pub picture_url: String,
    pub picture_width: u32,
    pub picture_height: u32,
    pub popup: GqlPopup,
}

impl From<&PointOfInterest> for GqlPointOfInterest {
    fn from(p: &PointOfInterest) -> Self {
        GqlPointOfInterest {
            id: p.id.clone(),
            name: p.name.clone(),
            address: p.address.clone(),
            motto: p.motto.clone(),
            location: p.location.into(),
            picture_url: p.picture.url.clone(),
            picture_width: p.picture.width,
            picture_height: p.picture.height,
            popup: p.render_popup().into(),
        }
    }
}

#[derive(SimpleObject)]
pub struct GqlLayer {
    pub url: String,
    pub out_fields: Vec<String>,
    pub legend_title: String,
    pub field: String,
    pub normalization_field: Option<String>,
}

#[derive(SimpleObject)]
pub struct GqlWidgetPlacement {
    pub widget: GqlWidget,
    pub position: String,
}

#[derive(SimpleObject)]
pub struct GqlMapConfig {
    pub basemap: String,
    pub next_basemap: String,
    pub initial_view: GqlViewpoint,
    pub popup_dock_position: String,
    pub layer: GqlLayer,
    pub point_of_interest: GqlPointOfInterest,
    pub show_threshold: f64,
    pub hide_threshold: f64,
    pub navigation: Vec<GqlNavigationPreset>,
    pub widgets: Vec<GqlWidgetPlacement>,
}

#[derive(SimpleObject)]
pub struct GqlLegendEntry {
    pub label: String,
    pub fill_color: String,
    pub outline_color: String,
    pub outline_width: f64,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub is_default: bool,
}

impl From<LegendEntry> for GqlLegendEntry {
    fn from(e: LegendEntry) -> Self {
        GqlLegendEntry {
            is_default: e.is_default(),
            fill_color: e.symbol.color.to_css(),
            outline_color: e.symbol.outline.color.to_css(),
            outline_width: e.symbol.outline.width,
            min_value: e.min_value,
            max_value: e.max_value,
            label: e.label,
        }
    }
}

#[derive(SimpleObject)]
pub struct GqlClassification {
    pub label: String,
    pub fill_color: String,
    pub is_default: bool,
    pub break_index: Option<u32>,
    pub ratio: Option<f64>,
}

impl GqlClassification {
    fn new(bucket: Bucket<'_>, ratio: Option<f64>) -> Self {
        GqlClassification {
            label: bucket.label().to_string(),
            fill_color: bucket.symbol().color.to_css(),
            is_default: bucket.is_default(),
            break_index: bucket.index().map(|i| i as u32),
            ratio,
        }
    }
}

#[derive(SimpleObject)]
pub struct GqlVisibility {
    pub visible: bool,
    pub transition: Option<GqlTransition>,
}

#[derive(SimpleObject)]
pub struct GqlCountyPopup {
    pub popup: GqlPopup,
    pub classification: GqlClassification,
}

// Query root

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    async fn map_config(&self, ctx: &Context<'_>) -> async_graphql::Result<GqlMapConfig> {
        let config = &ctx.data::<Arc<Assets>>()?.config;
        let renderer = &config.layer.renderer;
        Ok(GqlMapConfig {
            basemap: config.basemap.current.to_string(),
            next_basemap: config.basemap.next.to_string(),
            initial_view: (&config.initial_view).into(),
            popup_dock_position: config.popup_dock.position.id().to_string(),
            layer: GqlLayer {
                url: config.layer.url.clone(),
                out_fields: config.layer.out_fields.clone(),
                legend_title: config.layer.legend_title.clone(),
                field: renderer.field().to_string(),
                normalization_field: renderer.normalization_field().map(str::to_string),
            },
            point_of_interest: (&config.point_of_interest).into(),
            show_threshold: config.poi_visibility.show_threshold(),
            hide_threshold: config.poi_visibility.hide_threshold(),
            navigation: config.navigation.iter().map(GqlNavigationPreset::from).collect(),
            widgets: config
                .widgets
                .iter()
                .map(|w| GqlWidgetPlacement {
                    widget: w.widget.into(),
                    position: w.position.id().to_string(),
                })
                .collect(),
        })
    }

    async fn legend(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<GqlLegendEntry>> {
        let assets = ctx.data::<Arc<Assets>>()?;
        Ok(assets
            .config
            .layer
            .renderer
            .legend()
            .into_iter()
            .map(GqlLegendEntry::from)
            .collect())
    }

    /// Classify `numerator / denominator`; a zero or missing operand is "no data".
    async fn classify(
        &self,
        ctx: &Context<'_>,
        numerator: Option<f64>,
        denominator: Option<f64>,
    ) -> async_graphql::Result<GqlClassification> {
        let renderer = &ctx.data::<Arc<Assets>>()?.config.layer.renderer;
        let ratio = Ratio::new(numerator, denominator).value();
        Ok(GqlClassification::new(renderer.classify(ratio), ratio))
    }

    async fn classify_ratio(
        &self,
        ctx: &Context<'_>,
        ratio: Option<f64>,
    ) -> async_graphql::Result<GqlClassification> {
        let renderer = &ctx.data::<Arc<Assets>>()?.config.layer.renderer;
        Ok(GqlClassification::new(renderer.classify(ratio), ratio))
    }

    /// Next point-of-interest visibility for a scale change, given the current one.
    async fn next_visibility(
        &self,
        ctx: &Context<'_>,
        scale: f64,
        visible: bool,
    ) -> async_graphql::Result<GqlVisibility> {
        let thresholds = ctx.data::<Arc<Assets>>()?.config.poi_visibility;
        let state = AnnotationVisibilityState {
            visible,
            thresholds,
        };
        let (next, transition) = state.on_scale_changed(scale);
        Ok(GqlVisibility {
            visible: next.visible,
            transition: transition.map(GqlTransition::from),
        })
    }

    async fn navigation_preset(
        &self,
        ctx: &Context<'_>,
        target: GqlNavigationTarget,
    ) -> async_graphql::Result<GqlNavigationPreset> {
        let config = &ctx.data::<Arc<Assets>>()?.config;
        config
            .preset(target.into())
            .map(GqlNavigationPreset::from)
            .ok_or_else(|| async_graphql::Error::new("No preset for that target"))
    }

    async fn county_popup(
        &self,
        ctx: &Context<'_>,
        county: String,
        hispanic_population: Option<f64>,
        total_population: Option<f64>,
    ) -> async_graphql::Result<GqlCountyPopup> {
        let layer = &ctx.data::<Arc<Assets>>()?.config.layer;
        let feature = CountyFeature {
            county,
            hispanic_population,
            total_population,
        };
        Ok(GqlCountyPopup {
            popup: layer.popup.render(&feature.attributes()).into(),
            classification: GqlClassification::new(layer.classify(&feature), feature.ratio().value()),
        })
    }
}

pub type Schema = async_graphql::Schema<QueryRoot, EmptyMutation, EmptySubscription>;

pub fn build_schema(assets: Arc<Assets>) -> Schema {
    async_graphql::Schema::build(QueryRoot, EmptyMutation, EmptySubscription)
        .data(assets)
        .finish()
}
