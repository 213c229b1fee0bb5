use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default show threshold: the office marker appears at 1:35,000 or closer.
pub const DEFAULT_SHOW_SCALE: f64 = 35_000.0;
/// Default hide threshold: the marker disappears beyond 1:65,000.
pub const DEFAULT_HIDE_SCALE: f64 = 65_000.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum VisibilityError {
    #[error("visibility thresholds must be finite (show {show}, hide {hide})")]
    NonFinite { show: f64, hide: f64 },
    #[error("show threshold {show} must be below hide threshold {hide}")]
    Collapsed { show: f64, hide: f64 },
}

/// Two-threshold scale band. Shown at `show` or below, hidden above `hide`,
/// unchanged in between.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "HysteresisDef")]
pub struct Hysteresis {
    show_threshold: f64,
    hide_threshold: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct HysteresisDef {
    show_threshold: f64,
    hide_threshold: f64,
}

impl TryFrom<HysteresisDef> for Hysteresis {
    type Error = VisibilityError;

    fn try_from(def: HysteresisDef) -> Result<Self, Self::Error> {
        Hysteresis::new(def.show_threshold, def.hide_threshold)
    }
}

impl Hysteresis {
    pub fn new(show_threshold: f64, hide_threshold: f64) -> Result<Self, VisibilityError> {
        if !show_threshold.is_finite() || !hide_threshold.is_finite() {
            return Err(VisibilityError::NonFinite {
                show: show_threshold,
                hide: hide_threshold,
            });
        }
        if show_threshold >= hide_threshold {
            return Err(VisibilityError::Collapsed {
                show: show_threshold,
                hide: hide_threshold,
            });
        }
        Ok(Hysteresis {
            show_threshold,
            hide_threshold,
        })
    }

    pub fn show_threshold(&self) -> f64 {
        self.show_threshold
    }

    pub fn hide_threshold(&self) -> f64 {
        self.hide_threshold
    }

    /// True when `scale` sits between the thresholds, where nothing toggles.
    pub fn in_dead_zone(&self, scale: f64) -> bool {
        scale > self.show_threshold && scale <= self.hide_threshold
    }
}

impl Default for Hysteresis {
    fn default() -> Self {
        Hysteresis {
            show_threshold: DEFAULT_SHOW_SCALE,
            hide_threshold: DEFAULT_HIDE_SCALE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Transition {
    Show,
    Hide,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationVisibilityState {
    pub visible: bool,
    pub thresholds: Hysteresis,
}

impl AnnotationVisibilityState {
    /// Starts hidden.
    pub fn new(thresholds: Hysteresis) -> Self {
        AnnotationVisibilityState {
            visible: false,
            thresholds,
        }
    }

    /// Pure transition for one scale notification. Returns the next state and
    /// the change, if any. Non-finite scales never toggle.
    pub fn on_scale_changed(self, new_scale: f64) -> (Self, Option<Transition>) {
        if !new_scale.is_finite() {
            return (self, None);
        }
        let t = self.thresholds;
        match self.visible {
            false if new_scale <= t.show_threshold => {
                (AnnotationVisibilityState { visible: true, ..self }, Some(Transition::Show))
            }
            true if new_scale > t.hide_threshold => {
                (AnnotationVisibilityState { visible: false, ..self }, Some(Transition::Hide))
            }
            _ => (self, None),
        }
    }
}

impl Default for AnnotationVisibilityState {
    fn default() -> Self {
        AnnotationVisibilityState::new(Hysteresis::default())
    }
}

/// The view's collection of drawn annotations.
pub trait AnnotationSet {
    fn add(&mut self, id: &str);
    fn remove(&mut self, id: &str);
}

/// In-memory annotation collection keyed by id. Adding twice keeps one copy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationLayer {
    ids: BTreeSet<String>,
}

impl AnnotationLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }
}

impl AnnotationSet for AnnotationLayer {
    fn add(&mut self, id: &str) {
        self.ids.insert(id.to_string());
    }

    fn remove(&mut self, id: &str) {
        self.ids.remove(id);
    }
}

/// Drives one fixed annotation in and out of an [`AnnotationSet`] as the
/// viewport scale changes.
#[derive(Debug, Clone, PartialEq)]
pub struct ProximityVisibility {
    annotation_id: String,
    state: AnnotationVisibilityState,
}

impl ProximityVisibility {
    pub fn new(annotation_id: impl Into<String>, thresholds: Hysteresis) -> Self {
        ProximityVisibility {
            annotation_id: annotation_id.into(),
            state: AnnotationVisibilityState::new(thresholds),
        }
    }

    pub fn annotation_id(&self) -> &str {
        &self.annotation_id
    }

    pub fn state(&self) -> AnnotationVisibilityState {
        self.state
    }

    pub fn is_visible(&self) -> bool {
        self.state.visible
    }

    /// Apply one notification; issues at most one `add` or `remove`.
    pub fn on_scale_changed<S: AnnotationSet + ?Sized>(
        &mut self,
        new_scale: f64,
        annotations: &mut S,
    ) -> Option<Transition> {
        let (next, transition) = self.state.on_scale_changed(new_scale);
        self.state = next;
        match transition {
            Some(Transition::Show) => annotations.add(&self.annotation_id),
            Some(Transition::Hide) => annotations.remove(&self.annotation_id),
            None => {}
        }
        transition
    }
}
