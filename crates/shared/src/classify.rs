use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::symbol::{Color, FillSymbol};

pub const DEFAULT_LABEL: &str = "no data";

/// Largest gap between one break's `max_value` and the next break's
/// `min_value` that still counts as contiguous. Breaks are authored with
/// pre-split bounds (0.3499 / 0.35), so a value inside such a gap belongs to
/// the lower break.
pub const SPLIT_TOLERANCE: f64 = 1e-3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassBreak {
    pub min_value: f64,
    pub max_value: f64,
    pub label: String,
    pub symbol: FillSymbol,
}

impl ClassBreak {
    pub fn new(min_value: f64, max_value: f64, label: impl Into<String>, symbol: FillSymbol) -> Self {
        ClassBreak {
            min_value,
            max_value,
            label: label.into(),
            symbol,
        }
    }

    /// Inclusive on both ends.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min_value && value <= self.max_value
    }
}

/// A numerator over a denominator, either of which may be missing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ratio {
    pub numerator: Option<f64>,
    pub denominator: Option<f64>,
}

impl Ratio {
    pub fn new(numerator: Option<f64>, denominator: Option<f64>) -> Self {
        Ratio {
            numerator,
            denominator,
        }
    }

    /// `None` when either side is missing or non-finite, or the denominator is zero.
    pub fn value(&self) -> Option<f64> {
        let numerator = self.numerator.filter(|n| n.is_finite())?;
        let denominator = self.denominator.filter(|d| d.is_finite() && *d != 0.0)?;
        Some(numerator / denominator)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RendererError {
    #[error("renderer has no class breaks")]
    Empty,
    #[error("class break {index} has a non-finite bound")]
    NonFinite { index: usize },
    #[error("class break {index} has min {min} above max {max}")]
    Inverted { index: usize, min: f64, max: f64 },
    #[error("class break {index} starts at {min}, not after the previous break ending at {previous_max}")]
    Overlap {
        index: usize,
        min: f64,
        previous_max: f64,
    },
}

/// Result of classifying one value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bucket<'a> {
    Class {
        index: usize,
        class_break: &'a ClassBreak,
    },
    Default {
        label: &'a str,
        symbol: &'a FillSymbol,
    },
}

impl<'a> Bucket<'a> {
    pub fn label(&self) -> &'a str {
        match *self {
            Bucket::Class { class_break, .. } => &class_break.label,
            Bucket::Default { label, .. } => label,
        }
    }

    pub fn symbol(&self) -> &'a FillSymbol {
        match *self {
            Bucket::Class { class_break, .. } => &class_break.symbol,
            Bucket::Default { symbol, .. } => symbol,
        }
    }

    pub fn index(&self) -> Option<usize> {
        match *self {
            Bucket::Class { index, .. } => Some(index),
            Bucket::Default { .. } => None,
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, Bucket::Default { .. })
    }
}

/// One row of the rendered legend.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegendEntry {
    pub label: String,
    pub symbol: FillSymbol,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
}

impl LegendEntry {
    pub fn is_default(&self) -> bool {
        self.min_value.is_none()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RendererDef {
    field: String,
    normalization_field: Option<String>,
    default_symbol: FillSymbol,
    #[serde(default = "default_label")]
    default_label: String,
    class_breaks: Vec<ClassBreak>,
}

fn default_label() -> String {
    DEFAULT_LABEL.to_string()
}

/// Maps a (normalized) attribute value to one of an ordered set of class breaks.
///
/// Always built through [`ClassBreaksRenderer::new`] (or deserialization, which
/// goes through it), so the break table is known to be ascending and
/// non-overlapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RendererDef")]
pub struct ClassBreaksRenderer {
    field: String,
    normalization_field: Option<String>,
    default_symbol: FillSymbol,
    default_label: String,
    class_breaks: Vec<ClassBreak>,
}

impl TryFrom<RendererDef> for ClassBreaksRenderer {
    type Error = RendererError;

    fn try_from(def: RendererDef) -> Result<Self, Self::Error> {
        let renderer = ClassBreaksRenderer::new(def.field, def.default_symbol, def.class_breaks)?;
        Ok(ClassBreaksRenderer {
            normalization_field: def.normalization_field,
            default_label: def.default_label,
            ..renderer
        })
    }
}

impl ClassBreaksRenderer {
    pub fn new(
        field: impl Into<String>,
        default_symbol: FillSymbol,
        class_breaks: Vec<ClassBreak>,
    ) -> Result<Self, RendererError> {
        validate_breaks(&class_breaks)?;
        Ok(ClassBreaksRenderer {
            field: field.into(),
            normalization_field: None,
            default_symbol,
            default_label: DEFAULT_LABEL.to_string(),
            class_breaks,
        })
    }

    pub fn with_normalization_field(mut self, field: impl Into<String>) -> Self {
        self.normalization_field = Some(field.into());
        self
    }

    pub fn with_default_label(mut self, label: impl Into<String>) -> Self {
        self.default_label = label.into();
        self
    }

    /// Hispanic population over total population, in quartile-ish bands of blue.
    pub fn population_share() -> Self {
        let breaks = vec![
            ClassBreak::new(0.0, 0.3499, "< 35%", FillSymbol::solid(Color::rgb(0x4d, 0xa6, 0xff))),
            ClassBreak::new(0.35, 0.4999, "35 - 50%", FillSymbol::solid(Color::rgb(0x00, 0x80, 0xff))),
            ClassBreak::new(0.50, 0.7499, "50 - 75%", FillSymbol::solid(Color::rgb(0x00, 0x59, 0xb3))),
            ClassBreak::new(0.75, 1.00, "> 75%", FillSymbol::solid(Color::rgb(0x00, 0x33, 0x66))),
        ];
        ClassBreaksRenderer {
            field: "HISPPOP_CY".to_string(),
            normalization_field: Some("TOTPOP".to_string()),
            default_symbol: FillSymbol::solid(Color::rgba(217, 217, 217, 0.5)),
            default_label: DEFAULT_LABEL.to_string(),
            class_breaks: breaks,
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn normalization_field(&self) -> Option<&str> {
        self.normalization_field.as_deref()
    }

    pub fn class_breaks(&self) -> &[ClassBreak] {
        &self.class_breaks
    }

    pub fn default_bucket(&self) -> Bucket<'_> {
        Bucket::Default {
            label: &self.default_label,
            symbol: &self.default_symbol,
        }
    }

    /// Find the break holding `value`. Never fails: a missing, non-finite or
    /// out-of-range value lands in the default bucket.
    pub fn classify(&self, value: Option<f64>) -> Bucket<'_> {
        let Some(value) = value.filter(|v| v.is_finite()) else {
            return self.default_bucket();
        };

        for (index, class_break) in self.class_breaks.iter().enumerate() {
            if value < class_break.min_value {
                break;
            }
            let in_split_gap = self.class_breaks.get(index + 1).is_some_and(|next| {
                value < next.min_value && next.min_value - class_break.max_value <= SPLIT_TOLERANCE
            });
            if class_break.contains(value) || in_split_gap {
                return Bucket::Class { index, class_break };
            }
        }
        self.default_bucket()
    }

    pub fn classify_ratio(&self, numerator: Option<f64>, denominator: Option<f64>) -> Bucket<'_> {
        self.classify(Ratio::new(numerator, denominator).value())
    }

    /// Classify a feature by its attribute table, dividing `field` by
    /// `normalization_field` when one is set.
    pub fn classify_attributes(&self, attributes: &Map<String, Value>) -> Bucket<'_> {
        let read = |name: &str| attributes.get(name).and_then(Value::as_f64);
        let numerator = read(&self.field);
        match &self.normalization_field {
            Some(norm) => self.classify_ratio(numerator, read(norm)),
            None => self.classify(numerator),
        }
    }

    pub fn legend(&self) -> Vec<LegendEntry> {
        self.class_breaks
            .iter()
            .map(|b| LegendEntry {
                label: b.label.clone(),
                symbol: b.symbol,
                min_value: Some(b.min_value),
                max_value: Some(b.max_value),
            })
            .chain(std::iter::once(LegendEntry {
                label: self.default_label.clone(),
                symbol: self.default_symbol,
                min_value: None,
                max_value: None,
            }))
            .collect()
    }
}

impl Default for ClassBreaksRenderer {
    fn default() -> Self {
        ClassBreaksRenderer::population_share()
    }
}

fn validate_breaks(breaks: &[ClassBreak]) -> Result<(), RendererError> {
    if breaks.is_empty() {
        return Err(RendererError::Empty);
    }
    let mut previous_max: Option<f64> = None;
    for (index, b) in breaks.iter().enumerate() {
        if !b.min_value.is_finite() || !b.max_value.is_finite() {
            return Err(RendererError::NonFinite { index });
        }
        if b.min_value > b.max_value {
            return Err(RendererError::Inverted {
                index,
                min: b.min_value,
                max: b.max_value,
            });
        }
        if let Some(previous_max) = previous_max {
            if b.min_value <= previous_max {
                return Err(RendererError::Overlap {
                    index,
                    min: b.min_value,
                    previous_max,
                });
            }
        }
        previous_max = Some(b.max_value);
    }
    Ok(())
}
