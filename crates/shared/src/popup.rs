use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::geo::{self, LatLng};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopupTemplate {
    pub title: String,
    pub content: String,
}

/// A popup with every placeholder resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Popup {
    pub title: String,
    pub content: String,
}

impl PopupTemplate {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        PopupTemplate {
            title: title.into(),
            content: content.into(),
        }
    }

    pub fn county() -> Self {
        PopupTemplate::new(
            "{COUNTY}",
            "Hispanic Population: {HISPPOP_CY} and Total Population: {TOTPOP}",
        )
    }

    pub fn point_of_interest() -> Self {
        PopupTemplate::new("{name}", "Located at: {address} <br> Their motto is: {motto}")
    }

    pub fn render(&self, attributes: &Map<String, Value>) -> Popup {
        Popup {
            title: substitute(&self.title, attributes),
            content: substitute(&self.content, attributes),
        }
    }
}

/// Title and body for the click-for-coordinates popup.
pub fn coordinates_popup(at: LatLng) -> Popup {
    Popup {
        title: "Coordinates".to_string(),
        content: geo::format_coordinates(at),
    }
}

/// Whole-valued floats print without a trailing `.0`, so counts read naturally.
fn attribute_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}

/// Replace each `{FIELD}` with the attribute's text. Missing fields render
/// empty; an unterminated `{` is copied through as-is.
fn substitute(template: &str, attributes: &Map<String, Value>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                let field = &after[..close];
                if let Some(value) = attributes.get(field) {
                    out.push_str(&attribute_text(value));
                }
                rest = &after[close + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attrs(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn test_county_popup() {
        let a = attrs(json!({"COUNTY": "Hidalgo", "HISPPOP_CY": 779_317, "TOTPOP": 849_843}));
        let popup = PopupTemplate::county().render(&a);
        assert_eq!(popup.title, "Hidalgo");
        assert_eq!(
            popup.content,
            "Hispanic Population: 779317 and Total Population: 849843"
        );
    }

    #[test]
    fn test_missing_and_null_fields_render_empty() {
        let a = attrs(json!({"COUNTY": "Kenedy", "TOTPOP": null}));
        let popup = PopupTemplate::county().render(&a);
        assert_eq!(
            popup.content,
            "Hispanic Population:  and Total Population: "
        );
    }

    #[test]
    fn test_point_of_interest_popup() {
        let a = attrs(json!({
            "name": "Blue Raster",
            "address": "2200 Wilson Blvd",
            "motto": "Move beyond dots on a map"
        }));
        let popup = PopupTemplate::point_of_interest().render(&a);
        assert_eq!(popup.title, "Blue Raster");
        assert_eq!(
            popup.content,
            "Located at: 2200 Wilson Blvd <br> Their motto is: Move beyond dots on a map"
        );
    }

    #[test]
    fn test_unterminated_brace_is_literal() {
        let a = attrs(json!({"x": 1}));
        let popup = PopupTemplate::new("{x} {y", "no fields").render(&a);
        assert_eq!(popup.title, "1 {y");
        assert_eq!(popup.content, "no fields");
    }

    #[test]
    fn test_whole_floats_print_as_integers() {
        let a = attrs(json!({"HISPPOP_CY": 13000.0, "TOTPOP": 14000.5}));
        let popup = PopupTemplate::new("{HISPPOP_CY}", "{TOTPOP}").render(&a);
        assert_eq!(popup.title, "13000");
        assert_eq!(popup.content, "14000.5");
    }

    #[test]
    fn test_float_and_bool_values() {
        let a = attrs(json!({"r": 0.5, "ok": true}));
        let popup = PopupTemplate::new("{r}/{ok}", "").render(&a);
        assert_eq!(popup.title, "0.5/true");
    }

    #[test]
    fn test_coordinates_popup() {
        let popup = coordinates_popup(LatLng::new(38.91, -77.03));
        assert_eq!(popup.title, "Coordinates");
        assert_eq!(popup.content, "Latitude: 38.91, Longitude: -77.03");
    }
}
