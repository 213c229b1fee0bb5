use dioxus::prelude::*;

use crate::api::LegendEntryData;

/// Inline style for one legend swatch.
fn swatch_style(entry: &LegendEntryData) -> String {
    format!(
        "background: {}; border: {}px solid {};",
        entry.fill_color, entry.outline_width, entry.outline_color
    )
}

#[component]
pub fn Legend(title: String, entries: Vec<LegendEntryData>) -> Element {
    rsx! {
        div { class: "panel legend",
            h3 { "{title}" }
            if entries.is_empty() {
                div { class: "legend-empty", "Legend unavailable" }
            }
            for entry in entries.iter() {
                div {
                    class: if entry.is_default { "legend-row legend-default" } else { "legend-row" },
                    span { class: "legend-swatch", style: swatch_style(entry) }
                    span { class: "legend-label", "{entry.label}" }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swatch_style_uses_fill_and_outline() {
        let entry = LegendEntryData {
            label: "< 35%".to_string(),
            fill_color: "#4da6ff".to_string(),
            outline_color: "#ffffff".to_string(),
            outline_width: 0.5,
            min_value: Some(0.0),
            max_value: Some(0.3499),
            is_default: false,
        };
        assert_eq!(
            swatch_style(&entry),
            "background: #4da6ff; border: 0.5px solid #ffffff;"
        );
    }
}
