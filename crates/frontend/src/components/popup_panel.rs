use dioxus::prelude::*;
use popmap_shared::models::UiPosition;
use popmap_shared::popup::Popup;

/// Popup content with `<br>` breaks split into separate lines.
fn content_lines(content: &str) -> Vec<String> {
    content
        .split("<br>")
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Always-docked popup; there is no dock toggle and no floating mode.
#[component]
pub fn PopupPanel(popup: Signal<Option<Popup>>, position: UiPosition) -> Element {
    let Some(current) = popup.read().clone() else {
        return rsx! {};
    };
    let lines = content_lines(&current.content);
    let class = format!("panel popup-dock {}", position.css_class());

    rsx! {
        div { class: "{class}",
            div { class: "popup-header",
                h3 { "{current.title}" }
                button {
                    class: "secondary popup-close",
                    "aria-label": "Close popup",
                    onclick: move |_| popup.set(None),
                    "×"
                }
            }
            for line in lines {
                p { "{line}" }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_lines_split_on_breaks() {
        assert_eq!(
            content_lines("Located at: 2200 Wilson Blvd <br> Their motto is: Move beyond dots on a map"),
            vec![
                "Located at: 2200 Wilson Blvd",
                "Their motto is: Move beyond dots on a map"
            ]
        );
    }

    #[test]
    fn test_content_lines_single_line() {
        assert_eq!(
            content_lines("Latitude: 38.91, Longitude: -77.03"),
            vec!["Latitude: 38.91, Longitude: -77.03"]
        );
    }

    #[test]
    fn test_content_lines_drop_empty_segments() {
        assert!(content_lines("<br>").is_empty());
    }
}
