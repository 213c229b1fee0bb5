use dioxus::prelude::*;
use popmap_shared::models::NavigationTrigger;

#[component]
pub fn NavBar(
    title: String,
    nav_label: Option<String>,
    on_navigate: EventHandler<NavigationTrigger>,
) -> Element {
    rsx! {
        nav { class: "navbar",
            button {
                class: "navbar-logo",
                title: "Zoom to the office",
                onclick: move |_| on_navigate.call(NavigationTrigger::Logo),
                "{title}"
            }
            if let Some(label) = nav_label {
                button {
                    class: "navbar-link",
                    onclick: move |_| on_navigate.call(NavigationTrigger::NavLink),
                    "{label}"
                }
            }
        }
    }
}
