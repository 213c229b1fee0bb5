pub mod legend;
pub mod map_view;
pub mod nav_bar;
pub mod popup_panel;
