pub mod classify;
pub mod geo;
pub mod models;
pub mod popup;
pub mod symbol;
pub mod visibility;
