#[macro_use]
mod logging;

#[cfg(feature = "ssr")]
pub mod api;
pub mod app;
pub mod components;
#[cfg(feature = "ssr")]
pub mod config;
pub mod content;
#[cfg(feature = "ssr")]
pub mod database;
pub mod loader;
#[cfg(feature = "ssr")]
pub mod middleware;
pub mod models;
#[cfg(feature = "ssr")]
pub mod schema;
#[cfg(feature = "ssr")]
pub mod services;
pub mod state;
#[cfg(feature = "ssr")]
pub mod visitors;

#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    use crate::app::*;
    console_error_panic_hook::set_once();
    leptos::mount::hydrate_body(App);
}
