//! Be Mine core crate.
//!
//! A "will you be my valentine" page: the No button runs away from the pointer
//! (or jumps on tap on small screens), each attempt makes the panda sadder and
//! the Yes button bigger, and Yes ends in confetti. The decision logic lives in
//! plain Rust modules that test natively; `dom` wires it to the page.

use wasm_bindgen::prelude::*;

pub mod celebration;
pub mod config;
pub mod controller;
pub mod dom;
pub mod escalation;
pub mod geometry;
pub mod rng;
pub mod schedule;

pub use config::{ConfigError, ElementIds, WidgetConfig};
pub use controller::{Controller, InputBinding, Surface, Target};
pub use escalation::{InteractionState, Phase};
pub use geometry::{Bounds, Point, ViewportMode};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

// -----------------------------------------------------------------------------
// JS entrypoints
// -----------------------------------------------------------------------------

/// Attaches the widget using the stock element ids and tables.
#[wasm_bindgen]
pub fn start_widget() -> Result<(), JsValue> {
    dom::start(WidgetConfig::default())
}

/// Attaches the widget with overrides from a (partial) JSON config object.
#[cfg(feature = "serde_json")]
#[wasm_bindgen]
pub fn start_widget_with_config(json: &str) -> Result<(), JsValue> {
    dom::start(WidgetConfig::from_json(json)?)
}

/// Number of times the No button has been triggered so far (0 before start).
#[wasm_bindgen]
pub fn escalation_count() -> u32 {
    dom::escalation_count()
}

#[wasm_bindgen]
pub fn widget_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
