//! Viewport classification and evasive-button placement.

use crate::rng::RandomSource;

/// Widths at or below this many CSS pixels count as a compact (touch) viewport.
pub const COMPACT_MAX_WIDTH: f64 = 768.0;
pub const COMPACT_PADDING: f64 = 10.0;
pub const DESKTOP_PADDING: f64 = 20.0;
/// Horizontal offset from the container centre for the initial No button position.
pub const INITIAL_OFFSET_X: f64 = 50.0;

/// Width/height of a laid-out element, in CSS pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Position relative to the buttons container (`left` / `top`).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewportMode {
    Compact,
    Desktop,
}

impl ViewportMode {
    pub fn is_compact(self) -> bool {
        matches!(self, ViewportMode::Compact)
    }
}

/// Classifies a viewport width against the compact threshold.
pub fn classify_viewport(width: f64, compact_max_width: f64) -> ViewportMode {
    if width <= compact_max_width { ViewportMode::Compact } else { ViewportMode::Desktop }
}

/// Inclusive upper bounds for the No button's `left`/`top`, never negative.
pub fn evasive_range(container: Bounds, button: Bounds, padding: f64) -> Point {
    Point {
        x: (container.width - button.width - padding).max(0.0),
        y: (container.height - button.height - padding).max(0.0),
    }
}

/// Picks a uniformly random spot for the No button inside the container.
/// A container smaller than the button collapses that axis to 0.
pub fn compute_evasive_position(
    container: Bounds,
    button: Bounds,
    padding: f64,
    rng: &mut impl RandomSource,
) -> Point {
    let max_x = container.width - button.width - padding;
    let max_y = container.height - button.height - padding;
    Point {
        x: floor_at_zero(rng.next_unit() * max_x),
        y: floor_at_zero(rng.next_unit() * max_y),
    }
}

// `f64::max` lets -0.0 through, which would render as `-0px`.
fn floor_at_zero(v: f64) -> f64 {
    if v > 0.0 { v } else { 0.0 }
}

/// Where the No button sits before any interaction: right of centre, top edge.
pub fn initial_position(container: Bounds, offset_x: f64) -> Point {
    Point { x: container.width / 2.0 + offset_x, y: 0.0 }
}
