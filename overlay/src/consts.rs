//! Shared numeric constants for the overlay crate.

// ── Interaction ─────────────────────────────────────────────────

/// Maximum pointer travel in screen pixels for a press to still count as a click.
pub const CLICK_SLOP_PX: f64 = 6.0;

// ── Viewport ────────────────────────────────────────────────────

/// Smallest allowed viewport scale.
pub const MIN_SCALE: f64 = 0.7;

/// Largest allowed viewport scale.
pub const MAX_SCALE: f64 = 4.0;

/// Log-zoom per wheel unit. Wheel-up (negative `delta_y`) zooms in.
pub const WHEEL_ZOOM_RATE: f64 = 0.0015;

/// Log-zoom applied by the zoom-in / zoom-out buttons.
pub const BUTTON_ZOOM_STEP: f64 = 0.25;

/// Scale above which the canvas advertises that it can be panned.
pub const CAN_PAN_THRESHOLD: f64 = 1.001;

// ── Artwork ─────────────────────────────────────────────────────

/// Identifier of the element explicitly designated as the site plan.
pub const SITEPLAN_NODE_ID: &str = "siteplan";

/// View region assumed when the scene declares none.
pub const DEFAULT_VIEW_BOX: [f64; 4] = [0.0, 0.0, 100.0, 100.0];

// ── Styling ─────────────────────────────────────────────────────

/// Polygon fill opacity.
pub const FILL_OPACITY: f64 = 0.35;

/// Polygon stroke opacity.
pub const STROKE_OPACITY: f64 = 0.35;
