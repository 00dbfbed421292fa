//! Pan/zoom viewport over the whole overlay scene.
//!
//! Three coordinate spaces are involved:
//!
//! - **screen**: pointer positions as the page reports them (client pixels),
//! - **canvas**: the canvas element's own user space, related to screen by the
//!   live on-screen matrix ([`ScreenMatrix`]) which the host refreshes whenever
//!   the page scales or letterboxes the canvas,
//! - **scene**: artwork coordinates, related to canvas by
//!   `canvas = scene · scale + translate`.
//!
//! Zooming is pointer-anchored: the scene point under the pointer stays under
//! the pointer. Panning is unbounded.

#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

use serde::{Deserialize, Serialize};

use crate::consts::{CAN_PAN_THRESHOLD, MAX_SCALE, MIN_SCALE};
use crate::geom::{BoundingBox, Point, ScreenMatrix};

/// Current pan/zoom values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewportState {
    pub scale: f64,
    pub translate_x: f64,
    pub translate_y: f64,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self { scale: 1.0, translate_x: 0.0, translate_y: 0.0 }
    }
}

/// Inclusive zoom range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomLimits {
    pub min: f64,
    pub max: f64,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self { min: MIN_SCALE, max: MAX_SCALE }
    }
}

impl ZoomLimits {
    /// A usable range: inverted bounds are swapped, and non-finite or
    /// non-positive bounds fall back to the defaults.
    #[must_use]
    pub fn normalized(self) -> Self {
        let usable = |v: f64| v.is_finite() && v > 0.0;
        if !(usable(self.min) && usable(self.max)) {
            tracing::warn!(min = self.min, max = self.max, "unusable zoom limits; using defaults");
            return Self::default();
        }
        if self.min > self.max {
            tracing::warn!(min = self.min, max = self.max, "inverted zoom limits; swapping");
            return Self { min: self.max, max: self.min };
        }
        self
    }

    /// Closest scale to 1 inside the range.
    #[must_use]
    pub fn home_scale(self) -> f64 {
        1.0_f64.clamp(self.min, self.max)
    }
}

/// Owner of the single live [`ViewportState`] for a canvas.
#[derive(Debug, Clone, Default)]
pub struct Viewport {
    state: ViewportState,
    limits: ZoomLimits,
    screen_ctm: ScreenMatrix,
}

impl Viewport {
    #[must_use]
    pub fn new(limits: ZoomLimits) -> Self {
        let limits = limits.normalized();
        let state = ViewportState { scale: limits.home_scale(), ..ViewportState::default() };
        Self { state, limits, screen_ctm: ScreenMatrix::IDENTITY }
    }

    #[must_use]
    pub fn state(&self) -> ViewportState {
        self.state
    }

    #[must_use]
    pub fn limits(&self) -> ZoomLimits {
        self.limits
    }

    /// Record the canvas' current user-space → screen matrix.
    pub fn set_screen_ctm(&mut self, ctm: ScreenMatrix) {
        self.screen_ctm = ctm;
    }

    #[must_use]
    pub fn screen_ctm(&self) -> ScreenMatrix {
        self.screen_ctm
    }

    /// Screen → canvas user space. A singular matrix is treated as identity.
    #[must_use]
    pub fn screen_to_canvas(&self, screen: Point) -> Point {
        match self.screen_ctm.inverse() {
            Some(inv) => inv.apply(screen),
            None => screen,
        }
    }

    /// Screen → scene, inverting both the page matrix and the pan/zoom.
    #[must_use]
    pub fn screen_to_scene(&self, screen: Point) -> Point {
        let canvas = self.screen_to_canvas(screen);
        Point::new(
            (canvas.x - self.state.translate_x) / self.state.scale,
            (canvas.y - self.state.translate_y) / self.state.scale,
        )
    }

    /// Scene → screen.
    #[must_use]
    pub fn scene_to_screen(&self, scene: Point) -> Point {
        let canvas = Point::new(
            scene.x * self.state.scale + self.state.translate_x,
            scene.y * self.state.scale + self.state.translate_y,
        );
        self.screen_ctm.apply(canvas)
    }

    /// Zoom by `exp(log_delta)` keeping the scene point under `screen` fixed.
    ///
    /// Returns `false` (and changes nothing) when the clamped scale equals the
    /// current one, e.g. when already at a limit.
    #[allow(clippy::float_cmp)]
    pub fn zoom_at(&mut self, screen: Point, log_delta: f64) -> bool {
        if !log_delta.is_finite() {
            return false;
        }
        let new_scale = (self.state.scale * log_delta.exp()).clamp(self.limits.min, self.limits.max);
        if new_scale == self.state.scale {
            tracing::debug!(scale = new_scale, "zoom clamped; no change");
            return false;
        }
        let anchor_canvas = self.screen_to_canvas(screen);
        let anchor_scene = self.screen_to_scene(screen);
        self.state.translate_x = anchor_canvas.x - anchor_scene.x * new_scale;
        self.state.translate_y = anchor_canvas.y - anchor_scene.y * new_scale;
        self.state.scale = new_scale;
        true
    }

    /// Wheel zoom: wheel-up (negative `delta_y`) zooms in.
    pub fn zoom_wheel(&mut self, screen: Point, delta_y: f64, rate: f64) -> bool {
        self.zoom_at(screen, -delta_y * rate)
    }

    /// Zoom anchored at the centre of the canvas' on-screen rectangle.
    pub fn zoom_at_center(&mut self, canvas_rect: &BoundingBox, log_delta: f64) -> bool {
        self.zoom_at(canvas_rect.center(), log_delta)
    }

    /// Shift the content by a screen-space delta.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        if !(dx.is_finite() && dy.is_finite()) {
            return;
        }
        self.state.translate_x += dx;
        self.state.translate_y += dy;
    }

    /// Back to no translation and scale 1, or the nearest limit when 1 is
    /// outside the zoom range.
    pub fn reset(&mut self) {
        self.state = ViewportState { scale: self.limits.home_scale(), ..ViewportState::default() };
    }

    /// Whether the content is zoomed in far enough to be worth panning.
    #[must_use]
    pub fn can_pan(&self) -> bool {
        self.state.scale > CAN_PAN_THRESHOLD
    }

    /// Transform attribute for the layer carrying the whole scene.
    #[must_use]
    pub fn transform_attribute(&self) -> String {
        format!(
            "translate({} {}) scale({})",
            self.state.translate_x, self.state.translate_y, self.state.scale
        )
    }
}
