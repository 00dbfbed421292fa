use crate::align::{Alignment, remap_polygons};
use crate::artwork::{LocatedArtwork, Scene, SceneQuery, locate_artwork};
use crate::config::OverlayConfig;
use crate::geom::{BoundingBox, Point, ScreenMatrix};
use crate::interaction::{
    Button, Effect, Gesture, InputState, InteractionState, Key, PointerId, ShapeDisplay, ShapeId, classify_press,
};
use crate::records::{RawPolygon, StatusKey, StatusMap, StatusRecord};
use crate::viewport::{Viewport, ViewportState};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// What a pointer-down landed on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointerTarget {
    /// A polygon in the shapes layer.
    Shape(ShapeId),
    /// Anywhere else on the canvas (artwork, background).
    Canvas,
}

/// Payload for the detail panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Details {
    /// Record id when known, else the shape id.
    pub label: String,
    pub status: StatusKey,
    /// Status text as written, or the status key when the sheet had none.
    pub raw_status: String,
    pub attributes: Vec<(String, String)>,
    pub locked: bool,
}

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    ShowDetails(Details),
    ClearDetails,
    /// Mark this shape (or none) as the active one.
    SetActive(Option<ShapeId>),
    CapturePointer { target: PointerTarget, pointer_id: PointerId },
    ReleasePointer { target: PointerTarget, pointer_id: PointerId },
    /// Re-apply the viewport transform to the scene layer.
    ViewportChanged(ViewportState),
    /// Toggle the "grabbing" cursor while the canvas is dragged.
    SetGrabbing(bool),
}

/// A polygon ready to draw, with its status resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub id: ShapeId,
    /// Points in scene space.
    pub points: Vec<Point>,
    pub status: StatusKey,
    pub fill: String,
    pub record: Option<StatusRecord>,
}

/// Scene controller: owns the shapes, the viewport, and the interaction state.
///
/// Holds no browser handles, so the whole event flow can be driven with
/// synthetic events.
pub struct OverlayCore {
    pub config: OverlayConfig,
    shapes: Vec<Shape>,
    artwork: Option<LocatedArtwork>,
    alignment: Alignment,
    viewport: Viewport,
    interaction: InteractionState,
    input: InputState,
}

impl Default for OverlayCore {
    fn default() -> Self {
        Self::new(OverlayConfig::default())
    }
}

impl OverlayCore {
    #[must_use]
    pub fn new(config: OverlayConfig) -> Self {
        let viewport = Viewport::new(config.zoom.limits());
        Self {
            config,
            shapes: Vec::new(),
            artwork: None,
            alignment: Alignment::Unmappable,
            viewport,
            interaction: InteractionState::new(),
            input: InputState::Idle,
        }
    }

    // --- Data inputs ---

    /// Locate the artwork, fit the polygons onto it, and rebuild every shape.
    ///
    /// Replaces the previous shape set wholesale. A canvas pan in flight
    /// survives, since it only touches the viewport. A shape press, lock or
    /// hover referred to the old shapes and is dropped; the returned actions
    /// release that capture and clear the panel and active marker. Either
    /// source may be empty: missing status rows render as `unknown`, missing
    /// polygons leave the layer empty.
    pub fn load<Q: SceneQuery>(
        &mut self,
        scene: &Scene,
        query: &Q,
        polygons: &[RawPolygon],
        statuses: &StatusMap,
    ) -> Vec<Action> {
        let artwork = locate_artwork(scene, query);
        let sources: Vec<_> = polygons.iter().map(RawPolygon::to_source).collect();
        let (alignment, rendered) = remap_polygons(&sources, &artwork.bbox, &self.config.fine_tune);

        self.shapes = rendered
            .into_iter()
            .map(|poly| {
                let record = statuses.lookup(&poly.id).cloned();
                let status = record.as_ref().map_or(StatusKey::Unknown, |r| r.status);
                let fill = self.config.colors.for_status(status).to_string();
                Shape { id: poly.id, points: poly.points, status, fill, record }
            })
            .collect();
        self.artwork = Some(artwork);
        self.alignment = alignment;
        let actions = self.drop_shape_state();

        tracing::info!(
            shapes = self.shapes.len(),
            statuses = statuses.len(),
            tier = ?artwork.tier,
            mapped = alignment.transform().is_some(),
            "overlay loaded"
        );
        actions
    }

    /// Record the canvas' current on-screen matrix.
    pub fn set_screen_ctm(&mut self, ctm: ScreenMatrix) {
        self.viewport.set_screen_ctm(ctm);
    }

    // --- Shape events ---

    pub fn on_pointer_enter(&mut self, id: &str) -> Vec<Action> {
        if self.shape(id).is_none() {
            tracing::warn!(id, "pointer-enter for unknown shape");
            return Vec::new();
        }
        let effects = self.interaction.pointer_enter(id);
        self.effects_to_actions(effects)
    }

    pub fn on_pointer_leave(&mut self, id: &str) -> Vec<Action> {
        if self.shape(id).is_none() {
            return Vec::new();
        }
        let effects = self.interaction.pointer_leave(id);
        self.effects_to_actions(effects)
    }

    // --- Pointer stream ---

    /// Pointer pressed on `target`.
    ///
    /// A shape press captures the pointer before any state changes, so the
    /// canvas never pans from the same gesture. The canvas only pans on the
    /// primary button and never for targets inside the shapes layer.
    pub fn on_pointer_down(&mut self, target: PointerTarget, pointer_id: PointerId, button: Button, screen: Point) -> Vec<Action> {
        if !self.accepts_new_press(pointer_id) {
            return Vec::new();
        }
        match target {
            PointerTarget::Shape(shape_id) => {
                if self.shape(&shape_id).is_none() {
                    tracing::warn!(id = %shape_id, "pointer-down on unknown shape");
                    return Vec::new();
                }
                let capture = Action::CapturePointer { target: PointerTarget::Shape(shape_id.clone()), pointer_id };
                self.input = InputState::PressingShape { shape_id, pointer_id, down_screen: screen };
                vec![capture]
            }
            PointerTarget::Canvas => {
                if button != Button::Primary {
                    return Vec::new();
                }
                let capture = Action::CapturePointer { target: PointerTarget::Canvas, pointer_id };
                self.input = InputState::Panning { pointer_id, last_screen: screen };
                vec![capture, Action::SetGrabbing(true)]
            }
        }
    }

    pub fn on_pointer_move(&mut self, pointer_id: PointerId, screen: Point) -> Vec<Action> {
        let InputState::Panning { pointer_id: active, last_screen } = &mut self.input else {
            return Vec::new();
        };
        if *active != pointer_id {
            return Vec::new();
        }
        let (dx, dy) = (screen.x - last_screen.x, screen.y - last_screen.y);
        *last_screen = screen;
        self.viewport.pan(dx, dy);
        vec![Action::ViewportChanged(self.viewport.state())]
    }

    /// Pointer released. A shape press within the click tolerance toggles its
    /// lock; a longer travel is a drag and changes nothing. A release with no
    /// matching press is ignored.
    pub fn on_pointer_up(&mut self, pointer_id: PointerId, screen: Point) -> Vec<Action> {
        match std::mem::take(&mut self.input) {
            InputState::PressingShape { shape_id, pointer_id: active, down_screen } if active == pointer_id => {
                let mut actions = vec![Action::ReleasePointer { target: PointerTarget::Shape(shape_id.clone()), pointer_id }];
                match classify_press(down_screen, screen, self.config.click_tolerance_px) {
                    Gesture::Click => {
                        let effects = self.interaction.click(&shape_id);
                        actions.extend(self.effects_to_actions(effects));
                    }
                    Gesture::Drag => tracing::debug!(id = %shape_id, "press reclassified as drag"),
                }
                actions
            }
            InputState::Panning { pointer_id: active, .. } if active == pointer_id => {
                vec![Action::ReleasePointer { target: PointerTarget::Canvas, pointer_id }, Action::SetGrabbing(false)]
            }
            other => {
                self.input = other;
                Vec::new()
            }
        }
    }

    /// The browser abandoned the pointer stream; no click is produced.
    pub fn on_pointer_cancel(&mut self, pointer_id: PointerId) -> Vec<Action> {
        match std::mem::take(&mut self.input) {
            InputState::PressingShape { shape_id, pointer_id: active, .. } if active == pointer_id => {
                vec![Action::ReleasePointer { target: PointerTarget::Shape(shape_id), pointer_id }]
            }
            InputState::Panning { pointer_id: active, .. } if active == pointer_id => {
                vec![Action::ReleasePointer { target: PointerTarget::Canvas, pointer_id }, Action::SetGrabbing(false)]
            }
            other => {
                self.input = other;
                Vec::new()
            }
        }
    }

    // --- Wheel / keys / buttons ---

    pub fn on_wheel(&mut self, screen: Point, delta_y: f64) -> Vec<Action> {
        let changed = self.viewport.zoom_wheel(screen, delta_y, self.config.zoom.wheel_rate);
        self.viewport_actions(changed)
    }

    pub fn on_key_down(&mut self, key: &Key) -> Vec<Action> {
        if !key.is_escape() {
            return Vec::new();
        }
        let effects = self.interaction.escape();
        self.effects_to_actions(effects)
    }

    /// Zoom-in button: step about the centre of the canvas' on-screen rect.
    pub fn zoom_in(&mut self, canvas_rect: &BoundingBox) -> Vec<Action> {
        let changed = self.viewport.zoom_at_center(canvas_rect, self.config.zoom.button_step);
        self.viewport_actions(changed)
    }

    pub fn zoom_out(&mut self, canvas_rect: &BoundingBox) -> Vec<Action> {
        let changed = self.viewport.zoom_at_center(canvas_rect, -self.config.zoom.button_step);
        self.viewport_actions(changed)
    }

    pub fn zoom_reset(&mut self) -> Vec<Action> {
        self.viewport.reset();
        vec![Action::ViewportChanged(self.viewport.state())]
    }

    // --- Queries ---

    #[must_use]
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    #[must_use]
    pub fn shape(&self, id: &str) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.id == id)
    }

    #[must_use]
    pub fn display(&self, id: &str) -> ShapeDisplay {
        self.interaction.display(id)
    }

    #[must_use]
    pub fn locked_id(&self) -> Option<&str> {
        self.interaction.locked_id()
    }

    #[must_use]
    pub fn input(&self) -> &InputState {
        &self.input
    }

    #[must_use]
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    #[must_use]
    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    #[must_use]
    pub fn artwork(&self) -> Option<&LocatedArtwork> {
        self.artwork.as_ref()
    }

    /// View region the scene should be fitted to: the artwork box once loaded.
    #[must_use]
    pub fn view_box(&self) -> Option<BoundingBox> {
        self.artwork.map(|a| a.bbox)
    }

    /// Detail-panel payload for a shape.
    #[must_use]
    pub fn details(&self, id: &str, locked: bool) -> Details {
        let record = self.shape(id).and_then(|s| s.record.as_ref());
        let status = record.map_or(StatusKey::Unknown, |r| r.status);
        let raw_status = match record {
            Some(r) if !r.raw_status.is_empty() => r.raw_status.clone(),
            _ => status.as_str().to_string(),
        };
        let attributes = record.map_or_else(Vec::new, |r| {
            r.attributes
                .iter()
                .map(|(k, v)| (k.clone(), self.decorate_attribute(k, v)))
                .collect()
        });
        Details { label: record.map_or_else(|| id.to_string(), |r| r.id.clone()), status, raw_status, attributes, locked }
    }

    // --- Internals ---

    /// Forget every reference to the current shapes, returning what the host
    /// must undo. Pan gestures are left alone.
    fn drop_shape_state(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        match std::mem::take(&mut self.input) {
            InputState::PressingShape { shape_id, pointer_id, .. } => {
                actions.push(Action::ReleasePointer { target: PointerTarget::Shape(shape_id), pointer_id });
            }
            other => self.input = other,
        }
        let locked = self.interaction.locked_id().is_some();
        if locked || self.interaction.hovered_id().is_some() {
            actions.push(Action::ClearDetails);
        }
        if locked {
            actions.push(Action::SetActive(None));
        }
        self.interaction = InteractionState::new();
        actions
    }

    /// A new press may start when idle, or replace a stale gesture on the same pointer.
    fn accepts_new_press(&self, pointer_id: PointerId) -> bool {
        match &self.input {
            InputState::Idle => true,
            InputState::Panning { pointer_id: active, .. } | InputState::PressingShape { pointer_id: active, .. } => {
                *active == pointer_id
            }
        }
    }

    fn decorate_attribute(&self, key: &str, value: &str) -> String {
        let is_size = self
            .config
            .size_column
            .as_deref()
            .is_some_and(|col| col.trim().eq_ignore_ascii_case(key.trim()));
        if is_size && !value.is_empty() { format!("{value} m²") } else { value.to_string() }
    }

    fn viewport_actions(&self, changed: bool) -> Vec<Action> {
        if changed { vec![Action::ViewportChanged(self.viewport.state())] } else { Vec::new() }
    }

    fn effects_to_actions(&self, effects: Vec<Effect>) -> Vec<Action> {
        effects
            .into_iter()
            .map(|effect| match effect {
                Effect::ShowDetails { id, locked } => Action::ShowDetails(self.details(&id, locked)),
                Effect::ClearDetails => Action::ClearDetails,
                Effect::SetActive(id) => Action::SetActive(id),
            })
            .collect()
    }
}
