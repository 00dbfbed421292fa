//! Interaction model: hover/lock state per shape, pointer gesture tracking,
//! and click-vs-drag classification.
//!
//! [`InteractionState`] holds the single global lock slot. Shapes are
//! `idle`, `hovered`, `locked`, or locked and hovered at once; which one is
//! derived from the lock slot and the hovered id, never stored per shape.
//!
//! [`InputState`] is the gesture in flight between pointer-down and
//! pointer-up. A shape press and a canvas pan are mutually exclusive: the
//! shape captures its pointer on press, so the canvas never sees that
//! stream's moves.

#[cfg(test)]
#[path = "interaction_test.rs"]
mod interaction_test;

use crate::geom::Point;

/// Identifier of a rendered shape (the polygon id).
pub type ShapeId = String;

/// Browser pointer identifier.
pub type PointerId = i32;

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

impl Button {
    /// Map a DOM `MouseEvent.button` code.
    #[must_use]
    pub fn from_code(code: i16) -> Self {
        match code {
            1 => Self::Middle,
            2 => Self::Secondary,
            _ => Self::Primary,
        }
    }
}

/// A keyboard key as reported by the browser (e.g. `"Escape"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn is_escape(&self) -> bool {
        self.0 == "Escape"
    }
}

/// How a shape should currently be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeDisplay {
    Idle,
    Hovered,
    Locked,
    /// The locked shape with the pointer over it.
    LockedHovered,
}

/// Outcome of a press/release pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    Click,
    Drag,
}

/// A press is a click when the pointer travelled at most `tolerance` pixels.
#[must_use]
pub fn classify_press(down: Point, up: Point, tolerance: f64) -> Gesture {
    if down.distance(up) <= tolerance { Gesture::Click } else { Gesture::Drag }
}

/// Side effects of a hover/lock transition, for the detail panel and styling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    ShowDetails { id: ShapeId, locked: bool },
    ClearDetails,
    /// Mark one shape (or none) as the active one.
    SetActive(Option<ShapeId>),
}

/// Hover/lock state shared by every shape on one canvas.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InteractionState {
    locked: Option<ShapeId>,
    hovered: Option<ShapeId>,
}

impl InteractionState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn locked_id(&self) -> Option<&str> {
        self.locked.as_deref()
    }

    #[must_use]
    pub fn hovered_id(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    #[must_use]
    pub fn display(&self, id: &str) -> ShapeDisplay {
        let locked = self.locked.as_deref() == Some(id);
        let hovered = self.hovered.as_deref() == Some(id);
        match (locked, hovered) {
            (true, true) => ShapeDisplay::LockedHovered,
            (true, false) => ShapeDisplay::Locked,
            (false, true) if self.locked.is_none() => ShapeDisplay::Hovered,
            _ => ShapeDisplay::Idle,
        }
    }

    /// Pointer entered `id`. Ignored while a different shape is locked.
    pub fn pointer_enter(&mut self, id: &str) -> Vec<Effect> {
        match self.locked.as_deref() {
            Some(locked) if locked != id => Vec::new(),
            locked => {
                let is_locked = locked.is_some();
                self.hovered = Some(id.to_string());
                vec![Effect::ShowDetails { id: id.to_string(), locked: is_locked }]
            }
        }
    }

    /// Pointer left `id`. The panel is only cleared when nothing is locked.
    pub fn pointer_leave(&mut self, id: &str) -> Vec<Effect> {
        if self.hovered.as_deref() == Some(id) {
            self.hovered = None;
        }
        if self.locked.is_some() { Vec::new() } else { vec![Effect::ClearDetails] }
    }

    /// A qualifying click on `id`: lock it, or unlock it if it already is.
    pub fn click(&mut self, id: &str) -> Vec<Effect> {
        if self.locked.as_deref() == Some(id) {
            tracing::debug!(id, "unlock");
            return self.clear_lock();
        }
        tracing::debug!(id, previous = ?self.locked, "lock");
        self.locked = Some(id.to_string());
        self.hovered = Some(id.to_string());
        vec![Effect::ShowDetails { id: id.to_string(), locked: true }, Effect::SetActive(Some(id.to_string()))]
    }

    /// Escape: drop any lock and return every shape to idle.
    pub fn escape(&mut self) -> Vec<Effect> {
        if self.locked.is_none() {
            return Vec::new();
        }
        tracing::debug!(id = ?self.locked, "unlock via escape");
        self.clear_lock()
    }

    fn clear_lock(&mut self) -> Vec<Effect> {
        self.locked = None;
        self.hovered = None;
        vec![Effect::ClearDetails, Effect::SetActive(None)]
    }
}

/// The gesture being tracked between pointer-down and pointer-up.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum InputState {
    /// No gesture in progress.
    #[default]
    Idle,
    /// The canvas is being dragged.
    Panning {
        pointer_id: PointerId,
        /// Screen position of the previous event, for the pan delta.
        last_screen: Point,
    },
    /// A shape holds pointer capture and waits for the release.
    PressingShape {
        shape_id: ShapeId,
        pointer_id: PointerId,
        down_screen: Point,
    },
}
