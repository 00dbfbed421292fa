//! Geometry primitives: points, axis-aligned boxes, point-list parsing, and the
//! 2D affine matrix used for the canvas' on-screen transform.
//!
//! Everything here is pure. Non-finite coordinates are skipped rather than
//! rejected, so a box computed from zero usable points comes back "empty"
//! (`min = +inf`, `max = -inf`) and callers detect that through
//! [`BoundingBox::is_degenerate`].

#[cfg(test)]
#[path = "geom_test.rs"]
mod geom_test;

use serde::{Deserialize, Serialize};

/// A point in screen, canvas, source, or scene space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Both coordinates are finite numbers.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Axis-aligned bounding box stored as extrema.
///
/// `width`/`height` are derived, so an empty box reports `-inf` for both.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// The box covering no points at all.
    pub const EMPTY: Self = Self {
        min_x: f64::INFINITY,
        min_y: f64::INFINITY,
        max_x: f64::NEG_INFINITY,
        max_y: f64::NEG_INFINITY,
    };

    /// Build a box from an origin and a size.
    #[must_use]
    pub fn from_rect(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { min_x: x, min_y: y, max_x: x + width, max_y: y + height }
    }

    #[must_use]
    pub fn x(&self) -> f64 {
        self.min_x
    }

    #[must_use]
    pub fn y(&self) -> f64 {
        self.min_y
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.min_x + self.width() / 2.0, self.min_y + self.height() / 2.0)
    }

    /// True when width or height is non-finite or not strictly positive.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        let (w, h) = (self.width(), self.height());
        !(w.is_finite() && h.is_finite()) || w <= 0.0 || h <= 0.0
    }

    /// True when no finite point has been folded into the box.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !(self.min_x <= self.max_x && self.min_y <= self.max_y)
    }

    /// Grow the box to include `p`. Non-finite points are ignored.
    pub fn include(&mut self, p: Point) {
        if !p.is_finite() {
            return;
        }
        self.min_x = self.min_x.min(p.x);
        self.min_y = self.min_y.min(p.y);
        self.max_x = self.max_x.max(p.x);
        self.max_y = self.max_y.max(p.y);
    }

    /// Smallest box covering both `self` and `other`. Empty boxes are neutral.
    #[must_use]
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        if other.is_empty() {
            return *self;
        }
        if self.is_empty() {
            return *other;
        }
        BoundingBox {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Corners in order: top-left, top-right, bottom-right, bottom-left.
    #[must_use]
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.min_x, self.min_y),
            Point::new(self.max_x, self.min_y),
            Point::new(self.max_x, self.max_y),
            Point::new(self.min_x, self.max_y),
        ]
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Minimal box covering every finite point in `points`.
///
/// Returns [`BoundingBox::EMPTY`] when no point is finite.
#[must_use]
pub fn bounding_box_of<'a, I>(points: I) -> BoundingBox
where
    I: IntoIterator<Item = &'a Point>,
{
    let mut bb = BoundingBox::EMPTY;
    for p in points {
        bb.include(*p);
    }
    bb
}

/// Result of parsing a whitespace-separated `"x,y"` point list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedPoints {
    pub points: Vec<Point>,
    /// Number of tokens that did not yield two finite numbers.
    pub dropped: usize,
}

/// Parse `"x,y x,y ..."`. Malformed tokens are counted and skipped.
#[must_use]
pub fn parse_points(text: &str) -> ParsedPoints {
    let mut out = ParsedPoints::default();
    for token in text.split_whitespace() {
        match parse_pair(token) {
            Some(p) => out.points.push(p),
            None => out.dropped += 1,
        }
    }
    out
}

fn parse_pair(token: &str) -> Option<Point> {
    let mut parts = token.split(',');
    let (Ok(x), Ok(y)) = (parts.next()?.trim().parse::<f64>(), parts.next()?.trim().parse::<f64>()) else {
        return None;
    };
    let p = Point::new(x, y);
    p.is_finite().then_some(p)
}

/// Format points back into the `"x,y x,y"` attribute form.
#[must_use]
pub fn format_points(points: &[Point]) -> String {
    points
        .iter()
        .map(|p| format!("{},{}", p.x, p.y))
        .collect::<Vec<_>>()
        .join(" ")
}

/// 2D affine matrix in SVG order: `x' = a·x + c·y + e`, `y' = b·x + d·y + f`.
///
/// Used for the canvas' user-space → screen transform, which the host reads
/// from the live page (it may be scaled or letterboxed).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenMatrix {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl ScreenMatrix {
    pub const IDENTITY: Self = Self { a: 1.0, b: 0.0, c: 0.0, d: 1.0, e: 0.0, f: 0.0 };

    /// Uniform scale followed by a translation.
    #[must_use]
    pub fn scale_translate(scale: f64, tx: f64, ty: f64) -> Self {
        Self { a: scale, b: 0.0, c: 0.0, d: scale, e: tx, f: ty }
    }

    #[must_use]
    pub fn apply(&self, p: Point) -> Point {
        Point::new(self.a * p.x + self.c * p.y + self.e, self.b * p.x + self.d * p.y + self.f)
    }

    /// Inverse matrix, or `None` when singular or non-finite.
    #[must_use]
    pub fn inverse(&self) -> Option<ScreenMatrix> {
        let det = self.a * self.d - self.b * self.c;
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        Some(ScreenMatrix {
            a: self.d / det,
            b: -self.b / det,
            c: -self.c / det,
            d: self.a / det,
            e: (self.c * self.f - self.d * self.e) / det,
            f: (self.b * self.e - self.a * self.f) / det,
        })
    }
}

impl Default for ScreenMatrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}
