//! Alignment engine: fits the polygon set onto the artwork box.
//!
//! The fit is a similarity transform. The source box is scaled uniformly so it
//! fits both dimensions of the destination, centred in it, optionally rotated
//! about the destination centre, and finally nudged by the manual pixel
//! offsets. The order is fixed: scale + centre-translate → rotate → offset.
//!
//! A source box that is empty, zero-sized or non-finite cannot be fitted. In
//! that case the points are passed through in their source coordinate space;
//! the shapes still render, just unaligned.

#[cfg(test)]
#[path = "align_test.rs"]
mod align_test;

use serde::{Deserialize, Serialize};

use crate::geom::{BoundingBox, Point, bounding_box_of, parse_points};

/// Manual correction applied after the automatic fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FineTune {
    /// Uniform multiplier on the fitted scale.
    pub scale: f64,
    /// Pixel offset; positive moves right.
    pub dx: f64,
    /// Pixel offset; positive moves down.
    pub dy: f64,
    /// Rotation about the destination centre, in degrees.
    pub rotate_deg: f64,
}

impl FineTune {
    pub const IDENTITY: Self = Self { scale: 1.0, dx: 0.0, dy: 0.0, rotate_deg: 0.0 };
}

impl Default for FineTune {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// A polygon in the coordinate space it was authored in.
#[derive(Debug, Clone, PartialEq)]
pub struct SourcePolygon {
    pub id: String,
    pub points: Vec<Point>,
}

impl SourcePolygon {
    /// Parse a `"x,y x,y ..."` list, dropping malformed tokens.
    #[must_use]
    pub fn parse(id: &str, points: &str) -> Self {
        let parsed = parse_points(points);
        if parsed.dropped > 0 {
            tracing::warn!(id, dropped = parsed.dropped, "dropped malformed point tokens");
        }
        Self { id: id.to_string(), points: parsed.points }
    }
}

/// A polygon in artwork/scene space.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedPolygon {
    pub id: String,
    pub points: Vec<Point>,
}

/// The fitted similarity transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AlignmentTransform {
    /// Uniform scale, always finite and positive.
    pub scale: f64,
    pub translate_x: f64,
    pub translate_y: f64,
    pub rotate_radians: f64,
    /// Rotation pivot: the destination box centre.
    pub center_x: f64,
    pub center_y: f64,
    /// Fine-tune pixel offset, added last.
    pub offset_x: f64,
    pub offset_y: f64,
}

impl AlignmentTransform {
    /// Map one point: scale + translate, rotate about the pivot, then offset.
    #[must_use]
    pub fn map_point(&self, p: Point) -> Point {
        let mut x = p.x * self.scale + self.translate_x;
        let mut y = p.y * self.scale + self.translate_y;
        if self.rotate_radians != 0.0 {
            let (sin, cos) = self.rotate_radians.sin_cos();
            let (rx, ry) = (x - self.center_x, y - self.center_y);
            x = rx * cos - ry * sin + self.center_x;
            y = rx * sin + ry * cos + self.center_y;
        }
        Point::new(x + self.offset_x, y + self.offset_y)
    }
}

/// Outcome of [`compute_transform`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Alignment {
    Mapped(AlignmentTransform),
    /// The source box could not be fitted; points pass through unchanged.
    Unmappable,
}

impl Alignment {
    #[must_use]
    pub fn transform(&self) -> Option<&AlignmentTransform> {
        match self {
            Self::Mapped(t) => Some(t),
            Self::Unmappable => None,
        }
    }

    #[must_use]
    pub fn map_point(&self, p: Point) -> Point {
        match self {
            Self::Mapped(t) => t.map_point(p),
            Self::Unmappable => p,
        }
    }

    /// Map every point of `polygon`, preserving order and id.
    #[must_use]
    pub fn apply(&self, polygon: &SourcePolygon) -> RenderedPolygon {
        RenderedPolygon {
            id: polygon.id.clone(),
            points: polygon.points.iter().map(|p| self.map_point(*p)).collect(),
        }
    }
}

/// Fit `source` into `dest` and fold in the fine-tune correction.
#[must_use]
pub fn compute_transform(source: &BoundingBox, dest: &BoundingBox, fine: &FineTune) -> Alignment {
    if source.is_degenerate() {
        return Alignment::Unmappable;
    }
    let raw_scale = (dest.width() / source.width()).min(dest.height() / source.height());
    let scale = raw_scale * fine.scale;
    if !scale.is_finite() || scale <= 0.0 {
        tracing::warn!(raw_scale, fine_scale = fine.scale, "alignment scale is not positive");
        return Alignment::Unmappable;
    }

    let scaled_w = source.width() * scale;
    let scaled_h = source.height() * scale;
    let center = dest.center();

    Alignment::Mapped(AlignmentTransform {
        scale,
        translate_x: dest.x() + (dest.width() - scaled_w) / 2.0 - source.min_x * scale,
        translate_y: dest.y() + (dest.height() - scaled_h) / 2.0 - source.min_y * scale,
        rotate_radians: fine.rotate_deg.to_radians(),
        center_x: center.x,
        center_y: center.y,
        offset_x: fine.dx,
        offset_y: fine.dy,
    })
}

/// Box covering every finite point of every polygon.
#[must_use]
pub fn polygons_bbox(polygons: &[SourcePolygon]) -> BoundingBox {
    bounding_box_of(polygons.iter().flat_map(|p| p.points.iter()))
}

/// Fit the whole polygon set onto `dest` and map every polygon, 1:1 and in order.
#[must_use]
pub fn remap_polygons(polygons: &[SourcePolygon], dest: &BoundingBox, fine: &FineTune) -> (Alignment, Vec<RenderedPolygon>) {
    let source = polygons_bbox(polygons);
    let alignment = compute_transform(&source, dest, fine);
    if alignment == Alignment::Unmappable && !polygons.is_empty() {
        tracing::warn!(?source, "polygon box is degenerate; rendering unaligned source coordinates");
    }
    let rendered = polygons.iter().map(|p| alignment.apply(p)).collect();
    (alignment, rendered)
}
