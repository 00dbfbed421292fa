//! SVG emission for the polygon layer.
//!
//! Produces the `<g id="polys-layer">` fragment the host drops into the scene
//! next to the artwork. Read-only: it renders what [`OverlayCore`] holds and
//! never mutates it.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use crate::engine::{OverlayCore, Shape};
use crate::geom::{BoundingBox, format_points};
use crate::interaction::ShapeDisplay;

/// Identifier of the group carrying every polygon.
pub const LAYER_ID: &str = "polys-layer";

/// Render every shape as a `<polygon>` inside the layer group.
#[must_use]
pub fn render_layer(core: &OverlayCore) -> String {
    let mut out = format!("<g id=\"{LAYER_ID}\">\n");
    for shape in core.shapes() {
        out.push_str("  ");
        out.push_str(&render_shape(core, shape));
        out.push('\n');
    }
    out.push_str("</g>\n");
    out
}

/// Render the whole overlay document fragment: a view-box comment, then the
/// layer wrapped in the viewport transform.
#[must_use]
pub fn render_scene(core: &OverlayCore) -> String {
    let mut out = String::new();
    if let Some(bbox) = core.view_box() {
        out.push_str(&format!("<!-- viewBox=\"{}\" -->\n", view_box_attribute(&bbox)));
    }
    out.push_str(&format!("<g transform=\"{}\">\n", core.viewport().transform_attribute()));
    out.push_str(&render_layer(core));
    out.push_str("</g>\n");
    out
}

/// `x y width height`, as an SVG `viewBox` value.
#[must_use]
pub fn view_box_attribute(bbox: &BoundingBox) -> String {
    format!("{} {} {} {}", bbox.x(), bbox.y(), bbox.width(), bbox.height())
}

fn render_shape(core: &OverlayCore, shape: &Shape) -> String {
    let style = &core.config.style;
    let class = match core.display(&shape.id) {
        ShapeDisplay::Locked | ShapeDisplay::LockedHovered => " class=\"active\"",
        ShapeDisplay::Hovered => " class=\"hover\"",
        ShapeDisplay::Idle => "",
    };
    format!(
        "<polygon id=\"{id}\" points=\"{points}\"{class} data-status=\"{status}\" \
         style=\"fill:{fill};fill-opacity:{fo};stroke:{stroke};stroke-opacity:{so};stroke-width:{sw}\"/>",
        id = escape_attr(&shape.id),
        points = format_points(&shape.points),
        status = shape.status.as_str(),
        fill = escape_attr(&shape.fill),
        fo = style.fill_opacity,
        stroke = escape_attr(&style.stroke),
        so = style.stroke_opacity,
        sw = style.stroke_width,
    )
}

/// Escape text for use inside a double-quoted XML attribute.
#[must_use]
pub fn escape_attr(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
