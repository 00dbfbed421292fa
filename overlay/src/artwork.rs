//! Artwork locator: finds the background region the polygons must align to.
//!
//! The artwork is not tagged consistently across site plans, so the locator
//! walks a fixed preference order and takes the first match:
//!
//! 1. the node whose id is [`SITEPLAN_NODE_ID`],
//! 2. the largest embedded image (by its own width × height), reported as its
//!    nearest enclosing group when it has one,
//! 3. the first node carrying a clip-path,
//! 4. the scene's declared view region.
//!
//! A located node whose box is degenerate is not trusted; the view region is
//! used instead. Geometry queries go through [`SceneQuery`] so the chain can
//! be exercised against mock providers.

#[cfg(test)]
#[path = "artwork_test.rs"]
mod artwork_test;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_VIEW_BOX, SITEPLAN_NODE_ID};
use crate::geom::BoundingBox;

/// What a scene node is, as far as the locator cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Container whose box is the union of its children.
    Group,
    /// Embedded raster image.
    Image,
    /// Any other drawable with a declared box.
    Shape,
}

/// One node of the scene tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub kind: NodeKind,
    /// Clipping-region reference, if the node carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clip_path: Option<String>,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    /// An empty group.
    #[must_use]
    pub fn group(children: Vec<SceneNode>) -> Self {
        Self { id: None, kind: NodeKind::Group, clip_path: None, x: 0.0, y: 0.0, width: 0.0, height: 0.0, children }
    }

    /// A leaf image occupying the given rectangle.
    #[must_use]
    pub fn image(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { id: None, kind: NodeKind::Image, clip_path: None, x, y, width, height, children: Vec::new() }
    }

    /// A leaf shape occupying the given rectangle.
    #[must_use]
    pub fn shape(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { id: None, kind: NodeKind::Shape, clip_path: None, x, y, width, height, children: Vec::new() }
    }

    #[must_use]
    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    #[must_use]
    pub fn with_clip_path(mut self, clip: &str) -> Self {
        self.clip_path = Some(clip.to_string());
        self
    }

    /// Image area in local units; non-finite sizes count as zero.
    fn local_area(&self) -> f64 {
        let area = self.width * self.height;
        if area.is_finite() { area } else { 0.0 }
    }
}

/// The artwork document: a declared view region plus the root's children.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Declared view region as `[x, y, width, height]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_box: Option<[f64; 4]>,
    #[serde(default)]
    pub nodes: Vec<SceneNode>,
}

/// Geometry queries the locator needs from the rendering target.
pub trait SceneQuery {
    /// Box of `node` in scene units.
    fn node_box(&self, node: &SceneNode) -> BoundingBox;

    /// Declared view region of the whole scene.
    fn view_box(&self) -> BoundingBox;
}

impl SceneQuery for Scene {
    fn node_box(&self, node: &SceneNode) -> BoundingBox {
        match node.kind {
            NodeKind::Image | NodeKind::Shape => BoundingBox::from_rect(node.x, node.y, node.width, node.height),
            NodeKind::Group => node
                .children
                .iter()
                .fold(BoundingBox::EMPTY, |acc, child| acc.union(&self.node_box(child))),
        }
    }

    fn view_box(&self) -> BoundingBox {
        let [x, y, w, h] = self.view_box.unwrap_or(DEFAULT_VIEW_BOX);
        BoundingBox::from_rect(x, y, w, h)
    }
}

/// Which rule of the fallback chain picked the artwork.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtworkTier {
    SitePlan,
    LargestImage,
    ClipPath,
    ViewBox,
}

/// Result of [`locate_artwork`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LocatedArtwork {
    pub tier: ArtworkTier,
    pub bbox: BoundingBox,
    /// The tier's node had a degenerate box and the view region was used instead.
    pub degenerate_fallback: bool,
}

/// Pick the node the polygons should align to, without measuring it.
#[must_use]
pub fn find_artwork_node(scene: &Scene) -> Option<(ArtworkTier, &SceneNode)> {
    if let Some(node) = find_first(&scene.nodes, &|n| n.id.as_deref() == Some(SITEPLAN_NODE_ID)) {
        return Some((ArtworkTier::SitePlan, node));
    }
    if let Some(node) = largest_image_container(&scene.nodes) {
        return Some((ArtworkTier::LargestImage, node));
    }
    if let Some(node) = find_first(&scene.nodes, &|n| n.clip_path.is_some()) {
        return Some((ArtworkTier::ClipPath, node));
    }
    None
}

/// Locate the artwork and return its box, falling back to the view region.
#[must_use]
pub fn locate_artwork<Q: SceneQuery>(scene: &Scene, query: &Q) -> LocatedArtwork {
    let Some((tier, node)) = find_artwork_node(scene) else {
        return LocatedArtwork { tier: ArtworkTier::ViewBox, bbox: query.view_box(), degenerate_fallback: false };
    };
    let bbox = query.node_box(node);
    if bbox.is_degenerate() {
        tracing::warn!(?tier, ?bbox, "artwork box is degenerate; using the declared view region");
        return LocatedArtwork { tier, bbox: query.view_box(), degenerate_fallback: true };
    }
    LocatedArtwork { tier, bbox, degenerate_fallback: false }
}

/// Pre-order (document order) search.
fn find_first<'a, F>(nodes: &'a [SceneNode], pred: &F) -> Option<&'a SceneNode>
where
    F: Fn(&SceneNode) -> bool,
{
    for node in nodes {
        if pred(node) {
            return Some(node);
        }
        if let Some(found) = find_first(&node.children, pred) {
            return Some(found);
        }
    }
    None
}

struct ImageCandidate<'a> {
    area: f64,
    container: &'a SceneNode,
}

/// Largest image by local area; the first one wins ties. Returns the nearest
/// enclosing group, or the image itself when it sits directly under the root.
fn largest_image_container(nodes: &[SceneNode]) -> Option<&SceneNode> {
    let mut best: Option<ImageCandidate<'_>> = None;
    let mut ancestors: Vec<&SceneNode> = Vec::new();
    visit_images(nodes, &mut ancestors, &mut best);
    best.map(|c| c.container)
}

fn visit_images<'a>(
    nodes: &'a [SceneNode],
    ancestors: &mut Vec<&'a SceneNode>,
    best: &mut Option<ImageCandidate<'a>>,
) {
    for node in nodes {
        if node.kind == NodeKind::Image {
            let area = node.local_area();
            if best.as_ref().is_none_or(|b| area > b.area) {
                let container = ancestors
                    .iter()
                    .rev()
                    .find(|a| a.kind == NodeKind::Group)
                    .copied()
                    .unwrap_or(node);
                *best = Some(ImageCandidate { area, container });
            }
        }
        ancestors.push(node);
        visit_images(&node.children, ancestors, best);
        ancestors.pop();
    }
}
