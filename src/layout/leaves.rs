//! Leaf enumeration with resolved geometry, used for ground-truth labels.

use crate::core::geometry::{rotated_extent, Affine, BBox, Geometry};
use crate::layout::{Leaf, Node};

/// A leaf together with where it ends up.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement<'a> {
    pub leaf: &'a Leaf,
    /// Box in the coordinate frame the leaf is drawn in. Below a rotation
    /// this is local to the rotation's off-screen buffer.
    pub bounds: BBox,
    /// Region the leaf covers on the page.
    pub geometry: Geometry,
}

/// Lazy depth-first walk over the leaves of a tree, first child first.
///
/// Uses an explicit stack so deep generated trees do not grow the call stack.
#[derive(Debug, Clone)]
pub struct Leaves<'a> {
    stack: Vec<(&'a Node, BBox, Affine)>,
}

impl<'a> Iterator for Leaves<'a> {
    type Item = Placement<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((node, bbox, transform)) = self.stack.pop() {
            match node {
                Node::Split(split) => {
                    let (first, second) = bbox.split(split.axis, split.ratio);
                    self.stack.push((&split.second, second, transform));
                    self.stack.push((&split.first, first, transform));
                }
                Node::Pad(pad) => {
                    self.stack.push((&pad.child, bbox.pad(&pad.margins), transform));
                }
                Node::Rotate(rotate) => {
                    if !rotation_applies(rotate.degrees, &bbox) {
                        self.stack.push((&rotate.child, bbox, transform));
                    } else {
                        let (local, to_parent) = rotated_frame(&bbox, rotate.degrees);
                        self.stack
                            .push((&rotate.child, local, transform.then(&to_parent)));
                    }
                }
                Node::Leaf(leaf) => {
                    return Some(Placement {
                        leaf,
                        bounds: bbox,
                        geometry: Geometry::resolve(&bbox, &transform),
                    });
                }
            }
        }
        None
    }
}

impl Node {
    /// Every leaf of the tree with its resolved geometry when the tree is
    /// laid out in `root`. The root is floored to whole pixels first, as
    /// [`render`](crate::layout::render::render) does.
    pub fn leaves(&self, root: BBox) -> Leaves<'_> {
        Leaves {
            stack: vec![(self, root.snapped(), Affine::IDENTITY)],
        }
    }
}

/// Whether a rotation transforms its content at all. When it does not (no
/// angle, or less than a pixel to rotate) the child is laid out directly in
/// `bbox`.
pub(crate) fn rotation_applies(degrees: f32, bbox: &BBox) -> bool {
    degrees != 0.0 && bbox.width() >= 1.0 && bbox.height() >= 1.0
}

/// Local box of a rotation's off-screen buffer and the transform from that
/// buffer to the rotation's parent frame.
///
/// Mirrors how rotated content is composited: rotated about the buffer
/// center, then scaled so the whole-pixel expanded extent fits back into
/// `bbox`.
pub(crate) fn rotated_frame(bbox: &BBox, degrees: f32) -> (BBox, Affine) {
    let (w, h) = (bbox.width(), bbox.height());
    let local = BBox::new(0.0, 0.0, w, h);

    let (fit_w, fit_h) = rotated_extent(w, h, degrees);
    let center = bbox.center();

    let to_parent = Affine::translate(center.x, center.y)
        .then(&Affine::scale(w / fit_w, h / fit_h))
        .then(&Affine::rotate(degrees))
        .then(&Affine::translate(-w / 2.0, -h / 2.0));
    (local, to_parent)
}
