use thiserror::Error;

use crate::core::geometry::BBox;

/// Errors raised while building or traversing a layout tree.
///
/// Construction errors (`InvalidLayoutRatio`, `InvalidAngle`) fail the tree
/// build. `DegenerateBox` and `UnimplementedLeaf` are absorbed by the render
/// traversal and reported per leaf in its [`RenderReport`].
///
/// [`RenderReport`]: crate::layout::render::RenderReport
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("{what} must lie in {range}, got {value}")]
    InvalidLayoutRatio {
        what: &'static str,
        range: &'static str,
        value: f32,
    },

    #[error("rotation angle must be finite, got {0}")]
    InvalidAngle(f32),

    #[error("box ({}, {}, {}, {}) has no area", .0.x0, .0.y0, .0.x1, .0.y1)]
    DegenerateBox(BBox),

    #[error("{0} leaves cannot be rendered yet")]
    UnimplementedLeaf(&'static str),
}

pub type Result<T> = std::result::Result<T, LayoutError>;
