//! Render traversal: draws a layout tree onto a [`Surface`].

use log::{debug, warn};

use crate::core::error::LayoutError;
use crate::core::geometry::{Axis, BBox, Point, Quad};
use crate::layout::leaves::{rotated_frame, rotation_applies};
use crate::layout::text::{fit_lines, CellMetrics};
use crate::layout::{Leaf, Node, Rotate, TextLeaf};
use crate::raster::{Paint, Surface};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Draw split lines, padding outlines, rotated frames and text extents
    /// over the rendered content.
    pub debug: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LeafOutcome {
    Drawn {
        lines: Vec<String>,
        /// Tight extent of the inked pixels, in the leaf's drawing frame.
        ink: Option<BBox>,
    },
    Skipped(LayoutError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeafVisit<'a> {
    pub leaf: &'a Leaf,
    pub bounds: BBox,
    pub outcome: LeafOutcome,
}

/// Per-leaf results of one render call, in traversal order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderReport<'a> {
    pub visits: Vec<LeafVisit<'a>>,
}

impl RenderReport<'_> {
    pub fn errors(&self) -> Vec<&LayoutError> {
        self.visits
            .iter()
            .filter_map(|visit| match &visit.outcome {
                LeafOutcome::Skipped(err) => Some(err),
                LeafOutcome::Drawn { .. } => None,
            })
            .collect()
    }

    pub fn degenerate_count(&self) -> usize {
        self.errors()
            .into_iter()
            .filter(|err| matches!(err, LayoutError::DegenerateBox(_)))
            .count()
    }

    pub fn unimplemented_count(&self) -> usize {
        self.errors()
            .into_iter()
            .filter(|err| matches!(err, LayoutError::UnimplementedLeaf(_)))
            .count()
    }

    /// True when every leaf was drawn.
    pub fn is_complete(&self) -> bool {
        self.errors().is_empty()
    }
}

/// Draws `node` laid out in `root` onto `surface`.
///
/// `root` is floored to whole pixels, so every resolved box is pixel
/// aligned. Degenerate boxes and unimplemented leaves are skipped and
/// recorded in the report; the rest of the tree is still drawn.
pub fn render<'a, S: Surface>(
    node: &'a Node,
    surface: &mut S,
    root: BBox,
    options: &RenderOptions,
) -> RenderReport<'a> {
    let mut report = RenderReport::default();
    render_node(node, surface, root.snapped(), options, &mut report);
    report
}

fn render_node<'a, S: Surface>(
    node: &'a Node,
    surface: &mut S,
    bbox: BBox,
    options: &RenderOptions,
    report: &mut RenderReport<'a>,
) {
    match node {
        Node::Split(split) => {
            let (first, second) = bbox.split(split.axis, split.ratio);
            render_node(&split.first, surface, first, options, report);
            render_node(&split.second, surface, second, options, report);

            if options.debug {
                let at = bbox.split_at(split.axis, split.ratio);
                let (from, to) = match split.axis {
                    Axis::X => (Point::new(at, bbox.y0), Point::new(at, bbox.y1)),
                    Axis::Y => (Point::new(bbox.x0, at), Point::new(bbox.x1, at)),
                };
                surface.draw_line(from, to, Paint::Overlay);
            }
        }
        Node::Pad(pad) => {
            let inner = bbox.pad(&pad.margins);
            render_node(&pad.child, surface, inner, options, report);

            if options.debug {
                surface.draw_rect(&inner, Paint::Overlay);
            }
        }
        Node::Rotate(rotate) => render_rotate(rotate, surface, bbox, options, report),
        Node::Leaf(leaf) => {
            let outcome = render_leaf(leaf, surface, bbox, options);
            report.visits.push(LeafVisit {
                leaf,
                bounds: bbox,
                outcome,
            });
        }
    }
}

fn render_rotate<'a, S: Surface>(
    rotate: &'a Rotate,
    surface: &mut S,
    bbox: BBox,
    options: &RenderOptions,
    report: &mut RenderReport<'a>,
) {
    if !rotation_applies(rotate.degrees, &bbox) {
        render_node(&rotate.child, surface, bbox, options, report);
        return;
    }

    let (local, to_parent) = rotated_frame(&bbox, rotate.degrees);
    debug!(
        "rotating {}x{} region by {} degrees",
        local.width(),
        local.height(),
        rotate.degrees
    );
    let mut buffer = surface.offscreen(local.width() as u32, local.height() as u32);
    render_node(&rotate.child, &mut buffer, local, options, report);
    let turned = buffer.rotated(rotate.degrees);
    surface.composite(&turned, bbox.x0 as i32, bbox.y0 as i32);

    if options.debug {
        let frame = Quad::from_box(&local, &to_parent);
        surface.draw_polygon(frame.points(), Paint::Overlay);
    }
}

fn render_leaf<S: Surface>(
    leaf: &Leaf,
    surface: &mut S,
    bbox: BBox,
    options: &RenderOptions,
) -> LeafOutcome {
    if bbox.is_degenerate() {
        warn!("skipping {} leaf with degenerate box {:?}", leaf.kind(), bbox);
        return LeafOutcome::Skipped(LayoutError::DegenerateBox(bbox));
    }

    match leaf {
        Leaf::Text(text) => render_text(text, surface, bbox, options),
        Leaf::Formula(_) | Leaf::Image(_) => {
            warn!("{} leaves are not rendered yet", leaf.kind());
            LeafOutcome::Skipped(LayoutError::UnimplementedLeaf(leaf.kind()))
        }
    }
}

fn render_text<S: Surface>(
    leaf: &TextLeaf,
    surface: &mut S,
    bbox: BBox,
    options: &RenderOptions,
) -> LeafOutcome {
    let cell = CellMetrics::of(&leaf.font);
    let lines = fit_lines(&leaf.text, &leaf.font, &bbox);

    let mut ink: Option<BBox> = None;
    for (row, line) in lines.iter().enumerate() {
        let origin = Point::new(bbox.x0, bbox.y0 + row as f32 * cell.height);
        if let Some(extent) = surface.draw_text(origin, line, &leaf.font, Paint::Ink) {
            ink = Some(ink.map_or(extent, |acc| acc.union(&extent)));
        }
    }

    if options.debug {
        if let Some(extent) = &ink {
            surface.draw_rect(extent, Paint::TextOverlay);
        }
    }
    LeafOutcome::Drawn { lines, ink }
}
