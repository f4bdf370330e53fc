//! Page layout trees.
//!
//! A [`Node`] recursively subdivides a rectangular page region; its leaves
//! render content into the sub-region they end up with. Positions are only
//! known once a root box is supplied, so the same tree can be rendered with
//! [`render::render`] or enumerated with [`Node::leaves`], and both resolve
//! boxes with the same rules.

pub mod generator;
pub mod leaves;
pub mod render;
pub mod text;

use std::fmt;
use std::path::PathBuf;

use crate::core::error::{LayoutError, Result};
use crate::core::geometry::{Axis, Margins};
use crate::raster::Font;

pub use leaves::{Leaves, Placement};
pub use render::{render, LeafOutcome, LeafVisit, RenderOptions, RenderReport};

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Split(Split),
    Pad(Pad),
    Rotate(Rotate),
    Leaf(Leaf),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    axis: Axis,
    ratio: f32,
    first: Box<Node>,
    second: Box<Node>,
}

impl Split {
    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn ratio(&self) -> f32 {
        self.ratio
    }

    /// Left child of an X split, top child of a Y split.
    pub fn first(&self) -> &Node {
        &self.first
    }

    pub fn second(&self) -> &Node {
        &self.second
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pad {
    margins: Margins,
    child: Box<Node>,
}

impl Pad {
    pub fn margins(&self) -> &Margins {
        &self.margins
    }

    pub fn child(&self) -> &Node {
        &self.child
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rotate {
    degrees: f32,
    child: Box<Node>,
}

impl Rotate {
    /// Counter-clockwise angle in `[0, 360)`.
    pub fn degrees(&self) -> f32 {
        self.degrees
    }

    pub fn child(&self) -> &Node {
        &self.child
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Leaf {
    Text(TextLeaf),
    Formula(FormulaLeaf),
    Image(ImageLeaf),
}

impl Leaf {
    pub fn kind(&self) -> &'static str {
        match self {
            Leaf::Text(_) => "text",
            Leaf::Formula(_) => "formula",
            Leaf::Image(_) => "image",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextLeaf {
    pub text: String,
    pub font: Font,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormulaLeaf {
    pub latex: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageLeaf {
    pub source: PathBuf,
}

fn check_fraction(
    what: &'static str,
    value: f32,
    range: &'static str,
    valid: impl Fn(f32) -> bool,
) -> Result<f32> {
    if value.is_finite() && valid(value) {
        Ok(value)
    } else {
        Err(LayoutError::InvalidLayoutRatio { what, range, value })
    }
}

impl Node {
    pub fn split(axis: Axis, ratio: f32, first: Node, second: Node) -> Result<Self> {
        let ratio = check_fraction("split ratio", ratio, "(0, 1)", |r| r > 0.0 && r < 1.0)?;
        Ok(Node::Split(Split {
            axis,
            ratio,
            first: Box::new(first),
            second: Box::new(second),
        }))
    }

    /// Side-by-side split: `left` gets the first `ratio` of the width.
    pub fn x_split(ratio: f32, left: Node, right: Node) -> Result<Self> {
        Self::split(Axis::X, ratio, left, right)
    }

    /// Stacked split: `top` gets the first `ratio` of the height.
    pub fn y_split(ratio: f32, top: Node, bottom: Node) -> Result<Self> {
        Self::split(Axis::Y, ratio, top, bottom)
    }

    pub fn pad(top: f32, left: f32, bottom: f32, right: f32, child: Node) -> Result<Self> {
        let in_range = |f: f32| (0.0..1.0).contains(&f);
        let margins = Margins {
            top: check_fraction("top padding", top, "[0, 1)", in_range)?,
            left: check_fraction("left padding", left, "[0, 1)", in_range)?,
            bottom: check_fraction("bottom padding", bottom, "[0, 1)", in_range)?,
            right: check_fraction("right padding", right, "[0, 1)", in_range)?,
        };
        Ok(Node::Pad(Pad {
            margins,
            child: Box::new(child),
        }))
    }

    /// Rotation by `degrees` counter-clockwise. A rotated child is unwrapped
    /// and the angles are summed, so rotations never nest.
    pub fn rotate(degrees: f32, child: Node) -> Result<Self> {
        if !degrees.is_finite() {
            return Err(LayoutError::InvalidAngle(degrees));
        }
        let (degrees, child) = match child {
            Node::Rotate(inner) => (degrees + inner.degrees, inner.child),
            other => (degrees, Box::new(other)),
        };
        Ok(Node::Rotate(Rotate {
            degrees: normalize_degrees(degrees),
            child,
        }))
    }

    pub fn text(text: impl Into<String>, font: Font) -> Self {
        Node::Leaf(Leaf::Text(TextLeaf {
            text: text.into(),
            font,
        }))
    }

    pub fn formula(latex: impl Into<String>) -> Self {
        Node::Leaf(Leaf::Formula(FormulaLeaf {
            latex: latex.into(),
        }))
    }

    pub fn image(source: impl Into<PathBuf>) -> Self {
        Node::Leaf(Leaf::Image(ImageLeaf {
            source: source.into(),
        }))
    }

    pub fn leaf_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match node {
                Node::Split(split) => {
                    stack.push(&split.second);
                    stack.push(&split.first);
                }
                Node::Pad(pad) => stack.push(&pad.child),
                Node::Rotate(rotate) => stack.push(&rotate.child),
                Node::Leaf(_) => count += 1,
            }
        }
        count
    }
}

fn normalize_degrees(degrees: f32) -> f32 {
    let normalized = degrees.rem_euclid(360.0);
    // rem_euclid may round up to exactly 360 for tiny negative inputs
    if normalized >= 360.0 {
        0.0
    } else {
        normalized
    }
}

fn preview(text: &str) -> String {
    const MAX: usize = 24;
    let trimmed = text.trim();
    if trimmed.chars().count() > MAX {
        let head: String = trimmed.chars().take(MAX).collect();
        format!("{head}...")
    } else {
        trimmed.to_string()
    }
}

/// Indented outline of the tree, one node per line.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut stack = vec![(self, 0usize)];
        while let Some((node, depth)) = stack.pop() {
            write!(f, "{:indent$}", "", indent = depth * 2)?;
            match node {
                Node::Split(split) => {
                    let name = match split.axis {
                        Axis::X => "XSplit",
                        Axis::Y => "YSplit",
                    };
                    writeln!(f, "{name}({:.3})", split.ratio)?;
                    stack.push((&split.second, depth + 1));
                    stack.push((&split.first, depth + 1));
                }
                Node::Pad(pad) => {
                    let m = &pad.margins;
                    writeln!(
                        f,
                        "Pad({:.3}, {:.3}, {:.3}, {:.3})",
                        m.top, m.left, m.bottom, m.right
                    )?;
                    stack.push((&pad.child, depth + 1));
                }
                Node::Rotate(rotate) => {
                    writeln!(f, "Rotate({:.1})", rotate.degrees)?;
                    stack.push((&rotate.child, depth + 1));
                }
                Node::Leaf(Leaf::Text(leaf)) => {
                    let info = leaf.font.info();
                    writeln!(
                        f,
                        "TextLeaf({:?}, {} {}px)",
                        preview(&leaf.text),
                        info.name,
                        info.size
                    )?;
                }
                Node::Leaf(Leaf::Formula(leaf)) => {
                    writeln!(f, "FormulaLeaf({:?})", preview(&leaf.latex))?;
                }
                Node::Leaf(Leaf::Image(leaf)) => {
                    writeln!(f, "ImageLeaf({})", leaf.source.display())?;
                }
            }
        }
        Ok(())
    }
}
