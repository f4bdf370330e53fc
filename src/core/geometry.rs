use serde::{Deserialize, Serialize};

/// Axis a split node divides its box along.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Fractional margins, top/bottom relative to the box height and left/right
/// relative to its width.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Margins {
    pub top: f32,
    pub left: f32,
    pub bottom: f32,
    pub right: f32,
}

impl Margins {
    pub fn new(top: f32, left: f32, bottom: f32, right: f32) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
        }
    }

    pub fn uniform(fraction: f32) -> Self {
        Self::new(fraction, fraction, fraction, fraction)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl BBox {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Box of `width x height` pixels anchored at the origin.
    pub fn sized(width: u32, height: u32) -> Self {
        Self::new(0.0, 0.0, width as f32, height as f32)
    }

    pub fn width(&self) -> f32 {
        (self.x1 - self.x0).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.y1 - self.y0).max(0.0)
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    pub fn is_degenerate(&self) -> bool {
        self.x1 - self.x0 <= 0.0 || self.y1 - self.y0 <= 0.0
    }

    pub fn center(&self) -> Point {
        Point::new((self.x0 + self.x1) * 0.5, (self.y0 + self.y1) * 0.5)
    }

    /// Corners in clockwise order starting at the top-left.
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.x0, self.y0),
            Point::new(self.x1, self.y0),
            Point::new(self.x1, self.y1),
            Point::new(self.x0, self.y1),
        ]
    }

    pub fn union(&self, other: &Self) -> Self {
        Self {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Box with every coordinate floored to a whole pixel.
    pub fn snapped(&self) -> Self {
        Self::new(self.x0.floor(), self.y0.floor(), self.x1.floor(), self.y1.floor())
    }

    /// Absolute coordinate at which `ratio` divides the box along `axis`.
    ///
    /// Floored once so that both halves share a pixel-identical edge.
    pub fn split_at(&self, axis: Axis, ratio: f32) -> f32 {
        let (start, end) = match axis {
            Axis::X => (self.x0, self.x1),
            Axis::Y => (self.y0, self.y1),
        };
        (start + ratio * (end - start)).floor()
    }

    /// Divides the box into a near and a far half along `axis`.
    pub fn split(&self, axis: Axis, ratio: f32) -> (Self, Self) {
        let at = self.split_at(axis, ratio);
        match axis {
            Axis::X => (
                Self::new(self.x0, self.y0, at, self.y1),
                Self::new(at, self.y0, self.x1, self.y1),
            ),
            Axis::Y => (
                Self::new(self.x0, self.y0, self.x1, at),
                Self::new(self.x0, at, self.x1, self.y1),
            ),
        }
    }

    /// Shrinks the box by fractional margins.
    ///
    /// Margins summing to one or more on an axis collapse that axis to a
    /// zero-size box at the near edge.
    pub fn pad(&self, margins: &Margins) -> Self {
        let w = self.width();
        let h = self.height();
        let x0 = self.x0 + (margins.left * w).floor();
        let y0 = self.y0 + (margins.top * h).floor();
        let x1 = (self.x1 - (margins.right * w).floor()).max(x0);
        let y1 = (self.y1 - (margins.bottom * h).floor()).max(y0);
        Self::new(x0, y0, x1, y1)
    }
}

/// 2D affine transform `(x, y) -> (a*x + b*y + c, d*x + e*y + f)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Affine {
    pub const IDENTITY: Self = Self {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 0.0,
        e: 1.0,
        f: 0.0,
    };

    pub fn translate(dx: f32, dy: f32) -> Self {
        Self {
            c: dx,
            f: dy,
            ..Self::IDENTITY
        }
    }

    pub fn scale(sx: f32, sy: f32) -> Self {
        Self {
            a: sx,
            e: sy,
            ..Self::IDENTITY
        }
    }

    /// Counter-clockwise rotation as seen on screen, where y grows downward.
    pub fn rotate(degrees: f32) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self {
            a: cos,
            b: sin,
            c: 0.0,
            d: -sin,
            e: cos,
            f: 0.0,
        }
    }

    /// `self ∘ other`: applies `other` first.
    pub fn then(&self, other: &Self) -> Self {
        Self {
            a: self.a * other.a + self.b * other.d,
            b: self.a * other.b + self.b * other.e,
            c: self.a * other.c + self.b * other.f + self.c,
            d: self.d * other.a + self.e * other.d,
            e: self.d * other.b + self.e * other.e,
            f: self.d * other.c + self.e * other.f + self.f,
        }
    }

    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            self.a * p.x + self.b * p.y + self.c,
            self.d * p.x + self.e * p.y + self.f,
        )
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

/// Whole-pixel extent of a `width x height` box rotated by `degrees`,
/// at least one pixel on each axis.
pub fn rotated_extent(width: f32, height: f32, degrees: f32) -> (f32, f32) {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let fit_w = (width * cos.abs() + height * sin.abs()).round().max(1.0);
    let fit_h = (width * sin.abs() + height * cos.abs()).round().max(1.0);
    (fit_w, fit_h)
}

/// Quadrilateral given by its four corners, in the order of [`BBox::corners`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Quad(pub [Point; 4]);

impl Quad {
    pub fn from_box(bbox: &BBox, transform: &Affine) -> Self {
        Quad(bbox.corners().map(|p| transform.apply(p)))
    }

    pub fn points(&self) -> &[Point; 4] {
        &self.0
    }

    pub fn centroid(&self) -> Point {
        let (sx, sy) = self
            .0
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        Point::new(sx / 4.0, sy / 4.0)
    }

    /// Axis-aligned box enclosing all four corners.
    pub fn bounds(&self) -> BBox {
        let first = BBox::new(self.0[0].x, self.0[0].y, self.0[0].x, self.0[0].y);
        self.0.iter().skip(1).fold(first, |acc, p| {
            acc.union(&BBox::new(p.x, p.y, p.x, p.y))
        })
    }
}

/// Resolved page-space geometry of a leaf.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Geometry {
    Rect { bbox: BBox },
    Quad { quad: Quad },
}

impl Geometry {
    /// Maps a box through `transform`, staying axis-aligned when no
    /// rotation is involved.
    pub fn resolve(bbox: &BBox, transform: &Affine) -> Self {
        if transform.is_identity() {
            Geometry::Rect { bbox: *bbox }
        } else {
            Geometry::Quad {
                quad: Quad::from_box(bbox, transform),
            }
        }
    }

    pub fn bounds(&self) -> BBox {
        match self {
            Geometry::Rect { bbox } => *bbox,
            Geometry::Quad { quad } => quad.bounds(),
        }
    }
}
