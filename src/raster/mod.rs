pub mod font;
pub mod image_surface;

pub use font::{BlockFace, Font, GlyphFace, Typeface};
pub use image_surface::{PageImage, Palette};

use crate::core::geometry::{BBox, Point};

/// Logical colors a layout tree draws with; surfaces map them to pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Paint {
    Ink,
    Background,
    Overlay,
    TextOverlay,
}

/// Raster target the render traversal draws into.
pub trait Surface: Sized {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// New surface of the same kind, filled with the background color.
    fn offscreen(&self, width: u32, height: u32) -> Self;

    /// Draws one line of text with its top-left corner at `origin` and
    /// returns the tight extent of the pixels actually inked, if any.
    fn draw_text(&mut self, origin: Point, text: &str, font: &Font, paint: Paint) -> Option<BBox>;

    fn draw_line(&mut self, from: Point, to: Point, paint: Paint);

    /// Outline of `rect`.
    fn draw_rect(&mut self, rect: &BBox, paint: Paint);

    /// Closed outline through `points`.
    fn draw_polygon(&mut self, points: &[Point], paint: Paint);

    /// Copies `src` onto this surface with its top-left corner at `(x, y)`.
    fn composite(&mut self, src: &Self, x: i32, y: i32);

    /// Rotated copy, counter-clockwise by `degrees`, expanded to fit and
    /// resized back to the current dimensions. Exposed areas are filled
    /// with the background color.
    fn rotated(&self, degrees: f32) -> Self;
}
