use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use ab_glyph::{point, Font as _, FontArc, PxScale, ScaleFont};
use anyhow::{Context, Result};

use crate::core::model::FontInfo;

/// Glyph source used to measure and rasterize text.
pub trait Typeface: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    /// Advance width and line height of `ch` at `px` pixels.
    fn glyph_size(&self, ch: char, px: f32) -> (f32, f32);

    /// Rasterizes a single line of `text` with its top-left corner at the
    /// origin, reporting each covered pixel with a coverage in `0.0..=1.0`.
    fn rasterize(&self, text: &str, px: f32, plot: &mut dyn FnMut(i32, i32, f32));
}

/// A typeface at a given pixel size.
#[derive(Debug, Clone)]
pub struct Font {
    face: Arc<dyn Typeface>,
    size: f32,
}

impl Font {
    pub fn new(face: Arc<dyn Typeface>, size: f32) -> Self {
        Self { face, size }
    }

    pub fn face(&self) -> &dyn Typeface {
        self.face.as_ref()
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn info(&self) -> FontInfo {
        FontInfo {
            name: self.face.name().to_string(),
            size: self.size,
        }
    }
}

impl PartialEq for Font {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.face, &other.face) && self.size == other.size
    }
}

/// Built-in monospace face drawing every visible character as a solid block.
///
/// Needs no font file and produces the same pixels on every platform.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockFace;

impl BlockFace {
    const ADVANCE: f32 = 0.6;
    const CAP_TOP: f32 = 0.2;

    fn cell(px: f32) -> (i32, i32) {
        ((px * Self::ADVANCE).round() as i32, px.round() as i32)
    }
}

impl Typeface for BlockFace {
    fn name(&self) -> &str {
        "block"
    }

    fn glyph_size(&self, _ch: char, px: f32) -> (f32, f32) {
        let (w, h) = Self::cell(px);
        (w as f32, h as f32)
    }

    fn rasterize(&self, text: &str, px: f32, plot: &mut dyn FnMut(i32, i32, f32)) {
        let (cell_w, cell_h) = Self::cell(px);
        let top = (px * Self::CAP_TOP).round() as i32;
        for (idx, ch) in text.chars().enumerate() {
            if ch.is_whitespace() {
                continue;
            }
            let left = idx as i32 * cell_w;
            for y in top..cell_h {
                for x in (left + 1)..(left + cell_w - 1) {
                    plot(x, y, 1.0);
                }
            }
        }
    }
}

/// TrueType/OpenType face loaded with `ab_glyph`.
#[derive(Clone)]
pub struct GlyphFace {
    name: String,
    font: FontArc,
}

impl GlyphFace {
    pub fn open(path: &Path) -> Result<Self> {
        let data = fs::read(path)
            .with_context(|| format!("failed to read font file {}", path.display()))?;
        let font = FontArc::try_from_vec(data)
            .with_context(|| format!("failed to parse font file {}", path.display()))?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "font".to_string());
        Ok(Self { name, font })
    }
}

impl fmt::Debug for GlyphFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlyphFace").field("name", &self.name).finish()
    }
}

impl Typeface for GlyphFace {
    fn name(&self) -> &str {
        &self.name
    }

    fn glyph_size(&self, ch: char, px: f32) -> (f32, f32) {
        let scaled = self.font.as_scaled(PxScale::from(px));
        let advance = scaled.h_advance(self.font.glyph_id(ch));
        (advance, scaled.ascent() - scaled.descent())
    }

    fn rasterize(&self, text: &str, px: f32, plot: &mut dyn FnMut(i32, i32, f32)) {
        let scaled = self.font.as_scaled(PxScale::from(px));
        let mut caret = 0.0f32;
        let mut previous = None;
        for ch in text.chars() {
            let id = self.font.glyph_id(ch);
            if let Some(prev) = previous {
                caret += scaled.kern(prev, id);
            }
            let glyph = id.with_scale_and_position(px, point(caret, scaled.ascent()));
            caret += scaled.h_advance(id);
            previous = Some(id);

            if let Some(outlined) = self.font.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                let left = bounds.min.x as i32;
                let top = bounds.min.y as i32;
                outlined.draw(|gx, gy, coverage| {
                    plot(left + gx as i32, top + gy as i32, coverage);
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_face_skips_whitespace() {
        let mut plotted = Vec::new();
        BlockFace.rasterize("a b", 10.0, &mut |x, y, _| plotted.push((x, y)));

        // cell is 6x10, glyphs span columns 1..5 and rows 2..10
        assert_eq!(plotted.len(), 2 * 4 * 8);
        assert!(plotted.iter().all(|&(x, _)| !(6..12).contains(&x)));
        assert_eq!(plotted.iter().map(|p| p.0).min(), Some(1));
        assert_eq!(plotted.iter().map(|p| p.0).max(), Some(16));
        assert_eq!(plotted.iter().map(|p| p.1).min(), Some(2));
    }

    #[test]
    fn fonts_compare_by_face_identity() {
        let face: Arc<dyn Typeface> = Arc::new(BlockFace);
        let a = Font::new(face.clone(), 12.0);
        let b = Font::new(face, 12.0);
        let c = Font::new(Arc::new(BlockFace), 12.0);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.info().name, "block");
    }

    #[test]
    fn missing_font_file_is_reported() {
        let err = GlyphFace::open(Path::new("/nonexistent/font.ttf")).unwrap_err();
        assert!(err.to_string().contains("failed to read font file"));
    }
}
