//! Fixed-cell text fitting for text leaves.

use crate::core::geometry::BBox;
use crate::raster::Font;

/// Glyph whose size approximates the average character cell.
pub const REFERENCE_GLYPH: char = 'Z';
pub const LINE_SPACING: f32 = 1.2;
pub const LEADING: f32 = 4.0;

/// Character cell estimated from the reference glyph of a font.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellMetrics {
    pub width: f32,
    pub height: f32,
}

impl CellMetrics {
    pub fn of(font: &Font) -> Self {
        let (width, height) = font.face().glyph_size(REFERENCE_GLYPH, font.size());
        Self {
            width,
            height: (height * LINE_SPACING + LEADING).floor(),
        }
    }

    /// Characters per line and lines that fit in `bbox`.
    pub fn grid(&self, bbox: &BBox) -> (usize, usize) {
        if self.width <= 0.0 || self.height <= 0.0 {
            return (0, 0);
        }
        let columns = (bbox.width() / self.width).floor() as usize;
        let rows = (bbox.height() / self.height).floor() as usize;
        (columns, rows)
    }
}

/// Lines of `text` that fit into `bbox` with `font`, overflow dropped.
pub fn fit_lines(text: &str, font: &Font, bbox: &BBox) -> Vec<String> {
    let (columns, rows) = CellMetrics::of(font).grid(bbox);
    let mut lines = wrap(text, columns);
    lines.truncate(rows);
    lines
}

/// Greedy word wrap to at most `width` characters per line.
///
/// Whitespace runs collapse to single spaces and words longer than a line
/// are broken across lines.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    if width == 0 {
        return lines;
    }

    let mut current = String::new();
    let mut current_len = 0usize;
    for word in text.split_whitespace() {
        let mut chars: Vec<char> = word.chars().collect();

        if current_len > 0 && current_len + 1 + chars.len() <= width {
            current.push(' ');
            current.extend(chars.iter());
            current_len += 1 + chars.len();
            continue;
        }
        if current_len > 0 {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        while chars.len() > width {
            lines.push(chars.drain(..width).collect());
        }
        current.extend(chars.iter());
        current_len = chars.len();
    }
    if current_len > 0 {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::raster::BlockFace;
    use pretty_assertions::assert_eq;

    #[test]
    fn wraps_greedily() {
        assert_eq!(
            wrap("the quick brown fox jumps", 10),
            vec!["the quick", "brown fox", "jumps"]
        );
    }

    #[test]
    fn breaks_long_words_and_collapses_whitespace() {
        assert_eq!(
            wrap("    abcdefghij   xy", 4),
            vec!["abcd", "efgh", "ij", "xy"]
        );
    }

    #[test]
    fn zero_width_wraps_nothing() {
        assert!(wrap("hello", 0).is_empty());
        assert!(wrap("   ", 5).is_empty());
    }

    #[test]
    fn block_face_cell_metrics() {
        let font = Font::new(Arc::new(BlockFace), 12.0);
        let cell = CellMetrics::of(&font);
        // 'Z' is 7x12, line height floor(12 * 1.2 + 4)
        assert_eq!(cell, CellMetrics { width: 7.0, height: 18.0 });
        assert_eq!(cell.grid(&BBox::new(0.0, 0.0, 200.0, 50.0)), (28, 2));
    }

    #[test]
    fn overflowing_text_is_truncated() {
        let font = Font::new(Arc::new(BlockFace), 12.0);
        let lines = fit_lines("aaaa bbbb cccc dddd", &font, &BBox::new(0.0, 0.0, 35.0, 40.0));
        assert_eq!(lines, vec!["aaaa", "bbbb"]);
    }
}
