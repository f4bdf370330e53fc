//! Random page layouts for synthetic training pages.

use std::sync::Arc;

use rand::Rng;
use serde::Serialize;

use crate::core::error::{LayoutError, Result};
use crate::layout::Node;
use crate::raster::{BlockFace, Font, Typeface};

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ          ";

#[derive(Debug, Clone, Serialize)]
pub struct GeneratorConfig {
    /// Splits forced above every leaf.
    pub min_depth: u32,
    /// Splits allowed above any leaf.
    pub max_depth: u32,
    /// Split ratios are drawn uniformly from this range.
    pub split_range: (f32, f32),
    /// Fraction of the region left blank on every side of a text leaf.
    pub padding: f32,
    pub text_length: usize,
    pub indent: usize,
    /// Font pixel sizes, inclusive.
    pub font_sizes: (u32, u32),
    /// Largest absolute tilt of a text leaf in degrees; 0 disables rotation.
    pub max_rotation: f32,
    /// Probability that a text leaf is tilted.
    pub rotation_chance: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            min_depth: 1,
            max_depth: 3,
            split_range: (0.2, 0.8),
            padding: 0.05,
            text_length: 3000,
            indent: 4,
            font_sizes: (8, 16),
            max_rotation: 0.0,
            rotation_chance: 0.5,
        }
    }
}

/// Builds random layout trees from a fixed set of typefaces.
#[derive(Debug, Clone)]
pub struct TreeGenerator {
    config: GeneratorConfig,
    faces: Vec<Arc<dyn Typeface>>,
}

impl TreeGenerator {
    /// Falls back to [`BlockFace`] when `faces` is empty.
    pub fn new(config: GeneratorConfig, mut faces: Vec<Arc<dyn Typeface>>) -> Self {
        if faces.is_empty() {
            faces.push(Arc::new(BlockFace));
        }
        Self { config, faces }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn generate<R: Rng>(&self, rng: &mut R) -> Result<Node> {
        if !self.config.max_rotation.is_finite() {
            return Err(LayoutError::InvalidAngle(self.config.max_rotation));
        }
        self.subtree(rng, self.config.min_depth, self.config.max_depth)
    }

    fn subtree<R: Rng>(&self, rng: &mut R, min_depth: u32, max_depth: u32) -> Result<Node> {
        let choice = if min_depth == 0 {
            rng.random_range(0..3)
        } else {
            rng.random_range(1..3)
        };
        if choice == 0 || max_depth == 0 {
            return self.text_leaf(rng);
        }

        let (low, high) = self.config.split_range;
        let ratio = low + (high - low) * rng.random::<f32>();
        let first = self.subtree(rng, min_depth.saturating_sub(1), max_depth - 1)?;
        let second = self.subtree(rng, min_depth.saturating_sub(1), max_depth - 1)?;
        if choice == 1 {
            Node::y_split(ratio, first, second)
        } else {
            Node::x_split(ratio, first, second)
        }
    }

    fn text_leaf<R: Rng>(&self, rng: &mut R) -> Result<Node> {
        let face = self.faces[rng.random_range(0..self.faces.len())].clone();
        let (min_size, max_size) = self.config.font_sizes;
        let size = rng.random_range(min_size..=max_size.max(min_size));
        let text = format!(
            "{}{}",
            " ".repeat(self.config.indent),
            random_string(rng, self.config.text_length)
        );

        let p = self.config.padding;
        let mut node = Node::pad(p, p, p, p, Node::text(text, Font::new(face, size as f32)))?;
        let max_rotation = self.config.max_rotation.abs();
        if max_rotation > 0.0 && rng.random_bool(self.config.rotation_chance.clamp(0.0, 1.0)) {
            let degrees = rng.random_range(-max_rotation..=max_rotation);
            node = Node::rotate(degrees, node)?;
        }
        Ok(node)
    }
}

/// Letters mixed with spaces, about one character in six a space.
pub fn random_string<R: Rng>(rng: &mut R, length: usize) -> String {
    (0..length)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::layout::{Leaf, Node};

    fn generator(config: GeneratorConfig) -> TreeGenerator {
        TreeGenerator::new(config, Vec::new())
    }

    #[test]
    fn same_seed_builds_same_tree() {
        let generator = generator(GeneratorConfig::default());
        let a = generator.generate(&mut StdRng::seed_from_u64(7)).unwrap();
        let b = generator.generate(&mut StdRng::seed_from_u64(7)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn min_depth_forces_a_split_at_the_root() {
        let generator = generator(GeneratorConfig::default());
        for seed in 0..20 {
            let tree = generator.generate(&mut StdRng::seed_from_u64(seed)).unwrap();
            assert!(matches!(tree, Node::Split(_)));
            assert!(tree.leaf_count() <= 8);
        }
    }

    #[test]
    fn zero_max_depth_builds_a_single_padded_leaf() {
        let generator = generator(GeneratorConfig {
            min_depth: 0,
            max_depth: 0,
            text_length: 50,
            ..GeneratorConfig::default()
        });
        let tree = generator.generate(&mut StdRng::seed_from_u64(1)).unwrap();
        let Node::Pad(pad) = &tree else {
            panic!("expected a padded leaf, got {tree}");
        };
        let Node::Leaf(Leaf::Text(leaf)) = pad.child() else {
            panic!("expected a text leaf");
        };
        assert!(leaf.text.starts_with("    "));
        assert_eq!(leaf.text.chars().count(), 54);
        assert!((8.0..=16.0).contains(&leaf.font.size()));
    }

    #[test]
    fn rotation_wraps_padded_leaves() {
        let generator = generator(GeneratorConfig {
            min_depth: 0,
            max_depth: 0,
            max_rotation: 10.0,
            rotation_chance: 1.0,
            ..GeneratorConfig::default()
        });
        let tree = generator.generate(&mut StdRng::seed_from_u64(3)).unwrap();
        let Node::Rotate(rotate) = &tree else {
            panic!("expected a rotated leaf, got {tree}");
        };
        let degrees = rotate.degrees();
        assert!(degrees <= 10.0 || degrees >= 350.0);
        assert!(matches!(rotate.child(), Node::Pad(_)));
    }

    #[test]
    fn non_finite_max_rotation_is_rejected() {
        for max_rotation in [f32::INFINITY, f32::NEG_INFINITY, f32::NAN] {
            let generator = generator(GeneratorConfig {
                min_depth: 0,
                max_depth: 0,
                max_rotation,
                rotation_chance: 1.0,
                ..GeneratorConfig::default()
            });
            let err = generator
                .generate(&mut StdRng::seed_from_u64(5))
                .unwrap_err();
            assert!(matches!(err, LayoutError::InvalidAngle(_)));
        }
    }

    #[test]
    fn random_string_uses_letters_and_spaces() {
        let text = random_string(&mut StdRng::seed_from_u64(11), 500);
        assert_eq!(text.len(), 500);
        assert!(text.chars().all(|c| c.is_ascii_alphabetic() || c == ' '));
        assert!(text.contains(' '));
    }
}
