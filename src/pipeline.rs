use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::core::geometry::BBox;
use crate::core::model::{DatasetTruth, PageDebug, PageTruth, Region};
use crate::export::html_debug_export::HtmlDebugExporter;
use crate::export::json_export::JsonExporter;
use crate::export::text_export::TextExporter;
use crate::export::Exporter;
use crate::layout::generator::{GeneratorConfig, TreeGenerator};
use crate::layout::text::fit_lines;
use crate::layout::{render, Leaf, Node, RenderOptions, RenderReport};
use crate::raster::{GlyphFace, PageImage, Typeface};

#[derive(Debug, Clone, Serialize)]
pub struct PipelineConfig {
    pub output: PathBuf,
    pub pages: usize,
    pub width: u32,
    pub height: u32,
    pub seed: u64,
    /// Font files to draw leaves with; empty selects the built-in block face.
    pub fonts: Vec<PathBuf>,
    /// Also write overlay images and keep the tree outline in the ground truth.
    pub debug: bool,
    pub grayscale: bool,
    pub generator: GeneratorConfig,
}

impl PipelineConfig {
    pub fn new(output: PathBuf, pages: usize) -> Self {
        Self {
            output,
            pages,
            width: 1800,
            height: 1000,
            seed: 0,
            fonts: Vec::new(),
            debug: false,
            grayscale: true,
            generator: GeneratorConfig::default(),
        }
    }
}

pub fn load_faces(paths: &[PathBuf]) -> Result<Vec<Arc<dyn Typeface>>> {
    paths
        .iter()
        .map(|path| {
            let face = GlyphFace::open(path)?;
            debug!("loaded font {}", path.display());
            Ok(Arc::new(face) as Arc<dyn Typeface>)
        })
        .collect()
}

pub fn page_image_name(page_idx: usize) -> String {
    format!("page_{:04}.png", page_idx + 1)
}

/// Ground-truth regions for every leaf of `tree` laid out in `root`.
///
/// Leaves without area and text leaves with no fitting line are left out,
/// since nothing of them reaches the page.
pub fn page_regions(tree: &Node, root: BBox) -> Vec<Region> {
    tree.leaves(root)
        .filter(|placement| !placement.bounds.is_degenerate())
        .filter_map(|placement| match placement.leaf {
            Leaf::Text(text) => {
                let lines = fit_lines(&text.text, &text.font, &placement.bounds);
                if lines.is_empty() {
                    return None;
                }
                Some(Region::TextRegion {
                    geometry: placement.geometry,
                    lines,
                    font: text.font.info(),
                })
            }
            Leaf::Formula(formula) => Some(Region::FormulaRegion {
                geometry: placement.geometry,
                latex: formula.latex.clone(),
            }),
            Leaf::Image(image) => Some(Region::ImageRegion {
                geometry: placement.geometry,
                source: image.source.display().to_string(),
            }),
        })
        .collect()
}

fn page_debug(tree: &Node, report: &RenderReport<'_>) -> PageDebug {
    PageDebug {
        tree: tree.to_string(),
        degenerate_leaves: report.degenerate_count(),
        unimplemented_leaves: report.unimplemented_count(),
    }
}

/// Renders one random page, writes its image(s) and returns its ground truth.
pub fn build_page(
    config: &PipelineConfig,
    generator: &TreeGenerator,
    page_idx: usize,
) -> Result<PageTruth> {
    let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(page_idx as u64));
    let tree = generator
        .generate(&mut rng)
        .with_context(|| format!("failed to build layout for page {}", page_idx + 1))?;
    let root = BBox::sized(config.width, config.height);

    let mut page = PageImage::blank(config.width, config.height);
    let report = render(&tree, &mut page, root, &RenderOptions::default());
    if !report.is_complete() {
        warn!(
            "page {}: {} leaf(s) not drawn",
            page_idx + 1,
            report.errors().len()
        );
    }

    let image = page_image_name(page_idx);
    page.save(&config.output.join(&image), config.grayscale)?;

    let debug = if config.debug {
        let mut overlay = PageImage::blank(config.width, config.height);
        render(&tree, &mut overlay, root, &RenderOptions { debug: true });
        let debug_dir = config.output.join("debug");
        fs::create_dir_all(&debug_dir)
            .with_context(|| format!("failed to create {}", debug_dir.display()))?;
        overlay.save(&debug_dir.join(&image), false)?;
        Some(page_debug(&tree, &report))
    } else {
        None
    };

    Ok(PageTruth {
        page_idx,
        image,
        width: config.width,
        height: config.height,
        regions: page_regions(&tree, root),
        debug,
    })
}

pub fn build_dataset(config: &PipelineConfig) -> Result<DatasetTruth> {
    fs::create_dir_all(&config.output)
        .with_context(|| format!("failed to create {}", config.output.display()))?;

    let faces = load_faces(&config.fonts)?;
    let generator = TreeGenerator::new(config.generator.clone(), faces);

    let mut pages = Vec::with_capacity(config.pages);
    for page_idx in 0..config.pages {
        let page = build_page(config, &generator, page_idx)?;
        info!(
            "page {}/{}: {} region(s)",
            page_idx + 1,
            config.pages,
            page.regions.len()
        );
        pages.push(page);
    }

    Ok(DatasetTruth {
        config: serde_json::to_value(config)?,
        pages,
    })
}

pub fn export_dataset(dataset: &DatasetTruth, output: &Path) -> Result<()> {
    let json_exporter = JsonExporter::new(output.to_path_buf());
    json_exporter.export(dataset)?;

    let text_exporter = TextExporter::new(output.to_path_buf());
    text_exporter.export(dataset)?;

    let html_exporter = HtmlDebugExporter::new(output.join("debug"));
    html_exporter.export(dataset)?;

    Ok(())
}
