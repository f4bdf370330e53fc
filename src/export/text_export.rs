use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::core::model::{DatasetTruth, PageTruth, Region};
use crate::export::Exporter;

/// Plain-text transcriptions: one `page_NNNN.txt` per page plus
/// `dataset.txt` with every page.
#[derive(Debug, Clone)]
pub struct TextExporter {
    out_dir: PathBuf,
}

impl TextExporter {
    pub fn new(out_dir: PathBuf) -> Self {
        Self { out_dir }
    }

    fn format_region(region: &Region) -> String {
        let bbox = region.bbox();
        match region {
            Region::TextRegion { lines, .. } => lines.join("\n"),
            Region::FormulaRegion { latex, .. } => format!(
                "[FORMULA at x:{:.0} y:{:.0} w:{:.0} h:{:.0}] {latex}",
                bbox.x0,
                bbox.y0,
                bbox.width(),
                bbox.height()
            ),
            Region::ImageRegion { source, .. } => format!(
                "[IMAGE at x:{:.0} y:{:.0} w:{:.0} h:{:.0}] {source}",
                bbox.x0,
                bbox.y0,
                bbox.width(),
                bbox.height()
            ),
        }
    }

    fn format_page(page: &PageTruth) -> String {
        let mut text = String::new();
        for region in &page.regions {
            let region_text = Self::format_region(region);
            if !region_text.is_empty() {
                text.push_str(&region_text);
                text.push_str("\n\n");
            }
        }
        text
    }
}

impl Exporter for TextExporter {
    fn export(&self, dataset: &DatasetTruth) -> Result<()> {
        fs::create_dir_all(&self.out_dir)
            .with_context(|| format!("failed to create {}", self.out_dir.display()))?;

        let mut full_text = String::new();
        for page in &dataset.pages {
            let page_text = Self::format_page(page);
            full_text.push_str(&format!("=== Page {} ===\n\n", page.page_idx + 1));
            full_text.push_str(&page_text);
            full_text.push('\n');

            let page_path = self
                .out_dir
                .join(format!("page_{:04}.txt", page.page_idx + 1));
            fs::write(&page_path, page_text)
                .with_context(|| format!("failed to write {}", page_path.display()))?;
        }

        let full_path = self.out_dir.join("dataset.txt");
        fs::write(&full_path, full_text)
            .with_context(|| format!("failed to write {}", full_path.display()))?;
        Ok(())
    }
}
