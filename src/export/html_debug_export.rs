use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::core::geometry::Geometry;
use crate::core::model::{DatasetTruth, PageTruth, Region};
use crate::export::Exporter;

/// Per-page HTML viewers drawing every labelled region over its image.
///
/// Pages rendered with debug overlays show the overlay image written next to
/// the HTML; otherwise the clean page one directory up.
#[derive(Debug, Clone)]
pub struct HtmlDebugExporter {
    out_dir: PathBuf,
}

impl HtmlDebugExporter {
    pub fn new(out_dir: PathBuf) -> Self {
        Self { out_dir }
    }

    fn region_to_shape(idx: usize, region: &Region) -> String {
        let points = match region.geometry() {
            Geometry::Rect { bbox } => bbox.corners(),
            Geometry::Quad { quad } => *quad.points(),
        };
        let points = points
            .iter()
            .map(|p| format!("{:.1},{:.1}", p.x, p.y))
            .collect::<Vec<_>>()
            .join(" ");
        let bbox = region.bbox();
        let text = region_label(region);
        format!(
            r#"<polygon class='region {kind}' points='{points}' data-idx='{idx}' data-type='{kind}' data-bbox='{x0:.0},{y0:.0},{x1:.0},{y1:.0}' data-text='{text}'></polygon>"#,
            kind = region.kind(),
            x0 = bbox.x0,
            y0 = bbox.y0,
            x1 = bbox.x1,
            y1 = bbox.y1,
            text = html_escape::encode_single_quoted_attribute(&text),
        )
    }

    fn page_html(page: &PageTruth) -> String {
        let image = match page.debug {
            Some(_) => page.image.clone(),
            None => format!("../{}", page.image),
        };
        let shapes = page
            .regions
            .iter()
            .enumerate()
            .map(|(idx, region)| Self::region_to_shape(idx, region))
            .collect::<Vec<_>>()
            .join("\n");
        let tree = page
            .debug
            .as_ref()
            .map(|debug| {
                format!(
                    "<pre id='tree'>{}</pre>",
                    html_escape::encode_text(&debug.tree)
                )
            })
            .unwrap_or_default();

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset='utf-8'>
<title>pagetree page {page_no}</title>
<style>
body {{ margin: 0; font-family: Arial, sans-serif; }}
#canvas {{ position: relative; width: {width}px; height: {height}px; }}
#canvas img, #canvas svg {{ position: absolute; left: 0; top: 0; }}
.region {{ stroke-width: 2; cursor: pointer; }}
.region.text {{ fill: rgba(100,100,255,0.1); stroke: rgba(0,0,255,0.6); }}
.region.formula {{ fill: rgba(0,200,200,0.15); stroke: rgba(0,128,128,0.6); }}
.region.image {{ fill: rgba(128,0,128,0.1); stroke: rgba(128,0,128,0.6); stroke-dasharray: 6 3; }}
#info {{ position: fixed; right: 10px; top: 10px; background: #fff; padding: 10px; border: 1px solid #ddd; max-width: 300px; white-space: pre-wrap; }}
#tree {{ position: fixed; right: 10px; bottom: 10px; background: #fff; padding: 10px; border: 1px solid #ddd; font-size: 12px; max-height: 40%; overflow: auto; }}
</style>
</head>
<body>
<div id='info'>Click a region to inspect.</div>
{tree}
<div id='canvas'>
<img src='{image}' width='{width}' height='{height}' />
<svg width='{width}' height='{height}' xmlns='http://www.w3.org/2000/svg'>
{shapes}
</svg>
</div>
<script>
const info = document.getElementById('info');
for (const el of document.querySelectorAll('.region')) {{
  el.addEventListener('click', () => {{
    info.textContent = `#${{el.dataset.idx}} ${{el.dataset.type}}\nbbox: ${{el.dataset.bbox}}\n\n${{el.dataset.text}}`;
  }});
}}
</script>
</body>
</html>"#,
            page_no = page.page_idx + 1,
            width = page.width,
            height = page.height,
            image = html_escape::encode_single_quoted_attribute(&image),
        )
    }
}

fn region_label(region: &Region) -> String {
    match region {
        Region::TextRegion { lines, font, .. } => {
            format!("[{} {}px]\n{}", font.name, font.size, lines.join("\n"))
        }
        Region::FormulaRegion { latex, .. } => latex.clone(),
        Region::ImageRegion { source, .. } => source.clone(),
    }
}

impl Exporter for HtmlDebugExporter {
    fn export(&self, dataset: &DatasetTruth) -> Result<()> {
        fs::create_dir_all(&self.out_dir)
            .with_context(|| format!("failed to create {}", self.out_dir.display()))?;
        for page in &dataset.pages {
            let path = self
                .out_dir
                .join(format!("page_{:04}.html", page.page_idx + 1));
            fs::write(&path, Self::page_html(page))
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::{Affine, BBox, Quad};

    #[test]
    fn escapes_region_text_and_draws_quads() {
        let page = PageTruth {
            page_idx: 2,
            image: "page_0003.png".to_string(),
            width: 100,
            height: 100,
            regions: vec![Region::FormulaRegion {
                geometry: Geometry::Quad {
                    quad: Quad::from_box(&BBox::new(0.0, 0.0, 10.0, 10.0), &Affine::IDENTITY),
                },
                latex: "a<b & 'c'".to_string(),
            }],
            debug: None,
        };

        let html = HtmlDebugExporter::page_html(&page);
        assert!(html.contains("src='../page_0003.png'"));
        assert!(html.contains("points='0.0,0.0 10.0,0.0 10.0,10.0 0.0,10.0'"));
        assert!(html.contains("data-text='a&lt;b &amp; "));
        assert!(!html.contains("'c'"));
        assert!(!html.contains("<pre id='tree'>"));
    }
}
