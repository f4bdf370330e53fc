use serde::{Deserialize, Serialize};

use crate::core::geometry::{BBox, Geometry};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetTruth {
    pub config: serde_json::Value,
    pub pages: Vec<PageTruth>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageTruth {
    pub page_idx: usize,
    pub image: String,
    pub width: u32,
    pub height: u32,
    pub regions: Vec<Region>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<PageDebug>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageDebug {
    /// Tree as printed by `Node`'s `Display`.
    pub tree: String,
    pub degenerate_leaves: usize,
    pub unimplemented_leaves: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FontInfo {
    pub name: String,
    pub size: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Region {
    TextRegion {
        geometry: Geometry,
        lines: Vec<String>,
        font: FontInfo,
    },
    FormulaRegion {
        geometry: Geometry,
        latex: String,
    },
    ImageRegion {
        geometry: Geometry,
        source: String,
    },
}

impl Region {
    pub fn geometry(&self) -> &Geometry {
        match self {
            Region::TextRegion { geometry, .. }
            | Region::FormulaRegion { geometry, .. }
            | Region::ImageRegion { geometry, .. } => geometry,
        }
    }

    pub fn bbox(&self) -> BBox {
        self.geometry().bounds()
    }

    pub fn text_content(&self) -> Option<String> {
        match self {
            Region::TextRegion { lines, .. } => Some(lines.join("\n")),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Region::TextRegion { .. } => "text",
            Region::FormulaRegion { .. } => "formula",
            Region::ImageRegion { .. } => "image",
        }
    }
}
