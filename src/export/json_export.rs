use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::core::model::DatasetTruth;
use crate::export::Exporter;

/// Writes the whole ground truth as `dataset.json`.
#[derive(Debug, Clone)]
pub struct JsonExporter {
    out_dir: PathBuf,
}

impl JsonExporter {
    pub fn new(out_dir: PathBuf) -> Self {
        Self { out_dir }
    }
}

impl Exporter for JsonExporter {
    fn export(&self, dataset: &DatasetTruth) -> Result<()> {
        fs::create_dir_all(&self.out_dir)
            .with_context(|| format!("failed to create {}", self.out_dir.display()))?;
        let path = self.out_dir.join("dataset.json");
        let data = serde_json::to_string_pretty(dataset)?;
        fs::write(&path, data).with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::{BBox, Geometry};
    use crate::core::model::{PageTruth, Region};

    #[test]
    fn written_json_reads_back() -> Result<()> {
        let out_dir = std::env::temp_dir().join(format!("pagetree-json-{}", std::process::id()));
        let dataset = DatasetTruth {
            config: serde_json::json!({ "seed": 3 }),
            pages: vec![PageTruth {
                page_idx: 0,
                image: "page_0001.png".to_string(),
                width: 50,
                height: 40,
                regions: vec![Region::FormulaRegion {
                    geometry: Geometry::Rect {
                        bbox: BBox::new(1.0, 2.0, 30.0, 20.0),
                    },
                    latex: "e^{i\\pi}".to_string(),
                }],
                debug: None,
            }],
        };

        JsonExporter::new(out_dir.clone()).export(&dataset)?;
        let read: DatasetTruth =
            serde_json::from_str(&fs::read_to_string(out_dir.join("dataset.json"))?)?;
        assert_eq!(read.config["seed"], 3);
        assert_eq!(read.pages[0].regions[0].kind(), "formula");
        assert_eq!(read.pages[0].regions[0].bbox(), BBox::new(1.0, 2.0, 30.0, 20.0));

        let _ = fs::remove_dir_all(&out_dir);
        Ok(())
    }
}
