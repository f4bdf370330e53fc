use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Result;
use pretty_assertions::assert_eq;

use pagetree::core::geometry::{BBox, Geometry};
use pagetree::core::model::DatasetTruth;
use pagetree::layout::{render, LeafOutcome, Node, RenderOptions};
use pagetree::pipeline::{build_dataset, export_dataset, page_regions, PipelineConfig};
use pagetree::raster::{BlockFace, Font, PageImage};

fn temp_output_dir(prefix: &str) -> PathBuf {
    let mut out = std::env::temp_dir();
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis();
    let pid = std::process::id();
    out.push(format!("{prefix}-{pid}-{now}"));
    out
}

fn font12() -> Font {
    Font::new(Arc::new(BlockFace), 12.0)
}

/// Two stacked text leaves rendered and collected on a 200x100 page.
#[test]
fn test_stacked_leaves_render_and_collect_in_order() -> Result<()> {
    let tree = Node::y_split(
        0.5,
        Node::pad(0.0, 0.0, 0.0, 0.0, Node::text("hello world", font12()))?,
        Node::text("bye", font12()),
    )?;
    let root = BBox::new(0.0, 0.0, 200.0, 100.0);

    let mut page = PageImage::blank(200, 100);
    let report = render(&tree, &mut page, root, &RenderOptions::default());
    let rendered: Vec<_> = report.visits.iter().map(|visit| visit.bounds).collect();

    let collected: Vec<_> = tree.leaves(root).map(|placement| placement.bounds).collect();

    let expected = vec![
        BBox::new(0.0, 0.0, 200.0, 50.0),
        BBox::new(0.0, 50.0, 200.0, 100.0),
    ];
    assert_eq!(rendered, expected);
    assert_eq!(collected, expected);
    assert!(report.is_complete());

    let LeafOutcome::Drawn { lines, ink } = &report.visits[1].outcome else {
        panic!("second leaf was not drawn");
    };
    assert_eq!(lines, &vec!["bye".to_string()]);
    let ink = ink.expect("'bye' leaves ink");
    assert!(ink.y0 >= 50.0 && ink.y1 <= 100.0);
    Ok(())
}

#[test]
fn test_leaf_count_is_conserved_through_every_node_kind() -> Result<()> {
    let tree = Node::x_split(
        0.6,
        Node::rotate(
            25.0,
            Node::y_split(
                0.3,
                Node::text("alpha beta gamma", font12()),
                Node::pad(0.1, 0.2, 0.1, 0.2, Node::formula("\\frac{a}{b}"))?,
            )?,
        )?,
        Node::y_split(
            0.5,
            Node::image("figure.png"),
            Node::rotate(-10.0, Node::rotate(10.0, Node::text("delta", font12()))?)?,
        )?,
    )?;
    let root = BBox::sized(400, 300);

    let mut page = PageImage::blank(400, 300);
    let report = render(&tree, &mut page, root, &RenderOptions { debug: true });
    assert_eq!(tree.leaf_count(), 4);
    assert_eq!(report.visits.len(), 4);
    assert_eq!(tree.leaves(root).count(), 4);
    assert_eq!(report.unimplemented_count(), 2);

    // the two rotations on the right cancel out
    let last = tree.leaves(root).last().expect("four leaves");
    assert_eq!(
        last.geometry,
        Geometry::Rect {
            bbox: BBox::new(240.0, 150.0, 400.0, 300.0)
        }
    );
    Ok(())
}

#[test]
fn test_rotated_region_label_is_a_quad_centered_on_its_box() -> Result<()> {
    let tree = Node::x_split(
        0.5,
        Node::formula("x"),
        Node::rotate(30.0, Node::text("tilted words here", font12()))?,
    )?;
    let regions = page_regions(&tree, BBox::sized(400, 200));

    assert_eq!(regions.len(), 2);
    let Geometry::Quad { quad } = regions[1].geometry() else {
        panic!("rotated leaf should be labelled with a quad");
    };
    let centroid = quad.centroid();
    assert!((centroid.x - 300.0).abs() < 1e-2);
    assert!((centroid.y - 100.0).abs() < 1e-2);
    Ok(())
}

#[test]
fn test_generate_and_export_dataset() -> Result<()> {
    let output = temp_output_dir("pagetree-integration");
    let mut config = PipelineConfig::new(output.clone(), 3);
    config.width = 360;
    config.height = 240;
    config.seed = 9;
    config.debug = true;
    config.generator.text_length = 300;
    config.generator.max_rotation = 15.0;

    let dataset = build_dataset(&config)?;
    export_dataset(&dataset, &output)?;

    for page_no in 1..=3 {
        assert!(output.join(format!("page_{page_no:04}.png")).exists());
        assert!(output.join(format!("page_{page_no:04}.txt")).exists());
        assert!(output.join(format!("debug/page_{page_no:04}.png")).exists());
        assert!(output.join(format!("debug/page_{page_no:04}.html")).exists());
    }
    assert!(output.join("dataset.txt").exists());

    let json = fs::read_to_string(output.join("dataset.json"))?;
    let read: DatasetTruth = serde_json::from_str(&json)?;
    assert_eq!(read.pages.len(), 3);
    assert_eq!(read.config["seed"], 9);
    assert!(read.pages.iter().any(|page| !page.regions.is_empty()));
    for page in &read.pages {
        for region in &page.regions {
            let bbox = region.bbox();
            assert!(bbox.x0 >= -0.5 && bbox.x1 <= 360.5);
            assert!(bbox.y0 >= -0.5 && bbox.y1 <= 240.5);
        }
    }

    let image = image::open(output.join("page_0001.png"))?;
    assert_eq!((image.width(), image.height()), (360, 240));

    let _ = fs::remove_dir_all(&output);
    Ok(())
}
