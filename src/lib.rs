pub mod core;
pub mod export;
pub mod layout;
pub mod pipeline;
pub mod raster;

pub use core::error::LayoutError;
pub use core::geometry::{BBox, Geometry};
pub use core::model::{DatasetTruth, PageTruth, Region};
pub use layout::{render, Node, RenderOptions, RenderReport};
pub use raster::{Font, PageImage};
