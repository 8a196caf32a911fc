//! Image-folder datasets.

pub mod dataset;
pub mod image_folder;

pub use dataset::{Dataset, Normalization};
pub use image_folder::{load_image_folder, load_splits, DatasetSplits};
