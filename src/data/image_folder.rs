use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::data::dataset::{Dataset, Normalization};
use crate::error::{HarnessError, Result};
use crate::math::tensor::Tensor;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif"];

/// The three splits of an image-folder dataset, normalized with the
/// training split's statistics.
#[derive(Debug, Clone)]
pub struct DatasetSplits {
    pub train: Dataset,
    pub val: Dataset,
    pub test: Dataset,
    pub normalization: Normalization,
}

/// Loads `<root>/{train,val,test}` and standardizes all three splits with
/// the per-channel statistics of `train`.
pub fn load_splits(root: &Path, size: (usize, usize)) -> Result<DatasetSplits> {
    let mut train = load_image_folder(&root.join("train"), size)?;
    let mut val = load_image_folder(&root.join("val"), size)?;
    let mut test = load_image_folder(&root.join("test"), size)?;

    for (name, split) in [("val", &val), ("test", &test)] {
        if split.classes != train.classes {
            return Err(HarnessError::Dataset(format!(
                "{name} classes {:?} differ from train classes {:?}",
                split.classes, train.classes
            )));
        }
    }
    if train.is_empty() {
        return Err(HarnessError::Dataset(format!(
            "no training images under {}",
            root.join("train").display()
        )));
    }

    let normalization = Normalization::fit(&train);
    normalization.apply(&mut train);
    normalization.apply(&mut val);
    normalization.apply(&mut test);
    info!(
        train = train.len(),
        val = val.len(),
        test = test.len(),
        classes = train.num_classes(),
        "Loaded dataset {}",
        root.display()
    );

    Ok(DatasetSplits { train, val, test, normalization })
}

/// Reads `<dir>/<class>/<image>` into RGB tensors of `size` (height,
/// width) scaled to [0, 1]. Classes are the sub-directory names in sorted
/// order.
pub fn load_image_folder(dir: &Path, size: (usize, usize)) -> Result<Dataset> {
    if !dir.is_dir() {
        return Err(HarnessError::Dataset(format!("{} is not a directory", dir.display())));
    }

    let mut class_dirs: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_dir())
        .collect();
    class_dirs.sort();

    let mut classes = Vec::with_capacity(class_dirs.len());
    let mut samples = Vec::new();
    let mut labels = Vec::new();

    for (label, class_dir) in class_dirs.iter().enumerate() {
        let name = class_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        classes.push(name);

        let mut files: Vec<PathBuf> = fs::read_dir(class_dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| is_image(p))
            .collect();
        files.sort();

        for file in files {
            samples.push(load_rgb(&file, size)?);
            labels.push(label);
        }
    }

    debug!(dir = %dir.display(), images = samples.len(), "Read image folder");
    Dataset::new(samples, labels, classes)
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Decodes, resizes and flattens one image channel-major as R, G, B planes.
fn load_rgb(path: &Path, (height, width): (usize, usize)) -> Result<Tensor> {
    let img = image::open(path)?;
    let resized = img.resize_exact(width as u32, height as u32, image::imageops::FilterType::Lanczos3);
    let rgb = resized.to_rgb8();

    let mut tensor = Tensor::zeros(3, height, width);
    for (x, y, pixel) in rgb.enumerate_pixels() {
        for c in 0..3 {
            let idx = tensor.index(c, y as usize, x as usize);
            tensor.data[idx] = pixel.0[c] as f64 / 255.0;
        }
    }
    Ok(tensor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn write_image(path: &Path, color: [u8; 3]) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        RgbImage::from_pixel(8, 8, Rgb(color)).save(path).unwrap();
    }

    #[test]
    fn classes_are_sorted_directory_names() {
        let tmp = tempfile::tempdir().unwrap();
        write_image(&tmp.path().join("zebra/a.png"), [255, 255, 255]);
        write_image(&tmp.path().join("ant/b.png"), [0, 0, 0]);
        fs::write(tmp.path().join("ant/notes.txt"), "not an image").unwrap();

        let data = load_image_folder(tmp.path(), (4, 4)).unwrap();
        assert_eq!(data.classes, vec!["ant", "zebra"]);
        assert_eq!(data.labels, vec![0, 1]);
        assert_eq!(data.samples[0].channels, 3);
        assert_eq!((data.samples[1].height, data.samples[1].width), (4, 4));
        assert!(data.samples[1].data.iter().all(|v| (v - 1.0).abs() < 1e-9));
    }

    #[test]
    fn splits_must_share_classes() {
        let tmp = tempfile::tempdir().unwrap();
        write_image(&tmp.path().join("train/a/0.png"), [10, 20, 30]);
        write_image(&tmp.path().join("val/a/0.png"), [10, 20, 30]);
        write_image(&tmp.path().join("test/b/0.png"), [10, 20, 30]);

        let err = load_splits(tmp.path(), (4, 4)).unwrap_err();
        assert!(matches!(err, HarnessError::Dataset(msg) if msg.contains("test")));
    }
}
