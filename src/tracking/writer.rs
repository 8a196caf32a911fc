use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use image::RgbImage;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{HarnessError, Result};

/// Write-only sink for run artifacts, keyed by tag and step.
pub trait MetricsWriter {
    fn add_scalar(&mut self, tag: &str, value: f64, step: usize) -> Result<()>;

    /// Adding the same tag again extends that tag's timeline.
    fn add_image(&mut self, tag: &str, image: &RgbImage, step: usize) -> Result<()>;

    /// Flushes and releases the sink. Calling it again is a no-op.
    fn close(&mut self) -> Result<()>;
}

/// One line of `events.jsonl`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub wall_time: f64,
    pub step: usize,
    pub tag: String,
    #[serde(flatten)]
    pub value: EventValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventValue {
    Scalar { value: f64 },
    /// Path of the PNG, relative to the log directory.
    Image { path: String },
}

/// File-backed `MetricsWriter`: events are appended as JSON lines to
/// `<log_dir>/events.jsonl`, images land in `<log_dir>/images/<tag>/<step>.png`.
pub struct SummaryWriter {
    log_dir: PathBuf,
    events: Option<BufWriter<File>>,
}

impl SummaryWriter {
    pub fn new(log_dir: &Path) -> Result<SummaryWriter> {
        fs::create_dir_all(log_dir)?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_dir.join("events.jsonl"))?;
        Ok(SummaryWriter {
            log_dir: log_dir.to_path_buf(),
            events: Some(BufWriter::new(file)),
        })
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// Reads every event recorded under `log_dir`.
    pub fn read_events(log_dir: &Path) -> Result<Vec<Event>> {
        let content = fs::read_to_string(log_dir.join("events.jsonl"))?;
        content
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| serde_json::from_str(l).map_err(HarnessError::from))
            .collect()
    }

    fn append(&mut self, tag: &str, step: usize, value: EventValue) -> Result<()> {
        let events = self.events.as_mut().ok_or_else(|| {
            HarnessError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "summary writer is closed",
            ))
        })?;
        let event = Event {
            wall_time: wall_time(),
            step,
            tag: tag.to_string(),
            value,
        };
        serde_json::to_writer(&mut *events, &event)?;
        events.write_all(b"\n")?;
        Ok(())
    }
}

impl MetricsWriter for SummaryWriter {
    fn add_scalar(&mut self, tag: &str, value: f64, step: usize) -> Result<()> {
        self.append(tag, step, EventValue::Scalar { value })
    }

    fn add_image(&mut self, tag: &str, image: &RgbImage, step: usize) -> Result<()> {
        let relative = PathBuf::from("images").join(tag).join(format!("{step}.png"));
        let path = self.log_dir.join(&relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        image.save(&path)?;
        debug!(tag, step, "image written to {}", path.display());
        self.append(tag, step, EventValue::Image { path: relative.to_string_lossy().into_owned() })
    }

    fn close(&mut self) -> Result<()> {
        if let Some(mut events) = self.events.take() {
            events.flush()?;
        }
        Ok(())
    }
}

impl Drop for SummaryWriter {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

fn wall_time() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn scalars_and_images_are_recorded() {
        let tmp = tempfile::tempdir().unwrap();
        let mut writer = SummaryWriter::new(tmp.path()).unwrap();
        writer.add_scalar("train/accuracy", 50.0, 0).unwrap();
        writer.add_image("train_curve", &RgbImage::from_pixel(2, 2, Rgb([0, 0, 0])), 1).unwrap();
        writer.close().unwrap();

        let events = SummaryWriter::read_events(tmp.path()).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].value, EventValue::Scalar { value: 50.0 });
        assert_eq!(events[1].tag, "train_curve");
        assert!(tmp.path().join("images/train_curve/1.png").is_file());
    }

    #[test]
    fn close_is_idempotent_and_blocks_writes() {
        let tmp = tempfile::tempdir().unwrap();
        let mut writer = SummaryWriter::new(tmp.path()).unwrap();
        writer.close().unwrap();
        writer.close().unwrap();
        assert!(writer.add_scalar("x", 1.0, 0).is_err());
    }
}
