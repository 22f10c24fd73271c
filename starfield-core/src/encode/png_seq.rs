use crate::encode::sink::{FrameSink, OrderGuard, SinkConfig, check_frame_size};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{StarfieldError, StarfieldResult};
use crate::render::frame::Frame;
use anyhow::Context as _;
use std::path::{Path, PathBuf};

/// Options for [`PngSequenceSink`].
#[derive(Clone, Debug)]
pub struct PngSequenceOpts {
    /// Directory receiving the images. Created on `begin` when missing.
    pub dir: PathBuf,
    /// File name prefix; frame `n` is written as `{prefix}{n:04}.png`.
    pub prefix: String,
    /// Overwrite images that already exist.
    pub overwrite: bool,
}

impl PngSequenceOpts {
    /// Write `out0000.png`, `out0001.png`, ... into `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            prefix: "out".to_string(),
            overwrite: true,
        }
    }

    /// Path of the image for frame `idx`.
    pub fn frame_path(&self, idx: FrameIndex) -> PathBuf {
        self.dir.join(format!("{}{:04}.png", self.prefix, idx.0))
    }
}

/// Sink writing every frame as an independent PNG file.
pub struct PngSequenceSink {
    opts: PngSequenceOpts,
    cfg: Option<SinkConfig>,
    order: OrderGuard,
    written: Vec<PathBuf>,
}

impl PngSequenceSink {
    pub fn new(opts: PngSequenceOpts) -> Self {
        Self {
            opts,
            cfg: None,
            order: OrderGuard::default(),
            written: Vec::new(),
        }
    }

    /// Files written so far, in frame order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl FrameSink for PngSequenceSink {
    fn begin(&mut self, cfg: SinkConfig) -> StarfieldResult<()> {
        if self.opts.prefix.contains(['/', '\\']) {
            return Err(StarfieldError::validation(
                "png sequence prefix must not contain path separators",
            ));
        }
        std::fs::create_dir_all(&self.opts.dir).with_context(|| {
            format!(
                "failed to create output directory '{}'",
                self.opts.dir.display()
            )
        })?;
        self.cfg = Some(cfg);
        self.order = OrderGuard::default();
        self.written.clear();
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &Frame) -> StarfieldResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| StarfieldError::encode("png sequence sink not started"))?;
        check_frame_size(cfg, frame)?;
        self.order.advance(idx)?;

        let path = self.opts.frame_path(idx);
        if !self.opts.overwrite && path.exists() {
            return Err(StarfieldError::validation(format!(
                "output file '{}' already exists",
                path.display()
            )));
        }
        write_png(&path, frame)?;
        self.written.push(path);
        Ok(())
    }

    fn end(&mut self) -> StarfieldResult<()> {
        self.cfg = None;
        Ok(())
    }
}

/// Encode one frame as a grayscale PNG.
pub fn write_png(path: &Path, frame: &Frame) -> StarfieldResult<()> {
    frame
        .save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/png_seq.rs"]
mod tests;
