use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{StarfieldError, StarfieldResult};
use crate::render::frame::Frame;

/// Configuration provided to a [`FrameSink`] at the start of a range render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frames-per-second.
    pub fps: Fps,
    /// Number of frames that will be pushed.
    pub frame_count: u64,
}

/// Consumer of rendered frames.
///
/// Ordering contract: `push_frame` is called in strictly increasing `FrameIndex` order between
/// one `begin` and one `end`. A failing call aborts the render; `end` is then not called.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> StarfieldResult<()>;
    /// Push one frame in strictly increasing order.
    fn push_frame(&mut self, idx: FrameIndex, frame: &Frame) -> StarfieldResult<()>;
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> StarfieldResult<()>;
}

/// Reject a frame whose size differs from the one announced in `begin`.
pub(crate) fn check_frame_size(cfg: &SinkConfig, frame: &Frame) -> StarfieldResult<()> {
    if frame.dimensions() != (cfg.width, cfg.height) {
        return Err(StarfieldError::validation(format!(
            "frame size mismatch: got {}x{}, expected {}x{}",
            frame.width(),
            frame.height(),
            cfg.width,
            cfg.height
        )));
    }
    Ok(())
}

/// Tracks the last pushed index so sinks can enforce increasing order.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct OrderGuard {
    last: Option<FrameIndex>,
}

impl OrderGuard {
    pub(crate) fn advance(&mut self, idx: FrameIndex) -> StarfieldResult<()> {
        if let Some(last) = self.last
            && idx.0 <= last.0
        {
            return Err(StarfieldError::encode(format!(
                "sink received out-of-order frame index {} after {}",
                idx.0, last.0
            )));
        }
        self.last = Some(idx);
        Ok(())
    }
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    order: OrderGuard,
    frames: Vec<(FrameIndex, Frame)>,
    finished: bool,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the sink configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<&SinkConfig> {
        self.cfg.as_ref()
    }

    /// Borrow the captured frames.
    pub fn frames(&self) -> &[(FrameIndex, Frame)] {
        &self.frames
    }

    /// Whether `end` was reached.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> StarfieldResult<()> {
        self.cfg = Some(cfg);
        self.order = OrderGuard::default();
        self.frames.clear();
        self.finished = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &Frame) -> StarfieldResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| StarfieldError::encode("in-memory sink not started"))?;
        check_frame_size(cfg, frame)?;
        self.order.advance(idx)?;
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> StarfieldResult<()> {
        self.finished = true;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
