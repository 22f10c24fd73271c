use crate::foundation::error::{StarfieldError, StarfieldResult};

/// Zero-based index of an output frame.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Half-open range of frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameRange {
    pub start: FrameIndex,
    pub end: FrameIndex, // exclusive
}

impl FrameRange {
    pub fn new(start: FrameIndex, end: FrameIndex) -> StarfieldResult<Self> {
        if start.0 > end.0 {
            return Err(StarfieldError::validation("FrameRange start must be <= end"));
        }
        Ok(Self { start, end })
    }

    /// Range covering the first `count` frames.
    pub fn first(count: u64) -> Self {
        Self {
            start: FrameIndex(0),
            end: FrameIndex(count),
        }
    }

    pub fn len_frames(self) -> u64 {
        self.end.0.saturating_sub(self.start.0)
    }

    pub fn is_empty(self) -> bool {
        self.start.0 == self.end.0
    }
}

/// Rational frames-per-second.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    pub num: u32,
    pub den: u32, // must be > 0
}

impl Fps {
    pub fn new(num: u32, den: u32) -> StarfieldResult<Self> {
        if den == 0 {
            return Err(StarfieldError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(StarfieldError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }
}

/// Pixel dimensions of a raster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
