//! Starfield renders the classic "flying through stars" animation as a batch of frames.
//!
//! # Pipeline overview
//!
//! 1. **Generate**: a seeded RNG scatters point stars through a hollow cylinder ([`StarField`]).
//! 2. **Project**: per frame the viewer advances along the axis; every star is wrapped in
//!    front of the eye and perspective-projected ([`FrameRenderer::project`]).
//! 3. **Composite**: each visible star becomes an antialiased sprite cut from one oversized
//!    reference disc ([`SpriteCache`]) and is saturating-added onto a large working canvas.
//! 4. **Downsample**: the working canvas is area-filtered to the output size.
//! 5. **Encode**: frames stream into a [`FrameSink`]: numbered PNGs or an `ffmpeg` video.
//!
//! A [`Simulation`] bundles the immutable inputs (configuration, stars, reference disc). Frames
//! depend only on it and their index, so they render deterministically and in any order.
#![forbid(unsafe_code)]

mod config;
mod field;
mod foundation;
mod raster;
mod render;
mod session;

/// Frame sinks: PNG sequences, `ffmpeg` video and an in-memory sink.
pub mod encode;

pub use config::model::{Geometry, StarfieldConfig};
pub use field::star::{FieldBounds, Star, StarField};
pub use foundation::core::{Fps, FrameIndex, FrameRange, Resolution};
pub use foundation::error::{StarfieldError, StarfieldResult};
pub use raster::composite::{composite_clipped, saturating_add};
pub use raster::sprite::{DiscRegion, SpriteCache, build_reference_disc};
pub use render::frame::{Frame, FrameRenderer, FrameStats, Projection, viewer_offset};
pub use session::simulation::{RenderOpts, RenderStats, Simulation};

pub use encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, is_ffmpeg_on_path};
pub use encode::png_seq::{PngSequenceOpts, PngSequenceSink, write_png};
pub use encode::sink::{FrameSink, InMemorySink, SinkConfig};
