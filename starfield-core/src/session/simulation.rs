use crate::config::model::StarfieldConfig;
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::field::star::{FieldBounds, StarField};
use crate::foundation::core::{FrameIndex, FrameRange};
use crate::foundation::error::{StarfieldError, StarfieldResult};
use crate::raster::sprite::SpriteCache;
use crate::render::frame::{Frame, FrameRenderer};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

/// Options controlling [`Simulation::render_range`].
#[derive(Clone, Debug)]
pub struct RenderOpts {
    /// Render frames on a dedicated rayon pool.
    pub parallel: bool,
    /// Frames rendered per parallel batch before they are handed to the sink.
    pub chunk_size: usize,
    /// Override the number of rayon worker threads. `None` uses rayon defaults.
    pub threads: Option<usize>,
}

impl Default for RenderOpts {
    fn default() -> Self {
        Self {
            parallel: false,
            chunk_size: 16,
            threads: None,
        }
    }
}

/// Range render statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Frames rendered and accepted by the sink.
    pub frames_rendered: u64,
}

/// Everything a run needs, built once and shared read-only by every frame.
///
/// Frames depend only on this value and their index, so any frame can be rendered at any time,
/// from any thread.
#[derive(Clone, Debug)]
pub struct Simulation {
    config: StarfieldConfig,
    stars: StarField,
    sprites: SpriteCache,
    renderer: FrameRenderer,
}

impl Simulation {
    /// Validate `config` and generate the star field from `config.seed`.
    pub fn new(config: StarfieldConfig) -> StarfieldResult<Self> {
        let mut rng = StdRng::seed_from_u64(config.seed);
        Self::with_rng(config, &mut rng)
    }

    /// Validate `config` and generate the star field from an injected generator.
    #[tracing::instrument(level = "debug", skip_all, fields(stars = config.star_count))]
    pub fn with_rng<R: Rng + ?Sized>(config: StarfieldConfig, rng: &mut R) -> StarfieldResult<Self> {
        config.validate()?;
        let g = config.geometry();
        let stars = StarField::generate(
            config.star_count as usize,
            FieldBounds {
                corridor_radius: g.corridor_radius,
                field_radius: g.field_radius,
                tunnel_length: g.tunnel_length,
                max_size: config.max_star_size,
            },
            rng,
        );
        Self::with_stars(config, stars)
    }

    /// Validate `config` and use an explicit star field.
    pub fn with_stars(config: StarfieldConfig, stars: StarField) -> StarfieldResult<Self> {
        config.validate()?;
        let sprites = SpriteCache::new(config.disc_canvas_size, config.disc_size);
        let renderer = FrameRenderer::new(&config);
        Ok(Self {
            config,
            stars,
            sprites,
            renderer,
        })
    }

    pub fn config(&self) -> &StarfieldConfig {
        &self.config
    }

    pub fn stars(&self) -> &StarField {
        &self.stars
    }

    pub fn sprites(&self) -> &SpriteCache {
        &self.sprites
    }

    pub fn renderer(&self) -> &FrameRenderer {
        &self.renderer
    }

    /// All frames of a full run.
    pub fn full_range(&self) -> FrameRange {
        FrameRange::first(self.config.frame_count)
    }

    /// Render one frame at output resolution.
    pub fn render_frame(&self, frame: FrameIndex) -> Frame {
        self.renderer.render(&self.stars, &self.sprites, frame)
    }

    /// Render `range` and stream the frames, in order, into `sink`.
    ///
    /// The first sink error stops production; `end` is only called after every frame was
    /// accepted.
    #[tracing::instrument(skip(self, opts, sink), fields(start = range.start.0, end = range.end.0))]
    pub fn render_range(
        &self,
        range: FrameRange,
        opts: &RenderOpts,
        sink: &mut dyn FrameSink,
    ) -> StarfieldResult<RenderStats> {
        if range.is_empty() {
            return Err(StarfieldError::validation(
                "render_range range must be non-empty",
            ));
        }

        sink.begin(SinkConfig {
            width: self.config.output.width,
            height: self.config.output.height,
            fps: self.config.fps,
            frame_count: range.len_frames(),
        })?;

        let mut stats = RenderStats::default();
        if opts.parallel {
            let pool = build_thread_pool(opts.threads)?;
            let chunk_size = normalized_chunk_size(opts.chunk_size);

            let mut chunk_start = range.start.0;
            while chunk_start < range.end.0 {
                let chunk_end = chunk_start.saturating_add(chunk_size).min(range.end.0);
                let frames: Vec<Frame> = pool.install(|| {
                    (chunk_start..chunk_end)
                        .into_par_iter()
                        .map(|f| self.render_frame(FrameIndex(f)))
                        .collect()
                });
                for (f, frame) in (chunk_start..chunk_end).zip(frames) {
                    self.deliver(sink, FrameIndex(f), &frame, &mut stats)?;
                }
                chunk_start = chunk_end;
            }
        } else {
            for f in range.start.0..range.end.0 {
                let frame = self.render_frame(FrameIndex(f));
                self.deliver(sink, FrameIndex(f), &frame, &mut stats)?;
            }
        }

        sink.end()?;
        Ok(stats)
    }

    fn deliver(
        &self,
        sink: &mut dyn FrameSink,
        idx: FrameIndex,
        frame: &Frame,
        stats: &mut RenderStats,
    ) -> StarfieldResult<()> {
        sink.push_frame(idx, frame)?;
        stats.frames_rendered += 1;
        tracing::info!(frame = idx.0, "frame written");
        Ok(())
    }
}

fn normalized_chunk_size(chunk_size: usize) -> u64 {
    if chunk_size == 0 {
        1
    } else {
        chunk_size as u64
    }
}

fn build_thread_pool(threads: Option<usize>) -> StarfieldResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(StarfieldError::validation(
            "render_range 'threads' must be >= 1 when set",
        ));
    }
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| StarfieldError::render(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/session/simulation.rs"]
mod tests;
