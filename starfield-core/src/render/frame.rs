use crate::config::model::{Geometry, StarfieldConfig};
use crate::field::star::{Star, StarField};
use crate::foundation::core::{FrameIndex, Resolution};
use crate::raster::composite::composite_clipped;
use crate::raster::sprite::SpriteCache;
use image::GrayImage;
use image::imageops::{self, FilterType};

/// A finished output frame: 8-bit luminance, row-major.
pub type Frame = GrayImage;

/// Where a star lands on the working canvas for one viewer position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    /// Canvas x of the star center, in working pixels.
    pub x: f64,
    /// Canvas y of the star center, in working pixels.
    pub y: f64,
    /// Distance along the axis from the eye, always greater than the viewport distance.
    pub depth: f64,
    /// Straight-line distance from the eye.
    pub distance: f64,
    /// Rendered disc diameter in working pixels.
    pub apparent_size: f64,
}

impl Projection {
    /// Whether any part of the disc can touch a `width`×`height` canvas.
    pub fn is_visible(&self, width: f64, height: f64) -> bool {
        let margin = self.apparent_size / 2.0;
        self.x >= -margin
            && self.y >= -margin
            && self.x <= width + margin
            && self.y <= height + margin
    }
}

/// Per-frame counters, reported through `tracing`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub drawn: usize,
    pub culled: usize,
}

/// Turns the star field into pixels for a given frame index.
///
/// Holds only derived constants; every call is independent of every other.
#[derive(Clone, Copy, Debug)]
pub struct FrameRenderer {
    geometry: Geometry,
    canvas: Resolution,
    output: Resolution,
}

impl FrameRenderer {
    pub fn new(config: &StarfieldConfig) -> Self {
        Self {
            geometry: config.geometry(),
            canvas: config.canvas,
            output: config.output,
        }
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Position of the viewer along the axis at `frame`, wrapped to the tunnel length.
    pub fn viewer_offset(&self, frame: FrameIndex) -> f64 {
        viewer_offset(frame, self.geometry.speed, self.geometry.tunnel_length)
    }

    /// Project `star` for a viewer standing at `viewer` along the axis.
    ///
    /// Stars at or ahead of the viewer are pulled back one tunnel length, so every star is
    /// always in front of the eye and the finite field repeats without end.
    pub fn project(&self, star: &Star, viewer: f64) -> Projection {
        let g = &self.geometry;
        let z = if star.z < viewer {
            star.z
        } else {
            star.z - g.tunnel_length
        };
        let depth = viewer - z + g.viewport_distance;

        let rx = star.x * g.viewport_distance / depth;
        let ry = star.y * g.viewport_distance / depth;
        let x = rx / g.viewport_width * g.canvas_width / 2.0 + g.canvas_width / 2.0;
        let y = ry / g.viewport_height * g.canvas_height / 2.0 + g.canvas_height / 2.0;

        let distance = (star.x * star.x + star.y * star.y + depth * depth).sqrt();
        Projection {
            x,
            y,
            depth,
            distance,
            apparent_size: g.size_constant / distance,
        }
    }

    /// Composite every visible star onto a fresh working canvas, before downsampling.
    pub fn render_canvas(
        &self,
        stars: &StarField,
        sprites: &SpriteCache,
        frame: FrameIndex,
    ) -> (GrayImage, FrameStats) {
        let viewer = self.viewer_offset(frame);
        let mut canvas = GrayImage::new(self.canvas.width, self.canvas.height);
        let mut stats = FrameStats::default();

        for star in stars.stars() {
            let p = self.project(star, viewer);
            if !p.is_visible(self.geometry.canvas_width, self.geometry.canvas_height) {
                stats.culled += 1;
                continue;
            }

            let sprite = sprites.scale_sprite(p.apparent_size);
            let half = f64::from(sprite.width()) / 2.0;
            let left = (p.x - half).floor() as i64;
            let top = (p.y - half).floor() as i64;
            composite_clipped(&mut canvas, &sprite, left, top);
            stats.drawn += 1;
        }

        (canvas, stats)
    }

    /// Render `frame` at output resolution.
    pub fn render(&self, stars: &StarField, sprites: &SpriteCache, frame: FrameIndex) -> Frame {
        let (canvas, stats) = self.render_canvas(stars, sprites, frame);
        tracing::debug!(
            frame = frame.0,
            drawn = stats.drawn,
            culled = stats.culled,
            "composited frame"
        );
        imageops::resize(
            &canvas,
            self.output.width,
            self.output.height,
            FilterType::Triangle,
        )
    }
}

/// `(frame × speed) mod tunnel_length`.
pub fn viewer_offset(frame: FrameIndex, speed: f64, tunnel_length: f64) -> f64 {
    (frame.0 as f64 * speed) % tunnel_length
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame.rs"]
mod tests;
