use crate::foundation::core::{Fps, Resolution};
use crate::foundation::error::{StarfieldError, StarfieldResult};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Every tunable of a starfield run.
///
/// Defaults reproduce a five second PAL-sized clip: 500 stars drifting through a 1000×1500
/// cylinder, rendered on a 3072×2304 working canvas and area-filtered down to 720×576.
///
/// Lengths (`tunnel_*`, `corridor_diameter`, `viewport_*`) share one arbitrary world unit.
/// Star and disc sizes are in working-canvas pixels.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StarfieldConfig {
    /// Final frame size handed to sinks.
    pub output: Resolution,
    /// Oversampled working canvas the stars are composited on.
    pub canvas: Resolution,
    /// Number of stars in the cylinder.
    pub star_count: u32,
    /// World units the viewer advances per frame.
    pub speed: f64,
    /// Diameter of the star cylinder.
    pub tunnel_diameter: f64,
    /// Length of the star cylinder; the field repeats with this period.
    pub tunnel_length: f64,
    /// Diameter of the star-free corridor around the axis.
    pub corridor_diameter: f64,
    /// Distance from the eye to the projection plane.
    pub viewport_distance: f64,
    /// Width of the projection plane; its height follows the canvas aspect ratio.
    pub viewport_width: f64,
    /// Apparent size of a star on the corridor wall at the edge of the view.
    pub max_star_size: f64,
    /// Side of the square reference-disc canvas.
    pub disc_canvas_size: u32,
    /// Diameter of the disc drawn in the middle of that canvas.
    pub disc_size: u32,
    /// Number of frames a full render produces.
    pub frame_count: u64,
    pub fps: Fps,
    /// ffmpeg video codec name used by the video sink.
    pub codec: String,
    /// Seed for the star-field generator.
    pub seed: u64,
}

impl Default for StarfieldConfig {
    fn default() -> Self {
        Self {
            output: Resolution::new(720, 576),
            canvas: Resolution::new(768 * 4, 576 * 4),
            star_count: 500,
            speed: 0.5,
            tunnel_diameter: 1000.0,
            tunnel_length: 1500.0,
            corridor_diameter: 100.0,
            viewport_distance: 10.0,
            viewport_width: 10.0,
            max_star_size: 20.0,
            disc_canvas_size: 128,
            disc_size: 32,
            frame_count: 25 * 5,
            fps: Fps { num: 25, den: 1 },
            codec: "libx264".to_string(),
            seed: 0,
        }
    }
}

/// Quantities derived once from a validated [`StarfieldConfig`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Geometry {
    pub canvas_width: f64,
    pub canvas_height: f64,
    pub viewport_distance: f64,
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub corridor_radius: f64,
    pub field_radius: f64,
    pub tunnel_length: f64,
    pub speed: f64,
    /// Numerator of `apparent_size = size_constant / distance`.
    pub size_constant: f64,
}

impl StarfieldConfig {
    /// Parse a configuration from a JSON reader. Missing fields take their defaults.
    pub fn from_reader<R: std::io::Read>(r: R) -> StarfieldResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| StarfieldError::validation(format!("parse starfield config JSON: {e}")))
    }

    /// Parse a configuration from a JSON string.
    pub fn from_json_str(s: &str) -> StarfieldResult<Self> {
        Self::from_reader(s.as_bytes())
    }

    /// Parse a configuration from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> StarfieldResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            StarfieldError::validation(format!("open starfield config '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Serialize to pretty JSON.
    pub fn to_json_pretty(&self) -> StarfieldResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| StarfieldError::Other(anyhow::Error::new(e)))
    }

    /// Reject configurations whose geometry would break a rendering invariant.
    pub fn validate(&self) -> StarfieldResult<()> {
        if self.output.is_empty() {
            return Err(StarfieldError::validation(
                "output width/height must be non-zero",
            ));
        }
        if self.canvas.is_empty() {
            return Err(StarfieldError::validation(
                "canvas width/height must be non-zero",
            ));
        }
        if self.canvas.width < self.output.width || self.canvas.height < self.output.height {
            return Err(StarfieldError::validation(
                "canvas must be at least as large as the output in both dimensions",
            ));
        }

        positive("speed", self.speed)?;
        positive("tunnel_length", self.tunnel_length)?;
        positive("tunnel_diameter", self.tunnel_diameter)?;
        positive("corridor_diameter", self.corridor_diameter)?;
        positive("viewport_distance", self.viewport_distance)?;
        positive("viewport_width", self.viewport_width)?;
        positive("max_star_size", self.max_star_size)?;

        if self.corridor_diameter >= self.tunnel_diameter {
            return Err(StarfieldError::validation(
                "corridor_diameter must be smaller than tunnel_diameter",
            ));
        }

        if self.disc_size == 0 {
            return Err(StarfieldError::validation("disc_size must be non-zero"));
        }
        // A scaled sprite extracts a sub-square of at least `canvas - disc` pixels; that must
        // still contain the whole drawn disc.
        if u64::from(self.disc_canvas_size) < 2 * u64::from(self.disc_size) {
            return Err(StarfieldError::validation(
                "disc_canvas_size must be at least twice disc_size",
            ));
        }
        if self.max_star_size >= f64::from(self.disc_size) {
            return Err(StarfieldError::validation(
                "max_star_size must be smaller than disc_size",
            ));
        }

        if self.frame_count == 0 {
            return Err(StarfieldError::validation("frame_count must be non-zero"));
        }
        Fps::new(self.fps.num, self.fps.den)?;
        if self.codec.trim().is_empty() {
            return Err(StarfieldError::validation("codec must not be empty"));
        }
        Ok(())
    }

    /// Derive projection and sizing constants.
    pub fn geometry(&self) -> Geometry {
        let canvas_width = f64::from(self.canvas.width);
        let canvas_height = f64::from(self.canvas.height);
        let viewport_height = self.viewport_width * canvas_height / canvas_width;
        let corridor_radius = self.corridor_diameter / 2.0;

        // A star on the corridor wall, just at the top/bottom edge of the view, is drawn at
        // exactly `max_star_size`.
        let edge_depth = self.viewport_distance * self.corridor_diameter / viewport_height;
        let edge_distance = (edge_depth * edge_depth + corridor_radius * corridor_radius).sqrt();

        Geometry {
            canvas_width,
            canvas_height,
            viewport_distance: self.viewport_distance,
            viewport_width: self.viewport_width,
            viewport_height,
            corridor_radius,
            field_radius: self.tunnel_diameter / 2.0,
            tunnel_length: self.tunnel_length,
            speed: self.speed,
            size_constant: self.max_star_size * edge_distance,
        }
    }

    /// Number of frames after which the viewer returns to the same offset, when that is a
    /// whole number.
    pub fn period_frames(&self) -> Option<u64> {
        if self.speed <= 0.0 {
            return None;
        }
        let period = self.tunnel_length / self.speed;
        (period.fract() == 0.0 && period <= u64::MAX as f64).then_some(period as u64)
    }
}

fn positive(name: &str, v: f64) -> StarfieldResult<()> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(StarfieldError::validation(format!(
            "{name} must be finite and > 0 (got {v})"
        )))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/model.rs"]
mod tests;
