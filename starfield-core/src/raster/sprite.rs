use image::imageops::{self, FilterType};
use image::{GrayImage, Luma};

/// Source of antialiased star sprites.
///
/// Holds one oversized binary disc, rendered once. Sprites of any apparent size are produced
/// by cropping a proportional, centered square out of it and area-resampling that square down,
/// so the edge smoothing comes entirely from the filter.
#[derive(Clone, Debug)]
pub struct SpriteCache {
    disc: GrayImage,
    disc_size: u32,
}

/// Where a sprite of a given apparent size is cut from the reference disc.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DiscRegion {
    /// Offset of the square on both axes.
    pub border: u32,
    /// Side of the extracted square.
    pub side: u32,
    /// Side of the sprite the square is resampled to.
    pub target: u32,
}

impl SpriteCache {
    /// Render the reference disc on a `canvas_size` square with a `disc_size` diameter.
    pub fn new(canvas_size: u32, disc_size: u32) -> Self {
        Self {
            disc: build_reference_disc(canvas_size, disc_size),
            disc_size,
        }
    }

    pub fn reference_disc(&self) -> &GrayImage {
        &self.disc
    }

    pub fn canvas_size(&self) -> u32 {
        self.disc.width()
    }

    pub fn disc_size(&self) -> u32 {
        self.disc_size
    }

    /// Region of the reference disc that scales to a sprite of `apparent_size` pixels.
    ///
    /// The sprite side is the largest whole pixel count not exceeding the ideal scaled canvas
    /// side; the region shrinks by the same ratio so the disc keeps its exact apparent size.
    ///
    /// # Panics
    ///
    /// If the region would be narrower than the drawn disc. Validated configurations keep the
    /// disc canvas at least twice the disc size, which rules this out for every size above 1.
    pub fn region_for(&self, apparent_size: f64) -> DiscRegion {
        let canvas = self.canvas_size();
        let ideal = f64::from(canvas) * (apparent_size / f64::from(self.disc_size));
        let target = ideal.floor() as u32;
        let side = (f64::from(canvas) * (f64::from(target) / ideal)) as u32;

        assert!(
            side >= self.disc_size,
            "disc region {side}px is smaller than the {}px disc (apparent size {apparent_size})",
            self.disc_size
        );

        DiscRegion {
            border: (canvas - side) / 2,
            side,
            target,
        }
    }

    /// Produce a sprite whose disc is `apparent_size` pixels across.
    ///
    /// At or below one pixel the sprite is a single pixel whose brightness is proportional to
    /// the size, so distant stars fade out instead of popping.
    pub fn scale_sprite(&self, apparent_size: f64) -> GrayImage {
        if apparent_size <= 1.0 {
            let gray = (apparent_size.clamp(0.0, 1.0) * 255.0).round() as u8;
            return GrayImage::from_pixel(1, 1, Luma([gray]));
        }

        let region = self.region_for(apparent_size);
        let sub = imageops::crop_imm(
            &self.disc,
            region.border,
            region.border,
            region.side,
            region.side,
        );
        imageops::resize(&*sub, region.target, region.target, FilterType::Triangle)
    }
}

/// Draw a white, hard-edged disc of diameter `disc_size` centered on a black
/// `canvas_size`×`canvas_size` square.
pub fn build_reference_disc(canvas_size: u32, disc_size: u32) -> GrayImage {
    assert!(
        disc_size <= canvas_size,
        "disc ({disc_size}px) must fit its canvas ({canvas_size}px)"
    );

    let mut canvas = GrayImage::new(canvas_size, canvas_size);
    let origin = canvas_size / 2 - disc_size / 2;
    let d = f64::from(disc_size);

    for y in 0..disc_size {
        for x in 0..disc_size {
            let cx = (f64::from(x) + 0.5) / d * 2.0 - 1.0;
            let cy = (f64::from(y) + 0.5) / d * 2.0 - 1.0;
            let gray = if cx * cx + cy * cy <= 1.0 { 255 } else { 0 };
            canvas.put_pixel(origin + x, origin + y, Luma([gray]));
        }
    }
    canvas
}

#[cfg(test)]
#[path = "../../tests/unit/raster/sprite.rs"]
mod tests;
