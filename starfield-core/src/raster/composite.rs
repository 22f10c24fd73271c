use image::{GenericImage, GenericImageView, Pixel, imageops};

/// Add `src` onto `dest` channel by channel, clamping at 255.
///
/// Both images must have the same dimensions; anything else is a caller bug and panics.
pub fn saturating_add<D, S, P>(dest: &mut D, src: &S)
where
    D: GenericImage<Pixel = P>,
    S: GenericImageView<Pixel = P>,
    P: Pixel<Subpixel = u8>,
{
    assert_eq!(
        dest.dimensions(),
        src.dimensions(),
        "saturating_add expects equal-sized images"
    );

    let (width, height) = dest.dimensions();
    for y in 0..height {
        for x in 0..width {
            let d = dest.get_pixel(x, y);
            let s = src.get_pixel(x, y);
            dest.put_pixel(x, y, d.map2(&s, u8::saturating_add));
        }
    }
}

/// Saturating-add `src` onto `dest` with its top-left corner at (`x`, `y`).
///
/// The offset may be negative and `src` may hang over any edge; only the overlapping
/// rectangle is touched. No overlap is a silent no-op.
pub fn composite_clipped<D, S, P>(dest: &mut D, src: &S, x: i64, y: i64)
where
    D: GenericImage<Pixel = P>,
    S: GenericImageView<Pixel = P>,
    P: Pixel<Subpixel = u8>,
{
    let Some(overlap) = Overlap::of(dest.dimensions(), src.dimensions(), x, y) else {
        return;
    };

    let src_view = imageops::crop_imm(
        src,
        overlap.src_x,
        overlap.src_y,
        overlap.width,
        overlap.height,
    );
    let mut dest_view = imageops::crop(
        dest,
        overlap.dest_x,
        overlap.dest_y,
        overlap.width,
        overlap.height,
    );
    saturating_add(&mut *dest_view, &*src_view);
}

/// Intersection of a placed source rectangle with a destination rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Overlap {
    pub(crate) src_x: u32,
    pub(crate) src_y: u32,
    pub(crate) dest_x: u32,
    pub(crate) dest_y: u32,
    pub(crate) width: u32,
    pub(crate) height: u32,
}

impl Overlap {
    pub(crate) fn of(dest: (u32, u32), src: (u32, u32), x: i64, y: i64) -> Option<Self> {
        let (dw, dh) = (i64::from(dest.0), i64::from(dest.1));
        let (sw, sh) = (i64::from(src.0), i64::from(src.1));

        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = x.saturating_add(sw).min(dw);
        let y1 = y.saturating_add(sh).min(dh);
        if x0 >= x1 || y0 >= y1 {
            return None;
        }

        // All values below are bounded by the u32 image dimensions.
        Some(Self {
            src_x: (x0 - x) as u32,
            src_y: (y0 - y) as u32,
            dest_x: x0 as u32,
            dest_y: y0 as u32,
            width: (x1 - x0) as u32,
            height: (y1 - y0) as u32,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/raster/composite.rs"]
mod tests;
