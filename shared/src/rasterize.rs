//! Display-space paint to native-resolution mask.
//!
//! The scan runs forward over native pixels and looks each one up in display space,
//! so every native pixel is written exactly once. Downscaled images collapse many
//! native pixels onto one display pixel, which is fine.

use image::RgbaImage;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::asset::ImageAsset;
use crate::display::DisplayRect;
use crate::mask::{NativeMask, PaintedMask};
use crate::MaskError;

pub fn rasterize(
    painted: &PaintedMask,
    rect: &DisplayRect,
    image: Option<&ImageAsset>,
) -> Result<NativeMask, MaskError> {
    let image = image.ok_or(MaskError::NoImageLoaded)?;
    rasterize_native(painted, rect, image.width(), image.height())
}

pub fn rasterize_native(
    painted: &PaintedMask,
    rect: &DisplayRect,
    width: u32,
    height: u32,
) -> Result<NativeMask, MaskError> {
    if width == 0 || height == 0 {
        return Err(MaskError::NoImageLoaded);
    }
    let row_bytes = width as usize * 4;
    let mut buf = vec![0u8; row_bytes * height as usize];

    let fill_row = |(y, row): (usize, &mut [u8])| {
        for x in 0..width as usize {
            let (dx, dy) = rect.native_to_display(x as u32, y as u32);
            let value = if painted.is_painted(dx, dy) { 255 } else { 0 };
            let off = x * 4;
            row[off] = value;
            row[off + 1] = value;
            row[off + 2] = value;
            row[off + 3] = 255;
        }
    };

    #[cfg(feature = "parallel")]
    buf.par_chunks_mut(row_bytes).enumerate().for_each(fill_row);
    #[cfg(not(feature = "parallel"))]
    buf.chunks_mut(row_bytes).enumerate().for_each(fill_row);

    let image = RgbaImage::from_raw(width, height, buf).ok_or_else(|| {
        MaskError::InvalidEncoding(format!("mask buffer does not fit {width}x{height}"))
    })?;
    log::debug!(
        "Rasterized native mask {width}x{height} scale={:.4} offset=({}, {})",
        rect.scale,
        rect.offset_x,
        rect.offset_y
    );
    Ok(NativeMask::from_image(image))
}
