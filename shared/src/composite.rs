//! Mask intensity becomes the image's alpha channel.
//!
//! The mask may be any size and any color type; it is brought to the image's exact
//! dimensions, reduced to luma, and copied into alpha. RGB is never touched, and gray
//! masks give partial transparency.

use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, RgbaImage};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::asset::encode_png;
use crate::data_url::{decode_base64_payload, to_png_data_url};
use crate::MaskError;

pub fn composite_alpha(image: &RgbaImage, mask: &DynamicImage) -> Result<RgbaImage, MaskError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(MaskError::DimensionMismatch("image has no pixels".into()));
    }
    if mask.width() == 0 || mask.height() == 0 {
        return Err(MaskError::DimensionMismatch("mask has no pixels".into()));
    }

    let luma = mask.to_luma8();
    let intensity: GrayImage = if luma.dimensions() == (width, height) {
        luma
    } else {
        image::imageops::resize(&luma, width, height, FilterType::Triangle)
    };

    let mut result = image.clone();
    let expected = width as usize * height as usize * 4;
    if result.as_raw().len() != expected || intensity.as_raw().len() * 4 != expected {
        return Err(MaskError::InvalidEncoding(format!(
            "buffer holds {} bytes, expected {expected}",
            result.as_raw().len()
        )));
    }

    let buf: &mut [u8] = &mut result;
    #[cfg(feature = "parallel")]
    buf.par_chunks_exact_mut(4)
        .zip(intensity.as_raw().par_iter())
        .for_each(|(pixel, &alpha)| pixel[3] = alpha);
    #[cfg(not(feature = "parallel"))]
    buf.chunks_exact_mut(4)
        .zip(intensity.as_raw().iter())
        .for_each(|(pixel, &alpha)| pixel[3] = alpha);

    Ok(result)
}

/// Decodes both inputs, composites, and returns PNG bytes.
pub fn composite_encoded(image_bytes: &[u8], mask_bytes: &[u8]) -> Result<Vec<u8>, MaskError> {
    let image = image::load_from_memory(image_bytes)
        .map_err(|e| MaskError::DimensionMismatch(format!("image failed to decode: {e}")))?
        .to_rgba8();
    let mask = image::load_from_memory(mask_bytes)
        .map_err(|e| MaskError::DimensionMismatch(format!("mask failed to decode: {e}")))?;
    let result = composite_alpha(&image, &mask)?;
    log::debug!(
        "Composited {}x{} image with {}x{} mask",
        image.width(),
        image.height(),
        mask.width(),
        mask.height()
    );
    encode_png(&result)
}

/// Base64 (optionally data-URL-prefixed) in, PNG data URL out.
pub fn composite_base64(image: &str, mask: &str) -> Result<String, MaskError> {
    let image_bytes = decode_base64_payload(image)?;
    let mask_bytes = decode_base64_payload(mask)?;
    let png = composite_encoded(&image_bytes, &mask_bytes)?;
    Ok(to_png_data_url(&png))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_url::parse_image_data_url;
    use image::{Luma, Rgba};

    fn photo(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| Rgba([x as u8, y as u8, 77, 255]))
    }

    fn gray_mask(width: u32, height: u32, value: u8) -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_pixel(width, height, Luma([value])))
    }

    #[test]
    fn white_mask_keeps_everything_opaque() {
        let result = composite_alpha(&photo(40, 30), &gray_mask(7, 5, 255)).unwrap();
        assert!(result.pixels().all(|pixel| pixel[3] == 255));
    }

    #[test]
    fn black_mask_makes_everything_transparent() {
        let result = composite_alpha(&photo(40, 30), &gray_mask(80, 60, 0)).unwrap();
        assert!(result.pixels().all(|pixel| pixel[3] == 0));
    }

    #[test]
    fn half_gray_mask_gives_half_alpha() {
        let result = composite_alpha(&photo(16, 16), &gray_mask(3, 3, 128)).unwrap();
        assert!(result.pixels().all(|pixel| pixel[3].abs_diff(128) <= 1));
    }

    #[test]
    fn rgb_channels_are_untouched() {
        let source = photo(20, 10);
        let result = composite_alpha(&source, &gray_mask(20, 10, 0)).unwrap();
        for (before, after) in source.pixels().zip(result.pixels()) {
            assert_eq!(before.0[..3], after.0[..3]);
        }
    }

    #[test]
    fn color_masks_are_reduced_to_intensity() {
        let mut mask = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255]));
        mask.put_pixel(1, 2, Rgba([255, 255, 255, 255]));
        let result = composite_alpha(&photo(4, 4), &DynamicImage::ImageRgba8(mask)).unwrap();
        assert_eq!(result.get_pixel(1, 2)[3], 255);
        assert_eq!(result.get_pixel(0, 0)[3], 0);
    }

    #[test]
    fn undecodable_inputs_are_dimension_mismatch() {
        let good = encode_png(&photo(2, 2)).unwrap();
        assert_eq!(
            composite_encoded(b"nope", &good).unwrap_err().code(),
            "DimensionMismatch"
        );
        assert_eq!(
            composite_encoded(&good, b"nope").unwrap_err().code(),
            "DimensionMismatch"
        );
    }

    #[test_log::test]
    fn base64_pipeline_returns_png_data_url() {
        let image = to_png_data_url(&encode_png(&photo(8, 6)).unwrap());
        let mask_png = {
            let mut bytes = Vec::new();
            gray_mask(4, 3, 255)
                .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
                .unwrap();
            bytes
        };
        // Raw base64 without the data-URL prefix is accepted for either input.
        let mask = to_png_data_url(&mask_png)
            .trim_start_matches("data:image/png;base64,")
            .to_string();

        let url = composite_base64(&image, &mask).unwrap();
        let parsed = parse_image_data_url(&url).unwrap();
        let decoded = image::load_from_memory(&parsed.decode().unwrap())
            .unwrap()
            .to_rgba8();
        assert_eq!(decoded.dimensions(), (8, 6));
        assert!(decoded.pixels().all(|pixel| pixel[3] == 255));
    }

    #[test]
    fn invalid_base64_is_rejected_before_decoding() {
        assert_eq!(
            composite_base64("!!!", "!!!").unwrap_err().code(),
            "InvalidMaskEncoding"
        );
    }
}
