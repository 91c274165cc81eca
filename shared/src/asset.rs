use std::io::Cursor;
use std::sync::Arc;

use image::{ImageFormat, RgbaImage};

use crate::MaskError;

/// A decoded source image. Cheap to clone; pixels are shared.
#[derive(Clone, Debug)]
pub struct ImageAsset {
    pixels: Arc<RgbaImage>,
}

impl ImageAsset {
    pub fn decode(bytes: &[u8]) -> Result<Self, MaskError> {
        let decoded =
            image::load_from_memory(bytes).map_err(|e| MaskError::DecodeFailure(e.to_string()))?;
        Self::from_rgba(decoded.to_rgba8())
    }

    pub fn from_rgba(pixels: RgbaImage) -> Result<Self, MaskError> {
        if pixels.width() == 0 || pixels.height() == 0 {
            return Err(MaskError::DecodeFailure("image has no pixels".into()));
        }
        Ok(Self {
            pixels: Arc::new(pixels),
        })
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn to_png_bytes(&self) -> Result<Vec<u8>, MaskError> {
        encode_png(&self.pixels)
    }
}

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, MaskError> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| MaskError::InvalidEncoding(e.to_string()))?;
    Ok(bytes)
}
