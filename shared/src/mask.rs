use image::{Rgba, RgbaImage};

use crate::asset::encode_png;
use crate::data_url::to_png_data_url;
use crate::MaskError;

/// Display-space paint coverage, one byte per viewport pixel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaintedMask {
    width: u32,
    height: u32,
    alpha: Vec<u8>,
}

impl PaintedMask {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            alpha: vec![0; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn alpha(&self) -> &[u8] {
        &self.alpha
    }

    /// Coverage at a display pixel; 0 outside the surface.
    pub fn coverage(&self, x: i64, y: i64) -> u8 {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return 0;
        }
        self.alpha[y as usize * self.width as usize + x as usize]
    }

    pub fn is_painted(&self, x: i64, y: i64) -> bool {
        self.coverage(x, y) > 0
    }

    pub fn has_coverage(&self) -> bool {
        self.alpha.iter().any(|&value| value > 0)
    }

    pub fn clear(&mut self) {
        self.alpha.fill(0);
    }

    /// Raises coverage at `(x, y)` to at least `value`. Caller guarantees bounds.
    pub(crate) fn raise(&mut self, x: u32, y: u32, value: u8) {
        let index = y as usize * self.width as usize + x as usize;
        if self.alpha[index] < value {
            self.alpha[index] = value;
        }
    }

    /// Per-pixel maximum with a surface of the same size; returns false on a size mismatch.
    pub fn merge_max(&mut self, other: &PaintedMask) -> bool {
        if (self.width, self.height) != (other.width, other.height) {
            return false;
        }
        for (mine, &theirs) in self.alpha.iter_mut().zip(other.alpha.iter()) {
            *mine = (*mine).max(theirs);
        }
        true
    }

    /// Overlay for the painting surface: `color` with the coverage as alpha.
    pub fn to_overlay(&self, color: [u8; 3]) -> RgbaImage {
        let mut overlay = RgbaImage::new(self.width, self.height);
        for (pixel, &alpha) in overlay.pixels_mut().zip(self.alpha.iter()) {
            *pixel = Rgba([color[0], color[1], color[2], alpha]);
        }
        overlay
    }
}

/// Binary mask at the image's native resolution: opaque white = selected, opaque black = not.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NativeMask {
    image: RgbaImage,
}

impl NativeMask {
    pub const SELECTED: Rgba<u8> = Rgba([255, 255, 255, 255]);
    pub const UNSELECTED: Rgba<u8> = Rgba([0, 0, 0, 255]);

    pub(crate) fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn is_selected(&self, x: u32, y: u32) -> bool {
        self.image.get_pixel(x, y)[0] == 255
    }

    pub fn selected_count(&self) -> usize {
        self.image.pixels().filter(|pixel| pixel[0] == 255).count()
    }

    /// Selects every pixel `other` selects. Masks of different sizes are left untouched.
    pub fn union_with(&mut self, other: &NativeMask) -> bool {
        if self.image.dimensions() != other.image.dimensions() {
            return false;
        }
        for (mine, theirs) in self.image.pixels_mut().zip(other.image.pixels()) {
            if theirs[0] == 255 {
                *mine = Self::SELECTED;
            }
        }
        true
    }

    pub fn as_rgba(&self) -> &RgbaImage {
        &self.image
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn to_png_bytes(&self) -> Result<Vec<u8>, MaskError> {
        encode_png(&self.image)
    }

    pub fn to_data_url(&self) -> Result<String, MaskError> {
        Ok(to_png_data_url(&self.to_png_bytes()?))
    }
}
