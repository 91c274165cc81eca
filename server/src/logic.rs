use std::time::{SystemTime, UNIX_EPOCH};

use maskpaint_shared::data_url::{decode_base64_payload, parse_image_data_url};
use maskpaint_shared::{ConfirmMaskRequest, ImageAsset, ImageInfo, MaskError};

pub const DEFAULT_MAX_BODY_BYTES: usize = 32 * 1024 * 1024;
const MAX_BASE_NAME_LEN: usize = 64;

/// A validated mask, ready for storage.
#[derive(Debug)]
pub struct PreparedMask {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

pub fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default()
}

/// Last path component of `original`, minus its extension, restricted to `[A-Za-z0-9._-]`.
pub fn sanitize_base_name(original: Option<&str>) -> String {
    let name = original
        .unwrap_or_default()
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();
    let stem = match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name,
    };
    let mut base: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    base.truncate(MAX_BASE_NAME_LEN);
    if base.is_empty() {
        return "image".to_string();
    }
    base
}

pub fn mask_file_name(original: Option<&str>, extension: &str, millis: u128) -> String {
    format!("{}_mask_{millis}.{extension}", sanitize_base_name(original))
}

/// Checks the data URL, then that its payload is an image. Nothing touches disk here.
pub fn prepare_mask(request: &ConfirmMaskRequest, millis: u128) -> Result<PreparedMask, MaskError> {
    let url = parse_image_data_url(&request.mask_data_url)?;
    let bytes = url.decode()?;
    let decoded = ImageAsset::decode(&bytes)?;
    Ok(PreparedMask {
        file_name: mask_file_name(
            request.original_file_name.as_deref(),
            &url.file_extension(),
            millis,
        ),
        width: decoded.width(),
        height: decoded.height(),
        bytes,
    })
}

/// Dimensions of an opener-supplied image, which may be a data URL or raw base64.
pub fn inspect_initial_image(image: &str) -> Result<ImageInfo, MaskError> {
    let bytes = decode_base64_payload(image)?;
    let asset = ImageAsset::decode(&bytes)?;
    Ok(ImageInfo {
        width: asset.width(),
        height: asset.height(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use maskpaint_shared::data_url::to_png_data_url;

    fn png_data_url(width: u32, height: u32) -> String {
        let image = image::RgbaImage::from_pixel(width, height, image::Rgba([255, 255, 255, 255]));
        to_png_data_url(&maskpaint_shared::asset::encode_png(&image).unwrap())
    }

    fn request(mask_data_url: String, original_file_name: Option<&str>) -> ConfirmMaskRequest {
        ConfirmMaskRequest {
            mask_data_url,
            original_file_name: original_file_name.map(str::to_string),
            session_id: None,
        }
    }

    #[test]
    fn base_name_drops_directories_and_extension() {
        assert_eq!(sanitize_base_name(Some("photos/cat.photo.jpg")), "cat.photo");
        assert_eq!(sanitize_base_name(Some("C:\\shots\\my cat!.png")), "my_cat_");
        assert_eq!(sanitize_base_name(Some("../../etc/passwd")), "passwd");
        assert_eq!(sanitize_base_name(Some(".hidden")), ".hidden");
        assert_eq!(sanitize_base_name(Some("")), "image");
        assert_eq!(sanitize_base_name(Some("dir/")), "image");
        assert_eq!(sanitize_base_name(None), "image");
        assert_eq!(sanitize_base_name(Some(&"x".repeat(300))).len(), 64);
    }

    #[test]
    fn file_name_combines_base_time_and_extension() {
        assert_eq!(
            mask_file_name(Some("beach.jpeg"), "png", 1700000000000),
            "beach_mask_1700000000000.png"
        );
    }

    #[test]
    fn prepared_mask_reports_dimensions() {
        let prepared = prepare_mask(&request(png_data_url(7, 3), Some("a.jpg")), 5).unwrap();
        assert_eq!(prepared.file_name, "a_mask_5.png");
        assert_eq!((prepared.width, prepared.height), (7, 3));
        assert!(!prepared.bytes.is_empty());
    }

    #[test]
    fn malformed_url_is_rejected_before_decoding() {
        let error = prepare_mask(&request("hello".into(), None), 1).unwrap_err();
        assert_eq!(error.code(), "InvalidMaskEncoding");
    }

    #[test]
    fn non_image_payload_is_a_decode_failure() {
        let error = prepare_mask(
            &request("data:image/png;base64,SGVsbG8gd29ybGQ=".into(), None),
            1,
        )
        .unwrap_err();
        assert_eq!(error.code(), "DecodeFailure");
    }

    #[test]
    fn jpeg_subtype_is_stored_as_jpg() {
        let url = png_data_url(2, 2).replacen("image/png", "image/jpeg", 1);
        // PNG bytes under a jpeg label still decode; only the extension follows the label.
        let prepared = prepare_mask(&request(url, None), 9).unwrap();
        assert_eq!(prepared.file_name, "image_mask_9.jpg");
    }

    #[test]
    fn initial_image_accepts_raw_base64() {
        let url = png_data_url(4, 5);
        let raw = url.trim_start_matches("data:image/png;base64,");
        assert_eq!(
            inspect_initial_image(raw).unwrap(),
            ImageInfo {
                width: 4,
                height: 5
            }
        );
        assert_eq!(inspect_initial_image("%%%").unwrap_err().code(), "InvalidMaskEncoding");
    }
}
