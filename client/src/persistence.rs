//! Remembers the last loaded image across page reloads. Persistence is best effort:
//! failures are logged and never reach the drawing session.

use bincode::{Decode, Encode};
use log::{debug, warn};
use maskpaint_shared::{ImageAsset, MaskError};

pub const LAST_IMAGE_KEY: &str = "maskpaint.last-image";

/// Leads every stored payload, followed by the record version.
const RECORD_TAG: [u8; 4] = *b"MPLI";
const RECORD_VERSION: u32 = 1;

pub trait LastImageStore {
    fn write(&mut self, payload: &[u8]) -> Result<(), MaskError>;
    fn read(&self) -> Result<Option<Vec<u8>>, MaskError>;
}

/// What a store holds: the image re-encoded as PNG plus the name it was loaded under.
#[derive(Debug, PartialEq, Encode, Decode)]
struct StoredImage {
    file_name: Option<String>,
    png: Vec<u8>,
}

fn encode_record(image: &StoredImage) -> Result<Vec<u8>, MaskError> {
    bincode::encode_to_vec((RECORD_TAG, RECORD_VERSION, image), bincode::config::standard())
        .map_err(|e| MaskError::StorageUnavailable(format!("image record: {e}")))
}

fn decode_record(payload: &[u8]) -> Result<StoredImage, MaskError> {
    let config = bincode::config::standard();
    let decode_failure = |e: bincode::error::DecodeError| {
        MaskError::DecodeFailure(format!("image record: {e}"))
    };
    let ((tag, version), header_len): (([u8; 4], u32), usize) =
        bincode::decode_from_slice(payload, config).map_err(decode_failure)?;
    if tag != RECORD_TAG {
        return Err(MaskError::DecodeFailure("not an image record".into()));
    }
    if version != RECORD_VERSION {
        return Err(MaskError::DecodeFailure(format!(
            "unsupported image record version {version}"
        )));
    }
    let (image, _) =
        bincode::decode_from_slice(&payload[header_len..], config).map_err(decode_failure)?;
    Ok(image)
}

/// One file per store, for native hosts.
#[cfg(not(target_arch = "wasm32"))]
pub struct DirImageStore {
    dir: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl DirImageStore {
    pub fn new(dir: impl Into<std::path::PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self) -> std::path::PathBuf {
        self.dir.join(format!("{LAST_IMAGE_KEY}.bin"))
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl LastImageStore for DirImageStore {
    fn write(&mut self, payload: &[u8]) -> Result<(), MaskError> {
        std::fs::create_dir_all(&self.dir)
            .and_then(|()| std::fs::write(self.path(), payload))
            .map_err(|e| MaskError::StorageUnavailable(e.to_string()))
    }

    fn read(&self) -> Result<Option<Vec<u8>>, MaskError> {
        match std::fs::read(self.path()) {
            Ok(payload) => Ok(Some(payload)),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(MaskError::StorageUnavailable(error.to_string())),
        }
    }
}

/// Browser `localStorage`, base64 text under [`LAST_IMAGE_KEY`].
#[cfg(target_arch = "wasm32")]
pub struct LocalImageStore;

#[cfg(target_arch = "wasm32")]
impl LocalImageStore {
    fn storage() -> Result<web_sys::Storage, MaskError> {
        web_sys::window()
            .ok_or_else(|| MaskError::StorageUnavailable("no window".into()))?
            .local_storage()
            .map_err(|e| MaskError::StorageUnavailable(format!("{e:?}")))?
            .ok_or_else(|| MaskError::StorageUnavailable("localStorage disabled".into()))
    }
}

#[cfg(target_arch = "wasm32")]
impl LastImageStore for LocalImageStore {
    fn write(&mut self, payload: &[u8]) -> Result<(), MaskError> {
        let text = maskpaint_shared::data_url::encode_base64(payload);
        Self::storage()?
            .set_item(LAST_IMAGE_KEY, &text)
            .map_err(|e| MaskError::StorageUnavailable(format!("{e:?}")))
    }

    fn read(&self) -> Result<Option<Vec<u8>>, MaskError> {
        let text = Self::storage()?
            .get_item(LAST_IMAGE_KEY)
            .map_err(|e| MaskError::StorageUnavailable(format!("{e:?}")))?;
        text.map(|text| maskpaint_shared::data_url::decode_base64_payload(&text))
            .transpose()
    }
}

#[cfg(target_arch = "wasm32")]
pub fn default_store() -> Box<dyn LastImageStore> {
    Box::new(LocalImageStore)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn default_store() -> Box<dyn LastImageStore> {
    Box::new(DirImageStore::new(std::env::temp_dir().join("maskpaint")))
}

pub fn remember_image(
    store: &mut dyn LastImageStore,
    asset: &ImageAsset,
    file_name: Option<&str>,
) {
    let result = asset
        .to_png_bytes()
        .and_then(|png| {
            encode_record(&StoredImage {
                file_name: file_name.map(str::to_string),
                png,
            })
        })
        .and_then(|payload| store.write(&payload));
    if let Err(error) = result {
        warn!("Skipping last-image persistence: {error}");
    }
}

pub fn restore_image(store: &dyn LastImageStore) -> Option<(ImageAsset, Option<String>)> {
    let payload = match store.read() {
        Ok(Some(payload)) => payload,
        Ok(None) => return None,
        Err(error) => {
            warn!("Last image unavailable: {error}");
            return None;
        }
    };
    let stored = match decode_record(&payload) {
        Ok(stored) => stored,
        Err(error) => {
            debug!("Ignoring stored image record: {error}");
            return None;
        }
    };
    match ImageAsset::decode(&stored.png) {
        Ok(asset) => Some((asset, stored.file_name)),
        Err(error) => {
            warn!("Stored image no longer decodes: {error}");
            None
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::MemoryImageStore;
    use super::*;
    use image::RgbaImage;

    struct BrokenStore;

    impl LastImageStore for BrokenStore {
        fn write(&mut self, _payload: &[u8]) -> Result<(), MaskError> {
            Err(MaskError::StorageUnavailable("quota exceeded".into()))
        }

        fn read(&self) -> Result<Option<Vec<u8>>, MaskError> {
            Err(MaskError::StorageUnavailable("quota exceeded".into()))
        }
    }

    fn asset() -> ImageAsset {
        ImageAsset::from_rgba(RgbaImage::from_pixel(3, 2, image::Rgba([9, 8, 7, 255]))).unwrap()
    }

    #[test]
    fn image_is_restored_from_memory() {
        let mut store = MemoryImageStore::default();
        assert!(restore_image(&store).is_none());
        remember_image(&mut store, &asset(), Some("dog.png"));
        let (restored, file_name) = restore_image(&store).unwrap();
        assert_eq!((restored.width(), restored.height()), (3, 2));
        assert_eq!(restored.pixels().get_pixel(1, 1), &image::Rgba([9, 8, 7, 255]));
        assert_eq!(file_name.as_deref(), Some("dog.png"));
    }

    #[test_log::test]
    fn storage_failures_are_swallowed() {
        let mut store = BrokenStore;
        remember_image(&mut store, &asset(), None);
        assert!(restore_image(&store).is_none());
    }

    #[test]
    fn corrupt_records_are_ignored() {
        let mut store = MemoryImageStore::default();
        store.write(b"garbage").unwrap();
        assert!(restore_image(&store).is_none());
    }

    #[test]
    fn records_from_other_versions_are_rejected() {
        let image = StoredImage {
            file_name: Some("a.png".into()),
            png: vec![1, 2, 3],
        };
        let payload = encode_record(&image).unwrap();
        assert!(payload.starts_with(&RECORD_TAG));
        assert_eq!(decode_record(&payload).unwrap(), image);

        let future =
            bincode::encode_to_vec((RECORD_TAG, 9u32, &image), bincode::config::standard())
                .unwrap();
        let error = decode_record(&future).unwrap_err();
        assert_eq!(error.code(), "DecodeFailure");
        assert!(error.to_string().contains("version 9"), "{error}");
        assert!(decode_record(b"MPL").is_err());
    }

    #[test]
    fn native_hosts_default_to_a_directory_store() {
        let mut store = default_store();
        // Shared with other runs, so only check that the store works.
        remember_image(store.as_mut(), &asset(), Some("default.png"));
        assert!(restore_image(store.as_ref()).is_some());
    }

    #[test]
    fn dir_store_round_trips_through_disk() {
        let dir = std::env::temp_dir().join(format!("maskpaint-store-{}", std::process::id()));
        let mut store = DirImageStore::new(&dir);
        assert_eq!(store.read().unwrap(), None);
        remember_image(&mut store, &asset(), None);
        let (restored, file_name) = restore_image(&store).unwrap();
        assert_eq!(restored.width(), 3);
        assert_eq!(file_name, None);
        let _ = std::fs::remove_dir_all(dir);
    }
}
