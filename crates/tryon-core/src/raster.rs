//! Decoded raster handles.
//!
//! A `RasterHandle` is a reference-counted pointer to decoded RGBA pixels.
//! History snapshots clone the handle, never the pixels, so keeping fifty
//! snapshots of a canvas with one large embedded image costs one bitmap.

use crate::error::{TryOnError, TryOnResult};
use crate::id::RasterId;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::{DynamicImage, ImageFormat, RgbaImage};
use std::fmt;
use std::io::Cursor;
use std::sync::Arc;

const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

#[derive(Clone)]
pub struct RasterHandle {
    id: RasterId,
    pixels: Arc<RgbaImage>,
}

impl RasterHandle {
    /// Wrap already-decoded pixels.
    pub fn from_image(image: RgbaImage) -> Self {
        Self {
            id: RasterId::next(),
            pixels: Arc::new(image),
        }
    }

    /// Wrap raw RGBA8 bytes. Fails if the buffer does not match the size.
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> TryOnResult<Self> {
        let image = RgbaImage::from_raw(width, height, rgba).ok_or_else(|| {
            TryOnError::decode(format!("buffer does not hold {width}x{height} RGBA pixels"))
        })?;
        Ok(Self::from_image(image))
    }

    /// Decode an encoded image file (PNG, JPEG, WebP).
    pub fn decode(bytes: &[u8]) -> TryOnResult<Self> {
        let decoded = image::load_from_memory(bytes)
            .map_err(|e| TryOnError::decode(e.to_string()))?;
        let rgba = decoded.to_rgba8();
        if rgba.width() == 0 || rgba.height() == 0 {
            return Err(TryOnError::decode("image has no pixels"));
        }
        log::debug!("decoded {}x{} raster", rgba.width(), rgba.height());
        Ok(Self::from_image(rgba))
    }

    /// Decode a base64 payload, with or without a `data:<mime>;base64,` prefix.
    pub fn decode_base64(payload: &str) -> TryOnResult<Self> {
        let body = match payload.split_once(";base64,") {
            Some((head, body)) if head.starts_with("data:") => body,
            _ => payload,
        };
        let bytes = STANDARD
            .decode(body.trim())
            .map_err(|e| TryOnError::decode(format!("invalid base64: {e}")))?;
        Self::decode(&bytes)
    }

    pub fn id(&self) -> RasterId {
        self.id
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

    /// Number of live handles sharing these pixels.
    pub fn share_count(&self) -> usize {
        Arc::strong_count(&self.pixels)
    }

    /// Encode as PNG.
    pub fn to_png(&self) -> TryOnResult<Vec<u8>> {
        let mut buf = Vec::new();
        DynamicImage::ImageRgba8((*self.pixels).clone())
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .map_err(|e| TryOnError::encode(e.to_string()))?;
        Ok(buf)
    }

    /// PNG bytes as bare base64.
    pub fn to_base64_png(&self) -> TryOnResult<String> {
        Ok(STANDARD.encode(self.to_png()?))
    }

    /// `data:image/png;base64,...` for download links.
    pub fn to_data_url(&self) -> TryOnResult<String> {
        Ok(format!("{PNG_DATA_URL_PREFIX}{}", self.to_base64_png()?))
    }
}

impl PartialEq for RasterHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl fmt::Debug for RasterHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Raster#{}({}x{})",
            self.id.get(),
            self.width(),
            self.height()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny() -> RasterHandle {
        RasterHandle::from_rgba(2, 1, vec![255, 0, 0, 255, 0, 0, 255, 128]).unwrap()
    }

    #[test]
    fn png_roundtrip_keeps_pixels() {
        let r = tiny();
        let back = RasterHandle::decode(&r.to_png().unwrap()).unwrap();
        assert_eq!(back.width(), 2);
        assert_eq!(back.height(), 1);
        assert_eq!(back.pixels().as_raw(), r.pixels().as_raw());
        assert_ne!(back, r, "decoding creates a new handle");
    }

    #[test]
    fn data_url_is_accepted_by_decode_base64() {
        let url = tiny().to_data_url().unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
        let back = RasterHandle::decode_base64(&url).unwrap();
        assert_eq!(back.width(), 2);
        let bare = tiny().to_base64_png().unwrap();
        assert!(RasterHandle::decode_base64(&bare).is_ok());
    }

    #[test]
    fn corrupt_bytes_fail_to_decode() {
        let err = RasterHandle::decode(b"definitely not an image").unwrap_err();
        assert!(matches!(err, TryOnError::ImageDecode(_)));
        assert!(RasterHandle::decode_base64("!!!").is_err());
    }

    #[test]
    fn wrong_buffer_size_rejected() {
        assert!(RasterHandle::from_rgba(2, 2, vec![0; 4]).is_err());
    }

    #[test]
    fn clones_share_pixels() {
        let a = tiny();
        let b = a.clone();
        assert_eq!(a, b);
        assert_eq!(a.share_count(), 2);
    }
}
