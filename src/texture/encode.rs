//! Raster encoding for texture assets.
//!
//! A minimal 24-bit BMP writer is always compiled in, so texture output
//! never depends on an optional codec. When the `image-codec` capability is
//! present the catalog is encoded as PNG instead for better compression.

use bytes::Bytes;

use crate::error::Result;
use crate::texture::RasterImage;

/// File extension matching the encoder compiled into this build.
pub fn file_extension() -> &'static str {
    if cfg!(feature = "image-codec") {
        "png"
    } else {
        "bmp"
    }
}

/// Encode an image with the best encoder available: PNG when the
/// `image-codec` feature is compiled in, the built-in BMP writer otherwise.
#[cfg(feature = "image-codec")]
pub fn encode(img: &RasterImage) -> Result<Bytes> {
    use crate::error::ForgeError;
    use image::ImageEncoder;

    let mut out = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut out);
    encoder
        .write_image(
            img.pixels(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| ForgeError::Encode(format!("png encode failed: {e}")))?;
    Ok(Bytes::from(out))
}

#[cfg(not(feature = "image-codec"))]
pub fn encode(img: &RasterImage) -> Result<Bytes> {
    encode_bmp(img)
}

/// Baseline encoder: uncompressed 24-bit BMP, bottom-up rows padded to four
/// bytes. Always valid regardless of enabled features.
pub fn encode_bmp(img: &RasterImage) -> Result<Bytes> {
    let width = img.width();
    let height = img.height();
    let row_bytes = width as usize * 3;
    let padding = (4 - row_bytes % 4) % 4;
    let stride = row_bytes + padding;
    let pixel_bytes = stride * height as usize;
    let file_size = 14 + 40 + pixel_bytes;

    let mut out = Vec::with_capacity(file_size);

    // File header.
    out.extend_from_slice(b"BM");
    out.extend_from_slice(&(file_size as u32).to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes()); // reserved
    out.extend_from_slice(&54u32.to_le_bytes()); // pixel data offset

    // BITMAPINFOHEADER.
    out.extend_from_slice(&40u32.to_le_bytes());
    out.extend_from_slice(&(width as i32).to_le_bytes());
    out.extend_from_slice(&(height as i32).to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes()); // planes
    out.extend_from_slice(&24u16.to_le_bytes()); // bits per pixel
    out.extend_from_slice(&0u32.to_le_bytes()); // BI_RGB, no compression
    out.extend_from_slice(&(pixel_bytes as u32).to_le_bytes());
    out.extend_from_slice(&2835u32.to_le_bytes()); // 72 dpi
    out.extend_from_slice(&2835u32.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes()); // palette size
    out.extend_from_slice(&0u32.to_le_bytes()); // important colors

    // Rows bottom-up, pixels as BGR.
    let pad = [0u8; 3];
    for y in (0..height).rev() {
        for x in 0..width {
            let [r, g, b] = img.get(x, y);
            out.extend_from_slice(&[b, g, r]);
        }
        out.extend_from_slice(&pad[..padding]);
    }

    Ok(Bytes::from(out))
}
