//! Image canonicalisation: any decodable image → RGB8 PNG in memory.
//!
//! PNG is lossless, so once an image has been converted to RGB the second
//! pass is pixel-identical to the first. Palette, grey and alpha images are
//! flattened to RGB; alpha is dropped, not composited. No resizing and no
//! encoder tuning.

use crate::content::PngImage;
use crate::error::ExtractionError;
use image::DynamicImage;
use std::io::Cursor;
use tracing::debug;

/// Decode `bytes` and re-encode them as an RGB PNG.
pub fn canonicalize_image(bytes: &[u8]) -> Result<PngImage, ExtractionError> {
    let decoded = image::load_from_memory(bytes).map_err(ExtractionError::ImageDecode)?;
    debug!(
        "Decoded image {}x{} ({:?})",
        decoded.width(),
        decoded.height(),
        decoded.color()
    );
    encode_rgb_png(decoded)
}

fn encode_rgb_png(img: DynamicImage) -> Result<PngImage, ExtractionError> {
    let rgb = match img {
        DynamicImage::ImageRgb8(_) => img,
        other => DynamicImage::ImageRgb8(other.to_rgb8()),
    };

    let mut buf = Vec::new();
    rgb.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(ExtractionError::ImageEncode)?;

    debug!("Encoded image → {} bytes PNG", buf.len());

    Ok(PngImage {
        bytes: buf,
        width: rgb.width(),
        height: rgb.height(),
    })
}
