//! CPU-side PNG export of a [`Bitmap`].
//!
//! Feature-gated behind `png` so that WASM builds do not pull in the `image`
//! crate.

use std::path::Path;

use crate::bitmap::Bitmap;
use crate::error::RenderError;

/// Writes `bitmap` as an RGBA PNG, row 0 at the top of the image.
///
/// Returns `RenderError::InvalidDimensions` if a side overflows `u32`, or
/// `RenderError::Io` on write failure.
pub fn write_png(bitmap: &Bitmap, path: &Path) -> Result<(), RenderError> {
    let w = u32::try_from(bitmap.width()).map_err(|_| RenderError::InvalidDimensions)?;
    let h = u32::try_from(bitmap.height()).map_err(|_| RenderError::InvalidDimensions)?;
    let img = image::RgbaImage::from_raw(w, h, bitmap.data().to_vec())
        .ok_or_else(|| RenderError::Io("RGBA buffer size mismatch".into()))?;
    img.save(path).map_err(|e| RenderError::Io(e.to_string()))
}
