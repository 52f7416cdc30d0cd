//! RGBA8 pixel buffer.
//!
//! A `Bitmap` stores `width * height` pixels of four bytes each in row-major
//! order. Pixel `(x, y)` lives at byte offset `4 * (y * width + x)`, with row 0
//! at the top, the same layout as a 2D canvas `ImageData`.

use crate::error::RenderError;

/// Bytes per RGBA8 pixel.
pub const CHANNELS: usize = 4;

/// An RGBA8 pixel grid, populated on the CPU and handed to a backend for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

fn byte_len(width: usize, height: usize) -> Result<usize, RenderError> {
    if width == 0 || height == 0 {
        return Err(RenderError::InvalidDimensions);
    }
    width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(CHANNELS))
        .ok_or(RenderError::InvalidDimensions)
}

impl Bitmap {
    /// Creates a fully transparent black bitmap.
    ///
    /// Returns `RenderError::InvalidDimensions` if either side is zero or the
    /// byte length overflows `usize`.
    pub fn new(width: usize, height: usize) -> Result<Self, RenderError> {
        let len = byte_len(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![0; len],
        })
    }

    /// Wraps an existing RGBA buffer.
    ///
    /// Returns `RenderError::DimensionMismatch` if `data.len()` is not
    /// `width * height * 4`.
    pub fn from_raw(width: usize, height: usize, data: Vec<u8>) -> Result<Self, RenderError> {
        let expected = byte_len(width, height)?;
        if data.len() != expected {
            return Err(RenderError::DimensionMismatch {
                width,
                height,
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Total byte length, always `width * height * 4`.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always false: a bitmap has at least one pixel.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Raw RGBA bytes in row-major order.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable access to the raw RGBA bytes.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Consumes the bitmap and returns its bytes.
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    fn offset(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.width && y < self.height).then(|| CHANNELS * (y * self.width + x))
    }

    /// Returns the pixel at `(x, y)`, or `None` outside the bitmap.
    pub fn get(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        let i = self.offset(x, y)?;
        let mut px = [0u8; 4];
        px.copy_from_slice(&self.data[i..i + CHANNELS]);
        Some(px)
    }

    /// Writes the pixel at `(x, y)`.
    ///
    /// Returns `RenderError::OutOfBounds` outside the bitmap.
    pub fn set(&mut self, x: usize, y: usize, px: [u8; 4]) -> Result<(), RenderError> {
        let i = self.offset(x, y).ok_or(RenderError::OutOfBounds {
            x,
            y,
            width: self.width,
            height: self.height,
        })?;
        self.data[i..i + CHANNELS].copy_from_slice(&px);
        Ok(())
    }

    /// Iterates over pixels as `(x, y, rgba)` in memory order.
    pub fn pixels(&self) -> impl Iterator<Item = (usize, usize, [u8; 4])> + '_ {
        let w = self.width;
        self.data.chunks_exact(CHANNELS).enumerate().map(move |(idx, px)| {
            (idx % w, idx / w, [px[0], px[1], px[2], px[3]])
        })
    }

    /// Reverses the row order in place, so row 0 becomes the bottom row.
    ///
    /// GL expects the first uploaded row to be the bottom of the texture; this
    /// is the CPU-side equivalent of `UNPACK_FLIP_Y_WEBGL`.
    pub fn flip_vertical(&mut self) {
        let stride = self.width * CHANNELS;
        let h = self.height;
        for y in 0..h / 2 {
            let (top, bottom) = self.data.split_at_mut((h - 1 - y) * stride);
            top[y * stride..(y + 1) * stride].swap_with_slice(&mut bottom[..stride]);
        }
    }

    /// Returns a vertically flipped copy.
    pub fn flipped_vertically(&self) -> Self {
        let mut flipped = self.clone();
        flipped.flip_vertical();
        flipped
    }
}
