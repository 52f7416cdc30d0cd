//! Texture upload helpers for WebGL / OpenGL.
//!
//! Bitmaps are uploaded as RGBA8 with `UNSIGNED_BYTE` texels. Vertical
//! flipping is done on the CPU so that it behaves the same on native GL,
//! where `UNPACK_FLIP_Y_WEBGL` does not exist.

use crate::bitmap::Bitmap;
use crate::command::TextureFilter;

/// GL enum for a texture filter.
pub fn gl_filter(filter: TextureFilter) -> u32 {
    match filter {
        TextureFilter::Nearest => glow::NEAREST,
        TextureFilter::Linear => glow::LINEAR,
        TextureFilter::NearestMipmapNearest => glow::NEAREST_MIPMAP_NEAREST,
        TextureFilter::LinearMipmapNearest => glow::LINEAR_MIPMAP_NEAREST,
        TextureFilter::NearestMipmapLinear => glow::NEAREST_MIPMAP_LINEAR,
        TextureFilter::LinearMipmapLinear => glow::LINEAR_MIPMAP_LINEAR,
    }
}

/// Creates a `TEXTURE_2D`, binds it and uploads `bitmap` as level 0.
///
/// The texture is left bound so filter and mipmap calls can follow.
///
/// # Errors
///
/// Returns an error string if the GL context fails to create the texture
/// or a side does not fit in `i32`.
#[allow(unsafe_code)]
pub fn upload_bitmap(
    gl: &glow::Context,
    bitmap: &Bitmap,
    flip_y: bool,
) -> Result<glow::Texture, String> {
    use glow::HasContext;

    let width = i32::try_from(bitmap.width()).map_err(|e| e.to_string())?;
    let height = i32::try_from(bitmap.height()).map_err(|e| e.to_string())?;
    let flipped;
    let pixels = if flip_y {
        flipped = bitmap.flipped_vertically();
        flipped.data()
    } else {
        bitmap.data()
    };

    // SAFETY: glow wraps raw GL calls as unsafe. The pixel slice holds exactly
    // width * height * 4 bytes, matching the RGBA/UNSIGNED_BYTE upload.
    let texture = unsafe { gl.create_texture()? };

    unsafe {
        gl.bind_texture(glow::TEXTURE_2D, Some(texture));
        // rows of RGBA8 are always 4-byte aligned, but be explicit
        gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 4);
        gl.tex_image_2d(
            glow::TEXTURE_2D,
            0,
            glow::RGBA as i32,
            width,
            height,
            0,
            glow::RGBA,
            glow::UNSIGNED_BYTE,
            glow::PixelUnpackData::Slice(Some(pixels)),
        );
    }

    Ok(texture)
}

/// Sets magnification and minification filters on the bound `TEXTURE_2D`.
#[allow(unsafe_code)]
pub fn set_filters(gl: &glow::Context, mag: TextureFilter, min: TextureFilter) {
    use glow::HasContext;

    // SAFETY: only texture parameters of the currently bound texture change.
    unsafe {
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, gl_filter(mag) as i32);
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, gl_filter(min) as i32);
    }
}
