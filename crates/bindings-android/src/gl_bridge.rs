// Texture bridge backed by the native GL helper library (libTexplayGl.so)

use std::ffi::c_int;
use texplay_core::{PlaybackError, Result, TextureBridge, TextureHandle};

#[link(name = "TexplayGl")]
extern "C" {
    fn texplay_gl_init(gl_version: c_int);
    fn texplay_gl_init_media_texture() -> c_int;
    fn texplay_gl_bind_media_texture(media_texture: c_int);
    fn texplay_gl_init_fbo(dest_texture: c_int, width: c_int, height: c_int) -> c_int;
    fn texplay_gl_copy_texture(
        media_texture: c_int,
        dest_texture: c_int,
        frame_buffer: c_int,
        transform: *const f32,
        width: c_int,
        height: c_int,
    ) -> c_int;
}

/// GL names are positive; the library reports failure with zero or less.
fn gl_handle(what: &str, handle: c_int) -> Result<TextureHandle> {
    if handle > 0 {
        Ok(handle)
    } else {
        Err(PlaybackError::Texture(format!("{} returned {}", what, handle)))
    }
}

/// Calls must come from the thread that owns the host's GL context.
pub struct NativeTextureBridge;

impl TextureBridge for NativeTextureBridge {
    fn initialize(&self, gl_version: i32) {
        unsafe { texplay_gl_init(gl_version) }
    }

    fn allocate_media_texture(&self) -> Result<TextureHandle> {
        gl_handle("texplay_gl_init_media_texture", unsafe {
            texplay_gl_init_media_texture()
        })
    }

    fn bind_media_texture(&self, media_texture: TextureHandle) {
        unsafe { texplay_gl_bind_media_texture(media_texture) }
    }

    fn allocate_frame_buffer(
        &self,
        dest_texture: TextureHandle,
        width: i32,
        height: i32,
    ) -> Result<TextureHandle> {
        gl_handle("texplay_gl_init_fbo", unsafe {
            texplay_gl_init_fbo(dest_texture, width, height)
        })
    }

    fn copy_frame(
        &self,
        media_texture: TextureHandle,
        dest_texture: TextureHandle,
        frame_buffer: TextureHandle,
        transform: &[f32; 16],
        width: i32,
        height: i32,
    ) -> Result<()> {
        // transform outlives the call; the library does not keep the pointer
        let status = unsafe {
            texplay_gl_copy_texture(
                media_texture,
                dest_texture,
                frame_buffer,
                transform.as_ptr(),
                width,
                height,
            )
        };
        if status == 0 {
            Ok(())
        } else {
            Err(PlaybackError::Texture(format!(
                "texplay_gl_copy_texture failed with {}",
                status
            )))
        }
    }
}
