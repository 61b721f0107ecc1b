// GPU texture bridge and surface texture abstractions

use crate::error::Result;
use std::any::Any;

/// Opaque GL object name owned by the texture bridge.
pub type TextureHandle = i32;

/// Value of a texture, FBO or media handle that has not been allocated.
pub const INVALID_HANDLE: TextureHandle = -1;

/// Native GPU helper that owns the GL work of copying frames.
///
/// Every call must happen on the thread that owns the GL context.
pub trait TextureBridge: Send + Sync {
    /// Record which GL version the renderer uses
    fn initialize(&self, gl_version: i32);

    /// Create an external (OES) texture for the surface texture to write into
    fn allocate_media_texture(&self) -> Result<TextureHandle>;

    fn bind_media_texture(&self, media_texture: TextureHandle);

    /// Size `dest_texture` to the video and attach it to a new frame buffer
    fn allocate_frame_buffer(
        &self,
        dest_texture: TextureHandle,
        width: i32,
        height: i32,
    ) -> Result<TextureHandle>;

    /// Draw the current media frame into `dest_texture` through `frame_buffer`
    fn copy_frame(
        &self,
        media_texture: TextureHandle,
        dest_texture: TextureHandle,
        frame_buffer: TextureHandle,
        transform: &[f32; 16],
        width: i32,
        height: i32,
    ) -> Result<()>;
}

/// Platform object that exposes decoded frames as a GL texture
pub trait SurfaceTexture: Send {
    /// Latch the most recent decoded frame into the media texture
    fn update_tex_image(&mut self) -> Result<()>;

    /// Texture-coordinate transform for the latched frame, column-major 4x4
    fn transform_matrix(&mut self) -> Result<[f32; 16]>;

    fn release(&mut self);

    /// Downcast to the platform type (decoders need the concrete surface)
    fn as_any(&self) -> &dyn Any;
}

/// Creates surface textures on top of a media texture
pub trait SurfaceFactory: Send + Sync {
    fn create(&self, media_texture: TextureHandle) -> Result<Box<dyn SurfaceTexture>>;
}
