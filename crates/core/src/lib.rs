// Core types and traits for texplay video-on-texture playback

pub mod callback;
pub mod capability;
pub mod config;
pub mod controller;
pub mod decoder;
pub mod error;
pub mod source;
pub mod state;
pub mod texture;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use callback::{CallbackEvent, CallbackManager, PlayerCallback};
pub use capability::{normalize_gl_version, PlatformCapabilities};
pub use config::PlayerConfig;
pub use controller::{Collaborators, PlaybackController};
pub use decoder::{DecoderEvent, DecoderEventSender, DecoderFactory, DecoderMessage, MediaDecoder};
pub use error::{PlaybackError, Result};
pub use source::{AssetLookup, MediaSource, NoAssets};
pub use state::{MediaKind, MediaState, SeekRequest, SessionSnapshot, CURRENT_POSITION};
pub use texture::{SurfaceFactory, SurfaceTexture, TextureBridge, TextureHandle, INVALID_HANDLE};
