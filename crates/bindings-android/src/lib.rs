// Android bindings for texplay
// Exposes the playback controller to the host engine through JNI and routes
// MediaPlayer listener callbacks back into it.

mod host_events;
mod listener;
mod logging;
mod registry;

#[cfg(target_os = "android")]
mod assets;
#[cfg(target_os = "android")]
mod gl_bridge;
#[cfg(target_os = "android")]
mod host_listener;
#[cfg(target_os = "android")]
mod jni_exports;
#[cfg(target_os = "android")]
mod jvm;
#[cfg(target_os = "android")]
mod media_player;
#[cfg(target_os = "android")]
mod surface_texture;

pub use host_events::HostEvent;
pub use listener::{post_event, register_listener, unregister_listener};
pub use logging::{init_logging, LOG_TAG};
pub use registry::{register_player, remove_player, with_player};
