// Handle registry: the host keeps an i64 id, the controller lives here

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use texplay_core::{PlaybackController, PlaybackError, Result};

static PLAYER_REGISTRY: Lazy<Mutex<HashMap<i64, Arc<PlaybackController>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));
static NEXT_PLAYER_ID: Lazy<Mutex<i64>> = Lazy::new(|| Mutex::new(1));

pub fn register_player(controller: PlaybackController) -> i64 {
    let mut next = NEXT_PLAYER_ID.lock();
    let id = *next;
    *next += 1;
    drop(next);

    PLAYER_REGISTRY.lock().insert(id, Arc::new(controller));
    log::debug!("Registered player {}", id);
    id
}

/// Run `f` on the player without holding the registry lock, so host
/// callbacks fired from inside `f` may use the registry again.
pub fn with_player<R>(id: i64, f: impl FnOnce(&PlaybackController) -> R) -> Result<R> {
    let player = PLAYER_REGISTRY
        .lock()
        .get(&id)
        .cloned()
        .ok_or_else(|| PlaybackError::InvalidState(format!("Invalid player ID {}", id)))?;
    Ok(f(&player))
}

pub fn remove_player(id: i64) -> Option<Arc<PlaybackController>> {
    PLAYER_REGISTRY.lock().remove(&id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host_events::{HostEvent, EVENT_STATE_CHANGED};
    use texplay_core::{
        CallbackEvent, Collaborators, DecoderEventSender, DecoderFactory, MediaDecoder, MediaKind, MediaSource,
        MediaState, NoAssets, PlatformCapabilities, PlayerCallback, PlayerConfig, SeekRequest,
        SurfaceFactory,
        SurfaceTexture, TextureBridge, TextureHandle,
    };

    /// Platform with no decoder and no GL, enough for full-screen sessions.
    struct Headless;

    impl DecoderFactory for Headless {
        fn create(
            &self,
            _source: &MediaSource,
            _surface: &dyn SurfaceTexture,
            _events: DecoderEventSender,
        ) -> Result<Box<dyn MediaDecoder>> {
            Err(PlaybackError::Platform("no decoder".into()))
        }
    }

    impl SurfaceFactory for Headless {
        fn create(&self, _media_texture: TextureHandle) -> Result<Box<dyn SurfaceTexture>> {
            Err(PlaybackError::Surface("no surface".into()))
        }
    }

    impl TextureBridge for Headless {
        fn initialize(&self, _gl_version: i32) {}

        fn allocate_media_texture(&self) -> Result<TextureHandle> {
            Err(PlaybackError::Texture("no GL".into()))
        }

        fn bind_media_texture(&self, _media_texture: TextureHandle) {}

        fn allocate_frame_buffer(&self, _: TextureHandle, _: i32, _: i32) -> Result<TextureHandle> {
            Err(PlaybackError::Texture("no GL".into()))
        }

        fn copy_frame(
            &self,
            _: TextureHandle,
            _: TextureHandle,
            _: TextureHandle,
            _: &[f32; 16],
            _: i32,
            _: i32,
        ) -> Result<()> {
            Err(PlaybackError::Texture("no GL".into()))
        }
    }

    /// Stands in for the Java listener: records what it would be called with.
    #[derive(Default)]
    struct RecordingListener {
        calls: Mutex<Vec<HostEvent>>,
    }

    impl PlayerCallback for RecordingListener {
        fn on_event(&self, event: CallbackEvent) {
            self.calls.lock().push(HostEvent::from(event));
        }
    }

    fn headless_player() -> PlaybackController {
        let headless = Arc::new(Headless);
        PlaybackController::new(
            Collaborators {
                decoders: headless.clone(),
                surfaces: headless.clone(),
                textures: headless,
                assets: Arc::new(NoAssets),
            },
            PlatformCapabilities::full(),
            PlayerConfig::default(),
        )
    }

    #[test]
    fn test_ids_are_unique() {
        let a = register_player(headless_player());
        let b = register_player(headless_player());
        assert_ne!(a, b);
        assert!(remove_player(a).is_some());
        assert!(remove_player(b).is_some());
    }

    #[test]
    fn test_unknown_id_is_an_error() {
        let err = with_player(-42, |p| p.status()).unwrap_err();
        assert!(matches!(err, PlaybackError::InvalidState(_)));
    }

    #[test]
    fn test_removed_player_is_gone() {
        let id = register_player(headless_player());
        let status = with_player(id, |p| {
            assert!(p.initialize(3));
            assert!(p.load("/sdcard/clip.mp4", MediaKind::OnTextureFullscreen, false, SeekRequest::Current));
            p.status()
        })
        .unwrap();
        // Surface creation fails, so only full-screen playback remains
        assert_eq!(status, MediaState::Ready);

        assert!(remove_player(id).is_some());
        assert!(with_player(id, |p| p.status()).is_err());
        assert!(remove_player(id).is_none());
    }

    #[test]
    fn test_listener_set_through_registry_receives_events() {
        let id = register_player(headless_player());
        let listener = Arc::new(RecordingListener::default());
        with_player(id, |p| {
            p.set_callback(Some(listener.clone()));
            assert!(p.initialize(3));
            assert!(p.load("/sdcard/clip.mp4", MediaKind::Fullscreen, false, SeekRequest::Current));
        })
        .unwrap();

        let calls = listener.calls.lock().clone();
        assert_eq!(
            calls,
            vec![HostEvent {
                kind: EVENT_STATE_CHANGED,
                arg1: MediaState::NotReady.code(),
                arg2: MediaState::Ready.code(),
                message: None,
            }]
        );

        // Detaching stops delivery
        with_player(id, |p| {
            p.set_callback(None);
            assert!(p.unload());
        })
        .unwrap();
        assert_eq!(listener.calls.lock().len(), 1);
        assert!(remove_player(id).is_some());
    }
}
