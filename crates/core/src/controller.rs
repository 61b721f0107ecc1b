// Playback controller
// Owns the decoder, the surface texture and the session state behind one lock

use crate::callback::{CallbackEvent, CallbackManager, PlayerCallback};
use crate::capability::{normalize_gl_version, PlatformCapabilities};
use crate::config::PlayerConfig;
use crate::decoder::{DecoderEvent, DecoderEventSender, DecoderFactory, DecoderMessage, MediaDecoder};
use crate::error::{PlaybackError, Result};
use crate::source::{AssetLookup, MediaSource};
use crate::state::{seconds_to_millis, MediaKind, MediaState, SeekRequest, SessionSnapshot};
use crate::texture::{SurfaceFactory, SurfaceTexture, TextureBridge, TextureHandle, INVALID_HANDLE};
use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;
use std::sync::Arc;

/// Platform services the controller drives
#[derive(Clone)]
pub struct Collaborators {
    pub decoders: Arc<dyn DecoderFactory>,
    pub surfaces: Arc<dyn SurfaceFactory>,
    pub textures: Arc<dyn TextureBridge>,
    pub assets: Arc<dyn AssetLookup>,
}

struct Session {
    initialized: bool,
    state: MediaState,
    kind: MediaKind,
    source: Option<MediaSource>,
    seek_request: SeekRequest,
    auto_play: bool,
    buffering_percent: i32,
    decoder: Option<Box<dyn MediaDecoder>>,
    /// Bumped for every decoder created; events carrying an older value are stale
    generation: u64,
    surface: Option<Box<dyn SurfaceTexture>>,
    media_texture: TextureHandle,
    dest_texture: TextureHandle,
    frame_buffer: TextureHandle,
    /// Host notifications raised under the lock, dispatched after it is released
    notifications: Vec<CallbackEvent>,
}

impl Session {
    fn new() -> Self {
        Self {
            initialized: false,
            state: MediaState::NotReady,
            kind: MediaKind::Unknown,
            source: None,
            seek_request: SeekRequest::Current,
            auto_play: false,
            buffering_percent: 0,
            decoder: None,
            generation: 0,
            surface: None,
            media_texture: INVALID_HANDLE,
            dest_texture: INVALID_HANDLE,
            frame_buffer: INVALID_HANDLE,
            notifications: Vec::new(),
        }
    }

    fn set_state(&mut self, new_state: MediaState) {
        let old_state = self.state;
        self.state = new_state;
        if old_state != new_state {
            log::debug!("Media state: {:?} -> {:?}", old_state, new_state);
            self.notifications
                .push(CallbackEvent::StateChanged { old_state, new_state });
        }
    }

    fn release_decoder(&mut self) {
        if let Some(mut decoder) = self.decoder.take() {
            if let Err(e) = decoder.stop() {
                log::error!("Could not stop decoder before release: {}", e);
            }
            decoder.release();
        }
    }

    fn release_surface(&mut self) {
        if let Some(mut surface) = self.surface.take() {
            surface.release();
        }
        self.media_texture = INVALID_HANDLE;
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state,
            kind: self.kind,
            source: self.source.as_ref().map(|s| s.path().to_string()),
            auto_play: self.auto_play,
            buffering_percent: self.buffering_percent,
            media_texture: self.media_texture,
            dest_texture: self.dest_texture,
            frame_buffer: self.frame_buffer,
            decoder_live: self.decoder.is_some(),
        }
    }
}

/// Drives one video session: a decoder rendering into a surface texture whose
/// frames are copied into a host-owned GL texture.
///
/// Every public method takes the session lock, first applies any queued
/// decoder events and then performs its own checks and mutation. Host
/// callbacks run after the lock is released, so they may call back in.
pub struct PlaybackController {
    session: Mutex<Session>,
    events_tx: Sender<DecoderMessage>,
    events_rx: Receiver<DecoderMessage>,
    capabilities: PlatformCapabilities,
    collaborators: Collaborators,
    callbacks: CallbackManager,
    config: PlayerConfig,
}

impl PlaybackController {
    pub fn new(
        collaborators: Collaborators,
        capabilities: PlatformCapabilities,
        config: PlayerConfig,
    ) -> Self {
        let (events_tx, events_rx) = crossbeam_channel::unbounded();
        Self {
            session: Mutex::new(Session::new()),
            events_tx,
            events_rx,
            capabilities,
            collaborators,
            callbacks: CallbackManager::new(),
            config,
        }
    }

    /// Replace the host listener. `None` removes it.
    pub fn set_callback(&self, callback: Option<Arc<dyn PlayerCallback>>) {
        self.callbacks.clear_callbacks();
        if let Some(callback) = callback {
            self.callbacks
                .add_callback(callback, self.config.buffering_throttle_ms);
        }
    }

    fn with_session<R>(&self, f: impl FnOnce(&mut Session) -> R) -> R {
        let (result, notifications) = {
            let mut session = self.session.lock();
            self.apply_decoder_events(&mut session);
            let result = f(&mut session);
            (result, std::mem::take(&mut session.notifications))
        };
        for event in notifications {
            self.callbacks.dispatch_event(event);
        }
        result
    }

    fn apply_decoder_events(&self, session: &mut Session) {
        while let Ok(message) = self.events_rx.try_recv() {
            if message.generation != session.generation || session.decoder.is_none() {
                log::debug!(
                    "Dropping {:?} from released decoder #{}",
                    message.event,
                    message.generation
                );
                continue;
            }
            match message.event {
                DecoderEvent::Prepared => self.on_prepared(session),
                DecoderEvent::BufferingUpdate(percent) => {
                    self.on_buffering_update(session, percent)
                }
                DecoderEvent::Completion => self.on_completion(session),
                DecoderEvent::Error { what, extra } => self.on_error(session, what, extra),
            }
        }
    }

    /// Apply queued decoder events without doing anything else.
    pub fn pump_events(&self) {
        self.with_session(|_| ());
    }

    fn texture_playable(&self, session: &Session) -> bool {
        self.capabilities.texture_playback && session.kind.includes_texture()
    }

    fn operable(&self, session: &Session, op: &str) -> bool {
        if !self.texture_playable(session) {
            log::debug!("Cannot {}: media is not playable on texture", op);
            return false;
        }
        if !session.state.is_operable() {
            log::debug!("Cannot {}: media is {:?}", op, session.state);
            return false;
        }
        true
    }

    // Lifecycle

    pub fn initialize(&self, gl_version: i32) -> bool {
        let gl_version = normalize_gl_version(gl_version);
        self.with_session(|s| {
            self.collaborators.textures.initialize(gl_version);
            s.initialized = true;
            log::info!(
                "Playback controller initialized (OpenGL {}, API level {})",
                gl_version,
                self.capabilities.sdk_level
            );
            true
        })
    }

    /// Unload and release the surface texture.
    pub fn shutdown(&self) -> bool {
        self.with_session(|s| {
            self.unload_session(s);
            s.release_surface();
            s.dest_texture = INVALID_HANDLE;
            s.frame_buffer = INVALID_HANDLE;
            s.initialized = false;
            log::info!("Playback controller shut down");
            true
        })
    }

    pub fn load(&self, path: &str, kind: MediaKind, auto_play: bool, seek: SeekRequest) -> bool {
        self.with_session(|s| match self.load_session(s, path, kind, auto_play, seek) {
            Ok(()) => true,
            Err(PlaybackError::InvalidState(msg)) => {
                log::debug!("Cannot load {}: {}", path, msg);
                false
            }
            Err(e) => {
                log::error!("Could not load {}: {}", path, e);
                false
            }
        })
    }

    fn load_session(
        &self,
        s: &mut Session,
        path: &str,
        kind: MediaKind,
        auto_play: bool,
        seek: SeekRequest,
    ) -> Result<()> {
        if !s.initialized {
            return Err(PlaybackError::InvalidState("controller not initialized".into()));
        }
        if s.state == MediaState::Ready || s.decoder.is_some() {
            return Err(PlaybackError::InvalidState("already loaded".into()));
        }

        let source = MediaSource::resolve(path, self.collaborators.assets.as_ref());
        log::info!("Loading {:?} as {:?}", source, kind);
        s.buffering_percent = 0;

        let mut on_texture = false;
        if kind.includes_texture() && self.capabilities.texture_playback {
            match self.attach_surface(s) {
                Ok(()) => {
                    if let Err(e) = self.start_decoder(s, &source) {
                        s.set_state(MediaState::Error);
                        return Err(e);
                    }
                    s.auto_play = auto_play;
                    on_texture = true;
                }
                Err(e) => log::debug!("Surface texture not ready, skipping texture playback: {}", e),
            }
        }

        s.source = Some(source);
        s.seek_request = seek;
        s.kind = MediaKind::from_capabilities(on_texture, kind.includes_fullscreen());
        if s.kind == MediaKind::Fullscreen {
            s.set_state(MediaState::Ready);
        }
        Ok(())
    }

    fn attach_surface(&self, s: &mut Session) -> Result<()> {
        let textures = &self.collaborators.textures;
        let media_texture = textures.allocate_media_texture()?;
        textures.bind_media_texture(media_texture);
        let surface = self.collaborators.surfaces.create(media_texture)?;

        s.release_surface();
        s.surface = Some(surface);
        s.media_texture = media_texture;
        Ok(())
    }

    fn start_decoder(&self, s: &mut Session, source: &MediaSource) -> Result<()> {
        s.generation += 1;
        let events = DecoderEventSender::new(s.generation, self.events_tx.clone());
        let surface = s
            .surface
            .as_deref()
            .ok_or_else(|| PlaybackError::Surface("no surface texture".into()))?;

        let mut decoder = self.collaborators.decoders.create(source, surface, events)?;
        if let Err(e) = decoder.prepare_async() {
            decoder.release();
            return Err(e);
        }
        s.decoder = Some(decoder);
        Ok(())
    }

    /// Release the decoder and forget the loaded media. Always succeeds.
    pub fn unload(&self) -> bool {
        self.with_session(|s| {
            self.unload_session(s);
            true
        })
    }

    fn unload_session(&self, s: &mut Session) {
        s.release_decoder();
        s.set_state(MediaState::NotReady);
        s.kind = MediaKind::Unknown;
        s.source = None;
        s.auto_play = false;
        // The frame buffer was sized for this video
        s.dest_texture = INVALID_HANDLE;
        s.frame_buffer = INVALID_HANDLE;
    }

    // Decoder events

    fn on_prepared(&self, s: &mut Session) {
        log::info!("Media prepared");
        s.set_state(MediaState::Ready);
        if s.auto_play {
            let seek = s.seek_request;
            self.play_on_texture(s, seek);
        }
        s.seek_request = SeekRequest::Seconds(0.0);
    }

    fn on_buffering_update(&self, s: &mut Session, percent: i32) {
        s.buffering_percent = percent.clamp(0, 100);
        s.notifications.push(CallbackEvent::BufferingChanged {
            percent: s.buffering_percent,
        });
    }

    fn on_completion(&self, s: &mut Session) {
        s.set_state(MediaState::ReachedEnd);
        s.notifications.push(CallbackEvent::PlaybackCompleted);
    }

    fn on_error(&self, s: &mut Session, what: i32, extra: i32) {
        let message = format!("decoder error (what={}, extra={})", what, extra);
        log::error!("{}, unloading", message);
        self.unload_session(s);
        s.set_state(MediaState::Error);
        s.notifications.push(CallbackEvent::Error { message });
    }

    // Queries

    pub fn status(&self) -> MediaState {
        self.with_session(|s| s.state)
    }

    pub fn is_playable_on_texture(&self) -> bool {
        self.with_session(|s| self.texture_playable(s))
    }

    pub fn is_playable_fullscreen(&self) -> bool {
        self.with_session(|s| s.kind.includes_fullscreen())
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.with_session(|s| s.snapshot())
    }

    /// URI the host's full-screen player should open, once media is loaded.
    pub fn fullscreen_uri(&self) -> Option<String> {
        self.with_session(|s| {
            if !s.kind.includes_fullscreen() {
                return None;
            }
            s.source.as_ref().map(|source| source.fullscreen_uri())
        })
    }

    pub fn buffering_percent(&self) -> i32 {
        self.with_session(|s| s.buffering_percent)
    }

    fn query<T>(&self, op: &str, fallback: T, f: impl FnOnce(&dyn MediaDecoder) -> T) -> T {
        self.with_session(|s| {
            if !self.operable(s, op) {
                return fallback;
            }
            match s.decoder.as_deref() {
                Some(decoder) => f(decoder),
                None => fallback,
            }
        })
    }

    pub fn video_width(&self) -> i32 {
        self.query("get video width", -1, |d| d.video_width())
    }

    pub fn video_height(&self) -> i32 {
        self.query("get video height", -1, |d| d.video_height())
    }

    /// Media length in whole seconds.
    pub fn length_seconds(&self) -> f32 {
        self.query("get length", -1.0, |d| (d.duration_ms() / 1000) as f32)
    }

    pub fn current_position_seconds(&self) -> f32 {
        self.query("get current position", -1.0, |d| {
            d.current_position_ms() as f32 / 1000.0
        })
    }

    // Transport

    /// Full-screen playback is run by the host; only the capability is checked.
    pub fn play(&self, fullscreen: bool, seek: SeekRequest) -> bool {
        self.with_session(|s| {
            if fullscreen {
                if !s.kind.includes_fullscreen() {
                    log::debug!("Cannot play fullscreen, media was not loaded for it");
                    return false;
                }
                return true;
            }
            self.play_on_texture(s, seek)
        })
    }

    fn play_on_texture(&self, s: &mut Session, seek: SeekRequest) -> bool {
        if !self.operable(s, "play") {
            return false;
        }
        let rewind = s.state == MediaState::ReachedEnd;
        let Some(decoder) = s.decoder.as_mut() else {
            log::debug!("Cannot play: no decoder");
            return false;
        };

        let target = match seek.to_millis() {
            Some(ms) => Some(ms),
            None if rewind => Some(0),
            None => None,
        };
        if let Some(ms) = target {
            if let Err(e) = decoder.seek_to(ms) {
                log::error!("Could not seek to {} ms: {}", ms, e);
            }
        }
        if let Err(e) = decoder.start() {
            log::error!("Could not start playback: {}", e);
        }
        s.set_state(MediaState::Playing);
        true
    }

    pub fn pause(&self) -> bool {
        self.with_session(|s| self.pause_session(s))
    }

    fn pause_session(&self, s: &mut Session) -> bool {
        if !self.operable(s, "pause") {
            return false;
        }
        let Some(decoder) = s.decoder.as_mut() else {
            return false;
        };
        if !decoder.is_playing() {
            log::debug!("Cannot pause: decoder is not playing");
            return false;
        }
        if let Err(e) = decoder.pause() {
            log::error!("Could not pause playback: {}", e);
        }
        s.set_state(MediaState::Paused);
        true
    }

    /// Pause texture playback when the host activity goes to the background.
    pub fn on_host_pause(&self) {
        self.with_session(|s| {
            if s.state == MediaState::Playing {
                self.pause_session(s);
            }
        })
    }

    pub fn stop(&self) -> bool {
        self.with_session(|s| {
            if !self.operable(s, "stop") || s.decoder.is_none() {
                return false;
            }
            s.set_state(MediaState::Stopped);
            if let Some(decoder) = s.decoder.as_mut() {
                if let Err(e) = decoder.stop() {
                    log::error!("Could not stop playback: {}", e);
                }
            }
            true
        })
    }

    pub fn seek_to(&self, seconds: f32) -> bool {
        self.with_session(|s| {
            if !self.operable(s, "seek") {
                return false;
            }
            let Some(decoder) = s.decoder.as_mut() else {
                return false;
            };
            let ms = seconds_to_millis(seconds);
            if let Err(e) = decoder.seek_to(ms) {
                log::error!("Could not seek to {} ms: {}", ms, e);
            }
            true
        })
    }

    /// Same level on both channels, 0.0 to 1.0.
    pub fn set_volume(&self, level: f32) -> bool {
        self.with_session(|s| {
            if !self.operable(s, "set volume") {
                return false;
            }
            let Some(decoder) = s.decoder.as_mut() else {
                return false;
            };
            match decoder.set_volume(level, level) {
                Ok(()) => true,
                Err(e) => {
                    log::error!("Could not set volume: {}", e);
                    false
                }
            }
        })
    }

    // Frame path, called from the host's render thread

    /// Record the host texture frames are copied into and build its frame
    /// buffer. Returns false until the decoder knows the video size.
    pub fn set_destination_texture(&self, handle: TextureHandle) -> bool {
        self.with_session(|s| {
            if !self.texture_playable(s) || s.decoder.is_none() {
                log::debug!("Cannot set destination texture: media is not playable on texture");
                return false;
            }
            s.dest_texture = handle;

            let (width, height) = s
                .decoder
                .as_deref()
                .map(|d| (d.video_width(), d.video_height()))
                .unwrap_or((-1, -1));
            if width <= 0 || height <= 0 {
                log::debug!("Video size not known yet, frame buffer not created");
                return false;
            }

            match self
                .collaborators
                .textures
                .allocate_frame_buffer(handle, width, height)
            {
                Ok(frame_buffer) => {
                    s.frame_buffer = frame_buffer;
                    true
                }
                Err(e) => {
                    log::error!("Could not create frame buffer: {}", e);
                    false
                }
            }
        })
    }

    /// Copy the newest decoded frame into the destination texture when
    /// playing. Returns the state code the host should act on.
    pub fn update_video_data(&self) -> i32 {
        self.with_session(|s| {
            if !self.texture_playable(s) || s.surface.is_none() {
                return MediaState::NotReady.code();
            }
            if s.state == MediaState::Playing {
                if let Err(e) = self.copy_latest_frame(s) {
                    log::error!("Could not update video data: {}", e);
                    return MediaState::Error.code();
                }
            }
            s.state.code()
        })
    }

    fn copy_latest_frame(&self, s: &mut Session) -> Result<()> {
        let Session {
            surface,
            decoder,
            media_texture,
            dest_texture,
            frame_buffer,
            ..
        } = s;
        let surface = surface
            .as_mut()
            .ok_or_else(|| PlaybackError::Surface("no surface texture".into()))?;
        let decoder = decoder
            .as_deref()
            .ok_or_else(|| PlaybackError::Decoder("no decoder".into()))?;

        surface.update_tex_image()?;
        if *frame_buffer == INVALID_HANDLE {
            log::trace!("No destination texture yet, frame latched only");
            return Ok(());
        }
        let transform = surface.transform_matrix()?;
        self.collaborators.textures.copy_frame(
            *media_texture,
            *dest_texture,
            *frame_buffer,
            &transform,
            decoder.video_width(),
            decoder.video_height(),
        )
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        let session = self.session.get_mut();
        session.release_decoder();
        session.release_surface();
    }
}
