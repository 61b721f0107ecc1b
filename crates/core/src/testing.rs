// Recording collaborators for controller tests

use crate::capability::PlatformCapabilities;
use crate::config::PlayerConfig;
use crate::controller::{Collaborators, PlaybackController};
use crate::decoder::{DecoderEvent, DecoderEventSender, DecoderFactory, MediaDecoder};
use crate::error::{PlaybackError, Result};
use crate::source::{AssetLookup, MediaSource};
use crate::texture::{SurfaceFactory, SurfaceTexture, TextureBridge, TextureHandle};
use parking_lot::Mutex;
use std::any::Any;
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicUsize, Ordering};
use std::sync::Arc;

pub fn init_test_logging() {
    let _ = env_logger::builder()
        .is_test(true)
        .filter_level(log::LevelFilter::Debug)
        .try_init();
}

#[derive(Debug, Clone, PartialEq)]
pub enum DecoderCall {
    PrepareAsync,
    Start,
    Pause,
    Stop,
    SeekTo(i32),
    SetVolume(f32, f32),
    Release,
}

pub struct DecoderLog {
    pub calls: Vec<DecoderCall>,
    pub playing: bool,
    pub width: i32,
    pub height: i32,
    pub duration_ms: i32,
    pub position_ms: i32,
}

impl Default for DecoderLog {
    fn default() -> Self {
        Self {
            calls: Vec::new(),
            playing: false,
            width: 640,
            height: 360,
            duration_ms: 95_500,
            position_ms: 1_250,
        }
    }
}

struct MockDecoder {
    log: Arc<Mutex<DecoderLog>>,
    fail_start: bool,
}

impl MediaDecoder for MockDecoder {
    fn prepare_async(&mut self) -> Result<()> {
        self.log.lock().calls.push(DecoderCall::PrepareAsync);
        Ok(())
    }

    fn start(&mut self) -> Result<()> {
        let mut log = self.log.lock();
        log.calls.push(DecoderCall::Start);
        if self.fail_start {
            return Err(PlaybackError::Decoder("start refused".into()));
        }
        log.playing = true;
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        let mut log = self.log.lock();
        log.calls.push(DecoderCall::Pause);
        log.playing = false;
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        let mut log = self.log.lock();
        log.calls.push(DecoderCall::Stop);
        log.playing = false;
        Ok(())
    }

    fn seek_to(&mut self, position_ms: i32) -> Result<()> {
        let mut log = self.log.lock();
        log.calls.push(DecoderCall::SeekTo(position_ms));
        log.position_ms = position_ms;
        Ok(())
    }

    fn set_volume(&mut self, left: f32, right: f32) -> Result<()> {
        self.log.lock().calls.push(DecoderCall::SetVolume(left, right));
        Ok(())
    }

    fn is_playing(&self) -> bool {
        self.log.lock().playing
    }

    fn video_width(&self) -> i32 {
        self.log.lock().width
    }

    fn video_height(&self) -> i32 {
        self.log.lock().height
    }

    fn duration_ms(&self) -> i32 {
        self.log.lock().duration_ms
    }

    fn current_position_ms(&self) -> i32 {
        self.log.lock().position_ms
    }

    fn release(&mut self) {
        let mut log = self.log.lock();
        log.calls.push(DecoderCall::Release);
        log.playing = false;
    }
}

#[derive(Default)]
pub struct MockDecoderFactory {
    pub log: Arc<Mutex<DecoderLog>>,
    pub senders: Mutex<Vec<DecoderEventSender>>,
    pub sources: Mutex<Vec<MediaSource>>,
    pub fail_create: AtomicBool,
    pub fail_start: AtomicBool,
}

impl MockDecoderFactory {
    pub fn created(&self) -> usize {
        self.senders.lock().len()
    }

    /// Raise an event from the most recently created decoder.
    pub fn fire(&self, event: DecoderEvent) {
        let sender = self.senders.lock().last().cloned();
        sender.expect("no decoder created").send(event);
    }

    /// Raise an event from the decoder created `index`-th.
    pub fn fire_from(&self, index: usize, event: DecoderEvent) {
        let sender = self.senders.lock()[index].clone();
        sender.send(event);
    }

    pub fn calls(&self) -> Vec<DecoderCall> {
        self.log.lock().calls.clone()
    }
}

impl DecoderFactory for MockDecoderFactory {
    fn create(
        &self,
        source: &MediaSource,
        surface: &dyn SurfaceTexture,
        events: DecoderEventSender,
    ) -> Result<Box<dyn MediaDecoder>> {
        assert!(surface.as_any().downcast_ref::<MockSurface>().is_some());
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(PlaybackError::Decoder("could not create media player".into()));
        }
        self.sources.lock().push(source.clone());
        self.senders.lock().push(events);
        Ok(Box::new(MockDecoder {
            log: self.log.clone(),
            fail_start: self.fail_start.load(Ordering::SeqCst),
        }))
    }
}

#[derive(Default)]
pub struct SurfaceLog {
    pub updates: u32,
    pub released: u32,
    pub fail_update: bool,
}

pub struct MockSurface {
    log: Arc<Mutex<SurfaceLog>>,
}

impl SurfaceTexture for MockSurface {
    fn update_tex_image(&mut self) -> Result<()> {
        let mut log = self.log.lock();
        if log.fail_update {
            return Err(PlaybackError::Surface("updateTexImage failed".into()));
        }
        log.updates += 1;
        Ok(())
    }

    fn transform_matrix(&mut self) -> Result<[f32; 16]> {
        let mut m = [0.0; 16];
        m[0] = 1.0;
        m[5] = -1.0;
        m[10] = 1.0;
        m[13] = 1.0;
        m[15] = 1.0;
        Ok(m)
    }

    fn release(&mut self) {
        self.log.lock().released += 1;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Default)]
pub struct MockSurfaceFactory {
    pub log: Arc<Mutex<SurfaceLog>>,
    pub created: AtomicUsize,
    pub fail: AtomicBool,
}

impl SurfaceFactory for MockSurfaceFactory {
    fn create(&self, _media_texture: TextureHandle) -> Result<Box<dyn SurfaceTexture>> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(PlaybackError::Surface("SurfaceTexture constructor missing".into()));
        }
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockSurface {
            log: self.log.clone(),
        }))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CopyCall {
    pub media_texture: TextureHandle,
    pub dest_texture: TextureHandle,
    pub frame_buffer: TextureHandle,
    pub width: i32,
    pub height: i32,
}

pub struct MockTextureBridge {
    pub gl_version: Mutex<Option<i32>>,
    pub next_handle: AtomicI32,
    pub bound: Mutex<Vec<TextureHandle>>,
    pub frame_buffers: Mutex<Vec<(TextureHandle, i32, i32)>>,
    pub copies: Mutex<Vec<CopyCall>>,
}

impl Default for MockTextureBridge {
    fn default() -> Self {
        Self {
            gl_version: Mutex::new(None),
            next_handle: AtomicI32::new(10),
            bound: Mutex::new(Vec::new()),
            frame_buffers: Mutex::new(Vec::new()),
            copies: Mutex::new(Vec::new()),
        }
    }
}

impl TextureBridge for MockTextureBridge {
    fn initialize(&self, gl_version: i32) {
        *self.gl_version.lock() = Some(gl_version);
    }

    fn allocate_media_texture(&self) -> Result<TextureHandle> {
        Ok(self.next_handle.fetch_add(1, Ordering::SeqCst))
    }

    fn bind_media_texture(&self, media_texture: TextureHandle) {
        self.bound.lock().push(media_texture);
    }

    fn allocate_frame_buffer(
        &self,
        dest_texture: TextureHandle,
        width: i32,
        height: i32,
    ) -> Result<TextureHandle> {
        self.frame_buffers.lock().push((dest_texture, width, height));
        Ok(self.next_handle.fetch_add(1, Ordering::SeqCst))
    }

    fn copy_frame(
        &self,
        media_texture: TextureHandle,
        dest_texture: TextureHandle,
        frame_buffer: TextureHandle,
        _transform: &[f32; 16],
        width: i32,
        height: i32,
    ) -> Result<()> {
        self.copies.lock().push(CopyCall {
            media_texture,
            dest_texture,
            frame_buffer,
            width,
            height,
        });
        Ok(())
    }
}

pub struct Bundle(pub Vec<String>);

impl AssetLookup for Bundle {
    fn is_asset(&self, path: &str) -> bool {
        self.0.iter().any(|p| p == path)
    }
}

pub struct Harness {
    pub controller: PlaybackController,
    pub decoders: Arc<MockDecoderFactory>,
    pub surfaces: Arc<MockSurfaceFactory>,
    pub textures: Arc<MockTextureBridge>,
}

impl Harness {
    /// Controller on a fully capable platform, already initialized.
    pub fn new() -> Self {
        let harness = Self::uninitialized(PlatformCapabilities::full());
        assert!(harness.controller.initialize(3));
        harness
    }

    pub fn with_capabilities(capabilities: PlatformCapabilities) -> Self {
        let harness = Self::uninitialized(capabilities);
        assert!(harness.controller.initialize(2));
        harness
    }

    pub fn uninitialized(capabilities: PlatformCapabilities) -> Self {
        init_test_logging();
        let decoders = Arc::new(MockDecoderFactory::default());
        let surfaces = Arc::new(MockSurfaceFactory::default());
        let textures = Arc::new(MockTextureBridge::default());
        let collaborators = Collaborators {
            decoders: decoders.clone(),
            surfaces: surfaces.clone(),
            textures: textures.clone(),
            assets: Arc::new(Bundle(vec!["VuforiaSizzleReel_1.mp4".to_string()])),
        };
        let controller =
            PlaybackController::new(collaborators, capabilities, PlayerConfig::default());
        Self {
            controller,
            decoders,
            surfaces,
            textures,
        }
    }
}
