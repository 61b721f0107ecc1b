// Media decoder abstraction and decoder event delivery

use crate::error::Result;
use crate::source::MediaSource;
use crate::texture::SurfaceTexture;
use crossbeam_channel::Sender;

/// Asynchronous notifications raised by a decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderEvent {
    /// Asynchronous prepare finished; playback may start
    Prepared,
    /// Network buffering progress (0-100)
    BufferingUpdate(i32),
    /// Playback reached the end of the media
    Completion,
    /// Fatal decode error, platform `what`/`extra` codes
    Error { what: i32, extra: i32 },
}

/// A decoder event tagged with the decoder instance it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderMessage {
    pub generation: u64,
    pub event: DecoderEvent,
}

/// Handed to each decoder so its callbacks can reach the controller.
///
/// Events are queued, never run inline: the controller applies them the next
/// time it takes the session lock.
#[derive(Clone)]
pub struct DecoderEventSender {
    generation: u64,
    tx: Sender<DecoderMessage>,
}

impl DecoderEventSender {
    pub fn new(generation: u64, tx: Sender<DecoderMessage>) -> Self {
        Self { generation, tx }
    }

    pub fn send(&self, event: DecoderEvent) {
        let message = DecoderMessage {
            generation: self.generation,
            event,
        };
        if self.tx.send(message).is_err() {
            log::debug!("Controller gone, dropping decoder event {:?}", event);
        }
    }
}

/// Platform media decoder
///
/// One instance decodes one source into the surface it was created with.
pub trait MediaDecoder: Send {
    /// Begin buffering; completion arrives as `DecoderEvent::Prepared`
    fn prepare_async(&mut self) -> Result<()>;

    fn start(&mut self) -> Result<()>;

    fn pause(&mut self) -> Result<()>;

    fn stop(&mut self) -> Result<()>;

    /// Seek to an absolute position in milliseconds
    fn seek_to(&mut self, position_ms: i32) -> Result<()>;

    fn set_volume(&mut self, left: f32, right: f32) -> Result<()>;

    fn is_playing(&self) -> bool;

    fn video_width(&self) -> i32;

    fn video_height(&self) -> i32;

    fn duration_ms(&self) -> i32;

    fn current_position_ms(&self) -> i32;

    /// Free the platform decoder. No other call is valid afterwards.
    fn release(&mut self);
}

/// Creates decoders bound to a source and an output surface
pub trait DecoderFactory: Send + Sync {
    /// Build a decoder with its data source, output surface and listeners set.
    fn create(
        &self,
        source: &MediaSource,
        surface: &dyn SurfaceTexture,
        events: DecoderEventSender,
    ) -> Result<Box<dyn MediaDecoder>>;
}
