// Playback state, media kind and seek request types

use serde::{Deserialize, Serialize};

/// Wire value meaning "keep the current position" for seek arguments.
pub const CURRENT_POSITION: f32 = -1.0;

/// Playback state of a session.
///
/// The numeric codes are shared with the host engine and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaState {
    /// Playback ran to the end of the media
    ReachedEnd,
    /// Playback paused by the host
    Paused,
    /// Playback stopped by the host
    Stopped,
    /// Frames are being decoded
    Playing,
    /// Media is prepared and can be played
    Ready,
    /// Nothing loaded, or still preparing
    NotReady,
    /// Decoder reported a fatal error
    Error,
}

impl MediaState {
    pub fn code(self) -> i32 {
        match self {
            MediaState::ReachedEnd => 0,
            MediaState::Paused => 1,
            MediaState::Stopped => 2,
            MediaState::Playing => 3,
            MediaState::Ready => 4,
            MediaState::NotReady => 5,
            MediaState::Error => 6,
        }
    }

    /// Whether transport controls and accessors may touch the decoder.
    pub fn is_operable(self) -> bool {
        !matches!(self, MediaState::NotReady | MediaState::Error)
    }
}

/// How a loaded media may be played back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaKind {
    OnTexture,
    Fullscreen,
    OnTextureFullscreen,
    Unknown,
}

impl MediaKind {
    pub fn code(self) -> i32 {
        match self {
            MediaKind::OnTexture => 0,
            MediaKind::Fullscreen => 1,
            MediaKind::OnTextureFullscreen => 2,
            MediaKind::Unknown => 3,
        }
    }

    /// Out-of-range codes map to `Unknown`.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => MediaKind::OnTexture,
            1 => MediaKind::Fullscreen,
            2 => MediaKind::OnTextureFullscreen,
            _ => MediaKind::Unknown,
        }
    }

    /// Combine the capabilities granted at load time into a kind.
    pub fn from_capabilities(on_texture: bool, fullscreen: bool) -> Self {
        match (on_texture, fullscreen) {
            (true, true) => MediaKind::OnTextureFullscreen,
            (false, true) => MediaKind::Fullscreen,
            (true, false) => MediaKind::OnTexture,
            (false, false) => MediaKind::Unknown,
        }
    }

    pub fn includes_texture(self) -> bool {
        matches!(self, MediaKind::OnTexture | MediaKind::OnTextureFullscreen)
    }

    pub fn includes_fullscreen(self) -> bool {
        matches!(self, MediaKind::Fullscreen | MediaKind::OnTextureFullscreen)
    }
}

/// Position requested alongside `load` or `play`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SeekRequest {
    /// Keep whatever position the decoder is at
    Current,
    /// Jump to an absolute position in seconds
    Seconds(f32),
}

impl SeekRequest {
    /// Decode the host's float argument, where `-1.0` means "current".
    pub fn from_wire(seconds: f32) -> Self {
        if seconds == CURRENT_POSITION {
            SeekRequest::Current
        } else {
            SeekRequest::Seconds(seconds)
        }
    }

    /// Decoder position in milliseconds, or `None` for `Current`.
    pub fn to_millis(self) -> Option<i32> {
        match self {
            SeekRequest::Current => None,
            SeekRequest::Seconds(seconds) => Some(seconds_to_millis(seconds)),
        }
    }
}

/// Whole seconds only; the fractional part is dropped before scaling.
pub fn seconds_to_millis(seconds: f32) -> i32 {
    (seconds as i32).saturating_mul(1000)
}

/// Read-only view of a session for host diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub state: MediaState,
    pub kind: MediaKind,
    pub source: Option<String>,
    pub auto_play: bool,
    pub buffering_percent: i32,
    pub media_texture: i32,
    pub dest_texture: i32,
    pub frame_buffer: i32,
    pub decoder_live: bool,
}
