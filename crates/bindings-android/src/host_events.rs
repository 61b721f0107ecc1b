// Flattening of playback events into the host listener's call shape

use texplay_core::CallbackEvent;

pub const EVENT_STATE_CHANGED: i32 = 1;
pub const EVENT_BUFFERING: i32 = 2;
pub const EVENT_COMPLETED: i32 = 3;
pub const EVENT_ERROR: i32 = 4;

/// Arguments of one `PlayerListener.onPlayerEvent(int, int, int, String)` call
#[derive(Debug, Clone, PartialEq)]
pub struct HostEvent {
    pub kind: i32,
    pub arg1: i32,
    pub arg2: i32,
    pub message: Option<String>,
}

impl From<CallbackEvent> for HostEvent {
    fn from(event: CallbackEvent) -> Self {
        match event {
            CallbackEvent::StateChanged {
                old_state,
                new_state,
            } => HostEvent {
                kind: EVENT_STATE_CHANGED,
                arg1: old_state.code(),
                arg2: new_state.code(),
                message: None,
            },
            CallbackEvent::BufferingChanged { percent } => HostEvent {
                kind: EVENT_BUFFERING,
                arg1: percent,
                arg2: 0,
                message: None,
            },
            CallbackEvent::PlaybackCompleted => HostEvent {
                kind: EVENT_COMPLETED,
                arg1: 0,
                arg2: 0,
                message: None,
            },
            CallbackEvent::Error { message } => HostEvent {
                kind: EVENT_ERROR,
                arg1: 0,
                arg2: 0,
                message: Some(message),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use texplay_core::MediaState;

    #[test]
    fn test_state_change_carries_both_codes() {
        let event = HostEvent::from(CallbackEvent::StateChanged {
            old_state: MediaState::Ready,
            new_state: MediaState::Playing,
        });
        assert_eq!(event.kind, EVENT_STATE_CHANGED);
        assert_eq!(event.arg1, MediaState::Ready.code());
        assert_eq!(event.arg2, MediaState::Playing.code());
        assert_eq!(event.message, None);
    }

    #[test]
    fn test_buffering_and_error_payloads() {
        let buffering = HostEvent::from(CallbackEvent::BufferingChanged { percent: 42 });
        assert_eq!((buffering.kind, buffering.arg1), (EVENT_BUFFERING, 42));

        let error = HostEvent::from(CallbackEvent::Error {
            message: "decoder error 1/-1004".into(),
        });
        assert_eq!(error.kind, EVENT_ERROR);
        assert_eq!(error.message.as_deref(), Some("decoder error 1/-1004"));

        let done = HostEvent::from(CallbackEvent::PlaybackCompleted);
        assert_eq!(done.kind, EVENT_COMPLETED);
    }
}
