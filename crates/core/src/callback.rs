// Host notification mechanism for playback events
// Buffering updates arrive at network rate, so they are throttled per listener

use crate::state::MediaState;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Playback event types
#[derive(Debug, Clone, PartialEq)]
pub enum CallbackEvent {
    /// Session state changed
    StateChanged {
        old_state: MediaState,
        new_state: MediaState,
    },

    /// Buffering percentage changed
    BufferingChanged { percent: i32 },

    /// Playback reached the end of the media
    PlaybackCompleted,

    /// The decoder failed and was released
    Error { message: String },
}

/// Host callback trait
/// Implementations should be lightweight and non-blocking
pub trait PlayerCallback: Send + Sync {
    /// Called after the session lock has been released
    fn on_event(&self, event: CallbackEvent);
}

/// Throttled callback wrapper
/// Drops buffering updates that arrive faster than the configured interval
pub struct ThrottledCallback {
    inner: Arc<dyn PlayerCallback>,
    last_buffering_update: Mutex<Option<Instant>>,
    buffering_interval: Duration,
}

impl ThrottledCallback {
    pub fn new(callback: Arc<dyn PlayerCallback>, interval_ms: u64) -> Self {
        Self {
            inner: callback,
            last_buffering_update: Mutex::new(None),
            buffering_interval: Duration::from_millis(interval_ms),
        }
    }

    pub fn dispatch(&self, event: CallbackEvent) {
        match &event {
            CallbackEvent::BufferingChanged { percent } => {
                let mut last = self.last_buffering_update.lock();
                let due = match *last {
                    None => true,
                    Some(at) => at.elapsed() >= self.buffering_interval,
                };
                // 100% is always delivered so the host sees buffering finish
                if due || *percent >= 100 {
                    *last = Some(Instant::now());
                    drop(last);
                    self.inner.on_event(event);
                }
            }
            _ => self.inner.on_event(event),
        }
    }
}

/// Callback manager for handling multiple callbacks
pub struct CallbackManager {
    callbacks: Mutex<Vec<Arc<ThrottledCallback>>>,
}

impl CallbackManager {
    pub fn new() -> Self {
        Self {
            callbacks: Mutex::new(Vec::new()),
        }
    }

    pub fn add_callback(&self, callback: Arc<dyn PlayerCallback>, throttle_ms: u64) {
        let throttled = Arc::new(ThrottledCallback::new(callback, throttle_ms));
        self.callbacks.lock().push(throttled);
    }

    pub fn clear_callbacks(&self) {
        self.callbacks.lock().clear();
    }

    pub fn dispatch_event(&self, event: CallbackEvent) {
        // Snapshot so a callback may register or clear listeners
        let callbacks: Vec<_> = self.callbacks.lock().clone();
        for callback in callbacks.iter() {
            callback.dispatch(event.clone());
        }
    }
}

impl Default for CallbackManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Simple callback implementation for testing
#[cfg(test)]
pub struct TestCallback {
    events: Mutex<Vec<CallbackEvent>>,
}

#[cfg(test)]
impl TestCallback {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn get_events(&self) -> Vec<CallbackEvent> {
        self.events.lock().clone()
    }
}

#[cfg(test)]
impl PlayerCallback for TestCallback {
    fn on_event(&self, event: CallbackEvent) {
        self.events.lock().push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffering_updates_throttled() {
        let test_callback = Arc::new(TestCallback::new());
        let throttled = ThrottledCallback::new(test_callback.clone(), 10_000);

        for percent in [10, 20, 30, 40] {
            throttled.dispatch(CallbackEvent::BufferingChanged { percent });
        }

        // First update goes through, the rest fall inside the interval
        assert_eq!(
            test_callback.get_events(),
            vec![CallbackEvent::BufferingChanged { percent: 10 }]
        );
    }

    #[test]
    fn test_buffering_complete_always_delivered() {
        let test_callback = Arc::new(TestCallback::new());
        let throttled = ThrottledCallback::new(test_callback.clone(), 10_000);

        throttled.dispatch(CallbackEvent::BufferingChanged { percent: 50 });
        throttled.dispatch(CallbackEvent::BufferingChanged { percent: 100 });

        assert_eq!(test_callback.get_events().len(), 2);
    }

    #[test]
    fn test_state_changes_not_throttled() {
        let test_callback = Arc::new(TestCallback::new());
        let manager = CallbackManager::new();
        manager.add_callback(test_callback.clone(), 10_000);

        manager.dispatch_event(CallbackEvent::StateChanged {
            old_state: MediaState::Ready,
            new_state: MediaState::Playing,
        });
        manager.dispatch_event(CallbackEvent::StateChanged {
            old_state: MediaState::Playing,
            new_state: MediaState::Paused,
        });

        assert_eq!(test_callback.get_events().len(), 2);

        manager.clear_callbacks();
        manager.dispatch_event(CallbackEvent::PlaybackCompleted);
        assert_eq!(test_callback.get_events().len(), 2);
    }
}
