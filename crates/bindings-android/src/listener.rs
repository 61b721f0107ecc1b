// Routes MediaPlayer listener callbacks to the owning controller
//
// The Java forwarder only knows a listener id; callbacks for an id that was
// unregistered are dropped.

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use texplay_core::{DecoderEvent, DecoderEventSender};

static LISTENERS: Lazy<Mutex<HashMap<i64, DecoderEventSender>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));
static NEXT_LISTENER_ID: AtomicI64 = AtomicI64::new(1);

pub fn register_listener(sender: DecoderEventSender) -> i64 {
    let id = NEXT_LISTENER_ID.fetch_add(1, Ordering::Relaxed);
    LISTENERS.lock().insert(id, sender);
    id
}

pub fn unregister_listener(id: i64) {
    LISTENERS.lock().remove(&id);
}

/// Queue `event` for the controller behind listener `id`.
pub fn post_event(id: i64, event: DecoderEvent) -> bool {
    let sender = LISTENERS.lock().get(&id).cloned();
    match sender {
        Some(sender) => {
            sender.send(event);
            true
        }
        None => {
            log::debug!("No listener {} for {:?}", id, event);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_reaches_channel() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let id = register_listener(DecoderEventSender::new(3, tx));

        assert!(post_event(id, DecoderEvent::BufferingUpdate(60)));
        let message = rx.try_recv().unwrap();
        assert_eq!(message.generation, 3);
        assert_eq!(message.event, DecoderEvent::BufferingUpdate(60));

        unregister_listener(id);
    }

    #[test]
    fn test_unregistered_listener_drops_events() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let id = register_listener(DecoderEventSender::new(1, tx));
        unregister_listener(id);

        assert!(!post_event(id, DecoderEvent::Completion));
        assert!(rx.try_recv().is_err());
    }
}
