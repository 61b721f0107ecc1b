// PlayerCallback that forwards playback events to a Java PlayerListener

use crate::host_events::HostEvent;
use crate::jvm;
use jni::objects::{GlobalRef, JObject, JValue};
use jni::JNIEnv;
use texplay_core::{CallbackEvent, PlayerCallback, Result};

const ON_PLAYER_EVENT_SIG: &str = "(IIILjava/lang/String;)V";

pub struct JniCallback {
    listener: GlobalRef,
}

impl JniCallback {
    pub fn new(env: &mut JNIEnv, listener: &JObject) -> Result<Self> {
        let listener = env
            .new_global_ref(listener)
            .map_err(|e| jvm::call_failed(env, "new_global_ref(listener)", e))?;
        Ok(Self { listener })
    }

    fn deliver(&self, event: HostEvent) -> Result<()> {
        let mut env = jvm::attach()?;
        let message = match &event.message {
            Some(text) => JObject::from(
                env.new_string(text)
                    .map_err(|e| jvm::call_failed(&mut env, "new_string", e))?,
            ),
            None => JObject::null(),
        };
        env.call_method(
            self.listener.as_obj(),
            "onPlayerEvent",
            ON_PLAYER_EVENT_SIG,
            &[
                JValue::Int(event.kind),
                JValue::Int(event.arg1),
                JValue::Int(event.arg2),
                JValue::Object(&message),
            ],
        )
        .map_err(|e| jvm::call_failed(&mut env, "onPlayerEvent", e))?;
        if !message.is_null() {
            if let Err(e) = env.delete_local_ref(message) {
                log::debug!("delete_local_ref(message) failed: {}", e);
            }
        }
        Ok(())
    }
}

impl PlayerCallback for JniCallback {
    fn on_event(&self, event: CallbackEvent) {
        log::debug!("Callback event: {:?}", event);
        if let Err(e) = self.deliver(HostEvent::from(event)) {
            log::error!("PlayerListener.onPlayerEvent failed: {}", e);
        }
    }
}
