// JavaVM, host activity and platform queries shared by the JNI wrappers

use jni::objects::{GlobalRef, JClass, JObject, JValue};
use jni::{AttachGuard, JNIEnv, JavaVM};
use once_cell::sync::{Lazy, OnceCell};
use parking_lot::Mutex;
use texplay_core::{PlaybackError, Result};

static JAVA_VM: OnceCell<JavaVM> = OnceCell::new();
static ACTIVITY: Lazy<Mutex<Option<GlobalRef>>> = Lazy::new(|| Mutex::new(None));
static SDK_LEVEL: OnceCell<i32> = OnceCell::new();

pub fn set_java_vm(vm: JavaVM) {
    if JAVA_VM.set(vm).is_err() {
        log::debug!("JavaVM already stored");
    }
}

/// Attach the calling thread, or reuse its existing attachment.
pub fn attach() -> Result<AttachGuard<'static>> {
    let vm = JAVA_VM
        .get()
        .ok_or_else(|| PlaybackError::Platform("JavaVM not available".into()))?;
    vm.attach_current_thread()
        .map_err(|e| PlaybackError::Platform(format!("attach_current_thread: {}", e)))
}

/// Clear any pending Java exception and turn a failed JNI call into an error.
pub fn call_failed(env: &mut JNIEnv, what: &str, err: jni::errors::Error) -> PlaybackError {
    if env.exception_check().unwrap_or(false) {
        if let Err(e) = env.exception_clear() {
            log::error!("Could not clear exception after {}: {}", what, e);
        }
    }
    PlaybackError::Platform(format!("{}: {}", what, err))
}

pub fn set_activity(env: &mut JNIEnv, activity: &JObject) -> Result<()> {
    let global = env
        .new_global_ref(activity)
        .map_err(|e| call_failed(env, "new_global_ref(activity)", e))?;
    *ACTIVITY.lock() = Some(global);
    Ok(())
}

pub fn activity() -> Result<GlobalRef> {
    ACTIVITY
        .lock()
        .clone()
        .ok_or_else(|| PlaybackError::Platform("activity not set".into()))
}

/// API level of the device, read once. Zero if it cannot be determined.
pub fn sdk_level() -> i32 {
    *SDK_LEVEL.get_or_init(|| match read_sdk_level() {
        Ok(level) => level,
        Err(e) => {
            log::error!("Could not read SDK_INT: {}", e);
            0
        }
    })
}

fn read_sdk_level() -> Result<i32> {
    let mut env = attach()?;
    let version_class = env
        .find_class("android/os/Build$VERSION")
        .map_err(|e| call_failed(&mut env, "find_class(Build$VERSION)", e))?;
    env.get_static_field(&version_class, "SDK_INT", "I")
        .and_then(|v| v.i())
        .map_err(|e| call_failed(&mut env, "SDK_INT", e))
}

/// Application classes are not visible to `find_class` on threads the
/// runtime did not start, so they are loaded through the activity.
pub fn load_app_class<'local>(env: &mut JNIEnv<'local>, name: &str) -> Result<JClass<'local>> {
    let activity = activity()?;
    let loader = env
        .call_method(activity.as_obj(), "getClassLoader", "()Ljava/lang/ClassLoader;", &[])
        .and_then(|v| v.l())
        .map_err(|e| call_failed(env, "getClassLoader", e))?;
    let class_name = env
        .new_string(name)
        .map_err(|e| call_failed(env, "new_string", e))?;
    let class = env
        .call_method(
            &loader,
            "loadClass",
            "(Ljava/lang/String;)Ljava/lang/Class;",
            &[JValue::Object(&class_name)],
        )
        .and_then(|v| v.l())
        .map_err(|e| call_failed(env, name, e))?;
    Ok(JClass::from(class))
}
