// JNI entry points for com.texplay.media.TexturePlayer and MediaEventForwarder

use crate::assets::JniAssetLookup;
use crate::gl_bridge::NativeTextureBridge;
use crate::host_listener::JniCallback;
use crate::jvm;
use crate::listener::post_event;
use crate::logging::init_logging;
use crate::media_player::JniDecoderFactory;
use crate::registry::{register_player, remove_player, with_player};
use crate::surface_texture::JniSurfaceFactory;
use jni::objects::{JClass, JObject, JString};
use jni::sys::{jboolean, jfloat, jint, jlong, jstring, JNI_FALSE, JNI_TRUE, JNI_VERSION_1_6};
use jni::{JNIEnv, JavaVM};
use std::ffi::c_void;
use std::sync::Arc;
use texplay_core::{
    AssetLookup, Collaborators, DecoderEvent, MediaKind, PlatformCapabilities, PlaybackController,
    PlaybackError, PlayerCallback, PlayerConfig, Result, SeekRequest,
};

#[no_mangle]
pub extern "system" fn JNI_OnLoad(vm: JavaVM, _reserved: *mut c_void) -> jint {
    jvm::set_java_vm(vm);
    JNI_VERSION_1_6
}

fn to_jboolean(value: bool) -> jboolean {
    if value {
        JNI_TRUE
    } else {
        JNI_FALSE
    }
}

fn jstring_to_string(env: &mut JNIEnv, jstr: &JString) -> Result<String> {
    let java_str = env
        .get_string(jstr)
        .map_err(|e| jvm::call_failed(env, "get_string", e))?;
    Ok(java_str.into())
}

/// Run `f` on a registered player, logging and returning `fallback` for an
/// unknown id.
fn player_or<R>(player_id: jlong, fallback: R, f: impl FnOnce(&PlaybackController) -> R) -> R {
    with_player(player_id, f).unwrap_or_else(|err| {
        log::error!("FFI error: {}", err);
        fallback
    })
}

fn create_player(config: PlayerConfig) -> Result<jlong> {
    init_logging(config.log_level_filter()?);
    let capabilities = PlatformCapabilities::from_sdk_level(jvm::sdk_level());
    let collaborators = Collaborators {
        decoders: Arc::new(JniDecoderFactory),
        surfaces: Arc::new(JniSurfaceFactory),
        textures: Arc::new(NativeTextureBridge),
        assets: Arc::new(JniAssetLookup),
    };
    let id = register_player(PlaybackController::new(collaborators, capabilities, config));
    log::info!("Created player {} (API level {})", id, capabilities.sdk_level);
    Ok(id)
}

// -----------------------------------------------------------------------------
// TexturePlayer: lifecycle
// -----------------------------------------------------------------------------

#[no_mangle]
pub extern "system" fn Java_com_texplay_media_TexturePlayer_nativeCreate(
    _env: JNIEnv,
    _class: JClass,
) -> jlong {
    create_player(PlayerConfig::default()).unwrap_or(-1)
}

#[no_mangle]
pub extern "system" fn Java_com_texplay_media_TexturePlayer_nativeCreateWithConfig(
    mut env: JNIEnv,
    _class: JClass,
    config_json: JString,
) -> jlong {
    let result = jstring_to_string(&mut env, &config_json)
        .and_then(|json| PlayerConfig::from_json(&json))
        .and_then(create_player);
    match result {
        Ok(id) => id,
        Err(err) => {
            init_logging(log::LevelFilter::Debug);
            log::error!("Could not create player: {}", err);
            -1
        }
    }
}

#[no_mangle]
pub extern "system" fn Java_com_texplay_media_TexturePlayer_nativeSetActivity(
    mut env: JNIEnv,
    _class: JClass,
    activity: JObject,
) -> jboolean {
    match jvm::set_activity(&mut env, &activity) {
        Ok(()) => JNI_TRUE,
        Err(err) => {
            log::error!("Could not store activity: {}", err);
            JNI_FALSE
        }
    }
}

/// Replace the player's event listener. A null listener detaches it.
#[no_mangle]
pub extern "system" fn Java_com_texplay_media_TexturePlayer_nativeSetListener(
    mut env: JNIEnv,
    _class: JClass,
    player_id: jlong,
    listener: JObject,
) -> jboolean {
    let callback: Option<Arc<dyn PlayerCallback>> = if listener.is_null() {
        None
    } else {
        match JniCallback::new(&mut env, &listener) {
            Ok(callback) => Some(Arc::new(callback)),
            Err(err) => {
                log::error!("Could not hold listener: {}", err);
                return JNI_FALSE;
            }
        }
    };
    to_jboolean(player_or(player_id, false, |p| {
        p.set_callback(callback);
        true
    }))
}

#[no_mangle]
pub extern "system" fn Java_com_texplay_media_TexturePlayer_nativeInit(
    _env: JNIEnv,
    _class: JClass,
    player_id: jlong,
    gl_version: jint,
) -> jboolean {
    to_jboolean(player_or(player_id, false, |p| p.initialize(gl_version)))
}

#[no_mangle]
pub extern "system" fn Java_com_texplay_media_TexturePlayer_nativeDeinit(
    _env: JNIEnv,
    _class: JClass,
    player_id: jlong,
) -> jboolean {
    to_jboolean(player_or(player_id, false, |p| p.shutdown()))
}

#[no_mangle]
pub extern "system" fn Java_com_texplay_media_TexturePlayer_nativeRelease(
    _env: JNIEnv,
    _class: JClass,
    player_id: jlong,
) -> jboolean {
    match remove_player(player_id) {
        Some(player) => to_jboolean(player.shutdown()),
        None => {
            log::error!("FFI error: Invalid player ID {}", player_id);
            JNI_FALSE
        }
    }
}

// -----------------------------------------------------------------------------
// TexturePlayer: loading
// -----------------------------------------------------------------------------

#[no_mangle]
pub extern "system" fn Java_com_texplay_media_TexturePlayer_nativeIsFileInAssets(
    mut env: JNIEnv,
    _class: JClass,
    path: JString,
) -> jboolean {
    match jstring_to_string(&mut env, &path) {
        Ok(path) => to_jboolean(JniAssetLookup.is_asset(&path)),
        Err(err) => {
            log::error!("Failed to read path: {}", err);
            JNI_FALSE
        }
    }
}

#[no_mangle]
pub extern "system" fn Java_com_texplay_media_TexturePlayer_nativeLoad(
    mut env: JNIEnv,
    _class: JClass,
    player_id: jlong,
    path: JString,
    kind: jint,
    auto_play: jboolean,
    seek_seconds: jfloat,
) -> jboolean {
    let path = match jstring_to_string(&mut env, &path) {
        Ok(path) => path,
        Err(err) => {
            log::error!("Failed to read path: {}", err);
            return JNI_FALSE;
        }
    };
    to_jboolean(player_or(player_id, false, |p| {
        p.load(
            &path,
            MediaKind::from_code(kind),
            auto_play != JNI_FALSE,
            SeekRequest::from_wire(seek_seconds),
        )
    }))
}

#[no_mangle]
pub extern "system" fn Java_com_texplay_media_TexturePlayer_nativeUnload(
    _env: JNIEnv,
    _class: JClass,
    player_id: jlong,
) -> jboolean {
    to_jboolean(player_or(player_id, false, |p| p.unload()))
}

// -----------------------------------------------------------------------------
// TexturePlayer: queries
// -----------------------------------------------------------------------------

#[no_mangle]
pub extern "system" fn Java_com_texplay_media_TexturePlayer_nativeIsPlayableOnTexture(
    _env: JNIEnv,
    _class: JClass,
    player_id: jlong,
) -> jboolean {
    to_jboolean(player_or(player_id, false, |p| p.is_playable_on_texture()))
}

#[no_mangle]
pub extern "system" fn Java_com_texplay_media_TexturePlayer_nativeIsPlayableFullscreen(
    _env: JNIEnv,
    _class: JClass,
    player_id: jlong,
) -> jboolean {
    to_jboolean(player_or(player_id, false, |p| p.is_playable_fullscreen()))
}

#[no_mangle]
pub extern "system" fn Java_com_texplay_media_TexturePlayer_nativeGetStatus(
    _env: JNIEnv,
    _class: JClass,
    player_id: jlong,
) -> jint {
    player_or(player_id, -1, |p| p.status().code())
}

#[no_mangle]
pub extern "system" fn Java_com_texplay_media_TexturePlayer_nativeGetVideoWidth(
    _env: JNIEnv,
    _class: JClass,
    player_id: jlong,
) -> jint {
    player_or(player_id, -1, |p| p.video_width())
}

#[no_mangle]
pub extern "system" fn Java_com_texplay_media_TexturePlayer_nativeGetVideoHeight(
    _env: JNIEnv,
    _class: JClass,
    player_id: jlong,
) -> jint {
    player_or(player_id, -1, |p| p.video_height())
}

#[no_mangle]
pub extern "system" fn Java_com_texplay_media_TexturePlayer_nativeGetLength(
    _env: JNIEnv,
    _class: JClass,
    player_id: jlong,
) -> jfloat {
    player_or(player_id, -1.0, |p| p.length_seconds())
}

#[no_mangle]
pub extern "system" fn Java_com_texplay_media_TexturePlayer_nativeGetCurrentPosition(
    _env: JNIEnv,
    _class: JClass,
    player_id: jlong,
) -> jfloat {
    player_or(player_id, -1.0, |p| p.current_position_seconds())
}

#[no_mangle]
pub extern "system" fn Java_com_texplay_media_TexturePlayer_nativeGetBufferingPercentage(
    _env: JNIEnv,
    _class: JClass,
    player_id: jlong,
) -> jint {
    player_or(player_id, 0, |p| p.buffering_percent())
}

#[no_mangle]
pub extern "system" fn Java_com_texplay_media_TexturePlayer_nativeGetFullscreenUri(
    env: JNIEnv,
    _class: JClass,
    player_id: jlong,
) -> jstring {
    match player_or(player_id, None, |p| p.fullscreen_uri()) {
        Some(uri) => env
            .new_string(uri)
            .map(|s| s.into_raw())
            .unwrap_or(std::ptr::null_mut()),
        None => std::ptr::null_mut(),
    }
}

#[no_mangle]
pub extern "system" fn Java_com_texplay_media_TexturePlayer_nativeGetSessionJson(
    env: JNIEnv,
    _class: JClass,
    player_id: jlong,
) -> jstring {
    let json = with_player(player_id, |p| p.snapshot()).and_then(|snapshot| {
        serde_json::to_string(&snapshot).map_err(PlaybackError::from)
    });
    let json = json.unwrap_or_else(|err| {
        log::error!("FFI error: {}", err);
        "{}".to_string()
    });
    env.new_string(json)
        .map(|s| s.into_raw())
        .unwrap_or(std::ptr::null_mut())
}

// -----------------------------------------------------------------------------
// TexturePlayer: transport
// -----------------------------------------------------------------------------

#[no_mangle]
pub extern "system" fn Java_com_texplay_media_TexturePlayer_nativePlay(
    _env: JNIEnv,
    _class: JClass,
    player_id: jlong,
    fullscreen: jboolean,
    seek_seconds: jfloat,
) -> jboolean {
    to_jboolean(player_or(player_id, false, |p| {
        p.play(fullscreen != JNI_FALSE, SeekRequest::from_wire(seek_seconds))
    }))
}

#[no_mangle]
pub extern "system" fn Java_com_texplay_media_TexturePlayer_nativePause(
    _env: JNIEnv,
    _class: JClass,
    player_id: jlong,
) -> jboolean {
    to_jboolean(player_or(player_id, false, |p| p.pause()))
}

#[no_mangle]
pub extern "system" fn Java_com_texplay_media_TexturePlayer_nativeStop(
    _env: JNIEnv,
    _class: JClass,
    player_id: jlong,
) -> jboolean {
    to_jboolean(player_or(player_id, false, |p| p.stop()))
}

#[no_mangle]
pub extern "system" fn Java_com_texplay_media_TexturePlayer_nativeSeekTo(
    _env: JNIEnv,
    _class: JClass,
    player_id: jlong,
    seconds: jfloat,
) -> jboolean {
    to_jboolean(player_or(player_id, false, |p| p.seek_to(seconds)))
}

#[no_mangle]
pub extern "system" fn Java_com_texplay_media_TexturePlayer_nativeSetVolume(
    _env: JNIEnv,
    _class: JClass,
    player_id: jlong,
    level: jfloat,
) -> jboolean {
    to_jboolean(player_or(player_id, false, |p| p.set_volume(level)))
}

#[no_mangle]
pub extern "system" fn Java_com_texplay_media_TexturePlayer_nativeOnPause(
    _env: JNIEnv,
    _class: JClass,
    player_id: jlong,
) {
    player_or(player_id, (), |p| p.on_host_pause())
}

// -----------------------------------------------------------------------------
// TexturePlayer: frame path (render thread)
// -----------------------------------------------------------------------------

#[no_mangle]
pub extern "system" fn Java_com_texplay_media_TexturePlayer_nativeSetVideoTextureId(
    _env: JNIEnv,
    _class: JClass,
    player_id: jlong,
    texture_id: jint,
) -> jboolean {
    to_jboolean(player_or(player_id, false, |p| p.set_destination_texture(texture_id)))
}

#[no_mangle]
pub extern "system" fn Java_com_texplay_media_TexturePlayer_nativeUpdateVideoData(
    _env: JNIEnv,
    _class: JClass,
    player_id: jlong,
) -> jint {
    player_or(player_id, -1, |p| p.update_video_data())
}

// -----------------------------------------------------------------------------
// MediaEventForwarder: MediaPlayer listener callbacks
// -----------------------------------------------------------------------------

#[no_mangle]
pub extern "system" fn Java_com_texplay_media_MediaEventForwarder_nativeOnPrepared(
    _env: JNIEnv,
    _this: JObject,
    listener_id: jlong,
) {
    post_event(listener_id, DecoderEvent::Prepared);
}

#[no_mangle]
pub extern "system" fn Java_com_texplay_media_MediaEventForwarder_nativeOnBufferingUpdate(
    _env: JNIEnv,
    _this: JObject,
    listener_id: jlong,
    percent: jint,
) {
    post_event(listener_id, DecoderEvent::BufferingUpdate(percent));
}

#[no_mangle]
pub extern "system" fn Java_com_texplay_media_MediaEventForwarder_nativeOnCompletion(
    _env: JNIEnv,
    _this: JObject,
    listener_id: jlong,
) {
    post_event(listener_id, DecoderEvent::Completion);
}

/// Always reports the error as handled so MediaPlayer does not also fire
/// its completion listener.
#[no_mangle]
pub extern "system" fn Java_com_texplay_media_MediaEventForwarder_nativeOnError(
    _env: JNIEnv,
    _this: JObject,
    listener_id: jlong,
    what: jint,
    extra: jint,
) -> jboolean {
    log::error!("MediaPlayer error what={} extra={}", what, extra);
    post_event(listener_id, DecoderEvent::Error { what, extra });
    JNI_TRUE
}
