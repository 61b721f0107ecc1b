// MediaDecoder over android.media.MediaPlayer

use crate::jvm;
use crate::listener;
use crate::surface_texture::JniSurfaceTexture;
use jni::objects::{GlobalRef, JObject, JValue};
use jni::JNIEnv;
use texplay_core::{
    DecoderEventSender, DecoderFactory, MediaDecoder, MediaSource, PlaybackError, Result,
    SurfaceTexture,
};

/// AudioManager.STREAM_MUSIC
const STREAM_MUSIC: i32 = 3;

const FORWARDER_CLASS: &str = "com.texplay.media.MediaEventForwarder";

const LISTENER_SETTERS: [(&str, &str); 4] = [
    (
        "setOnPreparedListener",
        "(Landroid/media/MediaPlayer$OnPreparedListener;)V",
    ),
    (
        "setOnBufferingUpdateListener",
        "(Landroid/media/MediaPlayer$OnBufferingUpdateListener;)V",
    ),
    (
        "setOnCompletionListener",
        "(Landroid/media/MediaPlayer$OnCompletionListener;)V",
    ),
    (
        "setOnErrorListener",
        "(Landroid/media/MediaPlayer$OnErrorListener;)V",
    ),
];

pub struct JniMediaPlayer {
    player: GlobalRef,
    /// Id the Java forwarder reports callbacks under
    listener_id: i64,
    released: bool,
}

impl JniMediaPlayer {
    fn call_void(&self, name: &str, sig: &str, args: &[JValue]) -> Result<()> {
        let mut env = jvm::attach()?;
        env.call_method(self.player.as_obj(), name, sig, args)
            .map_err(|e| jvm::call_failed(&mut env, name, e))?;
        Ok(())
    }

    fn call_int(&self, name: &str) -> Result<i32> {
        let mut env = jvm::attach()?;
        env.call_method(self.player.as_obj(), name, "()I", &[])
            .and_then(|v| v.i())
            .map_err(|e| jvm::call_failed(&mut env, name, e))
    }

    fn int_or(&self, name: &str, fallback: i32) -> i32 {
        self.call_int(name).unwrap_or_else(|e| {
            log::error!("MediaPlayer.{} failed: {}", name, e);
            fallback
        })
    }

    fn configure(
        &self,
        env: &mut JNIEnv,
        source: &MediaSource,
        surface: &JniSurfaceTexture,
    ) -> Result<()> {
        let player = self.player.as_obj();
        match source {
            MediaSource::Asset(path) => set_asset_source(env, player, path)?,
            MediaSource::Remote(path) | MediaSource::File(path) => {
                let path = env
                    .new_string(path)
                    .map_err(|e| jvm::call_failed(env, "new_string", e))?;
                env.call_method(
                    player,
                    "setDataSource",
                    "(Ljava/lang/String;)V",
                    &[JValue::Object(&path)],
                )
                .map_err(|e| jvm::call_failed(env, "setDataSource", e))?;
            }
        }

        let view_surface = env
            .new_object(
                "android/view/Surface",
                "(Landroid/graphics/SurfaceTexture;)V",
                &[JValue::Object(surface.as_obj())],
            )
            .map_err(|e| jvm::call_failed(env, "new Surface", e))?;
        env.call_method(
            player,
            "setSurface",
            "(Landroid/view/Surface;)V",
            &[JValue::Object(&view_surface)],
        )
        .map_err(|e| jvm::call_failed(env, "setSurface", e))?;

        let forwarder_class = jvm::load_app_class(env, FORWARDER_CLASS)?;
        let forwarder = env
            .new_object(&forwarder_class, "(J)V", &[JValue::Long(self.listener_id)])
            .map_err(|e| jvm::call_failed(env, "new MediaEventForwarder", e))?;
        for (setter, sig) in LISTENER_SETTERS {
            env.call_method(player, setter, sig, &[JValue::Object(&forwarder)])
                .map_err(|e| jvm::call_failed(env, setter, e))?;
        }

        env.call_method(
            player,
            "setAudioStreamType",
            "(I)V",
            &[JValue::Int(STREAM_MUSIC)],
        )
        .map_err(|e| jvm::call_failed(env, "setAudioStreamType", e))?;
        Ok(())
    }
}

/// Assets are compressed into the APK, so the player reads them through a
/// file descriptor range.
fn set_asset_source(env: &mut JNIEnv, player: &JObject, path: &str) -> Result<()> {
    let activity = jvm::activity()?;
    let assets = env
        .call_method(
            activity.as_obj(),
            "getAssets",
            "()Landroid/content/res/AssetManager;",
            &[],
        )
        .and_then(|v| v.l())
        .map_err(|e| jvm::call_failed(env, "getAssets", e))?;
    let name = env
        .new_string(path)
        .map_err(|e| jvm::call_failed(env, "new_string", e))?;
    let descriptor = env
        .call_method(
            &assets,
            "openFd",
            "(Ljava/lang/String;)Landroid/content/res/AssetFileDescriptor;",
            &[JValue::Object(&name)],
        )
        .and_then(|v| v.l())
        .map_err(|e| jvm::call_failed(env, "openFd", e))?;

    let fd = env
        .call_method(&descriptor, "getFileDescriptor", "()Ljava/io/FileDescriptor;", &[])
        .and_then(|v| v.l())
        .map_err(|e| jvm::call_failed(env, "getFileDescriptor", e))?;
    let offset = env
        .call_method(&descriptor, "getStartOffset", "()J", &[])
        .and_then(|v| v.j())
        .map_err(|e| jvm::call_failed(env, "getStartOffset", e))?;
    let length = env
        .call_method(&descriptor, "getLength", "()J", &[])
        .and_then(|v| v.j())
        .map_err(|e| jvm::call_failed(env, "getLength", e))?;

    let result = env
        .call_method(
            player,
            "setDataSource",
            "(Ljava/io/FileDescriptor;JJ)V",
            &[JValue::Object(&fd), JValue::Long(offset), JValue::Long(length)],
        )
        .map_err(|e| jvm::call_failed(env, "setDataSource(fd)", e));

    if let Err(e) = env.call_method(&descriptor, "close", "()V", &[]) {
        log::debug!("{}", jvm::call_failed(env, "AssetFileDescriptor.close", e));
    }
    result.map(|_| ())
}

impl MediaDecoder for JniMediaPlayer {
    fn prepare_async(&mut self) -> Result<()> {
        self.call_void("prepareAsync", "()V", &[])
    }

    fn start(&mut self) -> Result<()> {
        self.call_void("start", "()V", &[])
    }

    fn pause(&mut self) -> Result<()> {
        self.call_void("pause", "()V", &[])
    }

    fn stop(&mut self) -> Result<()> {
        self.call_void("stop", "()V", &[])
    }

    fn seek_to(&mut self, position_ms: i32) -> Result<()> {
        self.call_void("seekTo", "(I)V", &[JValue::Int(position_ms)])
    }

    fn set_volume(&mut self, left: f32, right: f32) -> Result<()> {
        self.call_void("setVolume", "(FF)V", &[JValue::Float(left), JValue::Float(right)])
    }

    fn is_playing(&self) -> bool {
        let result = jvm::attach().and_then(|mut env| {
            env.call_method(self.player.as_obj(), "isPlaying", "()Z", &[])
                .and_then(|v| v.z())
                .map_err(|e| jvm::call_failed(&mut env, "isPlaying", e))
        });
        result.unwrap_or_else(|e| {
            log::error!("MediaPlayer.isPlaying failed: {}", e);
            false
        })
    }

    fn video_width(&self) -> i32 {
        self.int_or("getVideoWidth", -1)
    }

    fn video_height(&self) -> i32 {
        self.int_or("getVideoHeight", -1)
    }

    fn duration_ms(&self) -> i32 {
        self.int_or("getDuration", -1)
    }

    fn current_position_ms(&self) -> i32 {
        self.int_or("getCurrentPosition", -1)
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        listener::unregister_listener(self.listener_id);
        if let Err(e) = self.call_void("release", "()V", &[]) {
            log::error!("MediaPlayer.release failed: {}", e);
        }
    }
}

impl Drop for JniMediaPlayer {
    fn drop(&mut self) {
        self.release();
    }
}

pub struct JniDecoderFactory;

impl DecoderFactory for JniDecoderFactory {
    fn create(
        &self,
        source: &MediaSource,
        surface: &dyn SurfaceTexture,
        events: DecoderEventSender,
    ) -> Result<Box<dyn MediaDecoder>> {
        let surface = surface
            .as_any()
            .downcast_ref::<JniSurfaceTexture>()
            .ok_or_else(|| PlaybackError::Surface("not an Android surface texture".into()))?;

        let mut env = jvm::attach()?;
        let player = env
            .new_object("android/media/MediaPlayer", "()V", &[])
            .map_err(|e| jvm::call_failed(&mut env, "new MediaPlayer", e))?;
        let player = env
            .new_global_ref(player)
            .map_err(|e| jvm::call_failed(&mut env, "new_global_ref(MediaPlayer)", e))?;

        let mut decoder = JniMediaPlayer {
            player,
            listener_id: listener::register_listener(events),
            released: false,
        };
        if let Err(e) = decoder.configure(&mut env, source, surface) {
            decoder.release();
            return Err(PlaybackError::Load(format!("{}: {}", source.path(), e)));
        }
        log::debug!("MediaPlayer created for {}", source.path());
        Ok(Box::new(decoder))
    }
}
