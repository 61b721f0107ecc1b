// android.graphics.SurfaceTexture over the media texture

use crate::jvm;
use jni::objects::{GlobalRef, JObject, JValue};
use std::any::Any;
use texplay_core::{Result, SurfaceFactory, SurfaceTexture, TextureHandle};

pub struct JniSurfaceTexture {
    texture: GlobalRef,
    released: bool,
}

impl JniSurfaceTexture {
    pub fn as_obj(&self) -> &JObject<'static> {
        self.texture.as_obj()
    }
}

impl SurfaceTexture for JniSurfaceTexture {
    fn update_tex_image(&mut self) -> Result<()> {
        let mut env = jvm::attach()?;
        env.call_method(self.texture.as_obj(), "updateTexImage", "()V", &[])
            .map_err(|e| jvm::call_failed(&mut env, "updateTexImage", e))?;
        Ok(())
    }

    fn transform_matrix(&mut self) -> Result<[f32; 16]> {
        let mut env = jvm::attach()?;
        let array = env
            .new_float_array(16)
            .map_err(|e| jvm::call_failed(&mut env, "new_float_array", e))?;
        env.call_method(
            self.texture.as_obj(),
            "getTransformMatrix",
            "([F)V",
            &[JValue::Object(&array)],
        )
        .map_err(|e| jvm::call_failed(&mut env, "getTransformMatrix", e))?;

        let mut matrix = [0.0f32; 16];
        env.get_float_array_region(&array, 0, &mut matrix)
            .map_err(|e| jvm::call_failed(&mut env, "get_float_array_region", e))?;
        if let Err(e) = env.delete_local_ref(array) {
            log::debug!("delete_local_ref(transform matrix) failed: {}", e);
        }
        Ok(matrix)
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        match jvm::attach() {
            Ok(mut env) => {
                if let Err(e) = env.call_method(self.texture.as_obj(), "release", "()V", &[]) {
                    log::error!("{}", jvm::call_failed(&mut env, "SurfaceTexture.release", e));
                }
            }
            Err(e) => log::error!("Could not release surface texture: {}", e),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub struct JniSurfaceFactory;

impl SurfaceFactory for JniSurfaceFactory {
    fn create(&self, media_texture: TextureHandle) -> Result<Box<dyn SurfaceTexture>> {
        let mut env = jvm::attach()?;
        let texture = env
            .new_object(
                "android/graphics/SurfaceTexture",
                "(I)V",
                &[JValue::Int(media_texture)],
            )
            .map_err(|e| jvm::call_failed(&mut env, "new SurfaceTexture", e))?;
        let texture = env
            .new_global_ref(texture)
            .map_err(|e| jvm::call_failed(&mut env, "new_global_ref(SurfaceTexture)", e))?;
        log::debug!("Surface texture created on texture {}", media_texture);
        Ok(Box::new(JniSurfaceTexture {
            texture,
            released: false,
        }))
    }
}
