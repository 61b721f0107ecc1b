// Asset bundle lookup through the activity's AssetManager

use crate::jvm;
use jni::objects::JValue;
use texplay_core::{AssetLookup, Result};

pub struct JniAssetLookup;

impl JniAssetLookup {
    fn open(&self, path: &str) -> Result<()> {
        let activity = jvm::activity()?;
        let mut env = jvm::attach()?;
        let assets = env
            .call_method(
                activity.as_obj(),
                "getAssets",
                "()Landroid/content/res/AssetManager;",
                &[],
            )
            .and_then(|v| v.l())
            .map_err(|e| jvm::call_failed(&mut env, "getAssets", e))?;
        let name = env
            .new_string(path)
            .map_err(|e| jvm::call_failed(&mut env, "new_string", e))?;
        let stream = env
            .call_method(
                &assets,
                "open",
                "(Ljava/lang/String;)Ljava/io/InputStream;",
                &[JValue::Object(&name)],
            )
            .and_then(|v| v.l())
            .map_err(|e| jvm::call_failed(&mut env, "AssetManager.open", e))?;
        env.call_method(&stream, "close", "()V", &[])
            .map_err(|e| jvm::call_failed(&mut env, "InputStream.close", e))?;
        Ok(())
    }
}

impl AssetLookup for JniAssetLookup {
    /// True if the asset bundle can open `path`.
    fn is_asset(&self, path: &str) -> bool {
        match self.open(path) {
            Ok(()) => true,
            Err(e) => {
                log::trace!("{} is not an asset: {}", path, e);
                false
            }
        }
    }
}
