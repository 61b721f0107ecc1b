// Process-wide logger installation

use std::sync::Once;

pub const LOG_TAG: &str = "TexplayMedia";

static INIT_LOGGER: Once = Once::new();

/// Install the platform logger. Only the first call's level is used.
pub fn init_logging(level: log::LevelFilter) {
    INIT_LOGGER.call_once(|| {
        #[cfg(target_os = "android")]
        android_logger::init_once(
            android_logger::Config::default()
                .with_max_level(level)
                .with_tag(LOG_TAG),
        );

        #[cfg(not(target_os = "android"))]
        {
            if let Err(e) = env_logger::builder()
                .is_test(false)
                .filter_level(level)
                .try_init()
            {
                // Another logger owns the facade, so report through it
                log::warn!("{} logger not installed: {}", LOG_TAG, e);
            }
        }
    });
}
