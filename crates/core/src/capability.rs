// Platform capability detection, computed once and consulted everywhere

/// First API level with `SurfaceTexture` (Ice Cream Sandwich).
pub const MIN_SURFACE_TEXTURE_SDK: i32 = 14;

/// What the host platform can do, resolved once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformCapabilities {
    /// Platform API level (SDK_INT on Android)
    pub sdk_level: i32,
    /// Decoded frames can be routed into a GL texture
    pub texture_playback: bool,
}

impl PlatformCapabilities {
    pub fn from_sdk_level(sdk_level: i32) -> Self {
        let texture_playback = sdk_level >= MIN_SURFACE_TEXTURE_SDK;
        if !texture_playback {
            log::warn!(
                "API level {} has no SurfaceTexture, texture playback disabled",
                sdk_level
            );
        }
        Self {
            sdk_level,
            texture_playback,
        }
    }

    /// Capabilities of a platform where every optional feature exists.
    pub fn full() -> Self {
        Self {
            sdk_level: i32::MAX,
            texture_playback: true,
        }
    }
}

impl Default for PlatformCapabilities {
    fn default() -> Self {
        Self::full()
    }
}

/// Map the host's requested GL version onto one the texture bridge supports.
///
/// Anything other than 2 or 3 falls back to 2.
pub fn normalize_gl_version(requested: i32) -> i32 {
    match requested {
        2 | 3 => requested,
        other => {
            log::error!("Incorrect OpenGL version {}, falling back to OpenGL 2", other);
            2
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_texture_threshold() {
        assert!(!PlatformCapabilities::from_sdk_level(13).texture_playback);
        assert!(PlatformCapabilities::from_sdk_level(14).texture_playback);
        assert!(PlatformCapabilities::from_sdk_level(33).texture_playback);
    }

    #[test]
    fn test_gl_version_fallback() {
        assert_eq!(normalize_gl_version(3), 3);
        assert_eq!(normalize_gl_version(2), 2);
        assert_eq!(normalize_gl_version(1), 2);
        assert_eq!(normalize_gl_version(-1), 2);
    }
}
