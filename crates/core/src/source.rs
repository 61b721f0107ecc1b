// Media source resolution: packaged asset, remote URL or local file

use serde::{Deserialize, Serialize};

/// Answers whether a path names a file packaged with the application.
pub trait AssetLookup: Send + Sync {
    fn is_asset(&self, path: &str) -> bool;
}

/// Lookup for hosts without packaged assets.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoAssets;

impl AssetLookup for NoAssets {
    fn is_asset(&self, _path: &str) -> bool {
        false
    }
}

/// Where a media file comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaSource {
    /// File inside the application's asset bundle
    Asset(String),
    /// Anything with a URL scheme (`http://`, `rtsp://`, `file://`, ...)
    Remote(String),
    /// Plain filesystem path
    File(String),
}

impl MediaSource {
    pub fn resolve(path: &str, assets: &dyn AssetLookup) -> Self {
        if assets.is_asset(path) {
            MediaSource::Asset(path.to_string())
        } else if path.contains("://") {
            MediaSource::Remote(path.to_string())
        } else {
            MediaSource::File(path.to_string())
        }
    }

    pub fn path(&self) -> &str {
        match self {
            MediaSource::Asset(p) | MediaSource::Remote(p) | MediaSource::File(p) => p,
        }
    }

    /// URI the host's own full-screen player should open.
    pub fn fullscreen_uri(&self) -> String {
        match self {
            MediaSource::Asset(p) | MediaSource::Remote(p) => p.clone(),
            MediaSource::File(p) => format!("file://{}", p),
        }
    }
}
