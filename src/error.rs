// --- File: error.rs ---
use thiserror::Error;

/// Fatal errors raised while bringing the aquarium up.
///
/// Per-frame conditions (a disabled toggle, an empty species bucket, a faded
/// light ray) are never reported through this type.
#[derive(Debug, Error)]
pub enum AquariumError {
    #[error("no suitable GPU adapter found")]
    NoAdapter,

    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("failed to create device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("surface reports no supported formats")]
    NoSurfaceFormat,

    #[error("no {0} model available to build its pipeline")]
    MissingBaseModel(&'static str),

    #[error("{0} model is missing a diffuse texture")]
    MissingDiffuseTexture(String),

    #[error("failed to read asset {path}: {source}")]
    AssetRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse asset {path}: {source}")]
    AssetParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed asset {path}: {reason}")]
    MalformedAsset { path: String, reason: String },

    #[error("failed to decode texture {path}: {source}")]
    TextureDecode {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("cube map faces must share dimensions ({path} is {width}x{height})")]
    CubeFaceMismatch {
        path: String,
        width: u32,
        height: u32,
    },
}

pub type Result<T> = std::result::Result<T, AquariumError>;
// --- End of File: error.rs ---
