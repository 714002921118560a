use thiserror::Error;

#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("network error fetching {url}: {reason}")]
    Network { url: String, reason: String },
    #[error("failed to decode glTF: {0}")]
    Decode(#[from] gltf::Error),
    #[error("unsupported glTF extension: {0}")]
    UnsupportedExtension(String),
    #[error("model contains no drawable geometry")]
    NoGeometry,
    #[error("invalid node hierarchy: {0}")]
    InvalidHierarchy(String),
    #[error("missing external resource: {0}")]
    MissingResource(String),
    #[error("invalid embedded data: {0}")]
    InvalidData(String),
    #[error("failed to decode image: {0}")]
    Image(#[from] image::ImageError),
    #[error("texture {width}x{height} exceeds the device limit of {max}")]
    TextureTooLarge { width: u32, height: u32, max: u32 },
    #[error("render backend error: {0}")]
    Backend(String),
}

pub type Result<T> = std::result::Result<T, ViewerError>;
