use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("song `{0}` is not in the registry")]
    SongNotFound(String),
    #[error("model {0}: only GLB-embedded buffers are supported")]
    UnsupportedBuffer(String),
    #[error("model {0} contains no triangle geometry")]
    EmptyModel(String),
    #[error(transparent)]
    Gltf(#[from] gltf::Error),
}
