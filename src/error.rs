pub type EquicubeResult<T> = Result<T, EquicubeError>;

#[derive(thiserror::Error, Debug)]
pub enum EquicubeError {
    /// Source image missing, unreadable, or not 8-bit RGB/RGBA.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Bad run parameters (e.g. a zero face size).
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// GPU adapter/device acquisition, kernel compilation, dispatch or
    /// readback failed. Only the gpu backend produces this; there is no
    /// automatic fallback to the cpu path.
    #[error("gpu error: {0}")]
    Gpu(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl EquicubeError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    pub fn gpu(msg: impl Into<String>) -> Self {
        Self::Gpu(msg.into())
    }
}
