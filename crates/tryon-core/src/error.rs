pub type TryOnResult<T> = Result<T, TryOnError>;

#[derive(thiserror::Error, Debug)]
pub enum TryOnError {
    #[error("image decode error: {0}")]
    ImageDecode(String),

    #[error("image encode error: {0}")]
    ImageEncode(String),

    #[error("invalid color: {0:?}")]
    InvalidColor(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("a generation request is already in flight")]
    Busy,

    #[error("no generation request in flight")]
    NotGenerating,

    #[error("no working image loaded")]
    NoWorkingImage,

    #[error("generation failed: {0}")]
    Generation(String),

    #[error("serialization error: {0}")]
    Serde(String),
}

impl TryOnError {
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::ImageDecode(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::ImageEncode(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn generation(msg: impl Into<String>) -> Self {
        Self::Generation(msg.into())
    }
}

impl From<serde_json::Error> for TryOnError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}
