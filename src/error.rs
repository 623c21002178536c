use thiserror::Error;

/// Everything that can abort a render before the first pixel.
///
/// Per-pixel numeric degeneracies (parallel ray and plane, near-zero
/// discriminant, grazing barycentric hits) never surface here; the
/// intersector absorbs them as misses via the shared epsilon.
#[derive(Debug, Error)]
pub enum TracerError {
    #[error("view direction and up direction are parallel")]
    DegenerateBasis,

    #[error("scene is missing required field `{0}`")]
    MissingSceneField(&'static str),

    #[error("scene parse error at line {line}: {message}")]
    MalformedScene { line: usize, message: String },

    #[error("texture file `{path}`: {message}")]
    UnresolvableTexture { path: String, message: String },

    #[error("image dimensions must both be positive")]
    InvalidImageSize,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TracerError {
    /// Shorthand for a parse failure at a given 1-based source line.
    pub fn malformed(line: usize, message: impl Into<String>) -> TracerError {
        TracerError::MalformedScene { line, message: message.into() }
    }
}

pub type Result<T> = std::result::Result<T, TracerError>;
