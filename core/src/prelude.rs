/// Common error type for overlay rendering and image decoding.
#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("image decode failure: {0}")]
    Decode(String),
}

pub type RenderResult<T> = Result<T, RenderError>;

impl From<image::ImageError> for RenderError {
    fn from(err: image::ImageError) -> Self {
        RenderError::Decode(err.to_string())
    }
}
