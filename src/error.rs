// One error type for the whole app.
// Every variant states *where* things went wrong.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Creating the window failed
    #[error("window init error: {0}")]
    WindowInit(String),

    /// Updating the window buffer failed
    #[error("window update error: {0}")]
    WindowUpdate(String),

    /// The scratch canvas could not be allocated (bad pixel ratio, too large, ...)
    #[error("scratch canvas unavailable: {0}")]
    CanvasUnavailable(String),

    /// Two buffers that must line up pixel-for-pixel did not
    #[error("size mismatch: {0}")]
    SizeMismatch(String),

    /// The gate URL could not be turned into a QR matrix
    #[error("qr encode error: {0}")]
    Qr(String),

    /// The share target refused or failed to take the card
    #[error("share failed: {0}")]
    Share(String),

    #[error("invalid page url: {0}")]
    Url(#[from] url::ParseError),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
