//! Crate-wide error type.
//!
//! Every fallible operation returns [`Result`]. An unknown shape selector and
//! a missing upstream image are deliberately not errors: both resolve to
//! `None` and pass the image through unchanged.

use crate::qrcode::DataTooLong;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The payload is empty or does not fit at the configured error correction level.
    #[error("payload does not fit in a QR symbol: {0}")]
    CapacityExceeded(#[from] DataTooLong),

    /// The logo bytes or file are not a decodable raster image.
    #[error("logo could not be decoded: {0}")]
    LogoDecode(#[source] image::ImageError),

    /// A required request field is missing or has the wrong type.
    #[error("{0}")]
    InvalidRequest(String),

    /// The website URL is longer than the request layer accepts.
    #[error("URL length {len} exceeds the maximum limit of {max} characters")]
    PayloadTooLong { len: usize, max: usize },

    /// The website URL does not look like an http(s) URL.
    #[error("the provided website URL is not in a valid format: {0}")]
    InvalidUrl(String),

    #[error("could not parse JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    /// Encoding or saving the output image failed.
    #[error("image output failed: {0}")]
    Image(#[source] image::ImageError),

    #[error("file system error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
