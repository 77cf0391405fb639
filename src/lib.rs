//! # qrsilhouette
//!
//! QR code images with an optional centred logo and an optional circular or
//! hexagonal silhouette.
//!
//! Generation is a pipeline of three pure stages, all working on
//! [`image::RgbaImage`]:
//!
//! 1. [`encoder`] turns the payload into a black-on-white symbol at High
//!    error correction.
//! 2. [`overlay`] stamps a logo on the centre, capped at a quarter of the side.
//! 3. [`shape`] crops the quiet zone, lays the symbol over a decorative QR
//!    pattern and masks everything outside a circle or hexagon to transparent.
//!
//! No stage keeps state between calls. The only randomness, the text of the
//! decorative pattern, comes from an [`rand::Rng`] passed in by the caller.
//!
//! ## Example
//!
//! ```rust
//! use qrsilhouette::{config::StyleConfig, helper::generate, shape::Shape};
//!
//! let img = generate(
//!     "https://example.com",
//!     None,
//!     Shape::from_selector("hexagon"),
//!     &mut rand::rng(),
//!     &StyleConfig::default(),
//! ).unwrap();
//! assert_eq!(img.dimensions(), (530, 530));
//! ```
//!
//! ## Modules
//!
//! - [`qrcode`]: QR symbol encoding.
//! - [`encoder`], [`overlay`], [`shape`]: the three pipeline stages.
//! - [`helper`]: pipeline entry points, PNG / base64 output, console printing.
//! - [`request`]: JSON request validation and response envelope.
//! - [`config`], [`error`]: shared configuration and error type.

pub mod config;
pub mod encoder;
pub mod error;
pub mod helper;
pub mod overlay;
pub mod qrcode;
pub mod request;
pub mod shape;

pub use config::StyleConfig;
pub use error::{Error, Result};
pub use shape::Shape;
