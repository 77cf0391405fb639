//! Symbol encoder: payload text to an RGBA raster.

use image::{ImageBuffer, Rgba, RgbaImage};

use crate::config::StyleConfig;
use crate::error::{Error, Result};
use crate::qrcode::{DataTooLong, QrCode, QrCodeEcc};

pub const DARK: Rgba<u8> = Rgba([0, 0, 0, 255]);
pub const LIGHT: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Encodes `payload` and renders it black on white with the configured
/// module size and quiet zone.
///
/// # Errors
///
/// [`Error::CapacityExceeded`] if the payload is empty or too long for
/// `config.ecc`. The payload is never truncated.
///
/// # Example
///
/// ```rust
/// use qrsilhouette::{config::StyleConfig, encoder::encode};
///
/// let img = encode("https://example.com", &StyleConfig::default()).unwrap();
/// assert_eq!(img.dimensions(), (370, 370));
/// ```
pub fn encode(payload: &str, config: &StyleConfig) -> Result<RgbaImage> {
    let qr = encode_symbol(payload, config.ecc)?;
    let img = render(&qr, config.module_size, config.quiet_zone);
    log::debug!(
        "encoded {} bytes as version {} symbol, {}x{} px",
        payload.len(),
        qr.version().value(),
        img.width(),
        img.height()
    );
    Ok(img)
}

/// Encodes `payload` into a symbol matrix without rendering it.
pub fn encode_symbol(payload: &str, ecc: QrCodeEcc) -> Result<QrCode> {
    if payload.is_empty() {
        return Err(Error::CapacityExceeded(DataTooLong::Empty));
    }
    Ok(QrCode::encode_text(payload, ecc)?)
}

/// Rasterizes `qr` with `border` light modules on every side.
pub fn render(qr: &QrCode, module_size: u32, border: u32) -> RgbaImage {
    let module_size = module_size.max(1);
    let side = (qr.size() as u32 + 2 * border) * module_size;
    let border = border as i32;
    ImageBuffer::from_fn(side, side, |x, y| {
        let qr_x = (x / module_size) as i32 - border;
        let qr_y = (y / module_size) as i32 - border;
        if qr.get_module(qr_x, qr_y) { DARK } else { LIGHT }
    })
}
