//! Overlay compositor: stamps a logo on the centre of a symbol.
//!
//! The logo is capped at a fraction of the symbol side so the occluded
//! modules stay within what High error correction can recover.

use std::path::Path;

use image::{imageops, imageops::FilterType, DynamicImage, RgbaImage};

use crate::config::StyleConfig;
use crate::error::{Error, Result};

/// Decodes logo bytes in any format the `image` crate recognizes.
///
/// # Errors
///
/// [`Error::LogoDecode`] when the bytes are not a raster image. There is no
/// fallback to a logo-free symbol; that choice is left to the caller.
pub fn decode_logo(bytes: &[u8]) -> Result<DynamicImage> {
    image::load_from_memory(bytes).map_err(Error::LogoDecode)
}

/// Opens a logo from disk.
pub fn open_logo<P: AsRef<Path>>(path: P) -> Result<DynamicImage> {
    image::open(path).map_err(Error::LogoDecode)
}

/// Dimensions of a `width`x`height` image shrunk to fit in a `max`x`max`
/// box with its aspect ratio kept. Images that already fit are left alone.
pub fn fit_within(width: u32, height: u32, max: u32) -> (u32, u32) {
    if width <= max && height <= max {
        return (width, height);
    }
    let scale = f64::from(max) / f64::from(width.max(height));
    let fit = |v: u32| ((f64::from(v) * scale).round() as u32).clamp(1, max);
    (fit(width), fit(height))
}

/// Stamps `logo` centred on `symbol`.
///
/// Returns `symbol` untouched when `logo` is `None`. Logos carrying an alpha
/// channel are blended through it; others are pasted opaquely.
pub fn overlay(mut symbol: RgbaImage, logo: Option<&DynamicImage>, config: &StyleConfig) -> RgbaImage {
    let Some(logo) = logo else {
        return symbol;
    };

    let (side_w, side_h) = symbol.dimensions();
    let max_side = config.max_logo_side(side_w);
    let (w, h) = fit_within(logo.width(), logo.height(), max_side);
    let mut stamp: RgbaImage = logo.to_rgba8();
    if (w, h) != stamp.dimensions() {
        stamp = imageops::resize(&stamp, w, h, FilterType::CatmullRom);
    }

    let x = i64::from(side_w.saturating_sub(w) / 2);
    let y = i64::from(side_h.saturating_sub(h) / 2);
    let has_alpha = logo.color().has_alpha();
    log::debug!(
        "placing {}x{} logo (source {}x{}, alpha: {}) at ({}, {})",
        w,
        h,
        logo.width(),
        logo.height(),
        has_alpha,
        x,
        y
    );

    if has_alpha {
        blend_opaque(&mut symbol, &stamp, x as u32, y as u32);
    } else {
        imageops::replace(&mut symbol, &stamp, x, y);
    }
    symbol
}

/// Composites `stamp` over `base` at (`x`, `y`), keeping `base` opaque.
///
/// Each channel becomes `src * a + dst * (255 - a)`, rounded, with the
/// result alpha fixed at 255. Parts of `stamp` past the edge are dropped.
fn blend_opaque(base: &mut RgbaImage, stamp: &RgbaImage, x: u32, y: u32) {
    for (sx, sy, src) in stamp.enumerate_pixels() {
        let (bx, by) = (x + sx, y + sy);
        if bx >= base.width() || by >= base.height() {
            continue;
        }
        let a = u32::from(src[3]);
        let dst = base.get_pixel_mut(bx, by);
        for c in 0..3 {
            let mixed = u32::from(src[c]) * a + u32::from(dst[c]) * (255 - a);
            dst[c] = ((mixed + 127) / 255) as u8;
        }
        dst[3] = 255;
    }
}
