//! Silhouette reshaper.
//!
//! Turns a square symbol into a circular or hexagonal badge. The symbol is
//! stripped of most of its quiet zone, laid over a decorative QR pattern that
//! fills the rest of the canvas, and everything outside the silhouette is
//! made transparent.
//!
//! Both silhouettes run through [`reshape_with`]; they differ only in their
//! [`ShapeProfile`].

use image::{imageops, imageops::FilterType, GrayImage, Luma, Rgba, RgbaImage};
use rand::Rng;

use crate::config::StyleConfig;
use crate::encoder;
use crate::error::Result;
use crate::qrcode::QrCode;

/// Pixel written outside the silhouette.
pub const TRANSPARENT: Rgba<u8> = Rgba([255, 255, 255, 0]);

const FILLER_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Outer boundary of a reshaped symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Circle,
    Hexagon,
}

impl Shape {
    /// Resolves a user supplied selector, case-insensitively.
    ///
    /// Unknown selectors resolve to `None`, meaning no silhouette.
    pub fn from_selector(selector: &str) -> Option<Self> {
        match selector.to_ascii_lowercase().as_str() {
            "circle" => Some(Shape::Circle),
            "hexagon" => Some(Shape::Hexagon),
            "" => None,
            other => {
                log::warn!("ignoring unknown shape selector {:?}", other);
                None
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Shape::Circle => "circle",
            Shape::Hexagon => "hexagon",
        }
    }

    /// Reshaping parameters for this silhouette under `config`.
    pub fn profile(self, config: &StyleConfig) -> ShapeProfile {
        match self {
            Shape::Circle => ShapeProfile {
                border: config.circle_border,
                scale: 1.0,
                mask: circle_mask,
            },
            Shape::Hexagon => ShapeProfile {
                border: config.hexagon_border,
                scale: config.hexagon_scale,
                mask: hexagon_mask,
            },
        }
    }
}

/// What distinguishes one silhouette from another.
#[derive(Debug, Clone, Copy)]
pub struct ShapeProfile {
    /// Canvas padding added on each side of the symbol, in pixels.
    pub border: u32,
    /// Factor applied to the de-bordered symbol before it is inlaid.
    pub scale: f64,
    /// Builds a `side`x`side` coverage mask, 255 inside and 0 outside.
    pub mask: fn(u32) -> GrayImage,
}

/// Reshapes `symbol` into `shape`, or returns it untouched for `None`.
///
/// `rng` supplies the decorative filler text; pass a seeded generator for
/// reproducible output.
///
/// # Errors
///
/// Only fails if `config.filler_len` is too long for a filler symbol.
pub fn reshape<R: Rng + ?Sized>(
    symbol: RgbaImage,
    shape: Option<Shape>,
    rng: &mut R,
    config: &StyleConfig
) -> Result<RgbaImage> {
    match shape {
        None => Ok(symbol),
        Some(shape) => {
            log::debug!("reshaping {}x{} symbol into a {}", symbol.width(), symbol.height(), shape.name());
            reshape_with(&symbol, &shape.profile(config), rng, config)
        }
    }
}

/// The reshaping algorithm for an arbitrary profile.
pub fn reshape_with<R: Rng + ?Sized>(
    symbol: &RgbaImage,
    profile: &ShapeProfile,
    rng: &mut R,
    config: &StyleConfig
) -> Result<RgbaImage> {
    let inlay = scale_inlay(deborder(symbol, config.deborder_margin), profile.scale);

    let canvas_side = symbol.width() + 2 * profile.border;
    let mut layer = filler_layer(canvas_side, rng, config)?;

    let x = i64::from(canvas_side.saturating_sub(inlay.width()) / 2);
    let y = i64::from(canvas_side.saturating_sub(inlay.height()) / 2);
    imageops::overlay(&mut layer, &inlay, x, y);
    log::debug!("inlaid {}x{} symbol at ({}, {}) on {} px canvas", inlay.width(), inlay.height(), x, y, canvas_side);

    let mask = (profile.mask)(canvas_side);
    Ok(apply_mask(&layer, &mask))
}

/// Crops `margin` pixels off every side, then scales the crop back up to the
/// original size with nearest-neighbour sampling so module edges stay hard.
///
/// Symbols too small to crop are returned as they are.
pub fn deborder(symbol: &RgbaImage, margin: u32) -> RgbaImage {
    let (w, h) = symbol.dimensions();
    if margin == 0 || 2 * margin >= w || 2 * margin >= h {
        return symbol.clone();
    }
    let cropped = imageops::crop_imm(symbol, margin, margin, w - 2 * margin, h - 2 * margin).to_image();
    imageops::resize(&cropped, w, h, FilterType::Nearest)
}

/// Scales the inlay by `scale`, rounding to whole pixels.
pub fn scale_inlay(inlay: RgbaImage, scale: f64) -> RgbaImage {
    if (scale - 1.0).abs() < f64::EPSILON {
        return inlay;
    }
    let (w, h) = inlay.dimensions();
    let w = ((f64::from(w) * scale).round() as u32).max(1);
    let h = ((f64::from(h) * scale).round() as u32).max(1);
    imageops::resize(&inlay, w, h, FilterType::Nearest)
}

/// Random filler text drawn from `A`–`Z` and `0`–`9`.
pub fn filler_text<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| char::from(FILLER_ALPHABET[rng.random_range(0..FILLER_ALPHABET.len())]))
        .collect()
}

/// Renders a throwaway symbol of random text and stretches it over the
/// whole canvas. It is never meant to be scanned, so smooth resampling is fine.
pub fn filler_layer<R: Rng + ?Sized>(canvas_side: u32, rng: &mut R, config: &StyleConfig) -> Result<RgbaImage> {
    let text = filler_text(rng, config.filler_len);
    let qr = QrCode::encode_text(&text, config.filler_ecc)?;
    let rendered = encoder::render(&qr, config.module_size, config.filler_quiet_zone);
    log::trace!("filler symbol version {}, {} px", qr.version().value(), rendered.width());
    Ok(imageops::resize(&rendered, canvas_side, canvas_side, FilterType::Lanczos3))
}

fn coverage(inside: bool) -> Luma<u8> {
    Luma([if inside { 255 } else { 0 }])
}

/// Disc inscribed in a `side`x`side` square.
pub fn circle_mask(side: u32) -> GrayImage {
    let r = f64::from(side) / 2.0;
    GrayImage::from_fn(side, side, |x, y| {
        let dx = f64::from(x) + 0.5 - r;
        let dy = f64::from(y) + 0.5 - r;
        coverage(dx * dx + dy * dy <= r * r)
    })
}

/// Vertices of the regular hexagon centred in a `side`x`side` square, with
/// circumradius `side / 2` and the first vertex at 0°.
pub fn hexagon_vertices(side: u32) -> [(f64, f64); 6] {
    let c = f64::from(side) / 2.0;
    std::array::from_fn(|i| {
        let angle = (60.0 * i as f64).to_radians();
        (c + c * angle.cos(), c + c * angle.sin())
    })
}

/// Filled regular hexagon; see [`hexagon_vertices`].
pub fn hexagon_mask(side: u32) -> GrayImage {
    let vertices = hexagon_vertices(side);
    GrayImage::from_fn(side, side, |x, y| {
        coverage(inside_convex(&vertices, (f64::from(x) + 0.5, f64::from(y) + 0.5)))
    })
}

// Vertices must wind clockwise on screen (increasing angle with y pointing down).
fn inside_convex(vertices: &[(f64, f64)], (px, py): (f64, f64)) -> bool {
    let n = vertices.len();
    (0..n).all(|i| {
        let (ax, ay) = vertices[i];
        let (bx, by) = vertices[(i + 1) % n];
        (bx - ax) * (py - ay) - (by - ay) * (px - ax) >= 0.0
    })
}

/// Copies `layer` wherever `mask` is set, transparent elsewhere. The layer is
/// opaque, so covered pixels come out with alpha 255.
fn apply_mask(layer: &RgbaImage, mask: &GrayImage) -> RgbaImage {
    RgbaImage::from_fn(layer.width(), layer.height(), |x, y| {
        if mask.get_pixel(x, y)[0] == 0 {
            TRANSPARENT
        } else {
            let Rgba([r, g, b, _]) = *layer.get_pixel(x, y);
            Rgba([r, g, b, 255])
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::encode;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn symbol() -> RgbaImage {
        encode("https://example.com", &StyleConfig::default()).unwrap()
    }

    #[test]
    fn test_from_selector() {
        assert_eq!(Shape::from_selector("circle"), Some(Shape::Circle));
        assert_eq!(Shape::from_selector("Hexagon"), Some(Shape::Hexagon));
        assert_eq!(Shape::from_selector("CIRCLE"), Some(Shape::Circle));
        assert_eq!(Shape::from_selector("triangle"), None);
        assert_eq!(Shape::from_selector(""), None);
    }

    #[test]
    fn test_no_shape_is_identity() {
        let sym = symbol();
        let mut rng = StdRng::seed_from_u64(1);
        let out = reshape(sym.clone(), None, &mut rng, &StyleConfig::default()).unwrap();
        assert_eq!(out, sym);
    }

    #[test]
    fn test_circle_dimensions_and_corners() {
        let sym = symbol();
        let mut rng = StdRng::seed_from_u64(7);
        let out = reshape(sym, Some(Shape::Circle), &mut rng, &StyleConfig::default()).unwrap();
        assert_eq!(out.dimensions(), (370 + 240, 370 + 240));
        assert_eq!(out.get_pixel(0, 0)[3], 0);
        assert_eq!(out.get_pixel(609, 609)[3], 0);
        assert_eq!(out.get_pixel(305, 305)[3], 255);
        // Edge midpoints sit on the disc
        assert_eq!(out.get_pixel(1, 305)[3], 255);
        assert_eq!(out.get_pixel(305, 1)[3], 255);
    }

    #[test]
    fn test_hexagon_dimensions_and_corners() {
        let sym = symbol();
        let mut rng = StdRng::seed_from_u64(7);
        let out = reshape(sym, Some(Shape::Hexagon), &mut rng, &StyleConfig::default()).unwrap();
        assert_eq!(out.dimensions(), (370 + 160, 370 + 160));
        // Vertex at 0° touches the right edge; top and bottom are flat
        assert_eq!(out.get_pixel(528, 265)[3], 255);
        assert_eq!(out.get_pixel(265, 2)[3], 0);
        assert_eq!(out.get_pixel(265, 40)[3], 255);
        assert_eq!(out.get_pixel(0, 0)[3], 0);
        assert_eq!(out.get_pixel(100, 10)[3], 0);
    }

    #[test]
    fn test_alpha_is_binary() {
        let sym = symbol();
        let mut rng = StdRng::seed_from_u64(3);
        for shape in [Shape::Circle, Shape::Hexagon] {
            let out = reshape(sym.clone(), Some(shape), &mut rng, &StyleConfig::default()).unwrap();
            let mask = (shape.profile(&StyleConfig::default()).mask)(out.width());
            for (x, y, p) in out.enumerate_pixels() {
                let inside = mask.get_pixel(x, y)[0] == 255;
                assert_eq!(p[3], if inside { 255 } else { 0 }, "{:?} at ({}, {})", shape, x, y);
            }
        }
    }

    #[test]
    fn test_circle_inlay_is_deborderd_symbol() {
        let sym = symbol();
        let mut rng = StdRng::seed_from_u64(11);
        let out = reshape(sym.clone(), Some(Shape::Circle), &mut rng, &StyleConfig::default()).unwrap();
        let inlay = imageops::crop_imm(&out, 120, 120, 370, 370).to_image();
        assert_eq!(inlay, deborder(&sym, 38));
    }

    #[test]
    fn test_hexagon_inlay_is_scaled() {
        let sym = symbol();
        let scaled = scale_inlay(deborder(&sym, 38), 0.8);
        assert_eq!(scaled.dimensions(), (296, 296));

        let mut rng = StdRng::seed_from_u64(11);
        let out = reshape(sym, Some(Shape::Hexagon), &mut rng, &StyleConfig::default()).unwrap();
        // (530 - 296) / 2 = 117
        let inlay = imageops::crop_imm(&out, 117, 117, 296, 296).to_image();
        assert_eq!(inlay, scaled);
    }

    #[test]
    fn test_deborder_keeps_size_and_hard_edges() {
        let sym = symbol();
        let out = deborder(&sym, 38);
        assert_eq!(out.dimensions(), sym.dimensions());
        assert!(out.pixels().all(|p| *p == encoder::DARK || *p == encoder::LIGHT));
        // The finder now starts near the edge: 2 px of quiet zone scaled by 370/294
        assert_eq!(*out.get_pixel(0, 0), encoder::LIGHT);
        assert_eq!(*out.get_pixel(4, 4), encoder::DARK);
    }

    #[test]
    fn test_filler_text() {
        let mut rng = StdRng::seed_from_u64(42);
        let text = filler_text(&mut rng, 256);
        assert_eq!(text.len(), 256);
        assert!(text.bytes().all(|b| FILLER_ALPHABET.contains(&b)));

        let mut again = StdRng::seed_from_u64(42);
        assert_eq!(filler_text(&mut again, 256), text);
    }

    #[test]
    fn test_filler_layer_covers_canvas() {
        let mut rng = StdRng::seed_from_u64(5);
        let layer = filler_layer(610, &mut rng, &StyleConfig::default()).unwrap();
        assert_eq!(layer.dimensions(), (610, 610));
    }

    #[test]
    fn test_hexagon_vertices() {
        let v = hexagon_vertices(200);
        assert!((v[0].0 - 200.0).abs() < 1e-9 && (v[0].1 - 100.0).abs() < 1e-9);
        assert!((v[3].0 - 0.0).abs() < 1e-9 && (v[3].1 - 100.0).abs() < 1e-9);
        assert!((v[1].1 - (100.0 + 100.0 * 3f64.sqrt() / 2.0)).abs() < 1e-9);
    }

    #[test]
    fn test_masks() {
        let circle = circle_mask(100);
        assert_eq!(circle.get_pixel(50, 50)[0], 255);
        assert_eq!(circle.get_pixel(0, 0)[0], 0);
        assert_eq!(circle.get_pixel(99, 0)[0], 0);

        let hex = hexagon_mask(100);
        assert_eq!(hex.get_pixel(50, 50)[0], 255);
        assert_eq!(hex.get_pixel(98, 50)[0], 255);
        assert_eq!(hex.get_pixel(50, 2)[0], 0);
        assert!(hex.pixels().all(|p| p[0] == 0 || p[0] == 255));
    }
}
