//! End-to-end scenarios: every generated symbol must still scan.

use image::{imageops, DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::Cursor;

use qrsilhouette::encoder::encode;
use qrsilhouette::helper::generate;
use qrsilhouette::overlay::{decode_logo, overlay};
use qrsilhouette::shape::{hexagon_vertices, reshape, Shape};
use qrsilhouette::StyleConfig;

const URL: &str = "https://example.com";

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Decodes every QR grid rqrr can find in `img`.
fn decode_all(img: &RgbaImage) -> Vec<String> {
    let gray = DynamicImage::ImageRgba8(img.clone()).to_luma8();
    let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
        gray.width() as usize,
        gray.height() as usize,
        |x, y| gray.get_pixel(x as u32, y as u32)[0],
    );
    prepared
        .detect_grids()
        .into_iter()
        .filter_map(|grid| grid.decode().ok())
        .map(|(_, content)| content)
        .collect()
}

/// Pads `img` with a white quiet zone so a cropped symbol can be scanned alone.
fn with_quiet_zone(img: &RgbaImage, pad: u32) -> RgbaImage {
    let mut canvas = RgbaImage::from_pixel(img.width() + 2 * pad, img.height() + 2 * pad, Rgba([255, 255, 255, 255]));
    imageops::replace(&mut canvas, img, i64::from(pad), i64::from(pad));
    canvas
}

fn png_logo(side: u32) -> DynamicImage {
    let mut bytes = Vec::new();
    RgbImage::from_pixel(side, side, Rgb([200, 30, 30]))
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    decode_logo(&bytes).unwrap()
}

#[test]
fn plain_symbol_decodes() {
    init_logging();
    let mut rng = StdRng::seed_from_u64(1);
    let img = generate(URL, None, None, &mut rng, &StyleConfig::default()).unwrap();
    assert_eq!(img.width(), img.height());
    assert!(img.pixels().all(|p| p[3] == 255));
    assert!(decode_all(&img).contains(&URL.to_string()));
}

#[test]
fn logo_symbol_decodes() {
    init_logging();
    let config = StyleConfig::default();
    let plain = encode(URL, &config).unwrap();
    let logo = png_logo(64);
    let img = overlay(plain.clone(), Some(&logo), &config);

    assert!(decode_all(&img).contains(&URL.to_string()));

    // The altered block is the 64x64 logo, centred
    let changed: Vec<(u32, u32)> = img
        .enumerate_pixels()
        .filter(|&(x, y, p)| p != plain.get_pixel(x, y))
        .map(|(x, y, _)| (x, y))
        .collect();
    assert!(!changed.is_empty());
    assert!(changed.iter().all(|&(x, y)| (153..217).contains(&x) && (153..217).contains(&y)));
    assert_eq!(*img.get_pixel(185, 185), Rgba([200, 30, 30, 255]));
}

#[test]
fn circle_has_transparent_corners_and_scannable_inlay() {
    init_logging();
    let config = StyleConfig::default();
    let symbol = encode(URL, &config).unwrap();
    let side = symbol.width();
    let mut rng = StdRng::seed_from_u64(2);
    let img = reshape(symbol, Some(Shape::Circle), &mut rng, &config).unwrap();

    assert_eq!(img.width(), side + 2 * 120);
    for &(x, y) in &[(0, 0), (img.width() - 1, 0), (0, img.height() - 1), (img.width() - 1, img.height() - 1)] {
        assert_eq!(img.get_pixel(x, y)[3], 0);
    }

    let inlay = imageops::crop_imm(&img, 120, 120, side, side).to_image();
    assert!(decode_all(&with_quiet_zone(&inlay, 40)).contains(&URL.to_string()));
}

#[test]
fn hexagon_is_transparent_outside_vertices_and_scannable_inside() {
    init_logging();
    let config = StyleConfig::default();
    let symbol = encode(URL, &config).unwrap();
    let side = symbol.width();
    let mut rng = StdRng::seed_from_u64(3);
    let img = reshape(symbol, Some(Shape::Hexagon), &mut rng, &config).unwrap();

    let canvas = side + 2 * 80;
    assert_eq!(img.dimensions(), (canvas, canvas));

    // Points just past each vertex, away from the centre, are outside
    let c = f64::from(canvas) / 2.0;
    for (vx, vy) in hexagon_vertices(canvas) {
        let (ox, oy) = (c + (vx - c) * 1.02, c + (vy - c) * 1.02);
        let (x, y) = (ox.clamp(0.0, f64::from(canvas - 1)) as u32, oy.clamp(0.0, f64::from(canvas - 1)) as u32);
        if (ox - f64::from(x)).abs() < 1.0 && (oy - f64::from(y)).abs() < 1.0 {
            assert_eq!(img.get_pixel(x, y)[3], 0, "pixel ({}, {})", x, y);
        }
        let (ix, iy) = ((c + (vx - c) * 0.9) as u32, (c + (vy - c) * 0.9) as u32);
        assert_eq!(img.get_pixel(ix, iy)[3], 255, "pixel ({}, {})", ix, iy);
    }

    let inlay_side = (f64::from(side) * 0.8).round() as u32;
    let offset = (canvas - inlay_side) / 2;
    let inlay = imageops::crop_imm(&img, offset, offset, inlay_side, inlay_side).to_image();
    assert!(decode_all(&with_quiet_zone(&inlay, 40)).contains(&URL.to_string()));
}

#[test]
fn unknown_shape_matches_no_shape() {
    let config = StyleConfig::default();
    let symbol = encode(URL, &config).unwrap();
    let mut rng = StdRng::seed_from_u64(4);
    let a = reshape(symbol.clone(), Shape::from_selector("octagon"), &mut rng, &config).unwrap();
    let b = reshape(symbol.clone(), None, &mut rng, &config).unwrap();
    assert_eq!(a, b);
    assert_eq!(a, symbol);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Side length follows the version formula and grows with the payload.
    #[test]
    fn side_is_monotonic_in_length(text in "[a-z]{1,120}", extra in "[a-z]{1,40}") {
        let config = StyleConfig::default();
        let short = encode(&text, &config).unwrap();
        let long = encode(&format!("{}{}", text, extra), &config).unwrap();

        prop_assert_eq!(short.width(), short.height());
        prop_assert_eq!(short.width() % 10, 0);
        let modules = short.width() / 10 - 8;
        prop_assert_eq!((modules - 17) % 4, 0);
        prop_assert!(long.width() >= short.width());
    }

    /// Logos never exceed a quarter of the symbol side.
    #[test]
    fn logo_is_capped(w in 1u32..600, h in 1u32..600) {
        let config = StyleConfig::default();
        let symbol = encode(URL, &config).unwrap();
        let logo = DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, Rgb([0, 0, 255])));
        let out = overlay(symbol.clone(), Some(&logo), &config);
        let blue: Vec<(u32, u32)> = out
            .enumerate_pixels()
            .filter(|&(x, y, p)| p != symbol.get_pixel(x, y))
            .map(|(x, y, _)| (x, y))
            .collect();
        let span = |f: fn(&(u32, u32)) -> u32| {
            let min = blue.iter().map(f).min().unwrap_or(0);
            let max = blue.iter().map(f).max().unwrap_or(0);
            max - min + 1
        };
        prop_assert!(span(|c: &(u32, u32)| c.0) <= symbol.width() / 4);
        prop_assert!(span(|c: &(u32, u32)| c.1) <= symbol.width() / 4);
    }
}
