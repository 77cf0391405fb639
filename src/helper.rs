use crate::config::StyleConfig;
use crate::encoder::{encode, render};
use crate::error::{Error, Result};
use crate::overlay::{open_logo, overlay};
use crate::qrcode::QrCode;
use crate::shape::{reshape, Shape};

use base64::{engine::general_purpose, Engine as _};
use image::{DynamicImage, ImageFormat, RgbaImage};
use rand::Rng;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/*---- Pipeline ----*/

/// Runs encode, overlay and reshape in order.
///
/// # Arguments
///
/// * `content` - The text to encode.
/// * `logo` - Optional logo stamped on the centre.
/// * `shape` - Optional silhouette.
/// * `rng` - Source of the decorative filler text.
/// * `config` - Rendering constants.
///
/// # Example
///
/// ```rust
/// use qrsilhouette::{config::StyleConfig, helper::generate, shape::Shape};
///
/// let img = generate("https://example.com", None, Some(Shape::Circle), &mut rand::rng(),
///     &StyleConfig::default()).unwrap();
/// assert_eq!(img.width(), 370 + 240);
/// ```
pub fn generate<R: Rng + ?Sized>(
    content: &str,
    logo: Option<&DynamicImage>,
    shape: Option<Shape>,
    rng: &mut R,
    config: &StyleConfig,
) -> Result<RgbaImage> {
    let symbol = encode(content, config)?;
    let stamped = overlay(symbol, logo, config);
    reshape(stamped, shape, rng, config)
}

/// Overlay and reshape stages on an already encoded symbol.
///
/// A missing symbol is passed through as `None` rather than reported as an
/// error; the failure belongs to whatever produced it.
pub fn compose<R: Rng + ?Sized>(
    symbol: Option<RgbaImage>,
    logo: Option<&DynamicImage>,
    shape: Option<Shape>,
    rng: &mut R,
    config: &StyleConfig,
) -> Result<Option<RgbaImage>> {
    let Some(symbol) = symbol else {
        log::debug!("no base image, skipping overlay and reshape");
        return Ok(None);
    };
    reshape(overlay(symbol, logo, config), shape, rng, config).map(Some)
}

/// Generates an image with the default configuration and a thread-local
/// random source.
///
/// # Example
///
/// ```
/// use qrsilhouette::helper::generate_image_buffer;
///
/// let img = generate_image_buffer("Hello, World!", None, None).unwrap();
/// assert_eq!(img.width(), img.height());
/// ```
pub fn generate_image_buffer(
    content: &str,
    logo: Option<&DynamicImage>,
    shape: Option<Shape>,
) -> Result<RgbaImage> {
    generate(content, logo, shape, &mut rand::rng(), &StyleConfig::default())
}

/// Generates an image and saves it as PNG.
///
/// # Arguments
///
/// * `content` - The text to encode.
/// * `logo_path` - Optional. Path of a logo image to stamp on the centre.
/// * `shape` - Optional. Silhouette to apply.
/// * `directory` - Optional. Output directory, "generated" by default.
/// * `filename` - Optional. File name; a timestamp is used if absent.
///
/// # Returns
///
/// The path of the written file.
pub fn generate_image(
    content: &str,
    logo_path: Option<&str>,
    shape: Option<Shape>,
    directory: Option<&str>,
    filename: Option<&str>,
) -> Result<PathBuf> {
    let logo = logo_path.map(open_logo).transpose()?;
    let img = generate_image_buffer(content, logo.as_ref(), shape)?;
    save_image(&img, directory, filename)
}

/*---- Output ----*/

/// Saves `img` as `<directory>/<filename>.png`, creating the directory if
/// needed.
///
/// # Errors
///
/// [`Error::Io`] if the directory cannot be created, [`Error::Image`] if the
/// PNG cannot be written.
pub fn save_image(img: &RgbaImage, directory: Option<&str>, filename: Option<&str>) -> Result<PathBuf> {
    let directory_path = directory.unwrap_or("generated");
    let filename = match filename {
        Some(name) => name.to_string(),
        None => {
            let since_the_epoch = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default();
            format!("qr_{}", since_the_epoch.as_millis())
        }
    };

    if !Path::new(directory_path).exists() {
        fs::create_dir_all(directory_path)?;
    }

    let file_path = Path::new(directory_path).join(filename).with_extension("png");
    img.save_with_format(&file_path, ImageFormat::Png).map_err(Error::Image)?;
    log::debug!("saved {}x{} image to {}", img.width(), img.height(), file_path.display());
    Ok(file_path)
}

/// Renders a bare symbol with the default styling and saves it.
pub fn qr_to_image_and_save(qr: &QrCode, directory: Option<&str>, filename: Option<&str>) -> Result<PathBuf> {
    let config = StyleConfig::default();
    let img = render(qr, config.module_size, config.quiet_zone);
    save_image(&img, directory, filename)
}

/// Encodes `img` as PNG bytes.
pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(Error::Image)?;
    Ok(bytes)
}

/// Encodes `img` as a standard base64 PNG string, ready for a JSON body.
pub fn encode_base64_png(img: &RgbaImage) -> Result<String> {
    Ok(general_purpose::STANDARD.encode(encode_png(img)?))
}

/// Returns the symbol as text, two characters per module, with `border`
/// light modules around it.
pub fn to_console_string(qr: &QrCode, border: i32) -> String {
    let mut result = String::new();
    for y in -border..qr.size() + border {
        for x in -border..qr.size() + border {
            let c: char = if qr.get_module(x, y) { '█' } else { ' ' };
            result.push(c);
            result.push(c);
        }
        result.push('\n');
    }
    result
}

/// Prints the given QrCode object to the console.
pub fn print_qr(qr: &QrCode) {
    println!("{}", to_console_string(qr, 4));
}
