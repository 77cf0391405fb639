//! Rendering constants shared by every stage.
//!
//! The encoder and the decorative filler must agree on module size, or the
//! crop and paste offsets of the reshaper stop lining up with module edges.

use crate::qrcode::QrCodeEcc;

/// Pixels per module.
pub const MODULE_SIZE: u32 = 10;
/// Quiet zone of the primary symbol, in modules.
pub const QUIET_ZONE: u32 = 4;
/// Pixels stripped from every side before reshaping.
pub const DEBORDER_MARGIN: u32 = 38;
/// Canvas padding around a circular silhouette, in pixels.
pub const CIRCLE_BORDER: u32 = 120;
/// Canvas padding around a hexagonal silhouette, in pixels.
pub const HEXAGON_BORDER: u32 = 80;
/// Inlay shrink factor for the hexagon.
pub const HEXAGON_SCALE: f64 = 0.8;
/// The logo's longer side is at most `symbol_side / LOGO_FRACTION`.
pub const LOGO_FRACTION: u32 = 4;
/// Characters of random text in the decorative filler.
pub const FILLER_LEN: usize = 256;
/// Quiet zone of the decorative filler, in modules.
pub const FILLER_QUIET_ZONE: u32 = 1;

/// Configuration for the encode / overlay / reshape pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleConfig {
    /// Pixels per module (default: 10)
    pub module_size: u32,
    /// Quiet zone in modules (default: 4)
    pub quiet_zone: u32,
    /// Error correction of the primary symbol (default: High)
    pub ecc: QrCodeEcc,
    /// De-border crop margin in pixels (default: 38)
    pub deborder_margin: u32,
    /// Circle canvas padding in pixels (default: 120)
    pub circle_border: u32,
    /// Hexagon canvas padding in pixels (default: 80)
    pub hexagon_border: u32,
    /// Hexagon inlay scale (default: 0.8)
    pub hexagon_scale: f64,
    /// Logo size divisor (default: 4)
    pub logo_fraction: u32,
    /// Filler text length (default: 256)
    pub filler_len: usize,
    /// Filler quiet zone in modules (default: 1)
    pub filler_quiet_zone: u32,
    /// Error correction of the filler symbol (default: Low)
    pub filler_ecc: QrCodeEcc,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            module_size: MODULE_SIZE,
            quiet_zone: QUIET_ZONE,
            ecc: QrCodeEcc::High,
            deborder_margin: DEBORDER_MARGIN,
            circle_border: CIRCLE_BORDER,
            hexagon_border: HEXAGON_BORDER,
            hexagon_scale: HEXAGON_SCALE,
            logo_fraction: LOGO_FRACTION,
            filler_len: FILLER_LEN,
            filler_quiet_zone: FILLER_QUIET_ZONE,
            filler_ecc: QrCodeEcc::Low,
        }
    }
}

impl StyleConfig {
    /// Side length in pixels of a rendered symbol that is `modules` wide.
    pub fn symbol_side(&self, modules: u32) -> u32 {
        (modules + 2 * self.quiet_zone) * self.module_size
    }

    /// Upper bound on the logo's longer side for a symbol of `symbol_side` pixels.
    pub fn max_logo_side(&self, symbol_side: u32) -> u32 {
        (symbol_side / self.logo_fraction.max(1)).max(1)
    }
}
