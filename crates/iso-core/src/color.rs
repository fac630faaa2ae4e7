//! Colors: hex parsing, palette lookup, and shade variants.
//!
//! Documents store colors as `#RRGGBB` strings, either in the palette or
//! inline on an entity. Shade variants (used for default outlines) shift
//! CIE-Lab lightness by a fixed step per grade, so a "darker by 2" outline
//! looks equally darker on any hue.

use crate::id::EntityId;
use crate::model::PaletteColor;

/// RGB color, 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Parse a single hex digit.
pub fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

/// Check `^#[0-9A-Fa-f]{6}$`.
pub fn is_hex_color(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 7 && bytes[0] == b'#' && bytes[1..].iter().all(|&c| hex_val(c).is_some())
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a strict `#RRGGBB` string.
    pub fn from_hex(hex: &str) -> Option<Self> {
        if !is_hex_color(hex) {
            return None;
        }
        let bytes = &hex.as_bytes()[1..];
        let channel = |i: usize| Some(hex_val(bytes[i])? << 4 | hex_val(bytes[i + 1])?);
        Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Emit as lowercase `#rrggbb`.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Perceived lightness (CIE-Lab L*, 0..=100).
    pub fn lightness(&self) -> f64 {
        rgb_to_lab(*self)[0]
    }
}

// ─── Palette ─────────────────────────────────────────────────────────────

/// Look up a palette entry and parse its value.
pub fn resolve_color(palette: &[PaletteColor], id: EntityId) -> Option<Color> {
    let entry = palette.iter().find(|c| c.id == id)?;
    let color = Color::from_hex(&entry.value);
    if color.is_none() {
        log::warn!("palette color {id} has malformed value {:?}", entry.value);
    }
    color
}

// ─── Variants ────────────────────────────────────────────────────────────

/// Which way a variant moves lightness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shade {
    Dark,
    Light,
}

/// Lab lightness step per grade.
const LAB_STEP: f64 = 18.0;

/// Derive a darker or lighter variant of `color`, `grade` steps away.
pub fn derive_variant(color: Color, shade: Shade, grade: f64) -> Color {
    let mut lab = rgb_to_lab(color);
    let delta = LAB_STEP * grade;
    match shade {
        Shade::Dark => lab[0] -= delta,
        Shade::Light => lab[0] += delta,
    }
    lab_to_rgb(lab)
}

// D65 reference white
const XN: f64 = 0.950470;
const YN: f64 = 1.0;
const ZN: f64 = 1.088830;

const T0: f64 = 4.0 / 29.0;
const T1: f64 = 6.0 / 29.0;
const T2: f64 = 3.0 * T1 * T1;
const T3: f64 = T1 * T1 * T1;

fn rgb_to_lab(c: Color) -> [f64; 3] {
    let r = srgb_to_linear(c.r);
    let g = srgb_to_linear(c.g);
    let b = srgb_to_linear(c.b);
    let x = xyz_to_lab((0.4124564 * r + 0.3575761 * g + 0.1804375 * b) / XN);
    let y = xyz_to_lab((0.2126729 * r + 0.7151522 * g + 0.0721750 * b) / YN);
    let z = xyz_to_lab((0.0193339 * r + 0.1191920 * g + 0.9503041 * b) / ZN);
    let l = 116.0 * y - 16.0;
    [l.max(0.0), 500.0 * (x - y), 200.0 * (y - z)]
}

fn lab_to_rgb([l, a, b]: [f64; 3]) -> Color {
    let y = (l + 16.0) / 116.0;
    let x = y + a / 500.0;
    let z = y - b / 200.0;

    let y = YN * lab_to_xyz(y);
    let x = XN * lab_to_xyz(x);
    let z = ZN * lab_to_xyz(z);

    Color::rgb(
        linear_to_srgb(3.2404542 * x - 1.5371385 * y - 0.4985314 * z),
        linear_to_srgb(-0.9692660 * x + 1.8760108 * y + 0.0415560 * z),
        linear_to_srgb(0.0556434 * x - 0.2040259 * y + 1.0572252 * z),
    )
}

fn srgb_to_linear(c: u8) -> f64 {
    let c = c as f64 / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_to_srgb(c: f64) -> u8 {
    let v = if c <= 0.00304 {
        12.92 * c
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    };
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

fn xyz_to_lab(t: f64) -> f64 {
    if t > T3 { t.cbrt() } else { t / T2 + T0 }
}

fn lab_to_xyz(t: f64) -> f64 {
    if t > T1 { t * t * t } else { T2 * (t - T0) }
}
