use std::path::Path;

use bon::Builder;
use serde::{Deserialize, Serialize};

use crate::error::GaugeError;

// ============================================================================
// COLORS
// ============================================================================

/// A concrete color with straight (non-premultiplied) alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    #[serde(default = "opaque")]
    pub a: u8,
}

fn opaque() -> u8 {
    0xff
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::rgb(0x00, 0x00, 0x00);
    pub const WHITE: Rgba = Rgba::rgb(0xff, 0xff, 0xff);
    pub const TRANSPARENT: Rgba = Rgba::new(0x00, 0x00, 0x00, 0x00);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 0xff)
    }

    pub const fn as_tuple(self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }

    pub fn alpha(self) -> f32 {
        self.a as f32 / 255.0
    }
}

/// A color as written in a configuration: either explicit channels or a
/// name understood by [`Color::resolve`].
///
/// Names are the SVG/X11 keywords (`"white"`, `"darkred"`, `"transparent"`,
/// ...) or hex strings `#rgb`, `#rrggbb` and `#aarrggbb`. The eight digit
/// form puts alpha first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Color {
    Rgba(Rgba),
    Named(String),
}

impl Color {
    pub fn named(name: impl Into<String>) -> Self {
        Color::Named(name.into())
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color::Rgba(Rgba::rgb(r, g, b))
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Color::Rgba(Rgba::new(r, g, b, a))
    }

    pub fn resolve(&self) -> Result<Rgba, GaugeError> {
        match self {
            Color::Rgba(rgba) => Ok(*rgba),
            Color::Named(name) => {
                parse_color_name(name).ok_or_else(|| GaugeError::UnknownColor(name.clone()))
            }
        }
    }
}

impl From<Rgba> for Color {
    fn from(rgba: Rgba) -> Self {
        Color::Rgba(rgba)
    }
}

impl From<&str> for Color {
    fn from(name: &str) -> Self {
        Color::named(name)
    }
}

/// Fill for a closed shape. `NoBrush` leaves the shape transparent.
///
/// Serialized as an optional color: `null` means no fill.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Option<Color>", into = "Option<Color>")]
pub enum Brush {
    #[default]
    NoBrush,
    Solid(Color),
}

impl Brush {
    pub fn resolve(&self) -> Result<Option<Rgba>, GaugeError> {
        match self {
            Brush::NoBrush => Ok(None),
            Brush::Solid(color) => color.resolve().map(Some),
        }
    }
}

impl From<Color> for Brush {
    fn from(color: Color) -> Self {
        Brush::Solid(color)
    }
}

impl From<Rgba> for Brush {
    fn from(rgba: Rgba) -> Self {
        Brush::Solid(Color::Rgba(rgba))
    }
}

impl From<&str> for Brush {
    fn from(name: &str) -> Self {
        Brush::Solid(Color::named(name))
    }
}

impl From<Option<Color>> for Brush {
    fn from(color: Option<Color>) -> Self {
        color.map_or(Brush::NoBrush, Brush::Solid)
    }
}

impl From<Brush> for Option<Color> {
    fn from(brush: Brush) -> Self {
        match brush {
            Brush::NoBrush => None,
            Brush::Solid(color) => Some(color),
        }
    }
}

const NAMED_COLORS: &[(&str, Rgba)] = &[
    ("black", Rgba::rgb(0, 0, 0)),
    ("white", Rgba::rgb(255, 255, 255)),
    ("transparent", Rgba::TRANSPARENT),
    ("red", Rgba::rgb(255, 0, 0)),
    ("darkred", Rgba::rgb(139, 0, 0)),
    ("green", Rgba::rgb(0, 128, 0)),
    ("darkgreen", Rgba::rgb(0, 100, 0)),
    ("lime", Rgba::rgb(0, 255, 0)),
    ("blue", Rgba::rgb(0, 0, 255)),
    ("darkblue", Rgba::rgb(0, 0, 139)),
    ("navy", Rgba::rgb(0, 0, 128)),
    ("lightblue", Rgba::rgb(173, 216, 230)),
    ("skyblue", Rgba::rgb(135, 206, 235)),
    ("steelblue", Rgba::rgb(70, 130, 180)),
    ("cyan", Rgba::rgb(0, 255, 255)),
    ("aqua", Rgba::rgb(0, 255, 255)),
    ("darkcyan", Rgba::rgb(0, 139, 139)),
    ("magenta", Rgba::rgb(255, 0, 255)),
    ("fuchsia", Rgba::rgb(255, 0, 255)),
    ("darkmagenta", Rgba::rgb(139, 0, 139)),
    ("yellow", Rgba::rgb(255, 255, 0)),
    ("darkyellow", Rgba::rgb(128, 128, 0)),
    ("olive", Rgba::rgb(128, 128, 0)),
    ("orange", Rgba::rgb(255, 165, 0)),
    ("darkorange", Rgba::rgb(255, 140, 0)),
    ("purple", Rgba::rgb(128, 0, 128)),
    ("pink", Rgba::rgb(255, 192, 203)),
    ("brown", Rgba::rgb(165, 42, 42)),
    ("gold", Rgba::rgb(255, 215, 0)),
    ("silver", Rgba::rgb(192, 192, 192)),
    ("gray", Rgba::rgb(128, 128, 128)),
    ("grey", Rgba::rgb(128, 128, 128)),
    ("darkgray", Rgba::rgb(169, 169, 169)),
    ("darkgrey", Rgba::rgb(169, 169, 169)),
    ("lightgray", Rgba::rgb(211, 211, 211)),
    ("lightgrey", Rgba::rgb(211, 211, 211)),
    ("dimgray", Rgba::rgb(105, 105, 105)),
    ("slategray", Rgba::rgb(112, 128, 144)),
    ("whitesmoke", Rgba::rgb(245, 245, 245)),
    ("teal", Rgba::rgb(0, 128, 128)),
    ("maroon", Rgba::rgb(128, 0, 0)),
];

fn parse_color_name(name: &str) -> Option<Rgba> {
    let name = name.trim();
    if let Some(hex) = name.strip_prefix('#') {
        return parse_hex(hex);
    }
    let key: String = name
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_lowercase())
        .collect();
    NAMED_COLORS
        .iter()
        .find(|(candidate, _)| *candidate == key)
        .map(|(_, rgba)| *rgba)
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 => {
            let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|n| n * 17);
            Some(Rgba::rgb(nibble(0)?, nibble(1)?, nibble(2)?))
        }
        6 => Some(Rgba::rgb(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(Rgba::new(byte(2)?, byte(4)?, byte(6)?, byte(0)?)),
        _ => None,
    }
}

// ============================================================================
// GAUGE CONFIGURATION
// ============================================================================

/// Construction parameters of a gauge.
///
/// Angles are in degrees with 0 pointing right and positive angles turning
/// clockwise on screen. The dial sweeps clockwise from `start_angle` to
/// `end_angle`.
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[serde(default)]
pub struct GaugeConfig {
    #[builder(default = 0.0)]
    pub min_value: f64,
    #[builder(default = 100.0)]
    pub max_value: f64,
    /// Initial value, clamped into range at construction.
    #[builder(default = 50.0)]
    pub value: f64,
    /// Number of major tick intervals.
    #[builder(default = 10)]
    pub steps: u32,
    #[builder(default = -210.0)]
    pub start_angle: f64,
    #[builder(default = 30.0)]
    pub end_angle: f64,

    // Outer circle (bezel)
    #[builder(into, default = Color::named("black"))]
    pub outer_circle_pen_color: Color,
    #[builder(into, default)]
    pub outer_circle_brush_color: Brush,
    #[builder(default = 12)]
    pub outer_circle_thickness: u32,
    /// Translucent half-width arc painted over the bezel after the labels.
    #[builder(into, default = Brush::Solid(Color::rgba(200, 200, 200, 200)))]
    pub bezel_highlight_color: Brush,

    // Inner ring (hub ring around the needle base)
    #[builder(into, default = Color::named("black"))]
    pub inner_ring_pen_color: Color,
    #[builder(into, default = Brush::Solid(Color::named("white")))]
    pub inner_ring_brush_color: Brush,

    // Inner circle (hole in the hub ring, drawn over the needle base)
    #[builder(into, default)]
    pub inner_circle_brush_color: Brush,

    // Numbers
    /// Label text height in pixels for a 200 px widget, scaled with the
    /// shorter widget side. This is a pixel height, not a point size.
    #[builder(default = 10)]
    pub number_font_size: u32,
    #[builder(into, default = "Arial".to_string())]
    pub number_font_family: String,
}

impl Default for GaugeConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl GaugeConfig {
    /// Check the preconditions that keep the value to angle mapping defined.
    pub fn validate(&self) -> Result<(), GaugeError> {
        if !self.min_value.is_finite() || !self.max_value.is_finite() {
            return Err(GaugeError::NonFiniteRange);
        }
        if self.min_value >= self.max_value {
            return Err(GaugeError::InvalidRange {
                min: self.min_value,
                max: self.max_value,
            });
        }
        if self.steps == 0 {
            return Err(GaugeError::InvalidSteps(self.steps));
        }
        if !self.start_angle.is_finite() || !self.end_angle.is_finite() {
            return Err(GaugeError::NonFiniteAngle);
        }
        if self.start_angle == self.end_angle {
            return Err(GaugeError::EmptySweep);
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self, GaugeError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, GaugeError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

/// Configuration colors resolved to concrete values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub outer_circle_pen: Rgba,
    pub outer_circle_brush: Option<Rgba>,
    pub bezel_highlight: Option<Rgba>,
    pub inner_ring_pen: Rgba,
    pub inner_ring_brush: Option<Rgba>,
    pub inner_circle_brush: Option<Rgba>,
}

impl Palette {
    pub fn resolve(config: &GaugeConfig) -> Result<Self, GaugeError> {
        Ok(Self {
            outer_circle_pen: config.outer_circle_pen_color.resolve()?,
            outer_circle_brush: config.outer_circle_brush_color.resolve()?,
            bezel_highlight: config.bezel_highlight_color.resolve()?,
            inner_ring_pen: config.inner_ring_pen_color.resolve()?,
            inner_ring_brush: config.inner_ring_brush_color.resolve()?,
            inner_circle_brush: config.inner_circle_brush_color.resolve()?,
        })
    }
}

/// Fixed look of the dial.
///
/// Lengths are given for a 200 px square widget and scale with the shorter
/// side of the actual widget.
pub mod style {
    use super::Rgba;

    pub const REFERENCE_SIDE: f64 = 200.0;

    pub const TICK_LENGTH: f64 = 10.0;
    pub const TICK_PEN_WIDTH: f64 = 6.0;
    pub const TICK_COLOR: Rgba = Rgba::rgb(0xff, 0x00, 0x00);

    pub const LABEL_INSET: f64 = 25.0;
    /// Label box in the label's rotated frame, top-left corner relative to
    /// the label anchor. Its center sits slightly off the anchor.
    pub const LABEL_BOX_ORIGIN: f64 = -15.0;
    pub const LABEL_BOX: f64 = 34.0;
    pub const LABEL_COLOR: Rgba = Rgba::rgb(0, 150, 255);

    pub const NEEDLE_TIP_INSET: f64 = 20.0;
    pub const NEEDLE_HALF_WIDTH: f64 = 5.0;
    pub const NEEDLE_PEN_WIDTH: f64 = 1.0;
    pub const NEEDLE_COLOR: Rgba = Rgba::rgb(0, 150, 255);

    /// Outer radius of the hub ring over the needle base.
    pub const HUB_RADIUS: f64 = 12.0;
    /// Radius of the hole in the hub ring.
    pub const HOLE_RADIUS: f64 = 5.0;
    pub const INNER_RING_PEN_WIDTH: f64 = 1.0;

    /// Screen-space shadow offset in pixels, not scaled.
    pub const SHADOW_OFFSET: (f64, f64) = (2.0, 2.0);
    pub const SHADOW_COLOR: Rgba = Rgba::new(0, 0, 0, 80);
}
