//! Dial geometry.
//!
//! Pure functions from configuration, value and widget size to pixel
//! coordinates. Screen space has y growing downward, so an angle `a` in
//! degrees maps to the direction `(cos a, sin a)`: 0° points right, 90°
//! points down and increasing angles turn clockwise. Ticks, needle and arcs
//! all use this convention.

use crate::config::{style, GaugeConfig};
use crate::error::GaugeError;

/// Reduce any angle in degrees to `[0, 360)`.
pub fn normalize_angle(angle: f64) -> f64 {
    let normalized = angle.rem_euclid(360.0);
    // rem_euclid rounds tiny negative inputs up to exactly 360
    if normalized >= 360.0 {
        0.0
    } else {
        normalized
    }
}

/// Clockwise angular distance from `start` to `end`, in `(0, 360]`.
///
/// Returns 0 only when both angles are equal; any other difference that is a
/// whole number of turns is a full circle.
pub fn sweep_span(start: f64, end: f64) -> f64 {
    let raw = end - start;
    let span = normalize_angle(raw);
    if span == 0.0 && raw != 0.0 {
        360.0
    } else {
        span
    }
}

// ============================================================================
// POINTS AND RECTANGLES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// The point at `radius` from `self` in the direction of `angle` degrees.
    pub fn polar(self, radius: f64, angle: f64) -> Self {
        let rad = angle.to_radians();
        Self {
            x: self.x + radius * rad.cos(),
            y: self.y + radius * rad.sin(),
        }
    }

    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Axis-aligned rectangle, origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Square bounding a circle of `radius` around `center`.
    pub fn around(center: Point, radius: f64) -> Self {
        Self {
            x: center.x - radius,
            y: center.y - radius,
            width: 2.0 * radius,
            height: 2.0 * radius,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn contains(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.x + other.width <= self.x + self.width
            && other.y + other.height <= self.y + self.height
    }
}

// ============================================================================
// SWEEP
// ============================================================================

/// The arc the needle travels along: a start angle and a positive clockwise
/// span.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sweep {
    pub start: f64,
    pub span: f64,
}

impl Sweep {
    pub fn new(start: f64, end: f64) -> Result<Self, GaugeError> {
        if !start.is_finite() || !end.is_finite() {
            return Err(GaugeError::NonFiniteAngle);
        }
        let span = sweep_span(start, end);
        if span <= 0.0 {
            return Err(GaugeError::EmptySweep);
        }
        Ok(Self { start, span })
    }

    /// Angle at `fraction` of the sweep, not normalized.
    pub fn angle_at(&self, fraction: f64) -> f64 {
        self.start + self.span * fraction
    }

    pub fn end(&self) -> f64 {
        self.start + self.span
    }
}

// ============================================================================
// LAYOUT
// ============================================================================

/// Size-derived coordinates of every drawn element for one paint pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub width: u32,
    pub height: u32,
    pub center: Point,
    /// Shorter widget side divided by the reference side.
    pub scale: f64,

    /// Centerline radius of the bezel stroke.
    pub radius_outer: f64,
    pub outer_thickness: f64,
    pub outer_rect: Rect,

    /// Outer radius of the hub ring around the needle base.
    pub radius_inner: f64,
    pub inner_rect: Rect,
    /// Radius of the hole in the hub ring.
    pub hole_radius: f64,

    pub tick_length: f64,
    pub tick_width: f64,
    pub label_radius: f64,
    /// Label box in the label's rotated frame, relative to its anchor.
    pub label_bounds: Rect,
    pub font_size: f64,

    pub needle_length: f64,
    pub needle_half_width: f64,
}

impl Layout {
    /// True when the widget has no drawable area.
    pub fn is_degenerate(&self) -> bool {
        self.radius_outer <= 0.0
    }
}

pub fn compute_layout(config: &GaugeConfig, width: u32, height: u32) -> Layout {
    let side = width.min(height) as f64;
    let scale = side / style::REFERENCE_SIDE;
    let center = Point::new(width as f64 / 2.0, height as f64 / 2.0);

    let outer_thickness = config.outer_circle_thickness as f64 * scale;
    let radius_outer = (side / 2.0 - outer_thickness).max(0.0);
    let radius_inner = (style::HUB_RADIUS * scale).min(radius_outer);
    let label_origin = style::LABEL_BOX_ORIGIN * scale;

    Layout {
        width,
        height,
        center,
        scale,
        radius_outer,
        outer_thickness,
        outer_rect: Rect::around(center, radius_outer),
        radius_inner,
        inner_rect: Rect::around(center, radius_inner),
        hole_radius: (style::HOLE_RADIUS * scale).min(radius_inner),
        tick_length: (style::TICK_LENGTH * scale).min(radius_outer),
        tick_width: style::TICK_PEN_WIDTH * scale,
        label_radius: (radius_outer - style::LABEL_INSET * scale).max(0.0),
        label_bounds: Rect {
            x: label_origin,
            y: label_origin,
            width: style::LABEL_BOX * scale,
            height: style::LABEL_BOX * scale,
        },
        font_size: config.number_font_size as f64 * scale,
        needle_length: (radius_outer - style::NEEDLE_TIP_INSET * scale).max(0.0),
        needle_half_width: style::NEEDLE_HALF_WIDTH * scale,
    }
}

// ============================================================================
// TICKS
// ============================================================================

/// One major tick with its numeric label.
#[derive(Debug, Clone, PartialEq)]
pub struct TickMark {
    pub index: u32,
    /// Normalized angle in `[0, 360)`.
    pub angle: f64,
    pub value: f64,
    /// End of the tick towards the center.
    pub inner: Point,
    /// End of the tick on the bezel centerline.
    pub outer: Point,
    /// Origin of the label's rotated frame, see [`Layout::label_bounds`].
    pub label_anchor: Point,
    /// Text rotation in degrees so labels read along the dial.
    pub label_rotation: f64,
    pub label: String,
}

/// Ticks for `i` in `0..=steps`, first at `min_value` and last at `max_value`.
pub fn compute_ticks(config: &GaugeConfig, sweep: &Sweep, layout: &Layout) -> Vec<TickMark> {
    let steps = config.steps.max(1);
    let range = config.max_value - config.min_value;
    (0..=steps)
        .map(|i| {
            let fraction = i as f64 / steps as f64;
            let angle = normalize_angle(sweep.angle_at(fraction));
            let value = if i == steps {
                config.max_value
            } else {
                config.min_value + range * fraction
            };
            TickMark {
                index: i,
                angle,
                value,
                inner: layout
                    .center
                    .polar(layout.radius_outer - layout.tick_length, angle),
                outer: layout.center.polar(layout.radius_outer, angle),
                label_anchor: layout.center.polar(layout.label_radius, angle),
                label_rotation: normalize_angle(angle + 90.0),
                label: format!("{value:.0}"),
            }
        })
        .collect()
}

// ============================================================================
// NEEDLE
// ============================================================================

/// Needle triangle and its shadow, both in screen coordinates.
///
/// Points run base, tip, base.
#[derive(Debug, Clone, PartialEq)]
pub struct Needle {
    pub angle: f64,
    pub body: Vec<Point>,
    pub shadow: Vec<Point>,
}

impl Needle {
    pub fn tip(&self) -> Point {
        self.body[1]
    }
}

pub fn compute_needle(layout: &Layout, angle: f64) -> Needle {
    let center = layout.center;
    let rad = angle.to_radians();
    let (nx, ny) = (-rad.sin(), rad.cos());
    let half = layout.needle_half_width;

    let body = vec![
        center.offset(-nx * half, -ny * half),
        center.polar(layout.needle_length, angle),
        center.offset(nx * half, ny * half),
    ];
    let (dx, dy) = style::SHADOW_OFFSET;
    let shadow = body.iter().map(|p| p.offset(dx, dy)).collect();

    Needle {
        angle,
        body,
        shadow,
    }
}
