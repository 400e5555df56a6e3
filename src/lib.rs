// ============================================================================
// CRATE CONFIGURATION & IMPORTS
// ============================================================================

pub mod config;
pub mod error;
pub mod font;
pub mod geometry;
pub mod raster;
pub mod scene;
pub mod window;

use tracing::{debug, trace, warn};

pub use config::{Brush, Color, GaugeConfig, Palette, Rgba};
pub use error::GaugeError;
pub use geometry::{normalize_angle, Layout, Needle, Point, Rect, Sweep, TickMark};
pub use scene::{DrawCommand, DrawPhase, Painter, Pen, Scene, TextRun};
pub use window::{GaugeCommand, WindowOptions};

// ============================================================================
// PUBLIC API - MAIN INTERFACE
// ============================================================================

/// Observable lifecycle of a gauge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GaugePhase {
    /// Constructed, not painted yet.
    Configured,
    /// Painted at least once.
    Live,
}

/// An analog circular gauge: configuration plus the current value.
///
/// The value is always inside `[min_value, max_value]`. Changing it only
/// raises a redraw request; drawing happens in [`Gauge::paint`].
#[derive(Debug, Clone)]
pub struct Gauge {
    config: GaugeConfig,
    palette: Palette,
    sweep: Sweep,
    value: f64,
    phase: GaugePhase,
    redraw_requested: bool,
}

impl Gauge {
    pub fn new(config: GaugeConfig) -> Result<Self, GaugeError> {
        config.validate()?;
        let palette = Palette::resolve(&config)?;
        let sweep = Sweep::new(config.start_angle, config.end_angle)?;

        let value = if config.value.is_nan() {
            let midpoint = (config.min_value + config.max_value) / 2.0;
            warn!(midpoint, "initial value is NaN, starting at the midpoint");
            midpoint
        } else {
            config.value.clamp(config.min_value, config.max_value)
        };

        debug!(
            min = config.min_value,
            max = config.max_value,
            steps = config.steps,
            start = sweep.start,
            span = sweep.span,
            value,
            "gauge configured"
        );

        Ok(Self {
            config,
            palette,
            sweep,
            value,
            phase: GaugePhase::Configured,
            redraw_requested: true,
        })
    }

    pub fn config(&self) -> &GaugeConfig {
        &self.config
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn sweep(&self) -> Sweep {
        self.sweep
    }

    pub fn phase(&self) -> GaugePhase {
        self.phase
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Set the value, saturating at the range bounds. NaN is ignored.
    pub fn set_value(&mut self, value: f64) {
        if value.is_nan() {
            warn!("ignoring NaN gauge value");
            return;
        }
        let clamped = value.clamp(self.config.min_value, self.config.max_value);
        trace!(requested = value, clamped, "set value");
        self.value = clamped;
        self.redraw_requested = true;
    }

    pub fn normalize_angle(&self, angle: f64) -> f64 {
        normalize_angle(angle)
    }

    /// Needle angle for the current value, not normalized.
    pub fn current_angle(&self) -> f64 {
        self.angle_for_value(self.value)
    }

    /// Needle angle `value` would have, after clamping.
    pub fn angle_for_value(&self, value: f64) -> f64 {
        let (min, max) = (self.config.min_value, self.config.max_value);
        let fraction = (value.clamp(min, max) - min) / (max - min);
        self.sweep.angle_at(fraction)
    }

    pub fn request_redraw(&mut self) {
        self.redraw_requested = true;
    }

    pub fn redraw_requested(&self) -> bool {
        self.redraw_requested
    }

    /// Return and clear the pending redraw request.
    pub fn take_redraw_request(&mut self) -> bool {
        std::mem::take(&mut self.redraw_requested)
    }

    // ------------------------------------------------------------------------
    // Geometry
    // ------------------------------------------------------------------------

    pub fn layout(&self, width: u32, height: u32) -> Layout {
        geometry::compute_layout(&self.config, width, height)
    }

    pub fn ticks(&self, layout: &Layout) -> Vec<TickMark> {
        geometry::compute_ticks(&self.config, &self.sweep, layout)
    }

    pub fn needle(&self, layout: &Layout) -> Needle {
        geometry::compute_needle(layout, self.current_angle())
    }

    /// All draw commands for a widget of the given size at the current value.
    pub fn scene(&self, width: u32, height: u32) -> Scene {
        let layout = self.layout(width, height);
        if layout.is_degenerate() {
            debug!(width, height, "degenerate gauge size, nothing to draw");
        }
        let ticks = self.ticks(&layout);
        let needle = self.needle(&layout);
        scene::render(
            &self.palette,
            &self.sweep,
            &self.config.number_font_family,
            &layout,
            &ticks,
            &needle,
        )
    }

    /// Run one paint pass on `painter` and mark the gauge live.
    pub fn paint<P: Painter + ?Sized>(&mut self, width: u32, height: u32, painter: &mut P) {
        let scene = self.scene(width, height);
        trace!(width, height, commands = scene.len(), "paint");
        scene.replay(painter);
        self.phase = GaugePhase::Live;
        self.redraw_requested = false;
    }
}
