use crate::config::{style, Palette, Rgba};
use crate::geometry::{normalize_angle, Layout, Needle, Point, Rect, Sweep, TickMark};

// ============================================================================
// DRAW PHASES
// ============================================================================

/// Layers of a gauge, back to front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DrawPhase {
    OuterCircle,
    InnerRing,
    TickLines,
    TickLabels,
    BezelHighlight,
    NeedleShadow,
    Needle,
    InnerCircle,
}

impl DrawPhase {
    pub const ORDER: [DrawPhase; 8] = [
        DrawPhase::OuterCircle,
        DrawPhase::InnerRing,
        DrawPhase::TickLines,
        DrawPhase::TickLabels,
        DrawPhase::BezelHighlight,
        DrawPhase::NeedleShadow,
        DrawPhase::Needle,
        DrawPhase::InnerCircle,
    ];
}

// ============================================================================
// DRAW COMMANDS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pen {
    pub color: Rgba,
    pub width: f64,
}

impl Pen {
    pub const fn new(color: Rgba, width: f64) -> Self {
        Self { color, width }
    }
}

/// Text centered in a box given in a frame rotated by `rotation` degrees
/// about `anchor`.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub anchor: Point,
    pub rotation: f64,
    /// Box in the rotated frame, relative to `anchor`.
    pub bounds: Rect,
    pub text: String,
    pub font_family: String,
    pub font_size: f64,
    pub color: Rgba,
}

impl TextRun {
    /// Screen position of the box center, where the text is centered.
    pub fn box_center(&self) -> Point {
        let local = self.bounds.center();
        let rad = self.rotation.to_radians();
        let (cos_r, sin_r) = (rad.cos(), rad.sin());
        self.anchor.offset(
            local.x * cos_r - local.y * sin_r,
            local.x * sin_r + local.y * cos_r,
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Elliptical arc inscribed in `rect`, from `start_angle` clockwise over
    /// `span` degrees. A brush fills the region closed by the chord; a span of
    /// 360 is a full ellipse.
    Arc {
        rect: Rect,
        start_angle: f64,
        span: f64,
        pen: Option<Pen>,
        brush: Option<Rgba>,
    },
    Line {
        from: Point,
        to: Point,
        pen: Pen,
    },
    Polygon {
        points: Vec<Point>,
        pen: Option<Pen>,
        brush: Rgba,
    },
    Text(TextRun),
}

/// Rendering capability supplied by the host.
pub trait Painter {
    fn set_antialiasing(&mut self, enabled: bool);
    fn draw_arc(
        &mut self,
        rect: Rect,
        start_angle: f64,
        span: f64,
        pen: Option<&Pen>,
        brush: Option<Rgba>,
    );
    fn draw_line(&mut self, from: Point, to: Point, pen: &Pen);
    fn fill_polygon(&mut self, points: &[Point], pen: Option<&Pen>, brush: Rgba);
    fn draw_text(&mut self, text: &TextRun);
}

// ============================================================================
// SCENE
// ============================================================================

/// Draw commands for one paint pass, kept in phase order.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub antialias: bool,
    entries: Vec<(DrawPhase, DrawCommand)>,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            antialias: true,
            entries: Vec::new(),
        }
    }

    /// Add a command after every command of the same or an earlier phase.
    ///
    /// Entries stay sorted by phase whatever the insertion order, and keep
    /// insertion order within a phase.
    pub fn add_command(&mut self, phase: DrawPhase, command: DrawCommand) {
        let at = self.entries.partition_point(|(p, _)| *p <= phase);
        self.entries.insert(at, (phase, command));
    }

    pub fn entries(&self) -> &[(DrawPhase, DrawCommand)] {
        &self.entries
    }

    pub fn commands(&self) -> impl Iterator<Item = &DrawCommand> {
        self.entries.iter().map(|(_, command)| command)
    }

    pub fn phase_commands(&self, phase: DrawPhase) -> impl Iterator<Item = &DrawCommand> {
        self.entries
            .iter()
            .filter(move |(p, _)| *p == phase)
            .map(|(_, command)| command)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn replay<P: Painter + ?Sized>(&self, painter: &mut P) {
        painter.set_antialiasing(self.antialias);
        for command in self.commands() {
            match command {
                DrawCommand::Arc {
                    rect,
                    start_angle,
                    span,
                    pen,
                    brush,
                } => painter.draw_arc(*rect, *start_angle, *span, pen.as_ref(), *brush),
                DrawCommand::Line { from, to, pen } => painter.draw_line(*from, *to, pen),
                DrawCommand::Polygon { points, pen, brush } => {
                    painter.fill_polygon(points, pen.as_ref(), *brush)
                }
                DrawCommand::Text(text) => painter.draw_text(text),
            }
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// RENDER
// ============================================================================

fn circle(center: Point, radius: f64, pen: Option<Pen>, brush: Option<Rgba>) -> DrawCommand {
    DrawCommand::Arc {
        rect: Rect::around(center, radius),
        start_angle: 0.0,
        span: 360.0,
        pen,
        brush,
    }
}

/// Build the draw commands for a computed layout, tick set and needle.
///
/// A degenerate layout yields an empty scene.
pub fn render(
    palette: &Palette,
    sweep: &Sweep,
    font_family: &str,
    layout: &Layout,
    ticks: &[TickMark],
    needle: &Needle,
) -> Scene {
    let mut scene = Scene::new();
    if layout.is_degenerate() {
        return scene;
    }
    let start_angle = normalize_angle(sweep.start);

    scene.add_command(
        DrawPhase::OuterCircle,
        DrawCommand::Arc {
            rect: layout.outer_rect,
            start_angle,
            span: sweep.span,
            pen: Some(Pen::new(palette.outer_circle_pen, layout.outer_thickness)),
            brush: palette.outer_circle_brush,
        },
    );

    scene.add_command(
        DrawPhase::InnerRing,
        circle(
            layout.center,
            layout.radius_inner,
            Some(Pen::new(palette.inner_ring_pen, style::INNER_RING_PEN_WIDTH)),
            palette.inner_ring_brush,
        ),
    );

    let tick_pen = Pen::new(style::TICK_COLOR, layout.tick_width);
    for tick in ticks {
        scene.add_command(
            DrawPhase::TickLines,
            DrawCommand::Line {
                from: tick.inner,
                to: tick.outer,
                pen: tick_pen,
            },
        );
    }

    for tick in ticks {
        scene.add_command(
            DrawPhase::TickLabels,
            DrawCommand::Text(TextRun {
                anchor: tick.label_anchor,
                rotation: tick.label_rotation,
                bounds: layout.label_bounds,
                text: tick.label.clone(),
                font_family: font_family.to_string(),
                font_size: layout.font_size,
                color: style::LABEL_COLOR,
            }),
        );
    }

    if let Some(highlight) = palette.bezel_highlight {
        scene.add_command(
            DrawPhase::BezelHighlight,
            DrawCommand::Arc {
                rect: layout.outer_rect,
                start_angle,
                span: sweep.span,
                pen: Some(Pen::new(highlight, layout.outer_thickness / 2.0)),
                brush: None,
            },
        );
    }

    scene.add_command(
        DrawPhase::NeedleShadow,
        DrawCommand::Polygon {
            points: needle.shadow.clone(),
            pen: None,
            brush: style::SHADOW_COLOR,
        },
    );
    // Hub ring shadow: the annulus between the hole and the ring edge,
    // stroked along its middle.
    let (dx, dy) = style::SHADOW_OFFSET;
    scene.add_command(
        DrawPhase::NeedleShadow,
        circle(
            layout.center.offset(dx, dy),
            (layout.radius_inner + layout.hole_radius) / 2.0,
            Some(Pen::new(
                style::SHADOW_COLOR,
                layout.radius_inner - layout.hole_radius,
            )),
            None,
        ),
    );

    scene.add_command(
        DrawPhase::Needle,
        DrawCommand::Polygon {
            points: needle.body.clone(),
            pen: Some(Pen::new(style::NEEDLE_COLOR, style::NEEDLE_PEN_WIDTH)),
            brush: style::NEEDLE_COLOR,
        },
    );

    if let Some(brush) = palette.inner_circle_brush {
        scene.add_command(
            DrawPhase::InnerCircle,
            circle(layout.center, layout.hole_radius, None, Some(brush)),
        );
    }

    scene
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GaugeConfig, Rgba};
    use crate::geometry::{compute_layout, compute_needle, compute_ticks};
    use pretty_assertions::assert_eq;

    fn build(config: &GaugeConfig, width: u32, height: u32) -> Scene {
        let palette = Palette::resolve(config).unwrap();
        let sweep = Sweep::new(config.start_angle, config.end_angle).unwrap();
        let layout = compute_layout(config, width, height);
        let ticks = compute_ticks(config, &sweep, &layout);
        let needle = compute_needle(&layout, sweep.angle_at(0.5));
        render(&palette, &sweep, &config.number_font_family, &layout, &ticks, &needle)
    }

    #[derive(Default)]
    struct Recorder {
        antialias_calls: Vec<bool>,
        calls: Vec<&'static str>,
    }

    impl Painter for Recorder {
        fn set_antialiasing(&mut self, enabled: bool) {
            self.antialias_calls.push(enabled);
        }
        fn draw_arc(&mut self, _: Rect, _: f64, _: f64, _: Option<&Pen>, _: Option<Rgba>) {
            self.calls.push("arc");
        }
        fn draw_line(&mut self, _: Point, _: Point, _: &Pen) {
            self.calls.push("line");
        }
        fn fill_polygon(&mut self, _: &[Point], _: Option<&Pen>, _: Rgba) {
            self.calls.push("polygon");
        }
        fn draw_text(&mut self, _: &TextRun) {
            self.calls.push("text");
        }
    }

    #[test]
    fn test_phases_are_in_layer_order() {
        let config = GaugeConfig::builder().inner_circle_brush_color("white").build();
        let scene = build(&config, 200, 200);
        let phases: Vec<DrawPhase> = scene.entries().iter().map(|(p, _)| *p).collect();
        assert!(phases.windows(2).all(|w| w[0] <= w[1]));

        let mut distinct = phases.clone();
        distinct.dedup();
        assert_eq!(distinct, DrawPhase::ORDER.to_vec());
    }

    #[test]
    fn test_default_scene_contents() {
        let config = GaugeConfig::default();
        let scene = build(&config, 200, 200);

        assert_eq!(scene.phase_commands(DrawPhase::TickLines).count(), 11);
        assert_eq!(scene.phase_commands(DrawPhase::TickLabels).count(), 11);
        // No inner-circle brush: the hub ring has no filled hole.
        assert_eq!(scene.phase_commands(DrawPhase::InnerCircle).count(), 0);
        assert_eq!(scene.phase_commands(DrawPhase::NeedleShadow).count(), 2);

        let outer = scene.phase_commands(DrawPhase::OuterCircle).next().unwrap();
        assert_eq!(
            *outer,
            DrawCommand::Arc {
                rect: Rect::around(Point::new(100.0, 100.0), 88.0),
                start_angle: 150.0,
                span: 240.0,
                pen: Some(Pen::new(Rgba::BLACK, 12.0)),
                brush: None,
            }
        );
    }

    #[test]
    fn test_default_scene_has_hub_ring_and_shadow() {
        let scene = build(&GaugeConfig::default(), 200, 200);

        let ring: Vec<&DrawCommand> = scene.phase_commands(DrawPhase::InnerRing).collect();
        assert_eq!(
            ring,
            vec![&DrawCommand::Arc {
                rect: Rect::around(Point::new(100.0, 100.0), 12.0),
                start_angle: 0.0,
                span: 360.0,
                pen: Some(Pen::new(Rgba::BLACK, 1.0)),
                brush: Some(Rgba::WHITE),
            }]
        );

        let ring_shadow = scene.phase_commands(DrawPhase::NeedleShadow).nth(1).unwrap();
        assert_eq!(
            *ring_shadow,
            DrawCommand::Arc {
                rect: Rect::around(Point::new(102.0, 102.0), 8.5),
                start_angle: 0.0,
                span: 360.0,
                pen: Some(Pen::new(style::SHADOW_COLOR, 7.0)),
                brush: None,
            }
        );
    }

    #[test]
    fn test_inner_circle_fills_the_hole() {
        let config = GaugeConfig::builder().inner_circle_brush_color("white").build();
        let scene = build(&config, 400, 400);
        let hole: Vec<&DrawCommand> = scene.phase_commands(DrawPhase::InnerCircle).collect();
        assert_eq!(
            hole,
            vec![&DrawCommand::Arc {
                rect: Rect::around(Point::new(200.0, 200.0), 10.0),
                start_angle: 0.0,
                span: 360.0,
                pen: None,
                brush: Some(Rgba::WHITE),
            }]
        );
        assert_eq!(scene.entries().last().map(|(p, _)| *p), Some(DrawPhase::InnerCircle));
    }

    #[test]
    fn test_commands_added_out_of_order_replay_by_phase() {
        let pen = Pen::new(Rgba::BLACK, 1.0);
        let mut scene = Scene::new();
        scene.add_command(
            DrawPhase::InnerCircle,
            circle(Point::new(5.0, 5.0), 1.0, None, Some(Rgba::WHITE)),
        );
        scene.add_command(
            DrawPhase::Needle,
            DrawCommand::Polygon {
                points: vec![Point::new(0.0, 0.0), Point::new(4.0, 0.0), Point::new(0.0, 4.0)],
                pen: None,
                brush: Rgba::BLACK,
            },
        );
        scene.add_command(
            DrawPhase::TickLines,
            DrawCommand::Line {
                from: Point::new(0.0, 0.0),
                to: Point::new(1.0, 1.0),
                pen,
            },
        );
        scene.add_command(
            DrawPhase::TickLines,
            DrawCommand::Line {
                from: Point::new(2.0, 2.0),
                to: Point::new(3.0, 3.0),
                pen,
            },
        );

        let phases: Vec<DrawPhase> = scene.entries().iter().map(|(p, _)| *p).collect();
        assert_eq!(
            phases,
            vec![
                DrawPhase::TickLines,
                DrawPhase::TickLines,
                DrawPhase::Needle,
                DrawPhase::InnerCircle,
            ]
        );
        assert!(matches!(
            scene.entries()[0].1,
            DrawCommand::Line { from, .. } if from == Point::new(0.0, 0.0)
        ));

        let mut recorder = Recorder::default();
        scene.replay(&mut recorder);
        assert_eq!(recorder.calls, vec!["line", "line", "polygon", "arc"]);
    }

    #[test]
    fn test_label_box_center_turns_with_the_label() {
        let scene = build(&GaugeConfig::default(), 200, 200);
        let mut text = scene
            .phase_commands(DrawPhase::TickLabels)
            .find_map(|c| match c {
                DrawCommand::Text(text) => Some(text.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(text.bounds.center(), Point::new(2.0, 2.0));

        text.anchor = Point::new(50.0, 50.0);
        text.rotation = 0.0;
        assert_eq!(text.box_center(), Point::new(52.0, 52.0));

        text.rotation = 90.0;
        let turned = text.box_center();
        assert!((turned.x - 48.0).abs() < 1e-9 && (turned.y - 52.0).abs() < 1e-9);
    }

    #[test]
    fn test_labels_carry_font_and_text() {
        let config = GaugeConfig::builder()
            .number_font_family("Courier")
            .number_font_size(14)
            .build();
        let scene = build(&config, 400, 400);
        let labels: Vec<&TextRun> = scene
            .phase_commands(DrawPhase::TickLabels)
            .filter_map(|c| match c {
                DrawCommand::Text(text) => Some(text),
                _ => None,
            })
            .collect();
        assert_eq!(labels.first().unwrap().text, "0");
        assert_eq!(labels.last().unwrap().text, "100");
        assert!(labels.iter().all(|t| t.font_family == "Courier" && t.font_size == 28.0));
    }

    #[test]
    fn test_degenerate_layout_renders_nothing() {
        let config = GaugeConfig::default();
        assert!(build(&config, 0, 0).is_empty());
        assert!(build(&config, 640, 0).is_empty());
    }

    #[test]
    fn test_replay_sets_antialiasing_once_and_keeps_order() {
        let config = GaugeConfig::builder()
            .steps(2)
            .inner_circle_brush_color("white")
            .build();
        let scene = build(&config, 200, 200);
        let mut recorder = Recorder::default();
        scene.replay(&mut recorder);

        assert_eq!(recorder.antialias_calls, vec![true]);
        assert_eq!(
            recorder.calls,
            vec![
                "arc", "arc", "line", "line", "line", "text", "text", "text", "arc", "polygon",
                "arc", "polygon", "arc",
            ]
        );
    }
}
