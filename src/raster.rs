//! Software painter over an RGBA8 frame buffer.

use rusttype::{point, Font, PositionedGlyph, Scale};

use crate::config::Rgba;
use crate::geometry::{normalize_angle, Point, Rect};
use crate::scene::{Painter, Pen, TextRun};

pub struct Canvas<'a> {
    frame: &'a mut [u8],
    width: usize,
    height: usize,
    antialias: bool,
    font: Option<&'a Font<'static>>,
}

impl<'a> Canvas<'a> {
    /// `frame` holds `width * height` RGBA pixels, row by row.
    pub fn new(
        frame: &'a mut [u8],
        width: usize,
        height: usize,
        font: Option<&'a Font<'static>>,
    ) -> Self {
        debug_assert!(frame.len() >= width * height * 4);
        Self {
            frame,
            width,
            height,
            antialias: true,
            font,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn clear(&mut self, color: Rgba) {
        for chunk in self.frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&[color.r, color.g, color.b, 0xff]);
        }
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y * self.width + x) * 4;
        let px = &self.frame[idx..idx + 4];
        Some(Rgba::new(px[0], px[1], px[2], px[3]))
    }

    fn coverage(&self, aa: f64) -> f32 {
        if self.antialias {
            aa.clamp(0.0, 1.0) as f32
        } else if aa >= 0.5 {
            1.0
        } else {
            0.0
        }
    }

    fn set_pixel(&mut self, x: i32, y: i32, color: Rgba, coverage: f32) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let a = coverage * color.alpha();
        if a <= 0.0 {
            return;
        }
        let idx = (y as usize * self.width + x as usize) * 4;
        let src = [color.r as f32, color.g as f32, color.b as f32];
        let out = [
            (src[0] * a + self.frame[idx] as f32 * (1.0 - a)).round() as u8,
            (src[1] * a + self.frame[idx + 1] as f32 * (1.0 - a)).round() as u8,
            (src[2] * a + self.frame[idx + 2] as f32 * (1.0 - a)).round() as u8,
            0xff,
        ];
        self.frame[idx..idx + 4].copy_from_slice(&out);
    }

    /// Integer pixel range covering `[min, max]`, clipped to the canvas.
    fn span_x(&self, min: f64, max: f64) -> std::ops::Range<i32> {
        (min.floor().max(0.0) as i32)..(max.ceil().min(self.width as f64) as i32 + 1)
    }

    fn span_y(&self, min: f64, max: f64) -> std::ops::Range<i32> {
        (min.floor().max(0.0) as i32)..(max.ceil().min(self.height as f64) as i32 + 1)
    }

    fn stroke_segment(&mut self, from: Point, to: Point, pen: &Pen) {
        let half = pen.width / 2.0;
        let pad = half + 1.0;
        let (dx, dy) = (to.x - from.x, to.y - from.y);
        let len_sq = dx * dx + dy * dy;
        for y in self.span_y(from.y.min(to.y) - pad, from.y.max(to.y) + pad) {
            for x in self.span_x(from.x.min(to.x) - pad, from.x.max(to.x) + pad) {
                let (px, py) = (x as f64 + 0.5, y as f64 + 0.5);
                let t = if len_sq > 0.0 {
                    (((px - from.x) * dx + (py - from.y) * dy) / len_sq).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let dist = (from.x + t * dx - px).hypot(from.y + t * dy - py);
                let aa = 1.0 - (dist - half).clamp(0.0, 1.0);
                if aa > 0.01 {
                    let coverage = self.coverage(aa);
                    self.set_pixel(x, y, pen.color, coverage);
                }
            }
        }
    }

    fn draw_antialiased_point(&mut self, x: f64, y: f64, color: Rgba, alpha: f32) {
        let x_floor = x.floor() as i32;
        let y_floor = y.floor() as i32;
        let x_frac = x - x_floor as f64;
        let y_frac = y - y_floor as f64;

        // Spread over the four nearest pixels.
        let samples = [
            (x_floor, y_floor, (1.0 - x_frac) * (1.0 - y_frac)),
            (x_floor + 1, y_floor, x_frac * (1.0 - y_frac)),
            (x_floor, y_floor + 1, (1.0 - x_frac) * y_frac),
            (x_floor + 1, y_floor + 1, x_frac * y_frac),
        ];
        for (px, py, weight) in samples {
            let a = alpha * weight as f32;
            if a > 0.001 {
                self.set_pixel(px, py, color, a);
            }
        }
    }
}

fn point_in_polygon(points: &[Point], x: f64, y: f64) -> bool {
    let mut inside = false;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let (a, b) = (points[i], points[j]);
        if (a.y > y) != (b.y > y) && x < (b.x - a.x) * (y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq > 0.0 {
        (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    (a.x + t * dx - p.x).hypot(a.y + t * dy - p.y)
}

impl Painter for Canvas<'_> {
    fn set_antialiasing(&mut self, enabled: bool) {
        self.antialias = enabled;
    }

    /// Circular arcs only: the radius is half the shorter side of `rect`.
    fn draw_arc(
        &mut self,
        rect: Rect,
        start_angle: f64,
        span: f64,
        pen: Option<&Pen>,
        brush: Option<Rgba>,
    ) {
        let center = rect.center();
        let r = rect.width.min(rect.height) / 2.0;
        let full = span >= 360.0;
        let start = normalize_angle(start_angle);

        if let Some(brush) = brush {
            // Chord region: inside the circle and beyond the chord line,
            // which sits at r*cos(span/2) along the arc's mid direction.
            let mid = (start + span / 2.0).to_radians();
            let (mx, my) = (mid.cos(), mid.sin());
            let chord = r * (span / 2.0).to_radians().cos();
            for y in self.span_y(center.y - r - 1.0, center.y + r + 1.0) {
                for x in self.span_x(center.x - r - 1.0, center.x + r + 1.0) {
                    let (dx, dy) = (x as f64 + 0.5 - center.x, y as f64 + 0.5 - center.y);
                    let mut aa = (r - dx.hypot(dy) + 0.5).clamp(0.0, 1.0);
                    if !full {
                        aa = aa.min((dx * mx + dy * my - chord + 0.5).clamp(0.0, 1.0));
                    }
                    if aa > 0.0 {
                        let coverage = self.coverage(aa);
                        self.set_pixel(x, y, brush, coverage);
                    }
                }
            }
        }

        if let Some(pen) = pen {
            let half = pen.width / 2.0;
            let reach = r + half + 1.0;
            for y in self.span_y(center.y - reach, center.y + reach) {
                for x in self.span_x(center.x - reach, center.x + reach) {
                    let (dx, dy) = (x as f64 + 0.5 - center.x, y as f64 + 0.5 - center.y);
                    if !full {
                        let angle = normalize_angle(dy.atan2(dx).to_degrees() - start);
                        if angle > span {
                            continue;
                        }
                    }
                    let aa = 1.0 - ((dx.hypot(dy) - r).abs() - half).clamp(0.0, 1.0);
                    if aa > 0.01 {
                        let coverage = self.coverage(aa);
                        self.set_pixel(x, y, pen.color, coverage);
                    }
                }
            }
        }
    }

    fn draw_line(&mut self, from: Point, to: Point, pen: &Pen) {
        self.stroke_segment(from, to, pen);
    }

    fn fill_polygon(&mut self, points: &[Point], pen: Option<&Pen>, brush: Rgba) {
        if points.len() < 3 {
            return;
        }
        let min_x = points.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
        let max_x = points.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
        let min_y = points.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
        let max_y = points.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);

        for y in self.span_y(min_y - 1.0, max_y + 1.0) {
            for x in self.span_x(min_x - 1.0, max_x + 1.0) {
                let p = Point::new(x as f64 + 0.5, y as f64 + 0.5);
                let edge = (0..points.len())
                    .map(|i| distance_to_segment(p, points[i], points[(i + 1) % points.len()]))
                    .fold(f64::INFINITY, f64::min);
                let aa = if point_in_polygon(points, p.x, p.y) {
                    (0.5 + edge).min(1.0)
                } else {
                    (0.5 - edge).max(0.0)
                };
                if aa > 0.0 {
                    let coverage = self.coverage(aa);
                    self.set_pixel(x, y, brush, coverage);
                }
            }
        }

        if let Some(pen) = pen {
            for i in 0..points.len() {
                self.stroke_segment(points[i], points[(i + 1) % points.len()], pen);
            }
        }
    }

    fn draw_text(&mut self, text: &TextRun) {
        let Some(font) = self.font else {
            return;
        };
        let scale = Scale::uniform(text.font_size as f32);
        let v_metrics = font.v_metrics(scale);
        let glyphs: Vec<PositionedGlyph> = font
            .layout(&text.text, scale, point(0.0, v_metrics.ascent))
            .collect();

        let Some((min_x, max_x, min_y, max_y)) = glyphs
            .iter()
            .filter_map(|g| g.pixel_bounding_box())
            .map(|bb| (bb.min.x, bb.max.x, bb.min.y, bb.max.y))
            .reduce(|a, b| (a.0.min(b.0), a.1.max(b.1), a.2.min(b.2), a.3.max(b.3)))
        else {
            return;
        };
        let text_cx = (min_x + max_x) as f64 / 2.0;
        let text_cy = (min_y + max_y) as f64 / 2.0;

        let rotation = text.rotation.to_radians();
        let (cos_r, sin_r) = (rotation.cos(), rotation.sin());
        let center = text.box_center();
        let color = text.color;

        for glyph in &glyphs {
            if let Some(bb) = glyph.pixel_bounding_box() {
                glyph.draw(|gx, gy, v| {
                    if v > 0.001 {
                        let local_x = gx as f64 + bb.min.x as f64 + 0.5 - text_cx;
                        let local_y = gy as f64 + bb.min.y as f64 + 0.5 - text_cy;
                        let x = center.x + local_x * cos_r - local_y * sin_r;
                        let y = center.y + local_x * sin_r + local_y * cos_r;
                        self.draw_antialiased_point(x - 0.5, y - 0.5, color, v);
                    }
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn white_frame(width: usize, height: usize) -> Vec<u8> {
        vec![0xff; width * height * 4]
    }

    #[test]
    fn test_clear_and_read_back() {
        let mut frame = white_frame(4, 3);
        let mut canvas = Canvas::new(&mut frame, 4, 3, None);
        canvas.clear(Rgba::rgb(10, 20, 30));
        assert_eq!(canvas.pixel(3, 2), Some(Rgba::rgb(10, 20, 30)));
        assert_eq!(canvas.pixel(4, 0), None);
    }

    #[test]
    fn test_line_covers_its_pixels() {
        let mut frame = white_frame(40, 20);
        let mut canvas = Canvas::new(&mut frame, 40, 20, None);
        canvas.draw_line(
            Point::new(10.0, 10.0),
            Point::new(30.0, 10.0),
            &Pen::new(Rgba::BLACK, 4.0),
        );
        assert_eq!(canvas.pixel(20, 10), Some(Rgba::BLACK));
        assert_eq!(canvas.pixel(20, 2), Some(Rgba::WHITE));
    }

    #[test]
    fn test_translucent_color_blends() {
        let mut frame = white_frame(10, 10);
        let mut canvas = Canvas::new(&mut frame, 10, 10, None);
        canvas.fill_polygon(
            &[
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(10.0, 10.0),
                Point::new(0.0, 10.0),
            ],
            None,
            Rgba::new(0, 0, 0, 0x80),
        );
        let px = canvas.pixel(5, 5).unwrap();
        assert!(px.r > 100 && px.r < 150, "{px:?}");
    }

    #[test]
    fn test_polygon_fills_inside_only() {
        let mut frame = white_frame(50, 50);
        let mut canvas = Canvas::new(&mut frame, 50, 50, None);
        let red = Rgba::rgb(0xff, 0, 0);
        canvas.fill_polygon(
            &[
                Point::new(10.0, 10.0),
                Point::new(40.0, 25.0),
                Point::new(10.0, 40.0),
            ],
            None,
            red,
        );
        assert_eq!(canvas.pixel(15, 25), Some(red));
        assert_eq!(canvas.pixel(45, 25), Some(Rgba::WHITE));
        assert_eq!(canvas.pixel(35, 12), Some(Rgba::WHITE));
    }

    #[test]
    fn test_arc_stroke_respects_sweep() {
        let mut frame = white_frame(100, 100);
        let mut canvas = Canvas::new(&mut frame, 100, 100, None);
        // Upper half only: 180 degrees (left) clockwise through 270 (up) to 0 (right).
        canvas.draw_arc(
            Rect::around(Point::new(50.0, 50.0), 40.0),
            180.0,
            180.0,
            Some(&Pen::new(Rgba::BLACK, 4.0)),
            None,
        );
        assert_eq!(canvas.pixel(50, 10), Some(Rgba::BLACK));
        assert_eq!(canvas.pixel(50, 89), Some(Rgba::WHITE));
        assert_eq!(canvas.pixel(50, 50), Some(Rgba::WHITE));
    }

    #[test]
    fn test_full_circle_brush_fills_disc() {
        let mut frame = white_frame(60, 60);
        let mut canvas = Canvas::new(&mut frame, 60, 60, None);
        let blue = Rgba::rgb(0, 0, 0xff);
        canvas.draw_arc(
            Rect::around(Point::new(30.0, 30.0), 20.0),
            0.0,
            360.0,
            None,
            Some(blue),
        );
        assert_eq!(canvas.pixel(30, 30), Some(blue));
        assert_eq!(canvas.pixel(30, 45), Some(blue));
        assert_eq!(canvas.pixel(2, 2), Some(Rgba::WHITE));
    }

    #[test]
    fn test_chord_brush_stops_at_chord() {
        let mut frame = white_frame(100, 100);
        let mut canvas = Canvas::new(&mut frame, 100, 100, None);
        let blue = Rgba::rgb(0, 0, 0xff);
        canvas.draw_arc(
            Rect::around(Point::new(50.0, 50.0), 40.0),
            180.0,
            180.0,
            None,
            Some(blue),
        );
        assert_eq!(canvas.pixel(50, 30), Some(blue));
        assert_eq!(canvas.pixel(50, 70), Some(Rgba::WHITE));
    }

    #[test]
    fn test_antialiasing_off_gives_hard_edges() {
        let mut frame = white_frame(40, 40);
        let mut canvas = Canvas::new(&mut frame, 40, 40, None);
        canvas.set_antialiasing(false);
        canvas.draw_arc(
            Rect::around(Point::new(20.0, 20.0), 12.3),
            0.0,
            360.0,
            None,
            Some(Rgba::BLACK),
        );
        for y in 0..40 {
            for x in 0..40 {
                let px = canvas.pixel(x, y).unwrap();
                assert!(px == Rgba::BLACK || px == Rgba::WHITE, "({x}, {y}) = {px:?}");
            }
        }
    }

    #[test]
    fn test_text_without_font_is_skipped() {
        let mut frame = white_frame(20, 20);
        let mut canvas = Canvas::new(&mut frame, 20, 20, None);
        canvas.draw_text(&TextRun {
            anchor: Point::new(10.0, 10.0),
            rotation: 0.0,
            bounds: Rect::around(Point::new(0.0, 0.0), 5.0),
            text: "42".to_string(),
            font_family: "Arial".to_string(),
            font_size: 10.0,
            color: Rgba::BLACK,
        });
        assert!(frame.iter().all(|b| *b == 0xff));
    }

    #[test]
    fn test_zero_sized_canvas_draws_nothing() {
        let mut frame: Vec<u8> = Vec::new();
        let mut canvas = Canvas::new(&mut frame, 0, 0, None);
        canvas.draw_line(
            Point::new(-5.0, -5.0),
            Point::new(5.0, 5.0),
            &Pen::new(Rgba::BLACK, 3.0),
        );
        canvas.draw_arc(
            Rect::around(Point::new(0.0, 0.0), 0.0),
            0.0,
            360.0,
            Some(&Pen::new(Rgba::BLACK, 1.0)),
            Some(Rgba::BLACK),
        );
    }
}
