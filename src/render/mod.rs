use crate::{
    config::{self, ArenaConfig},
    genome::{DEFAULT_FLAGELLUM_CURVE, DEFAULT_MOUTH_CURVE},
    types::{BacteriumSnapshot, Rgb, Vec2},
};

pub const BODY_GLYPH: char = 'o';
pub const MOUTH_GLYPH: char = '~';
pub const FLAGELLUM_GLYPH: char = '≈';

const BLANK: Rgb = Rgb::new(0, 0, 0);

/// Draw order. A cell keeps the highest layer written to it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Layer {
    Empty,
    Flagellum,
    Body,
    Mouth,
    Eye,
}

#[derive(Clone, Copy, Debug)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderCell {
    pub ch: char,
    pub layer: Layer,
    pub color: Rgb,
}

#[derive(Debug)]
pub struct FrameBuffer {
    width: u16,
    height: u16,
    cells: Vec<RenderCell>,
}

impl FrameBuffer {
    pub fn new(width: u16, height: u16) -> Self {
        let mut buffer = Self {
            width,
            height,
            cells: Vec::new(),
        };
        buffer.resize(width, height);
        buffer
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        let len = (width as usize).saturating_mul(height as usize);
        if self.cells.len() != len {
            self.cells.resize(
                len,
                RenderCell {
                    ch: ' ',
                    layer: Layer::Empty,
                    color: BLANK,
                },
            );
        }
        self.clear();
    }

    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.ch = ' ';
            cell.layer = Layer::Empty;
            cell.color = BLANK;
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn get(&self, x: u16, y: u16) -> RenderCell {
        debug_assert!(x < self.width && y < self.height, "get() out of bounds");
        let idx = (y as usize) * (self.width as usize) + (x as usize);
        self.cells[idx]
    }

    fn set(&mut self, x: i32, y: i32, ch: char, layer: Layer, color: Rgb) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let idx = (y as usize) * (self.width as usize) + (x as usize);
        let cell = &mut self.cells[idx];
        if layer >= cell.layer {
            cell.ch = ch;
            cell.layer = layer;
            cell.color = color;
        }
    }
}

/// Maps arena coordinates onto viewport cells, each axis scaled on its own.
#[derive(Clone, Copy, Debug)]
struct Projection {
    sx: f64,
    sy: f64,
}

impl Projection {
    fn new(arena: ArenaConfig, viewport: Viewport) -> Self {
        Self {
            sx: viewport.width as f64 / arena.width,
            sy: viewport.height as f64 / arena.height,
        }
    }

    /// Cell coordinates as floats, floored but not yet bounded.
    fn cell_f(&self, p: Vec2) -> Vec2 {
        Vec2::new((p.x * self.sx).floor(), (p.y * self.sy).floor())
    }

    /// Saturating cast; callers bound the result by the frame size.
    fn cell(&self, p: Vec2) -> (i32, i32) {
        let c = self.cell_f(p);
        (c.x as i32, c.y as i32)
    }

    fn arena_point(&self, cx: i32, cy: i32) -> Vec2 {
        Vec2::new((cx as f64 + 0.5) / self.sx, (cy as f64 + 0.5) / self.sy)
    }
}

pub fn draw(
    bacterium: &BacteriumSnapshot,
    arena: ArenaConfig,
    viewport: Viewport,
    frame: &mut FrameBuffer,
) {
    if frame.width() != viewport.width || frame.height() != viewport.height {
        frame.resize(viewport.width, viewport.height);
    } else {
        frame.clear();
    }
    if viewport.width == 0 || viewport.height == 0 {
        return;
    }

    let proj = Projection::new(arena, viewport);
    draw_body(bacterium, proj, frame);
    draw_eye(bacterium, proj, frame);
    draw_mouth(bacterium, proj, frame);
    draw_flagellum(bacterium, proj, frame);
}

fn draw_body(b: &BacteriumSnapshot, proj: Projection, frame: &mut FrameBuffer) {
    let rx = (b.width / 2.0).max(f64::EPSILON);
    let ry = (b.height / 2.0).max(f64::EPSILON);
    let color = b.appearance.body_color;
    let (x0, y0) = proj.cell(Vec2::new(b.pos.x - rx, b.pos.y - ry));
    let (x1, y1) = proj.cell(Vec2::new(b.pos.x + rx, b.pos.y + ry));

    let mut filled = false;
    for cy in y0.max(0)..=y1.min(frame.height() as i32 - 1) {
        for cx in x0.max(0)..=x1.min(frame.width() as i32 - 1) {
            let p = proj.arena_point(cx, cy);
            let nx = (p.x - b.pos.x) / rx;
            let ny = (p.y - b.pos.y) / ry;
            if nx * nx + ny * ny <= 1.0 {
                frame.set(cx, cy, BODY_GLYPH, Layer::Body, color);
                filled = true;
            }
        }
    }
    if !filled {
        let (cx, cy) = proj.cell(b.pos);
        frame.set(cx, cy, BODY_GLYPH, Layer::Body, color);
    }
}

fn draw_eye(b: &BacteriumSnapshot, proj: Projection, frame: &mut FrameBuffer) {
    let look = &b.appearance;
    let dir = b.facing.sign();
    let eye = Vec2::new(
        b.pos.x + dir * look.eye_position.0 * b.width / 2.0 * 0.5,
        b.pos.y - look.eye_position.1 * b.height / 2.0,
    );
    let (cx, cy) = proj.cell(eye);
    let angle = if dir < 0.0 { -look.eye_angle } else { look.eye_angle };
    frame.set(cx, cy, eye_glyph(look.eye_size * proj.sx, angle), Layer::Eye, look.eye_color);
}

/// Small eyes become a dot; larger ones show the tilt of their long axis.
fn eye_glyph(cells_wide: f64, angle_deg: f64) -> char {
    if cells_wide < 1.0 {
        return '•';
    }
    let tilt = angle_deg.rem_euclid(180.0);
    if !(22.5..157.5).contains(&tilt) {
        '-'
    } else if tilt < 67.5 {
        '/'
    } else if tilt < 112.5 {
        '|'
    } else {
        '\\'
    }
}

fn draw_mouth(b: &BacteriumSnapshot, proj: Projection, frame: &mut FrameBuffer) {
    let look = &b.appearance;
    let dir = b.facing.sign();
    let w = b.width;
    let h = b.height;
    let bend = h / 10.0 + (h / 4.0 - h / 10.0) * look.mouth_curve / DEFAULT_MOUTH_CURVE;
    let start = b.pos + Vec2::new(dir * w / 3.0, h / 10.0);
    let control = b.pos + Vec2::new(dir * w / 2.5, bend);
    let end = b.pos + Vec2::new(dir * w / 2.0, h / 10.0);
    let points = sample(|t| quadratic(start, control, end, t));
    draw_polyline(&points, proj, frame, MOUTH_GLYPH, Layer::Mouth, look.mouth_color);
}

fn draw_flagellum(b: &BacteriumSnapshot, proj: Projection, frame: &mut FrameBuffer) {
    let look = &b.appearance;
    let back = -b.facing.sign();
    let w = b.width;
    let h = b.height;
    let length = look.flagellum_length * config::FLAGELLUM_STRETCH;
    let wave = h / 3.0 * look.flagellum_curve / DEFAULT_FLAGELLUM_CURVE;
    let start = b.pos + Vec2::new(back * w / 2.0, 0.0);
    let c1 = b.pos + Vec2::new(back * (w / 2.0 + length / 2.0), -wave);
    let c2 = b.pos + Vec2::new(back * (w / 2.0 + length / 1.5), wave);
    let end = b.pos + Vec2::new(back * (w / 2.0 + length), 0.0);
    let points = sample(|t| cubic(start, c1, c2, end, t));
    draw_polyline(
        &points,
        proj,
        frame,
        FLAGELLUM_GLYPH,
        Layer::Flagellum,
        look.flagellum_color,
    );
}

fn sample(curve: impl Fn(f64) -> Vec2) -> Vec<Vec2> {
    (0..=config::CURVE_SEGMENTS)
        .map(|i| curve(i as f64 / config::CURVE_SEGMENTS as f64))
        .collect()
}

fn quadratic(p0: Vec2, p1: Vec2, p2: Vec2, t: f64) -> Vec2 {
    let u = 1.0 - t;
    u * u * p0 + 2.0 * u * t * p1 + t * t * p2
}

fn cubic(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2, t: f64) -> Vec2 {
    let u = 1.0 - t;
    u * u * u * p0 + 3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t * p3
}

fn draw_polyline(
    points: &[Vec2],
    proj: Projection,
    frame: &mut FrameBuffer,
    ch: char,
    layer: Layer,
    color: Rgb,
) {
    let max_x = frame.width() as f64 - 1.0;
    let max_y = frame.height() as f64 - 1.0;
    for pair in points.windows(2) {
        let Some((a, b)) = clip_segment(proj.cell_f(pair[0]), proj.cell_f(pair[1]), max_x, max_y)
        else {
            continue;
        };
        // Clipped to the frame, so the step count is bounded by its size.
        let steps = (b.x - a.x).abs().max((b.y - a.y).abs()).ceil().max(1.0);
        for s in 0..=steps as u32 {
            let t = s as f64 / steps;
            let p = a * (1.0 - t) + b * t;
            frame.set(p.x.round() as i32, p.y.round() as i32, ch, layer, color);
        }
    }
}

/// Liang-Barsky clip of segment `a`-`b` to `[0, max_x] x [0, max_y]`.
fn clip_segment(a: Vec2, b: Vec2, max_x: f64, max_y: f64) -> Option<(Vec2, Vec2)> {
    if ![a.x, a.y, b.x, b.y].iter().all(|v| v.is_finite()) {
        return None;
    }
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;
    for (p, q) in [(-dx, a.x), (dx, max_x - a.x), (-dy, a.y), (dy, max_y - a.y)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else {
            let r = q / p;
            if p < 0.0 {
                t0 = t0.max(r);
            } else {
                t1 = t1.min(r);
            }
        }
    }
    if t0 > t1 {
        return None;
    }
    let d = Vec2::new(dx, dy);
    Some((a + d * t0, a + d * t1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{genome::Genotype, types::Facing};

    fn arena_80x24() -> ArenaConfig {
        ArenaConfig {
            width: 80.0,
            height: 24.0,
        }
    }

    fn viewport_80x24() -> Viewport {
        Viewport {
            width: 80,
            height: 24,
        }
    }

    fn snapshot(facing: Facing) -> BacteriumSnapshot {
        let genes = Genotype::with_size(10.0);
        BacteriumSnapshot {
            pos: Vec2::new(40.0, 12.0),
            vel: Vec2::ZERO,
            facing,
            width: 13.0,
            height: 10.0,
            appearance: genes.appearance(),
        }
    }

    fn render(facing: Facing) -> FrameBuffer {
        let mut frame = FrameBuffer::new(80, 24);
        draw(&snapshot(facing), arena_80x24(), viewport_80x24(), &mut frame);
        frame
    }

    mod framebuffer {
        use super::*;

        #[test]
        fn creates_with_correct_dimensions() {
            let fb = FrameBuffer::new(80, 24);
            assert_eq!(fb.width(), 80);
            assert_eq!(fb.height(), 24);
        }

        #[test]
        fn resize_changes_dimensions_and_clears() {
            let mut fb = FrameBuffer::new(10, 10);
            fb.set(1, 1, 'x', Layer::Body, BLANK);
            fb.resize(20, 15);
            assert_eq!(fb.width(), 20);
            assert_eq!(fb.height(), 15);
            assert_eq!(fb.get(1, 1).ch, ' ');
        }

        #[test]
        fn higher_layer_wins() {
            let mut fb = FrameBuffer::new(10, 10);
            fb.set(5, 5, 'E', Layer::Eye, BLANK);
            fb.set(5, 5, 'B', Layer::Body, BLANK);
            assert_eq!(fb.get(5, 5).ch, 'E');
        }

        #[test]
        fn equal_layer_overwrites() {
            let mut fb = FrameBuffer::new(10, 10);
            fb.set(5, 5, 'a', Layer::Body, BLANK);
            fb.set(5, 5, 'b', Layer::Body, BLANK);
            assert_eq!(fb.get(5, 5).ch, 'b');
        }

        #[test]
        fn out_of_bounds_is_ignored() {
            let mut fb = FrameBuffer::new(10, 10);
            fb.set(100, 100, 'X', Layer::Body, BLANK);
            fb.set(-1, 3, 'X', Layer::Body, BLANK);
        }
    }

    mod curves {
        use super::*;

        #[test]
        fn quadratic_hits_endpoints() {
            let (a, b, c) = (Vec2::new(0.0, 0.0), Vec2::new(5.0, 5.0), Vec2::new(10.0, 0.0));
            assert_eq!(quadratic(a, b, c, 0.0), a);
            assert_eq!(quadratic(a, b, c, 1.0), c);
            assert_eq!(quadratic(a, b, c, 0.5), Vec2::new(5.0, 2.5));
        }

        #[test]
        fn cubic_hits_endpoints() {
            let p = [
                Vec2::new(0.0, 0.0),
                Vec2::new(1.0, 3.0),
                Vec2::new(2.0, -3.0),
                Vec2::new(3.0, 0.0),
            ];
            assert_eq!(cubic(p[0], p[1], p[2], p[3], 0.0), p[0]);
            assert_eq!(cubic(p[0], p[1], p[2], p[3], 1.0), p[3]);
        }

        #[test]
        fn sample_includes_both_ends() {
            let points = sample(|t| Vec2::new(t, 0.0));
            assert_eq!(points.len(), config::CURVE_SEGMENTS + 1);
            assert_eq!(points[0].x, 0.0);
            assert_eq!(points[config::CURVE_SEGMENTS].x, 1.0);
        }
    }

    mod clip_segment_fn {
        use super::*;

        #[test]
        fn inside_segment_is_unchanged() {
            let (a, b) = (Vec2::new(1.0, 1.0), Vec2::new(5.0, 3.0));
            assert_eq!(clip_segment(a, b, 10.0, 10.0), Some((a, b)));
        }

        #[test]
        fn crossing_segment_is_cut_at_edge() {
            let clipped = clip_segment(Vec2::new(5.0, 2.0), Vec2::new(-15.0, 2.0), 10.0, 10.0);
            assert_eq!(clipped, Some((Vec2::new(5.0, 2.0), Vec2::new(0.0, 2.0))));
        }

        #[test]
        fn outside_segment_is_rejected() {
            assert_eq!(
                clip_segment(Vec2::new(-5.0, 2.0), Vec2::new(-1.0, 8.0), 10.0, 10.0),
                None
            );
            assert_eq!(
                clip_segment(Vec2::new(2.0, 20.0), Vec2::new(8.0, 20.0), 10.0, 10.0),
                None
            );
        }

        #[test]
        fn non_finite_points_are_rejected() {
            let a = Vec2::new(f64::NEG_INFINITY, 2.0);
            assert_eq!(clip_segment(a, Vec2::new(1.0, 1.0), 10.0, 10.0), None);
        }
    }

    mod eye_glyph_fn {
        use super::*;

        #[test]
        fn tiny_eye_is_a_dot() {
            assert_eq!(eye_glyph(0.5, 30.0), '•');
        }

        #[test]
        fn tilt_picks_stroke() {
            assert_eq!(eye_glyph(2.0, 0.0), '-');
            assert_eq!(eye_glyph(2.0, 30.0), '/');
            assert_eq!(eye_glyph(2.0, 90.0), '|');
            assert_eq!(eye_glyph(2.0, 135.0), '\\');
            assert_eq!(eye_glyph(2.0, -30.0), '\\');
            assert_eq!(eye_glyph(2.0, 180.0), '-');
        }
    }

    mod draw_fn {
        use super::*;

        #[test]
        fn body_fills_center() {
            let frame = render(Facing::Right);
            let cell = frame.get(40, 12);
            assert_eq!(cell.ch, BODY_GLYPH);
            assert_eq!(cell.color, Rgb::new(173, 216, 230));
        }

        #[test]
        fn far_corner_stays_blank() {
            let frame = render(Facing::Right);
            assert_eq!(frame.get(0, 0).ch, ' ');
            assert_eq!(frame.get(79, 23).layer, Layer::Empty);
        }

        #[test]
        fn facing_right_puts_features_forward_and_tail_behind() {
            let frame = render(Facing::Right);
            assert_eq!(frame.get(42, 10).layer, Layer::Eye);
            assert_eq!(frame.get(46, 13).ch, MOUTH_GLYPH);
            assert_eq!(frame.get(21, 12).ch, FLAGELLUM_GLYPH);
        }

        #[test]
        fn facing_left_mirrors_features() {
            let frame = render(Facing::Left);
            assert_eq!(frame.get(37, 10).layer, Layer::Eye);
            assert_eq!(frame.get(33, 13).ch, MOUTH_GLYPH);
            assert_eq!(frame.get(58, 12).ch, FLAGELLUM_GLYPH);
            assert_ne!(frame.get(21, 12).ch, FLAGELLUM_GLYPH);
        }

        #[test]
        fn scales_arena_onto_viewport() {
            let mut frame = FrameBuffer::new(80, 24);
            let snap = BacteriumSnapshot {
                pos: Vec2::new(400.0, 300.0),
                width: 130.0,
                height: 100.0,
                appearance: Genotype::with_size(100.0).appearance(),
                ..snapshot(Facing::Right)
            };
            draw(&snap, ArenaConfig::default(), viewport_80x24(), &mut frame);
            assert_eq!(frame.get(40, 12).ch, BODY_GLYPH);
        }

        #[test]
        fn huge_flagellum_is_clipped_to_frame() {
            let genes = Genotype {
                size: Some(10.0),
                flagellum_length: Some(1.0e12),
                ..Genotype::default()
            };
            let snap = BacteriumSnapshot {
                appearance: genes.appearance(),
                ..snapshot(Facing::Right)
            };
            let mut frame = FrameBuffer::new(80, 24);
            draw(&snap, arena_80x24(), viewport_80x24(), &mut frame);
            assert!((0..24).any(|y| frame.get(0, y).ch == FLAGELLUM_GLYPH));
            assert_eq!(frame.get(40, 12).ch, BODY_GLYPH);
        }

        #[test]
        fn huge_body_fills_visible_frame() {
            let snap = BacteriumSnapshot {
                width: 1.3e13,
                height: 1.0e13,
                appearance: Genotype::with_size(1.0e13).appearance(),
                ..snapshot(Facing::Right)
            };
            let mut frame = FrameBuffer::new(80, 24);
            draw(&snap, arena_80x24(), viewport_80x24(), &mut frame);
            assert_eq!(frame.get(0, 0).ch, BODY_GLYPH);
            assert_eq!(frame.get(79, 23).ch, BODY_GLYPH);
        }

        #[test]
        fn zero_viewport_draws_nothing() {
            let mut frame = FrameBuffer::new(0, 0);
            let viewport = Viewport {
                width: 0,
                height: 0,
            };
            draw(&snapshot(Facing::Right), arena_80x24(), viewport, &mut frame);
            assert_eq!(frame.width(), 0);
        }
    }
}
