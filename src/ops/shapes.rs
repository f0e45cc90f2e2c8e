use image::{Rgba, RgbaImage};
use rayon::prelude::*;

/// Shape instruments drawn from the drag origin to the current pointer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Line,
    Rectangle,
    Ellipse,
}

/// Pen + optional brush used to paint a primitive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShapeStyle {
    pub stroke: Rgba<u8>,
    pub width: f32,
    /// Interior color for rectangles and ellipses; ignored for lines.
    pub fill: Option<Rgba<u8>>,
    pub anti_alias: bool,
}

impl ShapeStyle {
    pub fn stroke(stroke: Rgba<u8>, width: f32) -> Self {
        Self {
            stroke,
            width,
            fill: None,
            anti_alias: false,
        }
    }

    pub fn with_fill(mut self, fill: Option<Rgba<u8>>) -> Self {
        self.fill = fill;
        self
    }
}

/// Axis-aligned rectangle with non-negative extents.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundsRect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl BoundsRect {
    /// Rectangle spanned by two corners given in any order.
    ///
    /// The signed deltas are normalized so `w`/`h` are never negative and the
    /// anchor moves to the top-left corner.
    pub fn from_corners(a: (f32, f32), b: (f32, f32)) -> Self {
        let (x0, x1) = if a.0 <= b.0 { (a.0, b.0) } else { (b.0, a.0) };
        let (y0, y1) = if a.1 <= b.1 { (a.1, b.1) } else { (b.1, a.1) };
        Self {
            x: x0,
            y: y0,
            w: x1 - x0,
            h: y1 - y0,
        }
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.w * 0.5, self.y + self.h * 0.5)
    }
}

// ============================================================================
// SDF functions — return signed distance (negative = inside)
// ============================================================================

/// SDF for a box centred at origin with half-extents (hx, hy).
#[inline]
fn sdf_box(px: f32, py: f32, hx: f32, hy: f32) -> f32 {
    let dx = px.abs() - hx;
    let dy = py.abs() - hy;
    let outside = (dx.max(0.0) * dx.max(0.0) + dy.max(0.0) * dy.max(0.0)).sqrt();
    let inside = dx.max(dy).min(0.0);
    outside + inside
}

/// SDF for an ellipse (approximation).
#[inline]
fn sdf_ellipse(px: f32, py: f32, rx: f32, ry: f32) -> f32 {
    // A flat ellipse degenerates into the segment it spans.
    if rx < 0.5 || ry < 0.5 {
        return sdf_box(px, py, rx, ry);
    }
    let nx = px / rx;
    let ny = py / ry;
    let len = (nx * nx + ny * ny).sqrt();
    if len < 1e-8 {
        return -rx.min(ry);
    }
    let scale = (rx * rx * ny * ny + ry * ry * nx * nx).sqrt() / (rx * ry * len);
    (len - 1.0) / scale
}

/// Unsigned distance from a point to segment a→b.
#[inline]
fn sdf_line_segment(px: f32, py: f32, ax: f32, ay: f32, bx: f32, by: f32) -> f32 {
    let dx = bx - ax;
    let dy = by - ay;
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq < 1e-12 {
        0.0
    } else {
        (((px - ax) * dx + (py - ay) * dy) / len_sq).clamp(0.0, 1.0)
    };
    let cx = ax + t * dx;
    let cy = ay + t * dy;
    ((px - cx) * (px - cx) + (py - cy) * (py - cy)).sqrt()
}

/// Geometry handed to the rasterizer.
#[derive(Clone, Copy, Debug)]
enum Primitive {
    Segment { a: (f32, f32), b: (f32, f32) },
    Rect(BoundsRect),
    Ellipse(BoundsRect),
}

impl Primitive {
    /// Signed distance for closed shapes, unsigned for segments.
    fn distance(&self, px: f32, py: f32) -> f32 {
        match *self {
            Primitive::Segment { a, b } => sdf_line_segment(px, py, a.0, a.1, b.0, b.1),
            Primitive::Rect(r) => {
                let (cx, cy) = r.center();
                sdf_box(px - cx, py - cy, r.w * 0.5, r.h * 0.5)
            }
            Primitive::Ellipse(r) => {
                let (cx, cy) = r.center();
                sdf_ellipse(px - cx, py - cy, r.w * 0.5, r.h * 0.5)
            }
        }
    }

    fn is_closed(&self) -> bool {
        !matches!(self, Primitive::Segment { .. })
    }

    fn bounds(&self) -> (f32, f32, f32, f32) {
        match *self {
            Primitive::Segment { a, b } => (a.0.min(b.0), a.1.min(b.1), a.0.max(b.0), a.1.max(b.1)),
            Primitive::Rect(r) | Primitive::Ellipse(r) => (r.x, r.y, r.x + r.w, r.y + r.h),
        }
    }
}

// ============================================================================
// PUBLIC DRAWING ENTRY POINTS
// ============================================================================

/// Stamp a single round dot of `style.width` at `p`.
pub fn draw_point(image: &mut RgbaImage, p: (f32, f32), style: &ShapeStyle) {
    rasterize(image, Primitive::Segment { a: p, b: p }, style);
}

/// Round-capped segment; consecutive segments sharing endpoints join without gaps.
pub fn draw_line(image: &mut RgbaImage, a: (f32, f32), b: (f32, f32), style: &ShapeStyle) {
    rasterize(image, Primitive::Segment { a, b }, style);
}

pub fn draw_rect(image: &mut RgbaImage, rect: BoundsRect, style: &ShapeStyle) {
    rasterize(image, Primitive::Rect(rect), style);
}

pub fn draw_ellipse(image: &mut RgbaImage, rect: BoundsRect, style: &ShapeStyle) {
    rasterize(image, Primitive::Ellipse(rect), style);
}

/// Draw `kind` spanning `origin` → `current`.
pub fn draw_shape(
    image: &mut RgbaImage,
    kind: ShapeKind,
    origin: (f32, f32),
    current: (f32, f32),
    style: &ShapeStyle,
) {
    match kind {
        ShapeKind::Line => draw_line(image, origin, current, style),
        ShapeKind::Rectangle => draw_rect(image, BoundsRect::from_corners(origin, current), style),
        ShapeKind::Ellipse => {
            draw_ellipse(image, BoundsRect::from_corners(origin, current), style)
        }
    }
}

/// Rasterize one primitive into `image` inside its padded bounding box.
///
/// Pixels are sampled at integer coordinates. Outline coverage is
/// `|d| < width/2`; closed shapes with a fill also cover `d < 0`, with the
/// outline painted on top.
fn rasterize(image: &mut RgbaImage, primitive: Primitive, style: &ShapeStyle) {
    let (canvas_w, canvas_h) = image.dimensions();
    if canvas_w == 0 || canvas_h == 0 {
        return;
    }
    let half = (style.width * 0.5).max(0.5);
    let fill = if primitive.is_closed() { style.fill } else { None };
    let aa = style.anti_alias;

    let (min_x, min_y, max_x, max_y) = primitive.bounds();
    let pad = half + 2.0;
    let x0 = ((min_x - pad).floor() as i64).max(0);
    let y0 = ((min_y - pad).floor() as i64).max(0);
    let x1 = ((max_x + pad).ceil() as i64).min(canvas_w as i64 - 1);
    let y1 = ((max_y + pad).ceil() as i64).min(canvas_h as i64 - 1);
    if x0 > x1 || y0 > y1 {
        return;
    }

    let row_bytes = canvas_w as usize * 4;
    let stroke = style.stroke;
    let raw: &mut [u8] = &mut **image;

    raw.par_chunks_mut(row_bytes)
        .enumerate()
        .skip(y0 as usize)
        .take((y1 - y0 + 1) as usize)
        .for_each(|(row, row_buf)| {
            let py = row as f32;
            for col in x0 as usize..=x1 as usize {
                let px = col as f32;
                let d = primitive.distance(px, py);

                let outline_cov = coverage(d.abs() - half, aa);
                let fill_cov = match fill {
                    Some(_) => coverage(d, aa),
                    None => 0.0,
                };

                let idx = col * 4;
                let dst = &mut row_buf[idx..idx + 4];
                if let Some(fill_color) = fill
                    && fill_cov > 0.001
                {
                    blend_over(dst, fill_color, fill_cov);
                }
                if outline_cov > 0.001 {
                    blend_over(dst, stroke, outline_cov);
                }
            }
        });
}

/// Coverage for a band value (negative = inside), hard-edged unless `aa`.
#[inline]
fn coverage(band: f32, aa: bool) -> f32 {
    if aa {
        smoothstep(0.5, -0.5, band)
    } else if band < 0.0 {
        1.0
    } else {
        0.0
    }
}

/// Source-over blend of `color` scaled by `coverage` into an RGBA pixel.
#[inline]
fn blend_over(dst: &mut [u8], color: Rgba<u8>, coverage: f32) {
    let sa = color[3] as f32 / 255.0 * coverage;
    if sa >= 0.999 {
        dst.copy_from_slice(&color.0);
        return;
    }
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        dst.copy_from_slice(&[0, 0, 0, 0]);
        return;
    }
    for c in 0..3 {
        let s = color[c] as f32;
        let d = dst[c] as f32;
        dst[c] = ((s * sa + d * da * (1.0 - sa)) / out_a).round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
}

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    fn blank(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_pixel(w, h, WHITE)
    }

    #[test]
    fn negative_drag_normalizes_rect() {
        let r = BoundsRect::from_corners((50.0, 30.0), (10.0, 10.0));
        assert_eq!(r, BoundsRect { x: 10.0, y: 10.0, w: 40.0, h: 20.0 });
    }

    #[test]
    fn unfilled_rect_is_outline_only() {
        let mut img = blank(64, 48);
        let style = ShapeStyle::stroke(BLACK, 3.0);
        draw_shape(&mut img, ShapeKind::Rectangle, (10.0, 10.0), (50.0, 30.0), &style);

        // Edges and corners carry the pen.
        assert_eq!(*img.get_pixel(10, 20), BLACK);
        assert_eq!(*img.get_pixel(50, 20), BLACK);
        assert_eq!(*img.get_pixel(30, 10), BLACK);
        assert_eq!(*img.get_pixel(30, 30), BLACK);
        assert_eq!(*img.get_pixel(10, 10), BLACK);
        // Interior and exterior untouched.
        assert_eq!(*img.get_pixel(30, 20), WHITE);
        assert_eq!(*img.get_pixel(5, 5), WHITE);
        assert_eq!(*img.get_pixel(55, 20), WHITE);
    }

    #[test]
    fn filled_rect_paints_interior() {
        let mut img = blank(64, 48);
        let style = ShapeStyle::stroke(BLACK, 3.0).with_fill(Some(RED));
        draw_shape(&mut img, ShapeKind::Rectangle, (10.0, 10.0), (50.0, 30.0), &style);

        assert_eq!(*img.get_pixel(10, 20), BLACK);
        assert_eq!(*img.get_pixel(30, 20), RED);
        assert_eq!(*img.get_pixel(13, 13), RED);
        assert_eq!(*img.get_pixel(5, 5), WHITE);
    }

    #[test]
    fn line_ignores_fill() {
        let mut img = blank(32, 32);
        let style = ShapeStyle::stroke(BLACK, 1.0).with_fill(Some(RED));
        draw_shape(&mut img, ShapeKind::Line, (0.0, 0.0), (20.0, 20.0), &style);
        assert_eq!(*img.get_pixel(10, 10), BLACK);
        assert_eq!(*img.get_pixel(15, 5), WHITE);
    }

    #[test]
    fn ellipse_outline_touches_box_edges_not_corners() {
        let mut img = blank(64, 64);
        let style = ShapeStyle::stroke(BLACK, 3.0);
        draw_shape(&mut img, ShapeKind::Ellipse, (10.0, 10.0), (50.0, 30.0), &style);
        assert_eq!(*img.get_pixel(10, 20), BLACK);
        assert_eq!(*img.get_pixel(30, 10), BLACK);
        assert_eq!(*img.get_pixel(10, 10), WHITE);
        assert_eq!(*img.get_pixel(30, 20), WHITE);
    }

    #[test]
    fn flat_ellipse_degenerates_to_line() {
        let mut img = blank(32, 32);
        let style = ShapeStyle::stroke(BLACK, 1.0);
        draw_shape(&mut img, ShapeKind::Ellipse, (2.0, 10.0), (20.0, 10.0), &style);
        assert_eq!(*img.get_pixel(11, 10), BLACK);
        assert_eq!(*img.get_pixel(11, 12), WHITE);
    }

    #[test]
    fn point_stamps_round_dot() {
        let mut img = blank(16, 16);
        draw_point(&mut img, (8.0, 8.0), &ShapeStyle::stroke(BLACK, 3.0));
        assert_eq!(*img.get_pixel(8, 8), BLACK);
        assert_eq!(*img.get_pixel(9, 9), BLACK);
        assert_eq!(*img.get_pixel(10, 8), WHITE);
    }

    #[test]
    fn drawing_outside_canvas_is_clipped() {
        let mut img = blank(8, 8);
        let before = img.clone();
        draw_line(&mut img, (-40.0, -40.0), (-20.0, -30.0), &ShapeStyle::stroke(BLACK, 3.0));
        assert_eq!(img, before);
        draw_line(&mut img, (-10.0, 4.0), (100.0, 4.0), &ShapeStyle::stroke(BLACK, 1.0));
        assert_eq!(*img.get_pixel(0, 4), BLACK);
        assert_eq!(*img.get_pixel(7, 4), BLACK);
    }

    #[test]
    fn anti_aliased_edges_blend() {
        let mut img = blank(16, 16);
        let mut style = ShapeStyle::stroke(BLACK, 2.0);
        style.anti_alias = true;
        draw_line(&mut img, (0.0, 8.0), (15.0, 8.0), &style);
        let edge = *img.get_pixel(8, 9);
        assert!(edge[0] > 0 && edge[0] < 255, "edge pixel {:?}", edge);
        assert_eq!(*img.get_pixel(8, 8), BLACK);
    }
}
