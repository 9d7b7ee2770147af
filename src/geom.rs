// Plane geometry for hit tests and collisions: points, axis-aligned rects,
// rotated-rect containment and rect-vs-circle overlap.

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Rotate a vector by `angle` radians (screen space, y down).
#[inline]
pub fn rotate(x: f32, y: f32, angle: f32) -> (f32, f32) {
    let (sin, cos) = angle.sin_cos();
    (x * cos - y * sin, x * sin + y * cos)
}

/// Axis-aligned rectangle; `x, y` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    /// Negative sizes from a malformed layout collapse to zero area.
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w: w.max(0.0), h: h.max(0.0) }
    }

    pub fn square(x: f32, y: f32, side: f32) -> Self {
        Self::new(x, y, side, side)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// Strict overlap: touching edges do not count.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right() && self.right() > other.x && self.y < other.bottom() && self.bottom() > other.y
    }

    /// Grow by `margin` on every side.
    pub fn inflate(&self, margin: f32) -> Rect {
        Rect::new(self.x - margin, self.y - margin, self.w + 2.0 * margin, self.h + 2.0 * margin)
    }

    /// Map a global point into this rect's local frame (origin at the center, rotation undone).
    pub fn to_local(&self, p: Point, angle: f32) -> Point {
        let c = self.center();
        let (lx, ly) = rotate(p.x - c.x, p.y - c.y, -angle);
        Point::new(lx, ly)
    }

    /// Inverse of [`Rect::to_local`].
    pub fn to_global(&self, local: Point, angle: f32) -> Point {
        let c = self.center();
        let (gx, gy) = rotate(local.x, local.y, angle);
        Point::new(c.x + gx, c.y + gy)
    }

    /// Point-in-rotated-rectangle: the rect is rotated by `angle` about its center.
    pub fn contains_rotated(&self, p: Point, angle: f32) -> bool {
        let local = self.to_local(p, angle);
        local.x.abs() <= self.w / 2.0 && local.y.abs() <= self.h / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: Point,
    pub radius: f32,
}

impl Circle {
    /// Closest point of `rect` to the center lies within the radius.
    pub fn overlaps_rect(&self, rect: &Rect) -> bool {
        let r = self.radius.max(0.0);
        let cx = self.center.x.clamp(rect.x, rect.right());
        let cy = self.center.y.clamp(rect.y, rect.bottom());
        let dx = cx - self.center.x;
        let dy = cy - self.center.y;
        dx * dx + dy * dy <= r * r
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_4;

    #[test]
    fn negative_sizes_clamp_to_zero() {
        let r = Rect::new(10.0, 10.0, -5.0, -1.0);
        assert_eq!(r.w, 0.0);
        assert_eq!(r.h, 0.0);
    }

    #[test]
    fn overlap_excludes_touching_edges() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.overlaps(&Rect::new(5.0, 5.0, 10.0, 10.0)));
        assert!(!a.overlaps(&Rect::new(10.0, 0.0, 10.0, 10.0)));
    }

    #[test]
    fn rotated_containment_uses_rotation() {
        let r = Rect::new(0.0, 0.0, 100.0, 20.0);
        // Far along the long axis: inside unrotated, outside once turned 45 degrees.
        let p = Point::new(95.0, 10.0);
        assert!(r.contains_rotated(p, 0.0));
        assert!(!r.contains_rotated(p, FRAC_PI_4));
        // Along the rotated long axis it is inside again.
        let (dx, dy) = rotate(40.0, 0.0, FRAC_PI_4);
        assert!(r.contains_rotated(Point::new(50.0 + dx, 10.0 + dy), FRAC_PI_4));
    }

    #[test]
    fn local_global_round_trip() {
        let r = Rect::square(30.0, 40.0, 100.0);
        let g = r.to_global(Point::new(12.0, -7.0), 0.6);
        let l = r.to_local(g, 0.6);
        assert!((l.x - 12.0).abs() < 1e-4);
        assert!((l.y + 7.0).abs() < 1e-4);
    }

    #[test]
    fn zero_radius_circle_needs_center_inside_rect() {
        let c = Circle { center: Point::new(50.0, 50.0), radius: 0.0 };
        assert!(c.overlaps_rect(&Rect::square(0.0, 0.0, 60.0)));
        assert!(!c.overlaps_rect(&Rect::square(0.0, 0.0, 40.0)));
    }
}
