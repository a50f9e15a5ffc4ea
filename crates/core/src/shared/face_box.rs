/// Axis-aligned face rectangle in frame-pixel coordinates.
///
/// Coordinates are signed so detector output that spills past a frame edge
/// can be represented before clamping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FaceBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl FaceBox {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Builds a box from `[x1, y1, x2, y2]` corners, rounding to whole pixels.
    pub fn from_corners(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        let left = x1.min(x2).round() as i32;
        let top = y1.min(y2).round() as i32;
        let right = x1.max(x2).round() as i32;
        let bottom = y1.max(y2).round() as i32;
        Self::new(left, top, right - left, bottom - top)
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Intersection of this box with a `frame_width` × `frame_height` frame.
    ///
    /// Returns `None` if nothing of the box is visible.
    pub fn clamp_to(&self, frame_width: u32, frame_height: u32) -> Option<FaceBox> {
        let x1 = self.x.max(0);
        let y1 = self.y.max(0);
        let x2 = self.right().min(frame_width as i32);
        let y2 = self.bottom().min(frame_height as i32);
        if x2 <= x1 || y2 <= y1 {
            return None;
        }
        Some(FaceBox::new(x1, y1, x2 - x1, y2 - y1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Corners ──────────────────────────────────────────────────────

    #[test]
    fn test_from_corners_rounds() {
        let b = FaceBox::from_corners(10.4, 20.6, 40.5, 60.2);
        assert_eq!(b, FaceBox::new(10, 21, 31, 39));
    }

    #[test]
    fn test_from_corners_normalizes_order() {
        let b = FaceBox::from_corners(40.0, 60.0, 10.0, 20.0);
        assert_eq!(b, FaceBox::new(10, 20, 30, 40));
    }

    // ── Clamping ─────────────────────────────────────────────────────

    #[test]
    fn test_clamp_inside_is_unchanged() {
        let b = FaceBox::new(10, 20, 30, 40);
        assert_eq!(b.clamp_to(640, 480), Some(b));
    }

    #[test]
    fn test_clamp_trims_edges() {
        let b = FaceBox::new(-10, -5, 50, 50);
        assert_eq!(b.clamp_to(30, 30), Some(FaceBox::new(0, 0, 30, 30)));
    }

    #[test]
    fn test_clamp_outside_is_none() {
        let b = FaceBox::new(700, 10, 50, 50);
        assert_eq!(b.clamp_to(640, 480), None);
    }
}
