use crate::emotion::domain::frame_annotation::FrameAnnotation;
use crate::shared::face_box::FaceBox;
use crate::shared::frame::Frame;

pub const FACE_BOX_COLOR: [u8; 3] = [255, 0, 0];
pub const FACE_BOX_THICKNESS: u32 = 2;

/// Draw a rectangle border of `thickness` pixels, growing inward.
///
/// Parts of the border outside the frame are clipped, not moved inside.
pub fn draw_face_box(frame: &mut Frame, face_box: &FaceBox, color: [u8; 3], thickness: u32) {
    let width = frame.width() as i32;
    let height = frame.height() as i32;
    let channels = frame.channels() as usize;
    let mut pixels = frame.as_ndarray_mut();

    let mut put = |x: i32, y: i32| {
        if x < 0 || y < 0 || x >= width || y >= height {
            return;
        }
        for (c, value) in color.iter().enumerate().take(channels) {
            pixels[[y as usize, x as usize, c]] = *value;
        }
    };

    for t in 0..thickness as i32 {
        let left = face_box.x + t;
        let top = face_box.y + t;
        let right = face_box.right() - 1 - t;
        let bottom = face_box.bottom() - 1 - t;
        if left > right || top > bottom {
            break;
        }
        for x in left.max(0)..=right.min(width - 1) {
            put(x, top);
            put(x, bottom);
        }
        for y in top.max(0)..=bottom.min(height - 1) {
            put(left, y);
            put(right, y);
        }
    }
}

/// Copy of `frame` with the annotation's face box drawn, if there is one.
pub fn annotate_frame(frame: &Frame, annotation: &FrameAnnotation) -> Frame {
    let mut out = frame.clone();
    if let Some(face_box) = annotation.face_box() {
        draw_face_box(&mut out, &face_box, FACE_BOX_COLOR, FACE_BOX_THICKNESS);
    }
    out
}
