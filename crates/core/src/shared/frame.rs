use ndarray::{s, Array3, ArrayView3, ArrayViewMut3, Axis};

use crate::shared::face_box::FaceBox;

/// A single camera capture: contiguous RGB bytes in row-major order.
///
/// Pixel format conversion happens at the capture and display boundaries;
/// the inference loop only ever sees RGB8.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
            index,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    pub fn as_ndarray_mut(&mut self) -> ArrayViewMut3<'_, u8> {
        ArrayViewMut3::from_shape(self.shape(), &mut self.data)
            .expect("Frame data length must match dimensions")
    }

    /// Mirror image of this frame (column `x` becomes `width - 1 - x`).
    pub fn flip_horizontal(&self) -> Frame {
        let flipped = self.as_ndarray().slice(s![.., ..;-1, ..]).to_owned();
        Frame::from_array(flipped, self.index)
    }

    /// Copies the pixels under `face_box`, clamped to the frame bounds.
    ///
    /// Returns `None` when the clamped box is empty.
    pub fn crop(&self, face_box: &FaceBox) -> Option<Frame> {
        let clamped = face_box.clamp_to(self.width, self.height)?;
        let x1 = clamped.x as usize;
        let y1 = clamped.y as usize;
        let x2 = x1 + clamped.width as usize;
        let y2 = y1 + clamped.height as usize;
        let region = self.as_ndarray().slice(s![y1..y2, x1..x2, ..]).to_owned();
        Some(Frame::from_array(region, self.index))
    }

    fn from_array(array: Array3<u8>, index: usize) -> Frame {
        let height = array.len_of(Axis(0)) as u32;
        let width = array.len_of(Axis(1)) as u32;
        let channels = array.len_of(Axis(2)) as u8;
        // to_owned() may keep negative strides, so fall back to logical order.
        let data = if array.is_standard_layout() {
            array.into_raw_vec_and_offset().0
        } else {
            array.iter().copied().collect()
        };
        Frame::new(data, width, height, channels, index)
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.channels as usize,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 3x2 RGB frame where each pixel's red channel encodes its column.
    fn column_coded_frame() -> Frame {
        let mut data = Vec::new();
        for _row in 0..2 {
            for col in 0..3u8 {
                data.extend_from_slice(&[col, 100, 200]);
            }
        }
        Frame::new(data, 3, 2, 3, 7)
    }

    #[test]
    fn test_construction_and_accessors() {
        let data = vec![0u8; 12]; // 2x2x3
        let frame = Frame::new(data.clone(), 2, 2, 3, 5);
        assert_eq!(frame.width(), 2);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.channels(), 3);
        assert_eq!(frame.index(), 5);
        assert_eq!(frame.data(), &data[..]);
    }

    #[test]
    fn test_clone_is_independent() {
        let data = vec![100u8; 12];
        let frame = Frame::new(data, 2, 2, 3, 0);
        let mut cloned = frame.clone();
        cloned.data_mut()[0] = 0;
        assert_eq!(frame.data()[0], 100);
        assert_eq!(cloned.data()[0], 0);
    }

    #[test]
    #[should_panic(expected = "data length must equal width * height * channels")]
    fn test_mismatched_data_length_panics_in_debug() {
        let data = vec![0u8; 10]; // wrong size for 2x2x3
        Frame::new(data, 2, 2, 3, 0);
    }

    #[test]
    fn test_as_ndarray_shape() {
        let data = vec![0u8; 24]; // 2x4x3
        let frame = Frame::new(data, 4, 2, 3, 0);
        assert_eq!(frame.as_ndarray().shape(), &[2, 4, 3]);
    }

    #[test]
    fn test_flip_horizontal_reverses_columns() {
        let frame = column_coded_frame();
        let flipped = frame.flip_horizontal();

        let arr = flipped.as_ndarray();
        for row in 0..2 {
            assert_eq!(arr[[row, 0, 0]], 2);
            assert_eq!(arr[[row, 1, 0]], 1);
            assert_eq!(arr[[row, 2, 0]], 0);
            // Channel order inside a pixel is untouched
            assert_eq!(arr[[row, 0, 1]], 100);
            assert_eq!(arr[[row, 0, 2]], 200);
        }
    }

    #[test]
    fn test_flip_horizontal_keeps_dimensions_and_index() {
        let frame = column_coded_frame();
        let flipped = frame.flip_horizontal();
        assert_eq!(flipped.width(), 3);
        assert_eq!(flipped.height(), 2);
        assert_eq!(flipped.channels(), 3);
        assert_eq!(flipped.index(), 7);
    }

    #[test]
    fn test_flip_twice_is_identity() {
        let frame = column_coded_frame();
        assert_eq!(frame.flip_horizontal().flip_horizontal(), frame);
    }

    #[test]
    fn test_crop_extracts_region() {
        let frame = column_coded_frame();
        let crop = frame.crop(&FaceBox::new(1, 0, 2, 1)).unwrap();
        assert_eq!(crop.width(), 2);
        assert_eq!(crop.height(), 1);
        assert_eq!(crop.data(), &[1, 100, 200, 2, 100, 200]);
    }

    #[test]
    fn test_crop_clamps_to_frame() {
        let frame = column_coded_frame();
        let crop = frame.crop(&FaceBox::new(-5, -5, 7, 100)).unwrap();
        assert_eq!(crop.width(), 2);
        assert_eq!(crop.height(), 2);
    }

    #[test]
    fn test_crop_outside_frame_is_none() {
        let frame = column_coded_frame();
        assert!(frame.crop(&FaceBox::new(10, 10, 5, 5)).is_none());
    }
}
