//! Conversion of fetched planes to displayable grayscale images.

use crate::plane_stack::{normalise_min_max, PlaneStack};
use image::{GrayImage, Luma};

impl PlaneStack {
    /// Converts every plane to an 8-bit grayscale image.
    ///
    /// Pixels are min/max normalised over the whole stack and scaled to `0..=255`. Axis 0 of a
    /// plane becomes the image rows, so each image is `height` pixels wide and `width` tall.
    pub fn to_gray_images(&self) -> Vec<GrayImage> {
        let mut stack = self.to_float(crate::plane_stack::Normalisation::None);
        normalise_min_max(&mut stack);

        let [rows, cols, planes] = self.shape();
        (0..planes)
            .map(|k| {
                GrayImage::from_fn(cols as u32, rows as u32, |x, y| {
                    let v = stack[[y as usize, x as usize, k]] * 255.0;
                    Luma([v.round().clamp(0.0, 255.0) as u8])
                })
            })
            .collect()
    }
}
