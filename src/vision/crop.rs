use image::imageops::{self, FilterType};
use image::DynamicImage;

use crate::camera::VideoFrame;

use super::FaceBox;

/// Normalized grayscale classifier input: a square of pixel intensities
/// scaled to [0, 1], row-major.
pub struct FaceCrop {
    pixels: Vec<f32>,
    size: u32,
}

impl FaceCrop {
    pub fn pixels(&self) -> &[f32] {
        &self.pixels
    }

    pub fn size(&self) -> u32 {
        self.size
    }
}

/// Cut the face region out of the frame and normalize it for inference:
/// resize to `size`x`size`, grayscale, scale intensities to [0, 1].
/// `face` must already be clipped to the frame bounds.
pub fn prepare_face_crop(frame: &VideoFrame, face: &FaceBox, size: u32) -> FaceCrop {
    // Rounding must not push the region past the frame edge
    let x = (face.x.floor() as u32).min(frame.width() - 1);
    let y = (face.y.floor() as u32).min(frame.height() - 1);
    let width = (face.width.round() as u32).clamp(1, frame.width() - x);
    let height = (face.height.round() as u32).clamp(1, frame.height() - y);

    let region = imageops::crop_imm(frame.image(), x, y, width, height).to_image();
    let resized = imageops::resize(&region, size, size, FilterType::Triangle);
    let gray = DynamicImage::ImageRgb8(resized).into_luma8();

    let pixels = gray.pixels().map(|p| p.0[0] as f32 / 255.0).collect();

    FaceCrop { pixels, size }
}
