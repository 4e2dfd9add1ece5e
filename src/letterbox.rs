use image::{imageops, imageops::FilterType, ImageBuffer, Rgb, RgbImage};

/// Gray used for the padded border, matching the value YOLO models are trained with.
pub const PAD_VALUE: u8 = 114;

/// Geometry of an aspect-preserving resize into a fixed-size canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    pub target_width: u32,
    pub target_height: u32,
    pub scale: f32,
    pub pad_x: u32,
    pub pad_y: u32,
    pub resized_width: u32,
    pub resized_height: u32,
    pub src_width: u32,
    pub src_height: u32,
}

impl Letterbox {
    /// Fits a `(width, height)` source into a `(width, height)` target, centering
    /// the content and padding each axis separately.
    pub fn fit(
        (src_width, src_height): (u32, u32),
        (target_width, target_height): (u32, u32),
    ) -> Self {
        let scale = (target_width as f32 / src_width as f32)
            .min(target_height as f32 / src_height as f32);
        let resized_width = ((src_width as f32 * scale).round() as u32).clamp(1, target_width);
        let resized_height = ((src_height as f32 * scale).round() as u32).clamp(1, target_height);

        Self {
            target_width,
            target_height,
            scale,
            pad_x: (target_width - resized_width) / 2,
            pad_y: (target_height - resized_height) / 2,
            resized_width,
            resized_height,
            src_width,
            src_height,
        }
    }

    /// Maps a point on the canvas back to source pixels, clipped to the source image.
    pub fn unmap(&self, x: f32, y: f32) -> (f32, f32) {
        let x = (x - self.pad_x as f32) / self.scale;
        let y = (y - self.pad_y as f32) / self.scale;
        (
            x.clamp(0.0, self.src_width as f32),
            y.clamp(0.0, self.src_height as f32),
        )
    }

    pub fn apply(&self, image: &RgbImage) -> RgbImage {
        let resized = imageops::resize(
            image,
            self.resized_width,
            self.resized_height,
            FilterType::Triangle,
        );
        let mut canvas = ImageBuffer::from_pixel(
            self.target_width,
            self.target_height,
            Rgb([PAD_VALUE; 3]),
        );
        imageops::overlay(&mut canvas, &resized, self.pad_x.into(), self.pad_y.into());
        canvas
    }
}
