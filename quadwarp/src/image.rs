use crate::error::WarpError;
use crate::geometry::Quad;

/// RGBA image with row-major pixel data, 4 bytes per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaImage {
    pub width: u32,
    pub height: u32,
    pub buf: Vec<u8>,
}

impl RgbaImage {
    /// Create a new, fully transparent image.
    pub fn new(width: u32, height: u32) -> Self {
        let buf = vec![0u8; width as usize * height as usize * 4];
        Self { width, height, buf }
    }

    /// Create an image from existing pixel data.
    ///
    /// Both dimensions must be non-zero and `buf` must hold exactly
    /// `width * height * 4` bytes.
    pub fn from_buf(width: u32, height: u32, buf: Vec<u8>) -> Result<Self, WarpError> {
        let img = Self { width, height, buf };
        img.validate()?;
        Ok(img)
    }

    /// Check that the dimensions are non-zero and match the buffer length.
    pub fn validate(&self) -> Result<(), WarpError> {
        let (width, height) = (self.width, self.height);
        if width == 0 || height == 0 {
            return Err(WarpError::InvalidInput(format!(
                "image dimensions must be positive, got {width}x{height}"
            )));
        }
        let expected = width as usize * height as usize * 4;
        if self.buf.len() != expected {
            return Err(WarpError::InvalidInput(format!(
                "RGBA data length {} does not match {width}x{height}x4 = {expected}",
                self.buf.len()
            )));
        }
        Ok(())
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    /// Get the pixel at (x, y).
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> [u8; 4] {
        let i = self.offset(x, y);
        [self.buf[i], self.buf[i + 1], self.buf[i + 2], self.buf[i + 3]]
    }

    /// Set the pixel at (x, y).
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, px: [u8; 4]) {
        let i = self.offset(x, y);
        self.buf[i..i + 4].copy_from_slice(&px);
    }

    /// The rectangle `(0,0)-(width,height)` as a quad.
    pub fn corners(&self) -> Quad {
        Quad::rect(self.width as f64, self.height as f64)
    }

    /// Bilinear sample at sub-pixel coordinates.
    ///
    /// Integer coordinates address pixel values directly (no half-pixel
    /// shift). Returns `None` outside `[0, width) x [0, height)`. The right
    /// and bottom neighbours are clamped to the last column and row.
    pub fn sample_bilinear(&self, sx: f64, sy: f64) -> Option<[u8; 4]> {
        if !(sx >= 0.0 && sx < self.width as f64 && sy >= 0.0 && sy < self.height as f64) {
            return None;
        }

        let x1 = sx.floor() as u32;
        let y1 = sy.floor() as u32;
        let x2 = (x1 + 1).min(self.width - 1);
        let y2 = (y1 + 1).min(self.height - 1);

        let dx = sx - x1 as f64;
        let dy = sy - y1 as f64;

        let p11 = self.get(x1, y1);
        let p21 = self.get(x2, y1);
        let p12 = self.get(x1, y2);
        let p22 = self.get(x2, y2);

        let mut out = [0u8; 4];
        for c in 0..4 {
            let top = p11[c] as f64 * (1.0 - dx) + p21[c] as f64 * dx;
            let bottom = p12[c] as f64 * (1.0 - dx) + p22[c] as f64 * dx;
            out[c] = (top * (1.0 - dy) + bottom * dy).round().clamp(0.0, 255.0) as u8;
        }
        Some(out)
    }
}
