//! A captured RGB frame.

/// Packed 8-bit RGB, row-major.  The buffer is always exactly
/// `width * height * 3` bytes; every constructor keeps it that way.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    width:  usize,
    height: usize,
    rgb:    Vec<u8>,
}

impl Frame {
    /// Wrap packed RGB bytes.  Short buffers are zero-padded, long ones
    /// truncated, so `rgb.len()` always matches the dimensions.
    pub fn from_rgb(width: usize, height: usize, mut rgb: Vec<u8>) -> Self {
        rgb.resize(width * height * 3, 0);
        Frame { width, height, rgb }
    }

    /// Build a frame whose three channels all equal the given luma values.
    pub fn from_gray(width: usize, height: usize, luma: &[u8]) -> Self {
        let mut rgb = Vec::with_capacity(width * height * 3);
        for i in 0..width * height {
            let v = luma.get(i).copied().unwrap_or(0);
            rgb.extend_from_slice(&[v, v, v]);
        }
        Frame { width, height, rgb }
    }

    pub fn solid(width: usize, height: usize, value: u8) -> Self {
        Frame { width, height, rgb: vec![value; width * height * 3] }
    }

    /// ITU-R BT.601 luma per pixel.
    pub fn luma(&self) -> Vec<u8> {
        self.rgb
            .chunks_exact(3)
            .map(|p| {
                let y = 0.299 * p[0] as f32 + 0.587 * p[1] as f32 + 0.114 * p[2] as f32;
                y.round().clamp(0.0, 255.0) as u8
            })
            .collect()
    }

    /// Horizontal flip, so the player sees themselves as in a mirror.
    pub fn mirrored(&self) -> Frame {
        let mut out = Vec::with_capacity(self.rgb.len());
        let stride = self.width * 3;
        for row in self.rgb.chunks_exact(stride.max(1)) {
            for px in row.chunks_exact(3).rev() {
                out.extend_from_slice(px);
            }
        }
        Frame { width: self.width, height: self.height, rgb: out }
    }

    /// Nearest-neighbour shrink keeping every `step`-th pixel in each axis.
    pub fn downsample(&self, step: usize) -> Frame {
        let step = step.max(1);
        let (w, h) = (self.width.div_ceil(step), self.height.div_ceil(step));
        let mut out = Vec::with_capacity(w * h * 3);
        for y in (0..self.height).step_by(step) {
            for x in (0..self.width).step_by(step) {
                let i = (y * self.width + x) * 3;
                out.extend_from_slice(&self.rgb[i..i + 3]);
            }
        }
        Frame { width: w, height: h, rgb: out }
    }

    pub fn width(&self)  -> usize { self.width }
    pub fn height(&self) -> usize { self.height }
    pub fn rgb(&self)    -> &[u8] { &self.rgb }

    pub fn is_empty(&self) -> bool { self.width == 0 || self.height == 0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rgb_normalises_length() {
        let f = Frame::from_rgb(2, 2, vec![1, 2, 3]);
        assert_eq!(f.rgb().len(), 12);
        let long = Frame::from_rgb(1, 1, vec![9; 10]);
        assert_eq!(long.rgb(), &[9, 9, 9]);
    }

    #[test]
    fn short_input_is_safe_to_process() {
        let f = Frame::from_rgb(4, 3, vec![200; 5]);
        assert_eq!(f.luma().len(), 12);
        assert_eq!(f.mirrored().rgb().len(), 36);
        let d = f.downsample(3);
        assert_eq!((d.width(), d.height()), (2, 1));
        assert_eq!(d.rgb().len(), 6);
    }

    #[test]
    fn luma_of_gray_is_identity() {
        let f = Frame::from_gray(3, 1, &[0, 128, 255]);
        assert_eq!(f.luma(), vec![0, 128, 255]);
    }

    #[test]
    fn mirror_flips_columns_not_rows() {
        let f = Frame::from_gray(3, 2, &[1, 2, 3, 4, 5, 6]);
        assert_eq!(f.mirrored().luma(), vec![3, 2, 1, 6, 5, 4]);
    }

    #[test]
    fn downsample_keeps_every_nth_pixel() {
        let f = Frame::from_gray(3, 3, &[1, 2, 3, 4, 5, 6, 7, 8, 9]);
        let d = f.downsample(2);
        assert_eq!((d.width(), d.height()), (2, 2));
        assert_eq!(d.luma(), vec![1, 3, 7, 9]);
    }
}
