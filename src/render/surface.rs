use crate::foundation::core::{Size, unpremultiply_rgba8_in_place};

/// Drawing surface the compositor renders into.
///
/// Pixels are premultiplied RGBA8, row-major, tightly packed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Surface {
    size: Size,
    data: Vec<u8>,
}

impl Surface {
    /// Allocate a transparent surface.
    pub fn new(size: Size) -> Self {
        Self {
            size,
            data: vec![0; size.rgba8_len()],
        }
    }

    /// Resize to `size`, reallocating only when the size changes. Pixels are not preserved.
    pub fn resize(&mut self, size: Size) {
        if self.size != size {
            self.size = size;
            self.data = vec![0; size.rgba8_len()];
        }
    }

    /// Clear every pixel to transparent.
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Surface size.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.size.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.size.height
    }

    /// Premultiplied pixel bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub(crate) fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let stride = self.size.width as usize * 4;
        let start = y as usize * stride;
        &mut self.data[start..start + stride]
    }

    /// Premultiplied pixel at `(x, y)`.
    ///
    /// Panics when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.size.width as usize + x as usize) * 4;
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    /// Copy of the pixels with straight (non-premultiplied) alpha, as image encoders expect.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        unpremultiply_rgba8_in_place(&mut out);
        out
    }
}

impl Default for Surface {
    fn default() -> Self {
        Self::new(Size::new(0, 0))
    }
}
