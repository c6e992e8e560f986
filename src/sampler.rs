use alloc::vec;
use alloc::vec::Vec;

use crate::image_buffer::ImageBuffer;

/// Geometry of the MCU grid covering an image
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct McuLayout {
    pub width: usize,
    pub height: usize,
    pub max_h_sampling: usize,
    pub max_v_sampling: usize,
    pub mcus_x: usize,
    pub mcus_y: usize,
}

impl McuLayout {
    pub fn new(width: u16, height: u16, max_h_sampling: u8, max_v_sampling: u8) -> McuLayout {
        let width = usize::from(width);
        let height = usize::from(height);
        let max_h_sampling = usize::from(max_h_sampling);
        let max_v_sampling = usize::from(max_v_sampling);

        McuLayout {
            width,
            height,
            max_h_sampling,
            max_v_sampling,
            mcus_x: ceil_div(width, max_h_sampling * 8),
            mcus_y: ceil_div(height, max_v_sampling * 8),
        }
    }

    #[inline]
    pub fn mcu_width(&self) -> usize {
        self.max_h_sampling * 8
    }

    #[inline]
    pub fn mcu_height(&self) -> usize {
        self.max_v_sampling * 8
    }

    /// Width of the row buffers, a whole number of MCUs
    #[inline]
    pub fn padded_width(&self) -> usize {
        self.mcus_x * self.mcu_width()
    }
}

/// Samples of one MCU row for every component, padded to whole MCUs
///
/// Rows below the image repeat the last image row and columns right of it
/// repeat the last column.
pub(crate) struct RowBuffer {
    rows: [Vec<f32>; 3],
    line: [Vec<f32>; 3],
    num_components: usize,
}

impl RowBuffer {
    pub fn new(layout: &McuLayout, num_components: usize) -> RowBuffer {
        let size = layout.padded_width() * layout.mcu_height();

        let mut rows: [Vec<f32>; 3] = Default::default();
        let mut line: [Vec<f32>; 3] = Default::default();

        for c in 0..num_components {
            rows[c] = vec![0f32; size];
            line[c] = Vec::with_capacity(layout.width);
        }

        RowBuffer {
            rows,
            line,
            num_components,
        }
    }

    pub fn fill<I: ImageBuffer>(&mut self, image: &I, layout: &McuLayout, mcu_row: usize) {
        let stride = layout.padded_width();
        let first_row = mcu_row * layout.mcu_height();

        for r in 0..layout.mcu_height() {
            let y = (first_row + r).min(layout.height - 1);

            for line in self.line.iter_mut() {
                line.clear();
            }
            image.fill_buffers(y as u16, &mut self.line);

            for c in 0..self.num_components {
                let line = &self.line[c];
                let row = &mut self.rows[c][r * stride..(r + 1) * stride];

                row[..layout.width].copy_from_slice(&line[..layout.width]);

                let last = line[layout.width - 1];
                for v in &mut row[layout.width..] {
                    *v = last;
                }
            }
        }
    }

    #[inline]
    pub fn component(&self, index: usize) -> &[f32] {
        &self.rows[index]
    }
}

/// Extract one level shifted 8x8 block
///
/// Every output sample is the mean of a `step_x` x `step_y` group of input
/// samples starting at `(x0, y0)`. A step of 1 copies the samples.
pub(crate) fn extract_block(
    samples: &[f32],
    stride: usize,
    x0: usize,
    y0: usize,
    step_x: usize,
    step_y: usize,
    block: &mut [f32; 64],
) {
    let norm = 1.0 / (step_x * step_y) as f32;

    for y in 0..8 {
        for x in 0..8 {
            let sx = x0 + x * step_x;
            let sy = y0 + y * step_y;

            let mut sum = 0f32;
            for dy in 0..step_y {
                let row = &samples[(sy + dy) * stride..];
                for dx in 0..step_x {
                    sum += row[sx + dx];
                }
            }

            block[y * 8 + x] = sum * norm - 128.0;
        }
    }
}

#[inline]
pub(crate) fn ceil_div(value: usize, div: usize) -> usize {
    value / div + usize::from(value % div != 0)
}
