use alloc::vec::Vec;

use arrayref::array_ref;
use rgb::RGB8;

use crate::error::{EncoderResult, EncodingError};

/// # Color types used in encoding
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum JpegColorType {
    /// One component grayscale colorspace
    Luma,

    /// Three component YCbCr colorspace
    Ycbcr,
}

impl JpegColorType {
    pub(crate) fn get_num_components(self) -> usize {
        use JpegColorType::*;

        match self {
            Luma => 1,
            Ycbcr => 3,
        }
    }
}

/// # Color types for input images
///
/// Available color input formats for [Encoder::encode](crate::Encoder::encode). Other types can be used
/// by implementing an [ImageBuffer].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ColorType {
    /// Grayscale with 1 byte per pixel
    Luma,

    /// RGB with 3 bytes per pixel
    Rgb,
}

impl ColorType {
    pub fn get_bytes_per_pixel(self) -> usize {
        use ColorType::*;

        match self {
            Luma => 1,
            Rgb => 3,
        }
    }

    /// Color type for an interleaved buffer with the given number of channels
    ///
    /// # Errors
    ///
    /// Returns [EncodingError::UnsupportedChannelCount] for anything but 1 or 3 channels
    pub fn from_channels(channels: usize) -> Result<ColorType, EncodingError> {
        match channels {
            1 => Ok(ColorType::Luma),
            3 => Ok(ColorType::Rgb),
            _ => Err(EncodingError::UnsupportedChannelCount(channels)),
        }
    }
}

/// Convert an RGB sample to full range YCbCr
///
/// Chroma is centered on 128 like luma, so all three values lie in 0..=255.
#[inline(always)]
pub fn rgb_to_ycbcr(r: u8, g: u8, b: u8) -> (f32, f32, f32) {
    let r = f32::from(r);
    let g = f32::from(g);
    let b = f32::from(b);

    let y = 0.299 * r + 0.587 * g + 0.114 * b;
    let cb = -0.16874 * r - 0.33126 * g + 0.5 * b + 128.0;
    let cr = 0.5 * r - 0.41869 * g - 0.08131 * b + 128.0;

    (y, cb, cr)
}

/// # Buffer used as input value for image encoding
///
/// Image encoding with [Encoder::encode_image](crate::Encoder::encode_image) needs an ImageBuffer
/// as input for the image data. For convenience the [Encoder::encode](crate::Encoder::encode)
/// function contains implementations for common byte based pixel formats.
/// Users that needs other pixel formats or don't have the data available as byte slices
/// can create their own buffer implementations.
///
/// ## Example: ImageBuffer implementation for RgbImage from the `image` crate
/// ```no_run
/// use jfif_baseline::{ImageBuffer, JpegColorType, rgb_to_ycbcr};
///
/// pub struct ImageRgb<'a> {
///     width: u16,
///     height: u16,
///     pixels: &'a [[u8; 3]],
/// }
///
/// impl<'a> ImageBuffer for ImageRgb<'a> {
///     fn get_jpeg_color_type(&self) -> JpegColorType {
///         JpegColorType::Ycbcr
///     }
///
///     fn width(&self) -> u16 {
///         self.width
///     }
///
///     fn height(&self) -> u16 {
///         self.height
///     }
///
///     fn fill_buffers(&self, y: u16, buffers: &mut [Vec<f32>; 3]) {
///         let start = usize::from(y) * usize::from(self.width);
///         for &[r, g, b] in &self.pixels[start..start + usize::from(self.width)] {
///             let (y, cb, cr) = rgb_to_ycbcr(r, g, b);
///
///             buffers[0].push(y);
///             buffers[1].push(cb);
///             buffers[2].push(cr);
///         }
///     }
/// }
/// ```
pub trait ImageBuffer {
    /// The color type used in the image encoding
    fn get_jpeg_color_type(&self) -> JpegColorType;

    /// Width of the image
    fn width(&self) -> u16;

    /// Height of the image
    fn height(&self) -> u16;

    /// Add color values for the row to color component buffers
    ///
    /// Values are in 0..=255 before level shifting. Only the first
    /// `get_jpeg_color_type().get_num_components()` buffers are used.
    fn fill_buffers(&self, y: u16, buffers: &mut [Vec<f32>; 3]);

    /// Check that the buffer holds a full image
    ///
    /// Called before any output is written. [fill_buffers](ImageBuffer::fill_buffers)
    /// may assume every row in `0..height()` is present once this returned `Ok`.
    fn validate(&self) -> EncoderResult<()> {
        Ok(())
    }
}

pub(crate) fn required_data_len(width: u16, height: u16, color_type: ColorType) -> usize {
    usize::from(width) * usize::from(height) * color_type.get_bytes_per_pixel()
}

fn check_len(length: usize, required: usize) -> EncoderResult<()> {
    if length != required {
        return Err(EncodingError::BadImageData { length, required });
    }
    Ok(())
}

/// Grayscale with 1 byte per pixel
pub struct GrayImage<'a>(pub &'a [u8], pub u16, pub u16);

impl<'a> ImageBuffer for GrayImage<'a> {
    fn get_jpeg_color_type(&self) -> JpegColorType {
        JpegColorType::Luma
    }

    fn width(&self) -> u16 {
        self.1
    }

    fn height(&self) -> u16 {
        self.2
    }

    fn fill_buffers(&self, y: u16, buffers: &mut [Vec<f32>; 3]) {
        let width = usize::from(self.1);
        let offset = usize::from(y) * width;

        buffers[0].extend(self.0[offset..offset + width].iter().map(|&v| f32::from(v)));
    }

    fn validate(&self) -> EncoderResult<()> {
        check_len(self.0.len(), required_data_len(self.1, self.2, ColorType::Luma))
    }
}

/// RGB with 3 bytes per pixel
pub struct RgbImage<'a>(pub &'a [u8], pub u16, pub u16);

impl<'a> ImageBuffer for RgbImage<'a> {
    fn get_jpeg_color_type(&self) -> JpegColorType {
        JpegColorType::Ycbcr
    }

    fn width(&self) -> u16 {
        self.1
    }

    fn height(&self) -> u16 {
        self.2
    }

    fn fill_buffers(&self, y: u16, buffers: &mut [Vec<f32>; 3]) {
        let width = usize::from(self.1);
        let row = &self.0[usize::from(y) * width * 3..][..width * 3];

        for x in 0..width {
            let &[r, g, b] = array_ref!(row, x * 3, 3);
            let (y, cb, cr) = rgb_to_ycbcr(r, g, b);

            buffers[0].push(y);
            buffers[1].push(cb);
            buffers[2].push(cr);
        }
    }

    fn validate(&self) -> EncoderResult<()> {
        check_len(self.0.len(), required_data_len(self.1, self.2, ColorType::Rgb))
    }
}

/// RGB pixels from the `rgb` crate
pub struct RgbPixels<'a>(pub &'a [RGB8], pub u16, pub u16);

impl<'a> ImageBuffer for RgbPixels<'a> {
    fn get_jpeg_color_type(&self) -> JpegColorType {
        JpegColorType::Ycbcr
    }

    fn width(&self) -> u16 {
        self.1
    }

    fn height(&self) -> u16 {
        self.2
    }

    fn fill_buffers(&self, y: u16, buffers: &mut [Vec<f32>; 3]) {
        let width = usize::from(self.1);
        let offset = usize::from(y) * width;

        for pixel in &self.0[offset..offset + width] {
            let (y, cb, cr) = rgb_to_ycbcr(pixel.r, pixel.g, pixel.b);

            buffers[0].push(y);
            buffers[1].push(cb);
            buffers[2].push(cr);
        }
    }

    /// Length is counted in pixels, not bytes
    fn validate(&self) -> EncoderResult<()> {
        check_len(self.0.len(), usize::from(self.1) * usize::from(self.2))
    }
}
