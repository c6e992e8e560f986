//! # JFIF baseline encoder
//!
//! A baseline JPEG encoder producing JFIF files: single scan, 8 bit samples,
//! Huffman coding with the standard tables.
//!
//! Features:
//! - Baseline, Huffman coded JPEG with the Annex K tables
//! - Grayscale and RGB input, or anything implementing [ImageBuffer]
//! - Chroma subsampling 4:4:4 or 4:2:0
//! - Comment segment and pixel density in the JFIF header
//! - Encoding of raw frame streams with [encode_frames]
//! - Support for no_std + alloc
//!
//! ## Example
//! ```no_run
//! use jfif_baseline::{Encoder, ColorType};
//!
//! // An array with 4 pixels in a 2x2 grid
//! let data = vec![
//!     255, 0, 0,
//!     0, 255, 0,
//!     0, 0, 255,
//!     255, 255, 255,
//! ];
//!
//! let mut encoder = Encoder::new_file("some.jpeg", 100)?;
//! encoder.set_comment("Four pixels")?;
//!
//! encoder.encode(&data, 2, 2, ColorType::Rgb)?;
//!
//! # Ok::<(), jfif_baseline::EncodingError>(())
//! ```

#![no_std]

#[cfg(feature = "std")]
extern crate std;

extern crate alloc;

mod encoder;
mod error;
mod fdct;
mod frame_source;
mod huffman;
mod image_buffer;
mod marker;
mod quantization;
mod sampler;
mod writer;

#[cfg(all(test, feature = "std"))]
mod tests;

use alloc::vec::Vec;

pub use encoder::{Encoder, EncoderSettings, SamplingFactor};
pub use error::{EncoderResult, EncodingError};
pub use frame_source::{encode_frames, Frame, FrameSource};
pub use image_buffer::{
    rgb_to_ycbcr, ColorType, GrayImage, ImageBuffer, JpegColorType, RgbImage, RgbPixels,
};
pub use quantization::QuantizationTableType;
pub use writer::{unzigzag, zigzag, JfifWrite, ZIGZAG};

#[cfg(feature = "std")]
pub use frame_source::{encode_frames_to_dir, RawVideoReader};

#[cfg(feature = "benchmark")]
pub use fdct::{fdct, AAN_SCALE_FACTORS};

#[cfg(all(feature = "benchmark", feature = "std"))]
pub use fdct::reference_fdct;

/// # Pixel density
///
/// Written to the JFIF header. Decoders use it to get the physical size of the image.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum Density {
    /// No pixel density is set, which means "1 pixel per pixel"
    #[default]
    None,

    /// Horizontal and vertical dots per inch (dpi)
    Inch { x: u16, y: u16 },

    /// Horizontal and vertical dots per centimeters
    Centimeter { x: u16, y: u16 },
}

/// Encode a pixel buffer into an in-memory JFIF file
///
/// `pixels` holds `width * height` interleaved RGB samples if `is_color` is set,
/// otherwise one gray sample per pixel. A quality outside of 1..=100 is clamped.
///
/// # Errors
///
/// Validation errors are returned before any output is produced.
pub fn encode(
    pixels: &[u8],
    width: u16,
    height: u16,
    is_color: bool,
    quality: u8,
    chroma_subsampling: bool,
    comment: Option<&str>,
) -> EncoderResult<Vec<u8>> {
    let color_type = if is_color {
        ColorType::Rgb
    } else {
        ColorType::Luma
    };

    let mut output = Vec::new();

    let mut encoder = Encoder::new(&mut output, quality);
    encoder.set_sampling_factor(if chroma_subsampling {
        SamplingFactor::R_4_2_0
    } else {
        SamplingFactor::R_4_4_4
    });

    if let Some(comment) = comment {
        encoder.set_comment(comment)?;
    }

    encoder.encode(pixels, width, height, color_type)?;

    Ok(output)
}
