use alloc::string::String;

use core::fmt::Display;

/// # The error type for encoding
#[derive(Debug)]
pub enum EncodingError {
    /// Width or height is zero
    InvalidDimensions { width: u16, height: u16 },

    /// The pixel buffer length is not width * height * channels
    BadImageData { length: usize, required: usize },

    /// Only one (grayscale) or three (RGB) channels are supported
    UnsupportedChannelCount(usize),

    /// The comment segment would exceed the maximum segment length
    CommentTooLarge(usize),

    /// A quantized value needs more magnitude bits than baseline coding allows.
    ///
    /// This points at a defect in the transform/quantizer pairing, not at bad input.
    CoefficientOutOfRange { value: i32, max_bits: u8 },

    /// Frame dimensions or color type changed in the middle of a frame stream
    FrameFormatChanged { frame: usize },

    /// An io error occurred during writing
    #[cfg(feature = "std")]
    IoError(std::io::Error),

    /// An io error occurred during writing (Should be used in no_std cases instead of IoError)
    Write(String),
}

#[cfg(feature = "std")]
impl From<std::io::Error> for EncodingError {
    fn from(err: std::io::Error) -> EncodingError {
        EncodingError::IoError(err)
    }
}

impl Display for EncodingError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        use EncodingError::*;
        match self {
            InvalidDimensions { width, height } => {
                write!(f, "Invalid image dimensions: {}x{}", width, height)
            }
            BadImageData { length, required } => write!(
                f,
                "Image data length {} does not match dimensions and color type, required {}",
                length, required
            ),
            UnsupportedChannelCount(channels) => {
                write!(f, "Unsupported number of channels: {}", channels)
            }
            CommentTooLarge(length) => {
                write!(f, "Comment too large: {} bytes (max 65533)", length)
            }
            CoefficientOutOfRange { value, max_bits } => write!(
                f,
                "Internal encoding fault: value {} does not fit into {} bits",
                value, max_bits
            ),
            FrameFormatChanged { frame } => write!(
                f,
                "Width, height and color type must stay constant, but frame {} differs",
                frame
            ),
            #[cfg(feature = "std")]
            IoError(err) => err.fmt(f),
            Write(err) => write!(f, "{}", err),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for EncodingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EncodingError::IoError(err) => Some(err),
            _ => None,
        }
    }
}

pub type EncoderResult<T> = Result<T, EncodingError>;
