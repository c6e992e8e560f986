//! Encoding of frame sequences
//!
//! A [FrameSource] hands out decoded frames one at a time. Every frame is
//! encoded as an independent baseline JPEG; there is no temporal compression.

use alloc::vec::Vec;

use log::debug;

use crate::encoder::{Encoder, EncoderSettings};
use crate::error::{EncoderResult, EncodingError};
use crate::image_buffer::{required_data_len, ColorType};
use crate::writer::JfifWrite;

#[cfg(feature = "std")]
use alloc::format;

#[cfg(feature = "std")]
use std::{
    fs::File,
    io::{BufWriter, ErrorKind, Read},
    path::Path,
};

/// One decoded frame as interleaved 8 bit samples
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Frame {
    pub data: Vec<u8>,
    pub width: u16,
    pub height: u16,
    pub color_type: ColorType,
}

impl Frame {
    /// Check dimensions and buffer length
    pub fn validate(&self) -> EncoderResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(EncodingError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }

        let required = required_data_len(self.width, self.height, self.color_type);
        if self.data.len() != required {
            return Err(EncodingError::BadImageData {
                length: self.data.len(),
                required,
            });
        }

        Ok(())
    }
}

/// Decode next frame -> pixel buffer
pub trait FrameSource {
    /// Returns the next frame or `None` at the end of the stream
    fn next_frame(&mut self) -> EncoderResult<Option<Frame>>;
}

impl FrameSource for alloc::vec::IntoIter<Frame> {
    fn next_frame(&mut self) -> EncoderResult<Option<Frame>> {
        Ok(self.next())
    }
}

impl<S: FrameSource + ?Sized> FrameSource for &mut S {
    fn next_frame(&mut self) -> EncoderResult<Option<Frame>> {
        (**self).next_frame()
    }
}

/// Reads consecutive raw frames of a fixed size (rgb24 or gray8)
#[cfg(feature = "std")]
pub struct RawVideoReader<R: Read> {
    reader: R,
    width: u16,
    height: u16,
    color_type: ColorType,
}

#[cfg(feature = "std")]
impl<R: Read> RawVideoReader<R> {
    /// # Errors
    ///
    /// Returns [EncodingError::InvalidDimensions] if width or height is 0
    pub fn new(
        reader: R,
        width: u16,
        height: u16,
        color_type: ColorType,
    ) -> EncoderResult<RawVideoReader<R>> {
        if width == 0 || height == 0 {
            return Err(EncodingError::InvalidDimensions { width, height });
        }

        Ok(RawVideoReader {
            reader,
            width,
            height,
            color_type,
        })
    }

    /// Reader for frames with 1 (gray8) or 3 (rgb24) interleaved channels
    pub fn with_channels(
        reader: R,
        width: u16,
        height: u16,
        channels: usize,
    ) -> EncoderResult<RawVideoReader<R>> {
        Self::new(reader, width, height, ColorType::from_channels(channels)?)
    }

    /// Size of one frame in bytes
    pub fn frame_len(&self) -> usize {
        required_data_len(self.width, self.height, self.color_type)
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

#[cfg(feature = "std")]
impl<R: Read> FrameSource for RawVideoReader<R> {
    fn next_frame(&mut self) -> EncoderResult<Option<Frame>> {
        let len = self.frame_len();
        let mut data = alloc::vec![0u8; len];

        let mut filled = 0;
        while filled < len {
            match self.reader.read(&mut data[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }

        if filled == 0 {
            return Ok(None);
        }

        if filled < len {
            return Err(std::io::Error::new(
                ErrorKind::UnexpectedEof,
                format!("Truncated frame: got {} of {} bytes", filled, len),
            )
            .into());
        }

        Ok(Some(Frame {
            data,
            width: self.width,
            height: self.height,
            color_type: self.color_type,
        }))
    }
}

/// Encode every frame of a source
///
/// `sink` is called with the frame index and returns the writer for that frame.
/// Width, height and color type have to stay constant over the stream.
///
/// Returns the number of encoded frames.
///
/// # Errors
///
/// Returns [EncodingError::FrameFormatChanged] when a frame differs in format from the first one.
/// Errors of the source, the sink or the encoder are passed through.
pub fn encode_frames<S, W, F>(
    mut source: S,
    settings: &EncoderSettings,
    mut sink: F,
) -> EncoderResult<usize>
where
    S: FrameSource,
    W: JfifWrite,
    F: FnMut(usize) -> EncoderResult<W>,
{
    let mut format = None;
    let mut count = 0;

    while let Some(frame) = source.next_frame()? {
        let current = (frame.width, frame.height, frame.color_type);

        match format {
            None => format = Some(current),
            Some(expected) if expected != current => {
                return Err(EncodingError::FrameFormatChanged { frame: count });
            }
            Some(_) => {}
        }

        frame.validate()?;

        debug!(
            "Encoding frame {} ({}x{} {:?})",
            count, frame.width, frame.height, frame.color_type
        );

        let encoder = Encoder::with_settings(sink(count)?, settings)?;
        encoder.encode(&frame.data, frame.width, frame.height, frame.color_type)?;

        count += 1;
    }

    Ok(count)
}

/// Encode every frame of a source into `frame_000.jpg`, `frame_001.jpg`, ... inside `dir`
///
/// The directory is created if missing.
#[cfg(feature = "std")]
pub fn encode_frames_to_dir<S: FrameSource, P: AsRef<Path>>(
    source: S,
    dir: P,
    settings: &EncoderSettings,
) -> EncoderResult<usize> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;

    encode_frames(source, settings, |index| {
        let file = File::create(dir.join(format!("frame_{:03}.jpg", index)))?;
        Ok(BufWriter::new(file))
    })
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;
    use std::io::{Cursor, ErrorKind};

    use super::*;

    fn gray_frame(width: u16, height: u16, value: u8) -> Frame {
        Frame {
            data: vec![value; usize::from(width) * usize::from(height)],
            width,
            height,
            color_type: ColorType::Luma,
        }
    }

    #[test]
    fn test_raw_reader_frames() {
        let data: Vec<u8> = (0..2 * 4 * 2 * 3).map(|i| i as u8).collect();
        let mut reader = RawVideoReader::with_channels(Cursor::new(data), 4, 2, 3).unwrap();

        assert_eq!(reader.frame_len(), 24);

        let first = reader.next_frame().unwrap().unwrap();
        assert_eq!(first.data[0], 0);
        assert_eq!(first.color_type, ColorType::Rgb);

        let second = reader.next_frame().unwrap().unwrap();
        assert_eq!(second.data[0], 24);

        assert!(reader.next_frame().unwrap().is_none());
    }

    #[test]
    fn test_raw_reader_truncated() {
        let mut reader = RawVideoReader::new(Cursor::new(vec![0u8; 10]), 4, 4, ColorType::Luma).unwrap();

        match reader.next_frame() {
            Err(EncodingError::IoError(e)) => assert_eq!(e.kind(), ErrorKind::UnexpectedEof),
            other => panic!("Unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_raw_reader_rejects_channels() {
        assert!(matches!(
            RawVideoReader::with_channels(Cursor::new(Vec::new()), 4, 4, 2),
            Err(EncodingError::UnsupportedChannelCount(2))
        ));
        assert!(matches!(
            RawVideoReader::new(Cursor::new(Vec::new()), 0, 4, ColorType::Luma),
            Err(EncodingError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_encode_frames() {
        let frames = vec![gray_frame(8, 8, 10), gray_frame(8, 8, 200), gray_frame(8, 8, 90)];

        let mut outputs: Vec<Vec<u8>> = vec![Vec::new(); 3];
        {
            let mut slots = outputs.iter_mut();
            let count = encode_frames(frames.into_iter(), &EncoderSettings::default(), |_| {
                slots.next().ok_or_else(|| EncodingError::Write("No slot".into()))
            })
            .unwrap();
            assert_eq!(count, 3);
        }

        for output in &outputs {
            assert_eq!(&output[..2], &[0xFF, 0xD8]);
            assert_eq!(&output[output.len() - 2..], &[0xFF, 0xD9]);
        }
        assert_ne!(outputs[0], outputs[1]);
    }

    #[test]
    fn test_encode_frames_format_change() {
        let frames = vec![gray_frame(8, 8, 10), gray_frame(16, 8, 10)];

        let mut written = 0;
        let result = encode_frames(frames.into_iter(), &EncoderSettings::default(), |_| {
            written += 1;
            Ok(Vec::new())
        });

        assert!(matches!(
            result,
            Err(EncodingError::FrameFormatChanged { frame: 1 })
        ));
        assert_eq!(written, 1);
    }

    #[test]
    fn test_encode_frames_to_dir() {
        let dir = std::env::temp_dir().join(format!("jfif-baseline-frames-{}", std::process::id()));

        let data = vec![128u8; 2 * 16 * 16 * 3];
        let reader = RawVideoReader::new(Cursor::new(data), 16, 16, ColorType::Rgb).unwrap();

        let count = encode_frames_to_dir(reader, &dir, &EncoderSettings::new(80)).unwrap();
        assert_eq!(count, 2);

        for name in ["frame_000.jpg", "frame_001.jpg"] {
            let bytes = std::fs::read(dir.join(name)).unwrap();
            assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        }
        assert!(!dir.join("frame_002.jpg").exists());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_encode_frames_to_dir_reports_full_disk() {
        let dir = std::env::temp_dir().join(format!("jfif-baseline-full-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::os::unix::fs::symlink("/dev/full", dir.join("frame_000.jpg")).unwrap();

        let data = vec![128u8; 16 * 16 * 3];
        let reader = RawVideoReader::new(Cursor::new(data), 16, 16, ColorType::Rgb).unwrap();

        let result = encode_frames_to_dir(reader, &dir, &EncoderSettings::new(80));
        std::fs::remove_dir_all(&dir).unwrap();

        assert!(matches!(result, Err(EncodingError::IoError(_))));
    }
}
