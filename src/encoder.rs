use alloc::string::String;
use alloc::vec::Vec;

use log::{debug, trace, warn};

use crate::error::{EncoderResult, EncodingError};
use crate::fdct::fdct;
use crate::huffman::{CodingClass, HuffmanTable};
use crate::image_buffer::*;
use crate::marker::Marker;
use crate::quantization::{QuantizationTable, QuantizationTableType};
use crate::sampler::{extract_block, McuLayout, RowBuffer};
use crate::writer::{JfifWrite, JfifWriter, ZIGZAG};
use crate::Density;

#[cfg(feature = "std")]
use std::io::BufWriter;

#[cfg(feature = "std")]
use std::fs::File;

#[cfg(feature = "std")]
use std::path::Path;

// Segment length field minus its own two bytes
const MAX_SEGMENT_DATA: usize = 65533;

#[repr(u8)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
/// # Sampling factors for chroma subsampling
#[allow(non_camel_case_types)]
pub enum SamplingFactor {
    /// No subsampling, 8x8 MCUs
    R_4_4_4 = 1 << 4 | 1,

    /// Chroma halved in both directions, 16x16 MCUs
    R_4_2_0 = 2 << 4 | 2,
}

impl SamplingFactor {
    /// Luma (horizontal, vertical) sampling factors. Chroma always uses 1x1.
    pub(crate) fn get_sampling_factors(self) -> (u8, u8) {
        let value = self as u8;
        (value >> 4, value & 0xf)
    }
}

pub(crate) struct Component {
    pub id: u8,
    pub quantization_table: u8,
    pub dc_huffman_table: u8,
    pub ac_huffman_table: u8,
    pub horizontal_sampling_factor: u8,
    pub vertical_sampling_factor: u8,
}

macro_rules! add_component {
    ($components:expr, $id:expr, $dest:expr, $h_sample:expr, $v_sample:expr) => {
        $components.push(Component {
            id: $id,
            quantization_table: $dest,
            dc_huffman_table: $dest,
            ac_huffman_table: $dest,
            horizontal_sampling_factor: $h_sample,
            vertical_sampling_factor: $v_sample,
        });
    };
}

/// Reusable encoder configuration
///
/// Used where one configuration has to produce many encoders,
/// e.g. by [encode_frames](crate::encode_frames).
#[derive(Clone, Debug)]
pub struct EncoderSettings {
    pub quality: u8,
    pub sampling_factor: SamplingFactor,
    pub density: Density,
    pub quantization_tables: [QuantizationTableType; 2],
    pub comment: Option<String>,
}

impl EncoderSettings {
    /// Settings with the same defaults as [Encoder::new]
    pub fn new(quality: u8) -> EncoderSettings {
        EncoderSettings {
            quality,
            sampling_factor: default_sampling_factor(quality),
            density: Density::None,
            quantization_tables: [
                QuantizationTableType::Default,
                QuantizationTableType::Default,
            ],
            comment: None,
        }
    }
}

impl Default for EncoderSettings {
    fn default() -> Self {
        EncoderSettings::new(90)
    }
}

fn default_sampling_factor(quality: u8) -> SamplingFactor {
    if quality < 90 {
        SamplingFactor::R_4_2_0
    } else {
        SamplingFactor::R_4_4_4
    }
}

fn clamp_quality(quality: u8) -> u8 {
    let clamped = quality.clamp(1, 100);
    if clamped != quality {
        warn!("Quality {} out of range, using {}", quality, clamped);
    }
    clamped
}

/// # The JPEG encoder
pub struct Encoder<W: JfifWrite> {
    writer: JfifWriter<W>,
    density: Density,
    quality: u8,

    components: Vec<Component>,
    quantization_tables: [QuantizationTableType; 2],
    huffman_tables: [(HuffmanTable, HuffmanTable); 2],

    sampling_factor: SamplingFactor,

    comment: Option<Vec<u8>>,
}

impl<W: JfifWrite> Encoder<W> {
    /// Create a new encoder with the given quality
    ///
    /// The quality must be between 1 and 100 where 100 is the highest image quality.
    /// Values outside of this range are clamped.<br>
    /// By default, quality settings below 90 use a chroma subsampling (2x2 / 4:2:0) which can
    /// be changed with [set_sampling_factor](Encoder::set_sampling_factor).
    pub fn new(w: W, quality: u8) -> Encoder<W> {
        let huffman_tables = [
            (
                HuffmanTable::default_luma_dc(),
                HuffmanTable::default_luma_ac(),
            ),
            (
                HuffmanTable::default_chroma_dc(),
                HuffmanTable::default_chroma_ac(),
            ),
        ];

        let quality = clamp_quality(quality);

        Encoder {
            writer: JfifWriter::new(w),
            density: Density::None,
            quality,
            components: Vec::with_capacity(3),
            quantization_tables: [
                QuantizationTableType::Default,
                QuantizationTableType::Default,
            ],
            huffman_tables,
            sampling_factor: default_sampling_factor(quality),
            comment: None,
        }
    }

    /// Create an encoder from a set of settings
    ///
    /// # Errors
    ///
    /// Returns [EncodingError::CommentTooLarge] if the comment doesn't fit into a segment
    pub fn with_settings(w: W, settings: &EncoderSettings) -> EncoderResult<Encoder<W>> {
        let mut encoder = Encoder::new(w, settings.quality);

        encoder.set_sampling_factor(settings.sampling_factor);
        encoder.set_density(settings.density);
        encoder.set_quantization_tables(
            settings.quantization_tables[0].clone(),
            settings.quantization_tables[1].clone(),
        );

        if let Some(comment) = &settings.comment {
            encoder.set_comment(comment)?;
        }

        Ok(encoder)
    }

    /// Set the quality. Values outside of 1..=100 are clamped.
    pub fn set_quality(&mut self, quality: u8) {
        self.quality = clamp_quality(quality);
    }

    /// Quality in 1..=100
    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Set pixel density for the image
    ///
    /// By default, this value is None which is equal to "1 pixel per pixel".
    pub fn set_density(&mut self, density: Density) {
        self.density = density;
    }

    /// Return pixel density
    pub fn density(&self) -> Density {
        self.density
    }

    /// Set chroma subsampling factor
    ///
    /// Grayscale images are always encoded without subsampling.
    pub fn set_sampling_factor(&mut self, sampling: SamplingFactor) {
        self.sampling_factor = sampling;
    }

    /// Get chroma subsampling factor
    pub fn sampling_factor(&self) -> SamplingFactor {
        self.sampling_factor
    }

    /// Set quantization tables for luma and chroma components
    pub fn set_quantization_tables(
        &mut self,
        luma: QuantizationTableType,
        chroma: QuantizationTableType,
    ) {
        self.quantization_tables = [luma, chroma];
    }

    /// Get configured quantization tables
    pub fn quantization_tables(&self) -> &[QuantizationTableType; 2] {
        &self.quantization_tables
    }

    /// Add a comment (COM) segment written right after the JFIF header
    ///
    /// # Errors
    ///
    /// Returns [EncodingError::CommentTooLarge] if the text is longer than 65533 bytes
    pub fn set_comment(&mut self, comment: &str) -> EncoderResult<()> {
        if comment.len() > MAX_SEGMENT_DATA {
            return Err(EncodingError::CommentTooLarge(comment.len()));
        }

        self.comment = Some(comment.as_bytes().to_vec());
        Ok(())
    }

    /// Comment bytes, if set
    pub fn comment(&self) -> Option<&[u8]> {
        self.comment.as_deref()
    }

    /// Encode an interleaved byte buffer of the given color type
    ///
    /// Data format and length must conform to specified width, height and color type.
    /// For other pixel layouts see [encode_image](Encoder::encode_image).
    pub fn encode(
        self,
        data: &[u8],
        width: u16,
        height: u16,
        color_type: ColorType,
    ) -> EncoderResult<()> {
        match color_type {
            ColorType::Luma => self.encode_image(GrayImage(data, width, height)),
            ColorType::Rgb => self.encode_image(RgbImage(data, width, height)),
        }
    }

    /// Encode any [ImageBuffer] implementation
    ///
    /// Dimensions and [ImageBuffer::validate] are checked before anything is written.
    pub fn encode_image<I: ImageBuffer>(self, image: I) -> EncoderResult<()> {
        if image.width() == 0 || image.height() == 0 {
            return Err(EncodingError::InvalidDimensions {
                width: image.width(),
                height: image.height(),
            });
        }

        image.validate()?;

        self.encode_image_internal::<_, DefaultOperations>(image)
    }

    fn encode_image_internal<I: ImageBuffer, OP: Operations>(
        mut self,
        image: I,
    ) -> EncoderResult<()> {
        let color = image.get_jpeg_color_type();
        self.init_components(color);

        debug!(
            "Encoding {}x{} {:?} image, quality {}, sampling {:?}",
            image.width(),
            image.height(),
            color,
            self.quality,
            self.sampling_factor
        );

        let q_tables = [
            QuantizationTable::new_with_quality(&self.quantization_tables[0], self.quality, true),
            QuantizationTable::new_with_quality(&self.quantization_tables[1], self.quality, false),
        ];

        self.write_headers(&image, color, &q_tables)?;

        self.encode_mcus::<_, OP>(&image, &q_tables)?;

        self.writer.finalize_bit_buffer()?;
        self.writer.write_marker(Marker::EOI)?;

        self.writer.flush()
    }

    fn init_components(&mut self, color: JpegColorType) {
        self.components.clear();

        match color {
            JpegColorType::Luma => {
                add_component!(self.components, 1, 0, 1, 1);
            }
            JpegColorType::Ycbcr => {
                let (horizontal_sampling_factor, vertical_sampling_factor) =
                    self.sampling_factor.get_sampling_factors();

                add_component!(
                    self.components,
                    1,
                    0,
                    horizontal_sampling_factor,
                    vertical_sampling_factor
                );
                add_component!(self.components, 2, 1, 1, 1);
                add_component!(self.components, 3, 1, 1, 1);
            }
        }

        debug_assert_eq!(self.components.len(), color.get_num_components());
    }

    fn get_max_sampling_size(&self) -> (u8, u8) {
        let max_h_sampling = self.components.iter().fold(1, |value, component| {
            value.max(component.horizontal_sampling_factor)
        });

        let max_v_sampling = self.components.iter().fold(1, |value, component| {
            value.max(component.vertical_sampling_factor)
        });

        (max_h_sampling, max_v_sampling)
    }

    fn write_headers<I: ImageBuffer>(
        &mut self,
        image: &I,
        color: JpegColorType,
        q_tables: &[QuantizationTable; 2],
    ) -> EncoderResult<()> {
        self.writer.write_marker(Marker::SOI)?;
        self.writer.write_header(&self.density)?;

        if let Some(comment) = &self.comment {
            self.writer.write_comment(comment)?;
        }

        let num_tables = match color {
            JpegColorType::Luma => 1,
            JpegColorType::Ycbcr => 2,
        };

        for (i, table) in q_tables.iter().enumerate().take(num_tables) {
            self.writer.write_quantization_segment(i as u8, table)?;
        }

        self.writer
            .write_frame_header(image.width(), image.height(), &self.components)?;

        for (i, (dc_table, ac_table)) in self.huffman_tables.iter().enumerate().take(num_tables) {
            self.writer
                .write_huffman_segment(CodingClass::Dc, i as u8, dc_table)?;
            self.writer
                .write_huffman_segment(CodingClass::Ac, i as u8, ac_table)?;
        }

        self.writer.write_scan_header(&self.components)
    }

    fn encode_mcus<I: ImageBuffer, OP: Operations>(
        &mut self,
        image: &I,
        q_tables: &[QuantizationTable; 2],
    ) -> EncoderResult<()> {
        let (max_h_sampling, max_v_sampling) = self.get_max_sampling_size();
        let layout = McuLayout::new(image.width(), image.height(), max_h_sampling, max_v_sampling);
        let stride = layout.padded_width();

        let mut rows = RowBuffer::new(&layout, self.components.len());

        let mut prev_dc = [0i16; 3];
        let mut samples = [0f32; 64];
        let mut coefficients = [0i16; 64];

        for mcu_y in 0..layout.mcus_y {
            trace!("MCU row {}/{}", mcu_y + 1, layout.mcus_y);

            rows.fill(image, &layout, mcu_y);

            for mcu_x in 0..layout.mcus_x {
                for (i, component) in self.components.iter().enumerate() {
                    let h = usize::from(component.horizontal_sampling_factor);
                    let v = usize::from(component.vertical_sampling_factor);

                    let step_x = layout.max_h_sampling / h;
                    let step_y = layout.max_v_sampling / v;

                    let q_table = &q_tables[usize::from(component.quantization_table)];
                    let dc_table = &self.huffman_tables[usize::from(component.dc_huffman_table)].0;
                    let ac_table = &self.huffman_tables[usize::from(component.ac_huffman_table)].1;

                    for block_y in 0..v {
                        for block_x in 0..h {
                            let x0 = mcu_x * layout.mcu_width() + block_x * 8 * step_x;
                            let y0 = block_y * 8 * step_y;

                            extract_block(
                                rows.component(i),
                                stride,
                                x0,
                                y0,
                                step_x,
                                step_y,
                                &mut samples,
                            );

                            OP::fdct(&mut samples);
                            OP::quantize_block(&samples, &mut coefficients, q_table);

                            self.writer
                                .write_block(&coefficients, prev_dc[i], dc_table, ac_table)?;

                            prev_dc[i] = coefficients[0];
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(feature = "std")]
impl Encoder<BufWriter<File>> {
    /// Create a new encoder that writes into a file
    ///
    /// See [new](Encoder::new) for further information.
    ///
    /// # Errors
    ///
    /// Returns an `IoError(std::io::Error)` if the file can't be created
    pub fn new_file<P: AsRef<Path>>(
        path: P,
        quality: u8,
    ) -> Result<Encoder<BufWriter<File>>, EncodingError> {
        let file = File::create(path)?;
        let buf = BufWriter::new(file);
        Ok(Self::new(buf, quality))
    }
}

pub(crate) trait Operations {
    #[inline(always)]
    fn fdct(data: &mut [f32; 64]) {
        fdct(data);
    }

    /// Quantize a scaled DCT block and store it in zigzag order
    #[inline(always)]
    fn quantize_block(block: &[f32; 64], q_block: &mut [i16; 64], table: &QuantizationTable) {
        for (i, &z) in ZIGZAG.iter().enumerate() {
            let z = usize::from(z);
            q_block[i] = table.quantize(block[z], z);
        }
    }
}

pub(crate) struct DefaultOperations;

impl Operations for DefaultOperations {}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use super::{DefaultOperations, Operations};
    use crate::quantization::QuantizationTable;
    use crate::{ColorType, Encoder, EncoderSettings, EncodingError, SamplingFactor};

    #[test]
    fn test_sampling_factors() {
        assert_eq!(SamplingFactor::R_4_4_4.get_sampling_factors(), (1, 1));
        assert_eq!(SamplingFactor::R_4_2_0.get_sampling_factors(), (2, 2));
    }

    #[test]
    fn test_default_sampling_depends_on_quality() {
        let mut out = Vec::new();
        assert_eq!(
            Encoder::new(&mut out, 75).sampling_factor(),
            SamplingFactor::R_4_2_0
        );
        assert_eq!(
            Encoder::new(&mut out, 90).sampling_factor(),
            SamplingFactor::R_4_4_4
        );
    }

    #[test]
    fn test_quality_is_clamped() {
        let mut out = Vec::new();
        assert_eq!(Encoder::new(&mut out, 0).quality(), 1);
        assert_eq!(Encoder::new(&mut out, 250).quality(), 100);

        let mut encoder = Encoder::new(&mut out, 50);
        encoder.set_quality(101);
        assert_eq!(encoder.quality(), 100);
    }

    #[test]
    fn test_comment_too_large() {
        let mut out = Vec::new();
        let mut encoder = Encoder::new(&mut out, 90);

        let text = "x".repeat(65534);
        assert!(matches!(
            encoder.set_comment(&text),
            Err(EncodingError::CommentTooLarge(65534))
        ));
        assert!(encoder.comment().is_none());

        encoder.set_comment(&text[1..]).unwrap();
        assert_eq!(encoder.comment().map(|c| c.len()), Some(65533));
    }

    #[test]
    fn test_with_settings() {
        let mut settings = EncoderSettings::new(60);
        settings.sampling_factor = SamplingFactor::R_4_4_4;
        settings.comment = Some("frames".into());

        let mut out = Vec::new();
        let encoder = Encoder::with_settings(&mut out, &settings).unwrap();

        assert_eq!(encoder.quality(), 60);
        assert_eq!(encoder.sampling_factor(), SamplingFactor::R_4_4_4);
        assert_eq!(encoder.comment(), Some(&b"frames"[..]));
    }

    #[test]
    fn test_validation_writes_nothing() {
        let mut out = Vec::new();
        let result = Encoder::new(&mut out, 90).encode(&[], 0, 8, ColorType::Luma);
        assert!(matches!(
            result,
            Err(EncodingError::InvalidDimensions {
                width: 0,
                height: 8
            })
        ));
        assert!(out.is_empty());

        let data = vec![0u8; 8 * 8 * 3 - 1];
        let result = Encoder::new(&mut out, 90).encode(&data, 8, 8, ColorType::Rgb);
        assert!(matches!(
            result,
            Err(EncodingError::BadImageData {
                length: 191,
                required: 192
            })
        ));
        assert!(out.is_empty());
    }

    #[test]
    fn test_flat_block_quantizes_to_dc_only() {
        let table = QuantizationTable::default_luma(90);

        let mut samples = [100f32 - 128.0; 64];
        let mut coefficients = [0i16; 64];

        DefaultOperations::fdct(&mut samples);
        DefaultOperations::quantize_block(&samples, &mut coefficients, &table);

        // DC of a flat block is 8 * (v - 128) normalized, q = 3 at quality 90
        assert_eq!(coefficients[0], -75);
        assert!(coefficients[1..].iter().all(|&c| c == 0));
    }
}
