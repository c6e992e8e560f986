use crate::encoder::Component;
use crate::huffman::{CodingClass, HuffmanTable};
use crate::marker::Marker;
use crate::quantization::QuantizationTable;
use crate::{Density, EncodingError};

use byteorder::{BigEndian, ByteOrder};

/// Zigzag scan order: `ZIGZAG[i]` is the natural (row-major) index of the i-th coefficient
pub static ZIGZAG: [u8; 64] = [
    0, 1, 8, 16, 9, 2, 3, 10, 17, 24, 32, 25, 18, 11, 4, 5, 12, 19, 26, 33, 40, 48, 41, 34, 27,
    20, 13, 6, 7, 14, 21, 28, 35, 42, 49, 56, 57, 50, 43, 36, 29, 22, 15, 23, 30, 37, 44, 51, 58,
    59, 52, 45, 38, 31, 39, 46, 53, 60, 61, 54, 47, 55, 62, 63,
];

/// Reorder a block from natural into zigzag order
pub fn zigzag<T: Copy + Default>(block: &[T; 64]) -> [T; 64] {
    let mut out = [T::default(); 64];
    for (i, &z) in ZIGZAG.iter().enumerate() {
        out[i] = block[usize::from(z)];
    }
    out
}

/// Reorder a block from zigzag back into natural order
pub fn unzigzag<T: Copy + Default>(block: &[T; 64]) -> [T; 64] {
    let mut out = [T::default(); 64];
    for (i, &z) in ZIGZAG.iter().enumerate() {
        out[usize::from(z)] = block[i];
    }
    out
}

// Largest magnitude categories allowed in baseline coding
const MAX_DC_BITS: u8 = 11;
const MAX_AC_BITS: u8 = 10;

const EOB: u8 = 0x00;
const ZRL: u8 = 0xF0;

/// A no_std alternative for `std::io::Write`
///
/// An implementation of a subset of `std::io::Write` necessary to use the encoder without `std`.
/// This trait is implemented for `std::io::Write` if the `std` feature is enabled.
pub trait JfifWrite {
    /// Writes the whole buffer. The behavior must be identical to std::io::Write::write_all
    /// # Errors
    ///
    /// Return an error if the data can't be written
    fn write_all(&mut self, buf: &[u8]) -> Result<(), EncodingError>;

    /// Flush buffered data, called once after the EOI marker
    ///
    /// # Errors
    ///
    /// Return an error if the buffered data can't be written
    fn flush(&mut self) -> Result<(), EncodingError> {
        Ok(())
    }
}

#[cfg(not(feature = "std"))]
impl<W: JfifWrite + ?Sized> JfifWrite for &mut W {
    fn write_all(&mut self, buf: &[u8]) -> Result<(), EncodingError> {
        (**self).write_all(buf)
    }

    fn flush(&mut self) -> Result<(), EncodingError> {
        (**self).flush()
    }
}

#[cfg(not(feature = "std"))]
impl JfifWrite for alloc::vec::Vec<u8> {
    fn write_all(&mut self, buf: &[u8]) -> Result<(), EncodingError> {
        self.extend_from_slice(buf);
        Ok(())
    }
}

#[cfg(feature = "std")]
impl<W: std::io::Write + ?Sized> JfifWrite for W {
    #[inline(always)]
    fn write_all(&mut self, buf: &[u8]) -> Result<(), EncodingError> {
        std::io::Write::write_all(self, buf)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), EncodingError> {
        std::io::Write::flush(self)?;
        Ok(())
    }
}

/// Writes the container segments and the byte stuffed entropy coded data
pub(crate) struct JfifWriter<W: JfifWrite> {
    w: W,
    bit_buffer: u32,
    pending_bits: u8,
}

impl<W: JfifWrite> JfifWriter<W> {
    pub fn new(w: W) -> Self {
        JfifWriter {
            w,
            bit_buffer: 0,
            pending_bits: 0,
        }
    }

    #[inline(always)]
    pub fn write(&mut self, buf: &[u8]) -> Result<(), EncodingError> {
        self.w.write_all(buf)
    }

    #[inline(always)]
    pub fn write_u8(&mut self, value: u8) -> Result<(), EncodingError> {
        self.w.write_all(&[value])
    }

    pub fn flush(&mut self) -> Result<(), EncodingError> {
        self.w.flush()
    }

    pub fn write_u16(&mut self, value: u16) -> Result<(), EncodingError> {
        let mut buf = [0u8; 2];
        BigEndian::write_u16(&mut buf, value);
        self.w.write_all(&buf)
    }

    /// Append up to 16 bits, emitting every completed byte
    pub fn write_bits(&mut self, value: u32, size: u8) -> Result<(), EncodingError> {
        debug_assert!(size <= 16);
        debug_assert!(size == 16 || value < (1 << size));

        if size == 0 {
            return Ok(());
        }

        self.bit_buffer = (self.bit_buffer << size) | value;
        self.pending_bits += size;

        while self.pending_bits >= 8 {
            self.pending_bits -= 8;
            let byte = (self.bit_buffer >> self.pending_bits) as u8;

            if byte == 0xFF {
                // A literal 0xFF must not be mistaken for a marker
                self.w.write_all(&[0xFF, 0x00])?;
            } else {
                self.w.write_all(&[byte])?;
            }
        }

        self.bit_buffer &= (1 << self.pending_bits) - 1;

        Ok(())
    }

    /// Pad the pending bits with 1-bits up to the next byte boundary
    pub fn finalize_bit_buffer(&mut self) -> Result<(), EncodingError> {
        if self.pending_bits > 0 {
            let fill = 8 - self.pending_bits;
            self.write_bits((1 << fill) - 1, fill)?;
        }

        self.bit_buffer = 0;
        self.pending_bits = 0;

        Ok(())
    }

    #[inline]
    fn huffman_encode(&mut self, symbol: u8, table: &HuffmanTable) -> Result<(), EncodingError> {
        let &(size, code) = table.get_for_value(symbol);
        debug_assert!(size > 0, "Missing Huffman code for symbol {:#04x}", symbol);
        self.write_bits(u32::from(code), size)
    }

    #[inline]
    fn huffman_encode_value(
        &mut self,
        size: u8,
        symbol: u8,
        value: u16,
        table: &HuffmanTable,
    ) -> Result<(), EncodingError> {
        self.huffman_encode(symbol, table)?;
        self.write_bits(u32::from(value), size)
    }

    /// Encode one quantized block given in zigzag order
    ///
    /// The DC term is coded as difference to `prev_dc`, the AC terms as run/size symbols
    /// terminated by an end-of-block symbol unless the last coefficient is nonzero.
    pub fn write_block(
        &mut self,
        block: &[i16; 64],
        prev_dc: i16,
        dc_table: &HuffmanTable,
        ac_table: &HuffmanTable,
    ) -> Result<(), EncodingError> {
        self.write_dc(i32::from(block[0]) - i32::from(prev_dc), dc_table)?;
        self.write_ac_block(block, ac_table)
    }

    pub fn write_dc(&mut self, diff: i32, table: &HuffmanTable) -> Result<(), EncodingError> {
        let (size, value) = get_code(diff, MAX_DC_BITS)?;
        self.huffman_encode_value(size, size, value, table)
    }

    fn write_ac_block(&mut self, block: &[i16; 64], table: &HuffmanTable) -> Result<(), EncodingError> {
        let mut zero_run = 0u8;

        for &value in &block[1..] {
            if value == 0 {
                zero_run += 1;
            } else {
                while zero_run > 15 {
                    self.huffman_encode(ZRL, table)?;
                    zero_run -= 16;
                }

                let (size, value) = get_code(i32::from(value), MAX_AC_BITS)?;
                let symbol = (zero_run << 4) | size;

                self.huffman_encode_value(size, symbol, value, table)?;

                zero_run = 0;
            }
        }

        if zero_run > 0 {
            self.huffman_encode(EOB, table)?;
        }

        Ok(())
    }

    pub fn write_marker(&mut self, marker: Marker) -> Result<(), EncodingError> {
        self.write(&[0xFF, marker.into()])
    }

    pub fn write_segment(&mut self, marker: Marker, data: &[u8]) -> Result<(), EncodingError> {
        self.write_marker(marker)?;
        self.write_u16(data.len() as u16 + 2)?;
        self.write(data)?;

        Ok(())
    }

    pub fn write_header(&mut self, density: &Density) -> Result<(), EncodingError> {
        self.write_marker(Marker::APP(0))?;
        self.write_u16(16)?;

        self.write(b"JFIF\0")?;
        self.write(&[0x01, 0x01])?;

        match *density {
            Density::None => {
                self.write_u8(0x00)?;
                self.write_u16(1)?;
                self.write_u16(1)?;
            }
            Density::Inch { x, y } => {
                self.write_u8(0x01)?;
                self.write_u16(x)?;
                self.write_u16(y)?;
            }
            Density::Centimeter { x, y } => {
                self.write_u8(0x02)?;
                self.write_u16(x)?;
                self.write_u16(y)?;
            }
        }

        // No thumbnail
        self.write(&[0x00, 0x00])
    }

    pub fn write_comment(&mut self, comment: &[u8]) -> Result<(), EncodingError> {
        self.write_segment(Marker::COM, comment)
    }

    /// Write a DQT segment. Tables are stored in zigzag order.
    pub fn write_quantization_segment(
        &mut self,
        destination: u8,
        table: &QuantizationTable,
    ) -> Result<(), EncodingError> {
        debug_assert!(destination < 4, "Bad destination: {}", destination);

        self.write_marker(Marker::DQT)?;
        self.write_u16(2 + 1 + 64)?;

        // 8 bit precision in the high nibble
        self.write_u8(destination)?;

        for &z in ZIGZAG.iter() {
            self.write_u8(table.get(usize::from(z)))?;
        }

        Ok(())
    }

    pub fn write_huffman_segment(
        &mut self,
        class: CodingClass,
        destination: u8,
        table: &HuffmanTable,
    ) -> Result<(), EncodingError> {
        debug_assert!(destination < 4, "Bad destination: {}", destination);

        self.write_marker(Marker::DHT)?;
        self.write_u16(2 + 1 + 16 + table.values().len() as u16)?;

        self.write_u8(((class as u8) << 4) | destination)?;
        self.write(table.length())?;
        self.write(table.values())?;

        Ok(())
    }

    pub fn write_frame_header(
        &mut self,
        width: u16,
        height: u16,
        components: &[Component],
    ) -> Result<(), EncodingError> {
        self.write_marker(Marker::SOF0)?;
        self.write_u16(2 + 1 + 2 + 2 + 1 + (components.len() as u16) * 3)?;

        // Sample precision
        self.write_u8(8)?;

        self.write_u16(height)?;
        self.write_u16(width)?;

        self.write_u8(components.len() as u8)?;

        for component in components {
            self.write_u8(component.id)?;
            self.write_u8(
                (component.horizontal_sampling_factor << 4) | component.vertical_sampling_factor,
            )?;
            self.write_u8(component.quantization_table)?;
        }

        Ok(())
    }

    pub fn write_scan_header(&mut self, components: &[Component]) -> Result<(), EncodingError> {
        self.write_marker(Marker::SOS)?;
        self.write_u16(2 + 1 + (components.len() as u16) * 2 + 3)?;

        self.write_u8(components.len() as u8)?;

        for component in components {
            self.write_u8(component.id)?;
            self.write_u8((component.dc_huffman_table << 4) | component.ac_huffman_table)?;
        }

        // Spectral selection 0..63, no successive approximation
        self.write(&[0, 63, 0])
    }
}

/// Magnitude category and the raw bits of a value
///
/// Negative values are coded as `2^size - 1 + value`.
pub(crate) fn get_code(value: i32, max_bits: u8) -> Result<(u8, u16), EncodingError> {
    let size = (32 - value.unsigned_abs().leading_zeros()) as u8;

    if size > max_bits {
        return Err(EncodingError::CoefficientOutOfRange { value, max_bits });
    }

    let bits = if value < 0 { value - 1 } else { value };
    let mask = (1i32 << size) - 1;

    Ok((size, (bits & mask) as u16))
}
