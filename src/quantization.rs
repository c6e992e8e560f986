use alloc::boxed::Box;
use core::num::NonZeroU16;

use crate::fdct::AAN_SCALE_FACTORS;

/// # Quantization table used for encoding
///
/// The base table is scaled by the quality setting in the usual libjpeg way.
#[derive(Debug, Clone)]
pub enum QuantizationTableType {
    /// Sample quantization tables given in Annex K (Clause K.1) of Recommendation ITU-T T.81 (1992) | ISO/IEC 10918-1:1994.
    Default,

    /// Flat
    Flat,

    /// A user supplied base table in natural (row-major) order
    Custom(Box<[u16; 64]>),
}

impl QuantizationTableType {
    fn base_table(&self, luma: bool) -> &[u16; 64] {
        use QuantizationTableType::*;

        match self {
            Default if luma => &DEFAULT_LUMA_TABLE,
            Default => &DEFAULT_CHROMA_TABLE,
            Flat => &FLAT_TABLE,
            Custom(table) => table,
        }
    }
}

static DEFAULT_LUMA_TABLE: [u16; 64] = [
    16, 11, 10, 16, 24, 40, 51, 61, //
    12, 12, 14, 19, 26, 58, 60, 55, //
    14, 13, 16, 24, 40, 57, 69, 56, //
    14, 17, 22, 29, 51, 87, 80, 62, //
    18, 22, 37, 56, 68, 109, 103, 77, //
    24, 35, 55, 64, 81, 104, 113, 92, //
    49, 64, 78, 87, 103, 121, 120, 101, //
    72, 92, 95, 98, 112, 100, 103, 99,
];

static DEFAULT_CHROMA_TABLE: [u16; 64] = [
    17, 18, 24, 47, 99, 99, 99, 99, //
    18, 21, 26, 66, 99, 99, 99, 99, //
    24, 26, 56, 99, 99, 99, 99, 99, //
    47, 66, 99, 99, 99, 99, 99, 99, //
    99, 99, 99, 99, 99, 99, 99, 99, //
    99, 99, 99, 99, 99, 99, 99, 99, //
    99, 99, 99, 99, 99, 99, 99, 99, //
    99, 99, 99, 99, 99, 99, 99, 99,
];

static FLAT_TABLE: [u16; 64] = [16; 64];

/// Quantization table for one component class
///
/// Stores the baseline table (natural order, every entry in 1..=255) and the
/// per-position multipliers that fold the AAN basis scaling of [fdct](crate::fdct::fdct)
/// into the quantization step.
pub struct QuantizationTable {
    table: [NonZeroU16; 64],
    scales: [f32; 64],
}

impl QuantizationTable {
    /// Creates a table from a base table type and a quality in 1..=100.
    ///
    /// Values outside of this range are clamped.
    pub fn new_with_quality(
        table: &QuantizationTableType,
        quality: u8,
        luma: bool,
    ) -> QuantizationTable {
        let table = get_with_quality(table.base_table(luma), quality);

        let mut scales = [0f32; 64];
        for (i, scale) in scales.iter_mut().enumerate() {
            let row = AAN_SCALE_FACTORS[i / 8];
            let col = AAN_SCALE_FACTORS[i % 8];
            *scale = 1.0 / (row * col * 8.0 * f32::from(table[i].get()));
        }

        QuantizationTable { table, scales }
    }

    pub fn default_luma(quality: u8) -> QuantizationTable {
        QuantizationTable::new_with_quality(&QuantizationTableType::Default, quality, true)
    }

    pub fn default_chroma(quality: u8) -> QuantizationTable {
        QuantizationTable::new_with_quality(&QuantizationTableType::Default, quality, false)
    }

    /// Table entry in natural order
    #[inline]
    pub fn get(&self, index: usize) -> u8 {
        // Entries are clamped to 1..=255 on construction
        self.table[index].get() as u8
    }

    /// Quantize one coefficient of the scaled DCT output at natural position `index`
    #[inline]
    pub fn quantize(&self, value: f32, index: usize) -> i16 {
        let value = value * self.scales[index];

        // Round half away from zero, f32::round needs std
        if value >= 0.0 {
            (value + 0.5) as i16
        } else {
            (value - 0.5) as i16
        }
    }
}

/// Libjpeg quality scaling
pub(crate) fn quality_scale_factor(quality: u8) -> u32 {
    let quality = u32::from(quality.clamp(1, 100));

    if quality < 50 {
        5000 / quality
    } else {
        200 - quality * 2
    }
}

fn get_with_quality(table: &[u16; 64], quality: u8) -> [NonZeroU16; 64] {
    let scale = quality_scale_factor(quality);

    let mut q_table = [NonZeroU16::MIN; 64];

    for (i, &v) in table.iter().enumerate() {
        let v = (u32::from(v) * scale + 50) / 100;
        let v = v.clamp(1, 255) as u16;

        // Clamped to at least 1 above
        q_table[i] = NonZeroU16::new(v).unwrap_or(NonZeroU16::MIN);
    }

    q_table
}
