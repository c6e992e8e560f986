/*
 * Floating point forward DCT after the Independent JPEG Group's jfdctflt.c
 *
 * This file was part of the Independent JPEG Group's software:
 * Copyright (C) 1994-1996, Thomas G. Lane.
 * Modified 2003-2009 by Guido Vollbeding.
 *
 * This software is based in part on the work of the Independent JPEG Group.
 * See the IJG README for the full conditions of distribution and use.
 *
 * This implementation is based on Arai, Agui, and Nakajima's algorithm for
 * scaled DCT.  Their original paper (Trans. IEICE E-71(11):1095) is in
 * Japanese, but the algorithm is described in the Pennebaker & Mitchell
 * JPEG textbook (see REFERENCES section in file README).  The following code
 * is based directly on figure 4-8 in P&M.
 * While an 8-point DCT cannot be done in less than 11 multiplies, it is
 * possible to arrange the computation so that many of the multiplies are
 * simple scalings of the final outputs.  These multiplies can then be
 * folded into the multiplications or divisions by the JPEG quantization
 * table entries.  The AA&N method leaves only 5 multiplies and 29 adds
 * to be done in the DCT itself.
 */

/// Per-frequency output scaling of [fdct].
///
/// Coefficient `(u, v)` of [fdct] equals the normalized DCT coefficient times
/// `AAN_SCALE_FACTORS[u] * AAN_SCALE_FACTORS[v] * 8`, where
/// `AAN_SCALE_FACTORS[0] = 1` and `AAN_SCALE_FACTORS[k] = cos(k*PI/16) * sqrt(2)`.
pub const AAN_SCALE_FACTORS: [f32; 8] = [
    1.0,
    1.387_039_845,
    1.306_562_965,
    1.175_875_602,
    1.0,
    0.785_694_958,
    0.541_196_100,
    0.275_899_379,
];

const FIX_0_382683433: f32 = 0.382_683_433;
const FIX_0_541196100: f32 = 0.541_196_100;
const FIX_0_707106781: f32 = 0.707_106_781;
const FIX_1_306562965: f32 = 1.306_562_965;

const DCT_SIZE: usize = 8;

/// One 8-point AAN pass over the samples `data[start + k * step]`, k in 0..8
#[inline(always)]
fn dct_1d(data: &mut [f32; 64], start: usize, step: usize) {
    let at = |k: usize| start + k * step;

    let tmp0 = data[at(0)] + data[at(7)];
    let tmp7 = data[at(0)] - data[at(7)];
    let tmp1 = data[at(1)] + data[at(6)];
    let tmp6 = data[at(1)] - data[at(6)];
    let tmp2 = data[at(2)] + data[at(5)];
    let tmp5 = data[at(2)] - data[at(5)];
    let tmp3 = data[at(3)] + data[at(4)];
    let tmp4 = data[at(3)] - data[at(4)];

    /* Even part */

    let tmp10 = tmp0 + tmp3;
    let tmp13 = tmp0 - tmp3;
    let tmp11 = tmp1 + tmp2;
    let tmp12 = tmp1 - tmp2;

    data[at(0)] = tmp10 + tmp11;
    data[at(4)] = tmp10 - tmp11;

    let z1 = (tmp12 + tmp13) * FIX_0_707106781; /* c4 */
    data[at(2)] = tmp13 + z1;
    data[at(6)] = tmp13 - z1;

    /* Odd part */

    let tmp10 = tmp4 + tmp5;
    let tmp11 = tmp5 + tmp6;
    let tmp12 = tmp6 + tmp7;

    /* The rotator is modified from fig 4-8 to avoid extra negations. */
    let z5 = (tmp10 - tmp12) * FIX_0_382683433; /* c6 */
    let z2 = FIX_0_541196100 * tmp10 + z5; /* c2-c6 */
    let z4 = FIX_1_306562965 * tmp12 + z5; /* c2+c6 */
    let z3 = tmp11 * FIX_0_707106781; /* c4 */

    let z11 = tmp7 + z3;
    let z13 = tmp7 - z3;

    data[at(5)] = z13 + z2;
    data[at(3)] = z13 - z2;
    data[at(1)] = z11 + z4;
    data[at(7)] = z11 - z4;
}

/// Scaled forward DCT of a level shifted 8x8 block in natural order.
///
/// The output is NOT normalized, see [AAN_SCALE_FACTORS]. It has to be paired with
/// [QuantizationTable](crate::quantization::QuantizationTable) which divides the
/// scaling out again.
pub fn fdct(data: &mut [f32; 64]) {
    /* Pass 1: process rows. */
    for y in 0..DCT_SIZE {
        dct_1d(data, y * DCT_SIZE, 1);
    }

    /* Pass 2: process columns. */
    for x in 0..DCT_SIZE {
        dct_1d(data, x, DCT_SIZE);
    }
}

/// Direct evaluation of the normalized 2-D DCT-II definition.
///
/// Far too slow for encoding; used to check [fdct].
#[cfg(all(feature = "std", any(test, feature = "benchmark")))]
pub fn reference_fdct(input: &[f32; 64]) -> [f32; 64] {
    use core::f64::consts::{FRAC_1_SQRT_2, PI};

    let c = |k: usize| if k == 0 { FRAC_1_SQRT_2 } else { 1.0 };

    let mut output = [0f32; 64];

    for u in 0..DCT_SIZE {
        for v in 0..DCT_SIZE {
            let mut sum = 0f64;

            for y in 0..DCT_SIZE {
                for x in 0..DCT_SIZE {
                    sum += f64::from(input[y * DCT_SIZE + x])
                        * (PI * (2 * y + 1) as f64 * u as f64 / 16.0).cos()
                        * (PI * (2 * x + 1) as f64 * v as f64 / 16.0).cos();
                }
            }

            output[u * DCT_SIZE + v] = (0.25 * c(u) * c(v) * sum) as f32;
        }
    }

    output
}
