//! Sine wavetable shared by both synthesis paths.

/// One full sine period in Q15: `round(32767 · sin(2πi / 256))`.
///
/// Entry 256 repeats entry 0 so interpolation never wraps the index.
pub static SINE_TABLE: [i16; 257] = [
    0, 804, 1608, 2410, 3212, 4011, 4808, 5602,
    6393, 7179, 7962, 8739, 9512, 10278, 11039, 11793,
    12539, 13279, 14010, 14732, 15446, 16151, 16846, 17530,
    18204, 18868, 19519, 20159, 20787, 21403, 22005, 22594,
    23170, 23731, 24279, 24811, 25329, 25832, 26319, 26790,
    27245, 27683, 28105, 28510, 28898, 29268, 29621, 29956,
    30273, 30571, 30852, 31113, 31356, 31580, 31785, 31971,
    32137, 32285, 32412, 32521, 32609, 32678, 32728, 32757,
    32767, 32757, 32728, 32678, 32609, 32521, 32412, 32285,
    32137, 31971, 31785, 31580, 31356, 31113, 30852, 30571,
    30273, 29956, 29621, 29268, 28898, 28510, 28105, 27683,
    27245, 26790, 26319, 25832, 25329, 24811, 24279, 23731,
    23170, 22594, 22005, 21403, 20787, 20159, 19519, 18868,
    18204, 17530, 16846, 16151, 15446, 14732, 14010, 13279,
    12539, 11793, 11039, 10278, 9512, 8739, 7962, 7179,
    6393, 5602, 4808, 4011, 3212, 2410, 1608, 804,
    0, -804, -1608, -2410, -3212, -4011, -4808, -5602,
    -6393, -7179, -7962, -8739, -9512, -10278, -11039, -11793,
    -12539, -13279, -14010, -14732, -15446, -16151, -16846, -17530,
    -18204, -18868, -19519, -20159, -20787, -21403, -22005, -22594,
    -23170, -23731, -24279, -24811, -25329, -25832, -26319, -26790,
    -27245, -27683, -28105, -28510, -28898, -29268, -29621, -29956,
    -30273, -30571, -30852, -31113, -31356, -31580, -31785, -31971,
    -32137, -32285, -32412, -32521, -32609, -32678, -32728, -32757,
    -32767, -32757, -32728, -32678, -32609, -32521, -32412, -32285,
    -32137, -31971, -31785, -31580, -31356, -31113, -30852, -30571,
    -30273, -29956, -29621, -29268, -28898, -28510, -28105, -27683,
    -27245, -26790, -26319, -25832, -25329, -24811, -24279, -23731,
    -23170, -22594, -22005, -21403, -20787, -20159, -19519, -18868,
    -18204, -17530, -16846, -16151, -15446, -14732, -14010, -13279,
    -12539, -11793, -11039, -10278, -9512, -8739, -7962, -7179,
    -6393, -5602, -4808, -4011, -3212, -2410, -1608, -804,
    0,
];

/// Q15 sine of a 16-bit phase (`0..65536` spans one period).
///
/// The top 8 bits select the table entry, the low 8 bits interpolate.
#[inline]
pub fn sine_q15(phase: u16) -> i16 {
    let index = (phase >> 8) as usize;
    let frac = (phase & 0xFF) as i32;
    let a = SINE_TABLE[index] as i32;
    let b = SINE_TABLE[index + 1] as i32;
    (a + (((b - a) * frac) >> 8)) as i16
}

/// Sine of a 32-bit phase (`0..2^32` spans one period) in `[-1, 1]`.
///
/// Same scheme as [`sine_q15`] with a 16-bit interpolation weight.
#[inline]
pub fn sine_f32(phase: u32) -> f32 {
    let index = (phase >> 24) as usize;
    let scale = ((phase >> 8) & 0xFFFF) as i64;
    let a = SINE_TABLE[index] as i64;
    let b = SINE_TABLE[index + 1] as i64;
    let interpolated = a * (0x10000 - scale) + b * scale;
    interpolated as f32 / (32767.0 * 65536.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_quadrants() {
        assert_eq!(SINE_TABLE[0], 0);
        assert_eq!(SINE_TABLE[64], 32767);
        assert_eq!(SINE_TABLE[128], 0);
        assert_eq!(SINE_TABLE[192], -32767);
        assert_eq!(SINE_TABLE[256], SINE_TABLE[0]);
    }

    #[test]
    fn q15_lookup_matches_table_on_entries() {
        assert_eq!(sine_q15(0), 0);
        assert_eq!(sine_q15(0x4000), 32767);
        assert_eq!(sine_q15(0xC000), -32767);
    }

    #[test]
    fn q15_lookup_interpolates() {
        // Halfway between entries 0 and 1
        assert_eq!(sine_q15(0x0080), 402);
        // Last segment interpolates toward entry 256
        let v = sine_q15(0xFFFF);
        assert!(v < 0 && v > -10, "got {}", v);
    }

    #[test]
    fn f32_lookup_tracks_libm() {
        for i in 0..64u32 {
            let phase = i.wrapping_mul(67_108_864).wrapping_add(12_345_678);
            let angle = phase as f32 / 4_294_967_296.0 * 2.0 * core::f32::consts::PI;
            let err = libm::fabsf(sine_f32(phase) - libm::sinf(angle));
            assert!(err < 1e-3, "phase {}: err {}", phase, err);
        }
    }
}
