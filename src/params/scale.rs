//! Conversions from a normalized 0..1 parameter into engineering units.

/*
Parameter Scaling
=================

Every parameter lives in the store as a normalized float between 0.0 and 1.0.
Each DSP module decides what that number means by pushing it through one of
four curves:

  integer     Round to the nearest step inside [min, max]. Used for enums
              (waveform, filter mode) and semitone/octave offsets.

                  to_int(0.5, -2, 2)  →  0

  linear      Straight interpolation. Used for pulse width, depths.

                  min + (max - min) * norm

  exponential Equal ratios per equal step. Cutoff frequencies feel "even"
              across the knob this way.

                  min * (max / min) ^ norm

  power       Polynomial bend. Envelope times use exponent 1.5 so the bottom
              of the knob has more resolution for snappy settings.

                  min + (max - min) * norm ^ exp

    value
      max ┤                    ╭ exponential
          │                 ╭──╯
          │            ╭────╯   ╱ linear
          │       ╭────╯     ╱
          │  ╭────╯       ╱
      min ┼──────────────────→ norm
          0                  1
*/

/// Round a normalized value onto the integer range `[min, max]`.
#[inline]
pub fn to_int(norm: f32, min: i32, max: i32) -> i32 {
    (norm * (max - min) as f32 + 0.5) as i32 + min
}

#[inline]
pub fn to_linear(norm: f32, min: f32, max: f32) -> f32 {
    min + (max - min) * norm
}

/// Exponential mapping. `min` must be positive.
#[inline]
pub fn to_exp(norm: f32, min: f32, max: f32) -> f32 {
    min * (max / min).powf(norm)
}

#[inline]
pub fn to_power(norm: f32, min: f32, max: f32, exp: f32) -> f32 {
    min + (max - min) * norm.powf(exp)
}

/// Interpret a normalized value as a switch.
#[inline]
pub fn to_bool(norm: f32) -> bool {
    norm >= 0.5
}

/// Encode an enum ordinal as the 7-bit value a controller would send.
#[inline]
pub const fn enum_to_midi(value: u8, max: u8) -> u8 {
    ((value as u16 * 127) / max as u16) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_mapping_rounds_to_nearest_step() {
        assert_eq!(to_int(0.0, -2, 2), -2);
        assert_eq!(to_int(0.5, -2, 2), 0);
        assert_eq!(to_int(1.0, -2, 2), 2);
        // 64/127 sits just above the centre
        assert_eq!(to_int(64.0 / 127.0, -12, 12), 0);
    }

    #[test]
    fn enum_encoding_round_trips_through_integer_mapping() {
        for value in 0..=5u8 {
            let norm = enum_to_midi(value, 5) as f32 / 127.0;
            assert_eq!(to_int(norm, 0, 5), value as i32, "ordinal {value}");
        }
    }

    #[test]
    fn exponential_mapping_hits_endpoints() {
        assert!((to_exp(0.0, 80.0, 18_000.0) - 80.0).abs() < 1e-3);
        assert!((to_exp(1.0, 80.0, 18_000.0) - 18_000.0).abs() < 1.0);
        let mid = to_exp(0.5, 80.0, 18_000.0);
        assert!((mid - (80.0f32 * 18_000.0).sqrt()).abs() < 1.0, "got {mid}");
    }

    #[test]
    fn power_mapping_favours_low_end() {
        let lin = to_linear(0.25, 1.0, 10_000.0);
        let pow = to_power(0.25, 1.0, 10_000.0, 1.5);
        assert!(pow < lin, "power curve should sit below linear, got {pow}");
    }
}
