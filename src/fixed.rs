//! Q16 fixed-point conversions between the wire format and the working format

/// One unit in Q16 fixed point (real value × 65536)
pub const Q16_ONE: i32 = 65536;

/// 1 g (9.80665 m/s²) expressed in Q16
pub const ACC_1G_IN_Q16: i32 = 642689;

/// Accelerometer device-native counts per 1 g
const ACC_DEVICE_PER_G: i64 = 720;

/// Convert a float value to Q16 fixed point, truncating toward zero
pub fn to_q16(value: f32) -> i32 {
    (value * 65536.0) as i32
}

/// Convert a Q16 fixed-point value to float
pub fn from_q16(value: i32) -> f32 {
    value as f32 / 65536.0
}

/// Convert an accelerometer reading from device-native units to SI (m/s²) Q16
///
/// The multiply happens before the divide, in a widened intermediate, so the
/// truncation matches the reference integer math bit-for-bit.
pub fn acc_device_to_q16(value: i32) -> i32 {
    ((value as i64 * ACC_1G_IN_Q16 as i64) / ACC_DEVICE_PER_G) as i32
}

/// Convert an accelerometer reading from SI (m/s²) Q16 to device-native units
pub fn acc_q16_to_device(value: i32) -> i32 {
    ((value as i64 * ACC_DEVICE_PER_G) / ACC_1G_IN_Q16 as i64) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_q16_round_trip() {
        // Representable values survive the round trip within one unit of resolution
        for &value in &[0.0f32, 1.0, -1.0, 1.526, 9.80665, -45.5, 359.99] {
            let fixed = to_q16(value);
            let restored = from_q16(fixed);
            assert!(
                (restored - value).abs() <= 1.0 / 65536.0,
                "round trip failed for {}: got {}",
                value,
                restored
            );
        }
    }

    #[test]
    fn test_q16_truncates_toward_zero() {
        assert_eq!(to_q16(1.0), 65536);
        assert_eq!(to_q16(-1.0), -65536);
        // 0.5 / 65536 truncates to 0 extra bits in either direction
        assert_eq!(to_q16(1.0 + 0.4 / 65536.0), 65536);
        assert_eq!(to_q16(-1.0 - 0.4 / 65536.0), -65536);
    }

    #[test]
    fn test_one_g_constant() {
        // 9.80665 × 65536 = 642711.1, the reference constant truncates earlier
        // in its derivation; the conversion pair must agree with it exactly.
        assert_eq!(acc_device_to_q16(720), ACC_1G_IN_Q16);
        assert_eq!(acc_q16_to_device(ACC_1G_IN_Q16), 720);
    }

    #[test]
    fn test_acc_conversion_truncation_order() {
        // Multiply-before-divide: 100 × 642689 / 720 = 89262 (truncated),
        // whereas divide-first would lose the fraction entirely.
        assert_eq!(acc_device_to_q16(100), 89262);
        assert_eq!(acc_device_to_q16(-100), -89262);
    }

    #[test]
    fn test_acc_conversion_no_overflow() {
        // 16 g in device units exceeds the old 32-bit intermediate; the
        // widened multiply must still produce the truncated quotient.
        let sixteen_g = 720 * 16;
        assert_eq!(acc_device_to_q16(sixteen_g), ACC_1G_IN_Q16 * 16);
    }
}
