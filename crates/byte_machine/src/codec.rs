//! Float and double encoding for the byte stack.
//!
//! Values are stored as their IEEE-754 bit pattern in big-endian order so
//! they travel through the stack exactly like an integer of the same width.
//! No numeric interpretation happens here, so NaN payloads and signed zero
//! survive unchanged.

pub const F32_BYTES: usize = 4;
pub const F64_BYTES: usize = 8;

pub fn serialize_f32(value: f32) -> [u8; F32_BYTES] {
    value.to_bits().to_be_bytes()
}

pub fn deserialize_f32(bytes: [u8; F32_BYTES]) -> f32 {
    f32::from_bits(u32::from_be_bytes(bytes))
}

pub fn serialize_f64(value: f64) -> [u8; F64_BYTES] {
    value.to_bits().to_be_bytes()
}

pub fn deserialize_f64(bytes: [u8; F64_BYTES]) -> f64 {
    f64::from_bits(u64::from_be_bytes(bytes))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_f32_bit_patterns_survive() {
        let patterns = [
            0x0000_0000u32, // +0
            0x8000_0000,    // -0
            0x7F80_0000,    // +inf
            0xFF80_0000,    // -inf
            0x7FC0_0000,    // quiet NaN
            0x7F80_0001,    // signalling NaN
            0xFFC1_2345,    // negative NaN with payload
            0x0000_0001,    // smallest subnormal
            0x3F80_0000,    // 1.0
        ];
        for bits in patterns {
            let value = f32::from_bits(bits);
            let back = deserialize_f32(serialize_f32(value));
            assert_eq!(back.to_bits(), bits);
        }
    }

    #[test]
    fn test_f64_bit_patterns_survive() {
        let patterns = [
            0x0000_0000_0000_0000u64,
            0x8000_0000_0000_0000,
            0x7FF0_0000_0000_0000,
            0xFFF0_0000_0000_0000,
            0x7FF8_0000_0000_0000,
            0x7FF0_0000_0000_0001,
            0xFFF8_DEAD_BEEF_0001,
            0x3FF0_0000_0000_0000,
        ];
        for bits in patterns {
            let value = f64::from_bits(bits);
            let back = deserialize_f64(serialize_f64(value));
            assert_eq!(back.to_bits(), bits);
        }
    }

    #[test]
    fn test_serialized_form_is_big_endian() {
        assert_eq!(serialize_f32(1.0), [0x3F, 0x80, 0x00, 0x00]);
        assert_eq!(
            serialize_f64(-2.0),
            [0xC0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]
        );
        assert_eq!(deserialize_f32([0x40, 0x49, 0x0F, 0xDB]), core::f32::consts::PI);
    }
}
