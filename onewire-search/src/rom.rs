use crate::utils::OneWireCrc;

/// Number of bits in a ROM code.
pub(crate) const ROMCODE_BITS: u8 = 64;

/// The unique 64-bit address of one 1-Wire device.
///
/// Stored as 8 bytes in bus transmission order; bit `i` of the code is bit
/// `i & 7` of byte `i >> 3`, i.e. the least significant bit of byte 0 is the
/// first bit exchanged on the wire.
///
/// | Bit | Description |
/// |-----|-------------|
/// | 0-7 | Family code (e.g., 0x28 for DS18B20) |
/// | 8-55 | Serial number, six bytes |
/// | 56-63 | CRC-8 (`0b1_0001_1001` poly) of the preceding seven bytes |
///
/// Ordering follows the bus discovery order: codes compare bit by bit in
/// transmission order, earliest-exchanged bit most significant, zero before
/// one. That is ascending order of `to_u64().reverse_bits()`, and it is the
/// order the search algorithm yields devices in.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RomCode([u8; 8]);

impl RomCode {
    /// The all-zero ROM code.
    pub const ZERO: RomCode = RomCode([0; 8]);

    /// Builds a ROM code from a family code and a six-byte serial number,
    /// filling in the correct CRC byte.
    pub fn new(family: u8, serial: [u8; 6]) -> Self {
        let mut bytes = [0u8; 8];
        bytes[0] = family;
        bytes[1..7].copy_from_slice(&serial);
        bytes[7] = OneWireCrc::checksum(&bytes[..7]);
        RomCode(bytes)
    }

    /// Builds a ROM code from its raw bytes, CRC byte included.
    pub const fn from_bytes(bytes: [u8; 8]) -> Self {
        RomCode(bytes)
    }

    /// The raw bytes of the ROM code, in bus transmission order.
    pub const fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }

    /// The family code, identifying the device type.
    pub const fn family(&self) -> u8 {
        self.0[0]
    }

    /// Reads bit `index` (0 to 63) of the ROM code.
    pub const fn bit(&self, index: u8) -> bool {
        self.0[(index >> 3) as usize] & (1 << (index & 7)) != 0
    }

    /// Sets bit `index` (0 to 63) of the ROM code to `value`.
    pub const fn set_bit(&mut self, index: u8, value: bool) {
        let mask = 1 << (index & 7);
        if value {
            self.0[(index >> 3) as usize] |= mask;
        } else {
            self.0[(index >> 3) as usize] &= !mask;
        }
    }

    /// The ROM code as a 64-bit unsigned integer.
    pub const fn to_u64(self) -> u64 {
        u64::from_le_bytes(self.0)
    }
}

impl From<u64> for RomCode {
    fn from(value: u64) -> Self {
        RomCode(value.to_le_bytes())
    }
}

impl From<RomCode> for u64 {
    fn from(code: RomCode) -> Self {
        code.to_u64()
    }
}

impl PartialOrd for RomCode {
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RomCode {
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        // Bit 0 goes over the wire first, so it is the most significant
        // comparison key: reversing the bits turns wire order into integer
        // order.
        self.to_u64()
            .reverse_bits()
            .cmp(&other.to_u64().reverse_bits())
    }
}

impl core::fmt::Display for RomCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:016x}", self.to_u64())
    }
}

impl core::fmt::LowerHex for RomCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::LowerHex::fmt(&self.to_u64(), f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_indexing_is_lsb_of_byte_zero_first() {
        let code = RomCode::from_bytes([0x01, 0, 0, 0, 0, 0, 0, 0x80]);
        assert!(code.bit(0));
        assert!(!code.bit(1));
        assert!(!code.bit(62));
        assert!(code.bit(63));
    }

    #[test]
    fn set_bit_round_trips() {
        let mut code = RomCode::ZERO;
        code.set_bit(0, true);
        code.set_bit(13, true);
        code.set_bit(63, true);
        assert_eq!(code.to_u64(), (1 << 0) | (1 << 13) | (1 << 63));
        code.set_bit(13, false);
        assert_eq!(code.to_u64(), (1 << 0) | (1 << 63));
    }

    #[test]
    fn ordering_follows_the_wire_bit_sequence() {
        // Bit 0 is exchanged first and the zero branch sorts first, so a code
        // with only bit 7 set precedes one with only bit 0 set.
        assert!(RomCode::from(0x80u64) < RomCode::from(0x01u64));
        assert!(RomCode::from(0x02u64) < RomCode::from(0x01u64));
        assert!(RomCode::ZERO < RomCode::from(0x80u64));
        assert_eq!(
            RomCode::from(0xaau64).cmp(&RomCode::from(0xaau64)),
            core::cmp::Ordering::Equal
        );
    }

    #[test]
    fn u64_round_trip() {
        let value = 0xf0de_bc9a_7856_3412u64;
        assert_eq!(RomCode::from(value).to_u64(), value);
        assert_eq!(
            RomCode::from(value).as_bytes(),
            &[0x12, 0x34, 0x56, 0x78, 0x9a, 0xbc, 0xde, 0xf0]
        );
    }

    #[test]
    fn new_fills_in_a_valid_crc_byte() {
        let code = RomCode::new(0x28, [0xff, 0x4b, 0x9b, 0x64, 0x16, 0x03]);
        assert_eq!(code.family(), 0x28);
        assert_eq!(OneWireCrc::checksum(code.as_bytes()), 0);
    }
}
