#[derive(Debug, Default)]
/// Calculate the CRC-8 used in 1-Wire communications (reflected `0x8c` polynomial).
pub struct OneWireCrc(u8);

/// CRC-8 of each single-bit input byte. XORing the entries selected by the set
/// bits of a byte yields that byte's CRC, which turns the per-byte update into
/// eight conditional XORs. Values are fixed by the device firmware and must not
/// be altered.
#[cfg(feature = "crc-table")]
const BIT_CRC: [u8; 8] = [0x5e, 0xbc, 0x61, 0xc2, 0x9d, 0x23, 0x46, 0x8c];

impl OneWireCrc {
    /// Get the current CRC value.
    pub fn value(&self) -> u8 {
        self.0
    }

    /// Update the CRC with the incoming byte.
    #[cfg(feature = "crc-table")]
    pub fn update(&mut self, byte: u8) {
        let poked = self.0 ^ byte;
        let mut crc = 0;
        for (bit, &syndrome) in BIT_CRC.iter().enumerate() {
            if poked & (1 << bit) != 0 {
                crc ^= syndrome;
            }
        }
        self.0 = crc;
    }

    /// Update the CRC with the incoming byte.
    #[cfg(not(feature = "crc-table"))]
    pub fn update(&mut self, byte: u8) {
        let mut crc = self.0 ^ byte;
        for _ in 0..8 {
            if crc & 0x1 == 0x1 {
                crc = (crc >> 1) ^ 0x8c;
            } else {
                crc >>= 1;
            }
        }
        self.0 = crc;
    }

    /// Compute the CRC of a sequence of bytes.
    /// If the sequence ends with the CRC of the preceding bytes, the result is 0.
    pub fn checksum(bytes: &[u8]) -> u8 {
        let mut crc = OneWireCrc::default();
        for &byte in bytes {
            crc.update(byte);
        }
        crc.0
    }

    /// Validate a sequence of bytes where the last byte is the 1-Wire CRC of
    /// the previous bytes.
    pub fn validate(bytes: &[u8]) -> bool {
        OneWireCrc::checksum(bytes) == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_bit_bytes_match_the_known_syndromes() {
        assert_eq!(OneWireCrc::checksum(&[0x01]), 0x5e);
        assert_eq!(OneWireCrc::checksum(&[0x80]), 0x8c);
    }

    #[test]
    fn appending_the_checksum_yields_zero() {
        let mut buf = [0x28, 0xff, 0x4b, 0x9b, 0x64, 0x16, 0x03, 0x00];
        buf[7] = OneWireCrc::checksum(&buf[..7]);
        assert!(OneWireCrc::validate(&buf));
        assert_eq!(OneWireCrc::checksum(&buf), 0);
    }

    #[test]
    fn any_single_bit_flip_is_detected() {
        let mut buf = [0x10, 0x32, 0x54, 0x76, 0x98, 0xba, 0xdc, 0x00];
        buf[7] = OneWireCrc::checksum(&buf[..7]);
        for byte in 0..8 {
            for bit in 0..8 {
                let mut corrupt = buf;
                corrupt[byte] ^= 1 << bit;
                assert!(!OneWireCrc::validate(&corrupt), "flip {byte}:{bit}");
            }
        }
    }

    #[test]
    fn incremental_update_matches_one_shot_checksum() {
        let bytes = [0xde, 0xad, 0xbe, 0xef, 0x00, 0x55];
        let mut crc = OneWireCrc::default();
        for &byte in &bytes {
            crc.update(byte);
        }
        assert_eq!(crc.value(), OneWireCrc::checksum(&bytes));
    }
}
