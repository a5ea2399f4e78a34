//! CRC-16 checksum over the cartridge header.
//!
//! The firmware validates bytes `[0, 350)` of the header against the
//! 16-bit CRC stored at offset 350. Reflected polynomial `0xA001`,
//! initial value `0xFFFF`, no final XOR.

const fn build_table() -> [u16; 256] {
    let mut table = [0u16; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u16;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 1 != 0 {
                (crc >> 1) ^ 0xA001
            } else {
                crc >> 1
            };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

/// Byte-at-a-time lookup table for the reflected 0xA001 polynomial.
const CRC16_TABLE: [u16; 256] = build_table();

/// Computes the CRC-16 of `data`.
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc = 0xFFFFu16;
    for &byte in data {
        crc = (crc >> 8) ^ CRC16_TABLE[usize::from((crc ^ u16::from(byte)) & 0xFF)];
    }
    crc
}

#[cfg(test)]
mod tests {
    use super::*;

    // Bitwise reference implementation, independent of the lookup table.
    fn crc16_reference(data: &[u8]) -> u16 {
        let mut crc = 0xFFFFu16;
        for &byte in data {
            crc ^= u16::from(byte);
            for _ in 0..8 {
                crc = if crc & 1 != 0 {
                    (crc >> 1) ^ 0xA001
                } else {
                    crc >> 1
                };
            }
        }
        crc
    }

    #[test]
    fn test_check_value() {
        // Standard check value for this polynomial/init combination.
        assert_eq!(crc16(b"123456789"), 0x4B37);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(crc16(&[]), 0xFFFF);
    }

    #[test]
    fn test_table_values() {
        assert_eq!(CRC16_TABLE[0], 0);
        assert_eq!(CRC16_TABLE[1], 0xC0C1);
        assert_eq!(CRC16_TABLE[255], 0x4040);
    }

    #[test]
    fn test_header_prefix_matches_reference() {
        // A fixed 350-byte prefix, the exact span covered by the header CRC.
        let prefix: Vec<u8> = (0..350u32).map(|i| (i.wrapping_mul(31) ^ 0x5A) as u8).collect();
        assert_eq!(prefix.len(), 350);
        assert_eq!(crc16(&prefix), crc16_reference(&prefix));
    }
}
