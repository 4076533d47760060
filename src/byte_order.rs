//! Helpers for explicit wire byte-order conversions.
//!
//! Fragment headers carry two `u16` words. Both ends of a link must agree on
//! how those words are laid out; [`ByteOrder`] makes that agreement an
//! explicit configuration value instead of an accident of the host CPU.

/// Byte order used for the fragment header words.
///
/// # Examples
///
/// ```
/// use fraglink::byte_order::ByteOrder;
///
/// assert_eq!(ByteOrder::Big.write_u16(0x1234), [0x12, 0x34]);
/// assert_eq!(ByteOrder::Little.write_u16(0x1234), [0x34, 0x12]);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    /// Network byte order.
    #[default]
    Big,
    /// Little-endian order, matching peers that write host-order words on
    /// little-endian machines.
    Little,
}

impl ByteOrder {
    /// Serialise a `u16` in this byte order.
    #[must_use]
    pub const fn write_u16(self, value: u16) -> [u8; 2] {
        match self {
            Self::Big => value.to_be_bytes(),
            Self::Little => value.to_le_bytes(),
        }
    }

    /// Parse a `u16` from its on-wire representation in this byte order.
    #[must_use]
    pub const fn read_u16(self, bytes: [u8; 2]) -> u16 {
        match self {
            Self::Big => u16::from_be_bytes(bytes),
            Self::Little => u16::from_le_bytes(bytes),
        }
    }

    /// Serialise a `u32` in this byte order.
    #[must_use]
    pub const fn write_u32(self, value: u32) -> [u8; 4] {
        match self {
            Self::Big => value.to_be_bytes(),
            Self::Little => value.to_le_bytes(),
        }
    }

    /// Parse a `u32` from its on-wire representation in this byte order.
    #[must_use]
    pub const fn read_u32(self, bytes: [u8; 4]) -> u32 {
        match self {
            Self::Big => u32::from_be_bytes(bytes),
            Self::Little => u32::from_le_bytes(bytes),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Round-trip tests for byte-order conversion helpers.

    use rstest::rstest;

    use super::ByteOrder;

    #[rstest]
    #[case::big(ByteOrder::Big, [0x12, 0x34])]
    #[case::little(ByteOrder::Little, [0x34, 0x12])]
    fn u16_layout_matches_order(#[case] order: ByteOrder, #[case] expected: [u8; 2]) {
        assert_eq!(order.write_u16(0x1234), expected);
        assert_eq!(order.read_u16(expected), 0x1234);
    }

    #[rstest]
    #[case::big(ByteOrder::Big, [0x12, 0x34, 0x56, 0x78])]
    #[case::little(ByteOrder::Little, [0x78, 0x56, 0x34, 0x12])]
    fn u32_layout_matches_order(#[case] order: ByteOrder, #[case] expected: [u8; 4]) {
        assert_eq!(order.write_u32(0x1234_5678), expected);
        assert_eq!(order.read_u32(expected), 0x1234_5678);
    }

    #[test]
    fn default_is_network_order() {
        assert_eq!(ByteOrder::default(), ByteOrder::Big);
    }
}
