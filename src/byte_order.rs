//! Helpers for explicit little-endian wire conversions.
//!
//! The sensor emits every multi-byte field in little-endian order. These
//! helpers keep Clippy expectations scoped to the conversion points so frame
//! parsing code can remain explicit about wire endianness without repeating
//! lint annotations.

/// Serialise a `u16` in wire byte order (little-endian).
///
/// # Examples
///
/// ```
/// use radarframe::byte_order::write_wire_u16;
///
/// assert_eq!(write_wire_u16(0x1234), [0x34, 0x12]);
/// ```
#[must_use]
pub fn write_wire_u16(value: u16) -> [u8; 2] {
    #[expect(
        clippy::little_endian_bytes,
        reason = "The sensor wire format is little-endian."
    )]
    value.to_le_bytes()
}

/// Parse a wire-order `u16` from its on-wire representation.
///
/// # Examples
///
/// ```
/// use radarframe::byte_order::read_wire_u16;
///
/// assert_eq!(read_wire_u16([0x34, 0x12]), 0x1234);
/// ```
#[must_use]
pub fn read_wire_u16(bytes: [u8; 2]) -> u16 {
    #[expect(
        clippy::little_endian_bytes,
        reason = "The sensor wire format is little-endian."
    )]
    u16::from_le_bytes(bytes)
}

/// Serialise a `u32` in wire byte order (little-endian).
///
/// # Examples
///
/// ```
/// use radarframe::byte_order::write_wire_u32;
///
/// assert_eq!(write_wire_u32(0x1234_5678), [0x78, 0x56, 0x34, 0x12]);
/// ```
#[must_use]
pub fn write_wire_u32(value: u32) -> [u8; 4] {
    #[expect(
        clippy::little_endian_bytes,
        reason = "The sensor wire format is little-endian."
    )]
    value.to_le_bytes()
}

/// Parse a wire-order `u32` from its on-wire representation.
#[must_use]
pub fn read_wire_u32(bytes: [u8; 4]) -> u32 {
    #[expect(
        clippy::little_endian_bytes,
        reason = "The sensor wire format is little-endian."
    )]
    u32::from_le_bytes(bytes)
}

/// Serialise a `u64` in wire byte order (little-endian).
#[must_use]
pub fn write_wire_u64(value: u64) -> [u8; 8] {
    #[expect(
        clippy::little_endian_bytes,
        reason = "The sensor wire format is little-endian."
    )]
    value.to_le_bytes()
}

/// Parse a wire-order `u64` from its on-wire representation.
#[must_use]
pub fn read_wire_u64(bytes: [u8; 8]) -> u64 {
    #[expect(
        clippy::little_endian_bytes,
        reason = "The sensor wire format is little-endian."
    )]
    u64::from_le_bytes(bytes)
}

/// Read a little-endian `u32` at `offset`, or `None` if the slice is too short.
pub(crate) fn u32_at(bytes: &[u8], offset: usize) -> Option<u32> {
    let end = offset.checked_add(4)?;
    let raw = bytes.get(offset..end)?;
    <[u8; 4]>::try_from(raw).ok().map(read_wire_u32)
}

/// Read a little-endian `u64` at `offset`, or `None` if the slice is too short.
pub(crate) fn u64_at(bytes: &[u8], offset: usize) -> Option<u64> {
    let end = offset.checked_add(8)?;
    let raw = bytes.get(offset..end)?;
    <[u8; 8]>::try_from(raw).ok().map(read_wire_u64)
}

#[cfg(test)]
mod tests {
    //! Tests for wire byte-order conversion helpers.

    use rstest::rstest;

    use super::{
        read_wire_u16,
        read_wire_u32,
        read_wire_u64,
        u32_at,
        u64_at,
        write_wire_u16,
        write_wire_u32,
        write_wire_u64,
    };

    /// Verify that each write/read pair lays bytes out least-significant first.
    #[rstest]
    #[case::u16(
        0x1234u64,
        &write_wire_u16(0x1234)[..],
        &[0x34, 0x12],
        u64::from(read_wire_u16([0x34, 0x12]))
    )]
    #[case::u32(
        0x1234_5678u64,
        &write_wire_u32(0x1234_5678)[..],
        &[0x78, 0x56, 0x34, 0x12],
        u64::from(read_wire_u32([0x78, 0x56, 0x34, 0x12]))
    )]
    #[case::u64(
        0x1122_3344_5566_7788u64,
        &write_wire_u64(0x1122_3344_5566_7788)[..],
        &[0x88, 0x77, 0x66, 0x55, 0x44, 0x33, 0x22, 0x11],
        read_wire_u64([0x88, 0x77, 0x66, 0x55, 0x44, 0x33, 0x22, 0x11])
    )]
    fn wire_byte_order_layout(
        #[case] value: u64,
        #[case] written: &[u8],
        #[case] expected_bytes: &[u8],
        #[case] read_back: u64,
    ) {
        assert_eq!(written, expected_bytes);
        assert_eq!(read_back, value);
    }

    #[test]
    fn offset_readers_refuse_short_slices() {
        let bytes = [1_u8, 0, 0, 0, 2, 0, 0];
        assert_eq!(u32_at(&bytes, 0), Some(1));
        assert_eq!(u32_at(&bytes, 4), None);
        assert_eq!(u64_at(&bytes, 0), None);
        assert_eq!(u32_at(&bytes, usize::MAX), None);
    }
}
