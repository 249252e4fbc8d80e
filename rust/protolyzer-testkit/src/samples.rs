//! Captured protocol records used as fixtures.

/// Field widths, in bytes, of [`TCP_HEADER`]: sequence number, acknowledgement
/// number, data offset, flags, window, checksum, urgent pointer.
pub const TCP_BYTE_WIDTHS: [usize; 7] = [4, 4, 1, 1, 2, 2, 2];

/// Field widths, in bits, of a TCP header without options: source port,
/// destination port, sequence number, acknowledgement number, data offset,
/// reserved, flags, window, checksum, urgent pointer.
pub const TCP_BIT_WIDTHS: [usize; 10] = [16, 16, 32, 32, 4, 3, 9, 16, 16, 16];

/// A 16-byte TCP header tail as laid out in the memory of a little-endian host.
///
/// Sequence and acknowledgement numbers are 0, data offset is `0x0C`, flags
/// are `0x00`, the window is `0x00FF`, the checksum `0xAAAA` and the urgent
/// pointer `0x0000`, each stored least significant byte first.
pub const TCP_HEADER: [u8; 16] = [
    0x00, 0x00, 0x00, 0x00, // sequence
    0x00, 0x00, 0x00, 0x00, // acknowledgement
    0x0C, // data offset
    0x00, // flags
    0xFF, 0x00, // window
    0xAA, 0xAA, // checksum
    0x00, 0x00, // urgent pointer
];

/// Index of the window field in [`TCP_BYTE_WIDTHS`].
pub const TCP_WINDOW_FIELD: usize = 4;

/// A 20-byte TCP header in network byte order: ports 443 and 51000,
/// sequence `0x0102_0304`, acknowledgement `0xA0B0_C0D0`, data offset 5,
/// flags ACK|PSH, window 502, checksum `0x1F2E`, urgent pointer 0.
pub const TCP_HEADER_NETWORK: [u8; 20] = [
    0x01, 0xBB, // source port
    0xC7, 0x38, // destination port
    0x01, 0x02, 0x03, 0x04, // sequence
    0xA0, 0xB0, 0xC0, 0xD0, // acknowledgement
    0x50, 0x18, // data offset, reserved, flags
    0x01, 0xF6, // window
    0x1F, 0x2E, // checksum
    0x00, 0x00, // urgent pointer
];
