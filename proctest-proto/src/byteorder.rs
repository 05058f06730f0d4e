//! Endian-parameterised primitive encode/decode, mirroring the codec's split between
//! "which bytes" (the message shape) and "which order" (the wire's byte order).

/// A byte order capable of encoding and decoding the fixed-width integers the wire
/// protocol is built out of. `LittleEndian` is what the driver and runner actually
/// speak; `BigEndian` exists so the codec's round-trip property can be exercised
/// against both orders.
pub trait ByteOrder {
    fn write_u16(buf: &mut [u8; 2], v: u16);
    fn read_u16(buf: &[u8; 2]) -> u16;
    fn write_u32(buf: &mut [u8; 4], v: u32);
    fn read_u32(buf: &[u8; 4]) -> u32;
    fn write_u64(buf: &mut [u8; 8], v: u64);
    fn read_u64(buf: &[u8; 8]) -> u64;
}

pub struct LittleEndian;
pub struct BigEndian;

impl ByteOrder for LittleEndian {
    fn write_u16(buf: &mut [u8; 2], v: u16) {
        *buf = v.to_le_bytes();
    }
    fn read_u16(buf: &[u8; 2]) -> u16 {
        u16::from_le_bytes(*buf)
    }
    fn write_u32(buf: &mut [u8; 4], v: u32) {
        *buf = v.to_le_bytes();
    }
    fn read_u32(buf: &[u8; 4]) -> u32 {
        u32::from_le_bytes(*buf)
    }
    fn write_u64(buf: &mut [u8; 8], v: u64) {
        *buf = v.to_le_bytes();
    }
    fn read_u64(buf: &[u8; 8]) -> u64 {
        u64::from_le_bytes(*buf)
    }
}

impl ByteOrder for BigEndian {
    fn write_u16(buf: &mut [u8; 2], v: u16) {
        *buf = v.to_be_bytes();
    }
    fn read_u16(buf: &[u8; 2]) -> u16 {
        u16::from_be_bytes(*buf)
    }
    fn write_u32(buf: &mut [u8; 4], v: u32) {
        *buf = v.to_be_bytes();
    }
    fn read_u32(buf: &[u8; 4]) -> u32 {
        u32::from_be_bytes(*buf)
    }
    fn write_u64(buf: &mut [u8; 8], v: u64) {
        *buf = v.to_be_bytes();
    }
    fn read_u64(buf: &[u8; 8]) -> u64 {
        u64::from_be_bytes(*buf)
    }
}
