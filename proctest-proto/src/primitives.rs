//! Fixed-width integer codecs. Signed variants reuse the unsigned serializer by
//! bit-cast, as the original does, rather than duplicating the encode/decode logic.

use crate::byteorder::ByteOrder;
use crate::transport::{ByteSink, ByteSource};

pub fn write_u8(sink: &mut impl ByteSink, v: u8) {
    sink.write_all(&[v]);
}

pub fn read_u8(source: &mut impl ByteSource) -> Option<u8> {
    let mut buf = [0u8; 1];
    source.read_exact(&mut buf).then_some(buf[0])
}

pub fn write_u16<O: ByteOrder>(sink: &mut impl ByteSink, v: u16) {
    let mut buf = [0u8; 2];
    O::write_u16(&mut buf, v);
    sink.write_all(&buf);
}

pub fn read_u16<O: ByteOrder>(source: &mut impl ByteSource) -> Option<u16> {
    let mut buf = [0u8; 2];
    source.read_exact(&mut buf).then(|| O::read_u16(&buf))
}

pub fn write_u32<O: ByteOrder>(sink: &mut impl ByteSink, v: u32) {
    let mut buf = [0u8; 4];
    O::write_u32(&mut buf, v);
    sink.write_all(&buf);
}

pub fn read_u32<O: ByteOrder>(source: &mut impl ByteSource) -> Option<u32> {
    let mut buf = [0u8; 4];
    source.read_exact(&mut buf).then(|| O::read_u32(&buf))
}

pub fn write_u64<O: ByteOrder>(sink: &mut impl ByteSink, v: u64) {
    let mut buf = [0u8; 8];
    O::write_u64(&mut buf, v);
    sink.write_all(&buf);
}

pub fn read_u64<O: ByteOrder>(source: &mut impl ByteSource) -> Option<u64> {
    let mut buf = [0u8; 8];
    source.read_exact(&mut buf).then(|| O::read_u64(&buf))
}

pub fn write_i8(sink: &mut impl ByteSink, v: i8) {
    write_u8(sink, v as u8);
}

pub fn read_i8(source: &mut impl ByteSource) -> Option<i8> {
    read_u8(source).map(|v| v as i8)
}

pub fn write_i16<O: ByteOrder>(sink: &mut impl ByteSink, v: i16) {
    write_u16::<O>(sink, v as u16);
}

pub fn read_i16<O: ByteOrder>(source: &mut impl ByteSource) -> Option<i16> {
    read_u16::<O>(source).map(|v| v as i16)
}

pub fn write_i32<O: ByteOrder>(sink: &mut impl ByteSink, v: i32) {
    write_u32::<O>(sink, v as u32);
}

pub fn read_i32<O: ByteOrder>(source: &mut impl ByteSource) -> Option<i32> {
    read_u32::<O>(source).map(|v| v as i32)
}

pub fn write_i64<O: ByteOrder>(sink: &mut impl ByteSink, v: i64) {
    write_u64::<O>(sink, v as u64);
}

pub fn read_i64<O: ByteOrder>(source: &mut impl ByteSource) -> Option<i64> {
    read_u64::<O>(source).map(|v| v as i64)
}

/// Writes `n` zero bytes. Never appears in the wire protocol itself; exists as a
/// composable primitive the codec's own tests use to pad buffers.
pub fn write_zeros(sink: &mut impl ByteSink, n: usize) {
    const CHUNK: [u8; 64] = [0u8; 64];
    let mut remaining = n;
    while remaining > 0 {
        let take = remaining.min(CHUNK.len());
        sink.write_all(&CHUNK[..take]);
        remaining -= take;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::byteorder::{BigEndian, LittleEndian};
    use crate::transport::SliceSource;
    use pretty_assertions::assert_eq;

    #[test]
    fn round_trip_le_u32() {
        let mut buf = Vec::new();
        write_u32::<LittleEndian>(&mut buf, 0xdead_beef);
        assert_eq!(buf, vec![0xef, 0xbe, 0xad, 0xde]);
        let mut source = SliceSource::new(&buf);
        assert_eq!(read_u32::<LittleEndian>(&mut source), Some(0xdead_beef));
    }

    #[test]
    fn round_trip_be_u64() {
        let mut buf = Vec::new();
        write_u64::<BigEndian>(&mut buf, 0x0102_0304_0506_0708);
        let mut source = SliceSource::new(&buf);
        assert_eq!(
            read_u64::<BigEndian>(&mut source),
            Some(0x0102_0304_0506_0708)
        );
    }

    #[test]
    fn signed_bit_cast_round_trips() {
        let mut buf = Vec::new();
        write_i32::<LittleEndian>(&mut buf, -12345);
        let mut source = SliceSource::new(&buf);
        assert_eq!(read_i32::<LittleEndian>(&mut source), Some(-12345));
    }

    #[test]
    fn short_read_fails() {
        let data = [0u8; 2];
        let mut source = SliceSource::new(&data);
        assert_eq!(read_u32::<LittleEndian>(&mut source), None);
    }

    #[test]
    fn zeros_writes_exact_count() {
        let mut buf = Vec::new();
        write_zeros(&mut buf, 130);
        assert_eq!(buf.len(), 130);
        assert!(buf.iter().all(|&b| b == 0));
    }
}
