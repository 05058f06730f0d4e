//! The wire framing itself: `[version:32][type:32]` header, followed by a
//! type-specific body. See `SPEC_FULL.md` §4.1 for the exact byte layout.

use crate::byteorder::ByteOrder;
use crate::primitives::{read_u32, write_u32};
use crate::transport::{ByteSink, ByteSource};
use thiserror::Error;

/// The only protocol version this codec understands. A header carrying any other
/// value aborts the exchange before a single body byte is consumed.
pub const PROTOCOL_VERSION: u32 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Data = 0,
    QueryTestInfo = 1,
    Execute = 2,
    Report = 3,
    QueryContext = 4,
}

impl MessageType {
    fn from_u32(v: u32) -> Option<Self> {
        Some(match v {
            0 => Self::Data,
            1 => Self::QueryTestInfo,
            2 => Self::Execute,
            3 => Self::Report,
            4 => Self::QueryContext,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportType {
    Success = 0,
    Failure = 1,
}

impl ReportType {
    fn from_u32(v: u32) -> Option<Self> {
        Some(match v {
            0 => Self::Success,
            1 => Self::Failure,
            _ => return None,
        })
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Incompatible IPC version. Expected: {expected}, Found: {found}")]
    VersionMismatch { expected: u32, found: u32 },
    #[error("Expected Type: {expected}, Found: {found}")]
    UnexpectedType { expected: u32, found: u32 },
    #[error("Unrecognised message type: {0}")]
    UnknownType(u32),
    #[error("Unrecognised report type: {0}")]
    UnknownReportType(u32),
    #[error("Connection closed or frame truncated mid-read")]
    Truncated,
    #[error("Data frame length {expected} does not match fixed payload size {found}")]
    SizeMismatch { expected: u32, found: u32 },
    #[error("Success report carried a non-empty message ({0} bytes)")]
    NonEmptySuccessMessage(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHeader {
    pub version: u32,
    pub kind: MessageType,
}

pub fn write_header<O: ByteOrder>(sink: &mut impl ByteSink, kind: MessageType) {
    write_u32::<O>(sink, PROTOCOL_VERSION);
    write_u32::<O>(sink, kind as u32);
}

pub fn read_header<O: ByteOrder>(source: &mut impl ByteSource) -> Result<MessageHeader, ProtocolError> {
    let version = read_u32::<O>(source).ok_or(ProtocolError::Truncated)?;
    if version != PROTOCOL_VERSION {
        return Err(ProtocolError::VersionMismatch {
            expected: PROTOCOL_VERSION,
            found: version,
        });
    }
    let raw_kind = read_u32::<O>(source).ok_or(ProtocolError::Truncated)?;
    let kind = MessageType::from_u32(raw_kind).ok_or(ProtocolError::UnknownType(raw_kind))?;
    Ok(MessageHeader { version, kind })
}

/// Reads a header and asserts its type matches `expected`. Used at every call site
/// that is only ever prepared to handle one message type (the discovery phase, the
/// report read) — a mismatch here is a hard protocol error, never an auto-skip.
pub fn expect_header<O: ByteOrder>(
    source: &mut impl ByteSource,
    expected: MessageType,
) -> Result<(), ProtocolError> {
    let header = read_header::<O>(source)?;
    if header.kind != expected {
        return Err(ProtocolError::UnexpectedType {
            expected: expected as u32,
            found: header.kind as u32,
        });
    }
    Ok(())
}

/// Writes a `Data` frame: `[header][len:32][bytes]`.
pub fn write_data<O: ByteOrder>(sink: &mut impl ByteSink, bytes: &[u8]) {
    write_header::<O>(sink, MessageType::Data);
    write_u32::<O>(sink, bytes.len() as u32);
    sink.write_all(bytes);
}

/// Reads a `Data` frame of unknown length, returning the payload. This is the
/// runtime-length variant; the discovery phase's dynamically-sized test/context
/// names always go through this, never through `read_data_t`.
pub fn read_data<O: ByteOrder>(source: &mut impl ByteSource) -> Result<Vec<u8>, ProtocolError> {
    expect_header::<O>(source, MessageType::Data)?;
    let len = read_u32::<O>(source).ok_or(ProtocolError::Truncated)?;
    let mut buf = vec![0u8; len as usize];
    if !source.read_exact(&mut buf) {
        return Err(ProtocolError::Truncated);
    }
    Ok(buf)
}

/// Writes a `Data` frame carrying a fixed-size `u32` payload (the original's
/// `DataT<T>` specialised to the one concrete type this protocol ever sends that
/// way).
pub fn write_data_u32<O: ByteOrder>(sink: &mut impl ByteSink, v: u32) {
    write_header::<O>(sink, MessageType::Data);
    write_u32::<O>(sink, 4);
    write_u32::<O>(sink, v);
}

pub fn read_data_u32<O: ByteOrder>(source: &mut impl ByteSource) -> Result<u32, ProtocolError> {
    expect_header::<O>(source, MessageType::Data)?;
    let len = read_u32::<O>(source).ok_or(ProtocolError::Truncated)?;
    if len != 4 {
        return Err(ProtocolError::SizeMismatch {
            expected: 4,
            found: len,
        });
    }
    read_u32::<O>(source).ok_or(ProtocolError::Truncated)
}

pub fn write_query_test_info<O: ByteOrder>(sink: &mut impl ByteSink) {
    write_header::<O>(sink, MessageType::QueryTestInfo);
}

pub fn write_execute<O: ByteOrder>(sink: &mut impl ByteSink, test_id: u32) {
    write_header::<O>(sink, MessageType::Execute);
    write_u32::<O>(sink, test_id);
}

/// Reads the body of an `Execute` message, assuming the header has already been
/// read and validated by the caller (the runner's dispatch loop reads the header
/// once to decide which arm to take).
pub fn read_execute_body<O: ByteOrder>(source: &mut impl ByteSource) -> Result<u32, ProtocolError> {
    read_u32::<O>(source).ok_or(ProtocolError::Truncated)
}

pub fn write_report<O: ByteOrder>(sink: &mut impl ByteSink, report_type: ReportType, message: &[u8]) {
    write_header::<O>(sink, MessageType::Report);
    write_u32::<O>(sink, report_type as u32);
    write_u32::<O>(sink, message.len() as u32);
    sink.write_all(message);
}

pub fn read_report_body<O: ByteOrder>(
    source: &mut impl ByteSource,
) -> Result<(ReportType, Vec<u8>), ProtocolError> {
    let raw_type = read_u32::<O>(source).ok_or(ProtocolError::Truncated)?;
    let report_type = ReportType::from_u32(raw_type).ok_or(ProtocolError::UnknownReportType(raw_type))?;
    let msg_len = read_u32::<O>(source).ok_or(ProtocolError::Truncated)?;
    let mut message = vec![0u8; msg_len as usize];
    if !source.read_exact(&mut message) {
        return Err(ProtocolError::Truncated);
    }
    if report_type == ReportType::Success && !message.is_empty() {
        return Err(ProtocolError::NonEmptySuccessMessage(msg_len));
    }
    Ok((report_type, message))
}

/// Reserved: the `QueryContext` body format is defined on the wire but no code
/// path in the driver currently emits it. Kept so the codec round-trips it in
/// tests; the runner treats receiving one as an unrecognised message type.
pub fn write_query_context<O: ByteOrder>(sink: &mut impl ByteSink, context_name: &[u8]) {
    write_header::<O>(sink, MessageType::QueryContext);
    write_u32::<O>(sink, context_name.len() as u32);
    sink.write_all(context_name);
}

pub fn read_query_context_body<O: ByteOrder>(
    source: &mut impl ByteSource,
) -> Result<Vec<u8>, ProtocolError> {
    let len = read_u32::<O>(source).ok_or(ProtocolError::Truncated)?;
    let mut buf = vec![0u8; len as usize];
    if !source.read_exact(&mut buf) {
        return Err(ProtocolError::Truncated);
    }
    Ok(buf)
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Data => "Data",
            Self::QueryTestInfo => "QueryTestInfo",
            Self::Execute => "Execute",
            Self::Report => "Report",
            Self::QueryContext => "QueryContext",
        };
        f.write_str(s)
    }
}

impl std::fmt::Display for ReportType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Success => "Success",
            Self::Failure => "Failure",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::byteorder::LittleEndian;
    use crate::transport::SliceSource;
    use pretty_assertions::assert_eq;

    #[test]
    fn header_round_trips() {
        let mut buf = Vec::new();
        write_header::<LittleEndian>(&mut buf, MessageType::Execute);
        let mut source = SliceSource::new(&buf);
        let header = read_header::<LittleEndian>(&mut source).unwrap();
        assert_eq!(header.version, PROTOCOL_VERSION);
        assert_eq!(header.kind, MessageType::Execute);
    }

    #[test]
    fn version_mismatch_is_rejected() {
        let mut buf = Vec::new();
        write_u32::<LittleEndian>(&mut buf, PROTOCOL_VERSION + 1);
        write_u32::<LittleEndian>(&mut buf, MessageType::Data as u32);
        let mut source = SliceSource::new(&buf);
        let err = read_header::<LittleEndian>(&mut source).unwrap_err();
        assert_eq!(
            err,
            ProtocolError::VersionMismatch {
                expected: PROTOCOL_VERSION,
                found: PROTOCOL_VERSION + 1
            }
        );
    }

    #[test]
    fn data_frame_round_trips() {
        let mut buf = Vec::new();
        write_data::<LittleEndian>(&mut buf, b"hello world");
        let mut source = SliceSource::new(&buf);
        let out = read_data::<LittleEndian>(&mut source).unwrap();
        assert_eq!(out, b"hello world");
    }

    #[test]
    fn data_u32_round_trips() {
        let mut buf = Vec::new();
        write_data_u32::<LittleEndian>(&mut buf, 42);
        let mut source = SliceSource::new(&buf);
        assert_eq!(read_data_u32::<LittleEndian>(&mut source).unwrap(), 42);
    }

    #[test]
    fn data_u32_rejects_wrong_size() {
        let mut buf = Vec::new();
        write_header::<LittleEndian>(&mut buf, MessageType::Data);
        write_u32::<LittleEndian>(&mut buf, 8);
        write_u32::<LittleEndian>(&mut buf, 1);
        write_u32::<LittleEndian>(&mut buf, 2);
        let mut source = SliceSource::new(&buf);
        let err = read_data_u32::<LittleEndian>(&mut source).unwrap_err();
        assert_eq!(
            err,
            ProtocolError::SizeMismatch {
                expected: 4,
                found: 8
            }
        );
    }

    #[test]
    fn report_round_trips_failure() {
        let mut buf = Vec::new();
        write_report::<LittleEndian>(&mut buf, ReportType::Failure, b"boom");
        let mut source = SliceSource::new(&buf);
        expect_header::<LittleEndian>(&mut source, MessageType::Report).unwrap();
        let (kind, msg) = read_report_body::<LittleEndian>(&mut source).unwrap();
        assert_eq!(kind, ReportType::Failure);
        assert_eq!(msg, b"boom");
    }

    #[test]
    fn nonempty_success_message_is_a_protocol_error() {
        let mut buf = Vec::new();
        write_header::<LittleEndian>(&mut buf, MessageType::Report);
        write_u32::<LittleEndian>(&mut buf, ReportType::Success as u32);
        write_u32::<LittleEndian>(&mut buf, 3);
        buf.extend_from_slice(b"huh");
        let mut source = SliceSource::new(&buf);
        expect_header::<LittleEndian>(&mut source, MessageType::Report).unwrap();
        let err = read_report_body::<LittleEndian>(&mut source).unwrap_err();
        assert_eq!(err, ProtocolError::NonEmptySuccessMessage(3));
    }

    #[test]
    fn query_context_round_trips() {
        let mut buf = Vec::new();
        write_query_context::<LittleEndian>(&mut buf, b"Int");
        let mut source = SliceSource::new(&buf);
        expect_header::<LittleEndian>(&mut source, MessageType::QueryContext).unwrap();
        let name = read_query_context_body::<LittleEndian>(&mut source).unwrap();
        assert_eq!(name, b"Int");
    }
}
