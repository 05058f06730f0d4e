//! The IPC wire framing and codec shared by the driver and the runner.
//!
//! This crate knows nothing about processes, pipes, or tests: it only turns typed
//! messages into bytes (and back) over anything that implements [`ByteSink`] /
//! [`ByteSource`]. Concrete transports live in `proctest-transport`.

pub mod byteorder;
pub mod message;
pub mod primitives;
pub mod transport;

pub use byteorder::{BigEndian, ByteOrder, LittleEndian};
pub use message::{
    expect_header, read_data, read_data_u32, read_execute_body, read_header,
    read_query_context_body, read_report_body, write_data, write_data_u32, write_execute,
    write_header, write_query_context, write_query_test_info, write_report, MessageHeader,
    MessageType, ProtocolError, ReportType, PROTOCOL_VERSION,
};
pub use primitives::{
    read_i16, read_i32, read_i64, read_i8, read_u16, read_u32, read_u64, read_u8, write_i16,
    write_i32, write_i64, write_i8, write_u16, write_u32, write_u64, write_u8, write_zeros,
};
pub use transport::{ByteSink, ByteSource, SliceSource};
