//! The child-process side of the protocol: rebinds stdio to the duplex
//! channel, installs the panic hook, answers exactly one request, and exits.
//! See `SPEC_FULL.md` §4.4.

use std::io;
use std::os::unix::net::UnixStream;

use proctest_proto::{
    read_data, read_execute_body, read_header, write_data_u32, write_report, LittleEndian,
    MessageType, ReportType,
};
use proctest_transport::BlockingChannel;
use tracing::{debug, error};

use crate::context::OpaqueContext;
use crate::error_sink::ErrorSink;
use crate::panic_hook;
use crate::registry::all_tests;
use crate::stacktrace::StackFrame;

/// Takes over stdin/stdout as the runner's IPC channel. The original rebinds
/// `CONOUT$`/`CONIN$` so a test's own prints don't collide with the protocol;
/// the Unix rendition inherits a dedicated socket pair on fd 0/1 instead, so
/// there is nothing to rebind here beyond wrapping the already-correct fds.
fn channel_from_stdio() -> io::Result<UnixStream> {
    use std::os::fd::{AsRawFd, FromRawFd};

    let stdin_fd = io::stdin().as_raw_fd();
    // SAFETY: fd 0 was handed to us by the driver as one end of a socket pair
    // and is not used elsewhere in this process.
    let stream = unsafe { UnixStream::from_raw_fd(stdin_fd) };
    Ok(stream)
}

/// Runs the runner side of the protocol to completion: reads one request,
/// answers it, and returns whether the exchange was handled without a fatal
/// protocol error. Always called exactly once per process.
pub fn run_client() -> bool {
    let stream = match channel_from_stdio() {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "failed to bind runner channel to stdio");
            return false;
        }
    };

    let panic_stream = match stream.try_clone() {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "failed to duplicate runner channel for panic hook");
            return false;
        }
    };
    panic_hook::install(BlockingChannel::new(panic_stream));

    let mut channel = BlockingChannel::new(stream);
    let tests = all_tests();

    let header = match read_header::<LittleEndian>(&mut channel) {
        Ok(h) => h,
        Err(e) => {
            emit_failure(&mut channel, &format!("Invalid read: {e}"));
            return false;
        }
    };

    match header.kind {
        MessageType::QueryTestInfo => handle_query_test_info(&mut channel, tests),
        MessageType::Execute => handle_execute(&mut channel, tests),
        other => {
            emit_failure(&mut channel, &format!("Invalid IPC input type: {other}"));
            false
        }
    }
}

fn emit_failure(channel: &mut BlockingChannel, message: &str) {
    write_report::<LittleEndian>(channel, ReportType::Failure, message.as_bytes());
}

fn handle_query_test_info(
    channel: &mut BlockingChannel,
    tests: &[crate::registry::TestEntry],
) -> bool {
    let _scope = StackFrame::enter("QueryTestInfo");

    write_data_u32::<LittleEndian>(channel, tests.len() as u32);

    let strings_size: u32 = tests
        .iter()
        .map(|t| t.test_name.len() as u32 + t.context_name.len() as u32)
        .sum();
    write_data_u32::<LittleEndian>(channel, strings_size);

    for test in tests {
        proctest_proto::write_data::<LittleEndian>(channel, test.test_name.as_bytes());
        proctest_proto::write_data::<LittleEndian>(channel, test.context_name.as_bytes());
    }

    debug!(count = tests.len(), "reported test info");
    true
}

fn handle_execute(channel: &mut BlockingChannel, tests: &[crate::registry::TestEntry]) -> bool {
    let _scope = StackFrame::enter("Execute");

    let test_id = match read_execute_body::<LittleEndian>(channel) {
        Ok(id) => id,
        Err(e) => {
            emit_failure(channel, &format!("Unexpected read error: {e}"));
            return false;
        }
    };

    if test_id as usize >= tests.len() {
        emit_failure(
            channel,
            &format!("Tried to run test {} / {}", test_id, tests.len()),
        );
        return false;
    }

    let test = &tests[test_id as usize];

    let context_bytes: Vec<u8>;
    let context = if test.context_name.is_empty() {
        context_bytes = Vec::new();
        OpaqueContext::new("", &context_bytes)
    } else {
        match read_data::<LittleEndian>(channel) {
            Ok(bytes) => {
                context_bytes = bytes;
                OpaqueContext::new(test.context_name, &context_bytes)
            }
            Err(e) => {
                emit_failure(channel, &format!("Unexpected read error: {e}"));
                return false;
            }
        }
    };

    let mut errors = ErrorSink::new(test.test_name);
    {
        // Replaces (not nests under) the current frame, so a panic during the
        // test body is attributed to the test alone.
        let _scope = StackFrame::enter(test.test_name);
        (test.test_fn)(&mut errors, context);
    }

    if errors.is_panic() {
        write_report::<LittleEndian>(
            channel,
            ReportType::Failure,
            errors.into_first_error().unwrap().as_bytes(),
        );
    } else {
        write_report::<LittleEndian>(channel, ReportType::Success, b"");
    }

    true
}
