//! Per-test execution: spawn, request, await report, classify. Every failure
//! mode here becomes a recorded [`FailedTest`] rather than an early return —
//! only discovery-phase errors are allowed to abort the whole run.

use std::path::Path;
use std::time::Duration;

use proctest_core::OpaqueContext;
use proctest_proto::{read_report_body, write_execute, LittleEndian, ProtocolError, ReportType};
use proctest_transport::ChildProcess;
use tracing::warn;

use crate::discovery::{find_context, TestCatalogue};

pub struct FailedTest {
    pub test_name: String,
    pub message: String,
}

/// Runs test `i` from `catalogue` against `client_exe`, returning `Ok(())` on
/// success or `Err(FailedTest)` for any of the four failure categories
/// (assertion failure, panic, timeout, driver error).
pub fn run_one(
    client_exe: &Path,
    catalogue: &TestCatalogue,
    i: usize,
    contexts: &[OpaqueContext<'_>],
    timeout: Duration,
) -> Result<(), FailedTest> {
    let test_name = catalogue.test_name(i);
    let context_name = catalogue.context_name(i);

    let context_bytes: Option<&[u8]> = if context_name.is_empty() {
        None
    } else {
        match find_context(contexts, context_name) {
            Some(ctx) => Some(ctx.data),
            None => {
                return Err(FailedTest {
                    test_name: test_name.to_string(),
                    message: format!("Invalid context type: {context_name}"),
                })
            }
        }
    };

    let mut child = match ChildProcess::spawn(client_exe, &[], timeout) {
        Ok(c) => c,
        Err(e) => {
            warn!(test = test_name, error = %e, "failed to spawn runner");
            return Err(FailedTest {
                test_name: test_name.to_string(),
                message: "Internal Error: Failed to create process".to_string(),
            });
        }
    };

    write_execute::<LittleEndian>(child.channel_mut(), i as u32);
    if let Some(bytes) = context_bytes {
        proctest_proto::write_data::<LittleEndian>(child.channel_mut(), bytes);
    }

    if !child.channel_mut().write_ok() {
        return Err(FailedTest {
            test_name: test_name.to_string(),
            message: "Internal Error: Message never received (likely timeout)".to_string(),
        });
    }

    // Header + body are read together: a missing/mismatched header or a
    // truncated/malformed body are all "never got a usable response", not a
    // panic — only a header and body that both parsed but carried a
    // `ReportType` byte that isn't Success or Failure is a genuine protocol
    // violation worth naming.
    let never_received = || FailedTest {
        test_name: test_name.to_string(),
        message: "Internal Error: Message never received (likely timeout)".to_string(),
    };

    let header = match proctest_proto::read_header::<LittleEndian>(child.channel_mut()) {
        Ok(h) => h,
        Err(_) => return Err(never_received()),
    };
    if header.kind != proctest_proto::MessageType::Report {
        return Err(never_received());
    }

    match read_report_body::<LittleEndian>(child.channel_mut()) {
        Ok((ReportType::Failure, message)) => Err(FailedTest {
            test_name: test_name.to_string(),
            message: String::from_utf8_lossy(&message).into_owned(),
        }),
        Ok((ReportType::Success, _)) => Ok(()),
        Err(ProtocolError::UnknownReportType(n)) => Err(FailedTest {
            test_name: test_name.to_string(),
            message: format!("Unexpected Report Message Type: {n}"),
        }),
        Err(_) => Err(never_received()),
    }
}
