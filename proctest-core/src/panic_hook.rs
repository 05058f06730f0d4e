//! Converts an uncaught panic inside the runner into a protocol `Report`
//! frame, so the driver still gets a structured failure instead of the child
//! just vanishing. Installed once, for the lifetime of the process.

use std::cell::Cell;
use std::panic::PanicHookInfo;
use std::sync::Mutex;

use proctest_proto::{write_report, LittleEndian, ReportType};
use proctest_transport::BlockingChannel;

thread_local! {
    static IN_PANIC_REPORT: Cell<bool> = const { Cell::new(false) };
}

/// Installs a process-wide panic hook that serializes a `Report(Failure, ..)`
/// frame to `channel` before running the default hook (which still prints to
/// stderr, now console-bound rather than piped).
///
/// If writing that frame itself panics — e.g. the driver already closed the
/// channel — the hook swallows the secondary panic and falls through to the
/// default hook instead of aborting the process.
///
/// Takes ownership of `channel` rather than sharing it: only one test ever
/// runs per process, so there is no other code that still needs it after the
/// hook is installed. The `Mutex` exists only to give the channel the
/// interior mutability a `Fn` hook requires, not to coordinate with another
/// owner.
pub fn install(channel: BlockingChannel) {
    let channel = Mutex::new(channel);
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |info| {
        let already_reporting = IN_PANIC_REPORT.with(|f| f.replace(true));
        if !already_reporting {
            let message = panic_message(info);
            let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                if let Ok(mut chan) = channel.lock() {
                    write_report::<LittleEndian>(&mut *chan, ReportType::Failure, message.as_bytes());
                }
            }));
            if outcome.is_err() {
                eprintln!("panic hook: failed to report panic over the channel");
            }
            IN_PANIC_REPORT.with(|f| f.set(false));
        }

        default_hook(info);
    }));
}

/// Forwards the panic payload as-is, with no stack-frame prefix: the driver
/// records the raw panic message.
fn panic_message(info: &PanicHookInfo<'_>) -> String {
    if let Some(s) = info.payload().downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = info.payload().downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
