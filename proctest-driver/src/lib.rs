//! The parent-side test driver: discovery, per-test child lifecycle, timeout
//! enforcement, and failure reporting. See `SPEC_FULL.md` §4.3.

mod discovery;
mod execution;

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use proctest_core::OpaqueContext;
use textwrap::Options;
use tracing::error;

pub use discovery::TestCatalogue;
pub use execution::FailedTest;

const SUMMARY_WIDTH: usize = 80;
const HANGING_INDENT: &str = "  ";

/// Runs every registered test in `client_exe` once each, in a fresh child
/// process, and prints a progress line per test followed by a summary.
///
/// Returns `true` in every case except discovery failure or another
/// catastrophic setup error — individual test failures are reported, not
/// propagated as an `Err`/`false` return.
pub fn run_driver(client_exe: &Path, contexts: &[OpaqueContext<'_>], timeout_ms: u32) -> bool {
    let timeout = Duration::from_millis(timeout_ms as u64);

    let catalogue = match discovery::discover(client_exe, timeout) {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "failed to read test info");
            return false;
        }
    };

    let mut failures = Vec::new();
    let stdout = std::io::stdout();

    for i in 0..catalogue.len() {
        let test_name = catalogue.test_name(i);
        let context_name = catalogue.context_name(i);

        {
            let mut out = stdout.lock();
            if context_name.is_empty() {
                let _ = write!(out, "{test_name} ...\t");
            } else {
                let _ = write!(out, "{test_name} ({context_name}) ...\t");
            }
            let _ = out.flush();
        }

        match execution::run_one(client_exe, &catalogue, i, contexts, timeout) {
            Ok(()) => println!("Success"),
            Err(failed) => {
                println!("Failed");
                failures.push(failed);
            }
        }
    }

    print_summary(&failures, catalogue.len());
    true
}

fn print_summary(failures: &[FailedTest], total: usize) {
    if failures.is_empty() {
        println!("All tests ({total}) succeeded");
        return;
    }

    eprintln!("\n{} / {} tests failed", failures.len(), total);

    let options = Options::new(SUMMARY_WIDTH)
        .initial_indent(HANGING_INDENT)
        .subsequent_indent(HANGING_INDENT);

    for failure in failures {
        let wrapped = textwrap::fill(&failure.message, &options);
        eprintln!(
            "\n===========\n\n\"{}\" failed with errors:\n{}",
            failure.test_name, wrapped
        );
    }

    eprintln!("\n===========");
}
