//! The child-side test runtime: registry, assertions, stack-trace scope, panic
//! hook, and the runner loop that answers one IPC request per process.

pub mod assertions;
pub mod context;
pub mod error_sink;
pub mod panic_hook;
pub mod registry;
pub mod runner;
pub mod stacktrace;

pub use context::OpaqueContext;
pub use error_sink::ErrorSink;
pub use registry::{all_tests, TestEntry, TestFn, TEST_REGISTRY};
pub use runner::run_client;
pub use stacktrace::{current_frame_name, StackFrame};

// Re-exported so `register_test!` can refer to `linkme` without every
// registering crate needing to name it explicitly as a direct dependency.
#[doc(hidden)]
pub use linkme;
