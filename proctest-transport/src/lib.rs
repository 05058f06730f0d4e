//! Duplex channel transports and runner-process lifecycle management.
//!
//! `proctest-proto` defines the wire format; this crate supplies the two
//! concrete [`proctest_proto::ByteSink`]/[`proctest_proto::ByteSource`]
//! implementations used to carry it (a blocking one for the runner, a
//! timeout-bounded one for the driver) and the [`ChildProcess`] RAII wrapper
//! that spawns a runner and guarantees its teardown.

#[cfg(unix)]
mod channel;
#[cfg(unix)]
mod child;

#[cfg(windows)]
pub mod windows;

#[cfg(unix)]
pub use channel::{BlockingChannel, TimeoutChannel};
#[cfg(unix)]
pub use child::ChildProcess;
