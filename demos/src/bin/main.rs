//! Same binary, two roles: `server` runs the driver against this very
//! executable, which the driver spawns with no arguments; invoked that way
//! (no subcommand) this binary runs the runner loop instead of erroring out,
//! since that's the only way the child side of the protocol is ever reached.
//! A real consumer would link `proctest-core`/`proctest-driver` the same way
//! and point `server` at their own test binary instead.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use proctest_core::OpaqueContext;

#[derive(Parser)]
#[command(name = "proctest-demos", about = "Process-isolated unit test harness")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the test driver against a client executable.
    Server {
        /// Path to the client executable (normally this same binary).
        client_exe: PathBuf,

        #[arg(long, default_value_t = 5_000)]
        timeout_ms: u32,

        /// A context entry as NAME=HEXBYTES, may be repeated.
        #[arg(long = "context", value_parser = parse_context)]
        contexts: Vec<(String, Vec<u8>)>,
    },
    /// Run the test runner explicitly. Equivalent to passing no subcommand at
    /// all, which is how the driver actually invokes the child.
    Client,
}

fn parse_context(s: &str) -> Result<(String, Vec<u8>), String> {
    let (name, hex_bytes) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=HEXBYTES, got {s:?}"))?;
    let bytes = hex::decode(hex_bytes).map_err(|e| format!("invalid hex in {s:?}: {e}"))?;
    Ok((name.to_string(), bytes))
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Command::Server {
            client_exe,
            timeout_ms,
            contexts,
        }) => {
            let contexts: Vec<OpaqueContext<'_>> = contexts
                .iter()
                .map(|(name, data)| OpaqueContext::new(name.as_str(), data.as_slice()))
                .collect();

            let ok = proctest_driver::run_driver(&client_exe, &contexts, timeout_ms);
            Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
        }
        Some(Command::Client) | None => {
            proctest_demos::ensure_linked();
            let ok = proctest_core::run_client();
            Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
        }
    }
}
