//! The two transport flavours from `SPEC_FULL.md` §4.2, both built over a
//! `UnixStream` half of a socket pair. A socket pair is the Unix-domain-socket
//! stand-in for the original's duplex named pipe: unlike an anonymous OS pipe it
//! supports independent `SO_RCVTIMEO`/`SO_SNDTIMEO` deadlines, which the timeout
//! channel needs.

use std::cell::Cell;
use std::io::{self, ErrorKind, Read, Write};
use std::os::unix::net::UnixStream;
use std::time::{Duration, Instant};

use proctest_proto::{ByteSink, ByteSource};

/// Infinite-blocking duplex channel. Used by the runner: the child never has a
/// deadline of its own, only the driver watching it from outside does.
pub struct BlockingChannel {
    stream: UnixStream,
}

impl BlockingChannel {
    pub fn new(stream: UnixStream) -> Self {
        Self { stream }
    }
}

impl ByteSink for BlockingChannel {
    fn write_all(&mut self, buf: &[u8]) {
        // Infallible at the codec layer: if the driver has already given up and
        // closed its end, the write fails silently and the process exits shortly
        // after anyway.
        let _ = Write::write_all(&mut self.stream, buf);
    }
}

impl ByteSource for BlockingChannel {
    fn read_exact(&mut self, buf: &mut [u8]) -> bool {
        Read::read_exact(&mut self.stream, buf).is_ok()
    }
}

/// Duplex channel with a per-operation deadline, applied via `SO_RCVTIMEO` /
/// `SO_SNDTIMEO`. Used by the driver, which is the only side that ever needs to
/// detect a hung or crash-looping child.
pub struct TimeoutChannel {
    stream: UnixStream,
    timeout: Duration,
    write_failed: Cell<bool>,
}

impl TimeoutChannel {
    pub fn new(stream: UnixStream, timeout: Duration) -> Self {
        Self {
            stream,
            timeout,
            write_failed: Cell::new(false),
        }
    }

    /// Whether every `write_all` call made so far has completed within its
    /// deadline. The driver checks this after issuing a request and before
    /// waiting for the report, since a failed write makes waiting for a reply
    /// pointless.
    pub fn write_ok(&self) -> bool {
        !self.write_failed.get()
    }

    fn is_would_block_or_timeout(err: &io::Error) -> bool {
        matches!(
            err.kind(),
            ErrorKind::WouldBlock | ErrorKind::TimedOut
        )
    }
}

impl ByteSink for TimeoutChannel {
    fn write_all(&mut self, buf: &[u8]) {
        if self.write_failed.get() {
            return;
        }
        if self.stream.set_write_timeout(Some(self.timeout)).is_err() {
            self.write_failed.set(true);
            return;
        }

        let deadline = Instant::now() + self.timeout;
        let mut remaining = buf;
        while !remaining.is_empty() {
            if Instant::now() >= deadline {
                self.write_failed.set(true);
                return;
            }
            match self.stream.write(remaining) {
                Ok(0) => {
                    self.write_failed.set(true);
                    return;
                }
                Ok(n) => remaining = &remaining[n..],
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) if Self::is_would_block_or_timeout(&e) => {
                    self.write_failed.set(true);
                    return;
                }
                Err(_) => {
                    self.write_failed.set(true);
                    return;
                }
            }
        }
    }
}

impl ByteSource for TimeoutChannel {
    fn read_exact(&mut self, buf: &mut [u8]) -> bool {
        if self.stream.set_read_timeout(Some(self.timeout)).is_err() {
            return false;
        }

        let mut filled = 0;
        while filled < buf.len() {
            match self.stream.read(&mut buf[filled..]) {
                Ok(0) => return false,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(_) => return false,
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proctest_proto::{read_u32, write_u32, LittleEndian};
    use std::thread;

    #[test]
    fn blocking_channel_round_trips() {
        let (a, b) = UnixStream::pair().unwrap();
        let mut writer = BlockingChannel::new(a);
        let mut reader = BlockingChannel::new(b);

        let handle = thread::spawn(move || {
            write_u32::<LittleEndian>(&mut writer, 0xabcd1234);
        });
        let got = read_u32::<LittleEndian>(&mut reader);
        handle.join().unwrap();
        assert_eq!(got, Some(0xabcd1234));
    }

    #[test]
    fn timeout_channel_times_out_on_silent_peer() {
        let (_a, b) = UnixStream::pair().unwrap();
        let mut reader = TimeoutChannel::new(b, Duration::from_millis(50));
        let mut buf = [0u8; 4];
        let start = Instant::now();
        assert!(!reader.read_exact(&mut buf));
        assert!(start.elapsed() >= Duration::from_millis(40));
    }

    #[test]
    fn timeout_channel_round_trips_when_peer_is_prompt() {
        let (a, b) = UnixStream::pair().unwrap();
        let mut writer = TimeoutChannel::new(a, Duration::from_secs(1));
        let mut reader = TimeoutChannel::new(b, Duration::from_secs(1));

        let handle = thread::spawn(move || {
            write_u32::<LittleEndian>(&mut writer, 7);
            writer.write_ok()
        });
        let got = read_u32::<LittleEndian>(&mut reader);
        assert!(handle.join().unwrap());
        assert_eq!(got, Some(7));
    }
}
