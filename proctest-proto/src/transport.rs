//! The minimal transport contract the codec is built against. Concrete transports
//! (a blocking channel, a timeout-bounded channel) live in `proctest-transport` and
//! implement these two traits; the codec in this crate never sees a socket directly.

/// A byte sink. `write_all` is infallible at the codec layer: a transport that can't
/// complete a write is expected to panic or abort the process (the driver's timeout
/// transport does the latter), so callers never have to thread a write error through
/// every composite serializer.
pub trait ByteSink {
    fn write_all(&mut self, buf: &[u8]);
}

/// A byte source. `read_exact` reports success as a `bool` rather than `io::Result`,
/// matching the original C++ transport contract: a short read, a closed pipe, or a
/// timeout are all just "false" to the codec, which only needs to know whether to
/// keep going.
pub trait ByteSource {
    fn read_exact(&mut self, buf: &mut [u8]) -> bool;
}

impl ByteSink for Vec<u8> {
    fn write_all(&mut self, buf: &[u8]) {
        self.extend_from_slice(buf);
    }
}

/// A cursor-style reader over an in-memory buffer, used by the codec's own tests.
pub struct SliceSource<'a> {
    data: &'a [u8],
}

impl<'a> SliceSource<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    pub fn remaining(&self) -> usize {
        self.data.len()
    }
}

impl ByteSource for SliceSource<'_> {
    fn read_exact(&mut self, buf: &mut [u8]) -> bool {
        if self.data.len() < buf.len() {
            return false;
        }
        let (head, tail) = self.data.split_at(buf.len());
        buf.copy_from_slice(head);
        self.data = tail;
        true
    }
}
