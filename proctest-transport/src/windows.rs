//! Named-pipe parity layer, kept for platform coverage but not exercised by the
//! test suite (CI for this crate runs on Unix). Mirrors the original's
//! `\\.\pipe\AxleTestServer` naming and overlapped-I/O duplex pipe, minus the
//! overlapped part: `ReadFile`/`WriteFile` here are issued synchronously against
//! a pipe created without `FILE_FLAG_OVERLAPPED`, which is sufficient for a
//! strict request/response protocol where only one side ever has a pending I/O
//! at a time.

use std::ffi::CString;
use std::io;
use std::ptr;

use windows_sys::Win32::Foundation::{CloseHandle, GENERIC_READ, GENERIC_WRITE, HANDLE, INVALID_HANDLE_VALUE};
use windows_sys::Win32::Storage::FileSystem::{CreateFileA, ReadFile, WriteFile, OPEN_EXISTING};
use windows_sys::Win32::System::Pipes::{
    ConnectNamedPipe, CreateNamedPipeA, PIPE_ACCESS_DUPLEX, PIPE_READMODE_BYTE, PIPE_TYPE_BYTE,
    PIPE_WAIT,
};

use proctest_proto::{ByteSink, ByteSource};

/// Name of the named pipe the driver listens on. Kept identical to the
/// original so the two implementations can be told apart only by platform.
pub const PIPE_NAME: &str = r"\\.\pipe\ProcTestServer";

pub struct NamedPipeChannel {
    handle: HANDLE,
}

// SAFETY: a Win32 pipe HANDLE is not bound to a thread; this type is used from
// a single thread at a time in practice (one channel per child process).
unsafe impl Send for NamedPipeChannel {}

impl NamedPipeChannel {
    /// Driver side: creates and waits for a single client connection.
    pub fn listen() -> io::Result<Self> {
        let name = CString::new(PIPE_NAME).expect("pipe name has no interior NUL");
        // SAFETY: all arguments are valid for the duration of the call; the
        // returned handle is checked against INVALID_HANDLE_VALUE below.
        let handle = unsafe {
            CreateNamedPipeA(
                name.as_ptr() as *const u8,
                PIPE_ACCESS_DUPLEX,
                PIPE_TYPE_BYTE | PIPE_READMODE_BYTE | PIPE_WAIT,
                1,
                4096,
                4096,
                0,
                ptr::null(),
            )
        };
        if handle == INVALID_HANDLE_VALUE {
            return Err(io::Error::last_os_error());
        }
        // SAFETY: handle was just created successfully by CreateNamedPipeA above.
        let ok = unsafe { ConnectNamedPipe(handle, ptr::null_mut()) };
        if ok == 0 {
            let err = io::Error::last_os_error();
            // SAFETY: handle is valid and owned by this function on this path.
            unsafe { CloseHandle(handle) };
            return Err(err);
        }
        Ok(Self { handle })
    }

    /// Runner side: opens the pipe the driver is listening on.
    pub fn connect() -> io::Result<Self> {
        let name = CString::new(PIPE_NAME).expect("pipe name has no interior NUL");
        // SAFETY: all arguments are valid for the duration of the call.
        let handle = unsafe {
            CreateFileA(
                name.as_ptr() as *const u8,
                GENERIC_READ | GENERIC_WRITE,
                0,
                ptr::null(),
                OPEN_EXISTING,
                0,
                0,
            )
        };
        if handle == INVALID_HANDLE_VALUE {
            return Err(io::Error::last_os_error());
        }
        Ok(Self { handle })
    }
}

impl Drop for NamedPipeChannel {
    fn drop(&mut self) {
        // SAFETY: handle is owned exclusively by this struct.
        unsafe {
            CloseHandle(self.handle);
        }
    }
}

impl ByteSink for NamedPipeChannel {
    fn write_all(&mut self, buf: &[u8]) {
        let mut remaining = buf;
        while !remaining.is_empty() {
            let mut written = 0u32;
            // SAFETY: handle is valid for the life of self; remaining/len describe
            // a valid slice; written is a valid out-pointer.
            let ok = unsafe {
                WriteFile(
                    self.handle,
                    remaining.as_ptr(),
                    remaining.len() as u32,
                    &mut written,
                    ptr::null_mut(),
                )
            };
            if ok == 0 || written == 0 {
                return;
            }
            remaining = &remaining[written as usize..];
        }
    }
}

impl ByteSource for NamedPipeChannel {
    fn read_exact(&mut self, buf: &mut [u8]) -> bool {
        let mut filled = 0usize;
        while filled < buf.len() {
            let mut read = 0u32;
            // SAFETY: handle is valid for the life of self; the destination
            // pointer/len describe the unfilled tail of buf; read is a valid
            // out-pointer.
            let ok = unsafe {
                ReadFile(
                    self.handle,
                    buf[filled..].as_mut_ptr(),
                    (buf.len() - filled) as u32,
                    &mut read,
                    ptr::null_mut(),
                )
            };
            if ok == 0 || read == 0 {
                return false;
            }
            filled += read as usize;
        }
        true
    }
}
