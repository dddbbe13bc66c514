// Console streams bound to descriptors 0 and 1 of every process.

use std::collections::VecDeque;
use std::io::{Read, Write};

use crate::interface::RustMutex;

pub trait Console: Send + Sync {
    /// Read up to `buf.len()` bytes of console input. Returns 0 when no input
    /// is available.
    fn read(&self, buf: &mut [u8]) -> usize;

    /// Write `buf` to console output and return how many bytes were taken.
    fn write(&self, buf: &[u8]) -> usize;
}

/// Console backed by the host's stdin/stdout.
#[derive(Debug, Default)]
pub struct StdConsole;

impl Console for StdConsole {
    fn read(&self, buf: &mut [u8]) -> usize {
        std::io::stdin().lock().read(buf).unwrap_or(0)
    }

    fn write(&self, buf: &[u8]) -> usize {
        let mut out = std::io::stdout().lock();
        match out.write_all(buf).and_then(|_| out.flush()) {
            Ok(()) => buf.len(),
            Err(_) => 0,
        }
    }
}

/// In-memory console. Input is queued with `push_input`, output accumulates
/// until taken.
#[derive(Debug, Default)]
pub struct BufferConsole {
    input: RustMutex<VecDeque<u8>>,
    output: RustMutex<Vec<u8>>,
}

impl BufferConsole {
    pub fn new() -> BufferConsole {
        BufferConsole::default()
    }

    pub fn push_input(&self, bytes: &[u8]) {
        self.input.lock().extend(bytes.iter().copied());
    }

    pub fn output(&self) -> Vec<u8> {
        self.output.lock().clone()
    }

    pub fn output_string(&self) -> String {
        String::from_utf8_lossy(&self.output.lock()).into_owned()
    }

    pub fn take_output(&self) -> Vec<u8> {
        std::mem::take(&mut *self.output.lock())
    }
}

impl Console for BufferConsole {
    fn read(&self, buf: &mut [u8]) -> usize {
        let mut input = self.input.lock();
        let count = buf.len().min(input.len());
        for (slot, byte) in buf.iter_mut().zip(input.drain(..count)) {
            *slot = byte;
        }
        count
    }

    fn write(&self, buf: &[u8]) -> usize {
        self.output.lock().extend_from_slice(buf);
        buf.len()
    }
}
