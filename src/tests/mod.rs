mod fs_tests;

use std::time::Duration;

use crate::interface;
use crate::interface::BufferConsole;
use crate::kernel::{Kernel, KernelConfig, ProgramRegistry};

// upper bound on any wait in a test; hitting it means the test failed
pub const TIMEOUT: Duration = Duration::from_secs(10);

/// Fresh kernel with a capturing console. Every test builds its own, so
/// tests never share process or file state.
pub fn test_kernel(registry: ProgramRegistry) -> (Kernel, interface::RustRfc<BufferConsole>) {
    test_kernel_with_config(registry, KernelConfig::default())
}

pub fn test_kernel_with_config(
    registry: ProgramRegistry,
    config: KernelConfig,
) -> (Kernel, interface::RustRfc<BufferConsole>) {
    let console = interface::RustRfc::new(BufferConsole::new());
    let kernel = Kernel::new(config, interface::RustRfc::new(registry), console.clone());
    (kernel, console)
}

/// Poll `cond` until it holds or `timeout` passes.
pub fn wait_until<F: Fn() -> bool>(timeout: Duration, cond: F) -> bool {
    let deadline = std::time::Instant::now() + timeout;
    while !cond() {
        if std::time::Instant::now() >= deadline {
            return false;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    true
}

pub fn sizecbuf(size: usize) -> Box<[u8]> {
    let v = vec![0u8; size];
    v.into_boxed_slice()
}

pub fn cbuf2str(buf: &[u8]) -> &str {
    std::str::from_utf8(buf).unwrap()
}

/// One-shot latch a test program can block on until the test releases it.
#[derive(Default)]
pub struct Gate {
    open: interface::RustMutex<bool>,
    cv: interface::RustCondvar,
}

impl Gate {
    pub fn new() -> interface::RustRfc<Gate> {
        interface::RustRfc::new(Gate::default())
    }

    pub fn wait(&self) {
        let mut open = self.open.lock();
        while !*open {
            self.cv.wait(&mut open);
        }
    }

    pub fn release(&self) {
        *self.open.lock() = true;
        self.cv.notify_all();
    }
}
