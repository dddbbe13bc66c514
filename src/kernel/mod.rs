//! This module implements the process lifecycle and the descriptor-based
//! file interface that user programs reach through system calls.
//!
//! ## top-level features:
//!
//! - ### Dispatcher:
//!     - The dispatcher receives a system call request from a process,
//!       validates its raw arguments and calls the method on the process
//!       object that implements it. Every failure is reported as `-1`.
//!
//! - ### Process Objects:
//!     - Each process has an id, the id of the process that created it, the
//!       program it runs and a fixed-size File Descriptor Table. Slots 0 and
//!       1 start bound to the console.
//!
//! - ### Process Table:
//!     - Tracks whether each process is running or a zombie, who its parent
//!       is and which children it may still join. Ids are never reused.
//!
//! - ### Name Directory:
//!     - Maps file names to storage and counts how many descriptors hold
//!       each entry, so an unlinked file survives until its last close.
//!
//! - ### Kernel:
//!     - Boots the root program, runs each process on a host thread of its
//!       own, and shuts everything down when the root exits or halts.

pub mod config;
pub mod dispatcher;
pub mod filesystem;
#[allow(clippy::module_inception)]
pub mod kernel;
pub mod loader;
pub mod process;
pub mod proctable;
pub mod syscall_numbers;
pub mod syscalls;

pub use config::{ConfigError, KernelConfig};
pub use kernel::{Kernel, KernelState, ShutdownReason};
pub use loader::{Program, ProgramLoader, ProgramRegistry, UserContext};
pub use process::Process;
pub use proctable::{ExitCause, ExitRecord, JoinMode, ProcessState};
