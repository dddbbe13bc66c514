//! This module holds the implementations of every system call a process can
//! make, split into filesystem calls and system (process) calls.
//!
//! ## System Calls
//!
//! Process objects have one method per system call. They return a
//! non-negative value on success, or `-1` after logging the `Errno` that
//! caused the failure.
//!
//! - fs calls: `creat`, `open`, `read`, `write`, `close`, `unlink`
//! - sys calls: `halt`, `exit`, `exec`, `join`, `getpid`, `getppid`

pub mod fs_calls;
pub mod fs_constants;
pub mod sys_calls;
pub mod sys_constants;
pub use fs_constants::*;
pub use sys_constants::*;
