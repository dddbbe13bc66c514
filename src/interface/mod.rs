//! Module definitions for the host interface
//!
//! ## Interface Module
//!
//! Everything the kernel needs from the host goes through this module: lock
//! and collection types, the logging sink, console streams, the errno
//! taxonomy and the helpers that validate raw syscall arguments. Kernel code
//! refers to these through `interface::` so the set of host facilities it
//! depends on stays visible in one place.

mod console;
pub mod errnos;
mod misc;
pub mod types;
pub use console::*;
pub use errnos::*;
pub use misc::*;
pub use types::*;
