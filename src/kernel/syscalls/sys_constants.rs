// System related constants

use crate::interface::Pid;

// the first process created is the root; only it may halt the system
pub const ROOT_PID: Pid = 1;

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;

// status recorded when a non-root process calls halt
pub const HALT_EXIT_STATUS: i32 = 1;
// status recorded when a program faults
pub const FAULT_EXIT_STATUS: i32 = 0;
// what join returns for a child that terminated through halt
pub const JOIN_HALTED_RETURN: i32 = 1;

// EXEC ARGUMENT LIMITS

pub const DEFAULT_MAX_ARGC: usize = 256;
pub const DEFAULT_MAX_STRING_LEN: usize = 256;
// arguments are copied into a single page of the new process
pub const DEFAULT_ARG_BLOCK_SIZE: usize = 1024;
pub const ARG_POINTER_SIZE: usize = 4;
