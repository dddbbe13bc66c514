// Define all syscall numbers

pub const HALT_SYSCALL: i32 = 0;
pub const EXIT_SYSCALL: i32 = 1;
pub const EXEC_SYSCALL: i32 = 2;
pub const JOIN_SYSCALL: i32 = 3;
pub const CREAT_SYSCALL: i32 = 4;
pub const OPEN_SYSCALL: i32 = 5;
pub const READ_SYSCALL: i32 = 6;
pub const WRITE_SYSCALL: i32 = 7;
pub const CLOSE_SYSCALL: i32 = 8;
pub const UNLINK_SYSCALL: i32 = 9;
pub const GETPID_SYSCALL: i32 = 10;
pub const GETPPID_SYSCALL: i32 = 11;
