// File system related constants

pub const STDIN_FILENO: i32 = 0;
pub const STDOUT_FILENO: i32 = 1;

// creat/open never hand out descriptors below this one
pub const STARTINGFD: i32 = 2;
// size of every process's descriptor table, standard streams included
pub const MAXFD: i32 = 16;

pub const FIRSTINODE: usize = 1;

pub const DEFAULT_MAX_WRITE_SIZE: usize = 65536;

// byte counts are returned as i32, so no single read or write moves more
pub const MAX_TRANSFER_SIZE: usize = i32::MAX as usize;
