use crate::interface::errnos::{syscall_error, Errno};

/// Process identity. Ids are allocated from 1 upward and never recycled.
pub type Pid = i32;

// The accessors below mirror how a process hands arguments to the kernel:
// names and buffers may be absent (a null pointer on a real machine) and
// that has to be rejected before the call reaches its implementation.

pub fn get_cstr<'a>(arg: Option<&'a str>, syscall: &str) -> Result<&'a str, i32> {
    match arg {
        Some(s) => Ok(s),
        None => Err(syscall_error(Errno::EINVAL, syscall, "name pointer was null")),
    }
}

/// Like `get_cstr` but a null name is reported as a missing entry, which is
/// what `unlink` does.
pub fn get_cstr_or_noent<'a>(arg: Option<&'a str>, syscall: &str) -> Result<&'a str, i32> {
    match arg {
        Some(s) => Ok(s),
        None => Err(syscall_error(Errno::ENOENT, syscall, "name pointer was null")),
    }
}

pub fn get_cbuf<'a>(arg: Option<&'a [u8]>, syscall: &str) -> Result<&'a [u8], i32> {
    match arg {
        Some(buf) => Ok(buf),
        None => Err(syscall_error(Errno::EINVAL, syscall, "buffer pointer was null")),
    }
}

pub fn get_mutcbuf<'a>(arg: Option<&'a mut [u8]>, syscall: &str) -> Result<&'a mut [u8], i32> {
    match arg {
        Some(buf) => Ok(buf),
        None => Err(syscall_error(Errno::EINVAL, syscall, "buffer pointer was null")),
    }
}

pub fn get_intptr<'a>(arg: Option<&'a mut i32>, syscall: &str) -> Result<&'a mut i32, i32> {
    match arg {
        Some(ptr) => Ok(ptr),
        None => Err(syscall_error(Errno::EINVAL, syscall, "status pointer was null")),
    }
}

pub fn get_strarr<'a>(arg: Option<&'a [&'a str]>, syscall: &str) -> Result<&'a [&'a str], i32> {
    match arg {
        Some(arr) => Ok(arr),
        None => Err(syscall_error(Errno::EINVAL, syscall, "argument vector was null")),
    }
}
