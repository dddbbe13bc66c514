// Syscall entry point: validate the raw arguments of a request and route it
// to the implementing method on the calling process.

use crate::interface;
use crate::interface::errnos::*;

use super::process::Process;
use super::syscall_numbers::*;

/// One syscall request as a process issues it. Pointer arguments are
/// optional because a process may pass a null pointer; the dispatcher
/// rejects those before the call reaches its implementation.
#[derive(Debug)]
pub enum Syscall<'a> {
    Halt,
    Exit {
        status: i32,
    },
    Exec {
        program: Option<&'a str>,
        argc: i32,
        argv: Option<&'a [&'a str]>,
    },
    Join {
        pid: interface::Pid,
        status: Option<&'a mut i32>,
    },
    Creat {
        name: Option<&'a str>,
    },
    Open {
        name: Option<&'a str>,
    },
    Read {
        fd: i32,
        buf: Option<&'a mut [u8]>,
    },
    Write {
        fd: i32,
        buf: Option<&'a [u8]>,
    },
    Close {
        fd: i32,
    },
    Unlink {
        name: Option<&'a str>,
    },
    GetPid,
    GetPpid,
}

impl Syscall<'_> {
    pub fn number(&self) -> i32 {
        match self {
            Syscall::Halt => HALT_SYSCALL,
            Syscall::Exit { .. } => EXIT_SYSCALL,
            Syscall::Exec { .. } => EXEC_SYSCALL,
            Syscall::Join { .. } => JOIN_SYSCALL,
            Syscall::Creat { .. } => CREAT_SYSCALL,
            Syscall::Open { .. } => OPEN_SYSCALL,
            Syscall::Read { .. } => READ_SYSCALL,
            Syscall::Write { .. } => WRITE_SYSCALL,
            Syscall::Close { .. } => CLOSE_SYSCALL,
            Syscall::Unlink { .. } => UNLINK_SYSCALL,
            Syscall::GetPid => GETPID_SYSCALL,
            Syscall::GetPpid => GETPPID_SYSCALL,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Syscall::Halt => "halt",
            Syscall::Exit { .. } => "exit",
            Syscall::Exec { .. } => "exec",
            Syscall::Join { .. } => "join",
            Syscall::Creat { .. } => "creat",
            Syscall::Open { .. } => "open",
            Syscall::Read { .. } => "read",
            Syscall::Write { .. } => "write",
            Syscall::Close { .. } => "close",
            Syscall::Unlink { .. } => "unlink",
            Syscall::GetPid => "getpid",
            Syscall::GetPpid => "getppid",
        }
    }
}

//this macro takes in a syscall invocation name (i.e. process.open_syscall), and all of the
//arguments to the syscall. Then it unwraps the arguments, returning the error if any one of them
//is an error value, and returning the value of the function if not. It does this by using the ?
//operator in the body of a closure within the variadic macro
macro_rules! check_and_dispatch {
    ( $process:ident . $func:ident, $($arg:expr),* ) => {
        match (|| Ok($process.$func( $($arg?),* )))() {
            Ok(i) => i, Err(i) => i
        }
    };
}

pub fn dispatcher(process: &Process, call: Syscall<'_>) -> i32 {
    let name = call.name();

    // once the system is halted nothing runs on behalf of a process any more
    if process.kernel.is_halted() {
        return syscall_error(Errno::ECANCELED, name, "system is shutting down");
    }
    // nor for a process that has already terminated
    if !process.kernel.proctable.is_running(process.pid) {
        return syscall_failure(
            name,
            KernelError::InvalidArgument("calling process has terminated"),
        );
    }

    log::trace!("pid {} -> {} (#{})", process.pid, name, call.number());

    let rv = match call {
        Syscall::Halt => {
            check_and_dispatch!(process.halt_syscall,)
        }
        Syscall::Exit { status } => {
            check_and_dispatch!(process.exit_syscall, Ok::<i32, i32>(status))
        }
        Syscall::Exec {
            program,
            argc,
            argv,
        } => {
            check_and_dispatch!(
                process.exec_syscall,
                interface::get_cstr(program, name),
                Ok::<i32, i32>(argc),
                interface::get_strarr(argv, name)
            )
        }
        Syscall::Join { pid, status } => {
            check_and_dispatch!(
                process.join_syscall,
                Ok::<interface::Pid, i32>(pid),
                interface::get_intptr(status, name)
            )
        }
        Syscall::Creat { name: path } => {
            check_and_dispatch!(process.creat_syscall, interface::get_cstr(path, name))
        }
        Syscall::Open { name: path } => {
            check_and_dispatch!(process.open_syscall, interface::get_cstr(path, name))
        }
        Syscall::Read { fd, buf } => {
            check_and_dispatch!(
                process.read_syscall,
                Ok::<i32, i32>(fd),
                interface::get_mutcbuf(buf, name)
            )
        }
        Syscall::Write { fd, buf } => {
            check_and_dispatch!(
                process.write_syscall,
                Ok::<i32, i32>(fd),
                interface::get_cbuf(buf, name)
            )
        }
        Syscall::Close { fd } => {
            check_and_dispatch!(process.close_syscall, Ok::<i32, i32>(fd))
        }
        Syscall::Unlink { name: path } => {
            check_and_dispatch!(
                process.unlink_syscall,
                interface::get_cstr_or_noent(path, name)
            )
        }
        Syscall::GetPid => {
            check_and_dispatch!(process.getpid_syscall,)
        }
        Syscall::GetPpid => {
            check_and_dispatch!(process.getppid_syscall,)
        }
    };

    log::trace!("pid {} <- {} = {}", process.pid, name, rv);
    rv
}
