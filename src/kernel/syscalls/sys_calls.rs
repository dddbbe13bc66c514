// System related system calls
use crate::interface;
use crate::interface::{syscall_failure, KernelError, KernelResult, Pid};

use super::sys_constants::*;
use crate::kernel::config::KernelConfig;
use crate::kernel::process::Process;
use crate::kernel::proctable::{ExitCause, ExitRecord, JoinMode};

/// Check an exec request against the argument limits and copy out the
/// arguments the new process will receive.
fn check_exec_args(
    config: &KernelConfig,
    program: &str,
    argc: i32,
    argv: &[&str],
) -> KernelResult<Vec<String>> {
    if program.len() > config.max_string_len {
        return Err(KernelError::InvalidArgument("program name too long"));
    }
    if argc < 0 || argc as usize >= config.max_argc {
        return Err(KernelError::InvalidArgument("argc out of range"));
    }
    let argc = argc as usize;
    if argv.len() < argc {
        return Err(KernelError::InvalidArgument(
            "argument vector shorter than argc",
        ));
    }

    let args = &argv[..argc];
    let mut blocksize = 0;
    for arg in args {
        if arg.len() > config.max_string_len {
            return Err(KernelError::InvalidArgument("argument too long"));
        }
        // pointer slot, the bytes, and the terminating NUL
        blocksize += ARG_POINTER_SIZE + arg.len() + 1;
    }
    if blocksize > config.arg_block_size {
        return Err(KernelError::InvalidArgument(
            "arguments do not fit in the argument block",
        ));
    }

    Ok(args.iter().map(|arg| arg.to_string()).collect())
}

impl Process {
    /// Start `program` as a new child of this process and return its id.
    pub fn exec_syscall(&self, program: &str, argc: i32, argv: &[&str]) -> i32 {
        let args = match check_exec_args(&self.kernel.config, program, argc, argv) {
            Ok(args) => args,
            Err(e) => return syscall_failure("exec", e),
        };

        match self.kernel.spawn(Some(self.pid), program, args) {
            Ok(childpid) => childpid,
            Err(e) => syscall_failure("exec", e),
        }
    }

    /// Wait for the child `pid` to terminate and reap it. The child's exit
    /// status is stored in `status`; the return value is that status, or
    /// `JOIN_HALTED_RETURN` if the child called halt.
    pub fn join_syscall(&self, pid: Pid, status: &mut i32) -> i32 {
        let kernel = &self.kernel;
        match kernel
            .proctable
            .join(self.pid, pid, JoinMode::Block, || kernel.is_halted())
        {
            Ok(exit) => {
                *status = exit.status;
                match exit.cause {
                    ExitCause::Halted => JOIN_HALTED_RETURN,
                    ExitCause::Exited | ExitCause::Faulted => exit.status,
                }
            }
            Err(e) => syscall_failure("join", e),
        }
    }

    pub fn exit_syscall(&self, status: i32) -> i32 {
        //flush anything left in stdout
        interface::flush_stdout();

        match self.kernel.terminate(self, ExitRecord::exited(status)) {
            Ok(()) => status,
            Err(e) => syscall_failure("exit", e),
        }
    }

    /// From the root this shuts the whole system down. Any other process is
    /// terminated as if it had called `exit(HALT_EXIT_STATUS)`.
    pub fn halt_syscall(&self) -> i32 {
        if !self.is_root() {
            log::info!("pid {} is not the root, halt terminates only itself", self.pid);
        }
        match self.kernel.terminate(self, ExitRecord::halted()) {
            Ok(()) => 0,
            Err(e) => syscall_failure("halt", e),
        }
    }

    pub fn getpid_syscall(&self) -> i32 {
        self.pid
    }

    // the root is its own parent
    pub fn getppid_syscall(&self) -> i32 {
        self.parent.unwrap_or(self.pid)
    }
}
