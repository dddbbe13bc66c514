// Error taxonomy shared by the kernel components and the syscall boundary.

use crate::interface::Pid;

/// Value every failing syscall hands back to the calling process.
pub const SYSCALL_FAILURE: i32 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum Errno {
    ENOENT = 2,      /* No such file or directory */
    ESRCH = 3,       /* No such process */
    ENOEXEC = 8,     /* Exec format error */
    EBADF = 9,       /* Bad file number */
    ECHILD = 10,     /* No child processes */
    EAGAIN = 11,     /* Try again */
    EINVAL = 22,     /* Invalid argument */
    EMFILE = 24,     /* Too many open files */
    ECANCELED = 125, /* Operation canceled */
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KernelError {
    #[error("no such name or process: {0}")]
    NotFound(String),
    #[error("descriptor {0} is out of range or unbound")]
    InvalidDescriptor(i32),
    #[error("descriptor table is full")]
    DescriptorTableFull,
    #[error("process {0} is not a child of the caller")]
    NotAChild(Pid),
    #[error("process {0} is still running")]
    StillRunning(Pid),
    #[error("process {0} was already reaped")]
    AlreadyReaped(Pid),
    #[error("cannot load program {0}")]
    LoadFailure(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    #[error("system is shutting down")]
    ShuttingDown,
}

impl KernelError {
    pub fn errno(&self) -> Errno {
        match self {
            KernelError::NotFound(_) => Errno::ENOENT,
            KernelError::InvalidDescriptor(_) => Errno::EBADF,
            KernelError::DescriptorTableFull => Errno::EMFILE,
            KernelError::NotAChild(_) => Errno::ECHILD,
            KernelError::StillRunning(_) => Errno::EAGAIN,
            KernelError::AlreadyReaped(_) => Errno::ESRCH,
            KernelError::LoadFailure(_) => Errno::ENOEXEC,
            KernelError::InvalidArgument(_) => Errno::EINVAL,
            KernelError::ShuttingDown => Errno::ECANCELED,
        }
    }
}

pub type KernelResult<T> = Result<T, KernelError>;

/// Log a failed syscall and produce the value returned to the process.
pub fn syscall_error(e: Errno, syscall: &str, message: &str) -> i32 {
    log::debug!("syscall {} failed with {:?}: {}", syscall, e, message);
    SYSCALL_FAILURE
}

pub fn syscall_failure(syscall: &str, err: KernelError) -> i32 {
    syscall_error(err.errno(), syscall, &err.to_string())
}
