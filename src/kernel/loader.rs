//! Program loading and the process-side view of the syscall interface.
//!
//! A program is an entry point run on its own host thread with a
//! [`UserContext`]; whatever it returns becomes its exit status. Programs
//! are found by name through a [`ProgramLoader`]; [`ProgramRegistry`] is the
//! loader used by the binary and the tests.

use crate::interface;
use crate::interface::{KernelError, KernelResult, Pid};

use super::dispatcher::{dispatcher, Syscall};
use super::process::Process;

pub trait Program: Send + Sync {
    fn run(&self, ctx: &UserContext, args: &[String]) -> i32;
}

impl<F> Program for F
where
    F: Fn(&UserContext, &[String]) -> i32 + Send + Sync,
{
    fn run(&self, ctx: &UserContext, args: &[String]) -> i32 {
        self(ctx, args)
    }
}

pub trait ProgramLoader: Send + Sync {
    /// Resolve `name` to something runnable, or fail with `LoadFailure`.
    fn load(&self, name: &str) -> KernelResult<interface::RustRfc<dyn Program>>;
}

#[derive(Default)]
pub struct ProgramRegistry {
    programs: interface::RustLock<interface::RustHashMap<String, interface::RustRfc<dyn Program>>>,
}

impl ProgramRegistry {
    pub fn new() -> ProgramRegistry {
        ProgramRegistry::default()
    }

    pub fn register<F>(&self, name: &str, entry: F)
    where
        F: Fn(&UserContext, &[String]) -> i32 + Send + Sync + 'static,
    {
        self.register_program(name, interface::RustRfc::new(entry));
    }

    pub fn register_program(&self, name: &str, program: interface::RustRfc<dyn Program>) {
        self.programs.write().insert(name.to_string(), program);
    }

    pub fn unregister(&self, name: &str) -> bool {
        self.programs.write().remove(name).is_some()
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.programs.read().keys().cloned().collect();
        names.sort();
        names
    }
}

impl ProgramLoader for ProgramRegistry {
    fn load(&self, name: &str) -> KernelResult<interface::RustRfc<dyn Program>> {
        self.programs
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| KernelError::LoadFailure(name.to_string()))
    }
}

/// Unwind payload used to stop a program's thread once its process has
/// terminated (exit, non-root halt) or the system has shut down.
pub(crate) struct ProcessUnwind;

fn unwind_process() -> ! {
    std::panic::resume_unwind(Box::new(ProcessUnwind))
}

/// The syscall interface as a running program sees it. Each call goes
/// through the dispatcher and returns the raw integer result, except the
/// calls that terminate the process, which do not return.
pub struct UserContext {
    process: interface::RustRfc<Process>,
}

impl UserContext {
    pub(crate) fn new(process: interface::RustRfc<Process>) -> UserContext {
        UserContext { process }
    }

    pub fn pid(&self) -> Pid {
        self.process.pid
    }

    pub fn process(&self) -> &Process {
        &self.process
    }

    fn syscall(&self, call: Syscall<'_>) -> i32 {
        let rv = dispatcher(&self.process, call);
        if rv < 0 && self.process.kernel.is_halted() {
            // no user code runs past a syscall once the system is down
            unwind_process();
        }
        rv
    }

    pub fn exec(&self, program: &str, args: &[&str]) -> i32 {
        self.syscall(Syscall::Exec {
            program: Some(program),
            argc: args.len() as i32,
            argv: Some(args),
        })
    }

    pub fn join(&self, pid: Pid, status: &mut i32) -> i32 {
        self.syscall(Syscall::Join {
            pid,
            status: Some(status),
        })
    }

    pub fn exit(&self, status: i32) -> ! {
        self.syscall(Syscall::Exit { status });
        unwind_process()
    }

    pub fn halt(&self) -> ! {
        self.syscall(Syscall::Halt);
        unwind_process()
    }

    pub fn creat(&self, name: &str) -> i32 {
        self.syscall(Syscall::Creat { name: Some(name) })
    }

    pub fn open(&self, name: &str) -> i32 {
        self.syscall(Syscall::Open { name: Some(name) })
    }

    pub fn read(&self, fd: i32, buf: &mut [u8]) -> i32 {
        self.syscall(Syscall::Read { fd, buf: Some(buf) })
    }

    pub fn write(&self, fd: i32, buf: &[u8]) -> i32 {
        self.syscall(Syscall::Write { fd, buf: Some(buf) })
    }

    pub fn close(&self, fd: i32) -> i32 {
        self.syscall(Syscall::Close { fd })
    }

    pub fn unlink(&self, name: &str) -> i32 {
        self.syscall(Syscall::Unlink { name: Some(name) })
    }

    pub fn getpid(&self) -> i32 {
        self.syscall(Syscall::GetPid)
    }

    pub fn getppid(&self) -> i32 {
        self.syscall(Syscall::GetPpid)
    }

    /// Print `s` to standard output.
    pub fn print(&self, s: &str) -> i32 {
        self.write(super::syscalls::STDOUT_FILENO, s.as_bytes())
    }
}
