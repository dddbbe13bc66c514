//! Kernel lifecycle: creating processes, terminating them and shutting the
//! system down.
//!
//! [`KernelState`] is shared by every process of one kernel instance.
//! [`Kernel`] is the handle the embedding program holds to boot a root
//! program and wait for the system to stop. Instances are independent, so
//! several kernels may run side by side in one host process.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::thread;
use std::time::{Duration, Instant};

use crate::interface;
use crate::interface::{Console, KernelError, KernelResult, Pid, StdConsole};

use super::config::KernelConfig;
use super::dispatcher::{dispatcher, Syscall};
use super::filesystem::NameDirectory;
use super::loader::{Program, ProcessUnwind, ProgramLoader, UserContext};
use super::process::Process;
use super::proctable::{ExitCause, ExitRecord, ProcessTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// the root called halt, or the embedding program stopped the kernel
    Halted,
    /// the root terminated with this status
    RootExited(i32),
}

pub struct KernelState {
    pub config: KernelConfig,
    pub proctable: ProcessTable,
    pub filesystem: NameDirectory,
    pub(crate) loader: interface::RustRfc<dyn ProgramLoader>,
    pub(crate) console: interface::RustRfc<dyn Console>,
    root_created: interface::RustAtomicBool,
    halted: interface::RustAtomicBool,
    shutdown: interface::RustMutex<Option<ShutdownReason>>,
    shutdown_cv: interface::RustCondvar,
    // host threads still running a program
    live_threads: interface::RustMutex<usize>,
    threads_cv: interface::RustCondvar,
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown fault".to_string()
    }
}

impl KernelState {
    pub fn is_halted(&self) -> bool {
        self.halted.load(interface::RustAtomicOrdering::SeqCst)
    }

    fn claim_root(&self) -> KernelResult<()> {
        if self
            .root_created
            .swap(true, interface::RustAtomicOrdering::SeqCst)
        {
            return Err(KernelError::InvalidArgument("root process already exists"));
        }
        Ok(())
    }

    /// Allocate an id for `program`, register it and enter the table. The
    /// program is loaded before anything else so a load failure consumes no
    /// id.
    fn create_process(
        self: &interface::RustRfc<Self>,
        parent: Option<Pid>,
        program: &str,
        args: Vec<String>,
    ) -> KernelResult<(interface::RustRfc<Process>, interface::RustRfc<dyn Program>)> {
        if self.is_halted() {
            return Err(KernelError::ShuttingDown);
        }
        let entry = self.loader.load(program)?;
        if parent.is_none() {
            self.claim_root()?;
        }

        let pid = self.proctable.allocate_pid();
        let process = interface::RustRfc::new(Process::new(
            pid,
            parent,
            program.to_string(),
            args,
            self.clone(),
        ));
        self.proctable.insert(process.clone())?;
        log::info!(
            "created pid {} running {} {:?} (parent {:?})",
            pid,
            program,
            process.args,
            parent
        );
        Ok((process, entry))
    }

    /// Create a process and start its program on a host thread of its own.
    pub(crate) fn spawn(
        self: &interface::RustRfc<Self>,
        parent: Option<Pid>,
        program: &str,
        args: Vec<String>,
    ) -> KernelResult<Pid> {
        let (process, entry) = self.create_process(parent, program, args)?;
        let pid = process.pid;

        *self.live_threads.lock() += 1;
        let state = self.clone();
        let spawned = thread::Builder::new()
            .name(format!("pid-{}", pid))
            .spawn(move || state.run_process(process, entry));

        match spawned {
            Ok(_) => Ok(pid),
            Err(e) => {
                log::debug!("no host thread for pid {}: {}", pid, e);
                self.thread_exited();
                self.proctable.discard(pid);
                Err(KernelError::LoadFailure(format!("{}: {}", program, e)))
            }
        }
    }

    fn run_process(&self, process: interface::RustRfc<Process>, entry: interface::RustRfc<dyn Program>) {
        let pid = process.pid;
        let ctx = UserContext::new(process.clone());
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| entry.run(&ctx, &process.args)));

        match outcome {
            // returning from the entry point is an exit with the returned value
            Ok(status) => {
                dispatcher(&process, Syscall::Exit { status });
            }
            Err(payload) if payload.is::<ProcessUnwind>() => {
                log::trace!("pid {} unwound", pid);
            }
            Err(payload) => {
                log::warn!("pid {} faulted: {}", pid, panic_message(&*payload));
                if !self.is_halted() {
                    if let Err(e) = self.terminate(&process, ExitRecord::faulted()) {
                        log::debug!("could not terminate faulted pid {}: {}", pid, e);
                    }
                }
            }
        }

        drop(ctx);
        self.thread_exited();
    }

    fn thread_exited(&self) {
        let mut live = self.live_threads.lock();
        *live -= 1;
        if *live == 0 {
            self.threads_cv.notify_all();
        }
    }

    /// Terminate `process` with `exit`: release its descriptors, make it a
    /// zombie for its parent, and stop the system if it is the root.
    pub(crate) fn terminate(&self, process: &Process, exit: ExitRecord) -> KernelResult<()> {
        process.close_all_fds();
        self.proctable.mark_exited(process.pid, exit)?;
        log::info!(
            "pid {} terminated with status {} ({:?})",
            process.pid,
            exit.status,
            exit.cause
        );

        if process.is_root() {
            self.shutdown(match exit.cause {
                ExitCause::Halted => ShutdownReason::Halted,
                ExitCause::Exited | ExitCause::Faulted => ShutdownReason::RootExited(exit.status),
            });
        }
        Ok(())
    }

    /// Stop the system. The first reason recorded wins; blocked joiners are
    /// woken so they can fail with `ShuttingDown`.
    pub(crate) fn shutdown(&self, reason: ShutdownReason) {
        {
            let mut recorded = self.shutdown.lock();
            if recorded.is_none() {
                *recorded = Some(reason);
                log::info!("system shutting down: {:?}", reason);
            }
            self.halted.store(true, interface::RustAtomicOrdering::SeqCst);
        }
        self.shutdown_cv.notify_all();
        self.proctable.wake_all();
    }

    // Process records point back at this state, so the table has to be
    // emptied for either to be freed.
    fn finalize(&self) {
        if !self.is_halted() {
            self.shutdown(ShutdownReason::Halted);
        }
        self.proctable.clear();
    }
}

// Finalizes the kernel when the last `Kernel` handle goes away.
struct KernelOwner {
    state: interface::RustRfc<KernelState>,
}

impl Drop for KernelOwner {
    fn drop(&mut self) {
        self.state.finalize();
    }
}

/// Handle to one kernel instance. Clones refer to the same instance; when
/// the last clone is dropped the kernel is finalized.
#[derive(Clone)]
pub struct Kernel {
    state: interface::RustRfc<KernelState>,
    _owner: interface::RustRfc<KernelOwner>,
}

impl Kernel {
    pub fn new(
        config: KernelConfig,
        loader: interface::RustRfc<dyn ProgramLoader>,
        console: interface::RustRfc<dyn Console>,
    ) -> Kernel {
        let filesystem = NameDirectory::new(config.max_string_len);
        let state = interface::RustRfc::new(KernelState {
            config,
            proctable: ProcessTable::new(),
            filesystem,
            loader,
            console,
            root_created: interface::RustAtomicBool::new(false),
            halted: interface::RustAtomicBool::new(false),
            shutdown: interface::RustMutex::new(None),
            shutdown_cv: interface::RustCondvar::new(),
            live_threads: interface::RustMutex::new(0),
            threads_cv: interface::RustCondvar::new(),
        });
        Kernel {
            _owner: interface::RustRfc::new(KernelOwner {
                state: state.clone(),
            }),
            state,
        }
    }

    /// Kernel with the default configuration on the host console.
    pub fn with_loader(loader: interface::RustRfc<dyn ProgramLoader>) -> Kernel {
        Kernel::new(
            KernelConfig::default(),
            loader,
            interface::RustRfc::new(StdConsole),
        )
    }

    /// Create the root process bound to the calling thread instead of
    /// running a program, and return its syscall context. Once the system
    /// has shut down, a failing call made through the context unwinds the
    /// calling thread.
    pub fn init_root(&self) -> KernelResult<UserContext> {
        if self.state.is_halted() {
            return Err(KernelError::ShuttingDown);
        }
        self.state.claim_root()?;
        let pid = self.state.proctable.allocate_pid();
        let process = interface::RustRfc::new(Process::new(
            pid,
            None,
            String::from("init"),
            Vec::new(),
            self.state.clone(),
        ));
        self.state.proctable.insert(process.clone())?;
        log::info!("created root pid {} on the calling thread", pid);
        Ok(UserContext::new(process))
    }

    /// Start `program` as the root process on its own host thread.
    pub fn boot(&self, program: &str, args: &[&str]) -> KernelResult<Pid> {
        let args = args.iter().map(|arg| arg.to_string()).collect();
        self.state.spawn(None, program, args)
    }

    pub fn is_halted(&self) -> bool {
        self.state.is_halted()
    }

    pub fn shutdown_reason(&self) -> Option<ShutdownReason> {
        *self.state.shutdown.lock()
    }

    /// Stop the system from outside, as if the root had halted.
    pub fn halt(&self) {
        self.state.shutdown(ShutdownReason::Halted);
    }

    pub fn wait_for_shutdown(&self) -> ShutdownReason {
        let mut recorded = self.state.shutdown.lock();
        loop {
            if let Some(reason) = *recorded {
                return reason;
            }
            self.state.shutdown_cv.wait(&mut recorded);
        }
    }

    pub fn wait_for_shutdown_timeout(&self, timeout: Duration) -> Option<ShutdownReason> {
        let deadline = Instant::now() + timeout;
        let mut recorded = self.state.shutdown.lock();
        while recorded.is_none() {
            if self
                .state
                .shutdown_cv
                .wait_until(&mut recorded, deadline)
                .timed_out()
            {
                break;
            }
        }
        *recorded
    }

    /// Wait until no host thread is running a program. Returns false if
    /// some are still running after `timeout`.
    pub fn wait_for_threads(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut live = self.state.live_threads.lock();
        while *live > 0 {
            if self
                .state
                .threads_cv
                .wait_until(&mut live, deadline)
                .timed_out()
            {
                return *live == 0;
            }
        }
        true
    }

    pub fn process(&self, pid: Pid) -> Option<interface::RustRfc<Process>> {
        self.state.proctable.get(pid)
    }

    pub fn config(&self) -> &KernelConfig {
        &self.state.config
    }

    pub fn proctable(&self) -> &ProcessTable {
        &self.state.proctable
    }

    pub fn filesystem(&self) -> &NameDirectory {
        &self.state.filesystem
    }

    /// Shut down if still running and drop every process record. Dropping
    /// the last handle does the same.
    pub fn finalize(&self) {
        self.state.finalize();
    }
}
