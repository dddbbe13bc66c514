//! Process table and the join/exit protocol.
//!
//! Every process has exactly one record here from creation until it is
//! reaped. A record moves Running -> Zombie when the process terminates and
//! is removed (its id retired for good) when the direct parent joins it.
//!
//! All records sit behind a single lock, so id allocation, the
//! parent/children links and the state transitions are observed atomically
//! by every process. A condition variable is broadcast on each
//! Running -> Zombie transition; blocked joiners re-check their target when
//! woken.

use std::time::Duration;

use crate::interface;
use crate::interface::{KernelError, KernelResult, Pid};

use super::process::Process;
use super::syscalls::sys_constants::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    Running,
    Zombie,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCause {
    /// exit() or returning from the program entry point
    Exited,
    /// halt() from a process that is not the root
    Halted,
    /// the program faulted
    Faulted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitRecord {
    pub status: i32,
    pub cause: ExitCause,
}

impl ExitRecord {
    pub fn exited(status: i32) -> ExitRecord {
        ExitRecord {
            status,
            cause: ExitCause::Exited,
        }
    }

    pub fn halted() -> ExitRecord {
        ExitRecord {
            status: HALT_EXIT_STATUS,
            cause: ExitCause::Halted,
        }
    }

    pub fn faulted() -> ExitRecord {
        ExitRecord {
            status: FAULT_EXIT_STATUS,
            cause: ExitCause::Faulted,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinMode {
    /// wait for a running child to terminate
    Block,
    /// fail with StillRunning instead of waiting
    NoHang,
}

struct ProcessRecord {
    process: interface::RustRfc<Process>,
    // None once the parent has terminated (orphan) and for the root
    parent: Option<Pid>,
    children: interface::RustBTreeSet<Pid>,
    state: ProcessState,
    exit: Option<ExitRecord>,
}

pub struct ProcessTable {
    records: interface::RustMutex<interface::RustHashMap<Pid, ProcessRecord>>,
    zombie_cv: interface::RustCondvar,
    nextpid: interface::RustAtomicI32,
}

impl ProcessTable {
    pub fn new() -> ProcessTable {
        ProcessTable {
            records: interface::RustMutex::new(interface::new_hashmap()),
            zombie_cv: interface::RustCondvar::new(),
            nextpid: interface::RustAtomicI32::new(ROOT_PID),
        }
    }

    /// Hand out a fresh id. Ids are never reused.
    pub fn allocate_pid(&self) -> Pid {
        self.nextpid.fetch_add(1, interface::RustAtomicOrdering::SeqCst)
    }

    fn was_allocated(&self, pid: Pid) -> bool {
        pid >= ROOT_PID && pid < self.nextpid.load(interface::RustAtomicOrdering::SeqCst)
    }

    /// Register a newly created process as Running and link it under its
    /// parent, which must be Running.
    pub fn insert(&self, process: interface::RustRfc<Process>) -> KernelResult<()> {
        let pid = process.pid;
        let parent = process.parent;
        let mut records = self.records.lock();
        assert!(!records.contains_key(&pid), "pid {} allocated twice", pid);

        if let Some(ppid) = parent {
            match records.get_mut(&ppid) {
                Some(prec) if prec.state == ProcessState::Running => {
                    prec.children.insert(pid);
                }
                _ => return Err(KernelError::NotFound(format!("parent process {}", ppid))),
            }
        }

        records.insert(
            pid,
            ProcessRecord {
                process,
                parent,
                children: interface::RustBTreeSet::new(),
                state: ProcessState::Running,
                exit: None,
            },
        );
        log::debug!("pid {} registered under {:?}", pid, parent);
        Ok(())
    }

    /// Drop the record of a process that never started running.
    pub fn discard(&self, pid: Pid) {
        let mut records = self.records.lock();
        if let Some(rec) = records.remove(&pid) {
            if let Some(ppid) = rec.parent {
                if let Some(prec) = records.get_mut(&ppid) {
                    prec.children.remove(&pid);
                }
            }
        }
    }

    /// Move `pid` from Running to Zombie and wake every blocked joiner.
    ///
    /// Live children of the terminating process become orphans and children
    /// already Zombie are released, since nobody can join either of them any
    /// more. A terminating orphan (or the root) is released at once for the
    /// same reason.
    pub fn mark_exited(&self, pid: Pid, exit: ExitRecord) -> KernelResult<()> {
        let mut records = self.records.lock();

        let (parent, children) = match records.get_mut(&pid) {
            Some(rec) if rec.state == ProcessState::Running => {
                rec.state = ProcessState::Zombie;
                rec.exit = Some(exit);
                (rec.parent, std::mem::take(&mut rec.children))
            }
            Some(_) => return Err(KernelError::InvalidArgument("process already terminated")),
            None => return Err(KernelError::NotFound(format!("process {}", pid))),
        };

        for child in children {
            let child_is_zombie = match records.get_mut(&child) {
                Some(crec) => {
                    crec.parent = None;
                    crec.state == ProcessState::Zombie
                }
                None => panic!("pid {} lists missing child {}", pid, child),
            };
            if child_is_zombie {
                records.remove(&child);
                log::debug!("released unreaped zombie {} of exiting pid {}", child, pid);
            } else {
                log::debug!("pid {} orphaned by exit of pid {}", child, pid);
            }
        }

        match parent {
            Some(ppid) => {
                debug_assert!(
                    records
                        .get(&ppid)
                        .map_or(false, |prec| prec.children.contains(&pid)),
                    "parent {} does not list child {}",
                    ppid,
                    pid
                );
            }
            None => {
                records.remove(&pid);
                log::debug!("pid {} has no parent to join it, released", pid);
            }
        }

        drop(records);
        self.zombie_cv.notify_all();
        Ok(())
    }

    /// Collect the exit record of `target`, a direct child of `caller`.
    ///
    /// Succeeds exactly once per child and only once the child is a Zombie;
    /// the child's record is then removed and its id retired. `cancelled` is
    /// polled each time the caller wakes so a system shutdown can abandon the
    /// wait.
    pub fn join<C>(
        &self,
        caller: Pid,
        target: Pid,
        mode: JoinMode,
        cancelled: C,
    ) -> KernelResult<ExitRecord>
    where
        C: Fn() -> bool,
    {
        let mut records = self.records.lock();
        loop {
            if cancelled() {
                return Err(KernelError::ShuttingDown);
            }

            let crec = records
                .get(&caller)
                .ok_or_else(|| KernelError::NotFound(format!("process {}", caller)))?;
            if !crec.children.contains(&target) {
                return Err(if records.contains_key(&target) {
                    KernelError::NotAChild(target)
                } else if self.was_allocated(target) {
                    // the id was handed out once and its record is gone
                    KernelError::AlreadyReaped(target)
                } else {
                    KernelError::NotFound(format!("process {}", target))
                });
            }

            let state = match records.get(&target) {
                Some(trec) => trec.state,
                None => panic!("pid {} lists missing child {}", caller, target),
            };

            match (state, mode) {
                (ProcessState::Zombie, _) => {
                    let trec = records
                        .remove(&target)
                        .expect("zombie vanished while the table was locked");
                    let crec = records
                        .get_mut(&caller)
                        .expect("caller vanished while the table was locked");
                    crec.children.remove(&target);
                    let exit = trec.exit.expect("zombie without an exit record");
                    log::info!(
                        "pid {} reaped child {} (status {}, {:?})",
                        caller,
                        target,
                        exit.status,
                        exit.cause
                    );
                    return Ok(exit);
                }
                (ProcessState::Running, JoinMode::NoHang) => {
                    return Err(KernelError::StillRunning(target));
                }
                (ProcessState::Running, JoinMode::Block) => {
                    log::trace!("pid {} waiting for child {}", caller, target);
                    self.zombie_cv.wait(&mut records);
                }
            }
        }
    }

    /// Wake every blocked joiner so it can notice a shutdown.
    pub fn wake_all(&self) {
        let _records = self.records.lock();
        self.zombie_cv.notify_all();
    }

    /// Block until `pid` is no longer Running (or its record is gone), or
    /// until `timeout` passes. Returns whether the process terminated.
    pub fn wait_terminated(&self, pid: Pid, timeout: Duration) -> bool {
        let deadline = std::time::Instant::now() + timeout;
        let mut records = self.records.lock();
        loop {
            match records.get(&pid) {
                Some(rec) if rec.state == ProcessState::Running => {}
                _ => return true,
            }
            if self.zombie_cv.wait_until(&mut records, deadline).timed_out() {
                return !matches!(
                    records.get(&pid),
                    Some(rec) if rec.state == ProcessState::Running
                );
            }
        }
    }

    pub fn get(&self, pid: Pid) -> Option<interface::RustRfc<Process>> {
        self.records.lock().get(&pid).map(|rec| rec.process.clone())
    }

    pub fn state(&self, pid: Pid) -> Option<ProcessState> {
        self.records.lock().get(&pid).map(|rec| rec.state)
    }

    pub fn exit_record(&self, pid: Pid) -> Option<ExitRecord> {
        self.records.lock().get(&pid).and_then(|rec| rec.exit)
    }

    /// Current parent link; None for the root and for orphans.
    pub fn parent_of(&self, pid: Pid) -> Option<Pid> {
        self.records.lock().get(&pid).and_then(|rec| rec.parent)
    }

    pub fn children(&self, pid: Pid) -> Vec<Pid> {
        self.records
            .lock()
            .get(&pid)
            .map(|rec| rec.children.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn is_running(&self, pid: Pid) -> bool {
        self.state(pid) == Some(ProcessState::Running)
    }

    pub fn contains(&self, pid: Pid) -> bool {
        self.records.lock().contains_key(&pid)
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn running_count(&self) -> usize {
        self.records
            .lock()
            .values()
            .filter(|rec| rec.state == ProcessState::Running)
            .count()
    }

    /// Drop every record.
    pub fn clear(&self) {
        self.records.lock().clear();
        self.zombie_cv.notify_all();
    }
}

impl Default for ProcessTable {
    fn default() -> ProcessTable {
        ProcessTable::new()
    }
}
