use crate::interface;
use crate::interface::{KernelError, KernelResult, Pid};

use super::kernel::KernelState;
use super::syscalls::fs_constants::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileDescriptor {
    File(FileDesc),
    Stream(StreamDesc),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDesc {
    pub position: usize,
    pub inode: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamDesc {
    // STDIN_FILENO or STDOUT_FILENO
    pub stream: i32,
}

type FdSlots = [Option<FileDescriptor>; MAXFD as usize];

/// Fixed-size descriptor table owned by one process. Every operation holds
/// the table lock for its whole duration, so calls made by one process are
/// serialized while tables of different processes never contend.
#[derive(Debug)]
pub struct FdTable {
    slots: interface::RustMutex<FdSlots>,
}

impl FdTable {
    pub fn new() -> FdTable {
        FdTable {
            slots: interface::RustMutex::new(Default::default()),
        }
    }

    /// Table with standard input and output bound to slots 0 and 1.
    pub fn with_std_streams() -> FdTable {
        let table = FdTable::new();
        {
            let mut slots = table.slots.lock();
            slots[STDIN_FILENO as usize] = Some(FileDescriptor::Stream(StreamDesc {
                stream: STDIN_FILENO,
            }));
            slots[STDOUT_FILENO as usize] = Some(FileDescriptor::Stream(StreamDesc {
                stream: STDOUT_FILENO,
            }));
        }
        table
    }

    fn get_next_fd(slots: &FdSlots, startfd: Option<i32>) -> Option<i32> {
        let start = startfd.unwrap_or(STARTINGFD);

        // The lowest free descriptor is always handed out.
        (start..MAXFD).find(|&fd| slots[fd as usize].is_none())
    }

    fn checked_index(fd: i32) -> KernelResult<usize> {
        if (0..MAXFD).contains(&fd) {
            Ok(fd as usize)
        } else {
            Err(KernelError::InvalidDescriptor(fd))
        }
    }

    /// Reserve the lowest free slot, then build the descriptor for it. If the
    /// table is full `make` is never called; if `make` fails nothing is
    /// bound.
    pub fn insert_next<F>(&self, make: F) -> KernelResult<i32>
    where
        F: FnOnce() -> KernelResult<FileDescriptor>,
    {
        let mut slots = self.slots.lock();
        let fd = Self::get_next_fd(&slots, None).ok_or(KernelError::DescriptorTableFull)?;
        let desc = make()?;
        slots[fd as usize] = Some(desc);
        Ok(fd)
    }

    /// Unbind `fd` and hand back what it held.
    pub fn remove(&self, fd: i32) -> KernelResult<FileDescriptor> {
        let index = Self::checked_index(fd)?;
        self.slots.lock()[index]
            .take()
            .ok_or(KernelError::InvalidDescriptor(fd))
    }

    pub fn get(&self, fd: i32) -> KernelResult<FileDescriptor> {
        let index = Self::checked_index(fd)?;
        self.slots.lock()[index]
            .clone()
            .ok_or(KernelError::InvalidDescriptor(fd))
    }

    /// Run `f` on the descriptor bound to `fd` with the table locked.
    pub fn with_descriptor<F, R>(&self, fd: i32, f: F) -> KernelResult<R>
    where
        F: FnOnce(&mut FileDescriptor) -> KernelResult<R>,
    {
        let index = Self::checked_index(fd)?;
        let mut slots = self.slots.lock();
        match slots[index].as_mut() {
            Some(desc) => f(desc),
            None => Err(KernelError::InvalidDescriptor(fd)),
        }
    }

    /// Unbind every slot, returning what was bound in ascending order.
    pub fn drain(&self) -> Vec<(i32, FileDescriptor)> {
        let mut slots = self.slots.lock();
        slots
            .iter_mut()
            .enumerate()
            .filter_map(|(fd, slot)| slot.take().map(|desc| (fd as i32, desc)))
            .collect()
    }

    pub fn is_open(&self, fd: i32) -> bool {
        match Self::checked_index(fd) {
            Ok(index) => self.slots.lock()[index].is_some(),
            Err(_) => false,
        }
    }

    pub fn open_fds(&self) -> Vec<i32> {
        let slots = self.slots.lock();
        (0..MAXFD).filter(|&fd| slots[fd as usize].is_some()).collect()
    }
}

impl Default for FdTable {
    fn default() -> FdTable {
        FdTable::new()
    }
}

/// One process as seen by the kernel. The lifecycle state (running, zombie,
/// children) lives in the process table; this holds what the process itself
/// owns.
pub struct Process {
    pub pid: Pid,
    // creating process, None for the root
    pub parent: Option<Pid>,
    pub program: String,
    pub args: Vec<String>,
    pub filedescriptortable: FdTable,
    pub(crate) kernel: interface::RustRfc<KernelState>,
}

impl Process {
    pub(crate) fn new(
        pid: Pid,
        parent: Option<Pid>,
        program: String,
        args: Vec<String>,
        kernel: interface::RustRfc<KernelState>,
    ) -> Process {
        Process {
            pid,
            parent,
            program,
            args,
            filedescriptortable: FdTable::with_std_streams(),
            kernel,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Close every descriptor this process still holds.
    pub(crate) fn close_all_fds(&self) {
        for (fd, desc) in self.filedescriptortable.drain() {
            if let FileDescriptor::File(f) = desc {
                log::trace!("pid {} releasing fd {} at exit", self.pid, fd);
                self.kernel.filesystem.release(f.inode);
            }
        }
    }
}

impl std::fmt::Debug for Process {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Process")
            .field("pid", &self.pid)
            .field("parent", &self.parent)
            .field("program", &self.program)
            .field("args", &self.args)
            .field("open_fds", &self.filedescriptortable.open_fds())
            .finish()
    }
}
