// File system related system calls
use crate::interface::{syscall_error, syscall_failure, Errno, KernelError};

use super::fs_constants::*;
use crate::kernel::process::{FileDesc, FileDescriptor, Process};

/// Number of bytes a single read may move for a buffer of `len` bytes.
pub fn transfer_len(len: usize) -> usize {
    len.min(MAX_TRANSFER_SIZE)
}

impl Process {
    //------------------------------------CREAT SYSCALL------------------------------------

    /// Create `name` (or truncate it if it already exists) and bind it to
    /// the lowest free descriptor at or above `STARTINGFD`.
    pub fn creat_syscall(&self, name: &str) -> i32 {
        let filesystem = &self.kernel.filesystem;
        let result = self.filedescriptortable.insert_next(|| {
            let inode = filesystem.create(name)?;
            Ok(FileDescriptor::File(FileDesc { position: 0, inode }))
        });

        match result {
            Ok(fd) => {
                log::debug!("pid {} created {} as fd {}", self.pid, name, fd);
                fd
            }
            Err(e) => syscall_failure("creat", e),
        }
    }

    //------------------------------------OPEN SYSCALL------------------------------------

    /// Bind an existing live entry to the lowest free descriptor. The
    /// position of the new descriptor starts at the beginning of the file.
    pub fn open_syscall(&self, name: &str) -> i32 {
        let filesystem = &self.kernel.filesystem;
        let result = self.filedescriptortable.insert_next(|| {
            let inode = filesystem.find(name)?;
            Ok(FileDescriptor::File(FileDesc { position: 0, inode }))
        });

        match result {
            Ok(fd) => {
                log::debug!("pid {} opened {} as fd {}", self.pid, name, fd);
                fd
            }
            Err(e) => syscall_failure("open", e),
        }
    }

    //------------------------------------CLOSE SYSCALL------------------------------------

    pub fn close_syscall(&self, fd: i32) -> i32 {
        match self.filedescriptortable.remove(fd) {
            Ok(FileDescriptor::File(normalfile_filedesc_obj)) => {
                // may complete a deferred unlink
                self.kernel.filesystem.release(normalfile_filedesc_obj.inode);
                0
            }
            Ok(FileDescriptor::Stream(_)) => 0,
            Err(e) => syscall_failure("close", e),
        }
    }

    //------------------------------------UNLINK SYSCALL------------------------------------

    pub fn unlink_syscall(&self, name: &str) -> i32 {
        match self.kernel.filesystem.mark_unlinked(name) {
            Ok(()) => 0,
            Err(e) => syscall_failure("unlink", e),
        }
    }

    //------------------------------------READ SYSCALL------------------------------------

    /// Read into `buf` from the descriptor's current position, advancing it
    /// by the number of bytes read. Reading standard input blocks on the
    /// console.
    pub fn read_syscall(&self, fd: i32, buf: &mut [u8]) -> i32 {
        let kernel = &self.kernel;
        let len = transfer_len(buf.len());
        let buf = &mut buf[..len];
        let result = self
            .filedescriptortable
            .with_descriptor(fd, |filedesc_enum| match filedesc_enum {
                FileDescriptor::File(normalfile_filedesc_obj) => {
                    let fileobject = kernel
                        .filesystem
                        .file_object(normalfile_filedesc_obj.inode)
                        .ok_or(KernelError::InvalidDescriptor(fd))?;
                    let bytesread = fileobject.read_at(normalfile_filedesc_obj.position, buf);
                    normalfile_filedesc_obj.position += bytesread;
                    Ok(bytesread)
                }
                FileDescriptor::Stream(stream_filedesc_obj) => {
                    if stream_filedesc_obj.stream == STDIN_FILENO {
                        Ok(kernel.console.read(buf))
                    } else {
                        Err(KernelError::InvalidDescriptor(fd))
                    }
                }
            });

        match result {
            // at most MAX_TRANSFER_SIZE
            Ok(bytesread) => bytesread as i32,
            Err(e) => syscall_failure("read", e),
        }
    }

    //------------------------------------WRITE SYSCALL------------------------------------

    /// Write `buf` at the descriptor's current position, extending the file
    /// as needed. Writing standard output goes to the console.
    pub fn write_syscall(&self, fd: i32, buf: &[u8]) -> i32 {
        let kernel = &self.kernel;
        if buf.len() >= kernel.config.max_write_size || buf.len() > MAX_TRANSFER_SIZE {
            return syscall_error(
                Errno::EINVAL,
                "write",
                "write size exceeds the maximum transfer size",
            );
        }

        let result = self
            .filedescriptortable
            .with_descriptor(fd, |filedesc_enum| match filedesc_enum {
                FileDescriptor::File(normalfile_filedesc_obj) => {
                    let fileobject = kernel
                        .filesystem
                        .file_object(normalfile_filedesc_obj.inode)
                        .ok_or(KernelError::InvalidDescriptor(fd))?;
                    let byteswritten = fileobject.write_at(normalfile_filedesc_obj.position, buf);
                    normalfile_filedesc_obj.position += byteswritten;
                    Ok(byteswritten)
                }
                FileDescriptor::Stream(stream_filedesc_obj) => {
                    if stream_filedesc_obj.stream == STDOUT_FILENO {
                        Ok(kernel.console.write(buf))
                    } else {
                        Err(KernelError::InvalidDescriptor(fd))
                    }
                }
            });

        match result {
            Ok(byteswritten) => byteswritten as i32,
            Err(e) => syscall_failure("write", e),
        }
    }
}
