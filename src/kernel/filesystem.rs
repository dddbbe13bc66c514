// Name directory: the namespace mapping file names to storage objects.
//
// Metadata (names, reference counts, unlink state) lives behind one lock so a
// lookup and the reference it takes are a single step. File contents live in
// a separate object table keyed by inode number so readers and writers of
// different files never contend on the metadata lock.

use crate::interface;
use crate::interface::{KernelError, KernelResult};

use super::syscalls::fs_constants::*;

/// Contents of one file.
#[derive(Debug, Default)]
pub struct FileObject {
    contents: interface::RustLock<Vec<u8>>,
}

impl FileObject {
    pub fn new() -> FileObject {
        FileObject::default()
    }

    pub fn len(&self) -> usize {
        self.contents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn truncate(&self) {
        self.contents.write().clear();
    }

    /// Copy bytes starting at `offset` into `buf`. Reading at or past the
    /// end yields 0.
    pub fn read_at(&self, offset: usize, buf: &mut [u8]) -> usize {
        let contents = self.contents.read();
        if offset >= contents.len() {
            return 0;
        }
        let count = buf.len().min(contents.len() - offset);
        buf[..count].copy_from_slice(&contents[offset..offset + count]);
        count
    }

    /// Write `buf` at `offset`, growing the file (zero filled) as needed.
    pub fn write_at(&self, offset: usize, buf: &[u8]) -> usize {
        let mut contents = self.contents.write();
        let end = offset + buf.len();
        if contents.len() < end {
            contents.resize(end, 0);
        }
        contents[offset..end].copy_from_slice(buf);
        buf.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inode {
    pub name: String,
    // descriptor slots, across every process, that refer to this inode
    pub refcount: u32,
    pub unlinked: bool,
}

#[derive(Debug)]
pub struct FilesystemMetadata {
    pub nextinode: usize,
    pub inodetable: interface::RustHashMap<usize, Inode>,
    // only live (not unlinked) names appear here
    pub filename_to_inode_dict: interface::RustHashMap<String, usize>,
}

impl FilesystemMetadata {
    pub fn blank_fs_init() -> FilesystemMetadata {
        FilesystemMetadata {
            nextinode: FIRSTINODE,
            inodetable: interface::new_hashmap(),
            filename_to_inode_dict: interface::new_hashmap(),
        }
    }
}

#[derive(Debug)]
pub struct NameDirectory {
    metadata: interface::RustMutex<FilesystemMetadata>,
    fileobjecttable: interface::RustDashMap<usize, interface::RustRfc<FileObject>>,
    max_name_len: usize,
}

impl NameDirectory {
    pub fn new(max_name_len: usize) -> NameDirectory {
        NameDirectory {
            metadata: interface::RustMutex::new(FilesystemMetadata::blank_fs_init()),
            fileobjecttable: interface::RustDashMap::new(),
            max_name_len,
        }
    }

    fn check_name(&self, name: &str) -> KernelResult<()> {
        if name.is_empty() {
            return Err(KernelError::InvalidArgument("empty name"));
        }
        if name.len() > self.max_name_len {
            return Err(KernelError::InvalidArgument("name too long"));
        }
        Ok(())
    }

    /// Look up a live entry and take a reference to it.
    pub fn find(&self, name: &str) -> KernelResult<usize> {
        self.check_name(name)?;
        let mut metadata = self.metadata.lock();
        let inodenum = match metadata.filename_to_inode_dict.get(name) {
            Some(inodenum) => *inodenum,
            None => return Err(KernelError::NotFound(name.to_string())),
        };
        let inode = metadata
            .inodetable
            .get_mut(&inodenum)
            .expect("name directory points at a missing inode");
        inode.refcount += 1;
        Ok(inodenum)
    }

    /// Create `name` if no live entry has it, otherwise truncate the existing
    /// entry. Either way a reference to the entry is taken.
    pub fn create(&self, name: &str) -> KernelResult<usize> {
        self.check_name(name)?;
        let mut metadata = self.metadata.lock();
        if let Some(&inodenum) = metadata.filename_to_inode_dict.get(name) {
            let inode = metadata
                .inodetable
                .get_mut(&inodenum)
                .expect("name directory points at a missing inode");
            inode.refcount += 1;
            if let Some(fobj) = self.fileobjecttable.get(&inodenum) {
                fobj.truncate();
            }
            log::debug!("truncated {} (inode {})", name, inodenum);
            return Ok(inodenum);
        }

        let inodenum = metadata.nextinode;
        metadata.nextinode += 1;
        metadata.inodetable.insert(
            inodenum,
            Inode {
                name: name.to_string(),
                refcount: 1,
                unlinked: false,
            },
        );
        metadata
            .filename_to_inode_dict
            .insert(name.to_string(), inodenum);
        self.fileobjecttable
            .insert(inodenum, interface::RustRfc::new(FileObject::new()));
        log::debug!("created {} (inode {})", name, inodenum);
        Ok(inodenum)
    }

    /// Remove `name` from the visible namespace. Storage goes away now if
    /// nothing holds the entry open, otherwise when the last holder releases.
    pub fn mark_unlinked(&self, name: &str) -> KernelResult<()> {
        if name.is_empty() {
            return Err(KernelError::NotFound(String::new()));
        }
        self.check_name(name)?;
        let mut metadata = self.metadata.lock();
        let inodenum = match metadata.filename_to_inode_dict.remove(name) {
            Some(inodenum) => inodenum,
            None => return Err(KernelError::NotFound(name.to_string())),
        };
        let inode = metadata
            .inodetable
            .get_mut(&inodenum)
            .expect("name directory points at a missing inode");
        inode.unlinked = true;
        if inode.refcount == 0 {
            metadata.inodetable.remove(&inodenum);
            self.fileobjecttable.remove(&inodenum);
            log::debug!("unlinked and deleted {} (inode {})", name, inodenum);
        } else {
            log::debug!(
                "unlinked {} (inode {}), deferring delete until {} holders close",
                name,
                inodenum,
                inode.refcount
            );
        }
        Ok(())
    }

    /// Give back a reference taken by `find` or `create`.
    pub fn release(&self, inodenum: usize) {
        let mut metadata = self.metadata.lock();
        let inode = match metadata.inodetable.get_mut(&inodenum) {
            Some(inode) => inode,
            None => panic!("release of unknown inode {}", inodenum),
        };
        assert!(inode.refcount > 0, "refcount underflow on inode {}", inodenum);
        inode.refcount -= 1;
        if inode.refcount == 0 && inode.unlinked {
            let name = inode.name.clone();
            metadata.inodetable.remove(&inodenum);
            self.fileobjecttable.remove(&inodenum);
            log::debug!("last close of unlinked {} (inode {}), deleted", name, inodenum);
        }
    }

    pub fn file_object(&self, inodenum: usize) -> Option<interface::RustRfc<FileObject>> {
        self.fileobjecttable.get(&inodenum).map(|fobj| fobj.clone())
    }

    pub fn exists(&self, name: &str) -> bool {
        self.metadata.lock().filename_to_inode_dict.contains_key(name)
    }

    /// Number of descriptor slots holding `name`, or None if the name is not
    /// live.
    pub fn open_count(&self, name: &str) -> Option<u32> {
        let metadata = self.metadata.lock();
        let inodenum = metadata.filename_to_inode_dict.get(name)?;
        metadata.inodetable.get(inodenum).map(|inode| inode.refcount)
    }

    pub fn inode(&self, inodenum: usize) -> Option<Inode> {
        self.metadata.lock().inodetable.get(&inodenum).cloned()
    }

    /// Inodes still stored, unlinked ones included.
    pub fn inode_count(&self) -> usize {
        self.metadata.lock().inodetable.len()
    }
}
