//! Read-only stream handles over resolved entries

use fatview_core::{Error, Result};

use crate::entry::DirEntry;
use crate::nav::Resolved;
use crate::volume::Volume;

/// What a handle points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleKind {
    File,
    Directory,
}

/// A cursor over one file or directory
///
/// Handles hold no borrow into the volume; each read fetches the entry's
/// contents through [`Volume::contents_of`]. Simple and non-incremental.
#[derive(Debug, Clone)]
pub struct Handle {
    /// Backing entry; `None` is the root directory
    entry: Option<DirEntry>,
    kind: HandleKind,
    cursor: usize,
    size: usize,
    open: bool,
    /// Iteration position for [`Handle::read_directory`]
    dir_cursor: usize,
}

impl Handle {
    fn from_entry(entry: DirEntry) -> Self {
        let kind = if entry.is_directory() {
            HandleKind::Directory
        } else {
            HandleKind::File
        };
        let size = if kind == HandleKind::File {
            entry.file_size as usize
        } else {
            0
        };
        Self {
            entry: Some(entry),
            kind,
            cursor: 0,
            size,
            open: true,
            dir_cursor: 0,
        }
    }

    fn root() -> Self {
        Self {
            entry: None,
            kind: HandleKind::Directory,
            cursor: 0,
            size: 0,
            open: true,
            dir_cursor: 0,
        }
    }

    pub fn kind(&self) -> HandleKind {
        self.kind
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Size in bytes; 0 for directories
    pub fn size(&self) -> usize {
        self.size
    }

    /// The backing entry; `None` for the root directory
    pub fn entry(&self) -> Option<&DirEntry> {
        self.entry.as_ref()
    }

    /// Current cursor position
    pub fn tell(&self) -> usize {
        self.cursor
    }

    /// Read up to `size × items` bytes at the cursor into `buf`
    ///
    /// Returns the number of bytes copied (a partial count near the end),
    /// `Error::EndOfFile` once the cursor sits at the end, and
    /// `Error::ReadOverflow` when `size × items` overflows.
    pub fn read(
        &mut self,
        volume: &Volume,
        buf: &mut [u8],
        size: usize,
        items: usize,
    ) -> Result<usize> {
        if !self.open {
            return Err(Error::Closed);
        }
        if self.kind != HandleKind::File {
            return Err(Error::not_a_file("read on a directory handle"));
        }

        let requested = size.checked_mul(items).ok_or(Error::ReadOverflow)?;
        let remaining = self.size - self.cursor;
        if remaining == 0 {
            return Err(Error::EndOfFile);
        }

        let to_read = requested.min(remaining).min(buf.len());
        let contents = volume.contents_of(self.entry.as_ref())?;
        buf[..to_read].copy_from_slice(&contents[self.cursor..self.cursor + to_read]);
        self.cursor += to_read;
        Ok(to_read)
    }

    /// Read one byte at the cursor
    pub fn read_char(&mut self, volume: &Volume) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.read(volume, &mut buf, 1, 1)?;
        Ok(buf[0])
    }

    /// Produce the next child name of a directory handle
    ///
    /// Walks the non-skippable entries in on-disk order, one name per
    /// call. Returns `None` once exhausted and resets, so the next call
    /// starts over.
    pub fn read_directory(&mut self, volume: &Volume) -> Result<Option<String>> {
        if !self.open {
            return Err(Error::Closed);
        }
        if self.kind != HandleKind::Directory {
            return Err(Error::not_a_directory("read_directory on a file handle"));
        }

        let entries = volume.list_dir(self.entry.as_ref())?;
        if let Some(entry) = entries.get(self.dir_cursor) {
            self.dir_cursor += 1;
            Ok(Some(entry.display_name()))
        } else {
            self.dir_cursor = 0;
            Ok(None)
        }
    }

    /// Move the cursor; positions past the end clamp to the size
    pub fn seek(&mut self, position: usize) {
        if !self.open {
            return;
        }
        self.cursor = position.min(self.size);
    }

    /// Move the cursor relative to its current position, clamped to
    /// `[0, size]`
    pub fn seek_current(&mut self, offset: i64) {
        if !self.open {
            return;
        }
        let target = self.cursor as i64 + offset;
        self.cursor = target.clamp(0, self.size as i64) as usize;
    }

    /// Rewind to the start
    pub fn seek_begin(&mut self) {
        self.seek(0);
    }

    /// Jump to the end
    pub fn seek_end(&mut self) {
        self.seek(self.size);
    }

    /// Release the handle; further reads fail
    pub fn close(&mut self) {
        self.open = false;
    }
}

impl Volume {
    /// Open a file (or non-root directory) by path
    ///
    /// The working directory is left untouched. The root directory has no
    /// entry and cannot be opened as a file; use
    /// [`Volume::open_directory`].
    pub fn open_file(&mut self, path: &str) -> Result<Handle> {
        match self.resolve(path, true)? {
            Resolved::Root => Err(Error::not_a_file(path)),
            Resolved::Entry(entry) => Ok(Handle::from_entry(entry)),
        }
    }

    /// Open a directory by path; accepts the root
    pub fn open_directory(&mut self, path: &str) -> Result<Handle> {
        match self.resolve(path, true)? {
            Resolved::Root => Ok(Handle::root()),
            Resolved::Entry(entry) => Ok(Handle::from_entry(entry)),
        }
    }
}
