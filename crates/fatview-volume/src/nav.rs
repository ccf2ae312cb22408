//! Path resolution and the working-directory stack

use fatview_core::{Error, Result, MAX_DIRECTORY_DEPTH};
use tracing::debug;

use crate::entry::DirEntry;
use crate::volume::Volume;

/// The working-directory stack: the chain of directories entered below
/// the root, oldest first. An empty stack means the working directory is
/// the root, which has no on-disk entry of its own. A snapshot taken at
/// the start of each resolution allows failed lookups to roll back.
#[derive(Debug, Clone, Default)]
pub(crate) struct DirStack {
    current: Vec<DirEntry>,
    backup: Vec<DirEntry>,
}

impl DirStack {
    /// Depth below root
    pub fn depth(&self) -> usize {
        self.current.len()
    }

    /// The entry of the current directory; `None` at root
    pub fn current_dir(&self) -> Option<&DirEntry> {
        self.current.last()
    }

    /// All entered directories, root side first
    pub fn components(&self) -> &[DirEntry] {
        &self.current
    }

    /// Snapshot the stack
    pub fn save(&mut self) {
        self.backup = self.current.clone();
    }

    /// Roll back to the snapshot
    pub fn restore(&mut self) {
        self.current = self.backup.clone();
    }

    /// Drop back to the root
    pub fn reset(&mut self) {
        self.current.clear();
    }

    /// Enter a directory
    pub fn push(&mut self, entry: DirEntry) -> Result<()> {
        if self.current.len() >= MAX_DIRECTORY_DEPTH {
            return Err(Error::DepthExceeded);
        }
        self.current.push(entry);
        Ok(())
    }

    /// Leave the current directory; no-op at root
    pub fn pop(&mut self) {
        self.current.pop();
    }
}

/// Result of resolving a path
#[derive(Debug, Clone)]
pub enum Resolved {
    /// The path names the root directory, which has no entry
    Root,
    /// The path names this file or directory
    Entry(DirEntry),
}

impl Resolved {
    pub fn is_root(&self) -> bool {
        matches!(self, Resolved::Root)
    }

    /// The resolved entry, unless the path named the root
    pub fn entry(&self) -> Option<&DirEntry> {
        match self {
            Resolved::Root => None,
            Resolved::Entry(entry) => Some(entry),
        }
    }
}

impl Volume {
    /// The entry of the current working directory; `None` at root
    pub fn current_dir(&self) -> Option<&DirEntry> {
        self.stack.current_dir()
    }

    /// Depth of the working directory below root
    pub fn depth(&self) -> usize {
        self.stack.depth()
    }

    /// Render the working directory as `/name/name/…/`
    pub fn pwd(&self) -> String {
        let mut out = String::from("/");
        for entry in self.stack.components() {
            out.push_str(&entry.display_name());
            out.push('/');
        }
        out
    }

    /// Look up `name` in the current working directory
    ///
    /// Names starting with `.` are refused here; `.` and `..` traversal
    /// happens in the resolver, not by entry lookup.
    fn lookup(&self, name: &str) -> Result<DirEntry> {
        if name.is_empty() || name.starts_with('.') {
            return Err(Error::not_found(name));
        }

        let entries = self.list_dir(self.current_dir())?;
        entries
            .into_iter()
            .find(|entry| entry.display_name() == name)
            .ok_or_else(|| Error::not_found(name))
    }

    /// Resolve a path against the working directory
    ///
    /// Always snapshots the stack first. With `preserve` the stack is
    /// rolled back even on success; without it a successful resolution
    /// leaves the stack in the final component's parent. On failure the
    /// stack is always rolled back.
    pub fn resolve(&mut self, path: &str, preserve: bool) -> Result<Resolved> {
        self.stack.save();
        match self.resolve_inner(path) {
            Ok(resolved) => {
                if preserve {
                    self.stack.restore();
                }
                Ok(resolved)
            }
            Err(e) => {
                self.stack.restore();
                Err(e)
            }
        }
    }

    fn resolve_inner(&mut self, path: &str) -> Result<Resolved> {
        if path.starts_with('/') {
            self.stack.reset();
        }

        // Empty tokens from leading, trailing, or doubled slashes vanish
        let mut tokens = path.split('/').filter(|t| !t.is_empty()).peekable();
        let mut final_name: Option<String> = None;
        let mut final_is_file = false;

        while let Some(token) = tokens.next() {
            if token == "." {
                final_name = tokens.peek().map(|t| t.to_string());
                continue;
            }
            if token == ".." {
                final_name = tokens.peek().map(|t| t.to_string());
                self.stack.pop();
                continue;
            }

            let entry = self.lookup(token)?;
            if !entry.is_directory() {
                if tokens.peek().is_some() {
                    // a file in the middle of the path
                    return Err(Error::not_a_directory(token));
                }
                final_name = Some(token.to_string());
                final_is_file = true;
                break;
            }

            self.stack.push(entry)?;
            final_name = Some(token.to_string());
        }

        // A directory final component was entered above; step back out so
        // the handle references it without the stack having descended
        // past it.
        if !final_is_file && self.stack.depth() > 0 && final_name.is_some() {
            self.stack.pop();
        }

        let Some(name) = final_name else {
            if self.stack.depth() == 0 {
                return Ok(Resolved::Root);
            }
            // the path dissolved into dot components mid-tree
            return Err(Error::not_found(path));
        };

        Ok(Resolved::Entry(self.lookup(&name)?))
    }

    /// Change the working directory
    ///
    /// The stack is left unchanged on every failure path, including a
    /// target that exists but is not a directory.
    pub fn change_directory(&mut self, path: &str) -> Result<()> {
        match self.resolve(path, false)? {
            Resolved::Root => Ok(()),
            Resolved::Entry(entry) => {
                if !entry.is_directory() {
                    self.stack.restore();
                    return Err(Error::not_a_directory(path));
                }
                debug!(path, "entering directory");
                if let Err(e) = self.stack.push(entry) {
                    self.stack.restore();
                    return Err(e);
                }
                Ok(())
            }
        }
    }

    /// Resolve a path and report the directory it was found in
    ///
    /// Used for metadata reports: returns the resolution plus the
    /// `pwd`-style path of the final component's parent, with the working
    /// directory left untouched.
    pub fn locate(&mut self, path: &str) -> Result<(Resolved, String)> {
        let resolved = self.resolve(path, false)?;
        let parent = self.pwd();
        self.stack.restore();
        Ok((resolved, parent))
    }
}
