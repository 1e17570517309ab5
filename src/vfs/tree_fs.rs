//! This module provides the in-memory directory tree that backs the shell.
//!
//! ### Key Features:
//! - **Arena storage**: directories live in a slot arena and refer to each other by `DirId`, so
//!   the parent back-reference never owns anything.
//! - **Cursor**: a current directory against which every single-segment name is resolved.
//! - **Ordered children**: `BTreeMap` child maps make listings and snapshots deterministic.
//! - **Acyclic by construction**: nodes are only ever created as children of the cursor and are
//!   never re-parented.

use tracing::debug;

use crate::backend::{FsBackend, FsError, Result, utils};
use crate::vfs::entry::{DirId, Directory, File};
use crate::vfs::walk::{Match, Walk};
use crate::{Entry, EntryType, WalkEntry};

/// An in-memory hierarchical namespace with a current-directory cursor.
///
/// ### Internal state
///
/// * `arena` — every live directory, indexed by `DirId`. Slots of removed directories are `None`
///   and recycled through `free`.
/// * `root` — the directory named `/`. It has no parent and cannot be removed.
/// * `cwd` — the cursor. Always a live slot: `rmdir` only removes empty children of the cursor,
///   so neither the cursor nor any of its ancestors can be removed.
///
/// ### Invariants
///
/// 1. File names are unique within a directory, and so are subdirectory names. A file and a
///    subdirectory may share a name.
/// 2. For every directory `d` reachable as `dirs[name]` of `p`, `d.parent == Some(p)`.
/// 3. Only empty directories are removed.
///
/// ### Example
///
/// ```
/// use vfs_tree::{FsBackend, TreeFS};
///
/// let mut fs = TreeFS::new();
/// fs.mkdir("docs").unwrap();
/// fs.cd("docs").unwrap();
/// fs.mkfile("note.txt", Some("Hello")).unwrap();
///
/// assert_eq!(fs.read("note.txt").unwrap(), "Hello");
/// assert_eq!(fs.cwd_path(), "/docs");
/// ```
#[derive(Debug, Clone)]
pub struct TreeFS {
    arena: Vec<Option<Directory>>,
    free: Vec<usize>,
    root: DirId,
    cwd: DirId,
}

impl TreeFS {
    /// Creates a tree holding only the root directory; the cursor is at the root.
    pub fn new() -> Self {
        let root = DirId(0);
        Self {
            arena: vec![Some(Directory::new(utils::ROOT_NAME, None))],
            free: Vec::new(),
            root,
            cwd: root,
        }
    }

    pub fn root(&self) -> DirId {
        self.root
    }

    pub fn cwd(&self) -> DirId {
        self.cwd
    }

    /// Returns the directory stored at `id`, if it is still alive.
    pub fn get(&self, id: DirId) -> Option<&Directory> {
        self.arena.get(id.0).and_then(Option::as_ref)
    }

    /// Name of the current directory.
    pub fn cwd_name(&self) -> &str {
        &self.dir(self.cwd).name
    }

    /// Number of live directories, root included.
    pub fn dir_count(&self) -> usize {
        self.arena.len() - self.free.len()
    }

    /// Number of files in the whole tree.
    pub fn file_count(&self) -> usize {
        self.arena
            .iter()
            .flatten()
            .map(|dir| dir.files.len())
            .sum()
    }

    /// Walks the subtree under `start`, labelling `start` itself with `prefix`.
    pub(crate) fn walk(&self, start: DirId, prefix: &str) -> Walk<'_> {
        Walk::new(self, start, prefix)
    }

    /// Ids held by the tree always point to live slots.
    pub(crate) fn dir(&self, id: DirId) -> &Directory {
        match &self.arena[id.0] {
            Some(dir) => dir,
            None => unreachable!("stale directory id {id:?}"),
        }
    }

    fn dir_mut(&mut self, id: DirId) -> &mut Directory {
        match &mut self.arena[id.0] {
            Some(dir) => dir,
            None => unreachable!("stale directory id {id:?}"),
        }
    }

    /// Creates the subdirectory `name` under `parent`.
    pub(crate) fn insert_dir(&mut self, parent: DirId, name: &str) -> Result<DirId> {
        utils::validate_name(name)?;
        if self.dir(parent).dirs.contains_key(name) {
            return Err(FsError::already_exists(EntryType::Directory, name));
        }

        let node = Directory::new(name, Some(parent));
        let id = match self.free.pop() {
            Some(slot) => {
                self.arena[slot] = Some(node);
                DirId(slot)
            }
            None => {
                self.arena.push(Some(node));
                DirId(self.arena.len() - 1)
            }
        };
        self.dir_mut(parent).dirs.insert(name.to_string(), id);
        Ok(id)
    }

    /// Creates the file `name` under `parent`.
    pub(crate) fn insert_file(
        &mut self,
        parent: DirId,
        name: &str,
        content: Option<&str>,
    ) -> Result<()> {
        utils::validate_name(name)?;
        let dir = self.dir_mut(parent);
        if dir.files.contains_key(name) {
            return Err(FsError::already_exists(EntryType::File, name));
        }
        dir.files.insert(name.to_string(), File::new(name, content));
        Ok(())
    }

    fn current(&self) -> &Directory {
        self.dir(self.cwd)
    }

    fn current_mut(&mut self) -> &mut Directory {
        let cwd = self.cwd;
        self.dir_mut(cwd)
    }
}

impl Default for TreeFS {
    fn default() -> Self {
        Self::new()
    }
}

impl FsBackend for TreeFS {
    /// Walks parent references from the cursor up to the root and joins the names in
    /// root-first order. The root alone is `/`.
    fn cwd_path(&self) -> String {
        let mut names = Vec::new();
        let mut cursor = Some(self.cwd);
        while let Some(id) = cursor {
            let dir = self.dir(id);
            if dir.parent.is_some() {
                names.push(dir.name.as_str());
            }
            cursor = dir.parent;
        }
        names.reverse();
        format!("{}{}", utils::ROOT_NAME, names.join("/"))
    }

    /// Changes the current directory.
    /// * `..` moves to the parent; at the root it fails with `AtRoot` and leaves the cursor alone.
    /// * `/` moves to the root.
    /// * anything else must name a subdirectory of the current directory.
    fn cd(&mut self, target: &str) -> Result<()> {
        let next = match target {
            ".." => self.current().parent.ok_or(FsError::AtRoot)?,
            "/" => self.root,
            name => {
                utils::validate_name(name)?;
                *self
                    .current()
                    .dirs
                    .get(name)
                    .ok_or_else(|| FsError::not_found(EntryType::Directory, name))?
            }
        };
        self.cwd = next;
        debug!(to = target, cwd = %self.cwd_path(), "changed directory");
        Ok(())
    }

    fn mkdir(&mut self, name: &str) -> Result<()> {
        self.insert_dir(self.cwd, name)?;
        debug!(dir = name, "created directory");
        Ok(())
    }

    /// Fails with `AlreadyExists` if the name is taken; the existing file keeps its content.
    fn mkfile(&mut self, name: &str, content: Option<&str>) -> Result<()> {
        self.insert_file(self.cwd, name, content)?;
        debug!(file = name, "created file");
        Ok(())
    }

    fn read(&self, name: &str) -> Result<&str> {
        self.current()
            .files
            .get(name)
            .map(File::content)
            .ok_or_else(|| FsError::not_found(EntryType::File, name))
    }

    fn write(&mut self, name: &str, content: &str) -> Result<()> {
        let file = self
            .current_mut()
            .files
            .get_mut(name)
            .ok_or_else(|| FsError::not_found(EntryType::File, name))?;
        file.content = content.to_string();
        debug!(file = name, len = content.len(), "wrote file");
        Ok(())
    }

    fn rm(&mut self, name: &str) -> Result<()> {
        self.current_mut()
            .files
            .remove(name)
            .ok_or_else(|| FsError::not_found(EntryType::File, name))?;
        debug!(file = name, "removed file");
        Ok(())
    }

    /// Removes an empty subdirectory of the current directory. Non-empty directories are left
    /// untouched and reported with `NotEmpty`; there is no recursive removal.
    fn rmdir(&mut self, name: &str) -> Result<()> {
        let id = *self
            .current()
            .dirs
            .get(name)
            .ok_or_else(|| FsError::not_found(EntryType::Directory, name))?;
        if !self.dir(id).is_empty() {
            return Err(FsError::NotEmpty(name.to_string()));
        }

        self.current_mut().dirs.remove(name);
        self.arena[id.0] = None;
        self.free.push(id.0);
        debug!(dir = name, "removed directory");
        Ok(())
    }

    fn ls(&self) -> impl Iterator<Item = Entry<'_>> {
        let dir = self.current();
        let dirs = dir
            .dirs
            .keys()
            .map(|name| Entry::new(name, EntryType::Directory));
        let files = dir
            .files
            .keys()
            .map(|name| Entry::new(name, EntryType::File));
        dirs.chain(files)
    }

    /// Searches from the current directory, which is displayed as `.`.
    ///
    /// A directory matches when its own name equals `name` (this includes the starting
    /// directory); files match independently in every visited directory.
    fn find<'a>(&'a self, name: &'a str) -> impl Iterator<Item = Match> + 'a {
        self.walk(self.cwd, ".")
            .filter(move |entry| entry.name() == name)
            .map(|entry| Match {
                entry_type: entry.entry_type(),
                path: entry.into_path(),
            })
    }

    fn tree(&self) -> impl Iterator<Item = WalkEntry<'_>> {
        self.walk(self.root, utils::ROOT_NAME)
    }
}
