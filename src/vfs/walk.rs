//! Lazy pre-order traversal of a `TreeFS` subtree.
//!
//! A directory is yielded first, then its files, then each of its subdirectories (recursively),
//! all in name order. Files are reported one level deeper than the directory holding them, which
//! is exactly the nesting used by the `printall` listing and by the snapshot format.

use std::collections::VecDeque;

use crate::backend::utils;
use crate::vfs::entry::DirId;
use crate::vfs::tree_fs::TreeFS;
use crate::EntryType;

/// A node visited by a tree walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry<'a> {
    path: String,
    name: &'a str,
    entry_type: EntryType,
    depth: usize,
}

impl<'a> WalkEntry<'a> {
    /// Display path: the walk prefix joined with every name down to this node.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn name(&self) -> &'a str {
        self.name
    }

    pub fn entry_type(&self) -> EntryType {
        self.entry_type
    }

    /// Nesting level relative to the start of the walk (the start directory is 0).
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn into_path(self) -> String {
        self.path
    }
}

/// A search hit produced by `find`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub path: String,
    pub entry_type: EntryType,
}

pub(crate) struct Walk<'a> {
    fs: &'a TreeFS,
    stack: Vec<(DirId, String, usize)>,
    files: VecDeque<WalkEntry<'a>>,
}

impl<'a> Walk<'a> {
    pub(crate) fn new(fs: &'a TreeFS, start: DirId, prefix: &str) -> Walk<'a> {
        Walk {
            fs,
            stack: vec![(start, prefix.to_string(), 0)],
            files: VecDeque::new(),
        }
    }
}

impl<'a> Iterator for Walk<'a> {
    type Item = WalkEntry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(file) = self.files.pop_front() {
            return Some(file);
        }

        let (id, path, depth) = self.stack.pop()?;
        let fs = self.fs;
        let dir = fs.dir(id);

        self.files.extend(dir.files.values().map(|file| WalkEntry {
            path: utils::join(&path, &file.name),
            name: &file.name,
            entry_type: EntryType::File,
            depth: depth + 1,
        }));

        // reversed, so that the smallest name is popped first
        for (name, child) in dir.dirs.iter().rev() {
            self.stack.push((*child, utils::join(&path, name), depth + 1));
        }

        Some(WalkEntry {
            path,
            name: &dir.name,
            entry_type: EntryType::Directory,
            depth,
        })
    }
}
