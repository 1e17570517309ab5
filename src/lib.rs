//! An in-memory hierarchical namespace driven by shell-like commands.
//!
//! ### Overview
//!
//! `vfs-tree` keeps a tree of directories and text files in memory and lets you navigate it the
//! way you would a shell session: `mkdir`, `touch`, `cat`, `rm`, `rmdir`, `cd`, `ls`, `pwd`,
//! `find`, `printall`. The whole tree can be saved to, and restored from, a flat indented text
//! snapshot on the host filesystem.
//!
//! **Key ideas**:
//! - **Single-segment names**: every command works on a child of the current directory.
//! - **Typed errors**: each failure is a `FsError` kind and leaves the tree unchanged.
//! - **Safe restore**: a snapshot is parsed into a fresh `TreeFS`; the live tree is only replaced
//!   once parsing succeeded.
//! - **Explicit session**: a `Shell` owns its `TreeFS`; there is no global state.

mod backend;
pub mod shell;
mod vfs;

pub use backend::{FsBackend, FsError, Result, utils};
pub use shell::{Command, Flow, Shell};
pub use vfs::snapshot;
pub use vfs::{
    DirId, Directory, Entry, EntryType, File, Match, ParseMode, Restored, TreeFS, WalkEntry,
};
