mod entry;
pub mod snapshot;
mod tree_fs;
mod walk;

pub use entry::{DirId, Directory, Entry, EntryType, File};
pub use snapshot::{ParseMode, Restored};
pub use tree_fs::TreeFS;
pub use walk::{Match, WalkEntry};
