use std::path::PathBuf;

use crate::{Entry, EntryType, Match, WalkEntry};

/// Operations of a hierarchical namespace navigated through a current-directory cursor.
///
/// Every name argument is a single path segment: it is resolved against the current directory
/// only. Multi-segment paths are rejected with [`FsError::InvalidName`].
pub trait FsBackend {
    /// Returns the path from the root to the current directory, e.g. `/docs/drafts`.
    fn cwd_path(&self) -> String;

    /// Moves the cursor. `..` goes to the parent, `/` goes to the root, anything else must be
    /// a subdirectory of the current directory.
    fn cd(&mut self, target: &str) -> Result<()>;

    /// Creates an empty subdirectory in the current directory.
    fn mkdir(&mut self, name: &str) -> Result<()>;

    /// Creates a file in the current directory, empty when `content` is `None`.
    fn mkfile(&mut self, name: &str, content: Option<&str>) -> Result<()>;

    /// Returns the content of a file in the current directory.
    fn read(&self, name: &str) -> Result<&str>;

    /// Replaces the content of an existing file in the current directory.
    fn write(&mut self, name: &str, content: &str) -> Result<()>;

    /// Removes a file from the current directory.
    fn rm(&mut self, name: &str) -> Result<()>;

    /// Removes an empty subdirectory from the current directory.
    fn rmdir(&mut self, name: &str) -> Result<()>;

    /// Lists the current directory: subdirectories first, then files.
    fn ls(&self) -> impl Iterator<Item = Entry<'_>>;

    /// Searches the current directory and everything below it for nodes called `name`.
    fn find<'a>(&'a self, name: &'a str) -> impl Iterator<Item = Match> + 'a;

    /// Walks the whole tree from the root, independent of the cursor.
    fn tree(&self) -> impl Iterator<Item = WalkEntry<'_>>;
}

pub type Result<T> = std::result::Result<T, FsError>;

#[derive(Debug, thiserror::Error)]
pub enum FsError {
    #[error("{kind} already exists: {name}")]
    AlreadyExists { kind: EntryType, name: String },

    #[error("{kind} not found: {name}")]
    NotFound { kind: EntryType, name: String },

    #[error("directory is not empty: {0}")]
    NotEmpty(String),

    #[error("already at the root directory")]
    AtRoot,

    #[error("invalid name: {0:?}")]
    InvalidName(String),

    #[error("cannot access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed snapshot at line {line}: {reason}")]
    MalformedSnapshot { line: usize, reason: String },
}

impl FsError {
    pub fn already_exists(kind: EntryType, name: &str) -> Self {
        FsError::AlreadyExists {
            kind,
            name: name.to_string(),
        }
    }

    pub fn not_found(kind: EntryType, name: &str) -> Self {
        FsError::NotFound {
            kind,
            name: name.to_string(),
        }
    }

    pub fn malformed<S: Into<String>>(line: usize, reason: S) -> Self {
        FsError::MalformedSnapshot {
            line,
            reason: reason.into(),
        }
    }
}

pub mod utils {
    use super::{FsError, Result};

    /// Name of the root directory. Also used as the leading separator of printed paths.
    pub const ROOT_NAME: &str = "/";

    /// Checks that `name` is usable as a single node name.
    ///
    /// Names must be non-empty, must not be `.` or `..`, and must contain neither `/` nor
    /// whitespace (the snapshot format and the shell both split on whitespace).
    pub fn validate_name(name: &str) -> Result<()> {
        if name.is_empty()
            || name == "."
            || name == ".."
            || name.contains('/')
            || name.chars().any(char::is_whitespace)
        {
            return Err(FsError::InvalidName(name.to_string()));
        }
        Ok(())
    }

    /// Appends `name` to a display path, avoiding a doubled separator after the root.
    pub fn join(parent: &str, name: &str) -> String {
        if parent.ends_with('/') {
            format!("{parent}{name}")
        } else {
            format!("{parent}/{name}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::utils::*;
    use super::*;

    #[test]
    fn test_validate_name_accepts_plain_names() {
        assert!(validate_name("notes.txt").is_ok());
        assert!(validate_name(".hidden").is_ok());
        assert!(validate_name("a..b").is_ok());
    }

    #[test]
    fn test_validate_name_rejects_special_names() {
        for bad in ["", ".", "..", "a/b", "/", "two words", "tab\tname"] {
            let result = validate_name(bad);
            assert!(
                matches!(result, Err(FsError::InvalidName(ref n)) if n == bad),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_join() {
        assert_eq!(join("/", "a"), "/a");
        assert_eq!(join("/a", "b"), "/a/b");
        assert_eq!(join(".", "x"), "./x");
    }

    #[test]
    fn test_error_messages() {
        let err = FsError::already_exists(EntryType::File, "a.txt");
        assert_eq!(err.to_string(), "file already exists: a.txt");

        let err = FsError::not_found(EntryType::Directory, "docs");
        assert_eq!(err.to_string(), "directory not found: docs");

        let err = FsError::malformed(3, "unexpected line");
        assert_eq!(
            err.to_string(),
            "malformed snapshot at line 3: unexpected line"
        );
    }
}
