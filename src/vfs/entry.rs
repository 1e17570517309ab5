use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EntryType {
    File,
    Directory,
}

impl EntryType {
    /// Tag used by listings and search results: `FILE` or `DIR`.
    pub fn tag(&self) -> &'static str {
        match self {
            EntryType::File => "FILE",
            EntryType::Directory => "DIR",
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryType::File => f.write_str("file"),
            EntryType::Directory => f.write_str("directory"),
        }
    }
}

/// One item of a directory listing.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Entry<'a> {
    name: &'a str,
    entry_type: EntryType,
}

impl<'a> Entry<'a> {
    pub fn new(name: &'a str, entry_type: EntryType) -> Entry<'a> {
        Entry { name, entry_type }
    }

    pub fn name(&self) -> &'a str {
        self.name
    }

    pub fn entry_type(&self) -> EntryType {
        self.entry_type
    }

    pub fn is_file(&self) -> bool {
        self.entry_type == EntryType::File
    }

    pub fn is_dir(&self) -> bool {
        self.entry_type == EntryType::Directory
    }
}

/// Index of a directory in the arena of a `TreeFS`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct DirId(pub(crate) usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    pub(crate) name: String,
    pub(crate) content: String,
}

impl File {
    pub fn new(name: &str, content: Option<&str>) -> File {
        File {
            name: name.to_string(),
            content: content.unwrap_or_default().to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// A directory node. Files are owned inline; subdirectories are arena indices.
#[derive(Debug, Clone)]
pub struct Directory {
    pub(crate) name: String,
    pub(crate) parent: Option<DirId>, // never changes after creation
    pub(crate) files: BTreeMap<String, File>,
    pub(crate) dirs: BTreeMap<String, DirId>,
}

impl Directory {
    pub fn new(name: &str, parent: Option<DirId>) -> Directory {
        Directory {
            name: name.to_string(),
            parent,
            files: BTreeMap::new(),
            dirs: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<DirId> {
        self.parent
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.dirs.is_empty()
    }
}
