//! Line-oriented text snapshots of a whole `TreeFS`.
//!
//! ```text
//! DIR /
//!   FILE readme CONTENT hello world
//!   DIR docs
//!     FILE a.txt CONTENT
//!     DIR drafts
//! ```
//!
//! Every directory is written as `DIR <name>` indented by two spaces per depth level, followed by
//! its files (`FILE <name> CONTENT <content>`, two more spaces), then by its subdirectories.
//! The parser uses that indentation to tell where a directory's children end, so sibling
//! directories come back as siblings. Content is the verbatim remainder of the line and cannot
//! contain a newline. Lines may end in `\r\n`, so a carriage return at the very end of some
//! content is lost on load.

use std::iter::{Enumerate, Peekable};
use std::path::Path;
use std::str::Lines;

use tracing::{info, warn};

use crate::backend::{FsError, Result, utils};
use crate::vfs::entry::DirId;
use crate::vfs::tree_fs::TreeFS;

const INDENT: &str = "  ";

/// How `parse` treats lines it cannot place in the tree.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum ParseMode {
    /// Offending lines are logged and skipped together with everything nested under them.
    #[default]
    BestEffort,
    /// The first offending line fails the whole parse with `MalformedSnapshot`.
    Strict,
}

/// A tree rebuilt from a snapshot.
#[derive(Debug)]
pub struct Restored {
    pub tree: TreeFS,
    /// 1-based numbers of the lines dropped in `BestEffort` mode.
    pub skipped: Vec<usize>,
}

/// Renders the whole tree, starting at the root, in pre-order.
pub fn to_string(fs: &TreeFS) -> String {
    let mut out = String::new();
    write_dir(fs, fs.root(), 0, &mut out);
    out
}

fn write_dir(fs: &TreeFS, id: DirId, depth: usize, out: &mut String) {
    let dir = fs.dir(id);
    let indent = INDENT.repeat(depth);

    out.push_str(&format!("{indent}DIR {}\n", dir.name));
    for file in dir.files.values() {
        if file.content.contains('\n') {
            warn!(file = %file.name, "content contains a newline; the snapshot will not load back");
        } else if file.content.ends_with('\r') {
            warn!(file = %file.name, "content ends with a carriage return; it will be lost on load");
        }
        out.push_str(&format!(
            "{indent}{INDENT}FILE {} CONTENT {}\n",
            file.name, file.content
        ));
    }
    for child in dir.dirs.values() {
        write_dir(fs, *child, depth + 1, out);
    }
}

/// Writes the snapshot of `fs` to the host file `path`, replacing it.
pub fn save<P: AsRef<Path>>(fs: &TreeFS, path: P) -> Result<()> {
    let path = path.as_ref();
    std::fs::write(path, to_string(fs)).map_err(|source| FsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), dirs = fs.dir_count(), files = fs.file_count(), "saved snapshot");
    Ok(())
}

/// Reads and parses the snapshot stored at `path`.
///
/// The result is a brand new tree; nothing is replaced here. Callers swap their live tree only
/// when this returns `Ok`, so a missing file or a malformed snapshot leaves the session intact.
pub fn load<P: AsRef<Path>>(path: P, mode: ParseMode) -> Result<Restored> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| FsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let restored = parse(&text, mode)?;
    info!(
        path = %path.display(),
        dirs = restored.tree.dir_count(),
        files = restored.tree.file_count(),
        skipped = restored.skipped.len(),
        "loaded snapshot"
    );
    Ok(restored)
}

/// Rebuilds a tree from snapshot text. The cursor of the new tree is at its root.
pub fn parse(text: &str, mode: ParseMode) -> Result<Restored> {
    let mut parser = Parser {
        lines: text.lines().enumerate().peekable(),
        mode,
        skipped: Vec::new(),
    };
    let mut tree = TreeFS::new();

    let Some((line_no, raw)) = parser.peek() else {
        return Err(FsError::malformed(0, "empty snapshot"));
    };
    match Record::parse(raw) {
        (0, Some(Record::Dir(name))) => {
            if name != utils::ROOT_NAME {
                parser.reject(
                    line_no,
                    0,
                    format!("root directory must be named {}", utils::ROOT_NAME),
                )?;
                // the rejected root took its whole subtree with it
                return Ok(Restored {
                    tree,
                    skipped: parser.skipped,
                });
            }
            parser.lines.next();
        }
        _ => return Err(FsError::malformed(line_no, "expected root directory line")),
    }

    let root = tree.root();
    parser.children(&mut tree, root, 0)?;

    // anything left over sits at the root's own level
    while let Some((line_no, raw)) = parser.peek() {
        let (indent, _) = Record::parse(raw);
        parser.reject(line_no, indent, "unexpected line after the root directory")?;
    }

    Ok(Restored {
        tree,
        skipped: parser.skipped,
    })
}

#[derive(Debug, PartialEq)]
enum Record<'a> {
    Dir(&'a str),
    File { name: &'a str, content: &'a str },
}

impl<'a> Record<'a> {
    /// Splits a raw line into its indentation width and the record it holds, if any.
    fn parse(raw: &'a str) -> (usize, Option<Record<'a>>) {
        let body = raw.trim_start_matches(' ');
        let indent = raw.len() - body.len();
        let record = if let Some(name) = body.strip_prefix("DIR ") {
            Some(Record::Dir(name))
        } else if let Some(rest) = body.strip_prefix("FILE ") {
            Self::file(rest)
        } else {
            None
        };
        (indent, record)
    }

    fn file(rest: &'a str) -> Option<Record<'a>> {
        let (name, tail) = rest.split_once(' ')?;
        let content = match tail.strip_prefix("CONTENT")? {
            "" => "",
            after => after.strip_prefix(' ')?,
        };
        Some(Record::File { name, content })
    }
}

struct Parser<'a> {
    lines: Peekable<Enumerate<Lines<'a>>>,
    mode: ParseMode,
    skipped: Vec<usize>,
}

impl<'a> Parser<'a> {
    /// Next non-blank line with its 1-based number, without consuming it.
    fn peek(&mut self) -> Option<(usize, &'a str)> {
        loop {
            let (index, raw) = *self.lines.peek()?;
            if raw.trim().is_empty() {
                self.lines.next();
                continue;
            }
            return Some((index + 1, raw));
        }
    }

    /// Consumes the children of `parent`, which sits at `depth`. Returns at the first line
    /// indented at or above `parent`'s own level.
    fn children(&mut self, tree: &mut TreeFS, parent: DirId, depth: usize) -> Result<()> {
        let child_indent = INDENT.len() * (depth + 1);

        while let Some((line_no, raw)) = self.peek() {
            let (indent, record) = Record::parse(raw);
            let Some(record) = record else {
                self.reject(line_no, indent, "unrecognized line")?;
                continue;
            };
            if indent < child_indent {
                return Ok(());
            }
            if indent > child_indent {
                self.reject(line_no, indent, "unexpected indentation")?;
                continue;
            }

            match record {
                Record::File { name, content } => {
                    match tree.insert_file(parent, name, Some(content)) {
                        Ok(()) => {
                            self.lines.next();
                        }
                        Err(err) => self.reject(line_no, indent, err.to_string())?,
                    }
                }
                Record::Dir(name) => match tree.insert_dir(parent, name) {
                    Ok(child) => {
                        self.lines.next();
                        self.children(tree, child, depth + 1)?;
                    }
                    Err(err) => self.reject(line_no, indent, err.to_string())?,
                },
            }
        }
        Ok(())
    }

    /// Fails in strict mode. Otherwise drops the line at `line_no` and every following line
    /// nested deeper than `indent`.
    fn reject<S: Into<String>>(&mut self, line_no: usize, indent: usize, reason: S) -> Result<()> {
        let reason = reason.into();
        if self.mode == ParseMode::Strict {
            return Err(FsError::malformed(line_no, reason));
        }

        warn!(line = line_no, %reason, "skipping snapshot line");
        self.lines.next();
        self.skipped.push(line_no);
        while let Some((nested_no, raw)) = self.peek() {
            if Record::parse(raw).0 <= indent {
                break;
            }
            self.lines.next();
            self.skipped.push(nested_no);
        }
        Ok(())
    }
}
