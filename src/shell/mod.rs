//! Interactive command dispatcher over a `TreeFS`.
//!
//! A `Shell` owns the tree of one session. Each input line is parsed into a [`Command`], run to
//! completion against the tree and answered with human-readable text. Failures are reported
//! and swallowed: only `exit` (or end of input) ends the session.

mod command;

use std::io::{self, BufRead, Write};
use std::path::Path;

use tracing::{debug, info, warn};

pub use command::{Command, ParseError, USAGE};

use crate::backend::{FsBackend, FsError};
use crate::vfs::snapshot::{self, ParseMode};
use crate::{EntryType, TreeFS};

pub const PROMPT: &str = ">>> ";

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

pub struct Shell {
    fs: TreeFS,
    load_mode: ParseMode,
    prompt: bool,
}

impl Shell {
    pub fn new(fs: TreeFS) -> Self {
        Self {
            fs,
            load_mode: ParseMode::BestEffort,
            prompt: true,
        }
    }

    /// Parsing mode used by the `load` command, `BestEffort` unless set here.
    pub fn with_load_mode(mut self, mode: ParseMode) -> Self {
        self.load_mode = mode;
        self
    }

    /// Whether `run` prints `>>> ` before reading each line.
    pub fn with_prompt(mut self, prompt: bool) -> Self {
        self.prompt = prompt;
        self
    }

    pub fn fs(&self) -> &TreeFS {
        &self.fs
    }

    pub fn into_fs(self) -> TreeFS {
        self.fs
    }

    /// Reads commands from `input` until `exit` or end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, mut input: R, out: &mut W) -> io::Result<()> {
        let mut line = String::new();
        loop {
            if self.prompt {
                write!(out, "{PROMPT}")?;
                out.flush()?;
            }
            line.clear();
            if input.read_line(&mut line)? == 0 {
                debug!("end of input");
                break;
            }
            if self.execute_line(&line, out)? == Flow::Exit {
                break;
            }
        }
        Ok(())
    }

    /// Parses and runs one line of input.
    pub fn execute_line<W: Write>(&mut self, line: &str, out: &mut W) -> io::Result<Flow> {
        match Command::parse(line) {
            Ok(Some(command)) => self.execute(command, out),
            Ok(None) => Ok(Flow::Continue),
            Err(err) => {
                debug!(line = line.trim_end(), %err, "rejected input");
                writeln!(out, "{err}")?;
                Ok(Flow::Continue)
            }
        }
    }

    /// Runs one command. Only failures to write to `out` are returned as errors.
    pub fn execute<W: Write>(&mut self, command: Command, out: &mut W) -> io::Result<Flow> {
        let fs = &mut self.fs;
        let outcome = match command {
            Command::Mkdir(name) => fs
                .mkdir(&name)
                .map(|_| writeln!(out, "Directory created: {name}")),
            Command::Touch { name, content } => fs
                .mkfile(&name, content.as_deref())
                .map(|_| writeln!(out, "File created: {name}")),
            Command::Write { name, content } => fs
                .write(&name, &content)
                .map(|_| writeln!(out, "File written: {name}")),
            Command::Cat(name) => fs
                .read(&name)
                .map(|content| writeln!(out, "File content: {content}")),
            Command::Rm(name) => fs
                .rm(&name)
                .map(|_| writeln!(out, "File deleted: {name}")),
            Command::Rmdir(name) => fs
                .rmdir(&name)
                .map(|_| writeln!(out, "Directory deleted: {name}")),
            Command::Cd(target) => fs.cd(&target).map(|_| Ok(())),
            Command::Ls => Ok(list(fs, out)),
            Command::Pwd => Ok(writeln!(out, "Current directory: {}", fs.cwd_path())),
            Command::Find(name) => Ok(find(fs, &name, out)),
            Command::PrintAll => Ok(print_all(fs, out)),
            Command::Save(path) => snapshot::save(fs, &path)
                .map(|_| writeln!(out, "File system saved to {}", path.display())),
            Command::Load(path) => self.load(&path, out),
            Command::Help => Ok(help(out)),
            Command::Exit => return Ok(Flow::Exit),
        };

        match outcome {
            Ok(written) => written?,
            Err(err) => {
                debug!(%err, "command failed");
                writeln!(out, "{}", describe(&err))?;
            }
        }
        Ok(Flow::Continue)
    }

    /// Replaces the session tree with the snapshot at `path`. The current tree survives any
    /// failure to read or parse the snapshot.
    fn load<W: Write>(&mut self, path: &Path, out: &mut W) -> crate::Result<io::Result<()>> {
        let restored = snapshot::load(path, self.load_mode)?;
        self.fs = restored.tree;
        info!(path = %path.display(), "session tree replaced");

        Ok(writeln!(out, "File system loaded from {}", path.display()).and_then(|_| {
            if restored.skipped.is_empty() {
                return Ok(());
            }
            warn!(lines = ?restored.skipped, "snapshot loaded partially");
            writeln!(
                out,
                "Skipped {} malformed line(s): {:?}",
                restored.skipped.len(),
                restored.skipped
            )
        }))
    }
}

impl Default for Shell {
    fn default() -> Self {
        Self::new(TreeFS::new())
    }
}

fn list<W: Write>(fs: &TreeFS, out: &mut W) -> io::Result<()> {
    writeln!(out, "Directory contents of {}:", fs.cwd_name())?;
    for entry in fs.ls() {
        writeln!(out, "[{}] {}", entry.entry_type().tag(), entry.name())?;
    }
    Ok(())
}

fn find<W: Write>(fs: &TreeFS, name: &str, out: &mut W) -> io::Result<()> {
    let mut found = 0;
    for hit in fs.find(name) {
        writeln!(out, "{} [{}]", hit.path, hit.entry_type.tag())?;
        found += 1;
    }
    if found == 0 {
        writeln!(out, "No matches for {name}.")?;
    }
    Ok(())
}

fn print_all<W: Write>(fs: &TreeFS, out: &mut W) -> io::Result<()> {
    writeln!(out, "Listing all files and directories starting from root:")?;
    for entry in fs.tree() {
        let indent = "  ".repeat(entry.depth());
        writeln!(out, "{indent}[{}] {}", entry.entry_type().tag(), entry.name())?;
    }
    Ok(())
}

fn help<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "Commands:")?;
    for (_, usage) in USAGE {
        writeln!(out, "  {usage}")?;
    }
    Ok(())
}

/// Message shown to the user for a failed command.
fn describe(err: &FsError) -> String {
    match err {
        FsError::AlreadyExists {
            kind: EntryType::File,
            ..
        } => "File already exists. Duplicate files are not allowed.".to_string(),
        FsError::AlreadyExists {
            kind: EntryType::Directory,
            ..
        } => "Directory already exists. Duplicate directories are not allowed.".to_string(),
        FsError::NotFound {
            kind: EntryType::File,
            ..
        } => "File not found.".to_string(),
        FsError::NotFound {
            kind: EntryType::Directory,
            ..
        } => "Directory not found.".to_string(),
        FsError::NotEmpty(_) => {
            "Directory is not empty. Only empty directories can be deleted.".to_string()
        }
        FsError::AtRoot => "Already at the root directory.".to_string(),
        FsError::InvalidName(name) => format!("Invalid name: {name:?}."),
        FsError::Io { .. } | FsError::MalformedSnapshot { .. } => format!("Error: {err}."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    fn run_script(shell: &mut Shell, script: &str) -> String {
        let mut out = Vec::new();
        shell.run(script.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn setup_shell() -> Shell {
        Shell::default().with_prompt(false)
    }

    mod commands {
        use super::*;

        #[test]
        fn test_create_and_read() {
            let mut shell = setup_shell();
            let out = run_script(&mut shell, "touch a.txt hello there\ncat a.txt\ncat b.txt\n");
            assert_eq!(
                out,
                "File created: a.txt\nFile content: hello there\nFile not found.\n"
            );
        }

        #[test]
        fn test_line_endings_are_not_stored() -> crate::Result<()> {
            let mut shell = setup_shell();
            run_script(&mut shell, "touch a hello\r\ntouch b\nwrite b two words\r\n");
            assert_eq!(shell.fs().read("a")?, "hello");
            assert_eq!(shell.fs().read("b")?, "two words");
            assert_eq!(
                snapshot::to_string(shell.fs()),
                "DIR /\n  FILE a CONTENT hello\n  FILE b CONTENT two words\n"
            );
            Ok(())
        }

        #[test]
        fn test_duplicates_are_reported() {
            let mut shell = setup_shell();
            let out = run_script(&mut shell, "touch a\ntouch a\nmkdir d\nmkdir d\n");
            assert_eq!(
                out,
                "File created: a\n\
                 File already exists. Duplicate files are not allowed.\n\
                 Directory created: d\n\
                 Directory already exists. Duplicate directories are not allowed.\n"
            );
        }

        #[test]
        fn test_write_and_rm() {
            let mut shell = setup_shell();
            let out = run_script(&mut shell, "touch a\nwrite a v2\ncat a\nrm a\nrm a\n");
            assert_eq!(
                out,
                "File created: a\nFile written: a\nFile content: v2\nFile deleted: a\nFile not found.\n"
            );
        }

        #[test]
        fn test_rmdir_not_empty() {
            let mut shell = setup_shell();
            let out = run_script(&mut shell, "mkdir d\ncd d\ntouch f\ncd ..\nrmdir d\nrmdir nope\n");
            assert!(out.ends_with(
                "Directory is not empty. Only empty directories can be deleted.\nDirectory not found.\n"
            ));
            assert_eq!(shell.fs().dir_count(), 2);
        }

        #[test]
        fn test_navigation_and_pwd() {
            let mut shell = setup_shell();
            let out = run_script(
                &mut shell,
                "mkdir a\ncd a\nmkdir b\ncd b\npwd\ncd /\npwd\ncd ..\ncd missing\n",
            );
            assert_eq!(
                out,
                "Directory created: a\n\
                 Directory created: b\n\
                 Current directory: /a/b\n\
                 Current directory: /\n\
                 Already at the root directory.\n\
                 Directory not found.\n"
            );
        }

        #[test]
        fn test_ls() {
            let mut shell = setup_shell();
            let out = run_script(&mut shell, "touch f\nmkdir d\nls\ncd d\nls\n");
            assert_eq!(
                out,
                "File created: f\n\
                 Directory created: d\n\
                 Directory contents of /:\n\
                 [DIR] d\n\
                 [FILE] f\n\
                 Directory contents of d:\n"
            );
        }

        #[test]
        fn test_find() {
            let mut shell = setup_shell();
            let out = run_script(
                &mut shell,
                "mkdir x\ncd x\nmkdir y\ncd y\ntouch f.txt\ncd /\nfind f.txt\nfind y\nfind zzz\n",
            );
            assert!(out.ends_with("./x/y/f.txt [FILE]\n./x/y [DIR]\nNo matches for zzz.\n"));
        }

        #[test]
        fn test_print_all() {
            let mut shell = setup_shell();
            let out = run_script(&mut shell, "mkdir a\ncd a\ntouch f\nmkdir b\ncd b\nprintall\n");
            assert!(out.ends_with(
                "Listing all files and directories starting from root:\n\
                 [DIR] /\n  [DIR] a\n    [FILE] f\n    [DIR] b\n"
            ));
        }

        #[test]
        fn test_invalid_input() {
            let mut shell = setup_shell();
            let out = run_script(&mut shell, "frobnicate\nmkdir\n\nmkdir a/b\n");
            assert_eq!(
                out,
                "Invalid command!\n\
                 Insufficient arguments. Usage: mkdir <name>\n\
                 Invalid name: \"a/b\".\n"
            );
            assert_eq!(shell.fs().dir_count(), 1);
        }

        #[test]
        fn test_exit_stops_reading() {
            let mut shell = setup_shell();
            let out = run_script(&mut shell, "touch a\nexit\ntouch b\n");
            assert_eq!(out, "File created: a\n");
            assert_eq!(shell.fs().file_count(), 1);
        }

        #[test]
        fn test_prompt_is_printed() {
            let mut shell = Shell::default();
            let out = run_script(&mut shell, "pwd\n");
            assert_eq!(out, ">>> Current directory: /\n>>> ");
        }

        #[test]
        fn test_help_lists_every_command() {
            let mut shell = setup_shell();
            let out = run_script(&mut shell, "help\n");
            for (verb, _) in USAGE {
                assert!(out.contains(verb), "{verb} missing from help");
            }
        }
    }

    mod persistence {
        use super::*;

        fn setup_test_env() -> TempDir {
            TempDir::new("shell_test").unwrap()
        }

        #[test]
        fn test_save_and_load() {
            let temp_dir = setup_test_env();
            let path = temp_dir.path().join("tree.txt");

            let mut shell = setup_shell();
            let script = format!(
                "mkdir x\ncd x\nmkdir y\ncd y\ntouch f.txt hello\nsave {}\n",
                path.display()
            );
            run_script(&mut shell, &script);

            let mut fresh = setup_shell();
            let script = format!("load {}\ncd x\ncd y\ncat f.txt\npwd\n", path.display());
            let out = run_script(&mut fresh, &script);
            assert_eq!(
                out,
                format!(
                    "File system loaded from {}\nFile content: hello\nCurrent directory: /x/y\n",
                    path.display()
                )
            );
        }

        #[test]
        fn test_load_missing_file_keeps_tree() {
            let temp_dir = setup_test_env();
            let path = temp_dir.path().join("missing.txt");

            let mut shell = setup_shell();
            run_script(&mut shell, "mkdir keep\ncd keep\n");
            let out = run_script(&mut shell, &format!("load {}\npwd\n", path.display()));

            assert!(out.starts_with("Error: cannot access"));
            assert!(out.ends_with("Current directory: /keep\n"));
        }

        #[test]
        fn test_load_malformed_file_rebuilds_valid_part() -> crate::Result<()> {
            let temp_dir = setup_test_env();
            let path = temp_dir.path().join("bad.txt");
            std::fs::write(&path, "DIR /\n  DIR a\n  nonsense\n").unwrap();

            let mut shell = setup_shell();
            run_script(&mut shell, "touch keep.txt\n");
            let out = run_script(&mut shell, &format!("load {}\ncd a\npwd\n", path.display()));

            assert!(out.contains("Skipped 1 malformed line(s): [3]\n"));
            assert!(out.ends_with("Current directory: /a\n"));
            assert_eq!(shell.fs().file_count(), 0);
            assert!(shell.fs().read("keep.txt").is_err());
            Ok(())
        }

        #[test]
        fn test_load_reports_skipped_lines() {
            let temp_dir = setup_test_env();
            let path = temp_dir.path().join("bad.txt");
            std::fs::write(&path, "DIR /\n  DIR a\n  nonsense\n  FILE f CONTENT v\n").unwrap();

            let mut shell = setup_shell();
            let out = run_script(&mut shell, &format!("load {}\ncat f\n", path.display()));

            assert!(out.contains("Skipped 1 malformed line(s): [3]\n"));
            assert!(out.ends_with("File content: v\n"));
        }

        #[test]
        fn test_load_without_root_line_keeps_tree() {
            let temp_dir = setup_test_env();
            let path = temp_dir.path().join("bad.txt");
            std::fs::write(&path, "not a snapshot\n").unwrap();

            let mut shell = setup_shell();
            run_script(&mut shell, "touch keep.txt\n");
            let out = run_script(&mut shell, &format!("load {}\n", path.display()));

            assert_eq!(
                out,
                "Error: malformed snapshot at line 1: expected root directory line.\n"
            );
            assert_eq!(shell.fs().file_count(), 1);
        }

        #[test]
        fn test_strict_load_malformed_file_keeps_tree() {
            let temp_dir = setup_test_env();
            let path = temp_dir.path().join("bad.txt");
            std::fs::write(&path, "DIR /\n  DIR a\n  nonsense\n").unwrap();

            let mut shell = setup_shell().with_load_mode(ParseMode::Strict);
            run_script(&mut shell, "touch keep.txt\n");
            let out = run_script(&mut shell, &format!("load {}\n", path.display()));

            assert_eq!(
                out,
                "Error: malformed snapshot at line 3: unrecognized line.\n"
            );
            assert_eq!(shell.fs().file_count(), 1);
        }

        #[test]
        fn test_save_to_unwritable_path() {
            let temp_dir = setup_test_env();
            let path = temp_dir.path().join("missing/dir/tree.txt");

            let mut shell = setup_shell();
            let out = run_script(&mut shell, &format!("save {}\n", path.display()));
            assert!(out.starts_with("Error: cannot access"));
        }
    }
}
