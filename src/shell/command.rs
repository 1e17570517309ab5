use std::path::PathBuf;

/// One parsed line of shell input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Mkdir(String),
    Touch {
        name: String,
        content: Option<String>,
    },
    Write {
        name: String,
        content: String,
    },
    Cat(String),
    Rm(String),
    Rmdir(String),
    Cd(String),
    Ls,
    Pwd,
    Find(String),
    PrintAll,
    Save(PathBuf),
    Load(PathBuf),
    Help,
    Exit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Invalid command!")]
    Unknown(String),

    #[error("Insufficient arguments. Usage: {usage}")]
    MissingArgument { verb: String, usage: &'static str },
}

pub const USAGE: &[(&str, &str)] = &[
    ("mkdir", "mkdir <name>"),
    ("touch", "touch <name> [content...]"),
    ("write", "write <name> <content...>"),
    ("cat", "cat <name>"),
    ("rm", "rm <name>"),
    ("rmdir", "rmdir <name>"),
    ("cd", "cd <name|..|/>"),
    ("ls", "ls"),
    ("pwd", "pwd"),
    ("find", "find <name>"),
    ("printall", "printall"),
    ("save", "save <path>"),
    ("load", "load <path>"),
    ("help", "help"),
    ("exit", "exit"),
];

impl Command {
    /// Parses a line of input. Blank lines yield `Ok(None)`.
    ///
    /// Arguments are whitespace separated. Extra arguments are ignored, except for `touch` and
    /// `write`, which keep the rest of the line verbatim as file content. The line ending is
    /// never part of that content.
    pub fn parse(line: &str) -> Result<Option<Command>, ParseError> {
        let line = line.trim_end_matches(['\r', '\n']);
        let (verb, rest) = split_word(line);
        if verb.is_empty() {
            return Ok(None);
        }
        let (arg, tail) = split_word(rest);
        let content = tail.trim_start();

        let command = match verb {
            "mkdir" => Command::Mkdir(required(verb, arg)?),
            "touch" => Command::Touch {
                name: required(verb, arg)?,
                content: (!content.is_empty()).then(|| content.to_string()),
            },
            "write" => {
                let name = required(verb, arg)?;
                Command::Write {
                    name,
                    content: required(verb, content)?,
                }
            }
            "cat" => Command::Cat(required(verb, arg)?),
            "rm" => Command::Rm(required(verb, arg)?),
            "rmdir" => Command::Rmdir(required(verb, arg)?),
            "cd" => Command::Cd(required(verb, arg)?),
            "ls" => Command::Ls,
            "pwd" => Command::Pwd,
            "find" => Command::Find(required(verb, arg)?),
            "printall" => Command::PrintAll,
            "save" => Command::Save(PathBuf::from(required(verb, arg)?)),
            "load" => Command::Load(PathBuf::from(required(verb, arg)?)),
            "help" => Command::Help,
            "exit" => Command::Exit,
            other => return Err(ParseError::Unknown(other.to_string())),
        };
        Ok(Some(command))
    }
}

fn required(verb: &str, arg: &str) -> Result<String, ParseError> {
    if arg.is_empty() {
        let usage = USAGE
            .iter()
            .find(|(name, _)| *name == verb)
            .map_or("help", |(_, usage)| *usage);
        return Err(ParseError::MissingArgument {
            verb: verb.to_string(),
            usage,
        });
    }
    Ok(arg.to_string())
}

/// Splits off the first whitespace-delimited word; the remainder keeps its inner spacing.
fn split_word(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.find(char::is_whitespace) {
        Some(pos) => s.split_at(pos),
        None => (s, ""),
    }
}
