use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use vfs_tree::ParseMode;

/// Interactive in-memory directory tree.
#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub struct Cli {
    /// Snapshot to restore before the first prompt.
    #[clap(long)]
    pub load: Option<PathBuf>,

    /// Reject a snapshot at its first malformed line instead of skipping such lines.
    #[clap(long)]
    pub strict: bool,

    /// Do not print the `>>> ` prompt (useful when piping a script).
    #[clap(long)]
    pub no_prompt: bool,

    #[clap(long, short, default_value = "warn", value_enum)]
    pub log_level: LogLevel,
}

impl Cli {
    pub fn parse_mode(&self) -> ParseMode {
        if self.strict {
            ParseMode::Strict
        } else {
            ParseMode::BestEffort
        }
    }
}

#[derive(Debug, Clone, ValueEnum, Default)]
pub enum LogLevel {
    Debug,
    Info,
    #[default]
    Warn,
    Error,
    Silent,
}

impl LogLevel {
    pub fn to_tracing_level(&self) -> Option<tracing::Level> {
        match self {
            LogLevel::Debug => Some(tracing::Level::DEBUG),
            LogLevel::Info => Some(tracing::Level::INFO),
            LogLevel::Warn => Some(tracing::Level::WARN),
            LogLevel::Error => Some(tracing::Level::ERROR),
            LogLevel::Silent => None,
        }
    }
}
