use anyhow::Context;
use clap::Parser as _;
use tracing::debug;
use vfs_tree::{Shell, TreeFS, snapshot};

use crate::cli::Cli;

mod cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_tracing(&cli);
    debug!("Parsed CLI arguments: {cli:?}");

    let fs = match &cli.load {
        Some(path) => {
            let restored = snapshot::load(path, cli.parse_mode())
                .with_context(|| format!("failed to restore {}", path.display()))?;
            restored.tree
        }
        None => TreeFS::new(),
    };

    let mut shell = Shell::new(fs)
        .with_load_mode(cli.parse_mode())
        .with_prompt(!cli.no_prompt);

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    shell
        .run(stdin.lock(), &mut stdout)
        .context("terminal I/O failed")?;

    debug!(
        dirs = shell.fs().dir_count(),
        files = shell.fs().file_count(),
        "session ended"
    );
    Ok(())
}

fn setup_tracing(cli: &Cli) {
    if let Some(level) = cli.log_level.to_tracing_level() {
        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_writer(std::io::stderr)
            .without_time()
            .compact()
            .init();
    }
}
