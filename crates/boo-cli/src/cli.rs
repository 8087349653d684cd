use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "boo", about = "Snapshot and restore a working tree", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create a repository in the current directory
    Init(InitArgs),
    /// Record a snapshot of the working tree
    Commit(CommitArgs),
    /// Restore the working tree to a snapshot
    Reset(ResetArgs),
    /// List commits, oldest first
    Log,
    /// Show changes since head
    Status,
}

#[derive(Args)]
pub struct InitArgs {
    /// Use the legacy 64-bit fingerprint instead of BLAKE3
    #[arg(long)]
    pub legacy: bool,
}

#[derive(Args)]
pub struct CommitArgs {
    #[arg(short, long)]
    pub message: String,
}

#[derive(Args)]
pub struct ResetArgs {
    /// Commit id or unique prefix
    pub id: String,
    /// Discard uncommitted changes
    #[arg(short, long)]
    pub force: bool,
}
