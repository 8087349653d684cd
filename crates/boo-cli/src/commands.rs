use std::path::Path;

use boo_sdk::{ChangeKind, RepoConfig, SnapshotManager};
use colored::Colorize;
use serde::Serialize;
use tracing::debug;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let format = cli.format;
    match cli.command {
        Command::Init(args) => cmd_init(args, format),
        Command::Commit(args) => cmd_commit(args, format),
        Command::Reset(args) => cmd_reset(args, format),
        Command::Log => cmd_log(format),
        Command::Status => cmd_status(format),
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_init(args: InitArgs, format: OutputFormat) -> anyhow::Result<()> {
    let config = if args.legacy {
        RepoConfig::legacy()
    } else {
        RepoConfig::default()
    };
    let cwd = std::env::current_dir()?;
    let boo = SnapshotManager::initialize_at(&cwd, config)?;
    let root = boo.store().root();
    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "root": root,
            "fingerprint": boo.store().algorithm(),
        })),
        OutputFormat::Text => {
            println!(
                "{} Initialized boo repository in {}",
                "✓".green().bold(),
                root.display().to_string().bold()
            );
            println!("  Fingerprint: {}", boo.store().algorithm().to_string().cyan());
            Ok(())
        }
    }
}

fn cmd_commit(args: CommitArgs, format: OutputFormat) -> anyhow::Result<()> {
    let boo = SnapshotManager::locate()?;
    let receipt = boo.commit(&args.message)?;
    match format {
        OutputFormat::Json => print_json(&receipt),
        OutputFormat::Text => {
            println!(
                "{} Committed {}",
                "✓".green().bold(),
                receipt.id.to_string().yellow()
            );
            println!("  Files: {}", receipt.files.len());
            Ok(())
        }
    }
}

fn cmd_reset(args: ResetArgs, format: OutputFormat) -> anyhow::Result<()> {
    let boo = SnapshotManager::locate()?;
    let id = boo.resolve(&args.id)?;
    debug!(input = %args.id, %id, "resolved commit");
    let report = boo.reset(&id, args.force)?;
    match format {
        OutputFormat::Json => print_json(&report),
        OutputFormat::Text => {
            for (path, kind) in report.changes.entries() {
                println!("  {}", describe(kind, relative(&boo, path)));
            }
            println!(
                "{} HEAD is now at {}",
                "✓".green().bold(),
                report.id.to_string().yellow()
            );
            Ok(())
        }
    }
}

fn cmd_log(format: OutputFormat) -> anyhow::Result<()> {
    let boo = SnapshotManager::locate()?;
    let entries = boo.log()?;
    match format {
        OutputFormat::Json => print_json(&entries),
        OutputFormat::Text => {
            if entries.is_empty() {
                println!("No commits.");
            }
            let head = boo.head()?;
            for entry in &entries {
                let marker = if Some(entry.id) == head {
                    format!(" ({})", "HEAD".green())
                } else {
                    String::new()
                };
                println!("{}{}", entry.id.to_string().yellow().bold(), marker);
                for line in entry.message.lines() {
                    println!("    {line}");
                }
                println!();
            }
            Ok(())
        }
    }
}

fn cmd_status(format: OutputFormat) -> anyhow::Result<()> {
    let boo = SnapshotManager::locate()?;
    let status = boo.status()?;
    match format {
        OutputFormat::Json => print_json(&status),
        OutputFormat::Text => {
            match &status.head {
                Some(id) => println!("HEAD at {}", id.to_string().yellow()),
                None => println!("No commits yet."),
            }
            if status.is_clean() {
                println!("\nWorking tree clean.");
                return Ok(());
            }
            println!();
            for (path, kind) in status.changes.entries() {
                println!("  {}", describe(kind, relative(&boo, path)));
            }
            Ok(())
        }
    }
}

fn relative(boo: &SnapshotManager, path: &Path) -> String {
    boo.store()
        .relative_path(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}

fn describe(kind: ChangeKind, path: String) -> String {
    match kind {
        ChangeKind::Added => format!("{} {}", "added:   ".green(), path),
        ChangeKind::Modified => format!("{} {}", "modified:".yellow(), path),
        ChangeKind::Removed => format!("{} {}", "removed: ".red(), path),
    }
}
