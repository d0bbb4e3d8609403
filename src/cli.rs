use std::path::{Path, PathBuf};

use clap::Parser;

use crate::paths;
use crate::workspace::{WorkspaceFolder, WorkspaceRoots};

#[derive(Parser)]
#[command(name = "watchnotify")]
#[command(version)]
#[command(about = "Watches workspace files and fires configurable status-bar and notification actions")]
#[command(
    long_about = "Watchnotify subscribes to create/change/delete events under a watched directory and runs the action list declared for each event class: updating named status indicators and emitting notification messages with ${...} placeholders expanded against the triggering file and the workspace roots."
)]
pub struct Cli {
    /// Workspace root folders, as PATH or NAME=PATH; order matters, the
    /// first one is the fallback root.
    #[arg(value_name = "ROOT", help = "Workspace roots (PATH or NAME=PATH)")]
    pub roots: Vec<String>,

    /// Notify configuration file (TOML, or JSON by extension)
    #[arg(short, long, value_name = "FILE", help = "Configuration file")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl Cli {
    pub fn workspace_roots(&self) -> WorkspaceRoots {
        WorkspaceRoots::new(self.roots.iter().map(|spec| parse_root(spec)).collect())
    }

    pub fn setup_logging(&self) {
        let level = if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        };

        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .init();
    }

    pub fn validate(&self) -> Result<(), String> {
        for spec in &self.roots {
            let folder = parse_root(spec);
            if !Path::new(&folder.root_path).is_dir() {
                return Err(format!(
                    "Workspace root is not a directory: {}",
                    folder.root_path
                ));
            }
        }

        if let Some(config) = &self.config {
            if !config.is_file() {
                return Err(format!("Config file does not exist: {}", config.display()));
            }
        }

        Ok(())
    }
}

/// `NAME=PATH` names the root explicitly; a bare path is named after its
/// last component.
fn parse_root(spec: &str) -> WorkspaceFolder {
    match spec.split_once('=') {
        Some((name, path)) => WorkspaceFolder::new(name, trim_root(path)),
        None => {
            let path = trim_root(spec);
            let name = paths::basename(path).filter(|n| !n.is_empty()).unwrap_or(path);
            WorkspaceFolder::new(name, path)
        }
    }
}

fn trim_root(path: &str) -> &str {
    if path.len() > 1 {
        path.trim_end_matches(paths::SEPARATOR)
    } else {
        path
    }
}
