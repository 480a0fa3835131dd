//! CLI parse: clap types for EnderChest. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// EnderChest CLI - share Minecraft assets between instances with symlinks
#[derive(Parser)]
#[command(name = "enderchest")]
#[command(about = "Link shulker box contents into Minecraft instances and sync the chest")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Minecraft root directory (the folder containing the EnderChest)
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (default: off)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Link shulker box contents into instances
    Place {
        /// Report what would change without touching the filesystem
        #[arg(long)]
        dry_run: bool,
        /// Conflict policy (prompt, skip, fail, overwrite); defaults to the chest setting
        #[arg(long)]
        conflict: Option<String>,
        /// Use absolute link targets
        #[arg(long)]
        absolute: bool,
        /// Do not remove broken links from instances
        #[arg(short = 'k', long)]
        keep_broken_links: bool,
        /// Only place links for this instance (repeatable)
        #[arg(long)]
        instance: Vec<String>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Replace links into the EnderChest with real copies
    Break {
        /// Report what would change without touching the filesystem
        #[arg(long)]
        dry_run: bool,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Show instances, shulker boxes, and resolved link plans
    Inventory {
        /// Show the boxes and the resolved plan for this instance
        #[arg(long, conflicts_with = "shulker_box")]
        instance: Option<String>,
        /// Show the instances this box applies to
        #[arg(long = "box")]
        shulker_box: Option<String>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Push the EnderChest to every remote
    Push {
        /// Report what would change without transferring anything
        #[arg(long)]
        dry_run: bool,
        /// Skip the preview and confirmation
        #[arg(long)]
        yes: bool,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Pull the EnderChest from the first reachable remote
    Pull {
        /// Report what would change without transferring anything
        #[arg(long)]
        dry_run: bool,
        /// Skip the preview and confirmation
        #[arg(long)]
        yes: bool,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}
