//! CLI argument parsing types using `clap`.

use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

/// `RouterWatch` command-line interface for polling a home router over SSH
#[derive(Parser)]
#[command(name = "routerwatch-cli")]
#[command(author, version, about = "RouterWatch command-line interface")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the configuration directory
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase output verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(flatten)]
    pub router: RouterArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Connection overrides applied on top of `routerwatch.toml`
#[derive(Args, Debug, Default, Clone)]
pub struct RouterArgs {
    /// Router hostname or IP address
    #[arg(short = 'H', long, global = true)]
    pub host: Option<String>,

    /// SSH port
    #[arg(short, long, global = true)]
    pub port: Option<u16>,

    /// Login name
    #[arg(short, long, global = true)]
    pub user: Option<String>,

    /// Login password (prompted for when missing and stdin is a terminal)
    #[arg(
        long,
        global = true,
        env = "ROUTERWATCH_PASSWORD",
        hide_env_values = true
    )]
    pub password: Option<String>,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Poll the router once and print the snapshot
    #[command(about = "Poll the router once and print system status")]
    Status {
        /// Output format
        #[arg(short, long, default_value = "table", value_enum)]
        format: OutputFormat,
    },

    /// Poll the router once and list connected devices
    #[command(about = "List devices in the router's ARP table")]
    Devices {
        /// Output format
        #[arg(short, long, default_value = "table", value_enum)]
        format: OutputFormat,
    },

    /// Poll the router once and list interface counters
    #[command(about = "List per-interface traffic counters")]
    Interfaces {
        /// Output format
        #[arg(short, long, default_value = "table", value_enum)]
        format: OutputFormat,
    },

    /// Poll on a schedule and print every result
    #[command(about = "Poll the router on a schedule until interrupted")]
    Watch {
        /// Seconds between polls (overrides the configured interval)
        #[arg(short, long)]
        interval: Option<u64>,

        /// Stop after this many results (at least 1)
        #[arg(short = 'n', long)]
        count: Option<NonZeroUsize>,

        /// Output format
        #[arg(short, long, default_value = "table", value_enum)]
        format: OutputFormat,
    },

    /// Reboot the router
    #[command(about = "Send the reboot command to the router")]
    Reboot {
        /// Confirm the reboot
        #[arg(long)]
        yes: bool,
    },

    /// Check that the router accepts a login
    #[command(about = "Test connectivity and credentials")]
    Test,

    /// Inspect or create the settings file
    #[command(subcommand, about = "Manage routerwatch.toml")]
    Config(ConfigCommands),

    /// Generate shell completions
    #[command(about = "Generate shell completions")]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Output format for poll results
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Display as formatted table
    #[default]
    Table,
    /// Output as JSON
    Json,
}

/// `config` subcommands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective settings
    #[command(about = "Print effective settings as TOML")]
    Show,

    /// Write a settings file with defaults and any overrides
    #[command(about = "Create routerwatch.toml")]
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the settings file location
    #[command(about = "Print the path of routerwatch.toml")]
    Path,
}
