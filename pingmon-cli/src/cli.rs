//! CLI argument parsing types using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use pingmon_core::ProbeKind;

/// `PingMon` command-line interface for watching host reachability
#[derive(Parser)]
#[command(name = "pingmon")]
#[command(author, version, about = "Host reachability monitor")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the settings file
    #[arg(short, long, global = true, env = "PINGMON_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Also append log lines to this file
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Disable colored output (any non-empty `NO_COLOR` other than a false
    /// value also disables it)
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Monitor a host until interrupted
    #[command(about = "Probe a host on a fixed interval and report outages")]
    Monitor {
        /// Host to monitor (IPv4 address or domain name); defaults to the
        /// configured host
        host: Option<String>,

        /// Seconds between probes
        #[arg(short, long, value_name = "SECS")]
        interval: Option<u64>,

        /// Stop after this many probes
        #[arg(short = 'n', long, value_name = "N")]
        count: Option<u64>,

        /// Probe mechanism
        #[arg(short, long, value_enum)]
        probe: Option<ProbeArg>,

        /// TCP port for the tcp probe
        #[arg(long)]
        port: Option<u16>,

        /// Print events as JSON lines
        #[arg(long)]
        json: bool,
    },

    /// Probe a host once
    #[command(about = "Send a single probe and report the result")]
    Check {
        /// Host to probe
        host: String,

        /// Probe timeout in milliseconds
        #[arg(short, long, value_name = "MS")]
        timeout: Option<u64>,

        /// Probe mechanism
        #[arg(short, long, value_enum)]
        probe: Option<ProbeArg>,

        /// TCP port for the tcp probe
        #[arg(long)]
        port: Option<u16>,
    },

    /// Check host syntax without touching the network
    #[command(about = "Validate a host name or IPv4 address")]
    Validate {
        /// Host to validate
        host: String,
    },

    /// Generate shell completions
    #[command(about = "Generate shell completion scripts")]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Generate a man page
    #[command(about = "Generate a man page and print it to stdout")]
    Manpage,
}

/// Probe mechanism selectable on the command line
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ProbeArg {
    /// ICMP echo through the system ping binary
    Ping,
    /// TCP connect to a port
    Tcp,
}

impl From<ProbeArg> for ProbeKind {
    fn from(arg: ProbeArg) -> Self {
        match arg {
            ProbeArg::Ping => Self::Ping,
            ProbeArg::Tcp => Self::Tcp,
        }
    }
}
