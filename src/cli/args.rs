//! CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "shellgate")]
#[command(author, version, about = "WebSocket gateway to per-user docker containers", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: SubCommand,

    /// Output format as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true, env = "SHELLGATE_LOG_JSON")]
    pub log_json: bool,
}

#[derive(Subcommand)]
pub enum SubCommand {
    /// Start the WebSocket gateway
    Serve {
        /// Address to listen on
        #[arg(long, env = "SHELLGATE_BIND")]
        bind: Option<String>,

        /// Path to a TOML config file
        #[arg(long, short, env = "SHELLGATE_CONFIG")]
        config: Option<PathBuf>,

        /// Initial working directory of every session
        #[arg(long, env = "SHELLGATE_BASE_DIR")]
        base_dir: Option<PathBuf>,

        /// Docker-compatible CLI to invoke
        #[arg(long, env = "SHELLGATE_RUNTIME_BINARY")]
        runtime_binary: Option<String>,

        /// Build context for image builds
        #[arg(long, env = "SHELLGATE_BUILD_CONTEXT")]
        build_context: Option<PathBuf>,

        /// Shell that runs exec commands inside containers
        #[arg(long, env = "SHELLGATE_EXEC_SHELL")]
        exec_shell: Option<String>,

        /// Serve against an in-memory runtime instead of docker
        #[arg(long)]
        dry_run: bool,
    },

    /// List the supported OS profiles
    Profiles {
        /// Path to a TOML config file
        #[arg(long, short, env = "SHELLGATE_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Validate a request payload and show what it resolves to
    Check {
        /// Raw JSON request, as a client would send it
        payload: String,

        /// Path to a TOML config file
        #[arg(long, short, env = "SHELLGATE_CONFIG")]
        config: Option<PathBuf>,
    },
}
