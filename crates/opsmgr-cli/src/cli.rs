//! CLI argument definitions.

use clap::{Parser, Subcommand};

/// Operations Manager exploration tool.
#[derive(Parser, Debug)]
#[command(name = "opsmgr")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Backend base address, e.g. https://scom.example.com
    #[arg(long, env = "OPSMGR_URL", global = true, default_value = "")]
    pub url: String,

    /// Login username
    #[arg(long, env = "OPSMGR_USERNAME", global = true, default_value = "")]
    pub username: String,

    /// Login secret
    #[arg(long, env = "OPSMGR_PASSWORD", global = true, default_value = "")]
    pub password: String,

    /// Skip TLS certificate verification
    #[arg(long, global = true)]
    pub insecure: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Verify the configured credentials against the backend
    Health,

    /// List classes by display-name filter
    Classes {
        /// Display-name filter, matched with LIKE
        #[arg(default_value = "")]
        filter: String,
    },

    /// List objects by class name or explicit ids
    Objects {
        /// Class name to list instances of
        #[arg(long, conflicts_with = "ids")]
        class: Option<String>,

        /// Explicit object ids
        #[arg(long, num_args = 1..)]
        ids: Vec<String>,
    },

    /// List performance counters available on objects
    Counters {
        /// Object ids to inspect
        #[arg(long, num_args = 1.., required = true)]
        ids: Vec<String>,
    },

    /// List all groups
    Groups,

    /// List the members of a group, by group and class id
    GroupMembers {
        #[arg(long)]
        group: String,
        #[arg(long)]
        class: String,
    },

    /// Fetch alerts matching a criteria expression
    Alerts {
        /// Criteria, defaults to open critical alerts
        #[arg(default_value = "")]
        criteria: String,
    },

    /// Run a query batch from a JSON file
    Query {
        /// Path to a JSON array of query requests
        file: std::path::PathBuf,
    },
}
