use crate::export::ExportFormat;
use clap::{ArgAction, Parser, Subcommand};

/// Command-line interface for sheetcrm
/// Spreadsheet-style record store with identity upserts and an audit trail
#[derive(Parser)]
#[command(
    name = "sheetcrm",
    version = env!("CARGO_PKG_VERSION"),
    about = "Keep CRM-style records in a tabular store: identity upserts, satellite mirroring and an audit trail",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    /// Increase diagnostic output (-v info, -vv debug, -vvv trace)
    #[arg(global = true, short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the configuration and provision every known table
    Init,

    /// Show the effective configuration
    Config {
        #[arg(long = "print", help = "Print the current configuration")]
        print_config: bool,
    },

    /// Update the record matching NAME+PHONE, or insert a new one
    Upsert {
        #[arg(long, help = "Target table (e.g. CRM, Delivery)")]
        table: String,

        #[arg(long, help = "Customer name")]
        name: String,

        #[arg(long, help = "Contact number, any formatting")]
        phone: String,

        /// Extra column values, repeatable
        #[arg(
            long = "field",
            value_name = "COLUMN=VALUE",
            help = "Column value to write, e.g. --field \"Lead Status=won\""
        )]
        fields: Vec<String>,

        #[arg(long, help = "Also copy a new record into the primary table")]
        mirror: bool,
    },

    /// Print every row of a table
    Show {
        #[arg(long)]
        table: String,
    },

    /// Find rows by name fragment or phone digits
    Search {
        #[arg(long)]
        table: String,

        query: String,
    },

    /// Print the audit trail, newest first
    History {
        #[arg(long, short = 'n', help = "Show at most N entries")]
        limit: Option<usize>,
    },

    /// Manage application users
    Users {
        #[command(subcommand)]
        action: UsersAction,
    },

    /// Export a table to a file
    Export {
        #[arg(long)]
        table: String,

        #[arg(long, value_enum, default_value = "csv")]
        format: ExportFormat,

        #[arg(long, value_name = "FILE")]
        file: String,

        #[arg(long, short = 'f')]
        force: bool,
    },
}

#[derive(Subcommand)]
pub enum UsersAction {
    /// List users
    List,

    /// Create or update a user
    Add {
        #[arg(long)]
        username: String,

        #[arg(long = "hash", help = "Pre-computed password hash, stored as-is")]
        password_hash: String,

        #[arg(long = "full-name")]
        full_name: String,

        #[arg(long, help = "Viewer, Editor or Admin")]
        role: String,

        #[arg(long, default_value = "Y", help = "Y/N")]
        active: String,
    },

    /// Mark a user inactive
    Deactivate { username: String },
}
