use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "orgreg",
    about = "orgreg: file-backed registry of organizations and their members",
    version
)]
pub struct Cli {
    /// Path to an orgreg TOML config file (`[store] data_dir = ...`)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Data directory; overrides the config file and ORGREG_DATA_DIR
    #[arg(long, global = true)]
    pub data_dir: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the companies/ and users/ partitions under the data directory
    Init {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage organizations (stored as companies)
    #[command(alias = "company")]
    Organization {
        #[command(subcommand)]
        command: RecordCommands,
    },

    /// Manage members (stored as users)
    #[command(alias = "user")]
    Member {
        #[command(subcommand)]
        command: RecordCommands,
    },
}

#[derive(Subcommand, Clone, Debug)]
pub enum RecordCommands {
    /// Create a record; the identifier is assigned by the store
    Create {
        /// JSON object, or `@path` to read it from a file
        #[arg(long)]
        payload: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one record
    Get {
        /// Record identifier
        id: u64,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List every record
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Replace a record with a complete payload
    Replace {
        /// Record identifier
        id: u64,

        /// JSON object, or `@path` to read it from a file
        #[arg(long)]
        payload: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Update fields the record already has
    Patch {
        /// Record identifier
        id: u64,

        /// JSON object, or `@path` to read it from a file
        #[arg(long)]
        payload: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a record (organizations take their members with them)
    Delete {
        /// Record identifier
        id: u64,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
