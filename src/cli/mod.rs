use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::model::Category;

pub mod commands;

#[derive(Parser, Debug)]
#[command(name = "land-registry")]
#[command(about = "Land-asset registry with queued, version-checked ledger writes")]
#[command(long_about = "Maintains land-asset records on a ledger world state. Deeds and incumbrances \
                       are submitted as pending entries and approved or rejected by registrars. Every \
                       change is queued as a version-checked write; start with 'land-registry seed'.")]
pub struct Cli {
    /// Caller identity (MSP id) issuing the command
    #[arg(long, global = true)]
    pub identity: Option<String>,

    /// Configuration file (defaults to ./land-registry.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a default configuration file
    Init {
        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },
    /// Load the sample assets onto the ledger
    Seed,
    /// Create a land-asset record from a JSON payload
    Create {
        /// Inline JSON or @path/to/payload.json
        payload: String,
    },
    /// Show one record
    Get { id: String },
    /// Overlay fields on an existing record
    Update {
        id: String,
        /// Inline JSON or @path/to/payload.json; must repeat the record ID
        payload: String,
    },
    /// Delete a record
    Delete { id: String },
    /// Submit a deed for registration
    SubmitDeed {
        id: String,
        /// Inline JSON or @path/to/payload.json
        payload: String,
    },
    /// Submit an incumbrance for registration
    SubmitIncumbrance {
        id: String,
        /// Inline JSON or @path/to/payload.json
        payload: String,
    },
    /// Approve a pending entry into the category's history
    Approve {
        id: String,
        /// deed or incumbrance
        category: Category,
        /// Position in the pending list, or the entry id
        #[arg(allow_hyphen_values = true)]
        selector: String,
    },
    /// Reject a pending entry
    Reject {
        id: String,
        /// deed or incumbrance
        category: Category,
        /// Position in the pending list, or the entry id
        #[arg(allow_hyphen_values = true)]
        selector: String,
    },
    /// Page through all records
    List {
        #[arg(long, allow_hyphen_values = true)]
        limit: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        offset: Option<String>,
    },
    /// Filter records by reference number and address substrings
    Find {
        /// Substring of the property reference number
        #[arg(long)]
        reference: Option<String>,
        /// Substring of the English or Chinese address
        #[arg(long)]
        address: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        limit: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        offset: Option<String>,
    },
    /// Counts by status and records with pending entries
    Summary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn negative_selector_reaches_the_workflow() {
        let cli = Cli::try_parse_from(["land-registry", "approve", "asset1", "deed", "-1"]).unwrap();
        match cli.command {
            Some(Commands::Approve { selector, category, .. }) => {
                assert_eq!(selector, "-1");
                assert_eq!(category, Category::Deed);
            }
            other => panic!("unexpected parse: {other:?}"),
        }
    }

    #[test]
    fn unknown_category_is_a_usage_error() {
        assert!(Cli::try_parse_from(["land-registry", "approve", "asset1", "lease", "0"]).is_err());
    }
}
