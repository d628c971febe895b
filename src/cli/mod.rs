//! Command-line interface, parsed with clap.

mod commands;

use clap::{Parser, Subcommand};

/// Podseek - podcast discovery backed by the iTunes catalog
#[derive(Parser)]
#[command(name = "podseek")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API until Ctrl+C
    #[command(alias = "daemon", alias = "-d", alias = "--daemon")]
    Serve,

    /// Search the catalog and log the search
    #[command(alias = "s")]
    Search {
        /// Search term, words are joined with spaces
        #[arg(required = true)]
        term: Vec<String>,
    },

    /// Show the most recent searches
    #[command(alias = "history", alias = "h")]
    Recent,

    /// Show one podcast by catalog collection id
    #[command(alias = "p")]
    Podcast {
        /// iTunes collection id
        collection_id: i64,
    },

    /// Show podcasts in random order
    Random {
        /// Term to draw from; a generic term is picked when omitted
        #[arg(long)]
        term: Option<String>,
        /// Number of podcasts to show
        #[arg(long, default_value_t = 8)]
        limit: usize,
    },

    /// Create default config file
    #[command(alias = "--init")]
    Init,
}

pub use commands::*;
