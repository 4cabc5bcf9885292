//! CLI argument definitions

use clap::{Parser, Subcommand, ValueEnum};

/// Entity-level semantic diff for git repositories
#[derive(Parser, Debug)]
#[command(name = "sem")]
#[command(about = "Reports changes as named entities (functions, classes, properties) instead of text lines")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output format (applies to all commands)
    #[arg(short, long, default_value = "terminal", value_enum, global = true)]
    pub format: OutputFormat,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the semantic diff of pending or historical changes
    Diff {
        /// Diff only staged changes
        #[arg(long)]
        staged: bool,

        /// Diff a specific commit against its parent
        #[arg(long)]
        commit: Option<String>,

        /// Start of a commit range
        #[arg(long, requires = "to")]
        from: Option<String>,

        /// End of a commit range
        #[arg(long, requires = "from")]
        to: Option<String>,
    },

    /// Show which commit last touched each entity of a file
    Blame {
        /// File to blame, relative to the repository root
        file: String,

        /// Number of commits to examine
        #[arg(long, default_value_t = crate::blame::DEFAULT_BLAME_DEPTH)]
        depth: usize,
    },

    /// Track one entity backward through commits
    History {
        /// Entity id (`<file>::<type>::<name>`) or bare entity name
        entity: String,

        /// Number of commits to examine
        #[arg(long, default_value_t = crate::history::DEFAULT_HISTORY_DEPTH)]
        depth: usize,
    },

    /// Extract entities from all tracked files into the store
    Snapshot {
        /// Snapshot name
        #[arg(long, default_value = "current")]
        name: String,
    },

    /// Run a read-only SQL query against the store
    Query {
        /// SELECT statement over the entities/changes/metadata tables
        sql: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Terminal,
    Json,
}
