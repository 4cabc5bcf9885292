//! sem-engine: entity-level semantic diff for source trees
//!
//! Given two revisions of a file tree, this library reports changes at the
//! level of named program entities (functions, classes, configuration
//! properties, heading sections, table rows) rather than text lines, telling
//! apart cosmetic rewrites from structural ones and recognising renames and
//! moves that a plain set diff would report as delete-plus-add.
//!
//! # Architecture
//!
//! - Parser plugins (tree-sitter code, JSON, YAML, TOML, CSV, Markdown and a
//!   line-chunking fallback) extract a uniform entity model from file bytes.
//! - A three-phase matcher (identity → structural hash → fuzzy similarity)
//!   pairs before/after entity sets into change records.
//! - The orchestrator walks a changed-file list from the git bridge and fans
//!   per-file work out across a worker pool.
//! - An embedded SQLite store persists entities and changes and powers
//!   entity-level blame, history, and ad-hoc queries.
//!
//! # Example
//!
//! ```ignore
//! use sem_engine::{compute_semantic_diff, create_default_registry, git};
//!
//! let scope = git::detect_scope(None)?;
//! let files = git::get_changed_files(&scope, None)?;
//! let registry = create_default_registry();
//! let result = compute_semantic_diff(&files, &registry, None, None);
//! for change in &result.changes {
//!     println!("{} {} ({})", change.change_type, change.entity_name, change.file_path);
//! }
//! ```

pub mod blame;
pub mod cancel;
pub mod cli;
pub mod differ;
pub mod error;
pub mod git;
pub mod hash;
pub mod history;
pub mod matching;
pub mod model;
pub mod plugins;
pub mod registry;
pub mod report;
pub mod store;

// Re-export the core surface
pub use blame::{blame_file, EntityBlame};
pub use cancel::CancelFlag;
pub use differ::{compute_semantic_diff, compute_semantic_diff_cancellable, DiffResult};
pub use error::{Result, SemError};
pub use git::{detect_scope, get_changed_files, DiffScope, FileChange, FileStatus};
pub use hash::{content_hash, short_hash};
pub use history::{entity_history, EntityHistory, HistoryEvent};
pub use matching::{default_similarity, match_entities, MatchResult};
pub use model::{build_entity_id, ChangeType, SemanticChange, SemanticEntity};
pub use plugins::create_default_registry;
pub use registry::{ParserPlugin, ParserRegistry};
pub use report::{DiffReport, DiffSummary};
pub use store::{ChangeFilter, SemDatabase, DEFAULT_SNAPSHOT};
