//! sem CLI entry point

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use console::style;

use sem_engine::cli::{Cli, Commands, OutputFormat};
use sem_engine::{
    blame_file, compute_semantic_diff, create_default_registry, detect_scope, entity_history,
    get_changed_files, git, ChangeType, DiffReport, DiffScope, SemDatabase, SemError,
};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(output) => {
            if !output.is_empty() {
                println!("{output}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", style(format!("error: {e}")).red());
            ExitCode::FAILURE
        }
    }
}

fn run() -> sem_engine::Result<String> {
    let cli = Cli::parse();
    let cwd = std::env::current_dir()?;

    match cli.command {
        Some(Commands::Diff {
            staged,
            commit,
            from,
            to,
        }) => run_diff(&cwd, cli.format, staged, commit, from, to),
        None => run_diff(&cwd, cli.format, false, None, None, None),
        Some(Commands::Blame { file, depth }) => run_blame(&cwd, cli.format, &file, depth),
        Some(Commands::History { entity, depth }) => {
            run_history(&cwd, cli.format, &entity, depth)
        }
        Some(Commands::Snapshot { name }) => run_snapshot(&cwd, &name),
        Some(Commands::Query { sql }) => run_query(&cwd, &sql),
    }
}

fn run_diff(
    cwd: &Path,
    format: OutputFormat,
    staged: bool,
    commit: Option<String>,
    from: Option<String>,
    to: Option<String>,
) -> sem_engine::Result<String> {
    if !git::is_git_repo(Some(cwd)) {
        return Err(SemError::NotARepo);
    }
    // Changed-file paths are repo-root relative, so run everything from there
    let root = PathBuf::from(git::repo_root(Some(cwd))?);

    let scope = if staged {
        DiffScope::Staged
    } else if let Some(sha) = commit {
        DiffScope::Commit { sha }
    } else if let (Some(from), Some(to)) = (from, to) {
        DiffScope::Range { from, to }
    } else {
        detect_scope(Some(&root))?
    };

    let files = get_changed_files(&scope, Some(&root))?;

    // Historical scopes carry their commit metadata onto each change
    let (commit_sha, author) = match &scope {
        DiffScope::Commit { sha } => {
            let author =
                git::git_command_optional(&["log", "-1", "--format=%an", sha], Some(&root));
            (Some(sha.clone()), author)
        }
        _ => (None, None),
    };

    let registry = create_default_registry();
    let result = compute_semantic_diff(&files, &registry, commit_sha.as_deref(), author.as_deref());

    match format {
        OutputFormat::Json => Ok(DiffReport::new(&result).to_json()),
        OutputFormat::Terminal => Ok(render_diff_terminal(&result)),
    }
}

fn render_diff_terminal(result: &sem_engine::DiffResult) -> String {
    if result.changes.is_empty() {
        return format!("{}", style("No semantic changes.").dim());
    }

    let mut out = String::new();
    out.push_str(&format!(
        "{} {} change(s) across {} file(s)\n",
        style("sem:").bold(),
        result.total(),
        result.file_count
    ));

    for change in &result.changes {
        let label = match change.change_type {
            ChangeType::Added => style("added   ").green(),
            ChangeType::Deleted => style("deleted ").red(),
            ChangeType::Modified => style("modified").yellow(),
            ChangeType::Moved => style("moved   ").cyan(),
            ChangeType::Renamed => style("renamed ").cyan(),
        };
        let location = match change.old_file_path.as_deref() {
            Some(old) => format!("{} -> {}", old, change.file_path),
            None => change.file_path.clone(),
        };
        out.push_str(&format!(
            "  {}  {} {}  ({})\n",
            label,
            style(&change.entity_type).dim(),
            style(&change.entity_name).bold(),
            location
        ));
    }

    out.push_str(&format!(
        "\n  {} added, {} modified, {} deleted, {} moved, {} renamed",
        result.added_count,
        result.modified_count,
        result.deleted_count,
        result.moved_count,
        result.renamed_count
    ));
    out
}

fn run_blame(
    cwd: &Path,
    format: OutputFormat,
    file: &str,
    depth: usize,
) -> sem_engine::Result<String> {
    if !git::is_git_repo(Some(cwd)) {
        return Err(SemError::NotARepo);
    }
    let root = PathBuf::from(git::repo_root(Some(cwd))?);
    let registry = create_default_registry();
    let results = blame_file(&root, file, &registry, depth)?;

    if format == OutputFormat::Json {
        let rows: Vec<_> = results
            .iter()
            .map(|b| {
                serde_json::json!({
                    "entityId": b.entity_id,
                    "name": b.name,
                    "type": b.entity_type,
                    "lines": [b.start_line, b.end_line],
                    "commit": b.commit.as_ref().map(|c| c.short_sha.clone()),
                    "author": b.commit.as_ref().map(|c| c.author.clone()),
                    "date": b.commit.as_ref().map(|c| c.date.clone()),
                    "subject": b.commit.as_ref().map(|c| c.subject.clone()),
                })
            })
            .collect();
        return serde_json::to_string_pretty(&rows).map_err(|e| SemError::Query {
            message: e.to_string(),
        });
    }

    let mut out = format!("{}\n", style(file).bold());
    let name_width = results.iter().map(|r| r.name.len()).max().unwrap_or(8);
    let type_width = results
        .iter()
        .map(|r| r.entity_type.len())
        .max()
        .unwrap_or(8);
    for b in &results {
        let (sha, author, date) = match &b.commit {
            Some(c) => (c.short_sha.clone(), c.author.clone(), c.date.clone()),
            None => ("-".repeat(7), "(uncommitted)".to_string(), String::new()),
        };
        out.push_str(&format!(
            "  {:<type_width$}  {:<name_width$}  {}  {}  {}\n",
            style(&b.entity_type).dim(),
            style(&b.name).bold(),
            style(&sha).yellow(),
            style(&author).cyan(),
            style(&date).dim(),
        ));
    }
    Ok(out.trim_end().to_string())
}

fn run_history(
    cwd: &Path,
    format: OutputFormat,
    entity: &str,
    depth: usize,
) -> sem_engine::Result<String> {
    if !git::is_git_repo(Some(cwd)) {
        return Err(SemError::NotARepo);
    }
    let root = PathBuf::from(git::repo_root(Some(cwd))?);
    let registry = create_default_registry();
    let history = entity_history(&root, entity, &registry, depth)?;

    if format == OutputFormat::Json {
        let rows: Vec<_> = history
            .events
            .iter()
            .map(|e| {
                serde_json::json!({
                    "changeType": e.change_type.as_str(),
                    "commit": e.commit.short_sha,
                    "author": e.commit.author,
                    "date": e.commit.date,
                    "subject": e.commit.subject,
                })
            })
            .collect();
        let doc = serde_json::json!({
            "entityId": history.entity_id,
            "filePath": history.file_path,
            "events": rows,
        });
        return serde_json::to_string_pretty(&doc).map_err(|e| SemError::Query {
            message: e.to_string(),
        });
    }

    let mut out = format!("{}\n", style(&history.entity_id).bold());
    if history.events.is_empty() {
        out.push_str("  no recorded transitions in the examined window\n");
    }
    for event in &history.events {
        let label = match event.change_type {
            ChangeType::Added => style("added   ").green(),
            ChangeType::Deleted => style("deleted ").red(),
            _ => style("modified").yellow(),
        };
        out.push_str(&format!(
            "  {}  {}  {}  {}  {}\n",
            label,
            style(&event.commit.short_sha).yellow(),
            style(&event.commit.author).cyan(),
            style(&event.commit.date).dim(),
            event.commit.subject,
        ));
    }
    Ok(out.trim_end().to_string())
}

fn run_snapshot(cwd: &Path, name: &str) -> sem_engine::Result<String> {
    if !git::is_git_repo(Some(cwd)) {
        return Err(SemError::NotARepo);
    }
    let root = PathBuf::from(git::repo_root(Some(cwd))?);
    let registry = create_default_registry();

    let listing = git::git_command(&["ls-files"], Some(&root))?;
    let mut entities = Vec::new();
    for file in listing.lines() {
        if file.is_empty() || file.starts_with(".sem/") {
            continue;
        }
        let Ok(bytes) = fs::read(root.join(file)) else {
            continue;
        };
        let content = String::from_utf8_lossy(&bytes);
        if let Some(plugin) = registry.get_plugin(file) {
            entities.extend(plugin.extract_entities(&content, file));
        }
    }

    let mut db = SemDatabase::open(&root.join(".sem").join("sem.db"))?;
    let head = git::head_sha(Some(&root)).ok();
    db.clear_snapshot(name)?;
    let written = db.upsert_entities(&entities, name, head.as_deref())?;
    if let Some(sha) = head {
        db.set_meta("last_snapshot_sha", &sha)?;
    }

    Ok(format!(
        "Snapshot '{name}': {written} entities from {} tracked files",
        listing.lines().filter(|l| !l.is_empty()).count()
    ))
}

fn run_query(cwd: &Path, sql: &str) -> sem_engine::Result<String> {
    if !git::is_git_repo(Some(cwd)) {
        return Err(SemError::NotARepo);
    }
    let root = PathBuf::from(git::repo_root(Some(cwd))?);
    let db = SemDatabase::open(&root.join(".sem").join("sem.db"))?;
    let rows = db.query(sql)?;
    serde_json::to_string_pretty(&rows).map_err(|e| SemError::Query {
        message: e.to_string(),
    })
}
