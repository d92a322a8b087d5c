use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use explorer::text::render_rows;
use explorer::{RecordingHost, SublayerExplorer, ToggleOutcome};
use sublayers::{SublayerError, SublayerId, SublayerTree, TreeOptions};
use tracing::info;

/// Environment variable enabling load-time aggregation when the CLI flag is absent.
pub const AGGREGATE_ENV: &str = "ATLAS_AGGREGATE";

#[derive(Debug)]
pub enum CommandError {
    Io { path: PathBuf, source: std::io::Error },
    Sublayers(SublayerError),
    UnknownId(SublayerId),
    Json(serde_json::Error),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Io { path, source } => write!(f, "{}: {source}", path.display()),
            CommandError::Sublayers(err) => write!(f, "{err}"),
            CommandError::UnknownId(id) => write!(f, "no sublayer with id {id}"),
            CommandError::Json(err) => write!(f, "json: {err}"),
        }
    }
}

impl std::error::Error for CommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CommandError::Io { source, .. } => Some(source),
            CommandError::Sublayers(err) => Some(err),
            CommandError::Json(err) => Some(err),
            CommandError::UnknownId(_) => None,
        }
    }
}

impl From<SublayerError> for CommandError {
    fn from(err: SublayerError) -> Self {
        CommandError::Sublayers(err)
    }
}

impl From<serde_json::Error> for CommandError {
    fn from(err: serde_json::Error) -> Self {
        CommandError::Json(err)
    }
}

/// `1`, `true`, `yes` and `on` (any case) turn the flag on.
pub fn parse_env_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// The CLI flag wins; otherwise the environment value decides.
pub fn resolve_aggregate(flag: bool, env_value: Option<&str>) -> bool {
    flag || env_value.is_some_and(parse_env_flag)
}

/// [`resolve_aggregate`] against the process environment's [`AGGREGATE_ENV`].
pub fn aggregate_enabled(flag: bool) -> bool {
    let env_value = std::env::var(AGGREGATE_ENV).ok();
    resolve_aggregate(flag, env_value.as_deref())
}

pub fn load_tree(path: &Path, options: TreeOptions) -> Result<SublayerTree, CommandError> {
    let payload = fs::read_to_string(path).map_err(|source| CommandError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let tree = SublayerTree::from_json(&payload, options)?;
    info!(
        path = %path.display(),
        nodes = tree.len(),
        "loaded sublayer metadata"
    );
    Ok(tree)
}

/// Writes the tree's current state back out as sublayer metadata.
pub fn export_tree(tree: &SublayerTree, path: &Path) -> Result<(), CommandError> {
    let payload = serde_json::to_string_pretty(&tree.to_info(tree.root()))?;
    fs::write(path, payload).map_err(|source| CommandError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), "exported sublayer metadata");
    Ok(())
}

pub fn cmd_tree(tree: SublayerTree, json: bool) -> Result<String, CommandError> {
    let explorer = SublayerExplorer::new(tree);
    let rows = explorer.rows();
    if json {
        let mut out = serde_json::to_string_pretty(&rows)?;
        out.push('\n');
        Ok(out)
    } else {
        Ok(render_rows(&rows))
    }
}

pub fn cmd_leaves(tree: &SublayerTree) -> String {
    let mut out = String::new();
    for leaf in tree.leaves(tree.root()) {
        let node = tree.node(leaf);
        let visibility = match node.visibility() {
            Some(true) => "visible",
            Some(false) => "hidden",
            None => "unset",
        };
        out.push_str(&format!("{}\t{}\t{}\n", node.id(), visibility, node.name()));
    }
    out
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToggleRequest {
    /// Rows whose checkbox is clicked, in order.
    pub toggle: Vec<SublayerId>,
    /// Rows whose expand icon is clicked before any toggle.
    pub expand: Vec<SublayerId>,
}

/// Replays row clicks through the explorer and reports every sync
/// notification followed by the final rows.
pub fn cmd_toggle(
    tree: SublayerTree,
    request: &ToggleRequest,
) -> Result<(SublayerTree, String), CommandError> {
    let mut explorer = SublayerExplorer::new(tree);
    let mut host = RecordingHost::new();
    let mut out = String::new();

    explorer.open(&mut host);
    for id in &request.expand {
        explorer
            .toggle_expanded_by_id(*id)
            .ok_or(CommandError::UnknownId(*id))?;
    }

    for id in &request.toggle {
        let outcome = explorer
            .toggle_visibility_by_id(*id, &mut host)
            .ok_or(CommandError::UnknownId(*id))?;
        out.push_str(&describe_toggle(*id, &outcome));
    }
    explorer.close(&mut host);

    out.push('\n');
    out.push_str(&render_rows(&explorer.rows()));
    Ok((explorer.into_tree(), out))
}

fn describe_toggle(id: SublayerId, outcome: &ToggleOutcome) -> String {
    let mut out = format!("toggle {id} -> {:?}\n", outcome.state);
    for (leaf, visible) in &outcome.synced {
        out.push_str(&format!("  sync {leaf} visible={visible}\n"));
    }
    out
}
