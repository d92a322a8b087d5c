use serde::Serialize;
use sublayers::{LayerType, NodeHandle, SublayerId, SublayerTree, TriState};

/// Expand affordance shown in front of a row.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Expander {
    /// Leaf rows have nothing to expand.
    None,
    Collapsed,
    Expanded,
}

/// One rendered line of the explorer. Rebuilt from the tree on every render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExplorerRow {
    #[serde(skip)]
    pub handle: NodeHandle,
    pub id: SublayerId,
    pub name: String,
    #[serde(rename = "layerType")]
    pub layer_type: LayerType,
    pub depth: usize,
    pub state: TriState,
    pub expander: Expander,
}

/// Projects the tree into rows: pre-order, skipping the descendants of any
/// collapsed group.
pub fn project_rows(tree: &SublayerTree) -> Vec<ExplorerRow> {
    let mut rows = Vec::with_capacity(tree.len());
    let mut stack = vec![tree.root()];

    while let Some(handle) = stack.pop() {
        let node = tree.node(handle);
        let expander = if node.is_leaf() {
            Expander::None
        } else if node.expanded() {
            Expander::Expanded
        } else {
            Expander::Collapsed
        };

        rows.push(ExplorerRow {
            handle,
            id: node.id(),
            name: node.name().to_string(),
            layer_type: node.layer_type().clone(),
            depth: node.depth(),
            state: tree.tri_state(handle),
            expander,
        });

        if expander == Expander::Expanded {
            stack.extend(node.children().iter().rev().copied());
        }
    }

    rows
}
