use sublayers::{NodeHandle, SublayerId, SublayerTree, TriState};
use tracing::debug;

use crate::host::ExplorerHost;
use crate::row::{ExplorerRow, project_rows};

/// Result of a row toggle, returned so hosts can react without re-rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub node: NodeHandle,
    /// Display state of the toggled row right after the toggle.
    pub state: TriState,
    /// Leaves whose visibility was confirmed, in the order they were synced.
    pub synced: Vec<(SublayerId, bool)>,
    /// Ancestors refreshed after the cascade, nearest first.
    pub refreshed: Vec<NodeHandle>,
}

/// Sublayer explorer panel for the active dataset.
///
/// The explorer owns the tree while the dataset is selected; rows are a pure
/// projection of it. Dropping the explorer (or calling [`Self::into_tree`])
/// releases the tree.
#[derive(Debug, Clone)]
pub struct SublayerExplorer {
    tree: SublayerTree,
    open: bool,
}

impl SublayerExplorer {
    pub fn new(tree: SublayerTree) -> Self {
        Self { tree, open: false }
    }

    pub fn tree(&self) -> &SublayerTree {
        &self.tree
    }

    pub fn into_tree(self) -> SublayerTree {
        self.tree
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open(&mut self, host: &mut impl ExplorerHost) {
        self.set_open(true, host);
    }

    pub fn close(&mut self, host: &mut impl ExplorerHost) {
        self.set_open(false, host);
    }

    fn set_open(&mut self, open: bool, host: &mut impl ExplorerHost) {
        if self.open == open {
            return;
        }
        self.open = open;
        debug!(open, "sublayer explorer toggled");
        host.explorer_toggled(open);
    }

    pub fn rows(&self) -> Vec<ExplorerRow> {
        project_rows(&self.tree)
    }

    /// Toggles the checkbox of `handle`.
    ///
    /// The new value is the negation of the row's stored aggregate, so a
    /// partial group turns fully visible. Every confirmed leaf is synced to the
    /// host before the ancestors are refreshed.
    pub fn toggle_visibility(
        &mut self,
        handle: NodeHandle,
        host: &mut impl ExplorerHost,
    ) -> ToggleOutcome {
        let target = !self.tree.node(handle).is_visible();
        let leaves = self.tree.set_visibility(handle, target);

        let synced: Vec<(SublayerId, bool)> = leaves
            .iter()
            .map(|leaf| (self.tree.node(*leaf).id(), target))
            .collect();
        for (id, visible) in &synced {
            host.sync_visibility(*id, *visible);
        }

        let refreshed = self.tree.notify_ancestors(handle);
        let state = self.tree.tri_state(handle);
        debug!(
            id = %self.tree.node(handle).id(),
            target,
            synced = synced.len(),
            refreshed = refreshed.len(),
            "sublayer row toggled"
        );

        ToggleOutcome {
            node: handle,
            state,
            synced,
            refreshed,
        }
    }

    pub fn toggle_visibility_by_id(
        &mut self,
        id: SublayerId,
        host: &mut impl ExplorerHost,
    ) -> Option<ToggleOutcome> {
        let handle = self.tree.find(id)?;
        Some(self.toggle_visibility(handle, host))
    }

    /// Flips the expand state of `handle`; visibility is not involved.
    /// Returns the new expand state. Leaves stay collapsed.
    pub fn toggle_expanded(&mut self, handle: NodeHandle) -> bool {
        if self.tree.is_leaf(handle) {
            return false;
        }
        self.tree.toggle_expanded(handle)
    }

    pub fn toggle_expanded_by_id(&mut self, id: SublayerId) -> Option<bool> {
        let handle = self.tree.find(id)?;
        Some(self.toggle_expanded(handle))
    }
}
