use std::collections::HashMap;

use foundation::arena::Arena;
use foundation::handles::Handle;
use tracing::{debug, trace};

use crate::error::SublayerError;
use crate::info::{LayerType, SublayerId, SublayerInfo};
use crate::tri_state::TriState;

pub type NodeHandle = Handle;

/// Construction options for a [`SublayerTree`].
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct TreeOptions {
    /// Derive every group's visibility from its leaves before first use.
    pub aggregate_on_load: bool,
    /// Ignore the advisory `expanded` flags and open every group.
    pub expand_all: bool,
}

#[derive(Debug, Clone)]
pub struct SublayerNode {
    id: SublayerId,
    name: String,
    layer_type: LayerType,
    visibility: Option<bool>,
    expanded: bool,
    depth: usize,
    parent: Option<NodeHandle>,
    children: Vec<NodeHandle>,
    // Cached display state, plus the number of children whose state is not
    // `NotVisible`. Kept in sync by `SublayerTree::refresh_state`.
    state: TriState,
    shown_children: usize,
}

impl SublayerNode {
    pub fn id(&self) -> SublayerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn layer_type(&self) -> &LayerType {
        &self.layer_type
    }

    pub fn visibility(&self) -> Option<bool> {
        self.visibility
    }

    /// `true` only for an explicit `visibility == Some(true)`.
    pub fn is_visible(&self) -> bool {
        self.visibility == Some(true)
    }

    pub fn expanded(&self) -> bool {
        self.expanded
    }

    /// Distance from the root; the root is at depth 0.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    fn resolve_cached(&self) -> TriState {
        if self.is_leaf() {
            TriState::of_leaf(self.visibility)
        } else {
            TriState::of_group(self.visibility, self.shown_children > 0)
        }
    }
}

/// Sublayer visibility tree for one loaded dataset.
///
/// Nodes live in an arena; parents own their children through handle lists and
/// each node keeps a lookup-only back-reference to its parent. The shape is
/// fixed at construction, only visibility and expand state change afterwards.
///
/// Every method taking a [`NodeHandle`] expects a handle issued by this tree and
/// panics otherwise.
#[derive(Debug, Clone)]
pub struct SublayerTree {
    nodes: Arena<SublayerNode>,
    root: NodeHandle,
    by_id: HashMap<SublayerId, NodeHandle>,
}

impl SublayerTree {
    /// Builds a tree from raw metadata, children first.
    ///
    /// With `compute_initial_aggregation`, every group's visibility is derived
    /// from its leaves (see [`Self::set_all_tree_branch_visibility`]) before the
    /// tree is returned.
    pub fn wrap(
        raw: &SublayerInfo,
        compute_initial_aggregation: bool,
    ) -> Result<Self, SublayerError> {
        raw.validate()?;

        let mut nodes = Arena::with_capacity(raw.node_count());
        let mut by_id = HashMap::new();
        let root = build_node(&mut nodes, &mut by_id, raw, 0);

        let mut tree = Self { nodes, root, by_id };
        tree.rebuild_states();
        if compute_initial_aggregation {
            tree.set_all_tree_branch_visibility(root);
        }

        debug!(
            root = %raw.id,
            nodes = tree.len(),
            leaves = tree.leaf_count(),
            aggregated = compute_initial_aggregation,
            "wrapped sublayer tree"
        );
        Ok(tree)
    }

    pub fn with_options(raw: &SublayerInfo, options: TreeOptions) -> Result<Self, SublayerError> {
        let mut tree = Self::wrap(raw, options.aggregate_on_load)?;
        if options.expand_all {
            tree.set_expanded_all(true);
        }
        Ok(tree)
    }

    pub fn from_json(payload: &str, options: TreeOptions) -> Result<Self, SublayerError> {
        let raw = SublayerInfo::from_json(payload)?;
        Self::with_options(&raw, options)
    }

    pub fn root(&self) -> NodeHandle {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, handle: NodeHandle) -> &SublayerNode {
        &self.nodes[handle]
    }

    pub fn get(&self, handle: NodeHandle) -> Option<&SublayerNode> {
        self.nodes.get(handle)
    }

    pub fn find(&self, id: SublayerId) -> Option<NodeHandle> {
        self.by_id.get(&id).copied()
    }

    pub fn is_leaf(&self, handle: NodeHandle) -> bool {
        self.nodes[handle].is_leaf()
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|(_, n)| n.is_leaf()).count()
    }

    /// Pre-order (depth-first, left-to-right) walk of the subtree at `handle`.
    pub fn walk(&self, handle: NodeHandle) -> Vec<NodeHandle> {
        let mut out = Vec::new();
        let mut stack = vec![handle];
        while let Some(h) = stack.pop() {
            out.push(h);
            stack.extend(self.nodes[h].children.iter().rev().copied());
        }
        out
    }

    /// Leaves of the subtree at `handle`, depth-first, left-to-right.
    pub fn leaves(&self, handle: NodeHandle) -> Vec<NodeHandle> {
        self.walk(handle)
            .into_iter()
            .filter(|h| self.nodes[*h].is_leaf())
            .collect()
    }

    /// Ancestors of `handle`, nearest first, root last.
    pub fn ancestors(&self, handle: NodeHandle) -> Vec<NodeHandle> {
        let mut out = Vec::new();
        let mut cur = self.nodes[handle].parent;
        while let Some(h) = cur {
            out.push(h);
            cur = self.nodes[h].parent;
        }
        out
    }

    /// Cascades `target` down the subtree at `handle`.
    ///
    /// Every node in the subtree ends with `visibility == Some(target)`. Returns
    /// every leaf of the subtree in depth-first, left-to-right order; these are
    /// the leaves whose state the renderer must be told about.
    ///
    /// Ancestors are not touched; call [`Self::notify_ancestors`] (or
    /// [`Self::on_child_visibility_change`] per ancestor) afterwards.
    pub fn set_visibility(&mut self, handle: NodeHandle, target: bool) -> Vec<NodeHandle> {
        let mut leaves = Vec::new();
        self.cascade(handle, target, &mut leaves);
        debug!(
            id = %self.nodes[handle].id,
            target,
            leaves = leaves.len(),
            "cascaded sublayer visibility"
        );
        leaves
    }

    fn cascade(&mut self, handle: NodeHandle, target: bool, leaves: &mut Vec<NodeHandle>) {
        self.write_visibility(handle, Some(target));
        if self.nodes[handle].is_leaf() {
            leaves.push(handle);
            return;
        }
        for idx in 0..self.nodes[handle].children.len() {
            let child = self.nodes[handle].children[idx];
            self.cascade(child, target, leaves);
        }
    }

    /// Recomputes this node's visibility from its immediate children only.
    ///
    /// Assumes every child group already holds its own aggregated value. A leaf
    /// is ground truth and is left unchanged.
    pub fn on_child_visibility_change(&mut self, handle: NodeHandle) {
        let node = &self.nodes[handle];
        if node.is_leaf() {
            return;
        }
        let all_visible = node.children.iter().all(|c| self.nodes[*c].is_visible());
        trace!(id = %node.id, all_visible, "aggregated sublayer group");
        self.write_visibility(handle, Some(all_visible));
    }

    /// Refreshes every ancestor of `handle` one level at a time, nearest first
    /// and the root last. Returns the refreshed ancestors in that order.
    pub fn notify_ancestors(&mut self, handle: NodeHandle) -> Vec<NodeHandle> {
        let ancestors = self.ancestors(handle);
        for ancestor in &ancestors {
            self.on_child_visibility_change(*ancestor);
        }
        ancestors
    }

    /// Recomputes every group in the subtree at `handle` from its leaves,
    /// post-order. Leaves are not modified; an unset leaf counts as hidden.
    pub fn set_all_tree_branch_visibility(&mut self, handle: NodeHandle) {
        if self.nodes[handle].is_leaf() {
            return;
        }
        for idx in 0..self.nodes[handle].children.len() {
            let child = self.nodes[handle].children[idx];
            self.set_all_tree_branch_visibility(child);
        }
        let node = &self.nodes[handle];
        let all_visible = node.children.iter().all(|c| self.nodes[*c].is_visible());
        self.write_visibility(handle, Some(all_visible));
    }

    /// Display state of `handle`. O(1): served from the per-node cache.
    pub fn tri_state(&self, handle: NodeHandle) -> TriState {
        self.nodes[handle].state
    }

    /// Display state of `handle` resolved by walking the children instead of
    /// reading the cache. Always agrees with [`Self::tri_state`].
    pub fn scan_tri_state(&self, handle: NodeHandle) -> TriState {
        let node = &self.nodes[handle];
        if node.is_leaf() {
            return TriState::of_leaf(node.visibility);
        }
        if node.is_visible() {
            return TriState::Visible;
        }
        let any_shown = node
            .children
            .iter()
            .any(|c| !self.scan_tri_state(*c).is_hidden());
        TriState::of_group(node.visibility, any_shown)
    }

    pub fn set_expanded(&mut self, handle: NodeHandle, expanded: bool) {
        self.nodes[handle].expanded = expanded;
    }

    /// Flips the expand flag of `handle` and returns the new value.
    pub fn toggle_expanded(&mut self, handle: NodeHandle) -> bool {
        let node = &mut self.nodes[handle];
        node.expanded = !node.expanded;
        node.expanded
    }

    pub fn set_expanded_all(&mut self, expanded: bool) {
        for h in self.walk(self.root) {
            if !self.nodes[h].is_leaf() {
                self.nodes[h].expanded = expanded;
            }
        }
    }

    /// Exports the subtree at `handle` back to raw metadata, carrying the
    /// current visibility and expand state.
    pub fn to_info(&self, handle: NodeHandle) -> SublayerInfo {
        let node = &self.nodes[handle];
        SublayerInfo {
            id: node.id,
            name: node.name.clone(),
            layer_type: node.layer_type.clone(),
            visibility: node.visibility,
            children: node.children.iter().map(|c| self.to_info(*c)).collect(),
            expanded: node.expanded,
        }
    }

    fn write_visibility(&mut self, handle: NodeHandle, visibility: Option<bool>) {
        self.nodes[handle].visibility = visibility;
        self.refresh_state(handle);
    }

    /// Re-resolves the cached state of `handle` and walks upward while a node
    /// flips between hidden and shown, since only that changes a parent's count.
    fn refresh_state(&mut self, mut handle: NodeHandle) {
        loop {
            let node = &mut self.nodes[handle];
            let prev = node.state;
            let next = node.resolve_cached();
            if prev == next {
                return;
            }
            node.state = next;

            let Some(parent) = node.parent else {
                return;
            };
            if prev.is_hidden() == next.is_hidden() {
                return;
            }

            let parent_node = &mut self.nodes[parent];
            if next.is_hidden() {
                parent_node.shown_children -= 1;
            } else {
                parent_node.shown_children += 1;
            }
            handle = parent;
        }
    }

    // Children are allocated before their parents, so allocation order is a
    // valid post-order for computing the cache from scratch.
    fn rebuild_states(&mut self) {
        let order: Vec<NodeHandle> = self.nodes.iter().map(|(h, _)| h).collect();
        for h in order {
            let shown = self.nodes[h]
                .children
                .iter()
                .filter(|c| !self.nodes[**c].state.is_hidden())
                .count();
            let node = &mut self.nodes[h];
            node.shown_children = shown;
            node.state = node.resolve_cached();
        }
    }
}

fn build_node(
    nodes: &mut Arena<SublayerNode>,
    by_id: &mut HashMap<SublayerId, NodeHandle>,
    info: &SublayerInfo,
    depth: usize,
) -> NodeHandle {
    let children: Vec<NodeHandle> = info
        .children
        .iter()
        .map(|c| build_node(nodes, by_id, c, depth + 1))
        .collect();

    let handle = nodes.alloc(SublayerNode {
        id: info.id,
        name: info.name.clone(),
        layer_type: info.layer_type.clone(),
        visibility: info.visibility,
        expanded: info.expanded,
        depth,
        parent: None,
        children: children.clone(),
        state: TriState::NotVisible,
        shown_children: 0,
    });
    for child in children {
        nodes[child].parent = Some(handle);
    }
    by_id.insert(info.id, handle);
    handle
}
