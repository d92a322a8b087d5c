use serde::Serialize;

/// Display state of a node. Only used for rendering; a group stores a plain
/// "fully visible" flag and this is derived from it and its children.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TriState {
    Visible,
    Partial,
    NotVisible,
}

impl TriState {
    pub fn is_hidden(self) -> bool {
        self == TriState::NotVisible
    }

    /// Leaf rule: only an explicit `true` counts as visible.
    pub fn of_leaf(visibility: Option<bool>) -> Self {
        if visibility == Some(true) {
            TriState::Visible
        } else {
            TriState::NotVisible
        }
    }

    /// Group rule: the stored flag wins, otherwise any child that is not fully
    /// hidden makes the group partial.
    pub fn of_group(visibility: Option<bool>, any_child_shown: bool) -> Self {
        if visibility == Some(true) {
            TriState::Visible
        } else if any_child_shown {
            TriState::Partial
        } else {
            TriState::NotVisible
        }
    }
}
