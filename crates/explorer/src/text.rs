//! Plain-text rendering of explorer rows, used by the CLI and in logs.

use sublayers::TriState;

use crate::row::{Expander, ExplorerRow};

pub fn checkbox(state: TriState) -> &'static str {
    match state {
        TriState::Visible => "[x]",
        TriState::Partial => "[-]",
        TriState::NotVisible => "[ ]",
    }
}

pub fn expander_glyph(expander: Expander) -> &'static str {
    match expander {
        Expander::None => " ",
        Expander::Collapsed => "+",
        Expander::Expanded => "-",
    }
}

pub fn render_row(row: &ExplorerRow) -> String {
    format!(
        "{indent}{exp} {check} {name} ({ty}, id={id})",
        indent = "  ".repeat(row.depth),
        exp = expander_glyph(row.expander),
        check = checkbox(row.state),
        name = row.name,
        ty = row.layer_type,
        id = row.id,
    )
}

pub fn render_rows(rows: &[ExplorerRow]) -> String {
    let mut out = String::new();
    for row in rows {
        out.push_str(&render_row(row));
        out.push('\n');
    }
    out
}
