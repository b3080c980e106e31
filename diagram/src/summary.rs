//! Plain-text description of a diagram, embedded in language-model prompts.
//!
//! Sections come in a fixed order (pools with their lanes, elements with pool
//! membership, connections by endpoint label) and every section is present,
//! saying so explicitly when it is empty. Output depends only on the diagram.

#[cfg(test)]
#[path = "summary_test.rs"]
mod tests;

use crate::model::{Connection, Diagram};

/// Describe `diagram` for a prompt.
#[must_use]
pub fn describe_diagram(diagram: &Diagram) -> String {
    if diagram.is_empty() {
        return format!("The diagram \"{}\" is currently empty.\n", diagram.name);
    }

    let mut out = format!("The diagram \"{}\" contains:\n\n", diagram.name);

    if diagram.pools.is_empty() {
        out.push_str("Pools: none.\n");
    } else {
        out.push_str("Pools:\n");
        for pool in &diagram.pools {
            out.push_str(&format!(
                "- Pool \"{}\" (ID: {}) at position ({}, {}) with size {}x{}\n",
                pool.name, pool.id, pool.position.x, pool.position.y, pool.size.width, pool.size.height
            ));
            for lane in &pool.lanes {
                out.push_str(&format!("  - Lane \"{}\" (ID: {})\n", lane.name, lane.id));
            }
        }
    }
    out.push('\n');

    if diagram.elements.is_empty() {
        out.push_str("Elements: none.\n");
    } else {
        out.push_str("Elements:\n");
        for el in &diagram.elements {
            let membership = match &el.pool_id {
                Some(pool_id) => format!("in pool {pool_id}"),
                None => "not in any pool".to_string(),
            };
            out.push_str(&format!(
                "- {} \"{}\" (ID: {}) at position ({}, {}), {membership}\n",
                el.kind.as_str(),
                el.label,
                el.id,
                el.position.x,
                el.position.y
            ));
        }
    }
    out.push('\n');

    if diagram.connections.is_empty() {
        out.push_str("Connections: none.\n");
    } else {
        out.push_str("Connections:\n");
        for conn in &diagram.connections {
            out.push_str(&describe_connection(diagram, conn));
        }
    }

    out
}

fn describe_connection(diagram: &Diagram, conn: &Connection) -> String {
    let endpoint = |id: &str| match diagram.element(id) {
        Some(el) => format!("\"{}\" ({id})", el.label),
        None => format!("missing element {id}"),
    };
    let label = match conn.label.as_deref().filter(|l| !l.is_empty()) {
        Some(label) => format!(" labeled \"{label}\""),
        None => String::new(),
    };
    format!("- From {} to {}{label}\n", endpoint(&conn.source), endpoint(&conn.target))
}
