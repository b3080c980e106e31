//! Mermaid `flowchart TD` encoder.

use crate::model::{Diagram, ElementKind};

const HEADER: &str = "flowchart TD";
const INDENT: &str = "    ";

/// Open and close brackets that give each kind its shape.
fn shape(kind: ElementKind) -> (&'static str, &'static str) {
    match kind {
        ElementKind::Start => ("((", "))"),
        ElementKind::Task => ("[", "]"),
        ElementKind::Gateway => ("{", "}"),
        ElementKind::End => ("(((", ")))"),
    }
}

fn style(kind: ElementKind) -> &'static str {
    match kind {
        ElementKind::Start => "fill:#d1fae5,stroke:#10b981,stroke-width:2px",
        ElementKind::Task => "fill:#dbeafe,stroke:#3b82f6,stroke-width:2px",
        ElementKind::Gateway => "fill:#fef3c7,stroke:#f59e0b,stroke-width:2px",
        ElementKind::End => "fill:#fee2e2,stroke:#ef4444,stroke-width:2px",
    }
}

/// Quotes would end the label string early, and a raw line break would
/// split the node across lines.
fn escape_label(label: &str) -> String {
    label
        .replace('"', "#quot;")
        .replace("\r\n", "<br/>")
        .replace(['\n', '\r'], "<br/>")
}

/// Pipes delimit edge labels.
fn escape_edge_label(label: &str) -> String {
    escape_label(label).replace('|', "#124;")
}

/// Encode `diagram` as flowchart text.
///
/// Layout: header, one line per element, one line per connection, a blank
/// line, one `classDef` per kind in order of first appearance, then one
/// `class` assignment per element.
#[must_use]
pub fn to_mermaid(diagram: &Diagram) -> String {
    let mut out = String::from(HEADER);
    out.push('\n');

    for el in &diagram.elements {
        let (open, close) = shape(el.kind);
        out.push_str(&format!("{INDENT}{}{open}\"{}\"{close}\n", el.id, escape_label(&el.label)));
    }

    for conn in &diagram.connections {
        match conn.label.as_deref().filter(|l| !l.is_empty()) {
            Some(label) => out.push_str(&format!(
                "{INDENT}{} -->|{}| {}\n",
                conn.source,
                escape_edge_label(label),
                conn.target
            )),
            None => out.push_str(&format!("{INDENT}{} --> {}\n", conn.source, conn.target)),
        }
    }

    out.push('\n');

    let mut kinds: Vec<ElementKind> = Vec::new();
    for el in &diagram.elements {
        if !kinds.contains(&el.kind) {
            kinds.push(el.kind);
        }
    }
    for kind in kinds {
        out.push_str(&format!("{INDENT}classDef {}Class {}\n", kind.as_str(), style(kind)));
    }
    for el in &diagram.elements {
        out.push_str(&format!("{INDENT}class {} {}Class\n", el.id, el.kind.as_str()));
    }

    out
}
