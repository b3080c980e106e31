//! BPMN 2.0 XML encoder.
//!
//! Emits a `process` section (one node per element, one `sequenceFlow` per
//! connection) and a `BPMNDiagram`/`BPMNPlane` interchange section with a
//! shape per element and an edge per connection. Shape sizes are fixed per
//! kind; edge waypoints run between nominal element centers. A connection
//! whose endpoints cannot be resolved gets no interchange edge.

use crate::consts::{
    EDGE_LABEL_WIDTH, EVENT_CENTER_EXTENT, EVENT_SHAPE_SIZE, GATEWAY_CENTER_EXTENT, LABEL_GAP, LABEL_HEIGHT,
    TASK_CENTER_EXTENT, TASK_SHAPE_HEIGHT, TASK_SHAPE_WIDTH,
};
use crate::model::{Connection, Diagram, Element, ElementKind};

const PROLOGUE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<definitions xmlns="http://www.omg.org/spec/BPMN/20100524/MODEL"
             xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
             xmlns:bpmndi="http://www.omg.org/spec/BPMN/20100524/DI"
             xmlns:dc="http://www.omg.org/spec/DD/20100524/DC"
             xmlns:di="http://www.omg.org/spec/DD/20100524/DI"
             targetNamespace="http://bpmn.io/schema/bpmn"
             exporter="procflow"
             exporterVersion="0.1.0">
"#;

/// Escape a value for use inside a double-quoted XML attribute.
pub(crate) fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\n' => out.push_str("&#10;"),
            c => out.push(c),
        }
    }
    out
}

fn tag(kind: ElementKind) -> &'static str {
    match kind {
        ElementKind::Start => "startEvent",
        ElementKind::Task => "task",
        ElementKind::Gateway => "exclusiveGateway",
        ElementKind::End => "endEvent",
    }
}

fn shape_size(kind: ElementKind) -> (f64, f64) {
    match kind {
        ElementKind::Task => (TASK_SHAPE_WIDTH, TASK_SHAPE_HEIGHT),
        ElementKind::Start | ElementKind::Gateway | ElementKind::End => (EVENT_SHAPE_SIZE, EVENT_SHAPE_SIZE),
    }
}

fn center_extent(kind: ElementKind) -> f64 {
    match kind {
        ElementKind::Task => TASK_CENTER_EXTENT,
        ElementKind::Gateway => GATEWAY_CENTER_EXTENT,
        ElementKind::Start | ElementKind::End => EVENT_CENTER_EXTENT,
    }
}

fn center(el: &Element) -> (f64, f64) {
    let half = center_extent(el.kind) / 2.0;
    (el.position.x + half, el.position.y + half)
}

/// Encode `diagram` as a BPMN 2.0 definitions document.
#[must_use]
pub fn to_bpmn_xml(diagram: &Diagram) -> String {
    let process_id = format!("Process_{}", diagram.id);
    let mut out = String::from(PROLOGUE);

    out.push_str(&format!("  <process id=\"{process_id}\" isExecutable=\"true\">\n"));
    for el in &diagram.elements {
        out.push_str(&format!(
            "    <{} id=\"{}\" name=\"{}\" />\n",
            tag(el.kind),
            escape_attr(&el.id),
            escape_attr(&el.label)
        ));
    }
    for conn in &diagram.connections {
        out.push_str(&sequence_flow(conn));
    }
    out.push_str("  </process>\n");

    out.push_str("  <bpmndi:BPMNDiagram id=\"BPMNDiagram_1\">\n");
    out.push_str(&format!("    <bpmndi:BPMNPlane id=\"BPMNPlane_1\" bpmnElement=\"{process_id}\">\n"));
    for el in &diagram.elements {
        out.push_str(&shape(el));
    }
    for conn in &diagram.connections {
        if let (Some(source), Some(target)) = (diagram.element(&conn.source), diagram.element(&conn.target)) {
            out.push_str(&edge(conn, source, target));
        }
    }
    out.push_str("    </bpmndi:BPMNPlane>\n");
    out.push_str("  </bpmndi:BPMNDiagram>\n");
    out.push_str("</definitions>\n");
    out
}

fn sequence_flow(conn: &Connection) -> String {
    let name = match conn.label.as_deref().filter(|l| !l.is_empty()) {
        Some(label) => format!(" name=\"{}\"", escape_attr(label)),
        None => String::new(),
    };
    format!(
        "    <sequenceFlow id=\"{}\" sourceRef=\"{}\" targetRef=\"{}\"{name} />\n",
        escape_attr(&conn.id),
        escape_attr(&conn.source),
        escape_attr(&conn.target)
    )
}

fn shape(el: &Element) -> String {
    let id = escape_attr(&el.id);
    let (x, y) = (el.position.x, el.position.y);
    let (width, height) = shape_size(el.kind);
    let label_y = y + height + LABEL_GAP;
    format!(
        "      <bpmndi:BPMNShape id=\"{id}_di\" bpmnElement=\"{id}\">\n\
         \x20       <dc:Bounds x=\"{x}\" y=\"{y}\" width=\"{width}\" height=\"{height}\" />\n\
         \x20       <bpmndi:BPMNLabel>\n\
         \x20         <dc:Bounds x=\"{x}\" y=\"{label_y}\" width=\"{width}\" height=\"{LABEL_HEIGHT}\" />\n\
         \x20       </bpmndi:BPMNLabel>\n\
         \x20     </bpmndi:BPMNShape>\n"
    )
}

fn edge(conn: &Connection, source: &Element, target: &Element) -> String {
    let id = escape_attr(&conn.id);
    let (sx, sy) = center(source);
    let (tx, ty) = center(target);
    let mut out = format!(
        "      <bpmndi:BPMNEdge id=\"{id}_di\" bpmnElement=\"{id}\">\n\
         \x20       <di:waypoint x=\"{sx}\" y=\"{sy}\" />\n\
         \x20       <di:waypoint x=\"{tx}\" y=\"{ty}\" />\n"
    );
    if conn.label.as_deref().is_some_and(|l| !l.is_empty()) {
        let lx = (source.position.x + target.position.x) / 2.0 - EDGE_LABEL_WIDTH / 2.0;
        let ly = (source.position.y + target.position.y) / 2.0 - LABEL_HEIGHT / 2.0;
        out.push_str(&format!(
            "        <bpmndi:BPMNLabel>\n\
             \x20         <dc:Bounds x=\"{lx}\" y=\"{ly}\" width=\"{EDGE_LABEL_WIDTH}\" height=\"{LABEL_HEIGHT}\" />\n\
             \x20       </bpmndi:BPMNLabel>\n"
        ));
    }
    out.push_str("      </bpmndi:BPMNEdge>\n");
    out
}
