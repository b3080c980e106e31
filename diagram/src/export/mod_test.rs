use time::macros::datetime;

use super::*;
use crate::engine::apply_modifications_at;
use crate::ids::SequentialIds;
use crate::model::{Connection, Element, ElementKind, Position};
use crate::modification::Modification;

fn diagram() -> Diagram {
    Diagram::with_id(uuid::Uuid::nil(), "Order Flow", datetime!(2024-01-01 00:00 UTC))
}

fn element(id: &str, kind: ElementKind, label: &str, x: f64, y: f64) -> Element {
    Element {
        id: id.into(),
        kind,
        position: Position::new(x, y),
        label: label.into(),
        pool_id: None,
        properties: None,
    }
}

fn connection(id: &str, source: &str, target: &str, label: Option<&str>) -> Connection {
    Connection { id: id.into(), source: source.into(), target: target.into(), label: label.map(Into::into) }
}

/// Start → Process Data, built through the engine.
fn scenario() -> Diagram {
    let ids = SequentialIds::new("n");
    let mods = [
        Modification::AddElement {
            element_type: Some(ElementKind::Start),
            position: Some(Position::new(100.0, 100.0)),
            label: Some("Start".into()),
            pool_id: None,
        },
        Modification::AddElement {
            element_type: Some(ElementKind::Task),
            position: Some(Position::new(300.0, 100.0)),
            label: Some("Process Data".into()),
            pool_id: None,
        },
        Modification::AddConnection { source_id: Some("n1".into()), target_id: Some("n2".into()), connection_label: None },
    ];
    apply_modifications_at(&diagram(), &mods, &ids, datetime!(2024-01-02 00:00 UTC)).diagram
}

// =============================================================
// Flowchart text
// =============================================================

#[test]
fn mermaid_scenario_output() {
    let text = to_mermaid(&scenario());
    let expected = "flowchart TD\n\
                    \x20   n1((\"Start\"))\n\
                    \x20   n2[\"Process Data\"]\n\
                    \x20   n1 --> n2\n\
                    \n\
                    \x20   classDef startClass fill:#d1fae5,stroke:#10b981,stroke-width:2px\n\
                    \x20   classDef taskClass fill:#dbeafe,stroke:#3b82f6,stroke-width:2px\n\
                    \x20   class n1 startClass\n\
                    \x20   class n2 taskClass\n";
    assert_eq!(text, expected);
}

#[test]
fn mermaid_scenario_line_counts() {
    let text = to_mermaid(&scenario());
    assert_eq!(text.lines().next(), Some("flowchart TD"));
    let node_lines = text.lines().filter(|l| l.contains("[\"") || l.contains("((\"")).count();
    assert_eq!(node_lines, 2);
    assert_eq!(text.matches("-->").count(), 1);
}

#[test]
fn mermaid_shapes_per_kind() {
    let mut d = diagram();
    d.elements = vec![
        element("a", ElementKind::Start, "A", 0.0, 0.0),
        element("b", ElementKind::Task, "B", 0.0, 0.0),
        element("c", ElementKind::Gateway, "C", 0.0, 0.0),
        element("d", ElementKind::End, "D", 0.0, 0.0),
    ];
    let text = to_mermaid(&d);
    assert!(text.contains("    a((\"A\"))\n"));
    assert!(text.contains("    b[\"B\"]\n"));
    assert!(text.contains("    c{\"C\"}\n"));
    assert!(text.contains("    d(((\"D\")))\n"));
}

#[test]
fn mermaid_edge_label_and_escaping() {
    let mut d = diagram();
    d.elements = vec![
        element("g", ElementKind::Gateway, "Say \"yes\"?", 0.0, 0.0),
        element("t", ElementKind::Task, "Ship", 0.0, 0.0),
    ];
    d.connections = vec![connection("c1", "g", "t", Some("a|b"))];
    let text = to_mermaid(&d);
    assert!(text.contains("    g{\"Say #quot;yes#quot;?\"}\n"));
    assert!(text.contains("    g -->|a#124;b| t\n"));
}

#[test]
fn mermaid_line_breaks_in_labels_stay_on_one_line() {
    let mut d = diagram();
    d.elements = vec![
        element("a", ElementKind::Task, "Check\nStock", 0.0, 0.0),
        element("b", ElementKind::End, "Done\r\nfor now", 0.0, 0.0),
    ];
    d.connections = vec![connection("c1", "a", "b", Some("if\rok"))];
    let text = to_mermaid(&d);
    assert!(text.contains("    a[\"Check<br/>Stock\"]\n"));
    assert!(text.contains("    b(((\"Done<br/>for now\")))\n"));
    assert!(text.contains("    a -->|if<br/>ok| b\n"));
    assert_eq!(text.lines().filter(|line| line.contains("Stock")).count(), 1);
}

#[test]
fn mermaid_class_defs_once_per_kind() {
    let mut d = diagram();
    d.elements = vec![
        element("t1", ElementKind::Task, "One", 0.0, 0.0),
        element("s", ElementKind::Start, "Go", 0.0, 0.0),
        element("t2", ElementKind::Task, "Two", 0.0, 0.0),
    ];
    let text = to_mermaid(&d);
    assert_eq!(text.matches("classDef taskClass").count(), 1);
    let task_def = text.find("classDef taskClass").unwrap();
    let start_def = text.find("classDef startClass").unwrap();
    assert!(task_def < start_def);
    assert_eq!(text.matches("    class ").count(), 3);
}

#[test]
fn mermaid_empty_diagram() {
    assert_eq!(to_mermaid(&diagram()), "flowchart TD\n\n");
}

#[test]
fn encoding_is_deterministic() {
    let d = scenario();
    assert_eq!(to_mermaid(&d), to_mermaid(&d));
    assert_eq!(to_bpmn_xml(&d), to_bpmn_xml(&d));
}

// =============================================================
// BPMN XML
// =============================================================

#[test]
fn bpmn_scenario_contents() {
    let xml = to_bpmn_xml(&scenario());
    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<definitions"));
    assert!(xml.contains("xmlns=\"http://www.omg.org/spec/BPMN/20100524/MODEL\""));
    assert!(xml.contains("xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\""));
    assert!(xml.contains("xmlns:bpmndi=\"http://www.omg.org/spec/BPMN/20100524/DI\""));
    assert!(xml.contains("xmlns:dc=\"http://www.omg.org/spec/DD/20100524/DC\""));
    assert!(xml.contains("xmlns:di=\"http://www.omg.org/spec/DD/20100524/DI\""));
    assert_eq!(xml.matches("<startEvent ").count(), 1);
    assert_eq!(xml.matches("<task ").count(), 1);
    assert_eq!(xml.matches("<sequenceFlow ").count(), 1);
    assert!(xml.contains("<sequenceFlow id=\"n3\" sourceRef=\"n1\" targetRef=\"n2\" />"));
    assert!(xml.contains("<process id=\"Process_00000000-0000-0000-0000-000000000000\" isExecutable=\"true\">"));
    assert!(xml.contains("bpmnElement=\"Process_00000000-0000-0000-0000-000000000000\""));
    assert!(xml.trim_end().ends_with("</definitions>"));
}

#[test]
fn bpmn_tags_per_kind() {
    let mut d = diagram();
    d.elements = vec![
        element("a", ElementKind::Start, "A", 0.0, 0.0),
        element("b", ElementKind::Task, "B", 0.0, 0.0),
        element("c", ElementKind::Gateway, "C", 0.0, 0.0),
        element("d", ElementKind::End, "D", 0.0, 0.0),
    ];
    let xml = to_bpmn_xml(&d);
    assert!(xml.contains("<startEvent id=\"a\" name=\"A\" />"));
    assert!(xml.contains("<task id=\"b\" name=\"B\" />"));
    assert!(xml.contains("<exclusiveGateway id=\"c\" name=\"C\" />"));
    assert!(xml.contains("<endEvent id=\"d\" name=\"D\" />"));
}

#[test]
fn bpmn_shape_bounds_and_label() {
    let mut d = diagram();
    d.elements = vec![
        element("t", ElementKind::Task, "T", 300.0, 100.0),
        element("s", ElementKind::Start, "S", 100.0, 100.0),
    ];
    let xml = to_bpmn_xml(&d);
    assert!(xml.contains("<bpmndi:BPMNShape id=\"t_di\" bpmnElement=\"t\">"));
    assert!(xml.contains("<dc:Bounds x=\"300\" y=\"100\" width=\"100\" height=\"80\" />"));
    assert!(xml.contains("<dc:Bounds x=\"300\" y=\"185\" width=\"100\" height=\"14\" />"));
    assert!(xml.contains("<dc:Bounds x=\"100\" y=\"100\" width=\"36\" height=\"36\" />"));
    assert!(xml.contains("<dc:Bounds x=\"100\" y=\"141\" width=\"36\" height=\"14\" />"));
}

#[test]
fn bpmn_edge_waypoints_use_kind_centers() {
    let mut d = diagram();
    d.elements = vec![
        element("g", ElementKind::Gateway, "G", 0.0, 0.0),
        element("t", ElementKind::Task, "T", 200.0, 100.0),
    ];
    d.connections = vec![connection("c", "g", "t", Some("yes"))];
    let xml = to_bpmn_xml(&d);
    assert!(xml.contains("<bpmndi:BPMNEdge id=\"c_di\" bpmnElement=\"c\">"));
    assert!(xml.contains("<di:waypoint x=\"40\" y=\"40\" />"));
    assert!(xml.contains("<di:waypoint x=\"250\" y=\"150\" />"));
    assert!(xml.contains("<dc:Bounds x=\"85\" y=\"43\" width=\"30\" height=\"14\" />"));
    assert!(xml.contains("<sequenceFlow id=\"c\" sourceRef=\"g\" targetRef=\"t\" name=\"yes\" />"));
}

#[test]
fn bpmn_skips_edge_shape_for_unresolved_endpoint() {
    let mut d = diagram();
    d.elements = vec![element("a", ElementKind::Task, "A", 0.0, 0.0)];
    d.connections = vec![connection("c", "a", "ghost", None)];
    let xml = to_bpmn_xml(&d);
    assert_eq!(xml.matches("<sequenceFlow ").count(), 1);
    assert!(!xml.contains("BPMNEdge"));
}

#[test]
fn bpmn_escapes_attribute_values() {
    let mut d = diagram();
    d.elements = vec![element("a", ElementKind::Task, "Check <stock> & \"price\"", 0.0, 0.0)];
    let xml = to_bpmn_xml(&d);
    assert!(xml.contains("name=\"Check &lt;stock&gt; &amp; &quot;price&quot;\""));
}

// =============================================================
// Download metadata
// =============================================================

#[test]
fn export_names_file_after_diagram() {
    let d = scenario();
    let mmd = export(&d, ExportFormat::Mermaid);
    assert_eq!(mmd.filename, "Order Flow.mmd");
    assert_eq!(mmd.mime_type, "text/plain");
    assert_eq!(mmd.content, to_mermaid(&d));

    let xml = export(&d, ExportFormat::Bpmn);
    assert_eq!(xml.filename, "Order Flow.bpmn");
    assert_eq!(xml.mime_type, "application/xml");
}

#[test]
fn export_filename_strips_unsafe_characters() {
    let mut d = diagram();
    d.name = "a/b\"c".into();
    assert_eq!(export(&d, ExportFormat::Mermaid).filename, "a_b_c.mmd");
    d.name = "   ".into();
    assert_eq!(export(&d, ExportFormat::Bpmn).filename, "diagram.bpmn");
}
