use time::macros::datetime;

use super::*;
use crate::engine::apply_modifications_at;
use crate::ids::SequentialIds;
use crate::model::{ElementKind, Position};
use crate::modification::Modification;

fn base() -> Diagram {
    Diagram::with_id(uuid::Uuid::nil(), "Checkout", datetime!(2024-01-01 00:00 UTC))
}

fn populated() -> Diagram {
    let ids = SequentialIds::new("n");
    let mods = [
        Modification::AddPool {
            pool_name: Some("Customer".into()),
            position: Some(Position::new(100.0, 50.0)),
            pool_size: None,
            pool_color: None,
        },
        Modification::AddElement {
            element_type: Some(ElementKind::Start),
            position: Some(Position::new(150.0, 100.0)),
            label: Some("Begin".into()),
            pool_id: Some("n1".into()),
        },
        Modification::AddElement {
            element_type: Some(ElementKind::Task),
            position: Some(Position::new(300.0, 100.0)),
            label: Some("Pay".into()),
            pool_id: None,
        },
        Modification::AddConnection {
            source_id: Some("n3".into()),
            target_id: Some("n4".into()),
            connection_label: Some("card".into()),
        },
    ];
    apply_modifications_at(&base(), &mods, &ids, datetime!(2024-01-02 00:00 UTC)).diagram
}

#[test]
fn empty_diagram_says_so() {
    assert_eq!(describe_diagram(&base()), "The diagram \"Checkout\" is currently empty.\n");
}

#[test]
fn populated_diagram_lists_sections_in_order() {
    let expected = "The diagram \"Checkout\" contains:\n\
                    \n\
                    Pools:\n\
                    - Pool \"Customer\" (ID: n1) at position (100, 50) with size 400x200\n\
                    \x20 - Lane \"Lane 1\" (ID: n2)\n\
                    \n\
                    Elements:\n\
                    - start \"Begin\" (ID: n3) at position (150, 100), in pool n1\n\
                    - task \"Pay\" (ID: n4) at position (300, 100), not in any pool\n\
                    \n\
                    Connections:\n\
                    - From \"Begin\" (n3) to \"Pay\" (n4) labeled \"card\"\n";
    assert_eq!(describe_diagram(&populated()), expected);
}

#[test]
fn empty_sections_are_explicit() {
    let mut d = populated();
    d.pools.clear();
    d.connections.clear();
    for el in &mut d.elements {
        el.pool_id = None;
    }
    let text = describe_diagram(&d);
    assert!(text.contains("Pools: none.\n"));
    assert!(text.contains("Elements:\n"));
    assert!(text.contains("Connections: none.\n"));
}

#[test]
fn unresolved_endpoint_is_named() {
    let mut d = populated();
    d.elements.retain(|el| el.id != "n4");
    let text = describe_diagram(&d);
    assert!(text.contains("- From \"Begin\" (n3) to missing element n4 labeled \"card\"\n"));
}

#[test]
fn description_is_deterministic() {
    let d = populated();
    assert_eq!(describe_diagram(&d), describe_diagram(&d));
}
