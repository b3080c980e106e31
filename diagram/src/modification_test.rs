use serde_json::json;

use super::*;

#[test]
fn decodes_add_element_with_camel_case_fields() {
    let value = json!({
        "type": "add_element",
        "elementType": "task",
        "position": { "x": 200, "y": 100 },
        "label": "New Task",
        "poolId": "pool-1"
    });
    let modification: Modification = serde_json::from_value(value).unwrap();
    assert_eq!(
        modification,
        Modification::AddElement {
            element_type: Some(ElementKind::Task),
            position: Some(Position::new(200.0, 100.0)),
            label: Some("New Task".into()),
            pool_id: Some("pool-1".into()),
        }
    );
}

#[test]
fn missing_fields_decode_as_none() {
    let modification: Modification = serde_json::from_value(json!({ "type": "add_element", "label": "x" })).unwrap();
    assert!(matches!(
        modification,
        Modification::AddElement { element_type: None, position: None, pool_id: None, .. }
    ));
}

#[test]
fn clear_diagram_needs_only_the_tag() {
    let modification: Modification = serde_json::from_value(json!({ "type": "clear_diagram" })).unwrap();
    assert_eq!(modification, Modification::ClearDiagram {});
    assert_eq!(modification.name(), "clear_diagram");
}

#[test]
fn serializes_back_to_wire_shape() {
    let modification = Modification::AddPool {
        pool_name: Some("Customer".into()),
        position: Some(Position::new(100.0, 50.0)),
        pool_size: None,
        pool_color: Some("#10B981".into()),
    };
    let value = serde_json::to_value(&modification).unwrap();
    assert_eq!(value["type"], "add_pool");
    assert_eq!(value["poolName"], "Customer");
    assert_eq!(value["poolColor"], "#10B981");
    assert!(value.get("poolSize").is_none());
}

#[test]
fn every_command_name_matches_its_tag() {
    let batch = json!({ "modifications": [
        { "type": "add_element" },
        { "type": "remove_element" },
        { "type": "modify_element" },
        { "type": "add_connection" },
        { "type": "remove_connection" },
        { "type": "add_pool" },
        { "type": "remove_pool" },
        { "type": "modify_pool" },
        { "type": "add_lane" },
        { "type": "remove_lane" },
        { "type": "clear_diagram" }
    ]});
    let parsed = parse_batch(&batch.to_string()).unwrap();
    assert!(parsed.rejected.is_empty());
    let names: Vec<&str> = parsed.modifications.iter().map(Modification::name).collect();
    let tags: Vec<String> = batch["modifications"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["type"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, tags);
}

#[test]
fn parse_batch_rejects_bad_entries_individually() {
    let payload = json!({ "modifications": [
        { "type": "rename_universe" },
        { "type": "add_element", "elementType": "task", "position": { "x": 0, "y": 0 }, "label": "ok" },
        { "type": "add_element", "elementType": "subprocess" },
        { "type": "add_pool", "position": { "x": "left", "y": 0 } }
    ]});
    let parsed = parse_batch(&payload.to_string()).unwrap();
    assert_eq!(parsed.modifications.len(), 1);
    let indexes: Vec<usize> = parsed.rejected.iter().map(|r| r.index).collect();
    assert_eq!(indexes, vec![0, 2, 3]);
}

#[test]
fn parse_batch_without_key_is_empty() {
    let parsed = parse_batch("{}").unwrap();
    assert_eq!(parsed, ParsedBatch::default());
}

#[test]
fn parse_batch_rejects_non_json() {
    assert!(parse_batch("not json").is_err());
}
