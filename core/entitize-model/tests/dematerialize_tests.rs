mod common;

use common::*;
use entitize_model::{FieldMapping, Registry};
use pretty_assertions::assert_eq;
use serde_json::json;

fn filter_column_registry() -> Registry {
    let mut registry = Registry::new();
    registry
        .register_mappings([
            (
                "Filter".to_string(),
                vec![FieldMapping::scalar("ID"), FieldMapping::scalar("FilterQuery")],
            ),
            (
                "Column".to_string(),
                vec![
                    FieldMapping::scalar("ID"),
                    FieldMapping::one_to_one("Filter", "Filter"),
                ],
            ),
        ])
        .unwrap();
    registry
}

// ── Worked examples ──────────────────────────────────────────────

#[test]
fn nested_one_to_one_round_trips_exactly() {
    let registry = filter_column_registry();
    let source = json!({"ID": 1, "Filter": {"ID": 9, "FilterQuery": "x>0"}});
    let e = registry.materialize(&source, "Column").unwrap();
    assert_eq!(e.dematerialize(&registry).unwrap(), source);
}

#[test]
fn null_one_to_one_dematerializes_to_explicit_null() {
    let registry = filter_column_registry();
    let e = registry
        .materialize(&json!({"ID": 2, "Filter": null}), "Column")
        .unwrap();
    assert_eq!(
        e.dematerialize(&registry).unwrap(),
        json!({"ID": 2, "Filter": null})
    );
}

#[test]
fn cleared_one_to_one_is_sent_as_null() {
    let registry = filter_column_registry();
    let mut e = registry
        .materialize(&json!({"ID": 1, "Filter": {"ID": 9}}), "Column")
        .unwrap();
    e.clear_related("Filter");
    let out = e.dematerialize(&registry).unwrap();
    assert_eq!(out["Filter"], json!(null));
    assert!(out.as_object().unwrap().contains_key("Filter"));
}

// ── Projection ───────────────────────────────────────────────────

#[test]
fn output_has_exactly_the_mapped_keys() {
    let registry = filter_column_registry();
    let e = registry
        .materialize(&json!({"ID": 9, "FilterQuery": "q", "Extra": 1}), "Filter")
        .unwrap();
    let out = e.dematerialize(&registry).unwrap();
    let mut keys: Vec<&String> = out.as_object().unwrap().keys().collect();
    keys.sort();
    assert_eq!(keys, vec!["FilterQuery", "ID"]);
}

#[test]
fn unset_scalar_becomes_null() {
    let registry = filter_column_registry();
    let e = registry.materialize(&json!({"ID": 9}), "Filter").unwrap();
    assert_eq!(
        e.dematerialize(&registry).unwrap(),
        json!({"ID": 9, "FilterQuery": null})
    );
}

#[test]
fn empty_one_to_many_becomes_empty_array() {
    let registry = batch_registry();
    let table = registry.materialize(&json!({"ID": 1}), "Table").unwrap();
    let out = table.dematerialize(&registry).unwrap();
    assert_eq!(out["Columns"], json!([]));
    assert_eq!(out["SplitBy"], json!(null));
}

#[test]
fn full_table_graph_round_trips() {
    let registry = batch_registry();
    let source = sample_table();
    let table = registry.materialize(&source, "Table").unwrap();
    assert_eq!(table.dematerialize(&registry).unwrap(), source);
}

#[test]
fn edits_to_the_graph_are_reflected() {
    let registry = batch_registry();
    let mut table = registry.materialize(&sample_table(), "Table").unwrap();

    table.set("TableName", "Renamed");
    let new_column = registry
        .materialize(&json!({"ID": 12, "ColumnName": "City"}), "Column")
        .unwrap();
    table.push_related("Columns", new_column);
    table.related_many_mut("Columns").unwrap()[0].clear_related("Filter");

    let out = table.dematerialize(&registry).unwrap();
    assert_eq!(out["TableName"], json!("Renamed"));
    assert_eq!(out["Columns"].as_array().unwrap().len(), 3);
    assert_eq!(out["Columns"][0]["Filter"], json!(null));
    assert_eq!(out["Columns"][2]["ColumnName"], json!("City"));
    assert_eq!(out["Columns"][2]["Position"], json!(null));
}

#[test]
fn dematerialize_produces_an_independent_graph() {
    let registry = filter_column_registry();
    let e = registry
        .materialize(&json!({"ID": 1, "Filter": {"ID": 9}}), "Column")
        .unwrap();
    let mut out = e.dematerialize(&registry).unwrap();
    out["Filter"]["ID"] = json!(100);
    assert_eq!(e.related("Filter").unwrap().get_i64("ID"), Some(9));
}

#[test]
fn uses_current_mapping_list() {
    let mut registry = filter_column_registry();
    let e = registry
        .materialize(&json!({"ID": 9, "FilterQuery": "q"}), "Filter")
        .unwrap();
    registry
        .register_mappings([("Filter".to_string(), vec![FieldMapping::scalar("ID")])])
        .unwrap();
    assert_eq!(e.dematerialize(&registry).unwrap(), json!({"ID": 9}));
}

// ── Errors ───────────────────────────────────────────────────────

#[test]
fn unregistered_type_is_lookup_error() {
    let registry = filter_column_registry();
    let e = registry.materialize(&json!({"ID": 9}), "Filter").unwrap();
    let empty = Registry::new();
    assert!(e.dematerialize(&empty).unwrap_err().is_lookup());
}

#[test]
fn scalar_in_navigation_slot_is_shape_mismatch() {
    let registry = filter_column_registry();
    let mut e = registry.materialize(&json!({"ID": 1}), "Column").unwrap();
    e.set("Filter", 42);
    let err = e.dematerialize(&registry).unwrap_err();
    assert_eq!(
        err.to_string(),
        "shape mismatch on Column.Filter: expected entity, found number"
    );
}

#[test]
fn entity_in_scalar_slot_is_shape_mismatch() {
    let registry = filter_column_registry();
    let mut e = registry.materialize(&json!({"ID": 1}), "Column").unwrap();
    let filter = registry.materialize(&json!({"ID": 2}), "Filter").unwrap();
    e.set_related("ID", Some(filter));
    assert!(e.dematerialize(&registry).unwrap_err().is_shape_mismatch());
}

#[test]
fn single_entity_in_list_slot_is_shape_mismatch() {
    let registry = batch_registry();
    let mut table = registry.materialize(&json!({"ID": 1}), "Table").unwrap();
    let column = registry.materialize(&json!({"ID": 2}), "Column").unwrap();
    table.set_related("Columns", Some(column));
    let err = table.dematerialize(&registry).unwrap_err();
    assert_eq!(
        err.to_string(),
        "shape mismatch on Table.Columns: expected entity list, found entity"
    );
}
