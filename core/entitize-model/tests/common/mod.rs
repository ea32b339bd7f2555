#![allow(dead_code)]

use entitize_model::{FieldMapping, Registry, TypeBundle};
use serde_json::{json, Value};

pub fn filter_mappings() -> Vec<FieldMapping> {
    vec![
        FieldMapping::scalar("ID").with_prop_type("int"),
        FieldMapping::scalar("RowVersion").with_prop_type("string"),
        FieldMapping::scalar("FilterQuery").with_prop_type("string"),
    ]
}

pub fn column_mappings() -> Vec<FieldMapping> {
    vec![
        FieldMapping::scalar("ID").with_prop_type("int"),
        FieldMapping::scalar("RowVersion").with_prop_type("string"),
        FieldMapping::scalar("QuestionId").with_prop_type("string"),
        FieldMapping::scalar("ColumnName").with_prop_type("string"),
        FieldMapping::one_to_one("Filter", "Filter"),
        FieldMapping::scalar("Position").with_prop_type("int"),
        FieldMapping::scalar("TableId")
            .with_prop_type("int")
            .with_foreign_key("Table"),
        FieldMapping::scalar("Table").with_prop_type("Table"),
    ]
}

pub fn table_mappings() -> Vec<FieldMapping> {
    vec![
        FieldMapping::scalar("ID").with_prop_type("int"),
        FieldMapping::scalar("RowVersion").with_prop_type("string"),
        FieldMapping::scalar("TableName").with_prop_type("string"),
        FieldMapping::one_to_many("Columns", "Column"),
        FieldMapping::one_to_one("SplitBy", "Column"),
        FieldMapping::one_to_one("SortBy", "Column"),
        FieldMapping::one_to_one("GroupBy", "Column"),
        FieldMapping::scalar("SortOrder").with_prop_type("bool"),
    ]
}

/// Table / Column / Filter registered through the batch form.
pub fn batch_registry() -> Registry {
    let mut registry = Registry::new();
    registry
        .register_mappings([
            ("Table".to_string(), table_mappings()),
            ("Column".to_string(), column_mappings()),
            ("Filter".to_string(), filter_mappings()),
        ])
        .unwrap();
    registry
}

/// Table / Column / Filter registered as bundles with endpoints and one
/// method each.
pub fn bundle_registry() -> Registry {
    let mut registry = Registry::new();
    registry
        .register(
            TypeBundle::new("Table", table_mappings())
                .update_endpoint("/Tables/UpdateTable")
                .method("tableFunc", |e, _| Ok(json!(e.get_str("TableName")))),
        )
        .unwrap();
    registry
        .register(
            TypeBundle::new("Column", column_mappings())
                .update_endpoint("/Tables/UpdateColumn")
                .method("columnFunc", |e, _| Ok(json!(e.get_str("ColumnName")))),
        )
        .unwrap();
    registry
        .register(
            TypeBundle::new("Filter", filter_mappings())
                .update_endpoint("/Tables/UpdateFilter")
                .method("filterFunc", |e, _| Ok(json!(e.get_str("FilterQuery")))),
        )
        .unwrap();
    registry
}

pub fn sample_table() -> Value {
    json!({
        "ID": 1,
        "RowVersion": "AAAA",
        "TableName": "Survey results",
        "Columns": [
            {
                "ID": 10,
                "RowVersion": "AAAB",
                "QuestionId": "q1",
                "ColumnName": "Age",
                "Filter": {"ID": 100, "RowVersion": "AAAC", "FilterQuery": "x>0"},
                "Position": 0,
                "TableId": 1,
                "Table": null
            },
            {
                "ID": 11,
                "RowVersion": "AAAD",
                "QuestionId": "q2",
                "ColumnName": "Country",
                "Filter": null,
                "Position": 1,
                "TableId": 1,
                "Table": null
            }
        ],
        "SplitBy": null,
        "SortBy": {
            "ID": 11,
            "RowVersion": "AAAD",
            "QuestionId": "q2",
            "ColumnName": "Country",
            "Filter": null,
            "Position": 1,
            "TableId": 1,
            "Table": null
        },
        "GroupBy": null,
        "SortOrder": true
    })
}
