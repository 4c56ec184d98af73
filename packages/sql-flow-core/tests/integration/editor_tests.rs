//! Editor load/save against host rows.

use sql_flow_core::catalog::Catalog;
use sql_flow_core::config::FieldMapping;
use sql_flow_core::editor::EditorDocument;
use sql_flow_core::record::QueryIndex;

use super::helpers::{explicit_metadata, host_row, renamed_metadata};

#[test]
fn saved_sql_reloads_after_rename() {
    let mapping = FieldMapping::default();
    let row = host_row(5, "Revenue", "", explicit_metadata());
    let index = QueryIndex::from_host_records(&[row], &mapping);
    let record = index.find_by_name("Revenue").unwrap();

    let doc = EditorDocument::load(record);
    assert!(doc.is_placeholder);

    let fields = doc.save_fields(
        "SELECT SUM(amount) FROM orders",
        Some("customers"),
        &mapping,
    );
    assert_eq!(fields["sqlField"], "SELECT SUM([COL:12]) FROM [TABLE:1]");
    assert_eq!(fields["destinationTable"], "[TABLE:2]");

    // The host applies the update, then the schema is renamed
    let mut reloaded = record.clone();
    reloaded.sql_text = fields["sqlField"].as_str().unwrap().to_string();
    reloaded.destination_table = Some("[TABLE:2]".to_string());
    reloaded.metadata = Some(renamed_metadata());

    let doc = EditorDocument::load(&reloaded);
    assert_eq!(doc.sql, "SELECT SUM(total) FROM sales");
    assert_eq!(doc.destination.as_deref(), Some("customers"));
    assert_eq!(doc.table_choices(), vec!["sales", "customers"]);
}

#[test]
fn metadata_as_json_text() {
    let row = host_row(
        1,
        "Legacy",
        "SELECT [COL:10000] FROM [TABLE:1000]",
        serde_json::Value::String(r#"{"orders": ["amount"]}"#.to_string()),
    );
    let index = QueryIndex::from_host_records(&[row], &FieldMapping::default());
    let doc = EditorDocument::load(index.find_by_name("Legacy").unwrap());

    assert_eq!(doc.sql, "SELECT amount FROM orders");
    assert_eq!(doc.catalog(), &Catalog::build(r#"{"orders": ["amount"]}"#));
}

#[test]
fn query_names_listing() {
    let mapping = FieldMapping::default();
    let rows = vec![
        host_row(1, "Revenue", "", explicit_metadata()),
        host_row(2, " Churn ", "", explicit_metadata()),
        host_row(3, "Revenue", "", explicit_metadata()),
    ];
    let index = QueryIndex::from_host_records(&rows, &mapping);

    assert_eq!(index.query_names(), vec!["Churn".to_string(), "Revenue".to_string()]);
}
