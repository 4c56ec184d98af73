//! Catalog construction and rewriting end to end.

use ntest::timeout;
use serde_json::{json, Value};

use sql_flow_core::catalog::Catalog;
use sql_flow_core::rewrite::{resolve_for_execution, to_encoded, to_labels, unresolved_tokens};

use super::helpers::{explicit_metadata, renamed_metadata};

const JOIN_SQL: &str =
    "SELECT orders.amount, email FROM orders JOIN customers ON orders.id = customers.id";

#[test]
fn encoded_sql_follows_renames() {
    let before = Catalog::from_value(&explicit_metadata());
    let after = Catalog::from_value(&renamed_metadata());

    let encoded = to_encoded(JOIN_SQL, &before);
    assert_eq!(
        encoded,
        "SELECT [TABLE:1].[COL:12], [COL:22] FROM [TABLE:1] JOIN [TABLE:2] ON [TABLE:1].[COL:11] = [TABLE:2].[COL:21]"
    );
    assert_eq!(
        to_labels(&encoded, &after),
        "SELECT sales.total, email FROM sales JOIN customers ON sales.id = customers.id"
    );
}

#[test]
fn stale_label_sql_runs_against_current_names() {
    let catalog = Catalog::from_value(&renamed_metadata());

    // Written by hand against the new names, mixed with persisted tokens
    let sql = "SELECT total, [COL:22] FROM [TABLE:1], customers";
    assert_eq!(
        resolve_for_execution(sql, &catalog),
        "SELECT total, email FROM sales, customers"
    );
}

#[test]
fn legacy_payload_as_text_round_trips() {
    let text = json!({"orders": ["id", "amount"], "customers": ["email"]}).to_string();
    let catalog = Catalog::build(&text);

    let encoded = to_encoded("SELECT amount FROM orders", &catalog);
    assert_eq!(encoded, "SELECT [COL:10001] FROM [TABLE:1000]");
    assert_eq!(to_labels(&encoded, &catalog), "SELECT amount FROM orders");
}

#[test]
fn dropped_table_leaves_visible_tokens() {
    let catalog = Catalog::from_value(&json!({
        "tables": [{"table_id": 2, "table_name": "customers",
                    "columns": [{"id": 22, "label": "email"}]}]
    }));

    let decoded = to_labels("SELECT [TABLE:1].[COL:12], [COL:22] FROM [TABLE:1]", &catalog);
    assert_eq!(decoded, "SELECT [TABLE:1].[COL:12], email FROM [TABLE:1]");
    assert_eq!(
        unresolved_tokens(&decoded),
        vec!["[TABLE:1]", "[COL:12]", "[TABLE:1]"]
    );
}

#[test]
fn missing_metadata_passes_sql_through() {
    let catalog = Catalog::from_value(&Value::Null);

    assert_eq!(to_encoded(JOIN_SQL, &catalog), JOIN_SQL);
    assert_eq!(to_labels("SELECT [COL:1]", &catalog), "SELECT [COL:1]");
}

#[test]
#[timeout(20000)]
fn large_catalog_stays_responsive() {
    let tables: Vec<Value> = (0..200)
        .map(|t| {
            json!({
                "table_id": t,
                "table_name": format!("t{}", t),
                "columns": (0..10)
                    .map(|c| json!({"id": t * 100 + c, "label": format!("c{}_{}", t, c)}))
                    .collect::<Vec<_>>()
            })
        })
        .collect();
    let catalog = Catalog::from_value(&json!({ "tables": tables }));
    assert_eq!(catalog.column_count(), 2000);

    let sql = "SELECT t199.c199_9, c0_0 FROM t199, t0";
    let encoded = to_encoded(sql, &catalog);
    assert_eq!(encoded, "SELECT [TABLE:199].[COL:19909], [COL:0] FROM [TABLE:199], [TABLE:0]");
    assert_eq!(to_labels(&encoded, &catalog), sql);
}
