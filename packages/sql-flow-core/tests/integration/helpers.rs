//! Shared fixtures.

use serde_json::{json, Value};

use sql_flow_core::record::{HostRecord, RecordId};

/// Explicit metadata: orders(id, amount), customers(id, email).
pub fn explicit_metadata() -> Value {
    json!({
        "tables": [
            {"table_id": 1, "table_name": "orders",
             "columns": [{"id": 11, "label": "id"}, {"id": 12, "label": "amount"}]},
            {"table_id": 2, "table_name": "customers",
             "columns": [{"id": 21, "label": "id"}, {"id": 22, "label": "email"}]}
        ]
    })
}

/// Same ids as [`explicit_metadata`] after `orders` became `sales` and
/// `amount` became `total`.
pub fn renamed_metadata() -> Value {
    json!({
        "tables": [
            {"table_id": 1, "table_name": "sales",
             "columns": [{"id": 11, "label": "id"}, {"id": 12, "label": "total"}]},
            {"table_id": 2, "table_name": "customers",
             "columns": [{"id": 21, "label": "id"}, {"id": 22, "label": "email"}]}
        ]
    })
}

/// Host row using the default field mapping.
pub fn host_row(id: RecordId, name: &str, sql: &str, metadata: Value) -> HostRecord {
    serde_json::from_value(json!({
        "id": id,
        "fields": {
            "RequestName": name,
            "sqlField": sql,
            "pythonfield": metadata,
            "buttonconfig": null,
            "destinationTable": null
        }
    }))
    .unwrap()
}
