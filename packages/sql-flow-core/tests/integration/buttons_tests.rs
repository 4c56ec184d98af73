//! Button lists stored on query records.

use std::collections::HashSet;

use sql_flow_core::button::{self, Button, ButtonList, Upsert};
use sql_flow_core::record::{QueryIndex, QueryRecord, RecordSource};

fn records() -> QueryIndex {
    QueryIndex::new(
        (1..=3)
            .map(|id| QueryRecord {
                id,
                name: format!("q{}", id),
                sql_text: "SELECT 1".to_string(),
                ..Default::default()
            })
            .collect(),
    )
}

#[test]
fn upserting_twice_keeps_one_entry() {
    let mut record = QueryRecord::default();
    for sequence in [vec![1, 2], vec![2, 3]] {
        let mut list = ButtonList::from_record(&record);
        list.upsert(&Button::new("Close", sequence)).unwrap();
        record.button_config = Some(list.to_json().unwrap());
    }

    let buttons = button::read_all(&record);
    assert_eq!(buttons, vec![Button::new("Close", vec![2, 3])]);
}

#[test]
fn stale_ids_are_cleaned() {
    let index = records();
    let stored = Button::new("Close", vec![1, 7, 3, 9]);

    let report = button::validate(&stored, &index.known_ids());
    assert!(!report.is_valid);
    assert_eq!(report.missing_ids, vec![7, 9]);

    let cleaned = button::clean(&stored, &index.known_ids());
    assert!(cleaned.sequence.iter().all(|id| index.contains(*id)));
    assert!(button::validate(&cleaned, &index.known_ids()).is_valid);
}

#[test]
fn empty_known_set_invalidates_everything() {
    let report = button::validate(&Button::new("A", vec![1]), &HashSet::new());
    assert_eq!(report.valid_ids, Vec::<i64>::new());
    assert_eq!(report.missing_ids, vec![1]);
}

#[test]
fn replace_then_remove() {
    let mut list = ButtonList::parse(Some(r#"[{"name":"A","sequence":[1],"rgba":"red"}]"#));

    let recolored = Button {
        color_tag: Some("blue".to_string()),
        ..Button::new("A", vec![1, 2])
    };
    assert_eq!(list.upsert(&recolored).unwrap(), Upsert::Replaced);
    assert_eq!(list.buttons()[0].color(), "blue");

    assert!(list.remove("A"));
    assert_eq!(list.to_json().unwrap(), "[]");
}
