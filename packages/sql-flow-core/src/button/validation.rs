//! Stale-reference detection for button sequences.

use std::collections::HashSet;

use super::Button;
use crate::record::RecordId;

/// Partition of a button sequence by record existence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validation {
    /// True iff no id is missing
    pub is_valid: bool,
    /// Ids with no loaded record, in sequence order
    pub missing_ids: Vec<RecordId>,
    /// Ids with a loaded record, in sequence order
    pub valid_ids: Vec<RecordId>,
}

/// Splits `button.sequence` by membership in `known_ids`.
pub fn validate(button: &Button, known_ids: &HashSet<RecordId>) -> Validation {
    let (valid_ids, missing_ids): (Vec<RecordId>, Vec<RecordId>) = button
        .sequence
        .iter()
        .partition(|id| known_ids.contains(*id));

    if !missing_ids.is_empty() {
        tracing::warn!("Button '{}' references missing ids {:?}", button.name, missing_ids);
    }

    Validation {
        is_valid: missing_ids.is_empty(),
        missing_ids,
        valid_ids,
    }
}

/// Copy of `button` keeping only ids present in `known_ids`.
pub fn clean(button: &Button, known_ids: &HashSet<RecordId>) -> Button {
    Button {
        sequence: validate(button, known_ids).valid_ids,
        ..button.clone()
    }
}
