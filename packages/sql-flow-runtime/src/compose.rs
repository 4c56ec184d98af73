//! Building a button from the queries a user picked.

use sql_flow_core::button::{self, Button};
use sql_flow_core::error::FlowError;
use sql_flow_core::record::QueryIndex;

/// Composed button and the names that matched no record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composition {
    pub button: Button,
    pub missing: Vec<String>,
}

/// Resolves `query_names` to ids in order and builds a colored button.
///
/// The first record with an exactly matching name wins. Unknown names are
/// dropped and reported. Fails on a blank name or when no name resolves.
pub fn compose_button<S: AsRef<str>>(
    name: &str,
    query_names: &[S],
    index: &QueryIndex,
) -> Result<Composition, FlowError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(FlowError::InvalidButton("name is empty".to_string()));
    }
    let resolution = index.ids_for_names(query_names);
    if resolution.ids.is_empty() {
        return Err(FlowError::InvalidButton(format!(
            "no known query selected for '{}'",
            name
        )));
    }

    let composed = Button::with_palette_color(name, resolution.ids);
    let check = button::validate(&composed, &index.known_ids());
    if !check.is_valid {
        tracing::warn!(
            "Button '{}' references unknown query ids {:?}",
            composed.name,
            check.missing_ids
        );
    }
    tracing::info!(
        "Composed button '{}' with {} steps",
        composed.name,
        composed.sequence.len()
    );
    Ok(Composition {
        button: composed,
        missing: resolution.missing,
    })
}
